// SPDX-License-Identifier: MIT

//! Persistence store
//!
//! Four independently keyed resources: theme, settings, custom
//! workflows, and the analytics snapshot. Reads never fail the caller;
//! absent or unparseable content degrades to the documented default.
//! Writes replace a resource wholesale under its key. Concurrent
//! processes sharing a data directory do not coordinate; last writer
//! wins.

pub mod backend;
pub mod document;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use document::{parse_document, ExportDocument, EXPORT_VERSION};

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::analytics::{AnalyticsSnapshot, RunOutcome};
use crate::catalog::{builtin_workflows, WorkflowDefinition};
use crate::error::{FlowsimError, StoreError};
use crate::run::clock::{Clock, SystemClock};
use crate::run::state::Speed;

const KEY_THEME: &str = "flowsim_theme";
const KEY_SETTINGS: &str = "flowsim_settings";
const KEY_CUSTOM_WORKFLOWS: &str = "flowsim_custom_workflows";
const KEY_ANALYTICS: &str = "flowsim_analytics";

/// UI theme
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Dark => write!(f, "dark"),
            Theme::Light => write!(f, "light"),
        }
    }
}

/// Persisted user settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub default_speed: Speed,
    pub auto_save: bool,
    pub show_notifications: bool,
    pub enable_keyboard_shortcuts: bool,
    pub enable_step_failure: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_speed: Speed::Normal,
            auto_save: true,
            show_notifications: true,
            enable_keyboard_shortcuts: true,
            enable_step_failure: false,
        }
    }
}

/// Result of a successful import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub workflows_imported: usize,
    pub analytics_imported: bool,
    pub theme_imported: bool,
}

impl std::fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Imported {} custom workflow(s) successfully",
            self.workflows_imported
        )
    }
}

/// The keyed persistence store
///
/// Owned by the application and passed by `Arc` to the run machine and
/// any other consumer; no global state.
pub struct Store {
    backend: Box<dyn StorageBackend>,
    clock: Arc<dyn Clock>,
}

impl Store {
    pub fn new(backend: impl StorageBackend + 'static, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend: Box::new(backend),
            clock,
        }
    }

    pub fn with_system_clock(backend: impl StorageBackend + 'static) -> Self {
        Self::new(backend, Arc::new(SystemClock))
    }

    fn read_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.backend.read(key) {
            None => T::default(),
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("Unparseable content under '{}', using defaults: {}", key, e);
                T::default()
            }),
        }
    }

    fn write_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.backend.write(key, &raw)
    }

    // ----- Theme -----

    pub fn theme(&self) -> Theme {
        self.read_or_default(KEY_THEME)
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), StoreError> {
        self.write_json(KEY_THEME, &theme)
    }

    // ----- Settings -----

    pub fn settings(&self) -> Settings {
        self.read_or_default(KEY_SETTINGS)
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        self.write_json(KEY_SETTINGS, settings)
    }

    // ----- Custom workflows -----

    pub fn custom_workflows(&self) -> Vec<WorkflowDefinition> {
        self.read_or_default(KEY_CUSTOM_WORKFLOWS)
    }

    /// Built-in templates followed by custom workflows
    pub fn all_workflows(&self) -> Vec<WorkflowDefinition> {
        builtin_workflows()
            .iter()
            .cloned()
            .chain(self.custom_workflows())
            .collect()
    }

    pub fn find_workflow(&self, id: &str) -> Option<WorkflowDefinition> {
        self.all_workflows().into_iter().find(|w| w.id == id)
    }

    /// Replace by id or append, then persist the full sequence
    pub fn upsert_custom_workflow(
        &self,
        workflow: WorkflowDefinition,
    ) -> Result<Vec<WorkflowDefinition>, FlowsimError> {
        workflow.validate()?;
        let mut workflows = self.custom_workflows();
        upsert_by_id(&mut workflows, workflow);
        self.write_json(KEY_CUSTOM_WORKFLOWS, &workflows)?;
        Ok(workflows)
    }

    /// Remove by id and persist; absent id is a no-op, not an error
    pub fn delete_custom_workflow(&self, id: &str) -> Result<Vec<WorkflowDefinition>, StoreError> {
        let mut workflows = self.custom_workflows();
        workflows.retain(|w| w.id != id);
        self.write_json(KEY_CUSTOM_WORKFLOWS, &workflows)?;
        Ok(workflows)
    }

    // ----- Analytics -----

    pub fn analytics(&self) -> AnalyticsSnapshot {
        self.read_or_default(KEY_ANALYTICS)
    }

    /// Fold one outcome into the snapshot and persist it in one write
    pub fn record_run(&self, outcome: &RunOutcome) -> Result<AnalyticsSnapshot, StoreError> {
        let mut snapshot = self.analytics();
        snapshot.record(outcome, self.clock.now());
        self.write_json(KEY_ANALYTICS, &snapshot)?;
        Ok(snapshot)
    }

    pub fn clear_analytics(&self) -> Result<(), StoreError> {
        self.write_json(KEY_ANALYTICS, &AnalyticsSnapshot::default())
    }

    pub fn analytics_csv(&self) -> String {
        self.analytics().to_csv()
    }

    // ----- Export / import -----

    pub fn export_all(&self) -> ExportDocument {
        ExportDocument {
            version: EXPORT_VERSION.to_string(),
            export_date: Some(self.clock.now()),
            custom_workflows: self.custom_workflows(),
            analytics: Some(self.analytics()),
            theme: Some(self.theme()),
        }
    }

    pub fn export_json(&self) -> Result<String, StoreError> {
        serde_json::to_string_pretty(&self.export_all()).map_err(|source| {
            StoreError::Serialize {
                key: "export".to_string(),
                source,
            }
        })
    }

    /// Validate an import document fully, then merge it in.
    ///
    /// Incoming custom workflows win on id collision; analytics and
    /// theme overwrite wholesale when present. Validation failures leave
    /// persisted state untouched.
    pub fn import_json(&self, text: &str) -> Result<ImportSummary, FlowsimError> {
        let document = document::parse_document(text)?;

        let mut workflows = self.custom_workflows();
        let imported = document.custom_workflows.len();
        for incoming in document.custom_workflows {
            upsert_by_id(&mut workflows, incoming);
        }
        self.write_json(KEY_CUSTOM_WORKFLOWS, &workflows)?;

        let analytics_imported = if let Some(analytics) = document.analytics {
            self.write_json(KEY_ANALYTICS, &analytics)?;
            true
        } else {
            false
        };
        let theme_imported = if let Some(theme) = document.theme {
            self.write_json(KEY_THEME, &theme)?;
            true
        } else {
            false
        };

        let summary = ImportSummary {
            workflows_imported: imported,
            analytics_imported,
            theme_imported,
        };
        log::info!("{}", summary);
        Ok(summary)
    }
}

fn upsert_by_id(workflows: &mut Vec<WorkflowDefinition>, incoming: WorkflowDefinition) {
    match workflows.iter_mut().find(|w| w.id == incoming.id) {
        Some(existing) => *existing = incoming,
        None => workflows.push(incoming),
    }
}
