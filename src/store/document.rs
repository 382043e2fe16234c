// SPDX-License-Identifier: MIT

//! Portable export document
//!
//! The export document carries everything one install can hand to
//! another: custom workflows, the analytics snapshot, and the theme.
//! Import validation is an explicit schema check performed fully before
//! any persisted state is touched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::AnalyticsSnapshot;
use crate::catalog::WorkflowDefinition;
use crate::error::ImportError;

use super::Theme;

/// Version stamped on every export
pub const EXPORT_VERSION: &str = "1.0.0";

/// The portable document shape
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    #[serde(default)]
    pub export_date: Option<DateTime<Utc>>,
    pub custom_workflows: Vec<WorkflowDefinition>,
    /// Present in full exports; overwrites the target snapshot wholesale
    #[serde(default)]
    pub analytics: Option<AnalyticsSnapshot>,
    #[serde(default)]
    pub theme: Option<Theme>,
}

/// Parse and validate an import document.
///
/// `version` and `customWorkflows` are required; every incoming
/// workflow must pass structural validation. Nothing is mutated here,
/// so a failure leaves the caller's persisted state untouched.
pub fn parse_document(text: &str) -> Result<ExportDocument, ImportError> {
    let value: serde_json::Value = serde_json::from_str(text)?;

    match value.get("version") {
        None => return Err(ImportError::MissingField("version")),
        Some(v) if !v.is_string() => {
            return Err(ImportError::MalformedField {
                field: "version",
                reason: "expected a string".to_string(),
            })
        }
        Some(_) => {}
    }
    match value.get("customWorkflows") {
        None => return Err(ImportError::MissingField("customWorkflows")),
        Some(v) if !v.is_array() => {
            return Err(ImportError::MalformedField {
                field: "customWorkflows",
                reason: "expected an array".to_string(),
            })
        }
        Some(_) => {}
    }

    let document: ExportDocument = serde_json::from_value(value)?;
    for workflow in &document.custom_workflows {
        workflow.validate()?;
    }

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_document() {
        let doc = parse_document(r#"{"version": "1.0.0", "customWorkflows": []}"#).unwrap();
        assert_eq!(doc.version, "1.0.0");
        assert!(doc.custom_workflows.is_empty());
        assert!(doc.analytics.is_none());
        assert!(doc.theme.is_none());
        assert!(doc.export_date.is_none());
    }

    #[test]
    fn test_parse_full_document() {
        let text = r#"{
            "version": "1.0.0",
            "exportDate": "2024-05-01T12:00:00Z",
            "customWorkflows": [
                {"id": "custom-1", "name": "A", "description": "", "steps": []}
            ],
            "analytics": {"totalRuns": 2},
            "theme": "light"
        }"#;
        let doc = parse_document(text).unwrap();
        assert_eq!(doc.custom_workflows.len(), 1);
        assert_eq!(doc.analytics.as_ref().unwrap().total_runs, 2);
        assert_eq!(doc.theme, Some(Theme::Light));
        assert!(doc.export_date.is_some());
    }

    #[test]
    fn test_missing_version_rejected() {
        let err = parse_document(r#"{"customWorkflows": []}"#).unwrap_err();
        assert!(matches!(err, ImportError::MissingField("version")));
    }

    #[test]
    fn test_missing_custom_workflows_rejected() {
        let err = parse_document(r#"{"version": "1.0.0"}"#).unwrap_err();
        assert!(matches!(err, ImportError::MissingField("customWorkflows")));
    }

    #[test]
    fn test_malformed_custom_workflows_rejected() {
        let err = parse_document(r#"{"version": "1.0.0", "customWorkflows": 5}"#).unwrap_err();
        assert!(matches!(
            err,
            ImportError::MalformedField {
                field: "customWorkflows",
                ..
            }
        ));
    }

    #[test]
    fn test_not_json_rejected() {
        let err = parse_document("not json at all").unwrap_err();
        assert!(matches!(err, ImportError::Parse(_)));
    }

    #[test]
    fn test_invalid_workflow_entry_rejected() {
        let text = r#"{
            "version": "1.0.0",
            "customWorkflows": [
                {"id": "", "name": "A", "description": "", "steps": []}
            ]
        }"#;
        let err = parse_document(text).unwrap_err();
        assert!(matches!(err, ImportError::InvalidWorkflow(_)));
    }

    #[test]
    fn test_error_messages_are_human_readable() {
        let err = parse_document(r#"{"customWorkflows": []}"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid workflow file format: missing 'version'"
        );
    }
}
