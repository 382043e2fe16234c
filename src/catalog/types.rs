// SPDX-License-Identifier: MIT

//! Workflow and step definition types
//!
//! This module contains the data structures describing a workflow: an
//! immutable, ordered sequence of named steps. Definitions are either
//! built-in (fixed catalog) or custom (user-authored, id prefixed with
//! `custom-`).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::CatalogError;

/// Id prefix marking a user-authored, deletable workflow
pub const CUSTOM_ID_PREFIX: &str = "custom-";

/// A named, ordered sequence of steps
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct WorkflowDefinition {
    /// Unique workflow identifier
    pub id: String,
    pub name: String,
    pub description: String,
    /// Steps in execution order
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}

/// A single step within a workflow
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct StepDefinition {
    /// Unique within the owning workflow
    pub id: String,
    pub title: String,
    pub description: String,
}

impl WorkflowDefinition {
    /// Create a user-authored workflow with a generated `custom-` id
    pub fn new_custom(
        name: impl Into<String>,
        description: impl Into<String>,
        steps: Vec<StepDefinition>,
    ) -> Self {
        Self {
            id: format!("{}{}", CUSTOM_ID_PREFIX, Uuid::new_v4()),
            name: name.into(),
            description: description.into(),
            steps,
        }
    }

    /// Whether this workflow is user-authored (and therefore deletable)
    pub fn is_custom(&self) -> bool {
        is_custom_id(&self.id)
    }

    /// Structural validation: non-empty ids and name, unique step ids.
    /// A workflow with zero steps is legal.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.id.is_empty() {
            return Err(CatalogError::EmptyWorkflowId);
        }
        if self.name.is_empty() {
            return Err(CatalogError::EmptyWorkflowName(self.id.clone()));
        }

        let mut seen = HashSet::new();
        for step in &self.steps {
            if step.id.is_empty() {
                return Err(CatalogError::EmptyStepId {
                    workflow: self.id.clone(),
                });
            }
            if !seen.insert(step.id.as_str()) {
                return Err(CatalogError::DuplicateStepId {
                    workflow: self.id.clone(),
                    step: step.id.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Whether an id carries the custom-workflow prefix
pub fn is_custom_id(id: &str) -> bool {
    id.starts_with(CUSTOM_ID_PREFIX)
}
