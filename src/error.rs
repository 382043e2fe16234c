// SPDX-License-Identifier: MIT

//! Typed error handling for flowsim
//!
//! This module provides the error type hierarchy used across the crate,
//! built on thiserror.

use thiserror::Error;

/// Top-level error type for flowsim
#[derive(Debug, Error)]
pub enum FlowsimError {
    /// Catalog/definition validation errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Import document validation errors
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Persistence errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Workflow definition validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Workflow id is empty
    #[error("Workflow id must not be empty")]
    EmptyWorkflowId,

    /// Workflow name is empty
    #[error("Workflow '{0}' has an empty name")]
    EmptyWorkflowName(String),

    /// A step id is empty
    #[error("Workflow '{workflow}' has a step with an empty id")]
    EmptyStepId { workflow: String },

    /// Two steps share an id within the same workflow
    #[error("Workflow '{workflow}' has duplicate step id '{step}'")]
    DuplicateStepId { workflow: String, step: String },

    /// Attempted to delete or replace a built-in workflow
    #[error("Workflow '{0}' is not a custom workflow")]
    NotCustom(String),
}

/// Import document format errors
///
/// Every variant carries a human-readable message; import validation
/// runs fully before any persisted state is mutated.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The document is not valid JSON
    #[error("Invalid workflow file: {0}")]
    Parse(#[from] serde_json::Error),

    /// A required field is absent
    #[error("Invalid workflow file format: missing '{0}'")]
    MissingField(&'static str),

    /// A field is present but has the wrong shape
    #[error("Invalid workflow file format: '{field}' is malformed ({reason})")]
    MalformedField { field: &'static str, reason: String },

    /// An imported workflow failed structural validation
    #[error("Invalid workflow in import document: {0}")]
    InvalidWorkflow(#[from] CatalogError),
}

/// Persistence backend errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to write a key to the backend
    #[error("Failed to persist '{key}': {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize a value before writing
    #[error("Failed to serialize '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

