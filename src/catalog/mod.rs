// SPDX-License-Identifier: MIT

//! Workflow catalog: definition types, built-in templates, and loading

pub mod builtin;
pub mod loader;
pub mod types;

pub use builtin::{builtin_workflows, find_builtin};
pub use loader::WorkflowLoader;
pub use types::{is_custom_id, StepDefinition, WorkflowDefinition, CUSTOM_ID_PREFIX};
