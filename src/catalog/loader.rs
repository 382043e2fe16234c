//! Workflow loader - YAML file loading and parsing
//!
//! This module handles loading user-authored workflow definitions from
//! YAML files, for example as written by hand or exported from another
//! install.

use std::fs;
use std::path::Path;

use super::types::WorkflowDefinition;
use crate::error::FlowsimError;

/// Loads workflow definitions from YAML files
pub struct WorkflowLoader;

impl WorkflowLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load and validate a workflow definition from a YAML file
    pub fn load_workflow<P: AsRef<Path>>(&self, path: P) -> Result<WorkflowDefinition, FlowsimError> {
        let content = fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    /// Parse and validate a workflow definition from a YAML string
    pub fn parse_yaml(content: &str) -> Result<WorkflowDefinition, FlowsimError> {
        let def: WorkflowDefinition = serde_yaml::from_str(content)?;
        def.validate()?;
        Ok(def)
    }
}

impl Default for WorkflowLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CatalogError, FlowsimError};

    #[test]
    fn test_parse_workflow() {
        let yaml = r#"
id: custom-release
name: Release Flow
description: "Cut and ship a release"
steps:
  - id: step-1
    title: Tag
    description: "Tag the release commit"
  - id: step-2
    title: Publish
    description: "Push artifacts"
"#;
        let def = WorkflowLoader::parse_yaml(yaml).unwrap();
        assert_eq!(def.id, "custom-release");
        assert_eq!(def.name, "Release Flow");
        assert_eq!(def.steps.len(), 2);
        assert_eq!(def.steps[0].title, "Tag");
        assert!(def.is_custom());
    }

    #[test]
    fn test_parse_workflow_without_steps() {
        let yaml = r#"
id: custom-empty
name: Empty Flow
description: "No steps yet"
"#;
        let def = WorkflowLoader::parse_yaml(yaml).unwrap();
        assert!(def.steps.is_empty());
    }

    #[test]
    fn test_invalid_yaml_returns_error() {
        let yaml = r#"
id:
  - invalid structure
"#;
        let result = WorkflowLoader::parse_yaml(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_step_ids_rejected() {
        let yaml = r#"
id: custom-dup
name: Dup
description: ""
steps:
  - id: step-1
    title: A
    description: ""
  - id: step-1
    title: B
    description: ""
"#;
        let result = WorkflowLoader::parse_yaml(yaml);
        match result {
            Err(FlowsimError::Catalog(CatalogError::DuplicateStepId { step, .. })) => {
                assert_eq!(step, "step-1");
            }
            other => panic!("Expected DuplicateStepId, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_returns_error() {
        let loader = WorkflowLoader::new();
        let result = loader.load_workflow("/nonexistent/workflow.yaml");
        assert!(result.is_err());
    }
}
