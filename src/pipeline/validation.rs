// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Pipeline validation
//!
//! Validates pipeline configuration before execution.

use std::collections::{HashMap, HashSet};

use crate::errors::StagehandError;
use crate::executors::{create_default_executors, Executor};
use crate::pipeline::{Action, Pipeline, Stage};

/// Pipeline validator
pub struct PipelineValidator;

impl PipelineValidator {
    /// Validate a pipeline configuration
    pub fn validate(pipeline: &Pipeline) -> Result<ValidationResult, StagehandError> {
        let mut result = ValidationResult::new();

        if pipeline.name.trim().is_empty() {
            result.add_error("Pipeline name is empty");
        }

        // Check for empty stages
        if pipeline.stages.is_empty() {
            result.add_error("Pipeline has no stages defined");
        }

        // Check for duplicate stage names
        let mut seen_names = HashSet::new();
        for stage in &pipeline.stages {
            if !seen_names.insert(&stage.name) {
                result.add_error(&format!("Duplicate stage name: '{}'", stage.name));
            }
        }

        // Action-specific checks live with the executors
        let executors = create_default_executors();
        for stage in &pipeline.stages {
            Self::validate_stage(stage, &executors, &mut result);
        }

        let mut seen_cleanup = HashSet::new();
        for action in &pipeline.cleanup {
            if action.command.trim().is_empty() {
                result.add_error(&format!("Cleanup '{}': command is empty", action.name));
            }
            if !seen_cleanup.insert(&action.name) {
                result.add_warning(&format!("Duplicate cleanup name: '{}'", action.name));
            }
        }

        for artifact in &pipeline.artifacts {
            if artifact.pattern.trim().is_empty() {
                result.add_error("Artifact pattern is empty");
            } else if let Err(e) = glob::Pattern::new(&artifact.pattern) {
                result.add_error(&format!(
                    "Artifact pattern '{}' is invalid: {}",
                    artifact.pattern, e
                ));
            }
        }

        if pipeline.settings.output_limit == 0 {
            result.add_warning("settings.output_limit is 0, no stage output will be kept");
        }

        Ok(result)
    }

    /// Validate a single stage
    fn validate_stage(
        stage: &Stage,
        executors: &HashMap<String, Box<dyn Executor>>,
        result: &mut ValidationResult,
    ) {
        if stage.name.trim().is_empty() {
            result.add_error("A stage has an empty name");
        }

        match executors.get(stage.action_kind()) {
            Some(executor) => {
                if let Err(e) = executor.validate_stage(stage) {
                    result.add_error(&e.to_string());
                }
            }
            None => result.add_error(&format!(
                "Stage '{}': no executor for action '{}'",
                stage.name,
                stage.action_kind()
            )),
        }

        if stage.timeout_secs == Some(0) {
            result.add_error(&format!(
                "Stage '{}': timeout_secs must be greater than 0",
                stage.name
            ));
        }

        if let Action::Probe { .. } = stage.action {
            if stage.delay_secs == 0 {
                result.add_warning(&format!(
                    "Stage '{}': health probe has no delay_secs, the service may not be ready yet",
                    stage.name
                ));
            }
        }

        if stage.timeout_secs.is_some() && matches!(stage.action, Action::Notice { .. }) {
            result.add_warning(&format!(
                "Stage '{}': timeout_secs has no effect on a notice",
                stage.name
            ));
        }
    }

    /// Check the environment inputs exist; returns human-readable problems
    pub fn validate_environment(pipeline: &Pipeline) -> Vec<String> {
        let mut missing = Vec::new();
        let settings = &pipeline.settings;

        if let Some(ref home) = settings.runtime_home {
            if !home.is_dir() {
                missing.push(format!("Runtime home not found: {}", home.display()));
            }
        }

        for (tool, location) in &settings.tools {
            if which::which(location).is_err() {
                missing.push(format!("Tool '{}' not found at '{}'", tool, location));
            }
        }

        let mut shells = HashSet::new();
        for stage in &pipeline.stages {
            if let Action::Shell { ref shell, .. } = stage.action {
                if shells.insert(shell.as_str()) && which::which(shell).is_err() {
                    missing.push(format!("Shell '{}' not found on PATH", shell));
                }
            }
        }

        missing
    }
}

/// Result of pipeline validation
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    pub fn add_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{ArtifactSpec, CleanupAction};

    fn pipeline(stages: Vec<Stage>) -> Pipeline {
        let mut p = Pipeline::from_yaml("name: test\nstages: []\n").unwrap();
        p.stages = stages;
        p
    }

    #[test]
    fn test_validate_empty_pipeline() {
        let result = PipelineValidator::validate(&pipeline(vec![])).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors[0].contains("no stages"));
    }

    #[test]
    fn test_validate_duplicate_names() {
        let result = PipelineValidator::validate(&pipeline(vec![
            Stage::shell("dup", "true"),
            Stage::shell("dup", "false"),
        ]))
        .unwrap();

        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.contains("Duplicate")));
    }

    #[test]
    fn test_validate_empty_command_and_zero_timeout() {
        let mut stage = Stage::shell("build", "");
        stage.timeout_secs = Some(0);

        let result = PipelineValidator::validate(&pipeline(vec![stage])).unwrap();
        assert!(result.errors.iter().any(|e| e.contains("empty")));
        assert!(result.errors.iter().any(|e| e.contains("timeout_secs")));
    }

    #[test]
    fn test_probe_without_delay_warns() {
        let mut stage = Stage::shell("health", "unused");
        stage.action = Action::Probe {
            url: "http://localhost:3000".into(),
            expect: "OWASP Juice Shop".into(),
            timeout_secs: 10,
        };

        let result = PipelineValidator::validate(&pipeline(vec![stage])).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.contains("delay_secs")));
    }

    #[test]
    fn test_cleanup_and_artifact_checks() {
        let mut p = pipeline(vec![Stage::shell("build", "true")]);
        p.cleanup.push(CleanupAction {
            name: "stop".into(),
            command: " ".into(),
            shell: "sh".into(),
        });
        p.artifacts.push(ArtifactSpec {
            pattern: "reports/[".into(),
            description: None,
        });

        let result = PipelineValidator::validate(&p).unwrap();
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_environment_reports_missing_tool() {
        let mut p = pipeline(vec![Stage::shell("build", "true")]);
        p.settings
            .tools
            .insert("scanner".into(), "stagehand-no-such-scanner".into());

        let missing = PipelineValidator::validate_environment(&p);
        assert!(missing.iter().any(|m| m.contains("scanner")));
    }
}
