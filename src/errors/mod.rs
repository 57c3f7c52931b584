// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Error types with actionable messages
//!
//! Stage failures are not errors here: they are recorded in the run report and
//! folded into the build outcome. `StagehandError` covers faults (a tool that
//! could not be launched, a probe that could not connect) and configuration
//! problems that stop a run before it starts.

mod recovery;

pub use recovery::RecoverySuggestion;

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for stagehand operations
pub type StagehandResult<T> = Result<T, StagehandError>;

/// Main error type for stagehand
#[derive(Error, Debug, Diagnostic)]
pub enum StagehandError {
    // ─────────────────────────────────────────────────────────────────────────
    // Tool Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Tool '{tool}' not found")]
    #[diagnostic(code(stagehand::tool_not_found), help("{suggestion}"))]
    ToolNotFound { tool: String, suggestion: String },

    #[error("Tool '{tool}' could not be launched: {error}")]
    #[diagnostic(code(stagehand::tool_execution_failed))]
    ToolExecutionFailed {
        tool: String,
        error: String,
        #[help]
        help: Option<String>,
    },

    #[error("No executor registered for action: {action}")]
    #[diagnostic(
        code(stagehand::executor_not_found),
        help("Available actions: shell, probe, notice")
    )]
    ExecutorNotFound { action: String },

    #[error("Stage '{stage}' timed out after {seconds}s")]
    #[diagnostic(
        code(stagehand::stage_timed_out),
        help("Raise 'timeout_secs' on the stage or remove it to wait indefinitely")
    )]
    StageTimedOut { stage: String, seconds: u64 },

    #[error("Health probe against '{url}' failed: {error}")]
    #[diagnostic(
        code(stagehand::probe_failed),
        help("Check that the service is running and reachable, or raise 'delay_secs'")
    )]
    ProbeFailed { url: String, error: String },

    #[error("Stage '{stage}' panicked: {message}")]
    #[diagnostic(code(stagehand::stage_panicked))]
    StagePanicked { stage: String, message: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Pipeline Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Pipeline file not found: {path}")]
    #[diagnostic(
        code(stagehand::pipeline_not_found),
        help("Create a pipeline with 'stagehand init' or write .stagehand.yaml manually")
    )]
    PipelineNotFound { path: PathBuf },

    #[error("Invalid pipeline configuration: {reason}")]
    #[diagnostic(code(stagehand::invalid_pipeline))]
    InvalidPipeline {
        reason: String,
        #[help]
        help: Option<String>,
    },

    #[error("Stage '{stage}' is invalid: {reason}")]
    #[diagnostic(code(stagehand::invalid_stage))]
    InvalidStage { stage: String, reason: String },

    #[error("Stage '{stage}' not found in pipeline")]
    #[diagnostic(code(stagehand::stage_not_found))]
    StageNotFound { stage: String },

    // ─────────────────────────────────────────────────────────────────────────
    // File Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(stagehand::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("Failed to write file '{path}': {error}")]
    #[diagnostic(code(stagehand::file_write_error))]
    FileWriteError { path: PathBuf, error: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Post-run Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Artifact error: {message}")]
    #[diagnostic(code(stagehand::artifact_error))]
    ArtifactError { message: String },

    #[error("Notification via '{channel}' failed: {message}")]
    #[diagnostic(code(stagehand::notification_failed))]
    NotificationFailed { channel: String, message: String },

    #[error("Build counter error: {message}")]
    #[diagnostic(
        code(stagehand::build_counter),
        help("Pass --build-id explicitly or delete the corrupt counter file")
    )]
    BuildCounter { message: String },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/System Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("IO error: {message}")]
    #[diagnostic(code(stagehand::io_error))]
    Io { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(stagehand::yaml_error))]
    Yaml { message: String },

    #[error("JSON error: {message}")]
    #[diagnostic(code(stagehand::json_error))]
    Json { message: String },

    #[error("TOML parsing error: {message}")]
    #[diagnostic(code(stagehand::toml_error))]
    Toml { message: String },

    #[error("Glob pattern error: {message}")]
    #[diagnostic(code(stagehand::glob_error))]
    GlobPattern { message: String },
}

impl From<std::io::Error> for StagehandError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for StagehandError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for StagehandError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl From<toml::de::Error> for StagehandError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml { message: e.to_string() }
    }
}

impl From<glob::PatternError> for StagehandError {
    fn from(e: glob::PatternError) -> Self {
        Self::GlobPattern { message: e.to_string() }
    }
}

impl StagehandError {
    /// Create a tool not found error with installation suggestion
    pub fn tool_not_found(tool: &str) -> Self {
        Self::ToolNotFound {
            tool: tool.to_string(),
            suggestion: RecoverySuggestion::install_tool(tool).action,
        }
    }

    /// Create a launch fault for a shell that could not be spawned in `working_dir`
    pub fn launch_failed(shell: &str, working_dir: &Path, error: &std::io::Error) -> Self {
        let help = if !working_dir.is_dir() {
            format!(
                "Working directory '{}' does not exist; an earlier stage such as checkout may have failed",
                working_dir.display()
            )
        } else if error.kind() == std::io::ErrorKind::PermissionDenied {
            format!("Shell '{}' is not executable", shell)
        } else {
            format!("Shell '{}' may not be installed or on PATH", shell)
        };

        Self::ToolExecutionFailed {
            tool: shell.to_string(),
            error: error.to_string(),
            help: Some(help),
        }
    }

    /// Whether this error happened while a stage was executing
    ///
    /// Stage-time faults are recorded against the stage and do not abort the run.
    pub fn is_stage_fault(&self) -> bool {
        matches!(
            self,
            Self::ToolExecutionFailed { .. }
                | Self::StageTimedOut { .. }
                | Self::StagePanicked { .. }
                | Self::ProbeFailed { .. }
                | Self::ExecutorNotFound { .. }
                | Self::InvalidStage { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_not_found_carries_install_hint() {
        let err = StagehandError::tool_not_found("docker");
        match err {
            StagehandError::ToolNotFound { tool, suggestion } => {
                assert_eq!(tool, "docker");
                assert!(suggestion.contains("Docker"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_stage_fault_classification() {
        let not_found = std::io::Error::from(std::io::ErrorKind::NotFound);
        assert!(StagehandError::launch_failed("zsh", Path::new("."), &not_found).is_stage_fault());
        assert!(StagehandError::StageTimedOut {
            stage: "build".into(),
            seconds: 5
        }
        .is_stage_fault());
        assert!(!StagehandError::Io {
            message: "disk full".into()
        }
        .is_stage_fault());
    }

    #[test]
    fn test_yaml_error_conversion() {
        let err: StagehandError = serde_yaml::from_str::<Vec<u32>>("{ nope")
            .unwrap_err()
            .into();
        assert!(matches!(err, StagehandError::Yaml { .. }));
    }
}
