// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Stage executors
//!
//! This module provides the executor trait and implementations
//! for the stage actions (shell command, HTTP probe, notice).

mod notice;
mod probe;
mod shell;

pub use notice::NoticeExecutor;
pub use probe::ProbeExecutor;
pub use shell::{run_shell, ShellExecutor};

#[cfg(test)]
pub(crate) use probe::tests::serve_once as probe_test_server;

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::errors::StagehandError;
use crate::pipeline::Stage;

/// Result of stage execution
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Whether execution succeeded
    pub success: bool,

    /// Standard output
    pub stdout: String,

    /// Standard error
    pub stderr: String,

    /// Exit code
    pub exit_code: i32,

    /// Execution duration
    pub duration: Duration,
}

impl ExecutionResult {
    /// Create a successful result
    pub fn success(stdout: String, duration: Duration) -> Self {
        Self {
            success: true,
            stdout,
            stderr: String::new(),
            exit_code: 0,
            duration,
        }
    }

    /// Create a failed result
    pub fn failure(stderr: String, exit_code: i32, duration: Duration) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr,
            exit_code,
            duration,
        }
    }

    /// Stdout followed by stderr
    pub fn combined_output(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout.trim_end(), self.stderr),
        }
    }
}

/// Trait for stage executors
///
/// `Ok` with `success == false` is a failure the tool reported itself; `Err`
/// means the action could not be carried out at all.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Execute a stage
    ///
    /// # Arguments
    /// * `stage` - The stage configuration
    /// * `working_dir` - The working directory for execution
    /// * `env` - Environment variables, already merged for this stage
    async fn execute(
        &self,
        stage: &Stage,
        working_dir: &Path,
        env: &HashMap<String, String>,
    ) -> Result<ExecutionResult, StagehandError>;

    /// Check whether whatever the stage needs to launch is available
    async fn check_available(&self, stage: &Stage) -> Result<bool, StagehandError>;

    /// Validate stage configuration
    fn validate_stage(&self, stage: &Stage) -> Result<(), StagehandError>;
}

/// Create a standard executor setup with all built-in executors
pub fn create_default_executors() -> HashMap<String, Box<dyn Executor>> {
    let mut executors: HashMap<String, Box<dyn Executor>> = HashMap::new();

    executors.insert("shell".to_string(), Box::new(ShellExecutor::new()));
    executors.insert("probe".to_string(), Box::new(ProbeExecutor::new()));
    executors.insert("notice".to_string(), Box::new(NoticeExecutor::new()));

    executors
}
