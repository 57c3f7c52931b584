// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Shell executor
//!
//! Executes arbitrary shell commands.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;

use super::{ExecutionResult, Executor};
use crate::errors::StagehandError;
use crate::pipeline::{Action, Stage};

/// Run `<shell> -c <command>` and capture its output
///
/// A non-zero exit is an `Ok` failure result; only a spawn error is `Err`.
pub async fn run_shell(
    shell: &str,
    command: &str,
    working_dir: &Path,
    env: &HashMap<String, String>,
) -> Result<ExecutionResult, StagehandError> {
    let start = Instant::now();

    let mut cmd = Command::new(shell);
    cmd.arg("-c").arg(command);
    cmd.current_dir(working_dir);
    cmd.envs(env);
    cmd.stdin(Stdio::null());
    cmd.kill_on_drop(true);

    let output = cmd
        .output()
        .await
        .map_err(|e| StagehandError::launch_failed(shell, working_dir, &e))?;

    let duration = start.elapsed();
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    // Killed by a signal has no code
    let exit_code = output.status.code().unwrap_or(-1);

    Ok(ExecutionResult {
        success: output.status.success(),
        stdout,
        stderr,
        exit_code,
        duration,
    })
}

/// Shell executor
pub struct ShellExecutor;

impl ShellExecutor {
    /// Create a new shell executor
    pub fn new() -> Self {
        Self
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Executor for ShellExecutor {
    async fn execute(
        &self,
        stage: &Stage,
        working_dir: &Path,
        env: &HashMap<String, String>,
    ) -> Result<ExecutionResult, StagehandError> {
        let Action::Shell { command, shell } = &stage.action else {
            return Err(StagehandError::InvalidStage {
                stage: stage.name.clone(),
                reason: "Expected Shell action".to_string(),
            });
        };

        tracing::debug!(stage = %stage.name, %shell, dir = %working_dir.display(), "running shell command");

        run_shell(shell, command, working_dir, env).await
    }

    async fn check_available(&self, stage: &Stage) -> Result<bool, StagehandError> {
        let Action::Shell { shell, .. } = &stage.action else {
            return Ok(false);
        };

        Ok(which::which(shell).is_ok())
    }

    fn validate_stage(&self, stage: &Stage) -> Result<(), StagehandError> {
        let Action::Shell { command, shell } = &stage.action else {
            return Err(StagehandError::InvalidStage {
                stage: stage.name.clone(),
                reason: "Not a Shell stage".to_string(),
            });
        };

        if command.trim().is_empty() {
            return Err(StagehandError::InvalidStage {
                stage: stage.name.clone(),
                reason: "Shell command is empty".to_string(),
            });
        }

        if shell.trim().is_empty() {
            return Err(StagehandError::InvalidStage {
                stage: stage.name.clone(),
                reason: "Shell is empty".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_shell_stage(name: &str, command: &str) -> Stage {
        let mut stage = Stage::shell(name, command);
        stage.action = Action::Shell {
            command: command.into(),
            shell: "sh".into(),
        };
        stage
    }

    #[test]
    fn test_validate_shell_stage() {
        let executor = ShellExecutor::new();
        let stage = make_shell_stage("test", "echo hello");
        assert!(executor.validate_stage(&stage).is_ok());
    }

    #[test]
    fn test_validate_empty_command_fails() {
        let executor = ShellExecutor::new();
        let stage = make_shell_stage("test", "  ");
        assert!(executor.validate_stage(&stage).is_err());
    }

    #[tokio::test]
    async fn test_execute_simple_command() {
        let executor = ShellExecutor::new();
        let stage = make_shell_stage("test", "echo hello");

        let result = executor
            .execute(&stage, Path::new("."), &HashMap::new())
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.stdout.contains("hello"));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_reported_not_raised() {
        let executor = ShellExecutor::new();
        let stage = make_shell_stage("test", "echo broken >&2; exit 3");

        let result = executor
            .execute(&stage, Path::new("."), &HashMap::new())
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, 3);
        assert!(result.stderr.contains("broken"));
    }

    #[tokio::test]
    async fn test_env_is_passed_through() {
        let mut env = HashMap::new();
        env.insert("BUILD_ID".to_string(), "17".to_string());

        let result = run_shell("sh", "echo tag-$BUILD_ID", Path::new("."), &env)
            .await
            .unwrap();

        assert!(result.stdout.contains("tag-17"));
    }

    #[tokio::test]
    async fn test_missing_shell_is_a_fault() {
        let err = run_shell(
            "stagehand-no-such-shell",
            "true",
            Path::new("."),
            &HashMap::new(),
        )
        .await
        .unwrap_err();

        match err {
            StagehandError::ToolExecutionFailed { help, .. } => {
                assert!(help.unwrap().contains("PATH"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_working_dir_blames_the_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let workspace = dir.path().join("juice-shop");

        let err = run_shell("sh", "true", &workspace, &HashMap::new())
            .await
            .unwrap_err();

        match err {
            StagehandError::ToolExecutionFailed { tool, help, .. } => {
                assert_eq!(tool, "sh");
                let help = help.unwrap();
                assert!(help.contains("does not exist"));
                assert!(!help.contains("PATH"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
