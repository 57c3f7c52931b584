// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Notice executor
//!
//! Informational stages: prints lines, never calls out, never fails.

use async_trait::async_trait;
use colored::Colorize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use super::{ExecutionResult, Executor};
use crate::errors::StagehandError;
use crate::pipeline::{expand_vars, Action, Stage};

/// Notice executor
pub struct NoticeExecutor;

impl NoticeExecutor {
    /// Create a new notice executor
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoticeExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Executor for NoticeExecutor {
    async fn execute(
        &self,
        stage: &Stage,
        _working_dir: &Path,
        env: &HashMap<String, String>,
    ) -> Result<ExecutionResult, StagehandError> {
        let Action::Notice { lines } = &stage.action else {
            return Err(StagehandError::InvalidStage {
                stage: stage.name.clone(),
                reason: "Expected Notice action".to_string(),
            });
        };

        let start = Instant::now();
        let rendered: Vec<String> = lines.iter().map(|line| expand_vars(line, env)).collect();

        for line in &rendered {
            println!("    {}", line.dimmed());
        }

        Ok(ExecutionResult::success(rendered.join("\n"), start.elapsed()))
    }

    async fn check_available(&self, _stage: &Stage) -> Result<bool, StagehandError> {
        Ok(true)
    }

    fn validate_stage(&self, stage: &Stage) -> Result<(), StagehandError> {
        match &stage.action {
            Action::Notice { lines } if lines.is_empty() => Err(StagehandError::InvalidStage {
                stage: stage.name.clone(),
                reason: "Notice has no lines".to_string(),
            }),
            Action::Notice { .. } => Ok(()),
            _ => Err(StagehandError::InvalidStage {
                stage: stage.name.clone(),
                reason: "Not a Notice stage".to_string(),
            }),
        }
    }
}
