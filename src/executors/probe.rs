// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! HTTP health probe executor
//!
//! GETs a URL and passes when the response body contains an expected marker.
//! The status code is reported but does not decide the result.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};

use super::{ExecutionResult, Executor};
use crate::errors::StagehandError;
use crate::pipeline::{expand_vars, Action, Stage};

/// Probe executor
pub struct ProbeExecutor {
    client: reqwest::Client,
}

impl ProbeExecutor {
    /// Create a new probe executor
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// GET `url` and check the body for `expect`
    pub async fn probe(
        &self,
        url: &str,
        expect: &str,
        timeout: Duration,
    ) -> Result<ExecutionResult, StagehandError> {
        let start = Instant::now();

        let probe_failed = |e: reqwest::Error| StagehandError::ProbeFailed {
            url: url.to_string(),
            error: e.to_string(),
        };

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(probe_failed)?;
        let status = response.status();
        let body = response.text().await.map_err(probe_failed)?;

        let duration = start.elapsed();

        if body.contains(expect) {
            Ok(ExecutionResult::success(
                format!("HTTP {}: response contains '{}'", status.as_u16(), expect),
                duration,
            ))
        } else {
            let snippet: String = body.chars().take(200).collect();
            Ok(ExecutionResult::failure(
                format!(
                    "HTTP {}: response does not contain '{}'\n{}",
                    status.as_u16(),
                    expect,
                    snippet
                ),
                1,
                duration,
            ))
        }
    }
}

impl Default for ProbeExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Executor for ProbeExecutor {
    async fn execute(
        &self,
        stage: &Stage,
        _working_dir: &Path,
        env: &HashMap<String, String>,
    ) -> Result<ExecutionResult, StagehandError> {
        let Action::Probe {
            url,
            expect,
            timeout_secs,
        } = &stage.action
        else {
            return Err(StagehandError::InvalidStage {
                stage: stage.name.clone(),
                reason: "Expected Probe action".to_string(),
            });
        };

        let url = expand_vars(url, env);
        tracing::debug!(stage = %stage.name, %url, "probing");

        self.probe(&url, expect, Duration::from_secs(*timeout_secs))
            .await
    }

    async fn check_available(&self, _stage: &Stage) -> Result<bool, StagehandError> {
        Ok(true)
    }

    fn validate_stage(&self, stage: &Stage) -> Result<(), StagehandError> {
        let Action::Probe { url, expect, .. } = &stage.action else {
            return Err(StagehandError::InvalidStage {
                stage: stage.name.clone(),
                reason: "Not a Probe stage".to_string(),
            });
        };

        if !(url.starts_with("http://") || url.starts_with("https://") || url.starts_with("${")) {
            return Err(StagehandError::InvalidStage {
                stage: stage.name.clone(),
                reason: format!("Probe URL '{}' must be http:// or https://", url),
            });
        }

        if expect.is_empty() {
            return Err(StagehandError::InvalidStage {
                stage: stage.name.clone(),
                reason: "Probe marker 'expect' is empty".to_string(),
            });
        }

        Ok(())
    }
}
