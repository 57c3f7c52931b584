// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Stage results and the run report

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::{Duration, SystemTime};

use super::BuildOutcome;
use crate::artifacts::ArchivedArtifact;
use crate::errors::{StagehandError, StagehandResult};

/// How a stage ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageStatus {
    /// Exit code zero
    Ok,
    /// The tool ran and reported failure
    NonZero { exit_code: i32 },
    /// The action could not run to completion (launch error, timeout, connection error)
    Fault { message: String },
}

impl StageStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::NonZero { exit_code } => write!(f, "exit code {}", exit_code),
            Self::Fault { message } => write!(f, "fault: {}", message),
        }
    }
}

/// Result of one stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageResult {
    /// Stage name
    pub name: String,
    /// How it ended
    #[serde(flatten)]
    pub status: StageStatus,
    /// Tail of the captured output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Wall time including any readiness delay
    pub duration: Duration,
}

/// Result of one cleanup action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupResult {
    /// Cleanup action name
    pub name: String,
    /// Whether the teardown command succeeded
    pub success: bool,
    /// Failure detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything that happened in one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Pipeline name
    pub pipeline: String,
    /// Build number
    pub build_id: u64,
    /// Final outcome
    pub outcome: BuildOutcome,
    /// Stages that ran, in order
    pub stages: Vec<StageResult>,
    /// Stages not run because an earlier stage aborted the run
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
    /// Cleanup actions, in order
    pub cleanup: Vec<CleanupResult>,
    /// Archived artifacts
    pub artifacts: Vec<ArchivedArtifact>,
    /// Run start
    pub started_at: SystemTime,
    /// Total run time
    pub duration: Duration,
}

impl RunReport {
    /// Stages that did not succeed
    pub fn failed_stages(&self) -> impl Iterator<Item = &StageResult> {
        self.stages.iter().filter(|s| !s.status.is_ok())
    }

    /// Persist the report as pretty JSON
    pub async fn write_json(&self, path: &Path) -> StagehandResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StagehandError::FileWriteError {
                    path: parent.to_path_buf(),
                    error: e.to_string(),
                })?;
        }

        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| StagehandError::FileWriteError {
                path: path.to_path_buf(),
                error: e.to_string(),
            })
    }
}

/// Keep the last `limit` characters of `text`, or `None` if it is blank
pub fn truncate_output(text: &str, limit: usize) -> Option<String> {
    let text = text.trim_end();
    if text.trim().is_empty() {
        return None;
    }

    let total = text.chars().count();
    if total <= limit {
        return Some(text.to_string());
    }

    let dropped = total - limit;
    let tail: String = text.chars().skip(dropped).collect();
    Some(format!("[... {} characters truncated]\n{}", dropped, tail))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_tail() {
        let out = truncate_output("abcdefghij", 4).unwrap();
        assert!(out.ends_with("ghij"));
        assert!(out.contains("6 characters truncated"));
    }

    #[test]
    fn test_truncate_short_and_blank() {
        assert_eq!(truncate_output("ok\n", 10).as_deref(), Some("ok"));
        assert_eq!(truncate_output("  \n", 10), None);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let out = truncate_output("ééééé", 2).unwrap();
        assert!(out.ends_with("éé"));
    }

    #[test]
    fn test_status_serialization() {
        let result = StageResult {
            name: "test".into(),
            status: StageStatus::NonZero { exit_code: 3 },
            output: None,
            duration: Duration::from_millis(5),
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "non_zero");
        assert_eq!(json["exit_code"], 3);
    }

    #[tokio::test]
    async fn test_write_json_creates_build_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("archive/7/report.json");
        let report = RunReport {
            pipeline: "web".into(),
            build_id: 7,
            outcome: BuildOutcome::Unstable,
            stages: vec![],
            skipped: vec![],
            cleanup: vec![],
            artifacts: vec![],
            started_at: SystemTime::now(),
            duration: Duration::from_secs(1),
        };

        report.write_json(&path).await.unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["outcome"], "UNSTABLE");
        assert_eq!(json["build_id"], 7);
    }
}
