// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Artifact archiving
//!
//! After the stages and cleanup have run, files matching the pipeline's
//! artifact patterns are copied into a per-build archive directory and
//! fingerprinted. A pattern that matches nothing is skipped, not an error.

mod archive;
mod fingerprint;

pub use archive::ArtifactArchiver;
pub use fingerprint::{fingerprint_bytes, fingerprint_file};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What happened to one artifact pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactStatus {
    /// At least one file matched and every match was copied
    Archived,
    /// Nothing matched
    Skipped,
    /// A match could not be copied or the pattern was malformed
    Failed,
}

/// One archived file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivedFile {
    /// Path relative to the run directory
    pub source: PathBuf,
    /// Where the copy lives
    pub destination: PathBuf,
    /// Size in bytes
    pub size_bytes: u64,
    /// BLAKE3 fingerprint
    pub fingerprint: String,
}

/// Archive result for one artifact pattern
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivedArtifact {
    /// Pattern from the pipeline file
    pub pattern: String,
    /// Outcome
    pub status: ArtifactStatus,
    /// Copied files
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<ArchivedFile>,
    /// Failure detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ArchivedArtifact {
    fn skipped(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            status: ArtifactStatus::Skipped,
            files: vec![],
            error: None,
        }
    }

    fn failed(pattern: &str, files: Vec<ArchivedFile>, error: String) -> Self {
        Self {
            pattern: pattern.to_string(),
            status: ArtifactStatus::Failed,
            files,
            error: Some(error),
        }
    }
}
