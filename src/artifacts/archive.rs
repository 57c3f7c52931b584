// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Filesystem artifact archive
//!
//! Layout: `<archive_dir>/<build-id>/<relative source path>` plus a
//! `manifest.json` listing every archived file and its fingerprint.

use std::path::{Path, PathBuf};

use super::{fingerprint_file, ArchivedArtifact, ArchivedFile, ArtifactStatus};
use crate::errors::{StagehandError, StagehandResult};
use crate::pipeline::ArtifactSpec;

/// Manifest file name inside a build directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// Copies matched artifacts into the archive
pub struct ArtifactArchiver {
    /// Archive root directory
    archive_dir: PathBuf,
    /// Base directory for resolving patterns
    run_dir: PathBuf,
}

impl ArtifactArchiver {
    /// Create an archiver; nothing is created on disk until something is archived
    pub fn new(archive_dir: PathBuf, run_dir: PathBuf) -> Self {
        Self { archive_dir, run_dir }
    }

    /// Directory holding one build's artifacts and report
    pub fn build_dir(&self, build_id: u64) -> PathBuf {
        self.archive_dir.join(build_id.to_string())
    }

    /// Archive every artifact pattern; never fails as a whole
    pub async fn archive(&self, specs: &[ArtifactSpec], build_id: u64) -> Vec<ArchivedArtifact> {
        let mut results = Vec::with_capacity(specs.len());

        for spec in specs {
            let result = self.archive_pattern(&spec.pattern, build_id).await;

            match result.status {
                ArtifactStatus::Archived => tracing::info!(
                    pattern = %spec.pattern,
                    files = result.files.len(),
                    "archived artifacts"
                ),
                ArtifactStatus::Skipped => {
                    tracing::info!(pattern = %spec.pattern, "no files matched, skipping")
                }
                ArtifactStatus::Failed => tracing::warn!(
                    pattern = %spec.pattern,
                    error = result.error.as_deref().unwrap_or_default(),
                    "archiving failed"
                ),
            }

            results.push(result);
        }

        if results.iter().any(|r| !r.files.is_empty()) {
            if let Err(e) = self.write_manifest(&results, build_id).await {
                tracing::warn!(error = %e, "failed to write artifact manifest");
            }
        }

        results
    }

    async fn archive_pattern(&self, pattern: &str, build_id: u64) -> ArchivedArtifact {
        let matches = match self.resolve(pattern) {
            Ok(m) => m,
            Err(e) => return ArchivedArtifact::failed(pattern, vec![], e.to_string()),
        };

        if matches.is_empty() {
            return ArchivedArtifact::skipped(pattern);
        }

        let build_dir = self.build_dir(build_id);
        let mut files = Vec::with_capacity(matches.len());

        for source in matches {
            match self.copy_one(&source, &build_dir).await {
                Ok(file) => files.push(file),
                Err(e) => return ArchivedArtifact::failed(pattern, files, e.to_string()),
            }
        }

        ArchivedArtifact {
            pattern: pattern.to_string(),
            status: ArtifactStatus::Archived,
            files,
            error: None,
        }
    }

    /// Files matching a pattern, sorted
    ///
    /// Anything already inside the archive is never matched again.
    fn resolve(&self, pattern: &str) -> StagehandResult<Vec<PathBuf>> {
        let full_pattern = if Path::new(pattern).is_absolute() {
            pattern.to_string()
        } else {
            self.run_dir.join(pattern).to_string_lossy().to_string()
        };

        // A missing archive dir cannot contain matches
        let archive_root = self.archive_dir.canonicalize().ok();
        let in_archive = |path: &Path| match (&archive_root, path.canonicalize()) {
            (Some(root), Ok(path)) => path.starts_with(root),
            _ => false,
        };

        let mut files: Vec<PathBuf> = glob::glob(&full_pattern)?
            .filter_map(Result::ok)
            .filter(|p| p.is_file() && !in_archive(p))
            .collect();

        files.sort();
        Ok(files)
    }

    async fn copy_one(&self, source: &Path, build_dir: &Path) -> StagehandResult<ArchivedFile> {
        let relative = match source.strip_prefix(&self.run_dir) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => PathBuf::from(source.file_name().unwrap_or(source.as_os_str())),
        };
        let destination = build_dir.join(&relative);

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StagehandError::ArtifactError {
                    message: format!("Failed to create '{}': {}", parent.display(), e),
                }
            })?;
        }

        let size_bytes = tokio::fs::copy(source, &destination).await.map_err(|e| {
            StagehandError::ArtifactError {
                message: format!("Failed to copy '{}': {}", source.display(), e),
            }
        })?;

        Ok(ArchivedFile {
            source: relative,
            fingerprint: fingerprint_file(&destination).await?,
            destination,
            size_bytes,
        })
    }

    async fn write_manifest(
        &self,
        results: &[ArchivedArtifact],
        build_id: u64,
    ) -> StagehandResult<()> {
        let path = self.build_dir(build_id).join(MANIFEST_FILE);
        let files: Vec<&ArchivedFile> = results.iter().flat_map(|r| r.files.iter()).collect();
        let json = serde_json::to_string_pretty(&files)?;

        tokio::fs::write(&path, json)
            .await
            .map_err(|e| StagehandError::FileWriteError {
                path,
                error: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn spec(pattern: &str) -> ArtifactSpec {
        ArtifactSpec {
            pattern: pattern.into(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_missing_report_is_skipped() {
        let run = TempDir::new().unwrap();
        let archiver = ArtifactArchiver::new(run.path().join("archive"), run.path().to_path_buf());

        let results = archiver.archive(&[spec("app/test-results.xml")], 1).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, ArtifactStatus::Skipped);
        assert!(results[0].error.is_none());
        assert!(!archiver.build_dir(1).exists());
    }

    #[tokio::test]
    async fn test_archives_and_fingerprints_matches() {
        let run = TempDir::new().unwrap();
        std::fs::create_dir_all(run.path().join("app/coverage")).unwrap();
        std::fs::write(run.path().join("app/test-results.xml"), "<testsuites/>").unwrap();
        std::fs::write(run.path().join("app/coverage/lcov.info"), "TN:").unwrap();

        let archiver = ArtifactArchiver::new(run.path().join("archive"), run.path().to_path_buf());
        let results = archiver
            .archive(&[spec("app/test-results.xml"), spec("app/coverage/*")], 5)
            .await;

        assert!(results.iter().all(|r| r.status == ArtifactStatus::Archived));

        let copied = archiver.build_dir(5).join("app/test-results.xml");
        assert!(copied.exists());
        assert_eq!(
            results[0].files[0].fingerprint,
            super::super::fingerprint_bytes(b"<testsuites/>")
        );

        let manifest = std::fs::read_to_string(archiver.build_dir(5).join(MANIFEST_FILE)).unwrap();
        assert!(manifest.contains("lcov.info"));
    }

    #[tokio::test]
    async fn test_recursive_pattern_skips_earlier_builds() {
        let run = TempDir::new().unwrap();
        std::fs::create_dir_all(run.path().join("r")).unwrap();
        std::fs::write(run.path().join("r/a.xml"), "<testsuites/>").unwrap();

        // Default layout: the archive lives inside the run directory
        let archiver = ArtifactArchiver::new(
            run.path().join(".stagehand/archive"),
            run.path().to_path_buf(),
        );

        for build_id in 1..=3 {
            let results = archiver.archive(&[spec("**/*.xml")], build_id).await;
            assert_eq!(results[0].files.len(), 1, "build {build_id}");
            assert_eq!(results[0].files[0].source, PathBuf::from("r/a.xml"));
        }

        assert!(!archiver
            .build_dir(2)
            .join(".stagehand/archive/1/r/a.xml")
            .exists());
    }

    #[tokio::test]
    async fn test_bad_pattern_fails_without_panicking() {
        let run = TempDir::new().unwrap();
        let archiver = ArtifactArchiver::new(run.path().join("archive"), run.path().to_path_buf());

        let results = archiver.archive(&[spec("reports/[")], 1).await;

        assert_eq!(results[0].status, ArtifactStatus::Failed);
    }
}
