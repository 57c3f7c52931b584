// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Build number counter
//!
//! Persists the last issued build number so every run gets a larger one,
//! which release image tags (`name:prod-<build-id>`) rely on.

use std::path::{Path, PathBuf};

use crate::errors::StagehandError;

/// File-backed monotonically increasing counter
pub struct BuildCounter {
    path: PathBuf,
}

impl BuildCounter {
    /// Counter stored at `path`
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Counter in the default location under `base_dir`
    pub fn default_counter(base_dir: &Path) -> Self {
        Self::new(base_dir.join(".stagehand").join("build-id"))
    }

    /// Last issued build number, 0 if none
    pub fn current(&self) -> Result<u64, StagehandError> {
        if !self.path.exists() {
            return Ok(0);
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            StagehandError::FileReadError {
                path: self.path.clone(),
                error: e.to_string(),
            }
        })?;

        content.trim().parse().map_err(|_| StagehandError::BuildCounter {
            message: format!(
                "'{}' does not contain a build number: {:?}",
                self.path.display(),
                content.trim()
            ),
        })
    }

    /// Issue the next build number and persist it
    pub fn next(&self) -> Result<u64, StagehandError> {
        let next = self.current()? + 1;
        self.record(next)?;
        Ok(next)
    }

    /// Remember an externally supplied build number if it is ahead of ours
    pub fn observe(&self, build_id: u64) -> Result<(), StagehandError> {
        if build_id > self.current()? {
            self.record(build_id)?;
        }
        Ok(())
    }

    fn record(&self, value: u64) -> Result<(), StagehandError> {
        let write_error = |e: std::io::Error| StagehandError::FileWriteError {
            path: self.path.clone(),
            error: e.to_string(),
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        std::fs::write(&self.path, format!("{}\n", value)).map_err(write_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_counter_increments_across_instances() {
        let dir = TempDir::new().unwrap();

        assert_eq!(BuildCounter::default_counter(dir.path()).next().unwrap(), 1);
        assert_eq!(BuildCounter::default_counter(dir.path()).next().unwrap(), 2);
        assert_eq!(BuildCounter::default_counter(dir.path()).current().unwrap(), 2);
    }

    #[test]
    fn test_observe_only_moves_forward() {
        let dir = TempDir::new().unwrap();
        let counter = BuildCounter::default_counter(dir.path());

        counter.observe(40).unwrap();
        counter.observe(3).unwrap();
        assert_eq!(counter.next().unwrap(), 41);
    }

    #[test]
    fn test_corrupt_counter_is_reported() {
        let dir = TempDir::new().unwrap();
        let counter = BuildCounter::new(dir.path().join("id"));
        std::fs::write(dir.path().join("id"), "banana").unwrap();

        assert!(matches!(
            counter.next(),
            Err(StagehandError::BuildCounter { .. })
        ));
    }
}
