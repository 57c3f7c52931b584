// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Artifact fingerprints
//!
//! Uses BLAKE3 so archived files from different builds can be told apart.

use blake3::Hasher;
use std::path::Path;
use tokio::io::AsyncReadExt;

use crate::errors::{StagehandError, StagehandResult};

/// Compute the fingerprint of a file, streaming its contents
pub async fn fingerprint_file(path: &Path) -> StagehandResult<String> {
    let read_error = |e: std::io::Error| StagehandError::FileReadError {
        path: path.to_path_buf(),
        error: e.to_string(),
    };

    let mut file = tokio::fs::File::open(path).await.map_err(read_error)?;
    let mut hasher = Hasher::new();
    let mut buf = vec![0u8; 64 * 1024];

    loop {
        let n = file.read(&mut buf).await.map_err(read_error)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}

/// Fingerprint of in-memory bytes
pub fn fingerprint_bytes(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_and_bytes_agree() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.xml");
        std::fs::write(&path, b"<testsuites/>").unwrap();

        assert_eq!(
            fingerprint_file(&path).await.unwrap(),
            fingerprint_bytes(b"<testsuites/>")
        );
    }

    #[test]
    fn test_distinct_content_distinct_fingerprint() {
        assert_ne!(fingerprint_bytes(b"build 1"), fingerprint_bytes(b"build 2"));
    }

    #[tokio::test]
    async fn test_missing_file_errors() {
        let dir = TempDir::new().unwrap();
        assert!(fingerprint_file(&dir.path().join("nope")).await.is_err());
    }
}
