// SPDX-License-Identifier: GPL-3.0-only

//! Storage utilities for archived files

use crate::constants::ARCHIVE_IMAGE_EXTENSION;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Local};
use std::path::PathBuf;
use tracing::debug;

/// An archived file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedFile {
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
}

/// List archived images in a directory, newest first
///
/// Scans `dir` for files with the archive image extension. Runs the scan on
/// the blocking pool.
pub async fn list_archived_images(dir: PathBuf) -> AppResult<Vec<ArchivedFile>> {
    let scan_dir = dir.clone();
    let mut files = tokio::task::spawn_blocking(move || -> AppResult<Vec<ArchivedFile>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&scan_dir)?.flatten() {
            let path = entry.path();
            let is_archive = path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(ARCHIVE_IMAGE_EXTENSION));
            if !is_archive {
                continue;
            }

            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }

            files.push(ArchivedFile {
                path,
                size: metadata.len(),
                modified: metadata.modified().ok().map(DateTime::<Local>::from),
            });
        }
        Ok(files)
    })
    .await
    .map_err(|e| AppError::Storage(format!("Scan task error: {}", e)))??;

    // Newest first; files without a timestamp go last
    files.sort_by_key(|f| std::cmp::Reverse(f.modified));

    debug!(dir = %dir.display(), count = files.len(), "Listed archived images");
    Ok(files)
}
