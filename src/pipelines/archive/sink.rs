// SPDX-License-Identifier: GPL-3.0-only

//! Persistence sinks for archived images

use super::encoding::ArchiveEncoder;
use crate::errors::ArchiveError;
use crate::media::{MediaInfo, embed_info};
use image::DynamicImage;
use std::path::{Path, PathBuf};

/// Destination that turns an in-memory image into a persisted file
///
/// `persist` is blocking and is always called from the blocking pool.
/// Implementations must be safe to call concurrently; each call must write
/// to its own location.
pub trait ImageSink: Send + Sync {
    /// Persist `image` with `info` embedded, returning the written location
    fn persist(&self, image: &DynamicImage, info: &MediaInfo) -> Result<PathBuf, ArchiveError>;

    /// Directory this sink writes into, checked before a batch is dispatched
    fn destination(&self) -> Option<&Path> {
        None
    }
}

/// Writes JPEG files with embedded metadata into a directory
#[derive(Debug, Clone)]
pub struct JpegFileSink {
    dir: PathBuf,
    encoder: ArchiveEncoder,
}

impl JpegFileSink {
    pub fn new(dir: impl Into<PathBuf>, encoder: ArchiveEncoder) -> Self {
        Self {
            dir: dir.into(),
            encoder,
        }
    }
}

impl ImageSink for JpegFileSink {
    fn persist(&self, image: &DynamicImage, info: &MediaInfo) -> Result<PathBuf, ArchiveError> {
        let encoded = self.encoder.encode(image)?;
        let data = embed_info(&encoded.data, info)?;
        self.encoder.save(&data, &self.dir)
    }

    fn destination(&self) -> Option<&Path> {
        Some(&self.dir)
    }
}
