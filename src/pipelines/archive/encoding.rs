// SPDX-License-Identifier: GPL-3.0-only

//! JPEG encoding and file writing for archived images
//!
//! These are blocking operations; callers run them on the blocking pool.

use crate::constants::{ARCHIVE_IMAGE_EXTENSION, DEFAULT_JPEG_QUALITY};
use crate::errors::ArchiveError;
use image::DynamicImage;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Encoded image data ready for saving
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// JPEG encoder for archived images
#[derive(Debug, Clone, Copy)]
pub struct ArchiveEncoder {
    quality: u8,
}

impl ArchiveEncoder {
    /// Create a new encoder with maximum quality
    pub fn new() -> Self {
        Self {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Create an encoder with the given JPEG quality, clamped to 1-100
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode an image as JPEG
    ///
    /// Alpha is dropped; JPEG has no alpha channel.
    pub fn encode(&self, image: &DynamicImage) -> Result<EncodedImage, ArchiveError> {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, self.quality);

        encoder
            .encode(rgb.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .map_err(|e| ArchiveError::EncodingFailed(format!("JPEG encoding failed: {}", e)))?;

        debug!(width, height, size = buffer.len(), "Encoding complete");

        Ok(EncodedImage {
            data: buffer,
            width,
            height,
        })
    }

    /// Write encoded data to a freshly named file in `output_dir`
    ///
    /// The file name is a random UUID, and the file is created with
    /// create-new semantics so an existing file is never overwritten. A file
    /// left behind by a failed write is removed.
    pub fn save(&self, data: &[u8], output_dir: &Path) -> Result<PathBuf, ArchiveError> {
        let filename = format!("{}.{}", uuid::Uuid::new_v4(), ARCHIVE_IMAGE_EXTENSION);
        let filepath = output_dir.join(filename);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&filepath)
            .map_err(|e| {
                ArchiveError::SaveFailed(format!("{}: {}", filepath.display(), e))
            })?;

        if let Err(e) = file.write_all(data).and_then(|_| file.sync_all()) {
            drop(file);
            discard(&filepath);
            return Err(ArchiveError::SaveFailed(format!(
                "{}: {}",
                filepath.display(),
                e
            )));
        }

        info!(path = %filepath.display(), size = data.len(), "Image archived");
        Ok(filepath)
    }
}

impl Default for ArchiveEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Best-effort removal of an artifact that should not survive
pub(crate) fn discard(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        warn!(path = %path.display(), error = %e, "Failed to remove partial artifact");
    }
}
