// SPDX-License-Identifier: GPL-3.0-only

//! Per-item persistence
//!
//! Images are written twice: the edited image through the edited sink and
//! the original through the original sink. Both writes must succeed for the
//! item to be archived. Videos are already on disk and are wrapped as-is.

use super::cancel::CancelFlag;
use super::encoding::discard;
use super::sink::ImageSink;
use crate::errors::ArchiveError;
use crate::media::{ExportAsset, ExportItem, Media, MediaInfo, VideoAsset};
use image::DynamicImage;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Persists single export items through a pair of sinks
#[derive(Clone)]
pub struct ItemPersister {
    edited_sink: Arc<dyn ImageSink>,
    original_sink: Arc<dyn ImageSink>,
}

impl ItemPersister {
    pub fn new(edited_sink: Arc<dyn ImageSink>, original_sink: Arc<dyn ImageSink>) -> Self {
        Self {
            edited_sink,
            original_sink,
        }
    }

    pub(crate) fn sinks(&self) -> [&dyn ImageSink; 2] {
        [self.edited_sink.as_ref(), self.original_sink.as_ref()]
    }

    /// Persist one item, dispatching to the kind-specific routine
    pub async fn persist(&self, item: ExportItem, cancel: &CancelFlag) -> Result<Media, ArchiveError> {
        cancel.check()?;

        match (item.result, item.original) {
            (ExportAsset::Image(edited), ExportAsset::Image(original)) => {
                self.persist_image(edited, original, item.info, cancel).await
            }
            (ExportAsset::Video(edited), ExportAsset::Video(original)) => {
                Ok(Self::wrap_video(edited, original, item.info))
            }
            (result, original) => {
                warn!(
                    result = result.kind(),
                    original = original.kind(),
                    "Export item has mismatched asset kinds"
                );
                Err(ArchiveError::KindMismatch {
                    result: result.kind(),
                    original: original.kind(),
                })
            }
        }
    }

    /// Image save: edited first, then original, each on the blocking pool
    ///
    /// If the original cannot be written (error, cancellation or a panicking
    /// sink), the edited file is removed so no half-archived item is left behind.
    async fn persist_image(
        &self,
        edited: Arc<DynamicImage>,
        original: Arc<DynamicImage>,
        info: MediaInfo,
        cancel: &CancelFlag,
    ) -> Result<Media, ArchiveError> {
        let edited_path = Self::write(&self.edited_sink, edited, &info, cancel).await?;

        let original_path = match Self::write(&self.original_sink, original, &info, cancel).await {
            Ok(path) => path,
            Err(e) => {
                debug!(path = %edited_path.display(), error = %e, "Dropping edited image");
                let path = edited_path.clone();
                if let Err(join) = tokio::task::spawn_blocking(move || discard(&path)).await {
                    warn!(path = %edited_path.display(), error = %join, "Failed to drop edited image");
                }
                return Err(e);
            }
        };

        Ok(Media::Image {
            edited: edited_path,
            original: original_path,
            info,
        })
    }

    /// Run one sink write on the blocking pool; a panicking sink becomes `TaskAborted`
    async fn write(
        sink: &Arc<dyn ImageSink>,
        image: Arc<DynamicImage>,
        info: &MediaInfo,
        cancel: &CancelFlag,
    ) -> Result<PathBuf, ArchiveError> {
        let sink = Arc::clone(sink);
        let info = info.clone();
        let cancel = cancel.clone();
        tokio::task::spawn_blocking(move || {
            cancel.check()?;
            sink.persist(&image, &info)
        })
        .await?
    }

    fn wrap_video(edited: PathBuf, original: PathBuf, info: MediaInfo) -> Media {
        debug!(path = %edited.display(), "Wrapping edited video");
        Media::Video {
            asset: VideoAsset::new(edited),
            original,
            info,
        }
    }
}
