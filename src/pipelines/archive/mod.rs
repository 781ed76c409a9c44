// SPDX-License-Identifier: GPL-3.0-only

//! Concurrent batch archiving of edit results
//!
//! ```text
//! [item 0, None, item 2, ...]
//!     │            │
//!     ▼            ▼
//!  spawn task   spawn task      (one task per non-empty slot, owned by a JoinSet)
//!     │            │
//!     └──(index, outcome)──▶ channel ──▶ collect N ──▶ sort by index
//! ```
//!
//! # Guarantees
//!
//! - One outcome per input slot, in input order, whatever order the saves
//!   finish in
//! - An item's failure is reported in its own slot and never affects siblings
//! - Completed work is never discarded; the only batch-wide error is a
//!   missing destination directory, detected before anything is dispatched
//! - Dropping the `archive_all` future aborts its pending tasks; a write
//!   already running on the blocking pool still finishes

pub mod cancel;
pub mod encoding;
pub mod persist;
pub mod sink;
pub mod summary;

pub use cancel::CancelFlag;
pub use encoding::{ArchiveEncoder, EncodedImage};
pub use persist::ItemPersister;
pub use sink::{ImageSink, JpegFileSink};
pub use summary::ArchiveSummary;

use crate::config::Config;
use crate::errors::{AppResult, ArchiveError};
use crate::media::{ExportAsset, ExportItem, Media};
use futures::StreamExt;
use futures::channel::mpsc;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Result of archiving one input slot
#[derive(Debug, Clone, PartialEq)]
pub enum ArchiveOutcome {
    /// The item was persisted
    Archived(Media),
    /// The input slot held no item; nothing was saved
    Empty,
    /// The item could not be persisted
    Failed(ArchiveError),
}

impl ArchiveOutcome {
    pub fn media(&self) -> Option<&Media> {
        match self {
            ArchiveOutcome::Archived(media) => Some(media),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ArchiveError> {
        match self {
            ArchiveOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_archived(&self) -> bool {
        matches!(self, ArchiveOutcome::Archived(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ArchiveOutcome::Empty)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ArchiveOutcome::Failed(_))
    }
}

impl From<Result<Media, ArchiveError>> for ArchiveOutcome {
    fn from(result: Result<Media, ArchiveError>) -> Self {
        match result {
            Ok(media) => ArchiveOutcome::Archived(media),
            Err(err) => ArchiveOutcome::Failed(err),
        }
    }
}

/// Persists batches of edit results concurrently
///
/// Edited images go to the edited sink (the temp directory by default),
/// originals to the original sink (the configured save directory).
pub struct BatchArchiver {
    persister: ItemPersister,
    limiter: Option<Arc<Semaphore>>,
    cancel: CancelFlag,
}

impl BatchArchiver {
    /// Build an archiver writing JPEG files into the configured directories
    ///
    /// # Arguments
    /// * `config` - Validated archiver configuration
    ///
    /// # Returns
    /// * `Ok(BatchArchiver)` - Archiver ready to use
    /// * `Err(AppError)` - Invalid configuration or directories could not be created
    pub fn new(config: &Config) -> AppResult<Self> {
        config.validate()?;

        if config.create_dirs {
            std::fs::create_dir_all(&config.save_dir)?;
            std::fs::create_dir_all(&config.temp_dir)?;
        }

        let encoder = ArchiveEncoder::with_quality(config.jpeg_quality);
        let archiver = Self::with_sinks(
            Arc::new(JpegFileSink::new(&config.temp_dir, encoder)),
            Arc::new(JpegFileSink::new(&config.save_dir, encoder)),
        );

        info!(
            save_dir = %config.save_dir.display(),
            temp_dir = %config.temp_dir.display(),
            quality = config.jpeg_quality,
            max_concurrent = ?config.max_concurrent_saves,
            "Archiver configured"
        );

        Ok(match config.max_concurrent_saves {
            Some(limit) => archiver.with_max_concurrent(limit),
            None => archiver,
        })
    }

    /// Build an archiver over arbitrary sinks
    pub fn with_sinks(edited_sink: Arc<dyn ImageSink>, original_sink: Arc<dyn ImageSink>) -> Self {
        Self {
            persister: ItemPersister::new(edited_sink, original_sink),
            limiter: None,
            cancel: CancelFlag::new(),
        }
    }

    /// Bound the number of items saved at once
    ///
    /// The limit is clamped to `1..=Semaphore::MAX_PERMITS`.
    pub fn with_max_concurrent(mut self, limit: usize) -> Self {
        let limit = limit.clamp(1, Semaphore::MAX_PERMITS);
        self.limiter = Some(Arc::new(Semaphore::new(limit)));
        self
    }

    /// Share an externally owned cancellation flag
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Flag that cancels in-flight and pending saves when set
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Archive a batch of optional export items
    ///
    /// Every non-empty slot is saved on its own task; empty slots produce
    /// [`ArchiveOutcome::Empty`] without dispatching work. Completes once all
    /// tasks have reported.
    ///
    /// The tasks belong to this call: if the returned future is dropped before
    /// it completes, items not yet saved are aborted and report nothing.
    ///
    /// # Returns
    /// * `Ok(Vec<ArchiveOutcome>)` - One outcome per slot, in input order
    /// * `Err(ArchiveError::DestinationUnavailable)` - A sink directory is missing;
    ///   nothing was dispatched
    pub async fn archive_all(
        &self,
        items: Vec<Option<ExportItem>>,
    ) -> Result<Vec<ArchiveOutcome>, ArchiveError> {
        let total = items.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        if items.iter().flatten().any(has_image) {
            self.check_destinations()?;
        }

        let (sender, receiver) = mpsc::unbounded::<(usize, ArchiveOutcome)>();
        let mut tasks = JoinSet::new();

        for (index, slot) in items.into_iter().enumerate() {
            let Some(item) = slot else {
                let _ = sender.unbounded_send((index, ArchiveOutcome::Empty));
                continue;
            };

            let sender = sender.clone();
            let persister = self.persister.clone();
            let limiter = self.limiter.clone();
            let cancel = self.cancel.clone();

            tasks.spawn(async move {
                let outcome: ArchiveOutcome = match acquire(limiter).await {
                    Ok(_permit) => persister.persist(item, &cancel).await.into(),
                    Err(e) => ArchiveOutcome::Failed(e),
                };

                if let ArchiveOutcome::Failed(e) = &outcome {
                    warn!(index, error = %e, "Export item not archived");
                }

                // Receiver only goes away if the caller stopped waiting
                let _ = sender.unbounded_send((index, outcome));
            });
        }

        debug!(total, dispatched = tasks.len(), "Archive tasks dispatched");

        // Channel closes once every task has sent or died
        drop(sender);
        let mut tagged: Vec<(usize, ArchiveOutcome)> = receiver.collect().await;
        tagged.sort_by_key(|(index, _)| *index);

        // Every task has finished; reap them so panics are logged
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Archive task panicked");
            }
        }

        let mut tagged = tagged.into_iter().peekable();
        let outcomes: Vec<ArchiveOutcome> = (0..total)
            .map(|index| match tagged.next_if(|(i, _)| *i == index) {
                Some((_, outcome)) => outcome,
                None => {
                    error!(index, "Archive task ended without reporting");
                    ArchiveOutcome::Failed(ArchiveError::TaskAborted(
                        "task ended without reporting".to_string(),
                    ))
                }
            })
            .collect();

        let summary = ArchiveSummary::from_outcomes(&outcomes);
        info!(
            total,
            archived = summary.archived,
            empty = summary.empty,
            failed = summary.failed,
            "Batch archived"
        );

        Ok(outcomes)
    }

    fn check_destinations(&self) -> Result<(), ArchiveError> {
        for sink in self.persister.sinks() {
            if let Some(dir) = sink.destination()
                && !dir.is_dir()
            {
                error!(dir = %dir.display(), "Archive destination unavailable");
                return Err(ArchiveError::DestinationUnavailable(dir.to_path_buf()));
            }
        }
        Ok(())
    }
}

fn has_image(item: &ExportItem) -> bool {
    matches!(item.result, ExportAsset::Image(_)) || matches!(item.original, ExportAsset::Image(_))
}

async fn acquire(
    limiter: Option<Arc<Semaphore>>,
) -> Result<Option<OwnedSemaphorePermit>, ArchiveError> {
    match limiter {
        Some(limiter) => limiter
            .acquire_owned()
            .await
            .map(Some)
            .map_err(|e| ArchiveError::TaskAborted(e.to_string())),
        None => Ok(None),
    }
}
