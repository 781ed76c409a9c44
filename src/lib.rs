// SPDX-License-Identifier: GPL-3.0-only

//! Camera Archive - persists edited camera photos and videos
//!
//! This library takes the edit results produced by the camera's editing
//! screens (filters, stickers, crops) and archives them to disk
//! concurrently, reporting one ordered outcome per input slot.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`media`]: Export items, archived media and metadata embedding
//! - [`pipelines`]: The concurrent batch archiver
//! - [`config`]: Archiver configuration
//! - [`storage`]: Listing archived files
//! - [`errors`]: Error types
//!
//! # Example
//!
//! ```ignore
//! let archiver = BatchArchiver::new(&Config::default())?;
//! let outcomes = archiver
//!     .archive_all(vec![Some(ExportItem::image(edited, original, info)), None])
//!     .await?;
//! ```

pub mod config;
pub mod constants;
pub mod errors;
pub mod media;
pub mod pipelines;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use errors::{AppError, AppResult, ArchiveError};
pub use media::{ExportAsset, ExportItem, Media, MediaInfo, VideoAsset};
pub use pipelines::archive::{
    ArchiveOutcome, ArchiveSummary, BatchArchiver, CancelFlag, ImageSink, JpegFileSink,
};
