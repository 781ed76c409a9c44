// SPDX-License-Identifier: GPL-3.0-only

//! Media data model and metadata handling
//!
//! Edit results arrive from the editing pipeline as [`ExportItem`]s holding
//! in-memory images or references to already-recorded video files. The
//! archiver turns each one into a [`Media`] value that only references
//! persisted locations.
//!
//! # Modules
//!
//! - [`types`]: Export items, archived media and the metadata bundle
//! - [`metadata`]: Embedding the metadata bundle into JPEG files

pub mod metadata;
pub mod types;

// Re-export commonly used types
pub use metadata::{embed_info, embed_info_in_file, read_info, read_info_from_file};
pub use types::{ExportAsset, ExportItem, Media, MediaInfo, VideoAsset};
