// SPDX-License-Identifier: GPL-3.0-only

//! Processing pipelines for edited media
//!
//! Saving runs off the caller's task: each item of a batch is persisted on
//! its own tokio task and blocking encode/write work runs on the blocking
//! pool, so the UI side only awaits the final ordered result.
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌────────────────────┐
//! │ Edit results │ ──▶ │  Archive Pipeline │ ──▶ │ temp dir: edited   │
//! │ (image/video)│     │  - JPEG encoding  │     │ save dir: original │
//! │              │     │  - Metadata       │     │                    │
//! └──────────────┘     └───────────────────┘     └────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`archive`]: Concurrent batch archiver with ordered per-item outcomes

pub mod archive;
