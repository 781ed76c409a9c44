// SPDX-License-Identifier: GPL-3.0-only

//! Metadata embedding for archived JPEG files
//!
//! The [`MediaInfo`] bundle is stored as JSON inside a JPEG comment (COM)
//! segment placed directly after the start-of-image marker. The payload is
//! prefixed with [`METADATA_TAG`] so comments written by other tools are
//! left alone when reading.

use super::types::MediaInfo;
use crate::constants::METADATA_TAG;
use crate::errors::ArchiveError;
use std::path::Path;
use tracing::debug;

const MARKER_PREFIX: u8 = 0xFF;
const SOI: u8 = 0xD8;
const EOI: u8 = 0xD9;
const SOS: u8 = 0xDA;
const COM: u8 = 0xFE;

/// Largest payload a single segment can hold (length field includes itself)
const MAX_SEGMENT_PAYLOAD: usize = u16::MAX as usize - 2;

/// Return a copy of `jpeg` with `info` embedded in a comment segment
pub fn embed_info(jpeg: &[u8], info: &MediaInfo) -> Result<Vec<u8>, ArchiveError> {
    if !is_jpeg(jpeg) {
        return Err(ArchiveError::MetadataFailed(
            "not a JPEG stream".to_string(),
        ));
    }

    let json = serde_json::to_vec(info).map_err(|e| ArchiveError::MetadataFailed(e.to_string()))?;
    let payload_len = METADATA_TAG.len() + json.len();
    if payload_len > MAX_SEGMENT_PAYLOAD {
        return Err(ArchiveError::MetadataFailed(format!(
            "metadata is {} bytes, limit is {}",
            payload_len, MAX_SEGMENT_PAYLOAD
        )));
    }

    let segment_len = (payload_len + 2) as u16;
    let mut out = Vec::with_capacity(jpeg.len() + payload_len + 4);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[MARKER_PREFIX, COM]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(METADATA_TAG);
    out.extend_from_slice(&json);
    out.extend_from_slice(&jpeg[2..]);

    Ok(out)
}

/// Read the embedded metadata, if any, from a JPEG stream
///
/// Only the header segments are scanned; the search stops at the first
/// start-of-scan marker.
pub fn read_info(jpeg: &[u8]) -> Result<Option<MediaInfo>, ArchiveError> {
    if !is_jpeg(jpeg) {
        return Err(ArchiveError::MetadataFailed(
            "not a JPEG stream".to_string(),
        ));
    }

    let mut pos = 2;
    while pos + 1 < jpeg.len() {
        if jpeg[pos] != MARKER_PREFIX {
            return Err(ArchiveError::MetadataFailed(format!(
                "expected marker at offset {}",
                pos
            )));
        }

        let marker = jpeg[pos + 1];
        match marker {
            // Fill byte before a marker
            MARKER_PREFIX => {
                pos += 1;
                continue;
            }
            SOS | EOI => break,
            // Standalone markers carry no length
            0x01 | 0xD0..=0xD7 => {
                pos += 2;
                continue;
            }
            _ => {}
        }

        if pos + 4 > jpeg.len() {
            break;
        }
        let len = u16::from_be_bytes([jpeg[pos + 2], jpeg[pos + 3]]) as usize;
        if len < 2 || pos + 2 + len > jpeg.len() {
            return Err(ArchiveError::MetadataFailed(format!(
                "truncated segment at offset {}",
                pos
            )));
        }

        let data = &jpeg[pos + 4..pos + 2 + len];
        if marker == COM && let Some(json) = data.strip_prefix(METADATA_TAG) {
            let info = serde_json::from_slice(json)
                .map_err(|e| ArchiveError::MetadataFailed(e.to_string()))?;
            return Ok(Some(info));
        }

        pos += 2 + len;
    }

    Ok(None)
}

/// Embed `info` into the JPEG file at `path`, rewriting it in place
pub fn embed_info_in_file(path: &Path, info: &MediaInfo) -> Result<(), ArchiveError> {
    let bytes = std::fs::read(path)?;
    let updated = embed_info(&bytes, info)?;
    std::fs::write(path, updated)?;

    debug!(path = %path.display(), keys = info.len(), "Embedded metadata");
    Ok(())
}

/// Read embedded metadata from the JPEG file at `path`
pub fn read_info_from_file(path: &Path) -> Result<Option<MediaInfo>, ArchiveError> {
    let bytes = std::fs::read(path)?;
    read_info(&bytes)
}

fn is_jpeg(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0] == MARKER_PREFIX && bytes[1] == SOI
}
