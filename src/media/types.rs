// SPDX-License-Identifier: GPL-3.0-only

//! Export items and archived media

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Arbitrary metadata attached to an edit result and embedded into saved files
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaInfo(BTreeMap<String, Value>);

impl MediaInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for MediaInfo {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// One side of an edit result
#[derive(Debug, Clone)]
pub enum ExportAsset {
    /// Decoded image held in memory (shared, never mutated)
    Image(Arc<DynamicImage>),
    /// Location of an already-written video file
    Video(PathBuf),
}

impl ExportAsset {
    /// Short kind name used in logs and errors
    pub fn kind(&self) -> &'static str {
        match self {
            ExportAsset::Image(_) => "image",
            ExportAsset::Video(_) => "video",
        }
    }
}

/// One edit result awaiting persistence
///
/// The editing pipeline is expected to pair assets of the same kind, but a
/// mismatched pair can still be built and is reported as a failure when
/// archived.
#[derive(Debug, Clone)]
pub struct ExportItem {
    /// The edited asset
    pub result: ExportAsset,
    /// The asset before editing
    pub original: ExportAsset,
    /// Metadata embedded into archived images
    pub info: MediaInfo,
}

impl ExportItem {
    /// Image edit result
    pub fn image(edited: DynamicImage, original: DynamicImage, info: MediaInfo) -> Self {
        Self {
            result: ExportAsset::Image(Arc::new(edited)),
            original: ExportAsset::Image(Arc::new(original)),
            info,
        }
    }

    /// Video edit result referencing files already on disk
    pub fn video(edited: impl Into<PathBuf>, original: impl Into<PathBuf>, info: MediaInfo) -> Self {
        Self {
            result: ExportAsset::Video(edited.into()),
            original: ExportAsset::Video(original.into()),
            info,
        }
    }
}

/// Reference to an edited video file, used in place of re-encoding it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoAsset {
    pub path: PathBuf,
}

impl VideoAsset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// An archived edit result, referencing persisted files only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Media {
    Image {
        edited: PathBuf,
        original: PathBuf,
        info: MediaInfo,
    },
    Video {
        asset: VideoAsset,
        original: PathBuf,
        info: MediaInfo,
    },
}

impl Media {
    /// Location of the edited artifact
    pub fn edited_path(&self) -> &Path {
        match self {
            Media::Image { edited, .. } => edited,
            Media::Video { asset, .. } => &asset.path,
        }
    }

    /// Location of the original artifact
    pub fn original_path(&self) -> &Path {
        match self {
            Media::Image { original, .. } | Media::Video { original, .. } => original,
        }
    }

    pub fn info(&self) -> &MediaInfo {
        match self {
            Media::Image { info, .. } | Media::Video { info, .. } => info,
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, Media::Video { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_info_serializes_as_plain_map() {
        let info: MediaInfo = [("filter", "noir"), ("sticker", "star")].into_iter().collect();
        let json = serde_json::to_string(&info).unwrap();
        assert_eq!(json, r#"{"filter":"noir","sticker":"star"}"#);
    }

    #[test]
    fn test_video_media_accessors() {
        let media = Media::Video {
            asset: VideoAsset::new("/tmp/edited.mp4"),
            original: PathBuf::from("/tmp/original.mp4"),
            info: MediaInfo::new(),
        };
        assert!(media.is_video());
        assert_eq!(media.edited_path(), Path::new("/tmp/edited.mp4"));
        assert_eq!(media.original_path(), Path::new("/tmp/original.mp4"));
    }

    #[test]
    fn test_export_asset_kind() {
        let item = ExportItem::video("a.mp4", "b.mp4", MediaInfo::new());
        assert_eq!(item.result.kind(), "video");
        assert_eq!(item.original.kind(), "video");
    }
}
