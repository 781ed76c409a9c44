// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Folder created under the user's pictures directory for archived originals
pub const DEFAULT_SAVE_FOLDER: &str = "Camera";

/// JPEG quality used for archived images (100 = maximum)
pub const DEFAULT_JPEG_QUALITY: u8 = 100;

/// File extension of archived images
pub const ARCHIVE_IMAGE_EXTENSION: &str = "jpg";

/// Configuration directory name under the platform config dir
pub const CONFIG_DIR_NAME: &str = "camera-archive";

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Tag prefixed to the JSON payload of the JPEG comment segment
pub const METADATA_TAG: &[u8] = b"camera-archive:";

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}
