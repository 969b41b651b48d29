// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Text shown in the result label
///
/// These are fixed literals, not translated.
pub mod messages {
    /// The capture finished but handed back no image
    pub const UNABLE_TO_CAPTURE: &str = "Unable to capture image";
    /// The classifier returned an empty label list
    pub const NO_LABELS: &str = "No labels found";
    /// Capture refused because camera access was denied
    pub const PERMISSION_DENIED: &str = "Camera permission denied";
    /// Prefix for classifier failures
    pub const ERROR_PREFIX: &str = "Error: ";

    /// `Error: <description>`
    pub fn error(description: impl std::fmt::Display) -> String {
        format!("{}{}", ERROR_PREFIX, description)
    }
}

pub mod permission {
    /// Fixed request code for the camera permission request
    pub const CAMERA_REQUEST_CODE: u32 = 101;
    /// Portal handle tokens are this prefix followed by the request code
    pub const HANDLE_TOKEN_PREFIX: &str = "visionsnap";
}

/// Still capture pipeline parameters
pub mod capture {
    use std::time::Duration;

    /// Device monitor filter for cameras
    pub const DEVICE_CLASS: &str = "Video/Source";
    /// Pixel format requested from videoconvert
    pub const OUTPUT_FORMAT: &str = "RGBA";
    /// Frames before this are discarded while exposure settles
    pub const WARMUP: Duration = Duration::from_millis(500);
    /// Give up if no frame arrived by then
    pub const TIMEOUT: Duration = Duration::from_secs(5);
    /// Poll interval for the appsink
    pub const PULL_TIMEOUT_MS: u64 = 100;
}

pub mod defaults {
    /// Longest side of the preview image, in pixels
    pub const PREVIEW_MAX_DIMENSION: u32 = 320;
    /// Minimum label confidence
    pub const CONFIDENCE_THRESHOLD: f32 = 0.5;
    /// Labels kept per classification
    pub const MAX_LABELS: usize = 10;
    /// Model file name inside the model directory
    pub const MODEL_FILE: &str = "labeler.onnx";
    /// Label file name inside the model directory
    pub const LABELS_FILE: &str = "labels.txt";
}

/// Layout constants
pub mod ui {
    /// Side of the square image area
    pub const IMAGE_AREA_SIZE: f32 = 320.0;
    /// Result label text size
    pub const RESULT_TEXT_SIZE: u16 = 24;
    /// Minimum window size
    pub const MIN_WIDTH: f32 = 360.0;
    pub const MIN_HEIGHT: f32 = 480.0;
}

pub mod file_formats {
    /// Supported image file extensions
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];
}

/// Application information utilities
pub mod app_info {
    use std::path::Path;

    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }

    /// Check if the application is running inside a Flatpak sandbox
    pub fn is_flatpak() -> bool {
        Path::new("/.flatpak-info").exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefixes_description() {
        assert_eq!(messages::error("model missing"), "Error: model missing");
    }

    #[test]
    fn chooser_extensions_are_lowercase() {
        assert!(
            file_formats::IMAGE_EXTENSIONS
                .iter()
                .all(|ext| *ext == ext.to_lowercase())
        );
    }
}
