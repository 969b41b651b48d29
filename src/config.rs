// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::defaults;
use cosmic::cosmic_config::{self, CosmicConfigEntry, cosmic_config_derive::CosmicConfigEntry};
use cosmic::{Theme, theme};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application theme preference
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum AppTheme {
    /// Follow system theme (dark or light based on system setting)
    #[default]
    System,
    /// Always use dark theme
    Dark,
    /// Always use light theme
    Light,
}

impl AppTheme {
    pub const ALL: [AppTheme; 3] = [AppTheme::System, AppTheme::Dark, AppTheme::Light];

    /// Get the COSMIC theme for this app theme preference
    pub fn theme(&self) -> Theme {
        match self {
            Self::Dark => {
                let mut theme = theme::system_dark();
                theme.theme_type.prefer_dark(Some(true));
                theme
            }
            Self::Light => {
                let mut theme = theme::system_light();
                theme.theme_type.prefer_dark(Some(false));
                theme
            }
            Self::System => theme::system_preference(),
        }
    }
}

/// Where the capture button gets its image from
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum CaptureSource {
    /// Take a still with a camera
    #[default]
    Camera,
    /// Choose an existing image file
    FilePicker,
}

impl CaptureSource {
    pub const ALL: [CaptureSource; 2] = [CaptureSource::Camera, CaptureSource::FilePicker];
}

#[derive(Debug, Clone, CosmicConfigEntry, PartialEq, Serialize, Deserialize)]
#[version = 1]
pub struct Config {
    /// Application theme preference (System, Dark, Light)
    pub app_theme: AppTheme,
    /// Camera or file chooser
    pub capture_source: CaptureSource,
    /// Index into the camera list (see `visionsnap list`)
    pub camera_index: usize,
    /// Longest side of the image handed to the view and classifier
    pub preview_max_dimension: u32,
    /// ONNX model file; `None` uses the data directory default
    pub model_path: Option<String>,
    /// Label file, one class per line; `None` uses the data directory default
    pub labels_path: Option<String>,
    /// Labels below this confidence are not reported
    pub confidence_threshold: f32,
    /// Maximum number of labels kept per image
    pub max_labels: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_theme: AppTheme::default(),
            capture_source: CaptureSource::default(),
            camera_index: 0,
            preview_max_dimension: defaults::PREVIEW_MAX_DIMENSION,
            model_path: None,
            labels_path: None,
            confidence_threshold: defaults::CONFIDENCE_THRESHOLD,
            max_labels: defaults::MAX_LABELS,
        }
    }
}

impl Config {
    /// Resolved model file location
    pub fn model_file(&self) -> PathBuf {
        self.model_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| model_directory().join(defaults::MODEL_FILE))
    }

    /// Resolved label file location
    pub fn labels_file(&self) -> PathBuf {
        self.labels_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| model_directory().join(defaults::LABELS_FILE))
    }
}

/// `$XDG_DATA_HOME/visionsnap/models`, falling back to the working directory
pub fn model_directory() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("visionsnap")
        .join("models")
}
