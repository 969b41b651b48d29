// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration module

use std::path::PathBuf;
use visionsnap::Config;
use visionsnap::config::{AppTheme, CaptureSource, model_directory};

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.app_theme, AppTheme::System);
    assert_eq!(
        config.capture_source,
        CaptureSource::Camera,
        "Camera should be the default capture source"
    );
    assert_eq!(config.camera_index, 0);
    assert_eq!(config.preview_max_dimension, 320);
    assert_eq!(config.confidence_threshold, 0.5);
    assert_eq!(config.max_labels, 10);
}

#[test]
fn test_model_paths_default_to_data_directory() {
    let config = Config::default();

    assert_eq!(config.model_file(), model_directory().join("labeler.onnx"));
    assert_eq!(config.labels_file(), model_directory().join("labels.txt"));
    assert!(model_directory().ends_with("visionsnap/models"));
}

#[test]
fn test_explicit_model_paths_win() {
    let config = Config {
        model_path: Some("/opt/models/mobilenet.onnx".to_string()),
        labels_path: Some("/opt/models/imagenet.txt".to_string()),
        ..Config::default()
    };

    assert_eq!(config.model_file(), PathBuf::from("/opt/models/mobilenet.onnx"));
    assert_eq!(config.labels_file(), PathBuf::from("/opt/models/imagenet.txt"));
}

#[test]
fn test_choice_lists_cover_every_variant() {
    assert_eq!(AppTheme::ALL.len(), 3);
    assert_eq!(CaptureSource::ALL.len(), 2);
    assert_eq!(CaptureSource::ALL[0], CaptureSource::default());
}
