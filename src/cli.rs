// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Taking a still and labeling it
//! - Labeling an existing image file
//!
//! Each command runs one screen session to completion and prints the text the
//! window would show.

use futures::FutureExt;
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};
use visionsnap::backends::camera::{
    CameraInventory, CaptureOutcome, CaptureProvider, StillCameraProvider, enumerate_cameras,
    picker::load_image,
};
use visionsnap::backends::classifier::{Classifier, Rotation, load_classifier};
use visionsnap::backends::permission::{PermissionState, StaticPermission};
use visionsnap::config::Config;
use visionsnap::errors::{AppError, CaptureError};
use visionsnap::session::{ScreenSession, run_cycle};

/// List all available cameras
pub fn list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    gstreamer::init()?;

    let cameras = enumerate_cameras();
    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        println!("  [{}] {}", index, camera.name);
    }

    Ok(())
}

/// Take a still with the given camera, label it, print the result
pub fn snap(camera_index: usize, output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    gstreamer::init()?;

    let count = enumerate_cameras().len();
    if count == 0 {
        return Err(AppError::from(CaptureError::NoCameraFound).into());
    }
    if camera_index >= count {
        return Err(AppError::from(CaptureError::CameraIndexOutOfRange {
            index: camera_index,
            count,
        })
        .into());
    }

    let config = load_config();
    let provider = StillCameraProvider::new(
        camera_index,
        config.preview_max_dimension,
        CameraInventory::with_count(count),
    );
    let session = run_session(&config, &provider)?;

    if let (Some(path), Some(image)) = (output, session.image()) {
        let decoded = image
            .to_dynamic()
            .ok_or_else(|| AppError::Other("captured image buffer is malformed".to_string()))?;
        decoded.save(&path)?;
        println!("Saved: {}", path.display());
    }

    Ok(())
}

/// Label an image file, printing either the result text or every label as JSON
pub fn classify_file(path: PathBuf, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !path.is_file() {
        return Err(AppError::from(CaptureError::SourceFailed(format!(
            "{}: no such file",
            path.display()
        )))
        .into());
    }

    let config = load_config();

    if json {
        let runtime = tokio::runtime::Runtime::new()?;
        let labels = runtime.block_on(async {
            let image = load_image(&path, config.preview_max_dimension).ok_or_else(|| {
                AppError::from(CaptureError::SourceFailed(format!(
                    "{}: unsupported image",
                    path.display()
                )))
            })?;
            let classifier = load_classifier(&config).await;
            classifier
                .classify(image.into(), Rotation::None)
                .await
                .map_err(AppError::from)
        })?;
        println!("{}", serde_json::to_string_pretty(&labels)?);
        return Ok(());
    }

    let provider = FileSource {
        path,
        max_dimension: config.preview_max_dimension,
    };
    run_session(&config, &provider)?;
    Ok(())
}

/// Saved settings, or defaults when there are none
fn load_config() -> Config {
    use cosmic::cosmic_config::{self, CosmicConfigEntry};

    let app_id = <visionsnap::app::AppModel as cosmic::Application>::APP_ID;
    match cosmic_config::Config::new(app_id, Config::VERSION) {
        Ok(handler) => Config::get_entry(&handler).unwrap_or_else(|(errors, config)| {
            tracing::warn!(?errors, "Errors loading config");
            config
        }),
        Err(err) => {
            tracing::warn!(%err, "No config handler, using defaults");
            Config::default()
        }
    }
}

fn run_session(
    config: &Config,
    provider: &dyn CaptureProvider,
) -> Result<ScreenSession, Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    let session = runtime.block_on(async {
        let classifier = load_classifier(config).await;
        let permission = StaticPermission(PermissionState::Granted);
        let mut session = ScreenSession::new();
        run_cycle(&mut session, &permission, provider, classifier.as_ref()).await;
        session
    });

    match session.text() {
        Some(text) => println!("{}", text),
        None => return Err(AppError::Other("capture produced no result".to_string()).into()),
    }
    Ok(session)
}

/// A single known file standing in for the camera
struct FileSource {
    path: PathBuf,
    max_dimension: u32,
}

impl CaptureProvider for FileSource {
    fn is_available(&self) -> bool {
        Path::new(&self.path).is_file()
    }

    fn capture(&self) -> BoxFuture<'static, Result<CaptureOutcome, CaptureError>> {
        let path = self.path.clone();
        let max_dimension = self.max_dimension;
        async move {
            tokio::task::spawn_blocking(move || {
                CaptureOutcome::Completed(load_image(&path, max_dimension))
            })
            .await
            .map_err(|e| CaptureError::SourceFailed(e.to_string()))
        }
        .boxed()
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
