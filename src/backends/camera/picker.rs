// SPDX-License-Identifier: GPL-3.0-only

//! Native file chooser as a capture source
//!
//! For machines without a camera: the chooser stands in for the camera UI.
//! Dismissing it counts as a cancelled capture; a file that cannot be decoded
//! counts as a capture that returned no image.

use super::types::{CaptureOutcome, CapturedImage};
use super::CaptureProvider;
use crate::constants::file_formats::IMAGE_EXTENSIONS;
use crate::errors::CaptureError;
use crate::fl;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub struct FilePickerProvider {
    max_dimension: u32,
}

impl FilePickerProvider {
    pub fn new(max_dimension: u32) -> Self {
        Self { max_dimension }
    }
}

impl CaptureProvider for FilePickerProvider {
    fn is_available(&self) -> bool {
        true
    }

    fn capture(&self) -> BoxFuture<'static, Result<CaptureOutcome, CaptureError>> {
        let max_dimension = self.max_dimension;
        async move {
            tokio::task::spawn_blocking(move || {
                let Some(path) = pick_image() else {
                    info!("File chooser dismissed");
                    return CaptureOutcome::Cancelled;
                };
                CaptureOutcome::Completed(load_image(&path, max_dimension))
            })
            .await
            .map_err(|e| CaptureError::SourceFailed(format!("file chooser task failed: {}", e)))
        }
        .boxed()
    }

    fn name(&self) -> &'static str {
        "file-picker"
    }
}

fn pick_image() -> Option<PathBuf> {
    let (title, filter) = chooser_labels();
    rfd::FileDialog::new()
        .set_title(title)
        .add_filter(filter, IMAGE_EXTENSIONS)
        .pick_file()
}

/// Dialog title and filter name
fn chooser_labels() -> (String, String) {
    (fl!("choose-photo"), fl!("image-files"))
}

/// Decode an image file into a preview-sized capture
pub fn load_image(path: &Path, max_dimension: u32) -> Option<CapturedImage> {
    match image::open(path) {
        Ok(decoded) => {
            let image = CapturedImage::from_dynamic(&decoded)?.into_preview(max_dimension);
            info!(path = %path.display(), width = image.width, height = image.height, "Loaded image");
            Some(image)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to decode image");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chooser_labels_come_from_translations() {
        assert_eq!(
            chooser_labels(),
            ("Choose a photo".to_string(), "Images".to_string())
        );
    }

    #[test]
    fn undecodable_file_yields_no_image() {
        let path = std::env::temp_dir().join("visionsnap-not-an-image.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        assert!(load_image(&path, 320).is_none());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn decoded_file_is_downscaled() {
        let path = std::env::temp_dir().join("visionsnap-picker-test.png");
        image::RgbaImage::from_pixel(800, 400, image::Rgba([0, 255, 0, 255]))
            .save(&path)
            .unwrap();

        let image = load_image(&path, 320).unwrap();
        assert_eq!((image.width, image.height), (320, 160));

        let _ = std::fs::remove_file(&path);
    }
}
