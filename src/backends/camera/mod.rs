// SPDX-License-Identifier: MPL-2.0

//! Capture providers
//!
//! A capture provider presents whatever UI it needs (none for a camera still,
//! a file chooser for the picker) and hands back one image.
//!
//! ```text
//!   press ──► is_available()? ──no──► ignored
//!                  │ yes
//!                  ▼
//!             capture() ──► Completed(Some(image)) | Completed(None) | Cancelled | Err
//! ```

pub mod picker;
pub mod still;
pub mod types;

pub use picker::FilePickerProvider;
pub use still::{CameraInventory, StillCameraProvider, enumerate_cameras};
pub use types::*;

use crate::config::{CaptureSource, Config};
use crate::errors::CaptureError;
use futures::future::BoxFuture;
use std::sync::Arc;

/// An external capability that returns a still image asynchronously
pub trait CaptureProvider: Send + Sync {
    /// Whether anything can service a capture request right now
    ///
    /// Called synchronously when the capture button is pressed, so it must
    /// answer from cached state.
    fn is_available(&self) -> bool;

    /// Run one capture
    fn capture(&self) -> BoxFuture<'static, Result<CaptureOutcome, CaptureError>>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Build the provider selected in the configuration
///
/// Camera availability is read from `inventory`, which the caller keeps
/// up to date from off-thread scans.
pub fn provider_for(config: &Config, inventory: &CameraInventory) -> Arc<dyn CaptureProvider> {
    match config.capture_source {
        CaptureSource::Camera => Arc::new(StillCameraProvider::new(
            config.camera_index,
            config.preview_max_dimension,
            inventory.clone(),
        )),
        CaptureSource::FilePicker => {
            Arc::new(FilePickerProvider::new(config.preview_max_dimension))
        }
    }
}
