// SPDX-License-Identifier: MPL-2.0

//! Error types for VisionSnap

use std::fmt;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Still capture errors
    Capture(CaptureError),
    /// Image labeling errors
    Classify(ClassifyError),
    /// Camera permission errors
    Permission(PermissionError),
    /// Generic error with message
    Other(String),
}

/// Errors raised while taking a still image
#[derive(Debug, Clone)]
pub enum CaptureError {
    /// No camera devices found
    NoCameraFound,
    /// Requested camera index does not exist
    CameraIndexOutOfRange { index: usize, count: usize },
    /// GStreamer pipeline could not be built or started
    PipelineFailed(String),
    /// File chooser or image decoding failed
    SourceFailed(String),
}

/// Errors raised by a classifier
///
/// The `Display` output is shown verbatim to the user after `Error: `.
#[derive(Debug, Clone)]
pub enum ClassifyError {
    /// Model file is missing
    ModelNotFound(String),
    /// Labels file is missing or unreadable
    LabelsUnavailable(String),
    /// ONNX Runtime rejected the model
    ModelLoad(String),
    /// Inference failed
    Inference(String),
    /// Model output did not match the labels file
    UnexpectedOutput(String),
    /// Background task panicked or was dropped
    TaskFailed(String),
}

/// Camera permission errors
#[derive(Debug, Clone)]
pub enum PermissionError {
    /// Session bus unavailable
    Bus(String),
    /// Portal call failed
    Portal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Capture(e) => write!(f, "Capture error: {}", e),
            AppError::Classify(e) => write!(f, "Labeling error: {}", e),
            AppError::Permission(e) => write!(f, "Permission error: {}", e),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::NoCameraFound => write!(f, "No camera devices found"),
            CaptureError::CameraIndexOutOfRange { index, count } => {
                write!(f, "Camera index {} out of range ({} available)", index, count)
            }
            CaptureError::PipelineFailed(msg) => write!(f, "Pipeline failed: {}", msg),
            CaptureError::SourceFailed(msg) => write!(f, "Image source failed: {}", msg),
        }
    }
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifyError::ModelNotFound(path) => write!(f, "Model not found: {}", path),
            ClassifyError::LabelsUnavailable(msg) => write!(f, "Labels unavailable: {}", msg),
            ClassifyError::ModelLoad(msg) => write!(f, "Failed to load model: {}", msg),
            ClassifyError::Inference(msg) => write!(f, "Inference failed: {}", msg),
            ClassifyError::UnexpectedOutput(msg) => write!(f, "Unexpected model output: {}", msg),
            ClassifyError::TaskFailed(msg) => write!(f, "Labeling task failed: {}", msg),
        }
    }
}

impl fmt::Display for PermissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionError::Bus(msg) => write!(f, "D-Bus unavailable: {}", msg),
            PermissionError::Portal(msg) => write!(f, "Camera portal failed: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for CaptureError {}
impl std::error::Error for ClassifyError {}
impl std::error::Error for PermissionError {}

impl From<CaptureError> for AppError {
    fn from(err: CaptureError) -> Self {
        AppError::Capture(err)
    }
}

impl From<ClassifyError> for AppError {
    fn from(err: ClassifyError) -> Self {
        AppError::Classify(err)
    }
}

impl From<PermissionError> for AppError {
    fn from(err: PermissionError) -> Self {
        AppError::Permission(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<zbus::Error> for PermissionError {
    fn from(err: zbus::Error) -> Self {
        PermissionError::Portal(err.to_string())
    }
}

impl From<gstreamer::glib::Error> for CaptureError {
    fn from(err: gstreamer::glib::Error) -> Self {
        CaptureError::PipelineFailed(err.to_string())
    }
}

impl From<gstreamer::glib::BoolError> for CaptureError {
    fn from(err: gstreamer::glib::BoolError) -> Self {
        CaptureError::PipelineFailed(err.to_string())
    }
}

impl From<gstreamer::StateChangeError> for CaptureError {
    fn from(err: gstreamer::StateChangeError) -> Self {
        CaptureError::PipelineFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_error_display_is_user_facing() {
        let err = ClassifyError::ModelNotFound("/tmp/labeler.onnx".to_string());
        assert_eq!(err.to_string(), "Model not found: /tmp/labeler.onnx");
    }

    #[test]
    fn sub_errors_wrap_into_app_error() {
        let err: AppError = CaptureError::NoCameraFound.into();
        assert_eq!(err.to_string(), "Capture error: No camera devices found");

        let err: AppError = "boom".into();
        assert_eq!(err.to_string(), "boom");
    }
}
