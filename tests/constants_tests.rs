// SPDX-License-Identifier: MPL-2.0

//! Integration tests for constants module

use visionsnap::backends::permission::handle_token;
use visionsnap::constants::{capture, defaults, messages, permission};

#[test]
fn test_result_messages() {
    assert_eq!(messages::UNABLE_TO_CAPTURE, "Unable to capture image");
    assert_eq!(messages::NO_LABELS, "No labels found");
    assert_eq!(
        messages::error("Model not found: labeler.onnx"),
        "Error: Model not found: labeler.onnx"
    );
}

#[test]
fn test_permission_request_code() {
    assert_eq!(permission::CAMERA_REQUEST_CODE, 101);
    assert_eq!(handle_token(permission::CAMERA_REQUEST_CODE), "visionsnap101");
}

#[test]
fn test_capture_timing() {
    // Warm-up must leave room for at least one frame before giving up
    assert!(capture::WARMUP < capture::TIMEOUT);
}

#[test]
fn test_defaults_are_usable() {
    assert!(defaults::PREVIEW_MAX_DIMENSION > 0);
    assert!((0.0..=1.0).contains(&defaults::CONFIDENCE_THRESHOLD));
    assert!(defaults::MAX_LABELS > 0);
}
