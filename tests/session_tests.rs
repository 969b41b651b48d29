// SPDX-License-Identifier: MPL-2.0

//! Integration tests for the capture → classify → display cycle
//!
//! Capture and labeling are faked; no camera, model or D-Bus is needed.

use futures::FutureExt;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use visionsnap::backends::camera::{CaptureOutcome, CaptureProvider, CapturedImage};
use visionsnap::backends::classifier::{ClassifyResult, Classifier, Label, Rotation, rank_labels};
use visionsnap::backends::permission::{PermissionGate, PermissionState, StaticPermission};
use visionsnap::errors::{CaptureError, ClassifyError};
use visionsnap::session::{CaptureReaction, Phase, ScreenSession, run_cycle};

struct FakeProvider {
    available: bool,
    outcome: Result<CaptureOutcome, CaptureError>,
    calls: AtomicUsize,
}

impl FakeProvider {
    fn new(outcome: Result<CaptureOutcome, CaptureError>) -> Self {
        Self {
            available: true,
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CaptureProvider for FakeProvider {
    fn is_available(&self) -> bool {
        self.available
    }

    fn capture(&self) -> BoxFuture<'static, Result<CaptureOutcome, CaptureError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        futures::future::ready(self.outcome.clone()).boxed()
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

#[derive(Debug)]
struct FakeClassifier {
    response: ClassifyResult,
    seen: Mutex<Vec<(u32, u32, Rotation)>>,
}

impl FakeClassifier {
    fn new(response: ClassifyResult) -> Self {
        Self {
            response,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn seen(&self) -> Vec<(u32, u32, Rotation)> {
        self.seen.lock().unwrap().clone()
    }
}

impl Classifier for FakeClassifier {
    fn classify(
        &self,
        image: Arc<CapturedImage>,
        rotation: Rotation,
    ) -> BoxFuture<'static, ClassifyResult> {
        self.seen
            .lock()
            .unwrap()
            .push((image.width, image.height, rotation));
        futures::future::ready(self.response.clone()).boxed()
    }
}

fn red_square() -> CapturedImage {
    CapturedImage::solid(100, 100, [255, 0, 0, 255]).unwrap()
}

fn granted() -> StaticPermission {
    StaticPermission(PermissionState::Granted)
}

fn apple_and_fruit() -> ClassifyResult {
    Ok(vec![Label::new("apple", 0.92), Label::new("fruit", 0.81)])
}

#[tokio::test]
async fn test_red_square_is_shown_and_labeled_apple() {
    let provider = FakeProvider::new(Ok(CaptureOutcome::Completed(Some(red_square()))));
    let classifier = FakeClassifier::new(apple_and_fruit());
    let mut session = ScreenSession::new();

    let ticket = run_cycle(&mut session, &granted(), &provider, &classifier).await;

    assert!(ticket.is_some());
    assert_eq!(session.image().map(|i| i.as_ref()), Some(&red_square()));
    assert_eq!(session.text(), Some("apple"));
    assert_eq!(classifier.seen(), vec![(100, 100, Rotation::None)]);
    assert_eq!(session.phase(), Phase::Idle);
}

#[test]
fn test_image_is_shown_before_labeling_starts() {
    let mut session = ScreenSession::new();
    let request = session.press_capture(PermissionState::Granted).unwrap();
    let ticket = session.launch(request, true).unwrap();

    let reaction =
        session.on_capture_result(ticket, Ok(CaptureOutcome::Completed(Some(red_square()))));

    let CaptureReaction::Classify { image, .. } = reaction else {
        panic!("expected a classification request");
    };
    assert_eq!(session.image(), Some(&image));
    assert_eq!(session.text(), None, "text must not change until labels arrive");
}

#[tokio::test]
async fn test_empty_labels_show_no_labels_found() {
    let provider = FakeProvider::new(Ok(CaptureOutcome::Completed(Some(red_square()))));
    let classifier = FakeClassifier::new(Ok(Vec::new()));
    let mut session = ScreenSession::new();

    run_cycle(&mut session, &granted(), &provider, &classifier).await;

    assert_eq!(session.text(), Some("No labels found"));
}

#[tokio::test]
async fn test_labeling_failure_is_prefixed() {
    let provider = FakeProvider::new(Ok(CaptureOutcome::Completed(Some(red_square()))));
    let classifier =
        FakeClassifier::new(Err(ClassifyError::ModelNotFound("labeler.onnx".to_string())));
    let mut session = ScreenSession::new();

    run_cycle(&mut session, &granted(), &provider, &classifier).await;

    assert_eq!(session.text(), Some("Error: Model not found: labeler.onnx"));
    assert!(session.image().is_some(), "image stays visible after a failure");
}

#[tokio::test]
async fn test_capture_without_image_reports_unable_to_capture() {
    let provider = FakeProvider::new(Ok(CaptureOutcome::Completed(None)));
    let classifier = FakeClassifier::new(apple_and_fruit());
    let mut session = ScreenSession::new();

    run_cycle(&mut session, &granted(), &provider, &classifier).await;

    assert_eq!(session.text(), Some("Unable to capture image"));
    assert!(session.image().is_none());
    assert!(classifier.seen().is_empty(), "nothing to label");
}

#[tokio::test]
async fn test_cancelled_capture_changes_nothing() {
    let classifier = FakeClassifier::new(apple_and_fruit());
    let mut session = ScreenSession::new();

    let first = FakeProvider::new(Ok(CaptureOutcome::Completed(Some(red_square()))));
    run_cycle(&mut session, &granted(), &first, &classifier).await;

    let cancelled = FakeProvider::new(Ok(CaptureOutcome::Cancelled));
    run_cycle(&mut session, &granted(), &cancelled, &classifier).await;

    assert_eq!(cancelled.calls(), 1);
    assert_eq!(session.text(), Some("apple"));
    assert_eq!(session.image().map(|i| i.as_ref()), Some(&red_square()));
    assert_eq!(classifier.seen().len(), 1);
}

#[tokio::test]
async fn test_identical_inputs_give_identical_output() {
    let classifier = FakeClassifier::new(apple_and_fruit());
    let provider = FakeProvider::new(Ok(CaptureOutcome::Completed(Some(red_square()))));

    let mut once = ScreenSession::new();
    run_cycle(&mut once, &granted(), &provider, &classifier).await;

    let mut twice = ScreenSession::new();
    run_cycle(&mut twice, &granted(), &provider, &classifier).await;
    run_cycle(&mut twice, &granted(), &provider, &classifier).await;

    assert_eq!(once.text(), twice.text());
    assert_eq!(once.image(), twice.image());
}

#[test]
fn test_results_after_close_are_ignored() {
    let mut session = ScreenSession::new();
    let request = session.press_capture(PermissionState::Granted).unwrap();
    let ticket = session.launch(request, true).unwrap();

    session.close();

    let reaction =
        session.on_capture_result(ticket, Ok(CaptureOutcome::Completed(Some(red_square()))));
    assert_eq!(reaction, CaptureReaction::Stale);
    assert!(session.image().is_none());

    assert!(!session.on_labels(ticket, apple_and_fruit()));
    assert_eq!(session.text(), None);
}

#[test]
fn test_labels_after_close_are_ignored() {
    let mut session = ScreenSession::new();
    let request = session.press_capture(PermissionState::Granted).unwrap();
    let ticket = session.launch(request, true).unwrap();
    let reaction =
        session.on_capture_result(ticket, Ok(CaptureOutcome::Completed(Some(red_square()))));
    assert!(matches!(reaction, CaptureReaction::Classify { .. }));

    session.close();

    assert!(!session.on_labels(ticket, apple_and_fruit()));
    assert_eq!(session.text(), None);
    assert!(session.press_capture(PermissionState::Granted).is_none());
}

#[tokio::test]
async fn test_denied_permission_skips_capture() {
    let provider = FakeProvider::new(Ok(CaptureOutcome::Completed(Some(red_square()))));
    let classifier = FakeClassifier::new(apple_and_fruit());
    let denied = StaticPermission(PermissionState::Denied);
    let mut session = ScreenSession::new();

    let ticket = run_cycle(&mut session, &denied, &provider, &classifier).await;

    assert!(ticket.is_none());
    assert_eq!(provider.calls(), 0);
    assert_eq!(session.text(), Some("Camera permission denied"));
}

#[tokio::test]
async fn test_unknown_permission_still_captures() {
    let provider = FakeProvider::new(Ok(CaptureOutcome::Completed(Some(red_square()))));
    let classifier = FakeClassifier::new(apple_and_fruit());
    let unknown = StaticPermission(PermissionState::Unknown);
    let mut session = ScreenSession::new();

    run_cycle(&mut session, &unknown, &provider, &classifier).await;

    assert_eq!(unknown.state(), PermissionState::Unknown);
    assert_eq!(provider.calls(), 1);
    assert_eq!(session.text(), Some("apple"));
}

#[tokio::test]
async fn test_unavailable_provider_is_never_called() {
    let mut provider = FakeProvider::new(Ok(CaptureOutcome::Completed(Some(red_square()))));
    provider.available = false;
    let classifier = FakeClassifier::new(apple_and_fruit());
    let mut session = ScreenSession::new();

    let ticket = run_cycle(&mut session, &granted(), &provider, &classifier).await;

    assert!(ticket.is_none());
    assert_eq!(provider.calls(), 0);
    assert_eq!(session.text(), None);
}

#[test]
fn test_overlapping_cycles_apply_in_arrival_order() {
    let mut session = ScreenSession::new();
    let first_request = session.press_capture(PermissionState::Granted).unwrap();
    let first = session.launch(first_request, true).unwrap();
    let second_request = session.press_capture(PermissionState::Granted).unwrap();
    let second = session.launch(second_request, true).unwrap();
    assert_ne!(first, second);

    let blue = CapturedImage::solid(10, 10, [0, 0, 255, 255]).unwrap();
    session.on_capture_result(second, Ok(CaptureOutcome::Completed(Some(blue.clone()))));
    session.on_capture_result(first, Ok(CaptureOutcome::Completed(Some(red_square()))));
    assert_eq!(session.image().map(|i| i.as_ref()), Some(&red_square()));

    session.on_labels(first, Ok(vec![Label::new("apple", 0.9)]));
    assert_eq!(session.phase(), Phase::Classifying);
    session.on_labels(second, Ok(vec![Label::new("sky", 0.8)]));
    assert_eq!(session.text(), Some("sky"));
    assert_eq!(session.phase(), Phase::Idle);
}

#[test]
fn test_label_ranking() {
    let names: Vec<String> = ["dog", "fruit", "apple", "cat"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let ranked = rank_labels(&[0.3, 0.81, 0.92, 0.81], &names, 0.5, 2);
    let texts: Vec<&str> = ranked.iter().map(|l| l.text.as_str()).collect();

    assert_eq!(texts, vec!["apple", "fruit"], "ties keep model order, then truncate");
}
