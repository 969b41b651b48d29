// SPDX-License-Identifier: MPL-2.0

//! Capture → classify → display cycle for one screen
//!
//! `ScreenSession` owns what the screen shows (the last image and the result
//! text) and decides how each asynchronous result changes it. It knows nothing
//! about widgets, so the GUI and the CLI drive the same logic.
//!
//! ```text
//! Idle ──press──► RequestingCapture ──launch──► AwaitingCamera
//!   ▲                                              │ image
//!   └──────────── labels / error ◄── Classifying ◄─┘
//! ```
//!
//! Every dispatched operation carries a [`CycleTicket`]. Results for a closed
//! session, or for another session, are dropped without touching the display.
//! There is no in-progress lock: pressing again while a cycle is outstanding
//! starts a second, overlapping cycle.

use crate::backends::camera::{CaptureOutcome, CaptureProvider, CapturedImage};
use crate::backends::classifier::{ClassifyResult, Classifier, Rotation};
use crate::backends::permission::{PermissionGate, PermissionState};
use crate::constants::messages;
use crate::errors::CaptureError;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

/// Identifies one capture cycle of one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CycleTicket {
    pub session: SessionId,
    pub cycle: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    RequestingCapture,
    AwaitingCamera,
    Classifying,
}

/// A press that passed the permission check and awaits dispatch
#[derive(Debug)]
#[must_use]
pub struct PendingRequest {
    ticket: CycleTicket,
}

/// What to do after a capture result was applied
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureReaction {
    /// Hand the image to the classifier
    Classify {
        ticket: CycleTicket,
        image: Arc<CapturedImage>,
        rotation: Rotation,
    },
    /// Cycle finished, nothing more to run
    Done,
    /// Result belonged to a closed or foreign session and was ignored
    Stale,
}

#[derive(Debug)]
pub struct ScreenSession {
    id: SessionId,
    active: bool,
    next_cycle: u64,
    requesting: usize,
    awaiting_capture: usize,
    classifying: usize,
    image: Option<Arc<CapturedImage>>,
    text: Option<String>,
}

impl Default for ScreenSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenSession {
    pub fn new() -> Self {
        Self {
            id: SessionId(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed)),
            active: true,
            next_cycle: 0,
            requesting: 0,
            awaiting_capture: 0,
            classifying: 0,
            image: None,
            text: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Image currently shown, if any
    pub fn image(&self) -> Option<&Arc<CapturedImage>> {
        self.image.as_ref()
    }

    /// Result text currently shown, if any
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn phase(&self) -> Phase {
        if self.classifying > 0 {
            Phase::Classifying
        } else if self.awaiting_capture > 0 {
            Phase::AwaitingCamera
        } else if self.requesting > 0 {
            Phase::RequestingCapture
        } else {
            Phase::Idle
        }
    }

    /// The screen went away; later results are ignored
    pub fn close(&mut self) {
        info!(session = ?self.id, "Screen session closed");
        self.active = false;
    }

    /// Capture button pressed
    ///
    /// Denied permission is reported in the result text and ends the press.
    /// `Unknown` still proceeds and lets the capture backend refuse.
    pub fn press_capture(&mut self, permission: PermissionState) -> Option<PendingRequest> {
        if !self.active {
            return None;
        }
        if permission == PermissionState::Denied {
            info!("Capture refused: camera permission denied");
            self.text = Some(messages::PERMISSION_DENIED.to_string());
            return None;
        }

        self.next_cycle += 1;
        self.requesting += 1;
        Some(PendingRequest {
            ticket: CycleTicket {
                session: self.id,
                cycle: self.next_cycle,
            },
        })
    }

    /// Dispatch a pressed request if something can service it
    ///
    /// With no capture handler the press is dropped silently.
    pub fn launch(&mut self, request: PendingRequest, provider_available: bool) -> Option<CycleTicket> {
        self.requesting = self.requesting.saturating_sub(1);
        if !self.owns(request.ticket) {
            return None;
        }
        if !provider_available {
            warn!(cycle = request.ticket.cycle, "No capture handler available, ignoring press");
            return None;
        }

        self.awaiting_capture += 1;
        debug!(cycle = request.ticket.cycle, "Capture dispatched");
        Some(request.ticket)
    }

    /// Apply the capture provider's answer
    pub fn on_capture_result(
        &mut self,
        ticket: CycleTicket,
        result: Result<CaptureOutcome, CaptureError>,
    ) -> CaptureReaction {
        if !self.owns(ticket) {
            debug!(cycle = ticket.cycle, "Dropping stale capture result");
            return CaptureReaction::Stale;
        }
        self.awaiting_capture = self.awaiting_capture.saturating_sub(1);

        match result {
            Ok(CaptureOutcome::Completed(Some(image))) => {
                let image = Arc::new(image);
                info!(
                    cycle = ticket.cycle,
                    width = image.width,
                    height = image.height,
                    "Showing captured image"
                );
                self.image = Some(Arc::clone(&image));
                self.classifying += 1;
                CaptureReaction::Classify {
                    ticket,
                    image,
                    rotation: Rotation::None,
                }
            }
            Ok(CaptureOutcome::Completed(None)) => {
                self.text = Some(messages::UNABLE_TO_CAPTURE.to_string());
                CaptureReaction::Done
            }
            Ok(CaptureOutcome::Cancelled) => {
                info!(cycle = ticket.cycle, "Capture cancelled");
                CaptureReaction::Done
            }
            Err(e) => {
                warn!(cycle = ticket.cycle, error = %e, "Capture failed");
                CaptureReaction::Done
            }
        }
    }

    /// Apply the classifier's answer. Returns whether the display changed.
    pub fn on_labels(&mut self, ticket: CycleTicket, result: ClassifyResult) -> bool {
        if !self.owns(ticket) {
            debug!(cycle = ticket.cycle, "Dropping stale labels");
            return false;
        }
        self.classifying = self.classifying.saturating_sub(1);

        let text = describe_labels(&result);
        info!(cycle = ticket.cycle, text = %text, "Labeling result");
        self.text = Some(text);
        true
    }

    fn owns(&self, ticket: CycleTicket) -> bool {
        self.active && ticket.session == self.id
    }
}

/// Text for a classifier outcome
///
/// The first label wins; the classifier already ordered them.
pub fn describe_labels(result: &ClassifyResult) -> String {
    match result {
        Ok(labels) => labels
            .first()
            .map(|label| label.text.clone())
            .unwrap_or_else(|| messages::NO_LABELS.to_string()),
        Err(e) => messages::error(e),
    }
}

/// Drive one full cycle against the given capabilities
///
/// Used by the CLI, which has no event loop of its own. Returns the ticket of
/// the cycle, or `None` when the press did not dispatch.
pub async fn run_cycle(
    session: &mut ScreenSession,
    permission: &dyn PermissionGate,
    provider: &dyn CaptureProvider,
    classifier: &dyn Classifier,
) -> Option<CycleTicket> {
    let request = session.press_capture(permission.state())?;
    let ticket = session.launch(request, provider.is_available())?;

    let captured = provider.capture().await;
    if let CaptureReaction::Classify {
        ticket,
        image,
        rotation,
    } = session.on_capture_result(ticket, captured)
    {
        let labels = classifier.classify(image, rotation).await;
        session.on_labels(ticket, labels);
    }

    Some(ticket)
}

/// An image waiting for the labeler to finish loading
#[derive(Debug, Clone)]
pub struct QueuedImage {
    pub ticket: CycleTicket,
    pub image: Arc<CapturedImage>,
    pub rotation: Rotation,
}

/// The labeler currently in use, plus the images waiting for one
///
/// Each load gets a generation number. Only the answer to the latest load is
/// installed, so a slow load started before a settings change can never
/// replace the model loaded after it.
#[derive(Debug, Default)]
pub struct LabelerSlot {
    generation: u64,
    classifier: Option<Arc<dyn Classifier>>,
    queued: Vec<QueuedImage>,
}

impl LabelerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new load; the current labeler is dropped until it answers
    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.classifier = None;
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn classifier(&self) -> Option<&Arc<dyn Classifier>> {
        self.classifier.as_ref()
    }

    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    /// Labeler to run `item` with now, or `None` if it was queued
    pub fn submit(&mut self, item: QueuedImage) -> Option<(Arc<dyn Classifier>, QueuedImage)> {
        match &self.classifier {
            Some(classifier) => Some((Arc::clone(classifier), item)),
            None => {
                debug!(cycle = item.ticket.cycle, "Labeler still loading, queueing image");
                self.queued.push(item);
                None
            }
        }
    }

    /// Install the answer to load `generation`
    ///
    /// Returns the queued images to label now, or `None` when a newer load was
    /// started since and this answer was discarded.
    pub fn finish_load(
        &mut self,
        generation: u64,
        classifier: Arc<dyn Classifier>,
    ) -> Option<(Arc<dyn Classifier>, Vec<QueuedImage>)> {
        if generation != self.generation {
            debug!(generation, current = self.generation, "Discarding outdated labeler");
            return None;
        }
        self.classifier = Some(Arc::clone(&classifier));
        Some((classifier, std::mem::take(&mut self.queued)))
    }

    /// Forget waiting images
    pub fn clear_queue(&mut self) {
        self.queued.clear();
    }
}
