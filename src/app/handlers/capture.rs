// SPDX-License-Identifier: GPL-3.0-only

//! Capture operations handlers
//!
//! Handles the capture button, the provider's answer, and the permission request.

use crate::app::handlers::system::enumerate_cameras_task;
use crate::app::state::{AppModel, Message};
use crate::backends::camera::{CaptureOutcome, CapturedImage};
use crate::backends::permission::PermissionState;
use crate::config::CaptureSource;
use crate::errors::CaptureError;
use crate::session::{CaptureReaction, CycleTicket, QueuedImage};
use cosmic::Task;
use cosmic::widget::image::Handle;
use tracing::{debug, info, warn};

impl AppModel {
    pub(crate) fn handle_capture(&mut self) -> Task<cosmic::Action<Message>> {
        let Some(request) = self.session.press_capture(self.permission.state()) else {
            return Task::none();
        };
        let Some(ticket) = self.session.launch(request, self.provider.is_available()) else {
            // A camera may have been plugged in since the last scan
            if self.config.capture_source == CaptureSource::Camera {
                return enumerate_cameras_task();
            }
            return Task::none();
        };

        info!(provider = self.provider.name(), cycle = ticket.cycle, "Starting capture");
        let capture = self.provider.capture();
        Task::perform(capture, move |result| {
            cosmic::Action::App(Message::CaptureFinished(ticket, result))
        })
    }

    pub(crate) fn handle_capture_finished(
        &mut self,
        ticket: CycleTicket,
        result: Result<CaptureOutcome, CaptureError>,
    ) -> Task<cosmic::Action<Message>> {
        match self.session.on_capture_result(ticket, result) {
            CaptureReaction::Classify {
                ticket,
                image,
                rotation,
            } => {
                // Image goes on screen before labeling starts
                self.preview = Some(preview_handle(&image));
                self.dispatch_classification(QueuedImage {
                    ticket,
                    image,
                    rotation,
                })
            }
            CaptureReaction::Done => Task::none(),
            CaptureReaction::Stale => {
                debug!(cycle = ticket.cycle, "Capture result arrived after close");
                Task::none()
            }
        }
    }

    pub(crate) fn handle_permission_resolved(
        &mut self,
        state: PermissionState,
    ) -> Task<cosmic::Action<Message>> {
        match state {
            PermissionState::Granted => info!("Camera access granted"),
            PermissionState::Denied => warn!("Camera access denied"),
            PermissionState::Unknown => info!("Camera access undecided"),
        }
        Task::none()
    }
}

fn preview_handle(image: &CapturedImage) -> Handle {
    Handle::from_rgba(image.width, image.height, image.data.to_vec())
}
