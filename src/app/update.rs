// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! The main `update()` function acts as a dispatcher, while specific handlers are implemented
//! in the `handlers` submodules organized by functional domain.
//!
//! # Handler Modules
//!
//! - `handlers::ui`: Context drawer and external links
//! - `handlers::capture`: Capture button, capture results, permission
//! - `handlers::classify`: Labeler loading and labeling results
//! - `handlers::system`: Configuration, theme, capture source, camera selection

use crate::app::state::{AppModel, Message};
use cosmic::Task;

impl AppModel {
    /// Main message handler - routes messages to appropriate handler methods.
    pub fn update(&mut self, message: Message) -> Task<cosmic::Action<Message>> {
        match message {
            // ===== UI Navigation =====
            Message::LaunchUrl(url) => self.handle_launch_url(url),
            Message::ToggleContextPage(page) => self.handle_toggle_context_page(page),

            // ===== Capture cycle =====
            Message::Capture => self.handle_capture(),
            Message::CaptureFinished(ticket, result) => {
                self.handle_capture_finished(ticket, result)
            }
            Message::Classified(ticket, result) => self.handle_classified(ticket, result),

            // ===== Startup =====
            Message::PermissionResolved(state) => self.handle_permission_resolved(state),
            Message::ClassifierLoaded(generation, classifier) => {
                self.handle_classifier_loaded(generation, classifier)
            }
            Message::CamerasEnumerated(cameras) => self.handle_cameras_enumerated(cameras),

            // ===== Settings =====
            Message::UpdateConfig(config) => self.handle_update_config(config),
            Message::SetAppTheme(index) => self.handle_set_app_theme(index),
            Message::SetCaptureSource(index) => self.handle_set_capture_source(index),
            Message::SelectCamera(index) => self.handle_select_camera(index),

            Message::CloseRequested => self.handle_close_requested(),
        }
    }
}
