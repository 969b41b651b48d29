// SPDX-License-Identifier: MPL-2.0

//! Main application module for VisionSnap
//!
//! This module contains the application state, message handling and UI rendering.
//! The capture → classify → display logic itself lives in [`crate::session`].
//!
//! # Architecture
//!
//! - `state`: Application state types (AppModel, Message, ContextPage)
//! - `handlers`: Message handlers grouped by domain
//! - `settings`: Settings drawer UI
//! - `view`: Main view rendering
//! - `update`: Message dispatch

mod handlers;
pub mod settings;
mod state;
mod update;
mod view;

use crate::backends::camera::{CameraInventory, provider_for};
use crate::backends::permission::{PermissionGate, PermissionState, PortalPermission};
use crate::config::{AppTheme, CaptureSource, Config};
use crate::constants::permission::CAMERA_REQUEST_CODE;
use crate::fl;
use crate::session::{LabelerSlot, ScreenSession};
use handlers::system::enumerate_cameras_task;
use cosmic::app::context_drawer;
use cosmic::cosmic_config::{self, CosmicConfigEntry};
use cosmic::iced::{Subscription, window};
use cosmic::widget::{self, about::About};
use cosmic::{Element, Task};
pub use state::{AppModel, ContextPage, Message};
use std::sync::Arc;
use tracing::{error, info};

const REPOSITORY: &str = "https://github.com/gogote/visionsnap";
const APP_ICON: &[u8] =
    include_bytes!("../../resources/icons/hicolor/scalable/apps/io.github.gogote.VisionSnap.svg");

impl cosmic::Application for AppModel {
    /// The async executor that will be used to run your application's commands.
    type Executor = cosmic::executor::Default;

    /// Data that your application receives to its init method.
    type Flags = ();

    /// Messages which the application and its widgets will emit.
    type Message = Message;

    /// Unique identifier in RDNN (reverse domain name notation) format.
    const APP_ID: &'static str = "io.github.gogote.VisionSnap";

    fn core(&self) -> &cosmic::Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut cosmic::Core {
        &mut self.core
    }

    /// Initializes the application with any given flags and startup commands.
    fn init(
        core: cosmic::Core,
        _flags: Self::Flags,
    ) -> (Self, Task<cosmic::Action<Self::Message>>) {
        let about = About::default()
            .name(fl!("app-title"))
            .icon(widget::icon::from_svg_bytes(APP_ICON))
            .version(env!("GIT_VERSION"))
            .links([(fl!("repository"), REPOSITORY)])
            .license(env!("CARGO_PKG_LICENSE"));

        // Load configuration
        let (config_handler, config) =
            match cosmic_config::Config::new(Self::APP_ID, Config::VERSION) {
                Ok(handler) => {
                    let config = match Config::get_entry(&handler) {
                        Ok(config) => config,
                        Err((errors, config)) => {
                            error!(?errors, "Errors loading config");
                            config
                        }
                    };
                    (Some(handler), config)
                }
                Err(err) => {
                    error!(%err, "Failed to create config handler");
                    (None, Config::default())
                }
            };

        // GStreamer must be initialized before the camera provider is queried
        if let Err(e) = gstreamer::init() {
            error!(error = %e, "Failed to initialize GStreamer");
        }

        let permission: Arc<dyn PermissionGate> = Arc::new(PortalPermission::new());
        let camera_inventory = CameraInventory::default();
        let provider = provider_for(&config, &camera_inventory);
        info!(provider = provider.name(), "Capture provider ready");

        let mut app = AppModel {
            core,
            context_page: ContextPage::default(),
            about,
            config_handler,
            session: ScreenSession::new(),
            permission: Arc::clone(&permission),
            provider,
            labeler: LabelerSlot::new(),
            preview: None,
            available_cameras: Vec::new(),
            camera_inventory,
            theme_dropdown_options: AppTheme::ALL.iter().map(|t| theme_label(*t)).collect(),
            capture_source_dropdown_options: CaptureSource::ALL
                .iter()
                .map(|s| source_label(*s))
                .collect(),
            camera_dropdown_options: Vec::new(),
            config,
        };

        let mut tasks = vec![app.reload_classifier(), enumerate_cameras_task()];

        // Ask once at startup; the answer is only consulted when capturing
        if permission.state() != PermissionState::Granted {
            tasks.push(Task::perform(
                permission.request(CAMERA_REQUEST_CODE),
                |state| cosmic::Action::App(Message::PermissionResolved(state)),
            ));
        }

        (app, Task::batch(tasks))
    }

    /// Elements to pack at the end of the header bar.
    fn header_end(&self) -> Vec<Element<'_, Self::Message>> {
        vec![
            widget::button::icon(widget::icon::from_name("help-about-symbolic"))
                .on_press(Message::ToggleContextPage(ContextPage::About))
                .into(),
            widget::button::icon(widget::icon::from_name("preferences-system-symbolic"))
                .on_press(Message::ToggleContextPage(ContextPage::Settings))
                .into(),
        ]
    }

    /// Display a context drawer if the context page is requested.
    fn context_drawer(&self) -> Option<context_drawer::ContextDrawer<'_, Self::Message>> {
        if !self.core.window.show_context {
            return None;
        }

        Some(match self.context_page {
            ContextPage::About => context_drawer::about(
                &self.about,
                |url| Message::LaunchUrl(url.to_string()),
                Message::ToggleContextPage(ContextPage::About),
            ),
            ContextPage::Settings => self.settings_view(),
        })
    }

    /// Describes the interface based on the current state of the application model.
    fn view(&self) -> Element<'_, Self::Message> {
        self.view()
    }

    /// Register subscriptions for this application.
    fn subscription(&self) -> Subscription<Self::Message> {
        self.core()
            .watch_config::<Config>(Self::APP_ID)
            .map(|update| Message::UpdateConfig(update.config))
    }

    /// Results arriving after this are dropped.
    fn on_close_requested(&self, _id: window::Id) -> Option<Self::Message> {
        Some(Message::CloseRequested)
    }

    /// Handles messages emitted by the application and its widgets.
    fn update(&mut self, message: Self::Message) -> Task<cosmic::Action<Self::Message>> {
        self.update(message)
    }
}

fn theme_label(theme: AppTheme) -> String {
    match theme {
        AppTheme::System => fl!("theme-system"),
        AppTheme::Dark => fl!("theme-dark"),
        AppTheme::Light => fl!("theme-light"),
    }
}

fn source_label(source: CaptureSource) -> String {
    match source {
        CaptureSource::Camera => fl!("source-camera"),
        CaptureSource::FilePicker => fl!("source-file"),
    }
}
