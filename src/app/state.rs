// SPDX-License-Identifier: GPL-3.0-only

//! Application state management

use crate::backends::camera::{CameraDevice, CameraInventory, CaptureOutcome, CaptureProvider};
use crate::backends::classifier::{ClassifyResult, Classifier};
use crate::backends::permission::{PermissionGate, PermissionState};
use crate::config::Config;
use crate::errors::CaptureError;
use crate::session::{CycleTicket, LabelerSlot, ScreenSession};
use cosmic::cosmic_config;
use cosmic::widget::about::About;
use cosmic::widget::image::Handle;
use std::sync::Arc;

/// The application model stores app-specific state used to describe its interface and
/// drive its logic.
pub struct AppModel {
    /// Application state which is managed by the COSMIC runtime.
    pub core: cosmic::Core,
    /// Display a context drawer with the designated page if defined.
    pub context_page: ContextPage,
    /// The about page for this app.
    pub about: About,
    /// Configuration data that persists between application runs.
    pub config: Config,
    /// Configuration handler for saving settings
    pub config_handler: Option<cosmic_config::Config>,
    /// What the screen shows and which results still apply
    pub session: ScreenSession,
    /// Camera access
    pub permission: Arc<dyn PermissionGate>,
    /// Where captures come from (camera or file chooser)
    pub provider: Arc<dyn CaptureProvider>,
    /// Image labeler and the captures waiting for it
    pub labeler: LabelerSlot,
    /// Render handle for the image the session shows
    pub preview: Option<Handle>,
    /// Cameras found by the last enumeration
    pub available_cameras: Vec<CameraDevice>,
    /// Camera count shared with the camera provider
    pub camera_inventory: CameraInventory,
    /// Dropdown labels
    pub theme_dropdown_options: Vec<String>,
    pub capture_source_dropdown_options: Vec<String>,
    pub camera_dropdown_options: Vec<String>,
}

/// The context page to display in the context drawer.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ContextPage {
    #[default]
    About,
    Settings,
}

/// Messages emitted by the application and its widgets.
#[derive(Debug, Clone)]
pub enum Message {
    // ===== UI Navigation =====
    /// Open external URL (repository, etc.)
    LaunchUrl(String),
    /// Toggle context drawer page (About, Settings)
    ToggleContextPage(ContextPage),

    // ===== Capture cycle =====
    /// Capture button pressed
    Capture,
    /// Capture provider answered
    CaptureFinished(CycleTicket, Result<CaptureOutcome, CaptureError>),
    /// Labeler answered
    Classified(CycleTicket, ClassifyResult),

    // ===== Startup =====
    /// Camera permission request finished
    PermissionResolved(PermissionState),
    /// Labeler load with this generation finished (possibly as an unavailable stand-in)
    ClassifierLoaded(u64, Arc<dyn Classifier>),
    /// Camera enumeration finished
    CamerasEnumerated(Vec<CameraDevice>),

    // ===== Settings =====
    /// Configuration changed on disk
    UpdateConfig(Config),
    /// Select application theme by dropdown index
    SetAppTheme(usize),
    /// Select capture source by dropdown index
    SetCaptureSource(usize),
    /// Select camera by dropdown index
    SelectCamera(usize),

    /// The main window is going away
    CloseRequested,
}
