// SPDX-License-Identifier: MPL-2.0

//! VisionSnap - snap a photo and label what is in it
//!
//! One screen: a capture button, the captured image, and the most likely
//! label for it, computed on the device.
//!
//! # Architecture
//!
//! - [`app`]: COSMIC application (view, messages, handlers)
//! - [`session`]: The capture → classify → display cycle, free of UI types
//! - [`backends`]: Camera still capture, file chooser, camera permission, labeler
//! - [`config`]: User configuration handling
//!
//! # Example
//!
//! ```ignore
//! // This is a GUI application, typically run via:
//! // visionsnap
//! // or headless:
//! // visionsnap classify photo.jpg
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod i18n;
pub mod session;

// Re-export commonly used types
pub use app::{AppModel, Message};
pub use config::Config;
pub use session::{Phase, ScreenSession};
