// SPDX-License-Identifier: MPL-2.0

//! Backend abstraction layer for the three external capabilities
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            App Layer / CLI / Session          │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │              Backend Layer                   │
//! │  ┌────────────┐ ┌────────────┐ ┌──────────┐ │
//! │  │ Permission │ │   Camera   │ │Classifier│ │
//! │  │  (portal)  │ │(GStreamer, │ │  (ONNX)  │ │
//! │  │            │ │  chooser)  │ │          │ │
//! │  └────────────┘ └────────────┘ └──────────┘ │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Each capability is a trait so the session logic can be driven by fakes in tests.

pub mod camera;
pub mod classifier;
pub mod permission;
