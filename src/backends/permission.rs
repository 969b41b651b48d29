// SPDX-License-Identifier: GPL-3.0-only

//! Camera permission gate
//!
//! Permission is an explicit capability object: `state()` is a cheap synchronous
//! query used before every capture, `request()` asks the user once and records
//! the answer.
//!
//! Inside a Flatpak sandbox the answer comes from the XDG Camera portal
//! (`org.freedesktop.portal.Camera.AccessCamera`). Native processes are not
//! mediated and are treated as granted.

use crate::constants::{app_info, permission};
use crate::errors::PermissionError;
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};

/// Camera access as last observed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PermissionState {
    /// Not asked yet, or the answer could not be obtained
    #[default]
    Unknown,
    Granted,
    Denied,
}

impl PermissionState {
    /// Map a portal `Response` code (0 = success, 1 = cancelled, 2 = other)
    pub fn from_portal_response(code: u32) -> Self {
        if code == 0 {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        }
    }
}

pub trait PermissionGate: Send + Sync {
    /// Current state, without side effects
    fn state(&self) -> PermissionState;

    /// Ask for camera access. Resolves to the recorded state.
    fn request(&self, request_code: u32) -> BoxFuture<'static, PermissionState>;
}

/// Gate with a fixed answer
#[derive(Debug, Clone, Copy)]
pub struct StaticPermission(pub PermissionState);

impl PermissionGate for StaticPermission {
    fn state(&self) -> PermissionState {
        self.0
    }

    fn request(&self, _request_code: u32) -> BoxFuture<'static, PermissionState> {
        futures::future::ready(self.0).boxed()
    }
}

/// Gate backed by the XDG Camera portal
#[derive(Debug, Clone)]
pub struct PortalPermission {
    state: Arc<Mutex<PermissionState>>,
}

impl Default for PortalPermission {
    fn default() -> Self {
        Self::new()
    }
}

impl PortalPermission {
    pub fn new() -> Self {
        let initial = if app_info::is_flatpak() {
            PermissionState::Unknown
        } else {
            PermissionState::Granted
        };
        debug!(?initial, "Camera permission gate created");
        Self {
            state: Arc::new(Mutex::new(initial)),
        }
    }

    fn record(state: &Mutex<PermissionState>, value: PermissionState) {
        match state.lock() {
            Ok(mut guard) => *guard = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
    }
}

impl PermissionGate for PortalPermission {
    fn state(&self) -> PermissionState {
        match self.state.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn request(&self, request_code: u32) -> BoxFuture<'static, PermissionState> {
        let state = Arc::clone(&self.state);
        let current = self.state();
        async move {
            if current == PermissionState::Granted {
                return current;
            }

            match access_camera(request_code).await {
                Ok(answer) => {
                    info!(?answer, request_code, "Camera permission answered");
                    Self::record(&state, answer);
                    answer
                }
                Err(e) => {
                    warn!(error = %e, request_code, "Camera permission request failed");
                    current
                }
            }
        }
        .boxed()
    }
}

/// Handle token for a portal request; the request code keeps it stable
pub fn handle_token(request_code: u32) -> String {
    format!("{}{}", permission::HANDLE_TOKEN_PREFIX, request_code)
}

/// Object path the portal will use for our request
///
/// The unique bus name `:1.42` becomes `1_42`.
pub fn request_path(unique_name: &str, token: &str) -> String {
    let sender = unique_name.trim_start_matches(':').replace('.', "_");
    format!("/org/freedesktop/portal/desktop/request/{}/{}", sender, token)
}

async fn access_camera(request_code: u32) -> Result<PermissionState, PermissionError> {
    let connection = zbus::Connection::session()
        .await
        .map_err(|e| PermissionError::Bus(e.to_string()))?;

    let camera = zbus::Proxy::new(
        &connection,
        "org.freedesktop.portal.Desktop",
        "/org/freedesktop/portal/desktop",
        "org.freedesktop.portal.Camera",
    )
    .await?;

    let present: bool = camera.get_property("IsCameraPresent").await.unwrap_or(false);
    if !present {
        // Nothing to grant; the capture button's availability check handles this
        info!("Camera portal reports no camera present");
        return Ok(PermissionState::Unknown);
    }

    let token = handle_token(request_code);
    let unique_name = connection
        .unique_name()
        .map(|name| name.to_string())
        .ok_or_else(|| PermissionError::Bus("connection has no unique name".to_string()))?;
    let path = request_path(&unique_name, &token);

    // Subscribe before calling so the Response cannot be missed
    let request = zbus::Proxy::new(
        &connection,
        "org.freedesktop.portal.Desktop",
        path.as_str(),
        "org.freedesktop.portal.Request",
    )
    .await?;
    let mut responses = request.receive_signal("Response").await?;

    let mut options: HashMap<&str, Value> = HashMap::new();
    options.insert("handle_token", Value::new(token.as_str()));
    let handle: OwnedObjectPath = camera.call("AccessCamera", &(options,)).await?;
    debug!(handle = %handle, "AccessCamera request issued");

    let message = responses
        .next()
        .await
        .ok_or_else(|| PermissionError::Portal("response stream closed".to_string()))?;
    let (code, _results): (u32, HashMap<String, OwnedValue>) = message.body().deserialize()?;

    Ok(PermissionState::from_portal_response(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portal_codes_map_to_states() {
        assert_eq!(PermissionState::from_portal_response(0), PermissionState::Granted);
        assert_eq!(PermissionState::from_portal_response(1), PermissionState::Denied);
        assert_eq!(PermissionState::from_portal_response(2), PermissionState::Denied);
    }

    #[test]
    fn request_path_escapes_unique_name() {
        let token = handle_token(101);
        assert_eq!(token, "visionsnap101");
        assert_eq!(
            request_path(":1.42", &token),
            "/org/freedesktop/portal/desktop/request/1_42/visionsnap101"
        );
    }

    #[tokio::test]
    async fn static_gate_answers_immediately() {
        let gate = StaticPermission(PermissionState::Denied);
        assert_eq!(gate.request(101).await, PermissionState::Denied);
        assert_eq!(gate.state(), PermissionState::Denied);
    }
}
