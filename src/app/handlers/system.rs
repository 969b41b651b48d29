// SPDX-License-Identifier: GPL-3.0-only

//! Settings and configuration handlers

use crate::app::state::{AppModel, Message};
use crate::backends::camera::{CameraDevice, enumerate_cameras, provider_for};
use crate::config::{AppTheme, CaptureSource, Config};
use cosmic::Task;
use cosmic::cosmic_config::CosmicConfigEntry;
use tracing::{error, info};

impl AppModel {
    pub(crate) fn handle_update_config(&mut self, config: Config) -> Task<cosmic::Action<Message>> {
        info!("UpdateConfig received");
        let previous = std::mem::replace(&mut self.config, config);

        if capture_settings_changed(&previous, &self.config) {
            self.rebuild_provider();
        }

        if labeler_settings_changed(&previous, &self.config) {
            info!("Labeler settings changed, reloading model");
            return self.reload_classifier();
        }
        Task::none()
    }

    pub(crate) fn handle_set_app_theme(&mut self, index: usize) -> Task<cosmic::Action<Message>> {
        let Some(&app_theme) = AppTheme::ALL.get(index) else {
            return Task::none();
        };

        info!(?app_theme, "Setting application theme");
        self.config.app_theme = app_theme;
        self.save_config("app theme");

        cosmic::command::set_theme(app_theme.theme())
    }

    pub(crate) fn handle_set_capture_source(
        &mut self,
        index: usize,
    ) -> Task<cosmic::Action<Message>> {
        let Some(&source) = CaptureSource::ALL.get(index) else {
            return Task::none();
        };
        if source == self.config.capture_source {
            return Task::none();
        }

        info!(?source, "Setting capture source");
        self.config.capture_source = source;
        self.save_config("capture source");
        self.rebuild_provider();
        Task::none()
    }

    pub(crate) fn handle_select_camera(&mut self, index: usize) -> Task<cosmic::Action<Message>> {
        if index >= self.available_cameras.len() || index == self.config.camera_index {
            return Task::none();
        }

        info!(index, camera = %self.available_cameras[index], "Selecting camera");
        self.config.camera_index = index;
        self.save_config("camera selection");
        self.rebuild_provider();
        Task::none()
    }

    pub(crate) fn handle_cameras_enumerated(
        &mut self,
        cameras: Vec<CameraDevice>,
    ) -> Task<cosmic::Action<Message>> {
        info!(count = cameras.len(), "Found camera(s)");
        self.camera_inventory.record(cameras.len());
        self.camera_dropdown_options = cameras.iter().map(|camera| camera.name.clone()).collect();
        self.available_cameras = cameras;
        Task::none()
    }

    fn rebuild_provider(&mut self) {
        self.provider = provider_for(&self.config, &self.camera_inventory);
        info!(provider = self.provider.name(), "Capture provider ready");
    }

    fn save_config(&self, what: &str) {
        if let Some(handler) = self.config_handler.as_ref()
            && let Err(err) = self.config.write_entry(handler)
        {
            error!(?err, setting = what, "Failed to save setting");
        }
    }
}

/// Scan for cameras on a blocking thread
pub(crate) fn enumerate_cameras_task() -> Task<cosmic::Action<Message>> {
    Task::perform(
        async {
            tokio::task::spawn_blocking(enumerate_cameras)
                .await
                .unwrap_or_default()
        },
        |cameras| cosmic::Action::App(Message::CamerasEnumerated(cameras)),
    )
}

fn capture_settings_changed(old: &Config, new: &Config) -> bool {
    old.capture_source != new.capture_source
        || old.camera_index != new.camera_index
        || old.preview_max_dimension != new.preview_max_dimension
}

fn labeler_settings_changed(old: &Config, new: &Config) -> bool {
    old.model_path != new.model_path
        || old.labels_path != new.labels_path
        || old.confidence_threshold != new.confidence_threshold
        || old.max_labels != new.max_labels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_change_does_not_touch_capture_or_labeler() {
        let old = Config::default();
        let new = Config {
            app_theme: AppTheme::Dark,
            ..Config::default()
        };
        assert!(!capture_settings_changed(&old, &new));
        assert!(!labeler_settings_changed(&old, &new));
    }

    #[test]
    fn threshold_change_reloads_labeler() {
        let old = Config::default();
        let new = Config {
            confidence_threshold: 0.7,
            ..Config::default()
        };
        assert!(labeler_settings_changed(&old, &new));
        assert!(!capture_settings_changed(&old, &new));
    }

    #[test]
    fn source_change_rebuilds_provider() {
        let old = Config::default();
        let new = Config {
            capture_source: CaptureSource::FilePicker,
            ..Config::default()
        };
        assert!(capture_settings_changed(&old, &new));
    }
}
