// SPDX-License-Identifier: MPL-2.0

//! Settings drawer view

use crate::app::state::{AppModel, ContextPage, Message};
use crate::backends::classifier::Classifier;
use crate::config::{AppTheme, CaptureSource};
use crate::constants::app_info;
use crate::fl;
use cosmic::Element;
use cosmic::app::context_drawer;
use cosmic::widget;
use std::path::Path;
use std::sync::Arc;

impl AppModel {
    /// Create the settings view for the context drawer
    ///
    /// Shows theme, capture source, camera selection and labeler status.
    pub fn settings_view(&self) -> context_drawer::ContextDrawer<'_, Message> {
        let spacing = cosmic::theme::spacing();

        let theme_index = AppTheme::ALL
            .iter()
            .position(|t| *t == self.config.app_theme);
        let theme_dropdown = widget::dropdown(
            &self.theme_dropdown_options,
            theme_index,
            Message::SetAppTheme,
        );

        let source_index = CaptureSource::ALL
            .iter()
            .position(|s| *s == self.config.capture_source);
        let source_dropdown = widget::dropdown(
            &self.capture_source_dropdown_options,
            source_index,
            Message::SetCaptureSource,
        );

        let camera_row: Element<'_, Message> = if self.camera_dropdown_options.is_empty() {
            widget::text(fl!("no-cameras")).size(14).into()
        } else {
            let selected = (self.config.camera_index < self.camera_dropdown_options.len())
                .then_some(self.config.camera_index);
            widget::dropdown(&self.camera_dropdown_options, selected, Message::SelectCamera).into()
        };

        let labeler_status =
            labeler_status(self.labeler.classifier(), &self.config.model_file());

        let version_info = if app_info::is_flatpak() {
            format!("Version {} (Flatpak)", app_info::version())
        } else {
            format!("Version {}", app_info::version())
        };

        let settings_column: Element<'_, Message> = widget::column()
            .push(section_title(fl!("appearance")))
            .push(widget::vertical_space().height(spacing.space_xxs))
            .push(theme_dropdown)
            .push(widget::vertical_space().height(spacing.space_s))
            .push(section_title(fl!("capture-source")))
            .push(widget::vertical_space().height(spacing.space_xxs))
            .push(source_dropdown)
            .push(widget::vertical_space().height(spacing.space_s))
            .push(section_title(fl!("camera")))
            .push(widget::vertical_space().height(spacing.space_xxs))
            .push(camera_row)
            .push(widget::vertical_space().height(spacing.space_l))
            .push(widget::divider::horizontal::default())
            .push(widget::vertical_space().height(spacing.space_s))
            .push(section_title(fl!("labeling-model")))
            .push(widget::vertical_space().height(spacing.space_xxs))
            .push(widget::text(labeler_status).size(12))
            .push(widget::vertical_space().height(spacing.space_l))
            .push(widget::divider::horizontal::default())
            .push(widget::vertical_space().height(spacing.space_s))
            .push(
                widget::text(version_info)
                    .size(12)
                    .class(cosmic::theme::Text::Accent),
            )
            .spacing(0)
            .into();

        context_drawer::context_drawer(
            settings_column,
            Message::ToggleContextPage(ContextPage::Settings),
        )
        .title(fl!("settings"))
    }
}

/// Model path once loaded, the load error if loading failed
fn labeler_status(classifier: Option<&Arc<dyn Classifier>>, model_file: &Path) -> String {
    match classifier {
        None => fl!("labeler-loading"),
        Some(classifier) => match classifier.load_error() {
            Some(err) => fl!("labeler-failed", reason = err.to_string()),
            None => model_file.display().to_string(),
        },
    }
}

fn section_title(text: String) -> Element<'static, Message> {
    widget::text(text).size(16).font(cosmic::font::bold()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::CapturedImage;
    use crate::backends::classifier::{ClassifyResult, Rotation, UnavailableClassifier};
    use crate::errors::ClassifyError;
    use futures::FutureExt;
    use futures::future::BoxFuture;

    #[derive(Debug)]
    struct Loaded;

    impl Classifier for Loaded {
        fn classify(
            &self,
            _image: Arc<CapturedImage>,
            _rotation: Rotation,
        ) -> BoxFuture<'static, ClassifyResult> {
            futures::future::ready(Ok(Vec::new())).boxed()
        }
    }

    #[test]
    fn failed_labeler_shows_load_error_not_path() {
        let unavailable: Arc<dyn Classifier> = Arc::new(UnavailableClassifier::new(
            ClassifyError::ModelNotFound("/models/labeler.onnx".to_string()),
        ));

        let status = labeler_status(Some(&unavailable), Path::new("/models/labeler.onnx"));

        assert!(status.contains("Model not found: /models/labeler.onnx"), "{status}");
        assert_ne!(status, "/models/labeler.onnx");
    }

    #[test]
    fn loaded_labeler_shows_model_path() {
        let loaded: Arc<dyn Classifier> = Arc::new(Loaded);
        assert_eq!(
            labeler_status(Some(&loaded), Path::new("/models/labeler.onnx")),
            "/models/labeler.onnx"
        );
    }

    #[test]
    fn missing_labeler_is_loading() {
        assert_eq!(labeler_status(None, Path::new("/models/labeler.onnx")), fl!("labeler-loading"));
    }
}
