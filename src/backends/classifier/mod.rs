// SPDX-License-Identifier: MPL-2.0

//! Image labeling
//!
//! The classifier is a black box: one image in, a ranked list of labels out.
//! Inference runs off the UI thread and completes exactly once per call.

pub mod onnx;
pub mod preprocessing;

pub use onnx::{LabelerSettings, OnnxLabeler};

use crate::backends::camera::CapturedImage;
use crate::config::Config;
use crate::errors::ClassifyError;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// A predicted category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub text: String,
    pub confidence: f32,
    /// Class index in the model output
    pub index: usize,
}

impl Label {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
            index: 0,
        }
    }
}

/// Orientation hint passed along with the image
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    None,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> u32 {
        match self {
            Rotation::None => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Only multiples of 90 are meaningful
    pub fn from_degrees(degrees: u32) -> Option<Self> {
        match degrees % 360 {
            0 => Some(Rotation::None),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }
}

pub type ClassifyResult = Result<Vec<Label>, ClassifyError>;

pub trait Classifier: Send + Sync + std::fmt::Debug {
    /// Label one image. Labels come back sorted by descending confidence.
    fn classify(
        &self,
        image: Arc<CapturedImage>,
        rotation: Rotation,
    ) -> BoxFuture<'static, ClassifyResult>;

    /// Why the model could not be loaded, for labelers that are stand-ins
    fn load_error(&self) -> Option<&ClassifyError> {
        None
    }
}

/// Stand-in used when the model failed to load
///
/// Every call fails with the load error so the user sees why.
#[derive(Debug, Clone)]
pub struct UnavailableClassifier {
    reason: ClassifyError,
}

impl UnavailableClassifier {
    pub fn new(reason: ClassifyError) -> Self {
        Self { reason }
    }
}

impl Classifier for UnavailableClassifier {
    fn classify(
        &self,
        _image: Arc<CapturedImage>,
        _rotation: Rotation,
    ) -> BoxFuture<'static, ClassifyResult> {
        futures::future::ready(Err(self.reason.clone())).boxed()
    }

    fn load_error(&self) -> Option<&ClassifyError> {
        Some(&self.reason)
    }
}

/// Load the labeler named in the configuration
///
/// Never fails: a model that cannot be loaded becomes an [`UnavailableClassifier`]
/// carrying the reason.
pub async fn load_classifier(config: &Config) -> Arc<dyn Classifier> {
    let model = config.model_file();
    let labels = config.labels_file();
    let settings = LabelerSettings {
        confidence_threshold: config.confidence_threshold,
        max_labels: config.max_labels,
    };

    let loaded = tokio::task::spawn_blocking(move || OnnxLabeler::load(&model, &labels, settings))
        .await
        .map_err(|e| ClassifyError::TaskFailed(e.to_string()))
        .and_then(|result| result);

    match loaded {
        Ok(labeler) => {
            info!(?labeler, "Image labeler loaded");
            Arc::new(labeler)
        }
        Err(e) => {
            error!(error = %e, "Image labeler unavailable");
            Arc::new(UnavailableClassifier::new(e))
        }
    }
}

/// Turn raw class scores into the ranked label list
///
/// Scores below `threshold` are dropped. The sort is stable, so equal scores
/// keep model order. At most `max_labels` entries are returned (0 = no limit).
pub fn rank_labels(scores: &[f32], names: &[String], threshold: f32, max_labels: usize) -> Vec<Label> {
    let mut labels: Vec<Label> = scores
        .iter()
        .enumerate()
        .filter(|(_, score)| score.is_finite() && **score >= threshold)
        .map(|(index, &confidence)| Label {
            text: names
                .get(index)
                .cloned()
                .unwrap_or_else(|| format!("class {}", index)),
            confidence,
            index,
        })
        .collect();

    labels.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    if max_labels > 0 {
        labels.truncate(max_labels);
    }
    labels
}

/// Whether scores already look like a probability distribution
pub fn is_probability_distribution(scores: &[f32]) -> bool {
    let in_range = scores.iter().all(|s| (0.0..=1.0).contains(s));
    let sum: f32 = scores.iter().sum();
    in_range && (sum - 1.0).abs() < 1e-3
}

/// Numerically stable softmax
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum == 0.0 || !sum.is_finite() {
        return vec![0.0; logits.len()];
    }
    exps.into_iter().map(|e| e / sum).collect()
}
