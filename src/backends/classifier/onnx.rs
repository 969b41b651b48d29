// SPDX-License-Identifier: GPL-3.0-only

//! ONNX Runtime image labeler
//!
//! Runs a single-output classification network (MobileNet, EfficientNet-Lite
//! and friends) on the CPU. Class names come from a plain text file with one
//! label per line, in model output order.

use super::preprocessing::{INPUT_SIZE, apply_rotation, to_input_tensor};
use super::{
    ClassifyResult, Classifier, Rotation, is_probability_distribution, rank_labels, softmax,
};
use crate::backends::camera::CapturedImage;
use crate::errors::ClassifyError;
use futures::FutureExt;
use futures::future::BoxFuture;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Tunables applied after inference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelerSettings {
    /// Minimum confidence for a label to be reported
    pub confidence_threshold: f32,
    /// Maximum number of labels returned (0 = all)
    pub max_labels: usize,
}

#[derive(Clone)]
pub struct OnnxLabeler {
    session: Arc<Mutex<Session>>,
    input_name: String,
    labels: Arc<Vec<String>>,
    settings: LabelerSettings,
}

impl std::fmt::Debug for OnnxLabeler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxLabeler")
            .field("input_name", &self.input_name)
            .field("labels", &self.labels.len())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl OnnxLabeler {
    /// Load the model and its label file. Blocking.
    pub fn load(
        model_path: &Path,
        labels_path: &Path,
        settings: LabelerSettings,
    ) -> Result<Self, ClassifyError> {
        if !model_path.exists() {
            return Err(ClassifyError::ModelNotFound(model_path.display().to_string()));
        }

        let labels = read_labels(labels_path)?;
        info!(
            model = %model_path.display(),
            labels = labels.len(),
            "Loading image labeling model"
        );

        let session = Session::builder()
            .map_err(|e| ClassifyError::ModelLoad(e.to_string()))?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .map_err(|e| ClassifyError::ModelLoad(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ClassifyError::ModelLoad(e.to_string()))?
            .with_intra_threads(2)
            .map_err(|e| ClassifyError::ModelLoad(e.to_string()))?
            .commit_from_file(model_path)
            .map_err(|e| ClassifyError::ModelLoad(e.to_string()))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| ClassifyError::ModelLoad("model declares no inputs".to_string()))?;

        debug!(input = %input_name, "Labeling model ready");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            labels: Arc::new(labels),
            settings,
        })
    }

    fn infer(&self, image: &CapturedImage, rotation: Rotation) -> ClassifyResult {
        let start = Instant::now();

        let decoded = image
            .to_dynamic()
            .ok_or_else(|| ClassifyError::Inference("image buffer is malformed".to_string()))?;
        let tensor = to_input_tensor(&apply_rotation(decoded, rotation), INPUT_SIZE);
        let input = Value::from_array(tensor).map_err(|e| ClassifyError::Inference(e.to_string()))?;

        let scores: Vec<f32> = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| ClassifyError::TaskFailed("model session poisoned".to_string()))?;
            let outputs = session
                .run(ort::inputs![self.input_name.as_str() => input])
                .map_err(|e| ClassifyError::Inference(e.to_string()))?;
            let output = outputs[0]
                .try_extract_array::<f32>()
                .map_err(|e| ClassifyError::UnexpectedOutput(e.to_string()))?;
            output.iter().copied().collect()
        };

        if scores.is_empty() {
            return Err(ClassifyError::UnexpectedOutput("empty score vector".to_string()));
        }
        if scores.len() != self.labels.len() {
            warn!(
                scores = scores.len(),
                labels = self.labels.len(),
                "Model output size does not match label count"
            );
        }

        let probabilities = if is_probability_distribution(&scores) {
            scores
        } else {
            softmax(&scores)
        };

        let labels = rank_labels(
            &probabilities,
            &self.labels,
            self.settings.confidence_threshold,
            self.settings.max_labels,
        );

        debug!(
            count = labels.len(),
            top = labels.first().map(|l| l.text.as_str()).unwrap_or("-"),
            elapsed_ms = start.elapsed().as_millis(),
            "Labeling finished"
        );
        Ok(labels)
    }
}

impl Classifier for OnnxLabeler {
    fn classify(
        &self,
        image: Arc<CapturedImage>,
        rotation: Rotation,
    ) -> BoxFuture<'static, ClassifyResult> {
        let labeler = self.clone();
        async move {
            tokio::task::spawn_blocking(move || labeler.infer(&image, rotation))
                .await
                .map_err(|e| ClassifyError::TaskFailed(e.to_string()))?
        }
        .boxed()
    }
}

/// One label per line; blank lines are skipped
pub fn parse_labels(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_labels(path: &Path) -> Result<Vec<String>, ClassifyError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| ClassifyError::LabelsUnavailable(format!("{}: {}", path.display(), e)))?;
    let labels = parse_labels(&contents);
    if labels.is_empty() {
        return Err(ClassifyError::LabelsUnavailable(format!(
            "{}: no labels",
            path.display()
        )));
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_file_skips_blank_lines() {
        let labels = parse_labels("apple\n\n  fruit  \nbanana\n");
        assert_eq!(labels, vec!["apple", "fruit", "banana"]);
    }

    #[test]
    fn missing_model_is_reported_with_path() {
        let err = OnnxLabeler::load(
            Path::new("/nonexistent/visionsnap/labeler.onnx"),
            Path::new("/nonexistent/visionsnap/labels.txt"),
            LabelerSettings {
                confidence_threshold: 0.5,
                max_labels: 10,
            },
        )
        .unwrap_err();
        assert!(matches!(err, ClassifyError::ModelNotFound(_)));
        assert!(err.to_string().contains("labeler.onnx"));
    }
}
