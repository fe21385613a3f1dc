//! Pretrained command classifier.
//!
//! The model is loaded once at startup and reused for every capture. Load and
//! inference failures never escape: `classify` degrades to
//! [`CommandLabel::Unknown`] so the simulation keeps running.

use crate::command::CommandLabel;
use crate::features::{FeatureTensor, NUM_BINS};
use crate::log_debug;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default model artifact, resolved against the working directory at startup.
pub const DEFAULT_MODEL_FILE: &str = "model_scripted_cpu.onnx";

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("failed to load model '{}': {}", .path.display(), .reason)]
    ModelLoad { path: PathBuf, reason: String },
    #[error("model inference failed: {0}")]
    Inference(String),
    #[error("no model loaded")]
    NotLoaded,
}

/// Forward pass over one feature tensor, returning raw class scores.
pub trait CommandModel: Send {
    fn forward(&self, features: &FeatureTensor) -> Result<Vec<f32>, ClassifierError>;
}

mod onnx {
    use super::{ClassifierError, CommandModel};
    use crate::features::FeatureTensor;
    use std::path::Path;
    use tract_onnx::prelude::*;

    /// ONNX export of the command network, run with `tract`.
    ///
    /// The export is taken in evaluation mode, so dropout and batch-norm
    /// statistics are already frozen in the graph.
    pub struct OnnxCommandModel {
        plan: TypedRunnableModel<TypedModel>,
        input_shape: [usize; 3],
    }

    impl OnnxCommandModel {
        pub fn load(path: &Path, input_shape: [usize; 3]) -> Result<Self, ClassifierError> {
            let load_err = |err: TractError| ClassifierError::ModelLoad {
                path: path.to_path_buf(),
                reason: format!("{err:#}"),
            };
            let plan = tract_onnx::onnx()
                .model_for_path(path)
                .map_err(load_err)?
                .with_input_fact(0, f32::fact(input_shape).into())
                .map_err(load_err)?
                .into_optimized()
                .map_err(load_err)?
                .into_runnable()
                .map_err(load_err)?;
            Ok(Self { plan, input_shape })
        }
    }

    impl CommandModel for OnnxCommandModel {
        fn forward(&self, features: &FeatureTensor) -> Result<Vec<f32>, ClassifierError> {
            if features.shape() != self.input_shape {
                return Err(ClassifierError::Inference(format!(
                    "feature shape {:?} does not match model input {:?}",
                    features.shape(),
                    self.input_shape
                )));
            }
            let input = Tensor::from_shape(&features.shape(), features.as_slice())
                .map_err(|err| ClassifierError::Inference(format!("{err:#}")))?;
            let outputs = self
                .plan
                .run(tvec!(input.into()))
                .map_err(|err| ClassifierError::Inference(format!("{err:#}")))?;
            let scores = outputs
                .first()
                .ok_or_else(|| ClassifierError::Inference("model produced no outputs".into()))?
                .to_array_view::<f32>()
                .map_err(|err| ClassifierError::Inference(format!("{err:#}")))?;
            Ok(scores.iter().copied().collect())
        }
    }
}

pub use onnx::OnnxCommandModel;

/// Numerically stable softmax.
pub fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return vec![0.0; scores.len()];
    }
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the largest value; ties go to the lowest index and NaN never wins.
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, value) in values.iter().copied().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}

/// Owns the (optional) loaded model and turns features into a command label.
pub struct Classifier {
    model: Option<Box<dyn CommandModel>>,
    load_error: Option<String>,
}

impl Classifier {
    /// Load the ONNX model expecting a one-second spectrogram. A failure is
    /// recorded and logged; the classifier then answers `Unknown` forever.
    pub fn load(path: &Path, frames: usize) -> Self {
        match OnnxCommandModel::load(path, [1, NUM_BINS, frames]) {
            Ok(model) => {
                log_debug(&format!("classifier model loaded from {}", path.display()));
                tracing::info!(model = %path.display(), "classifier model loaded");
                Self::with_model(Box::new(model))
            }
            Err(err) => {
                log_debug(&format!("classifier disabled: {err}"));
                tracing::warn!(error = %err, "classifier model failed to load");
                Self::unloaded(err.to_string())
            }
        }
    }

    pub fn with_model(model: Box<dyn CommandModel>) -> Self {
        Self {
            model: Some(model),
            load_error: None,
        }
    }

    pub fn unloaded(reason: impl Into<String>) -> Self {
        Self {
            model: None,
            load_error: Some(reason.into()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Run the model and pick the most probable class.
    pub fn try_classify(&self, features: &FeatureTensor) -> Result<CommandLabel, ClassifierError> {
        let model = self.model.as_ref().ok_or(ClassifierError::NotLoaded)?;
        let scores = model.forward(features)?;
        let peak = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        if !peak.is_finite() {
            return Err(ClassifierError::Inference(format!(
                "model produced non-finite scores (max {peak})"
            )));
        }
        let probabilities = softmax(&scores);
        let index = argmax(&probabilities)
            .ok_or_else(|| ClassifierError::Inference("model produced no usable scores".into()))?;
        Ok(CommandLabel::from_class_index(index))
    }

    /// Like [`Classifier::try_classify`], with every failure mapped to `Unknown`.
    pub fn classify(&self, features: &FeatureTensor) -> CommandLabel {
        match self.try_classify(features) {
            Ok(label) => label,
            Err(ClassifierError::NotLoaded) => CommandLabel::Unknown,
            Err(err) => {
                log_debug(&format!("classification failed: {err}"));
                CommandLabel::Unknown
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureExtractor;

    struct FixedScores(Vec<f32>);

    impl CommandModel for FixedScores {
        fn forward(&self, _: &FeatureTensor) -> Result<Vec<f32>, ClassifierError> {
            Ok(self.0.clone())
        }
    }

    struct Failing;

    impl CommandModel for Failing {
        fn forward(&self, _: &FeatureTensor) -> Result<Vec<f32>, ClassifierError> {
            Err(ClassifierError::Inference("boom".into()))
        }
    }

    fn silence() -> FeatureTensor {
        FeatureExtractor::new().extract(&[0i16; 1_600])
    }

    #[test]
    fn softmax_sums_to_one_and_preserves_order() {
        let probs = softmax(&[1.0, 3.0, 2.0, -1.0]);
        let total: f32 = probs.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert!(probs[1] > probs[2] && probs[2] > probs[0] && probs[0] > probs[3]);
    }

    #[test]
    fn softmax_handles_large_logits() {
        let probs = softmax(&[1_000.0, 999.0]);
        assert!(probs.iter().all(|p| p.is_finite()));
        assert!(probs[0] > probs[1]);
    }

    #[test]
    fn argmax_breaks_ties_by_lowest_index() {
        assert_eq!(argmax(&[0.25, 0.25, 0.25, 0.25]), Some(0));
        assert_eq!(argmax(&[0.1, 0.4, 0.4, 0.1]), Some(1));
    }

    #[test]
    fn argmax_skips_nan_and_empty() {
        assert_eq!(argmax(&[f32::NAN, 0.2, 0.1]), Some(1));
        assert_eq!(argmax(&[]), None);
        assert_eq!(argmax(&[f32::NAN]), None);
    }

    #[test]
    fn classify_maps_best_class_to_label() {
        let classifier = Classifier::with_model(Box::new(FixedScores(vec![0.1, 0.2, 5.0, 0.3])));
        assert_eq!(classifier.classify(&silence()), CommandLabel::Left);
    }

    #[test]
    fn missing_model_yields_unknown() {
        let classifier = Classifier::unloaded("no model");
        assert!(!classifier.is_loaded());
        assert_eq!(classifier.load_error(), Some("no model"));
        assert_eq!(classifier.classify(&silence()), CommandLabel::Unknown);
    }

    #[test]
    fn inference_error_yields_unknown() {
        let classifier = Classifier::with_model(Box::new(Failing));
        assert!(classifier.try_classify(&silence()).is_err());
        assert_eq!(classifier.classify(&silence()), CommandLabel::Unknown);
    }

    #[test]
    fn infinite_score_is_an_inference_error() {
        let classifier = Classifier::with_model(Box::new(FixedScores(vec![
            0.0,
            0.0,
            f32::INFINITY,
            0.0,
        ])));
        assert!(matches!(
            classifier.try_classify(&silence()),
            Err(ClassifierError::Inference(_))
        ));
        assert_eq!(classifier.classify(&silence()), CommandLabel::Unknown);

        let empty = Classifier::with_model(Box::new(FixedScores(Vec::new())));
        assert_eq!(empty.classify(&silence()), CommandLabel::Unknown);
    }

    #[test]
    fn extra_output_classes_fall_back_to_unknown() {
        let classifier =
            Classifier::with_model(Box::new(FixedScores(vec![0.0, 0.0, 0.0, 0.0, 9.0])));
        assert_eq!(classifier.classify(&silence()), CommandLabel::Unknown);
    }

    #[test]
    fn loading_missing_file_is_not_fatal() {
        let classifier = Classifier::load(Path::new("/no/such/model.onnx"), 501);
        assert!(!classifier.is_loaded());
        assert!(classifier
            .load_error()
            .is_some_and(|reason| reason.contains("/no/such/model.onnx")));
    }
}
