use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use image::DynamicImage;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use serde::Serialize;

use super::preprocess::to_model_input;
use super::InferenceError;

/// Fixed mapping from the model's 10 output classes to age brackets.
pub const AGE_GROUPS: [&str; 10] = [
    "0-2", "3-9", "10-19", "20-29", "30-39", "40-49", "50-59", "60-69", "70-79", "80+",
];

/// A finished classification, ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub age: String,
    pub confidence: f32,
    pub image_url: String,
    pub timestamp: DateTime<Utc>,
}

impl Prediction {
    pub fn new(age: String, confidence: f32, image_url: String) -> Self {
        Self {
            age,
            confidence,
            image_url,
            timestamp: Utc::now(),
        }
    }
}

/// Produces a probability distribution over the age brackets for one image.
pub trait Classifier: Send + Sync {
    fn probabilities(&self, image: &DynamicImage) -> Result<Vec<f32>, InferenceError>;
}

/// ONNX Runtime session wrapper. `Session::run` takes `&mut self`, so the
/// session sits behind a mutex; the model is loaded once at startup and
/// forward passes are short.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxClassifier {
    pub fn load(model_path: &Path) -> Result<Self, InferenceError> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(model_path)?;
        let input_name = session.inputs[0].name.clone();
        let output_name = session.outputs[0].name.clone();
        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn probabilities(&self, image: &DynamicImage) -> Result<Vec<f32>, InferenceError> {
        let input = to_model_input(image)?;
        let value = Value::from_array(input)?;
        let mut session = self.session.lock().unwrap();
        let outputs = session.run(ort::inputs![self.input_name.as_str() => value])?;
        let logits = outputs[self.output_name.as_str()].try_extract_array::<f32>()?;
        let logits: Vec<f32> = logits.iter().copied().collect();
        Ok(softmax(&logits))
    }
}

/// The age classifier behind its narrow interface: image bytes in, age
/// bracket and confidence percentage out.
#[derive(Clone)]
pub struct AgeModel {
    classifier: Arc<dyn Classifier>,
}

impl AgeModel {
    pub fn load(model_path: &Path) -> Result<Self, InferenceError> {
        Ok(Self {
            classifier: Arc::new(OnnxClassifier::load(model_path)?),
        })
    }

    pub fn with_classifier(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    /// Decodes `image_bytes` and returns the predicted age bracket together
    /// with its confidence as a percentage rounded half-up to two decimals.
    pub fn predict(&self, image_bytes: &[u8]) -> Result<(String, f32), InferenceError> {
        let image = image::load_from_memory(image_bytes)?;
        let probabilities = self.classifier.probabilities(&image)?;
        let (class, probability) =
            top_class(&probabilities).ok_or(InferenceError::EmptyOutput)?;
        let label = AGE_GROUPS
            .get(class)
            .copied()
            .ok_or(InferenceError::UnknownClass(class))?;
        Ok((label.to_string(), to_percent(probability)))
    }
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index and value of the largest probability; the first one wins on ties.
fn top_class(probabilities: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, p) in probabilities.iter().copied().enumerate() {
        match best {
            Some((_, current)) if p <= current => {}
            _ => best = Some((idx, p)),
        }
    }
    best
}

/// Probability to percentage, rounded half-up to two decimals.
fn to_percent(probability: f32) -> f32 {
    ((f64::from(probability) * 10_000.0).round() / 100.0) as f32
}
