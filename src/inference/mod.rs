mod model;
mod preprocess;

pub use model::{AgeModel, Classifier, Prediction, AGE_GROUPS};

/// Failures on the path from raw upload bytes to a prediction.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("bad input layout: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error("model error: {0}")]
    Model(#[from] ort::Error),
    #[error("model returned an empty distribution")]
    EmptyOutput,
    #[error("model produced class {0}, outside the age group table")]
    UnknownClass(usize),
}
