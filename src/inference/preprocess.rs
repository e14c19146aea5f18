use image::{imageops::FilterType, DynamicImage};
use ndarray::{Array3, Array4, Axis};

use super::InferenceError;

pub const INPUT_SIZE: u32 = 224;

// The classifier was trained with inputs scaled to [0, 1] and normalized
// with mean 0.5 / std 0.5 per channel.
const MEAN: f32 = 0.5;
const STD: f32 = 0.5;

/// Resizes the image to the model's 224x224 input, normalizes it and lays
/// the pixels out as an NCHW batch of one.
pub fn to_model_input(image: &DynamicImage) -> Result<Array4<f32>, InferenceError> {
    let rgb = image
        .resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::Triangle)
        .to_rgb8();
    let pixels: Vec<f32> = rgb
        .into_raw()
        .into_iter()
        .map(|v| ((v as f32 / 255.0) - MEAN) / STD)
        .collect();

    let arr = Array3::from_shape_vec((INPUT_SIZE as usize, INPUT_SIZE as usize, 3), pixels)?
        .permuted_axes([2, 0, 1])
        .insert_axis(Axis(0));
    Ok(arr)
}
