use image::imageops::{self, FilterType};
use ndarray::Array4;
use thiserror::Error;

use crate::shared::constants::DEFAULT_TENSOR_SIZE;
use crate::shared::frame::Frame;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Cannot preprocess an empty crop")]
    EmptyCrop,
}

/// Converts a face crop into the `[1, 3, S, S]` float tensor the classifier
/// expects: bilinear resize to S×S, channel-major layout, values scaled from
/// `[0, 255]` to `[0, 1]`.
pub struct TensorPreprocessor {
    size: u32,
}

impl TensorPreprocessor {
    pub fn new(size: u32) -> Self {
        Self { size }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn prepare(&self, crop: &Frame) -> Result<Array4<f32>, PreprocessError> {
        if crop.width() == 0 || crop.height() == 0 {
            return Err(PreprocessError::EmptyCrop);
        }

        let resized = imageops::resize(
            &crop.as_image(),
            self.size,
            self.size,
            FilterType::Triangle,
        );

        let side = self.size as usize;
        let mut tensor = Array4::<f32>::zeros((1, 3, side, side));
        for (x, y, pixel) in resized.enumerate_pixels() {
            for c in 0..3 {
                tensor[[0, c, y as usize, x as usize]] = pixel.0[c] as f32 / 255.0;
            }
        }
        Ok(tensor)
    }
}

impl Default for TensorPreprocessor {
    fn default() -> Self {
        Self::new(DEFAULT_TENSOR_SIZE)
    }
}
