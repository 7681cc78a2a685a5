//! Image tensor types, normalization, and spatial resampling.

pub mod image_tensor;
pub mod resample;

pub use image_tensor::{mean_abs, ImageTensor, Normalization, TensorStatistics, CHANNELS};
pub use resample::{resize_bilinear, scale_down};
