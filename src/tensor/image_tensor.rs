use std::fmt::{self, Display};
use std::ops::{Add, Sub};

use ndarray::{Array4, Axis};
use rayon::prelude::*;
use serde::Serialize;

/// Number of color channels every image tensor carries.
pub const CHANNELS: usize = 3;

/// Per-channel mean/standard-deviation constants mapping between raw
/// pixel space `[0,1]` and the normalized space a feature extractor expects.
///
/// Modeled as an explicit immutable struct rather than process-wide state so
/// two pipelines with different statistics can coexist.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Normalization {
    pub mean: [f32; CHANNELS],
    pub std: [f32; CHANNELS],
}

impl Default for Normalization {
    /// The domain-standard ImageNet statistics.
    fn default() -> Self {
        Self {
            mean: [0.485, 0.456, 0.406],
            std: [0.229, 0.224, 0.225],
        }
    }
}

impl Normalization {
    /// Maps a raw `[0,1]` image into normalized space: `(x - mean_c) / std_c`.
    pub fn normalize(&self, raw: &ImageTensor) -> ImageTensor {
        let mut data = raw.data.clone();
        for channel in 0..CHANNELS {
            let mean = self.mean[channel];
            let inv_std = 1.0 / self.std[channel];
            data.index_axis_mut(Axis(1), channel)
                .map_inplace(|value| *value = (*value - mean) * inv_std);
        }
        ImageTensor { data }
    }

    /// Inverse affine transform back to raw pixel space, clamped to `[0,1]`.
    ///
    /// Only used on the final output; intermediate octave results stay in
    /// normalized space and are kept displayable by [`clamp_valid_range`]
    /// instead.
    ///
    /// [`clamp_valid_range`]: Normalization::clamp_valid_range
    pub fn denormalize(&self, tensor: &ImageTensor) -> ImageTensor {
        let mut data = tensor.data.clone();
        for channel in 0..CHANNELS {
            let mean = self.mean[channel];
            let std = self.std[channel];
            data.index_axis_mut(Axis(1), channel)
                .map_inplace(|value| *value = value.mul_add(std, mean));
        }
        data.as_slice_mut()
            .expect("ndarray uses contiguous layout")
            .par_iter_mut()
            .for_each(|value| *value = value.clamp(0.0, 1.0));
        ImageTensor { data }
    }

    /// Normalized-space interval corresponding to raw values in `[0,1]`
    /// for one channel.
    pub fn channel_bounds(&self, channel: usize) -> (f32, f32) {
        let mean = self.mean[channel];
        let std = self.std[channel];
        (-mean / std, (1.0 - mean) / std)
    }

    /// Restricts every element of `tensor` (in place) to the normalized-space
    /// range that denormalizes into `[0,1]`. Applied after every ascent
    /// iteration so drift cannot compound across octaves. Idempotent.
    pub fn clamp_valid_range(&self, tensor: &mut ImageTensor) {
        for channel in 0..CHANNELS {
            let (lo, hi) = self.channel_bounds(channel);
            tensor
                .data
                .index_axis_mut(Axis(1), channel)
                .map_inplace(|value| *value = value.clamp(lo, hi));
        }
    }
}

/// A single image as a `(batch=1, channel=3, height, width)` f32 array.
///
/// The same type holds both raw-space and normalized-space pixels; which
/// space a value lives in is a protocol of the synthesis pipeline, not a
/// property of the type.
#[derive(Clone, Debug, Serialize)]
pub struct ImageTensor {
    pub data: Array4<f32>,
}

impl ImageTensor {
    pub fn zeros(height: usize, width: usize) -> Self {
        Self {
            data: Array4::zeros((1, CHANNELS, height, width)),
        }
    }

    pub fn zeros_like(other: &Self) -> Self {
        Self {
            data: Array4::zeros(other.data.dim()),
        }
    }

    pub fn from_array(data: Array4<f32>) -> Self {
        let (batch, channels, _, _) = data.dim();
        assert_eq!(batch, 1, "image tensors carry a single batch element");
        assert_eq!(channels, CHANNELS, "image tensors carry 3 channels");
        Self { data }
    }

    pub fn shape(&self) -> (usize, usize, usize, usize) {
        self.data.dim()
    }

    pub fn height(&self) -> usize {
        self.data.dim().2
    }

    pub fn width(&self) -> usize {
        self.data.dim().3
    }

    pub fn statistics(&self) -> TensorStatistics {
        let (_, _, height, width) = self.data.dim();
        let cells = (height * width) as f32;

        let mut mean_rgb = [0.0f32; CHANNELS];
        for (channel, mean) in mean_rgb.iter_mut().enumerate() {
            *mean = self.data.index_axis(Axis(1), channel).sum() / cells;
        }

        let mut variance_sum = 0.0f32;
        for channel in 0..CHANNELS {
            let mean = mean_rgb[channel];
            variance_sum += self
                .data
                .index_axis(Axis(1), channel)
                .iter()
                .map(|value| {
                    let diff = *value - mean;
                    diff * diff
                })
                .sum::<f32>();
        }

        TensorStatistics {
            mean_rgb,
            variance: variance_sum / (cells * CHANNELS as f32),
        }
    }
}

impl Display for ImageTensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.statistics();
        write!(
            f,
            "ImageTensor {}x{} mean_rgb=({:.3},{:.3},{:.3}) variance={:.5}",
            self.height(),
            self.width(),
            stats.mean_rgb[0],
            stats.mean_rgb[1],
            stats.mean_rgb[2],
            stats.variance,
        )
    }
}

impl Add for &ImageTensor {
    type Output = ImageTensor;

    fn add(self, rhs: Self) -> Self::Output {
        assert_eq!(self.data.dim(), rhs.data.dim(), "tensor shapes must match");
        ImageTensor {
            data: &self.data + &rhs.data,
        }
    }
}

impl Sub for &ImageTensor {
    type Output = ImageTensor;

    fn sub(self, rhs: Self) -> Self::Output {
        assert_eq!(self.data.dim(), rhs.data.dim(), "tensor shapes must match");
        ImageTensor {
            data: &self.data - &rhs.data,
        }
    }
}

/// Mean absolute value over all elements of a gradient-shaped array.
pub fn mean_abs(data: &Array4<f32>) -> f32 {
    let slice = data.as_slice().expect("contiguous");
    let sum: f32 = slice.par_iter().map(|value| value.abs()).sum();
    sum / slice.len() as f32
}

/// Per-image summary used by the JSON operation log.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TensorStatistics {
    pub mean_rgb: [f32; CHANNELS],
    pub variance: f32,
}
