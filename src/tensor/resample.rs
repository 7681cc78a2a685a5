//! Bilinear resampling of image tensors along the spatial axes.
//!
//! Only height and width ever change; batch and channel axes are preserved.
//! Sampling is corner-aligned (destination corners map exactly onto source
//! corners), so resizing to the same shape is the identity and endpoint
//! values are reproduced exactly.

use ndarray::Array4;

use super::image_tensor::{ImageTensor, CHANNELS};

/// Resizes `tensor` to `new_height` x `new_width` with bilinear interpolation.
pub fn resize_bilinear(tensor: &ImageTensor, new_height: usize, new_width: usize) -> ImageTensor {
    assert!(new_height > 0 && new_width > 0, "target shape must be non-empty");
    let (_, _, height, width) = tensor.shape();
    if height == new_height && width == new_width {
        return tensor.clone();
    }

    let row_scale = axis_scale(height, new_height);
    let col_scale = axis_scale(width, new_width);

    let data = Array4::from_shape_fn((1, CHANNELS, new_height, new_width), |(_, c, y, x)| {
        let src_y = y as f32 * row_scale;
        let src_x = x as f32 * col_scale;

        let y0 = src_y.floor() as usize;
        let x0 = src_x.floor() as usize;
        let y1 = (y0 + 1).min(height - 1);
        let x1 = (x0 + 1).min(width - 1);
        let fy = src_y - y0 as f32;
        let fx = src_x - x0 as f32;

        let top = lerp(tensor.data[[0, c, y0, x0]], tensor.data[[0, c, y0, x1]], fx);
        let bottom = lerp(tensor.data[[0, c, y1, x0]], tensor.data[[0, c, y1, x1]], fx);
        lerp(top, bottom, fy)
    });

    ImageTensor { data }
}

/// Downsamples by `factor` (> 1), rounding the target shape and never going
/// below 1x1. This is the per-level reduction used by the octave pyramid.
pub fn scale_down(tensor: &ImageTensor, factor: f32) -> ImageTensor {
    let (_, _, height, width) = tensor.shape();
    let new_height = ((height as f32 / factor).round() as usize).max(1);
    let new_width = ((width as f32 / factor).round() as usize).max(1);
    resize_bilinear(tensor, new_height, new_width)
}

fn axis_scale(src_len: usize, dst_len: usize) -> f32 {
    if dst_len > 1 {
        (src_len - 1) as f32 / (dst_len - 1) as f32
    } else {
        0.0
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    #[test]
    fn test_resize_to_same_shape_is_identity() {
        let tensor = ImageTensor::from_array(Array4::from_shape_fn(
            (1, CHANNELS, 5, 7),
            |(_, c, y, x)| (c * 100 + y * 7 + x) as f32,
        ));

        let resized = resize_bilinear(&tensor, 5, 7);
        assert_eq!(tensor.data, resized.data);
    }

    #[test]
    fn test_upsample_linear_ramp_exactly() {
        // 2x2 ramp v = 6y + 3x; bilinear upsampling of a plane is exact,
        // so the 4x4 result must be v = 2y + x.
        let tensor = ImageTensor::from_array(Array4::from_shape_fn(
            (1, CHANNELS, 2, 2),
            |(_, _, y, x)| (6 * y + 3 * x) as f32,
        ));

        let up = resize_bilinear(&tensor, 4, 4);
        assert_eq!(up.shape(), (1, CHANNELS, 4, 4));
        for c in 0..CHANNELS {
            for y in 0..4 {
                for x in 0..4 {
                    let expected = (2 * y + x) as f32;
                    let got = up.data[[0, c, y, x]];
                    assert!(
                        (got - expected).abs() < 1e-5,
                        "({y},{x}) expected {expected}, got {got}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_downsample_preserves_corners() {
        let tensor = ImageTensor::from_array(Array4::from_shape_fn(
            (1, CHANNELS, 8, 8),
            |(_, _, y, x)| (y * 8 + x) as f32,
        ));

        let down = resize_bilinear(&tensor, 4, 4);
        assert_eq!(down.data[[0, 0, 0, 0]], tensor.data[[0, 0, 0, 0]]);
        assert_eq!(down.data[[0, 0, 3, 3]], tensor.data[[0, 0, 7, 7]]);
    }

    #[test]
    fn test_scale_down_rounds_shape() {
        let tensor = ImageTensor::zeros(10, 7);
        let down = scale_down(&tensor, 1.4);
        assert_eq!(down.shape(), (1, CHANNELS, 7, 5));
    }

    #[test]
    fn test_scale_down_never_collapses_to_zero() {
        let tensor = ImageTensor::zeros(2, 2);
        let down = scale_down(&tensor, 8.0);
        assert_eq!(down.shape(), (1, CHANNELS, 1, 1));
    }
}
