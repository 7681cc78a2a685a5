//! Single-resolution gradient ascent.

use ndarray::Zip;
use tracing::trace;

use crate::oracle::{EnergyFn, OracleAdapter, OracleError};
use crate::tensor::{mean_abs, ImageTensor, Normalization};

/// Runs `iterations` ascent steps on `image` at a fixed resolution.
///
/// Each step queries the oracle, re-normalizes the step size by the mean
/// gradient magnitude, moves the image *up* the gradient, and clamps it back
/// into the displayable range. The per-iteration re-normalization is the key
/// stability device: raw gradient scale varies wildly across octave
/// resolutions, and a fixed step size would either stall coarse levels or
/// blow up fine ones.
///
/// Returns the ascended image together with the last observed energy. Any
/// oracle failure propagates; the pyramid layer decides what a failed octave
/// means for the whole image.
pub fn ascend<F: EnergyFn>(
    oracle: &mut OracleAdapter<F>,
    mut image: ImageTensor,
    iterations: usize,
    learning_rate: f32,
    normalization: &Normalization,
) -> Result<(ImageTensor, f32), OracleError> {
    let mut last_energy = 0.0;

    for iteration in 0..iterations {
        let (energy, grad) = oracle.evaluate(&image)?;
        last_energy = energy;

        let avg_grad = mean_abs(grad);
        if !avg_grad.is_finite() {
            return Err(OracleError::Numerical(format!(
                "mean gradient magnitude is not finite: {avg_grad}"
            )));
        }

        // A zero gradient means the energy is flat here; stepping would only
        // divide by zero, so the image is left untouched.
        if avg_grad > 0.0 {
            let step = learning_rate / avg_grad;
            Zip::from(&mut image.data)
                .and(grad)
                .for_each(|value, &g| *value += step * g);
        }

        normalization.clamp_valid_range(&mut image);
        trace!(iteration, energy, avg_grad, "ascent step");
    }

    Ok((image, last_energy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::OracleError;
    use ndarray::Array4;

    fn constant_gradient(magnitude: f32) -> impl EnergyFn {
        crate::oracle::energy_fn(
            move |_: &ImageTensor, grad: &mut Array4<f32>| -> Result<f32, OracleError> {
                grad.fill(magnitude);
                Ok(magnitude)
            },
        )
    }

    #[test]
    fn test_zero_gradient_is_a_fixed_point() {
        let normalization = Normalization::default();
        let image = ImageTensor::from_array(Array4::from_elem((1, 3, 4, 4), 0.25));
        let mut oracle = OracleAdapter::new(constant_gradient(0.0));

        let (out, _) = ascend(&mut oracle, image.clone(), 10, 0.05, &normalization).unwrap();

        assert_eq!(image.data, out.data);
    }

    #[test]
    fn test_constant_gradient_step_is_normalized() {
        // Gradient of constant magnitude 2.0 everywhere: mean |grad| = 2.0,
        // so the effective step is (0.02 / 2.0) * 2.0 = 0.02 per pixel.
        let normalization = Normalization::default();
        let image = ImageTensor::zeros(4, 4);
        let mut oracle = OracleAdapter::new(constant_gradient(2.0));

        let (out, energy) = ascend(&mut oracle, image, 1, 0.02, &normalization).unwrap();

        assert_eq!(energy, 2.0);
        for value in out.data.iter() {
            assert!((value - 0.02).abs() < 1e-6, "expected 0.02, got {value}");
        }
    }

    #[test]
    fn test_step_size_is_independent_of_gradient_scale() {
        // Magnitudes 2.0 and 200.0 must produce the same update, because the
        // step is re-normalized by the mean gradient magnitude.
        let normalization = Normalization::default();

        let (small, _) = ascend(
            &mut OracleAdapter::new(constant_gradient(2.0)),
            ImageTensor::zeros(4, 4),
            1,
            0.02,
            &normalization,
        )
        .unwrap();
        let (large, _) = ascend(
            &mut OracleAdapter::new(constant_gradient(200.0)),
            ImageTensor::zeros(4, 4),
            1,
            0.02,
            &normalization,
        )
        .unwrap();

        for (a, b) in small.data.iter().zip(large.data.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_result_stays_in_valid_range() {
        let normalization = Normalization::default();
        let image = ImageTensor::zeros(4, 4);
        let mut oracle = OracleAdapter::new(constant_gradient(1.0));

        // A huge learning rate would push far past the displayable range;
        // clamping after every iteration must contain it.
        let (out, _) = ascend(&mut oracle, image, 5, 100.0, &normalization).unwrap();

        let mut clamped = out.clone();
        normalization.clamp_valid_range(&mut clamped);
        assert_eq!(out.data, clamped.data);
    }

    #[test]
    fn test_oracle_failure_propagates() {
        let normalization = Normalization::default();
        let image = ImageTensor::zeros(2, 2);
        let mut oracle = OracleAdapter::new(crate::oracle::energy_fn(
            |_: &ImageTensor, _: &mut Array4<f32>| -> Result<f32, OracleError> {
                Err(OracleError::Numerical("overflow".into()))
            },
        ));

        assert!(ascend(&mut oracle, image, 1, 0.01, &normalization).is_err());
    }
}
