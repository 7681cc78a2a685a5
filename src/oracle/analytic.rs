//! Closed-form energy functions.
//!
//! Useful for demos and tests: they exercise the full synthesis pipeline
//! without an external network. `NormEnergy` mirrors the common
//! maximize-the-activation-norm objective at the oracle boundary.

use ndarray::{Array4, Zip};

use super::{EnergyFn, OracleError};
use crate::tensor::ImageTensor;

/// Energy = L2 norm of the image; gradient = `x / ||x||`.
///
/// Ascending this energy brightens every pixel in proportion to its current
/// value, which makes drift across octaves easy to observe.
#[derive(Debug, Default, Clone, Copy)]
pub struct NormEnergy;

impl EnergyFn for NormEnergy {
    fn evaluate(&mut self, image: &ImageTensor, grad: &mut Array4<f32>) -> Result<f32, OracleError> {
        let sum_sq: f32 = image.data.iter().map(|v| v * v).sum();
        let norm = sum_sq.sqrt();
        if norm > 0.0 {
            Zip::from(grad)
                .and(&image.data)
                .for_each(|g, &v| *g = v / norm);
        }
        Ok(norm)
    }
}
