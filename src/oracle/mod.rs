//! Gradient oracle boundary.
//!
//! The feature extractor is an external collaborator: all the synthesis core
//! sees is a differentiable scalar "activation energy" and its per-pixel
//! gradient. [`EnergyFn`] is the seam an application implements (typically
//! dispatching to an accelerator-backed network); [`OracleAdapter`] wraps it
//! and owns the gradient buffer, guaranteeing the slot is zeroed before every
//! query so no gradient can accumulate across ascent iterations.

pub mod analytic;

use ndarray::Array4;

use crate::tensor::ImageTensor;

pub use analytic::NormEnergy;

/// Failure raised by an energy function for a single query.
///
/// Recovered per octave by the pyramid synthesizer; never fatal on its own.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("numerical failure in energy function: {0}")]
    Numerical(String),
}

/// An externally supplied differentiable scalar energy.
///
/// Implementations compute the energy of `image` and write its gradient into
/// `grad`, which arrives zero-filled and shaped exactly like `image.data`.
/// Implementations must not retain state between calls that would make the
/// gradient depend on earlier queries.
pub trait EnergyFn {
    fn evaluate(&mut self, image: &ImageTensor, grad: &mut Array4<f32>) -> Result<f32, OracleError>;
}

/// Adapts a closure into an [`EnergyFn`]; handy for tests and ad hoc
/// energies.
pub fn energy_fn<F>(f: F) -> EnergyClosure<F>
where
    F: FnMut(&ImageTensor, &mut Array4<f32>) -> Result<f32, OracleError>,
{
    EnergyClosure(f)
}

pub struct EnergyClosure<F>(F);

impl<F> EnergyFn for EnergyClosure<F>
where
    F: FnMut(&ImageTensor, &mut Array4<f32>) -> Result<f32, OracleError>,
{
    fn evaluate(&mut self, image: &ImageTensor, grad: &mut Array4<f32>) -> Result<f32, OracleError> {
        (self.0)(image, grad)
    }
}

/// Wraps an [`EnergyFn`] with an owned, explicitly zeroed gradient slot.
pub struct OracleAdapter<F: EnergyFn> {
    energy: F,
    grad: Array4<f32>,
}

impl<F: EnergyFn> OracleAdapter<F> {
    pub fn new(energy: F) -> Self {
        Self {
            energy,
            grad: Array4::zeros((1, crate::tensor::CHANNELS, 0, 0)),
        }
    }

    /// Queries the energy function at `image`.
    ///
    /// Returns the scalar energy and a borrow of the freshly written gradient,
    /// shaped like the image. The gradient slot is zeroed (or reallocated, on
    /// a shape change) before the underlying function runs, so repeated calls
    /// never see stale gradient mass.
    pub fn evaluate(&mut self, image: &ImageTensor) -> Result<(f32, &Array4<f32>), OracleError> {
        if self.grad.dim() != image.data.dim() {
            self.grad = Array4::zeros(image.data.dim());
        } else {
            self.grad.fill(0.0);
        }

        let energy = self.energy.evaluate(image, &mut self.grad)?;
        if !energy.is_finite() {
            return Err(OracleError::Numerical(format!(
                "energy is not finite: {energy}"
            )));
        }
        Ok((energy, &self.grad))
    }
}
