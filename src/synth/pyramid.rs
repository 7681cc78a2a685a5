//! Multi-octave pyramid synthesis.
//!
//! Coarse octaves establish large-scale amplified patterns cheaply; the
//! detail carried from level to level seeds each finer pass with what the
//! coarser ones found, so structure is amplified coherently at every scale
//! instead of being re-derived from scratch at full resolution.

use tracing::{debug, warn};

use super::ascent;
use super::SynthError;
use crate::config::DreamConfig;
use crate::logging::{self, OctaveRecord, OctaveStatus};
use crate::oracle::{EnergyFn, OracleAdapter};
use crate::tensor::{resample, ImageTensor, Normalization};

/// Drives the full synthesis for one image: normalization, pyramid
/// construction, per-octave ascent with failure isolation, detail
/// propagation, and final denormalization.
///
/// # Example
///
/// ```
/// use octave_dream::{Amplifier, DreamConfig, ImageTensor, NormEnergy, OracleAdapter};
///
/// let config = DreamConfig { iterations: 2, num_octaves: 2, ..DreamConfig::default() };
/// let amplifier = Amplifier::new(config).unwrap();
/// let mut oracle = OracleAdapter::new(NormEnergy);
///
/// let input = ImageTensor::zeros(16, 16);
/// let output = amplifier.synthesize(&mut oracle, &input).unwrap();
/// assert_eq!(output.shape(), input.shape());
/// ```
pub struct Amplifier {
    config: DreamConfig,
    normalization: Normalization,
}

impl Amplifier {
    /// Validates `config` and builds an amplifier with the standard
    /// normalization statistics.
    pub fn new(config: DreamConfig) -> Result<Self, SynthError> {
        Self::with_normalization(config, Normalization::default())
    }

    pub fn with_normalization(
        config: DreamConfig,
        normalization: Normalization,
    ) -> Result<Self, SynthError> {
        config.validate()?;
        Ok(Self {
            config,
            normalization,
        })
    }

    pub fn config(&self) -> &DreamConfig {
        &self.config
    }

    /// Amplifies one raw `[0,1]` image and returns a raw `[0,1]` image of the
    /// same resolution.
    ///
    /// A failing octave is skipped (its detail contribution is dropped and
    /// the carry from coarser levels stands) rather than aborting the image.
    /// If every octave fails, the result is the input after a plain
    /// normalize/denormalize round trip, reported at warn level.
    pub fn synthesize<F: EnergyFn>(
        &self,
        oracle: &mut OracleAdapter<F>,
        raw: &ImageTensor,
    ) -> Result<ImageTensor, SynthError> {
        let base = self.normalization.normalize(raw);

        // octaves[0] is full resolution; each next level is coarser.
        let mut octaves = vec![base];
        for _ in 1..self.config.num_octaves {
            let coarser = resample::scale_down(
                octaves.last().expect("pyramid is non-empty"),
                self.config.octave_scale,
            );
            octaves.push(coarser);
        }

        let mut detail = ImageTensor::zeros_like(octaves.last().expect("pyramid is non-empty"));
        let mut failures = 0usize;

        for (index, level) in octaves.iter().rev().enumerate() {
            let (_, _, height, width) = level.shape();
            if index > 0 {
                detail = resample::resize_bilinear(&detail, height, width);
            }
            if detail.shape() != level.shape() {
                return Err(SynthError::ShapeMismatch {
                    expected: level.shape(),
                    actual: detail.shape(),
                });
            }

            let input = level + &detail;
            match ascent::ascend(
                oracle,
                input,
                self.config.iterations,
                self.config.learning_rate,
                &self.normalization,
            ) {
                Ok((ascended, energy)) => {
                    debug!(octave = index, height, width, energy, "octave ascended");
                    self.record_octave(index, height, width, OctaveStatus::Ok, Some(energy), &ascended);
                    detail = &ascended - level;
                }
                Err(err) => {
                    warn!(octave = index, height, width, %err, "octave failed, dropping its contribution");
                    self.record_octave(index, height, width, OctaveStatus::Failed, None, level);
                    failures += 1;
                }
            }
        }

        if failures == octaves.len() {
            warn!("every octave failed; returning the input unchanged");
        }

        // At the finest level `base + detail` equals the last ascended image
        // when that level succeeded, the upsampled coarse result when it
        // failed, and the unmodified base when everything failed.
        let finest = &octaves[0];
        Ok(self.normalization.denormalize(&(finest + &detail)))
    }

    fn record_octave(
        &self,
        octave: usize,
        height: usize,
        width: usize,
        status: OctaveStatus,
        energy: Option<f32>,
        image: &ImageTensor,
    ) {
        let record = OctaveRecord::new(octave, height, width, status, energy, image.statistics());
        if let Err(err) = logging::log_octave(&record) {
            debug!(%err, "failed to write octave log record");
        }
    }
}
