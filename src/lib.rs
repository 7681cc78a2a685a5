//! # Octave Dream
//!
//! A multi-octave gradient-ascent image amplifier: pixel values are nudged
//! to maximize the activation energy an external feature extractor reports,
//! and the result is blended across a coarse-to-fine resolution pyramid so
//! both large structure and fine texture are amplified coherently.
//!
//! ## Quick Start
//!
//! ```rust
//! use octave_dream::{Amplifier, DreamConfig, ImageTensor, NormEnergy, OracleAdapter};
//!
//! let config = DreamConfig {
//!     iterations: 4,
//!     num_octaves: 3,
//!     ..DreamConfig::default()
//! };
//! let amplifier = Amplifier::new(config).unwrap();
//!
//! // Any differentiable scalar energy can drive the ascent; NormEnergy is a
//! // closed-form stand-in for a network activation.
//! let mut oracle = OracleAdapter::new(NormEnergy);
//!
//! let input = ImageTensor::zeros(32, 32);
//! let amplified = amplifier.synthesize(&mut oracle, &input).unwrap();
//! assert_eq!(amplified.shape(), input.shape());
//! ```
//!
//! ## Core Modules
//!
//! - [`config`] - Hyperparameter and batch configuration via TOML
//! - [`tensor`] - Image tensors, normalization, bilinear resampling
//! - [`oracle`] - The gradient-oracle boundary and its adapter
//! - [`synth`] - Octave ascent and pyramid synthesis
//! - [`batch`] - Directory-level batch driver
//! - [`logging`] - JSON line-delimited octave logging

pub mod batch;
pub mod config;
pub mod logging;
pub mod oracle;
pub mod synth;
pub mod tensor;

pub use batch::{BatchRunner, BatchSummary};
pub use config::{BatchConfig, ConfigError, DreamConfig};
pub use oracle::{energy_fn, EnergyClosure, EnergyFn, NormEnergy, OracleAdapter, OracleError};
pub use synth::{Amplifier, SynthError};
pub use tensor::{ImageTensor, Normalization, TensorStatistics};
