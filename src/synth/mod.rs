//! The multi-octave gradient-ascent synthesis core.
//!
//! `ascent` runs the fixed-resolution optimization loop; `pyramid` stacks it
//! across a coarse-to-fine resolution pyramid with per-octave failure
//! isolation.

pub mod ascent;
pub mod pyramid;

pub use ascent::ascend;
pub use pyramid::Amplifier;

use crate::config::ConfigError;

/// Fatal errors of a single image's synthesis.
///
/// Oracle failures are deliberately absent: they are contained per octave
/// inside [`Amplifier::synthesize`] and degrade the output instead of
/// aborting it.
#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("detail tensor shape {actual:?} does not match octave shape {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize, usize, usize),
        actual: (usize, usize, usize, usize),
    },
}
