//! Directory-level batch driver.
//!
//! Walks an input directory, amplifies every raster image in it, and writes
//! the results to an output directory. Outputs that already exist are skipped
//! so interrupted runs can resume, and a failure on one image never stops the
//! rest of the batch.

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use ndarray::Array4;
use tracing::{info, warn};

use crate::config::BatchConfig;
use crate::oracle::{EnergyFn, OracleAdapter};
use crate::synth::{Amplifier, SynthError};
use crate::tensor::{ImageTensor, CHANNELS};

/// Raster formats the driver accepts, by file extension.
const IMAGE_EXTENSIONS: &[&str] = &[
    "bmp", "dib", "png", "jpg", "jpeg", "pbm", "pgm", "ppm", "tif", "tiff",
];

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Synth(#[from] SynthError),
}

/// Counts of what a batch run did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Runs an [`Amplifier`] over every image in a directory.
pub struct BatchRunner<F: EnergyFn> {
    amplifier: Amplifier,
    oracle: OracleAdapter<F>,
    config: BatchConfig,
}

impl<F: EnergyFn> BatchRunner<F> {
    pub fn new(amplifier: Amplifier, oracle: OracleAdapter<F>, config: BatchConfig) -> Self {
        Self {
            amplifier,
            oracle,
            config,
        }
    }

    /// Processes the whole input directory.
    ///
    /// Non-image files and already-produced outputs are skipped; an image
    /// that fails to decode, synthesize, or encode is counted and logged but
    /// does not abort the run.
    pub fn run(&mut self) -> Result<BatchSummary, BatchError> {
        fs::create_dir_all(&self.config.output_dir)?;

        let mut entries: Vec<PathBuf> = fs::read_dir(&self.config.input_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        entries.sort();
        info!(
            input_dir = %self.config.input_dir.display(),
            count = entries.len(),
            "starting batch"
        );

        let mut summary = BatchSummary::default();
        for path in entries {
            if !is_image_path(&path) {
                summary.skipped += 1;
                continue;
            }

            let output_path = self.output_path(&path);
            if output_path.exists() {
                info!(output = %output_path.display(), "output exists, skipping");
                summary.skipped += 1;
                continue;
            }

            match self.amplify_file(&path, &output_path) {
                Ok(()) => {
                    info!(output = %output_path.display(), "saved");
                    summary.processed += 1;
                }
                Err(err) => {
                    warn!(input = %path.display(), %err, "image failed, continuing");
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    fn amplify_file(&mut self, input: &Path, output: &Path) -> Result<(), BatchError> {
        let decoded = image::open(input)?.to_rgb8();
        let tensor = tensor_from_rgb8(&decoded);
        let amplified = self.amplifier.synthesize(&mut self.oracle, &tensor)?;
        rgb8_from_tensor(&amplified).save(output)?;
        Ok(())
    }

    fn output_path(&self, input: &Path) -> PathBuf {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = match &self.config.prefix {
            Some(prefix) => format!("{prefix}_{name}"),
            None => name,
        };
        self.config.output_dir.join(name)
    }
}

fn is_image_path(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.iter().any(|known| *known == ext)
        })
        .unwrap_or(false)
}

/// Decodes an 8-bit RGB image into a raw-space `[0,1]` tensor.
pub fn tensor_from_rgb8(image: &RgbImage) -> ImageTensor {
    let (width, height) = image.dimensions();
    let data = Array4::from_shape_fn(
        (1, CHANNELS, height as usize, width as usize),
        |(_, c, y, x)| f32::from(image.get_pixel(x as u32, y as u32)[c]) / 255.0,
    );
    ImageTensor { data }
}

/// Encodes a raw-space `[0,1]` tensor back into an 8-bit RGB image.
pub fn rgb8_from_tensor(tensor: &ImageTensor) -> RgbImage {
    let (_, _, height, width) = tensor.shape();
    RgbImage::from_fn(width as u32, height as u32, |x, y| {
        let mut pixel = [0u8; CHANNELS];
        for (c, out) in pixel.iter_mut().enumerate() {
            let value = tensor.data[[0, c, y as usize, x as usize]];
            *out = (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
        Rgb(pixel)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_filter_accepts_rasters() {
        assert!(IMAGE_EXTENSIONS.contains(&"png"));
        assert!(IMAGE_EXTENSIONS.contains(&"tiff"));
        assert!(!IMAGE_EXTENSIONS.contains(&"txt"));
    }

    #[test]
    fn test_tensor_rgb8_round_trip() {
        let mut image = RgbImage::new(3, 2);
        for (i, pixel) in image.pixels_mut().enumerate() {
            *pixel = Rgb([i as u8 * 40, 255 - i as u8 * 40, 128]);
        }

        let tensor = tensor_from_rgb8(&image);
        assert_eq!(tensor.shape(), (1, CHANNELS, 2, 3));
        let back = rgb8_from_tensor(&tensor);
        assert_eq!(image, back);
    }

    #[test]
    fn test_output_path_applies_prefix() {
        let amplifier = Amplifier::new(crate::config::DreamConfig::default()).unwrap();
        let oracle = OracleAdapter::new(crate::oracle::NormEnergy);
        let config = BatchConfig {
            input_dir: PathBuf::from("in"),
            output_dir: PathBuf::from("out"),
            prefix: Some("vgg19".into()),
        };
        let runner = BatchRunner::new(amplifier, oracle, config);

        let path = runner.output_path(Path::new("in/cat.png"));
        assert_eq!(path, PathBuf::from("out/vgg19_cat.png"));
    }
}
