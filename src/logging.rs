//! JSON line-delimited logging of synthesis operations.
//!
//! One record is appended per octave, carrying the level's shape, final
//! energy, and outcome. The sink is the file named by the `OCTAVE_DREAM_LOG`
//! environment variable; when unset, logging is a no-op so library users pay
//! nothing by default.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::tensor::TensorStatistics;

pub const LOG_ENV_VAR: &str = "OCTAVE_DREAM_LOG";

/// Outcome of one octave's ascent, as recorded in the log.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OctaveStatus {
    Ok,
    Failed,
}

/// One line of the operation log.
#[derive(Debug, Serialize)]
pub struct OctaveRecord {
    pub timestamp: u64,
    pub octave: usize,
    pub height: usize,
    pub width: usize,
    pub status: OctaveStatus,
    /// Final activation energy; absent when the octave failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<f32>,
    pub stats: TensorStatistics,
}

impl OctaveRecord {
    pub fn new(
        octave: usize,
        height: usize,
        width: usize,
        status: OctaveStatus,
        energy: Option<f32>,
        stats: TensorStatistics,
    ) -> Self {
        Self {
            timestamp: unix_seconds(),
            octave,
            height,
            width,
            status,
            energy,
            stats,
        }
    }
}

/// Appends `record` as one JSON line to the configured sink.
pub fn log_octave(record: &OctaveRecord) -> io::Result<()> {
    let Some(path) = std::env::var_os(LOG_ENV_VAR) else {
        return Ok(());
    };

    let line = serde_json::to_string(record)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", line)
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
