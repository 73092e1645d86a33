//! Recorded landmark sessions (JSON), for offline replay and tuning.
//!
//! ```json
//! [
//!   { "t_ms": 0,  "hands": [[{"x": 0.51, "y": 0.62}, ...]] },
//!   { "t_ms": 33, "hands": [] }
//! ]
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::landmark::HandResults;

#[derive(Debug, Error)]
pub enum RecordingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("samples out of order at index {index}")]
    OutOfOrder { index: usize },
}

/// One detector callback, stamped relative to the start of the recording.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub t_ms: u64,
    #[serde(flatten)]
    pub results: HandResults,
}

impl Sample {
    pub fn at(&self) -> Duration {
        Duration::from_millis(self.t_ms)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recording {
    pub samples: Vec<Sample>,
}

impl Recording {
    pub fn from_json(text: &str) -> Result<Self, RecordingError> {
        let rec: Recording = serde_json::from_str(text)?;
        if let Some(index) = rec.samples.windows(2).position(|w| w[1].t_ms < w[0].t_ms) {
            return Err(RecordingError::OutOfOrder { index: index + 1 });
        }
        Ok(rec)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RecordingError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String, RecordingError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn duration(&self) -> Duration {
        self.samples.last().map(Sample::at).unwrap_or_default()
    }
}
