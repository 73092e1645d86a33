//! Gesture thresholds.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How long a trigger gesture must stay unchanged before it fires.
pub const TRIGGER_HOLD_MS: u64 = 400;

/// Thumb-to-index distance, in screen pixels, below which a pinch is active.
/// Resolution dependent on purpose: it is measured on the real viewport.
pub const PINCH_THRESHOLD_PX: f32 = 60.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub trigger_hold_ms:    u64,
    pub pinch_threshold_px: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        GestureConfig {
            trigger_hold_ms:    TRIGGER_HOLD_MS,
            pinch_threshold_px: PINCH_THRESHOLD_PX,
        }
    }
}

impl GestureConfig {
    pub fn trigger_hold(&self) -> Duration {
        Duration::from_millis(self.trigger_hold_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: GestureConfig = serde_json::from_str(r#"{"trigger_hold_ms": 250}"#).unwrap();
        assert_eq!(cfg.trigger_hold(), Duration::from_millis(250));
        assert_eq!(cfg.pinch_threshold_px, PINCH_THRESHOLD_PX);
    }
}
