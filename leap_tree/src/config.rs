//! Application configuration.
//!
//! Every field has a default, so a config file only lists what it changes:
//!
//! ```json
//! { "photo_dir": "my_photos", "scene": { "photo_count": 12 }, "window": { "width": 1600 } }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use card_repel::RepelConfig;
use hand_gesture::GestureConfig;
use serde::{Deserialize, Serialize};
use tree_scene::SceneConfig;

use crate::error::AppError;
use crate::particles::ParticleConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width:  usize,
    pub height: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig { width: 1280, height: 720 }
    }
}

/// Card board layout before free layout takes over.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardsConfig {
    pub count:   usize,
    pub columns: usize,
    pub width:   f32,
    pub height:  f32,
    pub gap:     f32,
}

impl Default for CardsConfig {
    fn default() -> Self {
        CardsConfig { count: 6, columns: 3, width: 260.0, height: 160.0, gap: 40.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scene:     SceneConfig,
    pub gestures:  GestureConfig,
    pub repel:     RepelConfig,
    pub particles: ParticleConfig,
    pub window:    WindowConfig,
    pub cards:     CardsConfig,
    /// Directory holding `0.jpg`, `1.png`, …
    pub photo_dir: PathBuf,
    /// Seed for decoration placement and particle clouds.
    pub seed:      u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            scene:     SceneConfig::default(),
            gestures:  GestureConfig::default(),
            repel:     RepelConfig::default(),
            particles: ParticleConfig::default(),
            window:    WindowConfig::default(),
            cards:     CardsConfig::default(),
            photo_dir: PathBuf::from("photo"),
            seed:      2024,
        }
    }
}

impl AppConfig {
    pub fn from_json(text: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Card physics settings, with the pinch threshold taken from the
    /// gesture settings so both scenes agree on what a pinch is.
    pub fn repel_config(&self) -> RepelConfig {
        RepelConfig { pinch_threshold_px: self.gestures.pinch_threshold_px, ..self.repel }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = AppConfig::from_json(r#"{ "photo_dir": "pics", "scene": { "photo_count": 3 } }"#).unwrap();
        assert_eq!(cfg.photo_dir, PathBuf::from("pics"));
        assert_eq!(cfg.scene.photo_count, 3);
        assert_eq!(cfg.scene.tree_height, 1100.0);
        assert_eq!(cfg.gestures.trigger_hold_ms, 400);
        assert_eq!(cfg.window, WindowConfig::default());
    }

    #[test]
    fn pinch_threshold_is_shared() {
        let cfg = AppConfig::from_json(r#"{ "gestures": { "pinch_threshold_px": 45.0 } }"#).unwrap();
        assert_eq!(cfg.repel_config().pinch_threshold_px, 45.0);
        assert_eq!(cfg.repel_config().push_step, 5.0);
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "seed": 9 }}"#).unwrap();
        assert_eq!(AppConfig::load(file.path()).unwrap().seed, 9);
    }

    #[test]
    fn bad_json_is_reported() {
        assert!(matches!(AppConfig::from_json("{ nope"), Err(AppError::Config(_))));
        assert!(matches!(AppConfig::load("/no/such/config.json"), Err(AppError::Io(_))));
    }
}
