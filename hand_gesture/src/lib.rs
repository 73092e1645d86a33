//! # hand_gesture
//!
//! Turns per-frame hand landmarks (21 normalized points from an external
//! detector) into discrete gestures, and gates trigger-style gestures behind
//! a hold-to-confirm debouncer.
//!
//! ## Gesture → meaning
//!
//! | Gesture | Shape | Kind |
//! |---|---|---|
//! | `Fist` | four fingertips curled toward the wrist | trigger (held) |
//! | `Open` | all five digits extended | trigger (held) |
//! | `Point` | index extended, others curled | continuous |
//! | `PinchActive` | thumb and index tips < 60 px apart | continuous |
//! | `PinchInactive` | hand visible, tips apart | continuous |
//! | `None` | no hand, or no pattern matched | — |
//!
//! Finger state is judged by distance to the wrist, so the classifier does not
//! care how the hand is rolled in the image plane.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use hand_gesture::{classify_pose, HoldDebouncer, HandResults, Trigger};
//!
//! let mut hold = HoldDebouncer::new(Duration::from_millis(400));
//! let results = HandResults::default();          // from the detector callback
//! let frame = results.first_hand();
//! let gesture = classify_pose(frame.as_ref());
//! if let Some(Trigger::Open) = hold.update(gesture, Duration::from_millis(16)) {
//!     // enter universe mode
//! }
//! ```

pub mod classify;
pub mod config;
pub mod hold;
pub mod landmark;
pub mod recording;
pub mod slot;
pub mod synth;

pub use classify::{classify_pinch, classify_pose, pinch_distance_px, Gesture};
pub use config::{GestureConfig, PINCH_THRESHOLD_PX, TRIGGER_HOLD_MS};
pub use hold::{HoldDebouncer, Trigger};
pub use landmark::{
    HandResults, Landmark, LandmarkError, LandmarkFrame, Viewport, HAND_CONNECTIONS,
    LANDMARK_COUNT,
};
pub use recording::{Recording, RecordingError, Sample};
pub use slot::{LatestFrame, Snapshot};
pub use synth::{synthetic_hand, HandPose};
