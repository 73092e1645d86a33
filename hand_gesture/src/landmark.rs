//! Landmark input contract.
//!
//! The detector reports zero or more hands per video frame, each as 21
//! normalized `(x, y[, z])` points in `[0, 1]` image space.  Only the first
//! hand is ever used; a hand with fewer than 21 points counts as absent.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ════════════════════════════════════════════════════════════════════════════
// Indices
// ════════════════════════════════════════════════════════════════════════════

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:      usize = 0;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_TIP: usize = 12;
pub const RING_TIP:   usize = 16;
pub const PINKY_TIP:  usize = 20;

/// The four non-thumb fingertips, index first.
pub const FINGER_TIPS: [usize; 4] = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// Skeleton edges for the debug overlay.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1), (1, 2), (2, 3), (3, 4),
    (0, 5), (5, 6), (6, 7), (7, 8),
    (5, 9), (9, 10), (10, 11), (11, 12),
    (9, 13), (13, 14), (14, 15), (15, 16),
    (13, 17), (0, 17), (17, 18), (18, 19), (19, 20),
];

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// One tracked point on the hand, in normalized image coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Landmark { x, y, z: 0.0 }
    }

    /// Planar distance in normalized units (z is ignored).
    pub fn distance(&self, other: &Landmark) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LandmarkError {
    #[error("hand has {got} landmarks, need 21")]
    TooFewPoints { got: usize },
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkFrame
// ════════════════════════════════════════════════════════════════════════════

/// A complete 21-point hand for one processed video frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LandmarkFrame {
    points: [Landmark; LANDMARK_COUNT],
}

impl LandmarkFrame {
    /// Build from a detector point list.  Points past the 21st are ignored.
    pub fn new(points: &[Landmark]) -> Result<Self, LandmarkError> {
        if points.len() < LANDMARK_COUNT {
            return Err(LandmarkError::TooFewPoints { got: points.len() });
        }
        let mut arr = [Landmark::default(); LANDMARK_COUNT];
        arr.copy_from_slice(&points[..LANDMARK_COUNT]);
        Ok(LandmarkFrame { points: arr })
    }

    pub fn from_points(points: [Landmark; LANDMARK_COUNT]) -> Self {
        LandmarkFrame { points }
    }

    pub fn point(&self, index: usize) -> Landmark {
        self.points[index]
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }

    /// The same hand shifted by `(dx, dy)` in normalized units.
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        let mut points = self.points;
        for p in &mut points {
            p.x += dx;
            p.y += dy;
        }
        LandmarkFrame { points }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandResults — one detector callback payload
// ════════════════════════════════════════════════════════════════════════════

/// Raw detector output for one video frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HandResults {
    #[serde(default)]
    pub hands: Vec<Vec<Landmark>>,
}

impl HandResults {
    /// The first reported hand, or `None` when there is none or it is malformed.
    pub fn first_hand(&self) -> Option<LandmarkFrame> {
        let hand = self.hands.first()?;
        match LandmarkFrame::new(hand) {
            Ok(frame) => Some(frame),
            Err(e) => {
                tracing::debug!(error = %e, "discarding malformed hand");
                None
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Viewport
// ════════════════════════════════════════════════════════════════════════════

/// Screen size in pixels, for converting normalized landmarks.
///
/// The camera image is mirrored relative to the screen, so the `mirrored_*`
/// conversions flip x.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width:  f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Viewport { width, height }
    }

    pub fn to_px(&self, p: &Landmark) -> (f32, f32) {
        (p.x * self.width, p.y * self.height)
    }

    pub fn mirrored_px(&self, p: &Landmark) -> (f32, f32) {
        ((1.0 - p.x) * self.width, p.y * self.height)
    }

    /// Mirrored normalized device coordinates (`[-1, 1]`, y up).
    pub fn mirrored_ndc(p: &Landmark) -> (f32, f32) {
        ((1.0 - p.x) * 2.0 - 1.0, -(p.y * 2.0) + 1.0)
    }

    /// Distance between two landmarks measured in screen pixels.
    pub fn pixel_distance(&self, a: &Landmark, b: &Landmark) -> f32 {
        ((a.x - b.x) * self.width).hypot((a.y - b.y) * self.height)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
