//! Gesture classifier — one landmark frame in, one [`Gesture`] out.
//!
//! A digit counts as *folded* when its tip sits closer to the wrist than the
//! joint two landmarks below it (the PIP joint for fingers, the MCP joint for
//! the thumb).  Comparing distances to the wrist rather than testing a fixed
//! image axis keeps the result stable when the hand is rolled.

use std::fmt;

use crate::landmark::{LandmarkFrame, Viewport, FINGER_TIPS, INDEX_TIP, THUMB_TIP, WRIST};

// ════════════════════════════════════════════════════════════════════════════
// Gesture
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Gesture {
    /// No hand, or no recognised shape.
    #[default]
    None,
    /// All four fingertips curled.
    Fist,
    /// All five digits extended.
    Open,
    /// Index extended, middle/ring/pinky curled.
    Point,
    /// Thumb and index tips pressed together.
    PinchActive,
    /// Hand present, thumb and index apart.
    PinchInactive,
}

impl Gesture {
    /// Upper-case label for the status readout.
    pub fn name(self) -> &'static str {
        match self {
            Gesture::None          => "NONE",
            Gesture::Fist          => "FIST",
            Gesture::Open          => "OPEN",
            Gesture::Point         => "POINT",
            Gesture::PinchActive   => "PINCH",
            Gesture::PinchInactive => "HOVER",
        }
    }

    /// Continuous gestures act every frame and are never hold-gated.
    pub fn is_continuous(self) -> bool {
        matches!(self, Gesture::Point | Gesture::PinchActive)
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Pose classification (3D scene)
// ════════════════════════════════════════════════════════════════════════════

fn is_folded(frame: &LandmarkFrame, tip: usize) -> bool {
    let wrist   = frame.point(WRIST);
    let knuckle = frame.point(tip - 2);
    frame.point(tip).distance(&wrist) < knuckle.distance(&wrist)
}

/// Classify a hand shape.  Absence yields [`Gesture::None`].
///
/// When more than one pattern fits, `Open` wins over `Fist`, which wins over
/// `Point`.
pub fn classify_pose(frame: Option<&LandmarkFrame>) -> Gesture {
    let Some(frame) = frame else {
        return Gesture::None;
    };

    let [index, middle, ring, pinky] = FINGER_TIPS.map(|tip| is_folded(frame, tip));
    let thumb = is_folded(frame, THUMB_TIP);

    let fist  = index && middle && ring && pinky;
    let open  = !thumb && !index && !middle && !ring && !pinky;
    let point = !index && middle && ring && pinky;

    if open {
        Gesture::Open
    } else if fist {
        Gesture::Fist
    } else if point {
        Gesture::Point
    } else {
        Gesture::None
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Pinch classification (card layout)
// ════════════════════════════════════════════════════════════════════════════

/// Thumb-tip to index-tip distance in screen pixels.
pub fn pinch_distance_px(frame: &LandmarkFrame, viewport: Viewport) -> f32 {
    viewport.pixel_distance(&frame.point(INDEX_TIP), &frame.point(THUMB_TIP))
}

/// `PinchActive` strictly below `threshold_px`, `PinchInactive` otherwise,
/// `None` when there is no hand.
pub fn classify_pinch(frame: Option<&LandmarkFrame>, viewport: Viewport, threshold_px: f32) -> Gesture {
    match frame {
        None => Gesture::None,
        Some(f) if pinch_distance_px(f, viewport) < threshold_px => Gesture::PinchActive,
        Some(_) => Gesture::PinchInactive,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::Landmark;
    use crate::synth::{synthetic_hand, HandPose};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use std::f32::consts::PI;

    const ROLLS: [f32; 6] = [0.0, PI / 6.0, PI / 2.0, PI, -PI / 3.0, 2.5];

    #[test]
    fn fist_at_any_roll() {
        for roll in ROLLS {
            let hand = synthetic_hand(HandPose::Fist, (0.5, 0.6), 0.1, roll);
            assert_eq!(classify_pose(Some(&hand)), Gesture::Fist, "roll {}", roll);
        }
    }

    #[test]
    fn open_at_any_roll() {
        for roll in ROLLS {
            let hand = synthetic_hand(HandPose::Open, (0.5, 0.6), 0.1, roll);
            assert_eq!(classify_pose(Some(&hand)), Gesture::Open, "roll {}", roll);
        }
    }

    #[test]
    fn point_at_any_roll() {
        for roll in ROLLS {
            let hand = synthetic_hand(HandPose::Point, (0.4, 0.7), 0.08, roll);
            assert_eq!(classify_pose(Some(&hand)), Gesture::Point, "roll {}", roll);
        }
    }

    // ── random landmark sets ──────────────────────────────────────────────

    const SWEEP: usize = 500;

    fn around(rng: &mut ChaCha8Rng, centre: Landmark, dist: f32) -> Landmark {
        let angle: f32 = rng.random_range(0.0..2.0 * PI);
        Landmark::new(centre.x + dist * angle.cos(), centre.y + dist * angle.sin())
    }

    /// Random points everywhere, then each listed tip placed at
    /// `ratio × knuckle distance` from the wrist.
    fn random_hand(rng: &mut ChaCha8Rng, tips: &[usize], ratio: std::ops::Range<f32>) -> LandmarkFrame {
        let mut pts = [Landmark::default(); 21];
        for p in &mut pts {
            *p = Landmark::new(rng.random_range(0.0..1.0), rng.random_range(0.0..1.0));
        }
        let wrist = pts[WRIST];
        for &tip in tips {
            let knuckle = rng.random_range(0.05..0.3);
            pts[tip - 2] = around(rng, wrist, knuckle);
            let scale = rng.random_range(ratio.clone());
            pts[tip] = around(rng, wrist, knuckle * scale);
        }
        LandmarkFrame::from_points(pts)
    }

    #[test]
    fn every_curled_finger_set_is_fist() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for i in 0..SWEEP {
            let hand = random_hand(&mut rng, &FINGER_TIPS, 0.0..0.9);
            assert_eq!(classify_pose(Some(&hand)), Gesture::Fist, "sample {}", i);
        }
    }

    #[test]
    fn every_extended_digit_set_is_open() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let all = [THUMB_TIP, INDEX_TIP, FINGER_TIPS[1], FINGER_TIPS[2], FINGER_TIPS[3]];
        for i in 0..SWEEP {
            let hand = random_hand(&mut rng, &all, 1.1..2.0);
            assert_eq!(classify_pose(Some(&hand)), Gesture::Open, "sample {}", i);
        }
    }

    #[test]
    fn relaxed_hand_is_none() {
        let hand = synthetic_hand(HandPose::Relaxed, (0.5, 0.6), 0.1, 0.0);
        assert_eq!(classify_pose(Some(&hand)), Gesture::None);
    }

    #[test]
    fn absence_is_none() {
        assert_eq!(classify_pose(None), Gesture::None);
        let vp = Viewport::new(1280.0, 720.0);
        assert_eq!(classify_pinch(None, vp, 60.0), Gesture::None);
    }

    #[test]
    fn fist_with_thumb_out_is_still_fist() {
        // Thumb state is irrelevant to the fist test.
        let fist = synthetic_hand(HandPose::Fist, (0.5, 0.6), 0.1, 0.0);
        let open = synthetic_hand(HandPose::Open, (0.5, 0.6), 0.1, 0.0);
        let mut pts = *fist.points();
        pts[1..=4].copy_from_slice(&open.points()[1..=4]);
        let hand = LandmarkFrame::new(&pts).unwrap();
        assert_eq!(classify_pose(Some(&hand)), Gesture::Fist);
    }

    #[test]
    fn pinch_threshold_is_in_pixels() {
        let base = synthetic_hand(HandPose::Pinch, (0.5, 0.5), 0.1, 0.0);
        let mut pts = *base.points();
        pts[THUMB_TIP] = Landmark::new(0.50, 0.5);
        pts[INDEX_TIP] = Landmark::new(0.54, 0.5);
        let hand = LandmarkFrame::new(&pts).unwrap();

        // 0.04 × 1000 = 40 px → pinching; 0.04 × 2000 = 80 px → not.
        let small = Viewport::new(1000.0, 800.0);
        let large = Viewport::new(2000.0, 800.0);
        assert_eq!(classify_pinch(Some(&hand), small, 60.0), Gesture::PinchActive);
        assert_eq!(classify_pinch(Some(&hand), large, 60.0), Gesture::PinchInactive);
    }

    #[test]
    fn pinch_exactly_at_threshold_is_inactive() {
        let base = synthetic_hand(HandPose::Pinch, (0.5, 0.5), 0.1, 0.0);
        let mut pts = *base.points();
        pts[THUMB_TIP] = Landmark::new(0.25, 0.5);
        pts[INDEX_TIP] = Landmark::new(0.5, 0.5);
        let hand = LandmarkFrame::new(&pts).unwrap();
        let vp = Viewport::new(240.0, 100.0);
        assert_eq!(pinch_distance_px(&hand, vp), 60.0);
        assert_eq!(classify_pinch(Some(&hand), vp, 60.0), Gesture::PinchInactive);
    }

    #[test]
    fn names_are_upper_case() {
        assert_eq!(Gesture::Fist.to_string(), "FIST");
        assert!(Gesture::Point.is_continuous());
        assert!(!Gesture::Open.is_continuous());
    }
}
