//! Synthetic hands.
//!
//! Builds plausible 21-point frames for a handful of poses.  The keyboard and
//! mouse simulator drives the whole pipeline with these, and the tests use
//! them to check classification under roll and translation.

use crate::landmark::{Landmark, LandmarkFrame, LANDMARK_COUNT};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandPose {
    Fist,
    Open,
    Point,
    /// Thumb and index tips touching, other fingers curled.
    Pinch,
    /// Index and middle out, ring and pinky curled; matches no gesture.
    Relaxed,
}

/// Knuckle (MCP) base of each non-thumb finger, plus its sideways spread.
const FINGER_BASES: [(f32, f32, f32); 4] = [
    (-0.32, -0.95, -0.06),
    (-0.08, -1.00,  0.00),
    ( 0.16, -0.95,  0.05),
    ( 0.38, -0.85,  0.10),
];

const THUMB_CMC: (f32, f32) = (-0.30, -0.20);
const THUMB_MCP: (f32, f32) = (-0.55, -0.40);

fn extended_finger((bx, by, s): (f32, f32, f32)) -> [(f32, f32); 4] {
    [
        (bx, by),
        (bx + s * 0.4, by - 0.40),
        (bx + s * 0.7, by - 0.68),
        (bx + s,       by - 0.90),
    ]
}

fn folded_finger((bx, by, _): (f32, f32, f32)) -> [(f32, f32); 4] {
    [
        (bx, by),
        (bx, by - 0.35),
        (bx, by - 0.20),
        (bx, by + 0.05),
    ]
}

fn thumb(extended: bool) -> [(f32, f32); 4] {
    if extended {
        [THUMB_CMC, THUMB_MCP, (-0.78, -0.60), (-0.98, -0.78)]
    } else {
        [THUMB_CMC, THUMB_MCP, (-0.45, -0.68), (-0.20, -0.62)]
    }
}

/// Local hand layout: wrist at the origin, fingers toward −y, unit ≈ palm length.
fn local_points(pose: HandPose) -> [(f32, f32); LANDMARK_COUNT] {
    let extended = match pose {
        HandPose::Fist | HandPose::Pinch => [false; 4],
        HandPose::Open    => [true; 4],
        HandPose::Point   => [true, false, false, false],
        HandPose::Relaxed => [true, true, false, false],
    };

    let mut pts = [(0.0, 0.0); LANDMARK_COUNT];
    pts[1..5].copy_from_slice(&thumb(pose == HandPose::Open));
    for (finger, base) in FINGER_BASES.iter().enumerate() {
        let joints = if extended[finger] { extended_finger(*base) } else { folded_finger(*base) };
        let start = 5 + finger * 4;
        pts[start..start + 4].copy_from_slice(&joints);
    }

    if pose == HandPose::Pinch {
        // Index bends forward to meet the thumb tip.
        pts[6] = (-0.40, -1.28);
        pts[7] = (-0.52, -1.30);
        pts[8] = (-0.60, -1.18);
        pts[3] = (-0.68, -0.75);
        pts[4] = (-0.62, -1.14);
    }
    pts
}

/// A hand in `pose` with its wrist at `wrist` (normalized), `scale` palm
/// lengths per image unit, rolled by `roll` radians in the image plane.
pub fn synthetic_hand(pose: HandPose, wrist: (f32, f32), scale: f32, roll: f32) -> LandmarkFrame {
    let (sin, cos) = roll.sin_cos();
    let points = local_points(pose).map(|(x, y)| {
        Landmark::new(
            wrist.0 + (x * cos - y * sin) * scale,
            wrist.1 + (x * sin + y * cos) * scale,
        )
    });
    LandmarkFrame::from_points(points)
}
