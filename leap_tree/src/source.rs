//! Landmark sources — LeapMotion hardware and the keyboard/mouse simulator.
//!
//! A source runs on its own thread and publishes each tracking result into a
//! [`LatestFrame`] slot; the frame loop reads whatever is newest.  Right after
//! starting, a source reports once on its `ready` channel whether tracking
//! came up.  Consumers don't need to know whether hands came from real
//! hardware or from the simulator.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use hand_gesture::landmark::{INDEX_TIP, THUMB_TIP};
use hand_gesture::{synthetic_hand, HandPose, Landmark, LandmarkFrame, LatestFrame, LANDMARK_COUNT};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("hand tracking unavailable: {0}")]
    Unavailable(String),

    #[error("hand tracking stopped before it was ready")]
    Stopped,
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver hand landmarks into a [`LatestFrame`].
pub trait LandmarkSource: Send + 'static {
    /// Report start-up on `ready` exactly once, then publish until done.
    fn run(self: Box<Self>, slot: LatestFrame, ready: Sender<Result<(), SourceError>>);
}

/// Spawn a landmark source on its own thread and return its readiness channel.
pub fn spawn_landmark_source<S: LandmarkSource>(source: S, slot: LatestFrame) -> Receiver<Result<(), SourceError>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(slot, tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// LeapLandmarkSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Leap interaction box mapped onto the normalized image: ±200 mm across,
/// 100–500 mm above the device.
const LEAP_HALF_WIDTH_MM: f32 = 200.0;
const LEAP_FLOOR_MM: f32 = 100.0;
const LEAP_SPAN_MM: f32 = 400.0;

/// Map a Leap position (millimetres, y up, x to the user's right) to a
/// landmark as a front-facing camera would report it: normalized, y down,
/// x mirrored.
pub fn leap_mm_to_landmark(x: f32, y: f32, z: f32) -> Landmark {
    let screen_x = (x + LEAP_HALF_WIDTH_MM) / LEAP_SPAN_MM;
    Landmark {
        x: 1.0 - screen_x,
        y: 1.0 - (y - LEAP_FLOOR_MM) / LEAP_SPAN_MM,
        z: z / LEAP_SPAN_MM,
    }
}

/// Build a frame from 21 joint positions in millimetres, in landmark order.
pub fn frame_from_joints_mm(joints: &[[f32; 3]; LANDMARK_COUNT]) -> LandmarkFrame {
    LandmarkFrame::from_points(joints.map(|[x, y, z]| leap_mm_to_landmark(x, y, z)))
}

/// Landmark source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Only the first tracked hand is published; its bones are laid out in the
/// 21-point landmark order (wrist, then thumb and fingers base to tip).
#[cfg(feature = "leap")]
pub struct LeapLandmarkSource;

#[cfg(feature = "leap")]
impl LandmarkSource for LeapLandmarkSource {
    fn run(self: Box<Self>, slot: LatestFrame, ready: Sender<Result<(), SourceError>>) {
        use leaprs::*;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c)  => c,
            Err(e) => {
                let _ = ready.send(Err(SourceError::Unavailable(format!("{:?}", e))));
                return;
            }
        };
        if let Err(e) = connection.open() {
            let _ = ready.send(Err(SourceError::Unavailable(format!("{:?}", e))));
            return;
        }
        info!("LeapMotion connection open");
        let _ = ready.send(Ok(()));

        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                let hand = frame.hands().next();
                slot.publish(hand.and_then(|h| leap_hand_joints(&h)).map(|j| frame_from_joints_mm(&j)));
            }
        }
    }
}

#[cfg(feature = "leap")]
fn leap_hand_joints(hand: &leaprs::Hand) -> Option<[[f32; 3]; LANDMARK_COUNT]> {
    let digits: Vec<_> = hand.digits().collect();
    if digits.len() < 5 {
        return None;
    }

    macro_rules! v {
        ($joint:expr) => {{
            let p = $joint;
            [p.x, p.y, p.z]
        }};
    }
    let mut joints = [[0.0f32; 3]; LANDMARK_COUNT];

    // wrist ≈ centre of the four finger metacarpal bases
    let mut wrist = [0.0f32; 3];
    for d in &digits[1..5] {
        let b = v!(d.metacarpal().prev_joint());
        for k in 0..3 {
            wrist[k] += b[k] / 4.0;
        }
    }
    joints[0] = wrist;

    for (i, d) in digits.iter().take(5).enumerate() {
        let base = 1 + i * 4;
        joints[base]     = v!(d.proximal().prev_joint());
        joints[base + 1] = v!(d.intermediate().prev_joint());
        joints[base + 2] = v!(d.distal().prev_joint());
        joints[base + 3] = v!(d.distal().next_joint());
    }
    Some(joints)
}

// ════════════════════════════════════════════════════════════════════════════
// SimLandmarkSource — keyboard/mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Mouse position on screen, normalized to `[0, 1]`, not mirrored.
    Pointer { x: f32, y: f32 },
    /// Hand shape to show, or `None` to take the hand out of view.
    Pose(Option<HandPose>),
    Quit,
}

/// Palm size of the simulated hand, in normalized image units.
pub const SIM_HAND_SCALE: f32 = 0.12;

/// Landmark source driven by [`SimInput`] events from the visualizer.
///
/// The hand is placed so that the index fingertip (or, for a pinch, the
/// point between thumb and index tips) sits under the mouse.  A frame is
/// published every `period`, like a camera would.
pub struct SimLandmarkSource {
    pub rx:     Receiver<SimInput>,
    pub period: Duration,
}

impl SimLandmarkSource {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        SimLandmarkSource { rx, period: Duration::from_millis(33) }
    }
}

/// A synthetic hand in `pose` anchored under the screen point `pointer`.
pub fn sim_hand(pose: HandPose, pointer: (f32, f32)) -> LandmarkFrame {
    let hand = synthetic_hand(pose, (0.5, 0.5), SIM_HAND_SCALE, 0.0);
    let (ax, ay) = if pose == HandPose::Pinch {
        let (i, t) = (hand.point(INDEX_TIP), hand.point(THUMB_TIP));
        ((i.x + t.x) / 2.0, (i.y + t.y) / 2.0)
    } else {
        let i = hand.point(INDEX_TIP);
        (i.x, i.y)
    };
    // the camera sees the screen mirrored
    let (wx, wy) = (1.0 - pointer.0, pointer.1);
    hand.translated(wx - ax, wy - ay)
}

impl LandmarkSource for SimLandmarkSource {
    fn run(self: Box<Self>, slot: LatestFrame, ready: Sender<Result<(), SourceError>>) {
        let _ = ready.send(Ok(()));
        info!("hand simulator running");

        let mut pose    = Some(HandPose::Relaxed);
        let mut pointer = (0.5, 0.5);

        loop {
            loop {
                match self.rx.try_recv() {
                    Ok(SimInput::Pointer { x, y }) => pointer = (x, y),
                    Ok(SimInput::Pose(p)) => {
                        debug!(?p, "sim pose");
                        pose = p;
                    }
                    Ok(SimInput::Quit) | Err(TryRecvError::Disconnected) => return,
                    Err(TryRecvError::Empty) => break,
                }
            }

            slot.publish(pose.map(|p| sim_hand(p, pointer)));
            thread::sleep(self.period);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_gesture::{classify_pinch, classify_pose, Gesture, Viewport};
    use std::time::Instant;

    fn wait_for(slot: &LatestFrame, pred: impl Fn(&Option<LandmarkFrame>) -> bool) -> Option<LandmarkFrame> {
        let start = Instant::now();
        while start.elapsed() < Duration::from_secs(2) {
            let snap = slot.latest();
            if snap.seq > 0 && pred(&snap.frame) {
                return snap.frame;
            }
            thread::sleep(Duration::from_millis(2));
        }
        panic!("source never published the expected frame");
    }

    #[test]
    fn sim_point_puts_fingertip_under_mouse() {
        let hand = sim_hand(HandPose::Point, (0.8, 0.3));
        let tip = hand.point(INDEX_TIP);
        assert!((tip.x - 0.2).abs() < 1e-5);
        assert!((tip.y - 0.3).abs() < 1e-5);
        assert_eq!(classify_pose(Some(&hand)), Gesture::Point);
    }

    #[test]
    fn sim_pinch_is_centred_and_active() {
        let vp = Viewport::new(1280.0, 720.0);
        let hand = sim_hand(HandPose::Pinch, (0.25, 0.6));
        let (i, t) = (hand.point(INDEX_TIP), hand.point(THUMB_TIP));
        let (mx, my) = ((i.x + t.x) / 2.0, (i.y + t.y) / 2.0);
        assert!((mx - 0.75).abs() < 1e-5 && (my - 0.6).abs() < 1e-5);
        assert_eq!(classify_pinch(Some(&hand), vp, 60.0), Gesture::PinchActive);
    }

    #[test]
    fn sim_source_publishes_inputs() {
        let (tx, rx) = mpsc::channel();
        let slot = LatestFrame::new();
        let ready = spawn_landmark_source(
            SimLandmarkSource { rx, period: Duration::from_millis(1) },
            slot.clone(),
        );
        assert_eq!(ready.recv().unwrap(), Ok(()));

        tx.send(SimInput::Pose(Some(HandPose::Fist))).unwrap();
        wait_for(&slot, |f| f.as_ref().map(|h| classify_pose(Some(h))) == Some(Gesture::Fist));

        tx.send(SimInput::Pose(None)).unwrap();
        wait_for(&slot, |f| f.is_none());

        tx.send(SimInput::Quit).unwrap();
    }

    #[test]
    fn leap_box_maps_to_mirrored_image() {
        let centre = leap_mm_to_landmark(0.0, 300.0, 0.0);
        assert!((centre.x - 0.5).abs() < 1e-6 && (centre.y - 0.5).abs() < 1e-6);

        // user's right, high up → image left, top
        let p = leap_mm_to_landmark(200.0, 500.0, 0.0);
        assert!(p.x.abs() < 1e-6 && p.y.abs() < 1e-6);
    }

    #[test]
    fn joints_become_a_frame() {
        let mut joints = [[0.0f32, 300.0, 0.0]; LANDMARK_COUNT];
        joints[INDEX_TIP] = [-100.0, 400.0, 0.0];
        let frame = frame_from_joints_mm(&joints);
        assert!((frame.point(INDEX_TIP).x - 0.75).abs() < 1e-6);
        assert!((frame.point(INDEX_TIP).y - 0.25).abs() < 1e-6);
    }

    struct Broken;

    impl LandmarkSource for Broken {
        fn run(self: Box<Self>, _slot: LatestFrame, ready: Sender<Result<(), SourceError>>) {
            let _ = ready.send(Err(SourceError::Unavailable("no device".into())));
        }
    }

    #[test]
    fn failing_source_reports_once() {
        let ready = spawn_landmark_source(Broken, LatestFrame::new());
        assert_eq!(ready.recv().unwrap(), Err(SourceError::Unavailable("no device".into())));
        assert!(ready.recv().is_err());
    }
}
