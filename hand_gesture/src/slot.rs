//! Single-slot hand-off between the detector thread and the frame loop.
//!
//! The detector delivers results at its own cadence, usually slower than the
//! render loop.  Each delivery overwrites the slot; the frame loop reads the
//! most recent result as often as it likes.  The sequence number tells a
//! reader whether it is looking at a fresh result or a reused one.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::landmark::LandmarkFrame;

/// What a reader sees: the latest frame (possibly "no hand") and its sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub frame: Option<LandmarkFrame>,
    /// Number of results published so far; 0 means nothing has arrived yet.
    pub seq: u64,
}

#[derive(Clone, Debug, Default)]
pub struct LatestFrame {
    inner: Arc<Mutex<Snapshot>>,
}

impl LatestFrame {
    pub fn new() -> Self {
        LatestFrame::default()
    }

    /// Overwrite the slot.  Last writer wins.
    pub fn publish(&self, frame: Option<LandmarkFrame>) {
        let mut slot = self.inner.lock();
        slot.frame = frame;
        slot.seq  += 1;
    }

    pub fn latest(&self) -> Snapshot {
        *self.inner.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::{synthetic_hand, HandPose};
    use std::thread;

    #[test]
    fn empty_slot() {
        let slot = LatestFrame::new();
        assert_eq!(slot.latest(), Snapshot::default());
    }

    #[test]
    fn last_writer_wins() {
        let slot = LatestFrame::new();
        let a = synthetic_hand(HandPose::Fist, (0.5, 0.5), 0.1, 0.0);
        let b = synthetic_hand(HandPose::Open, (0.5, 0.5), 0.1, 0.0);
        slot.publish(Some(a));
        slot.publish(Some(b));
        let snap = slot.latest();
        assert_eq!(snap.frame, Some(b));
        assert_eq!(snap.seq, 2);
    }

    #[test]
    fn reading_does_not_consume() {
        let slot = LatestFrame::new();
        slot.publish(None);
        assert_eq!(slot.latest().seq, 1);
        assert_eq!(slot.latest().seq, 1);
    }

    #[test]
    fn publishes_across_threads() {
        let slot = LatestFrame::new();
        let writer = slot.clone();
        thread::spawn(move || {
            for _ in 0..100 {
                writer.publish(None);
            }
        })
        .join()
        .unwrap();
        assert_eq!(slot.latest().seq, 100);
    }
}
