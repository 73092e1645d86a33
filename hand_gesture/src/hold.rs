//! Hold-to-trigger debouncer.
//!
//! A classification that flickers for a frame must not flip the scene, so a
//! trigger gesture only fires after it has stayed unchanged for the hold
//! duration.  Firing re-arms the hold clock: a gesture held for three
//! intervals fires three times.  Continuous gestures are tracked but never
//! fire.

use std::time::Duration;

use crate::classify::Gesture;

/// A committed trigger-style gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    Fist,
    Open,
}

#[derive(Clone, Debug)]
pub struct HoldDebouncer {
    current:    Gesture,
    hold_start: Duration,
    hold:       Duration,
}

impl HoldDebouncer {
    pub fn new(hold: Duration) -> Self {
        HoldDebouncer {
            current:    Gesture::None,
            hold_start: Duration::ZERO,
            hold,
        }
    }

    pub fn current(&self) -> Gesture {
        self.current
    }

    /// Start of the current hold episode (or of the last re-arm).
    pub fn hold_start(&self) -> Duration {
        self.hold_start
    }

    pub fn hold(&self) -> Duration {
        self.hold
    }

    /// Restart the hold clock without changing the gesture.
    pub fn rearm(&mut self, now: Duration) {
        self.hold_start = now;
    }

    /// Feed one classified frame.  Returns a trigger at most once per full
    /// hold interval of an unchanged `Fist` or `Open`.
    pub fn update(&mut self, gesture: Gesture, now: Duration) -> Option<Trigger> {
        if gesture != self.current {
            self.current    = gesture;
            self.hold_start = now;
            return None;
        }

        if now.saturating_sub(self.hold_start) < self.hold {
            return None;
        }

        let trigger = match gesture {
            Gesture::Fist => Trigger::Fist,
            Gesture::Open => Trigger::Open,
            _ => return None,
        };
        self.rearm(now);
        Some(trigger)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
