//! Timed interpolation tasks.
//!
//! A tween animates one field of one node from the value it had when the
//! tween started to a target, over a duration, after an optional delay.
//! Tasks are keyed by `(node, field)`: starting a new tween on a field that is
//! already animating replaces the old task.  All tasks advance together in one
//! ordered [`Tweener::update`] call per frame.
//!
//! A finished task writes its target exactly, so a pose driven to a stored
//! target ends bit-for-bit equal to it.

use std::collections::BTreeMap;
use std::time::Duration;

use glam::{Quat, Vec3};

use crate::graph::{Node, NodeId, SceneGraph};

// ════════════════════════════════════════════════════════════════════════════
// Easing
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    #[default]
    Linear,
    ExponentialOut,
    /// Overshoots slightly past the target, then settles.
    BackOut,
    CubicInOut,
}

impl Easing {
    /// Map linear progress `k` in `[0, 1]` to eased progress.
    pub fn apply(self, k: f32) -> f32 {
        match self {
            Easing::Linear => k,
            Easing::ExponentialOut => {
                if k >= 1.0 { 1.0 } else { 1.0 - 2f32.powf(-10.0 * k) }
            }
            Easing::BackOut => {
                let s = 1.70158;
                let k = k - 1.0;
                k * k * ((s + 1.0) * k + s) + 1.0
            }
            Easing::CubicInOut => {
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * k * k * k
                } else {
                    let k = k - 2.0;
                    0.5 * (k * k * k + 2.0)
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Targets and keys
// ════════════════════════════════════════════════════════════════════════════

/// The field a tween owns.  Every rotation flavour shares one field, so a
/// slerp and an Euler tween on the same node replace each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Position,
    Rotation,
    Scale,
    Opacity,
}

/// Destination value of a tween.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Target {
    Position(Vec3),
    /// Euler XYZ, interpolated per component.
    Rotation(Vec3),
    /// Interpolated by spherical lerp.
    Orientation(Quat),
    Scale(Vec3),
    Opacity(f32),
    /// Rotation about Y only; the other two angles are left alone.
    Yaw(f32),
}

impl Target {
    pub fn field(&self) -> Field {
        match self {
            Target::Position(_)                                       => Field::Position,
            Target::Rotation(_) | Target::Orientation(_) | Target::Yaw(_) => Field::Rotation,
            Target::Scale(_)                                          => Field::Scale,
            Target::Opacity(_)                                        => Field::Opacity,
        }
    }

    /// The node's current value, in the same shape as `self`.
    fn sample(&self, node: &Node) -> Target {
        match self {
            Target::Position(_)    => Target::Position(node.position),
            Target::Rotation(_)    => Target::Rotation(node.rotation),
            Target::Orientation(_) => Target::Orientation(node.quat()),
            Target::Scale(_)       => Target::Scale(node.scale),
            Target::Opacity(_)     => Target::Opacity(node.opacity),
            Target::Yaw(_)         => Target::Yaw(node.rotation.y),
        }
    }

    fn mix(from: Target, to: Target, t: f32) -> Target {
        match (from, to) {
            (Target::Position(a), Target::Position(b))       => Target::Position(a.lerp(b, t)),
            (Target::Rotation(a), Target::Rotation(b))       => Target::Rotation(a.lerp(b, t)),
            (Target::Orientation(a), Target::Orientation(b)) => Target::Orientation(a.slerp(b, t)),
            (Target::Scale(a), Target::Scale(b))             => Target::Scale(a.lerp(b, t)),
            (Target::Opacity(a), Target::Opacity(b))         => Target::Opacity(a + (b - a) * t),
            (Target::Yaw(a), Target::Yaw(b))                 => Target::Yaw(a + (b - a) * t),
            (_, to) => to,
        }
    }

    fn write(self, node: &mut Node) {
        match self {
            Target::Position(v)    => node.position = v,
            Target::Rotation(v)    => node.rotation = v,
            Target::Orientation(q) => node.set_quat(q),
            Target::Scale(v)       => node.scale = v,
            Target::Opacity(o)     => node.opacity = o,
            Target::Yaw(y)         => node.rotation.y = y,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenKey(pub NodeId, pub Field);

/// Emitted when a tween carrying it completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TweenSignal {
    /// Resume ambient scene motion.
    Unpause,
}

// ════════════════════════════════════════════════════════════════════════════
// TweenSpec — timing of one tween
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TweenSpec {
    pub duration: Duration,
    pub delay:    Duration,
    pub easing:   Easing,
    pub signal:   Option<TweenSignal>,
}

impl TweenSpec {
    pub fn millis(ms: u64) -> Self {
        TweenSpec {
            duration: Duration::from_millis(ms),
            delay:    Duration::ZERO,
            easing:   Easing::Linear,
            signal:   None,
        }
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn on_complete(mut self, signal: TweenSignal) -> Self {
        self.signal = Some(signal);
        self
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tweener
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
struct Tween {
    from:  Target,
    to:    Target,
    /// Start time with the delay already added.
    begin: Duration,
    spec:  TweenSpec,
}

#[derive(Clone, Debug, Default)]
pub struct Tweener {
    tasks: BTreeMap<TweenKey, Tween>,
}

impl Tweener {
    pub fn new() -> Self {
        Tweener::default()
    }

    /// Start animating `node` toward `to`.  The start value is captured now.
    pub fn start(&mut self, graph: &SceneGraph, node: NodeId, to: Target, spec: TweenSpec, now: Duration) {
        let from = to.sample(graph.get(node));
        self.tasks.insert(
            TweenKey(node, to.field()),
            Tween { from, to, begin: now + spec.delay, spec },
        );
    }

    pub fn is_animating(&self, node: NodeId, field: Field) -> bool {
        self.tasks.contains_key(&TweenKey(node, field))
    }

    /// Destination of the in-flight tween on `(node, field)`, if any.
    pub fn target_of(&self, node: NodeId, field: Field) -> Option<Target> {
        self.tasks.get(&TweenKey(node, field)).map(|t| t.to)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Advance every task to `now`.  Returns the signals of tasks that finished.
    pub fn update(&mut self, graph: &mut SceneGraph, now: Duration) -> Vec<TweenSignal> {
        let mut signals = Vec::new();
        self.tasks.retain(|key, tween| {
            if !graph.contains(key.0) {
                return false;
            }
            if now < tween.begin {
                return true;
            }

            let elapsed = now - tween.begin;
            let done = elapsed >= tween.spec.duration;
            let value = if done {
                tween.to
            } else {
                let k = elapsed.as_secs_f32() / tween.spec.duration.as_secs_f32();
                Target::mix(tween.from, tween.to, tween.spec.easing.apply(k))
            };
            value.write(graph.get_mut(key.0));

            if done {
                signals.extend(tween.spec.signal);
            }
            !done
        });
        signals
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn easings_hit_endpoints() {
        for e in [Easing::Linear, Easing::ExponentialOut, Easing::BackOut, Easing::CubicInOut] {
            assert!(e.apply(0.0).abs() < 1e-3, "{:?}", e);
            assert!((e.apply(1.0) - 1.0).abs() < 1e-6, "{:?}", e);
        }
        assert!(Easing::BackOut.apply(0.7) > 1.0);
    }

    #[test]
    fn linear_midpoint_and_exact_end() {
        let mut g = SceneGraph::new();
        let n = g.add(g.root(), "n");
        let mut tw = Tweener::new();
        let to = Vec3::new(0.1, 0.7, 1.3);
        tw.start(&g, n, Target::Position(to), TweenSpec::millis(1000), ms(0));

        tw.update(&mut g, ms(500));
        assert!((g.get(n).position - to * 0.5).length() < 1e-5);

        tw.update(&mut g, ms(1000));
        assert_eq!(g.get(n).position, to);
        assert!(tw.is_empty());
    }

    #[test]
    fn delay_holds_the_start_value() {
        let mut g = SceneGraph::new();
        let n = g.add(g.root(), "n");
        let mut tw = Tweener::new();
        tw.start(&g, n, Target::Opacity(0.0), TweenSpec::millis(100).delay(ms(300)), ms(0));
        tw.update(&mut g, ms(250));
        assert_eq!(g.get(n).opacity, 1.0);
        tw.update(&mut g, ms(350));
        assert!((g.get(n).opacity - 0.5).abs() < 1e-5);
    }

    #[test]
    fn same_field_is_replaced() {
        let mut g = SceneGraph::new();
        let n = g.add(g.root(), "n");
        let mut tw = Tweener::new();
        tw.start(&g, n, Target::Orientation(Quat::from_rotation_y(1.0)), TweenSpec::millis(600), ms(0));
        tw.start(&g, n, Target::Rotation(Vec3::new(0.2, 0.0, 0.0)), TweenSpec::millis(500), ms(10));
        assert_eq!(tw.len(), 1);
        tw.update(&mut g, ms(600));
        assert_eq!(g.get(n).rotation, Vec3::new(0.2, 0.0, 0.0));
    }

    #[test]
    fn different_fields_run_side_by_side() {
        let mut g = SceneGraph::new();
        let n = g.add(g.root(), "n");
        let mut tw = Tweener::new();
        tw.start(&g, n, Target::Scale(Vec3::splat(3.0)), TweenSpec::millis(100), ms(0));
        tw.start(&g, n, Target::Yaw(0.5), TweenSpec::millis(200), ms(0));
        assert_eq!(tw.len(), 2);
        tw.update(&mut g, ms(100));
        assert_eq!(g.get(n).scale, Vec3::splat(3.0));
        assert!(tw.is_animating(n, Field::Rotation));
        assert!(!tw.is_animating(n, Field::Scale));
    }

    #[test]
    fn completion_signal_fires_once() {
        let mut g = SceneGraph::new();
        let n = g.add(g.root(), "n");
        let mut tw = Tweener::new();
        let spec = TweenSpec::millis(500).on_complete(TweenSignal::Unpause);
        tw.start(&g, n, Target::Scale(Vec3::ONE), spec, ms(0));
        assert!(tw.update(&mut g, ms(499)).is_empty());
        assert_eq!(tw.update(&mut g, ms(500)), vec![TweenSignal::Unpause]);
        assert!(tw.update(&mut g, ms(900)).is_empty());
    }

    #[test]
    fn overwritten_signal_is_dropped() {
        let mut g = SceneGraph::new();
        let n = g.add(g.root(), "n");
        let mut tw = Tweener::new();
        tw.start(&g, n, Target::Scale(Vec3::ONE), TweenSpec::millis(500).on_complete(TweenSignal::Unpause), ms(0));
        tw.start(&g, n, Target::Scale(Vec3::splat(1.8)), TweenSpec::millis(600), ms(100));
        assert!(tw.update(&mut g, ms(1000)).is_empty());
    }

    #[test]
    fn slerp_reaches_target_orientation() {
        let mut g = SceneGraph::new();
        let n = g.add(g.root(), "n");
        let mut tw = Tweener::new();
        let q = Quat::from_rotation_x(0.4) * Quat::from_rotation_y(-0.9);
        tw.start(&g, n, Target::Orientation(q), TweenSpec::millis(600), ms(0));
        tw.update(&mut g, ms(600));
        assert!(g.get(n).quat().dot(q).abs() > 0.9999);
    }
}
