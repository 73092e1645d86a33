//! Tree ⇄ universe transitions and ambient motion.
//!
//! A switch starts every tween of the new mode at once and blocks further
//! switches (and picking) for [`TRANSITION_GUARD`].  Triggers arriving during
//! that window, or asking for the mode already active, are dropped.

use std::time::Duration;

use glam::Vec3;
use rand::Rng;
use tracing::{debug, info};

use crate::interact;
use crate::scene::{LEAF_OPACITY, OUTLINE_OPACITY, TRUNK_OPACITY};
use crate::state::{InteractionState, SceneMode, TreeWorld};
use crate::tween::{Easing, Target, TweenSpec};

pub const TRANSITION_GUARD: Duration = Duration::from_millis(2100);

/// Largest random start delay of a decoration flying out.
pub const SCATTER_DELAY_MS: f32 = 300.0;

/// Start a transition to `target`.  Returns false when the switch was refused.
pub fn switch_mode<R: Rng>(
    state:  &mut InteractionState,
    world:  &mut TreeWorld,
    target: SceneMode,
    now:    Duration,
    rng:    &mut R,
) -> bool {
    if state.mode == target || state.is_transitioning {
        debug!(mode = target.name(), transitioning = state.is_transitioning, "mode switch ignored");
        return false;
    }

    state.mode             = target;
    state.is_transitioning = true;
    state.transition_end   = Some(now + TRANSITION_GUARD);

    match target {
        SceneMode::Universe => scatter(world, now, rng),
        SceneMode::Tree => {
            if state.active_focus.is_some() {
                interact::defocus(state, world, now);
            }
            gather(world, now);
        }
    }

    info!(mode = target.name(), "mode switch");
    true
}

/// Clear the transition guard once its time is up.
pub fn finish_transition(state: &mut InteractionState, now: Duration) {
    if let Some(end) = state.transition_end {
        if now >= end {
            state.is_transitioning = false;
            state.transition_end   = None;
        }
    }
}

fn scatter<R: Rng>(world: &mut TreeWorld, now: Duration, rng: &mut R) {
    let TreeWorld { scene, tweens, .. } = world;
    let g = &scene.graph;
    let l = scene.layers;

    let tree_yaw = g.get(scene.tree).rotation.y;

    tweens.start(g, l.trunk, Target::Opacity(0.0), TweenSpec::millis(1500), now);
    tweens.start(g, scene.tree, Target::Scale(Vec3::splat(3.0)), TweenSpec::millis(2000).easing(Easing::ExponentialOut), now);
    tweens.start(g, scene.tree, Target::Yaw(tree_yaw + 0.5), TweenSpec::millis(2000), now);
    tweens.start(g, l.leaves, Target::Opacity(0.1), TweenSpec::millis(2000), now);
    tweens.start(g, l.outline, Target::Opacity(0.0), TweenSpec::millis(1500), now);
    tweens.start(g, l.dust, Target::Opacity(0.6), TweenSpec::millis(2000), now);
    tweens.start(g, l.magic, Target::Opacity(0.8), TweenSpec::millis(2500), now);

    for d in scene.photos() {
        if g.get(d.node()).parent() != Some(scene.decorations) {
            continue;
        }
        let pose  = d.universe_pose();
        let delay = Duration::from_secs_f32(rng.random::<f32>() * SCATTER_DELAY_MS / 1000.0);
        tweens.start(
            g,
            d.node(),
            Target::Position(pose.position),
            TweenSpec::millis(2000).easing(Easing::ExponentialOut).delay(delay),
            now,
        );
        tweens.start(g, d.node(), Target::Rotation(pose.rotation), TweenSpec::millis(2000), now);
    }
}

fn gather(world: &mut TreeWorld, now: Duration) {
    let TreeWorld { scene, tweens, .. } = world;
    let g = &scene.graph;
    let l = scene.layers;

    tweens.start(g, l.trunk, Target::Opacity(TRUNK_OPACITY), TweenSpec::millis(1500), now);
    tweens.start(g, scene.tree, Target::Scale(Vec3::ONE), TweenSpec::millis(1500).easing(Easing::BackOut), now);
    tweens.start(g, l.leaves, Target::Opacity(LEAF_OPACITY), TweenSpec::millis(1500), now);
    tweens.start(g, l.outline, Target::Opacity(OUTLINE_OPACITY), TweenSpec::millis(1500), now);
    tweens.start(g, l.dust, Target::Opacity(0.0), TweenSpec::millis(1500), now);
    tweens.start(g, l.magic, Target::Opacity(0.0), TweenSpec::millis(1500), now);

    for d in scene.photos() {
        if g.get(d.node()).parent() != Some(scene.decorations) {
            continue;
        }
        let pose = d.tree_pose();
        tweens.start(
            g,
            d.node(),
            Target::Position(pose.position),
            TweenSpec::millis(1500).easing(Easing::CubicInOut),
            now,
        );
        tweens.start(g, d.node(), Target::Rotation(pose.rotation), TweenSpec::millis(1500), now);
    }
}

/// One frame of idle motion.  `t` is the scene clock in seconds.
pub fn ambient_step(state: &InteractionState, world: &mut TreeWorld, t: f32) {
    let TreeWorld { scene, camera, .. } = world;
    let l = scene.layers;

    if !state.is_paused {
        match state.mode {
            SceneMode::Tree if !state.is_transitioning => {
                scene.graph.get_mut(scene.tree).rotation.y        += 0.002;
                scene.graph.get_mut(scene.decorations).rotation.y += 0.002;
            }
            SceneMode::Tree => {}
            SceneMode::Universe => {
                scene.graph.get_mut(scene.tree).rotation.y   += 0.0005;
                scene.graph.get_mut(scene.galaxy).rotation.y -= 0.0002;
                scene.graph.get_mut(scene.magic).rotation.y  += 0.0003;
                let eye = camera.position;
                for node in scene.photo_nodes() {
                    if Some(node) != state.active_focus {
                        scene.graph.look_at(node, eye);
                    }
                }
            }
        }
    }

    let lights = scene.graph.get_mut(l.lights);
    lights.opacity     = 0.6 + (t * 3.0).sin() * 0.4;
    lights.rotation.y -= 0.005;
}

/// Point size of the magic sparkle, which breathes in universe mode.
pub fn sparkle_size(mode: SceneMode, t: f32) -> f32 {
    match mode {
        SceneMode::Universe => 15.0 + (t * 2.0).sin() * 5.0,
        SceneMode::Tree     => 15.0,
    }
}
