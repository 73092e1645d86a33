//! Pointing at photos: cursor, picking, focus and release.
//!
//! Focusing lifts a photo out of the spinning decoration group onto the scene
//! root (keeping its world placement), then flies it in front of the camera.
//! Releasing puts it back under its old parent and returns it to its universe
//! pose; ambient motion resumes only when that return has finished.

use std::time::Duration;

use glam::{Vec2, Vec3};
use hand_gesture::{Gesture, Landmark, Viewport};
use tracing::info;

use crate::graph::NodeId;
use crate::pick::{decoration_root, pick};
use crate::state::{InteractionState, SceneMode, TreeWorld};
use crate::tween::{Easing, Target, TweenSignal, TweenSpec};

pub const FOCUS_DISTANCE: f32 = 350.0;
pub const FOCUS_SCALE: f32 = 1.8;
pub const FOCUS_MS: u64 = 600;
pub const RELEASE_MS: u64 = 500;

/// Where a hidden cursor points: well outside the screen.
const OFFSCREEN_NDC: Vec2 = Vec2::new(-100.0, -100.0);

/// On-screen pointer driven by the index fingertip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cursor {
    pub ndc:       Vec2,
    pub screen_px: Vec2,
    pub visible:   bool,
    /// Over a photo.
    pub active:    bool,
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor {
            ndc:       OFFSCREEN_NDC,
            screen_px: Vec2::ZERO,
            visible:   false,
            active:    false,
        }
    }
}

impl Cursor {
    /// Place the cursor under a (mirrored) fingertip.
    pub fn point_at(&mut self, tip: &Landmark, viewport: Viewport) {
        let (nx, ny) = Viewport::mirrored_ndc(tip);
        let (px, py) = viewport.mirrored_px(tip);
        self.ndc       = Vec2::new(nx, ny);
        self.screen_px = Vec2::new(px, py);
        self.visible   = true;
    }

    pub fn hide(&mut self) {
        self.ndc     = OFFSCREEN_NDC;
        self.visible = false;
        self.active  = false;
    }
}

/// Lift `node` to the scene root and fly it in front of the camera.  Any
/// other focused object is released first.
pub fn focus(state: &mut InteractionState, world: &mut TreeWorld, node: NodeId, now: Duration) {
    if state.active_focus == Some(node) {
        return;
    }
    if state.active_focus.is_some() {
        defocus(state, world, now);
    }

    let graph = &mut world.scene.graph;
    state.active_focus    = Some(node);
    state.is_paused       = true;
    state.original_parent = graph.get(node).parent();
    graph.attach(graph.root(), node);

    let cam  = world.camera;
    let spec = TweenSpec::millis(FOCUS_MS);
    let tw   = &mut world.tweens;
    tw.start(graph, node, Target::Position(cam.focus_point(FOCUS_DISTANCE)), spec.easing(Easing::BackOut), now);
    tw.start(graph, node, Target::Orientation(cam.orientation), spec, now);
    tw.start(graph, node, Target::Scale(Vec3::splat(FOCUS_SCALE)), spec, now);

    info!(node = graph.get(node).name.as_str(), "focus");
}

/// Return the focused object home.  Returns false when nothing was focused.
pub fn defocus(state: &mut InteractionState, world: &mut TreeWorld, now: Duration) -> bool {
    let Some(node) = state.active_focus.take() else {
        return false;
    };
    let home = state
        .original_parent
        .take()
        .unwrap_or(world.scene.decorations);

    let graph = &mut world.scene.graph;
    graph.attach(home, node);

    if let Some(pose) = world.scene.decoration(node).map(|d| d.universe_pose()) {
        let graph = &world.scene.graph;
        let spec  = TweenSpec::millis(RELEASE_MS);
        let tw    = &mut world.tweens;
        tw.start(graph, node, Target::Position(pose.position), spec, now);
        tw.start(graph, node, Target::Scale(Vec3::ONE), spec.on_complete(TweenSignal::Unpause), now);
        tw.start(graph, node, Target::Rotation(pose.rotation), spec, now);
    } else {
        state.is_paused = false;
    }

    info!(node = world.scene.graph.get(node).name.as_str(), "release");
    true
}

/// One frame of pointer interaction.  Only live in universe mode, outside a
/// transition, while the hand is pointing.  Returns the newly focused node.
pub fn check_interaction(
    state:  &mut InteractionState,
    world:  &mut TreeWorld,
    cursor: &mut Cursor,
    now:    Duration,
) -> Option<NodeId> {
    if state.mode != SceneMode::Universe || state.is_transitioning {
        return None;
    }
    if state.current_gesture() != Gesture::Point {
        cursor.active = false;
        return None;
    }

    let ray   = world.camera.ray(cursor.ndc);
    let roots = world.scene.photo_nodes();
    let Some(hit) = pick(&world.scene.graph, &roots, &ray) else {
        cursor.active = false;
        return None;
    };

    let target = decoration_root(&world.scene.graph, hit.node, world.scene.decorations);
    if world.scene.decoration(target).is_none() {
        cursor.active = false;
        return None;
    }

    cursor.active = true;
    if state.active_focus == Some(target) {
        return None;
    }
    focus(state, world, target, now);
    Some(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::scene::{SceneConfig, TreeScene};
    use crate::tween::Field;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn universe() -> (InteractionState, TreeWorld) {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let scene = TreeScene::build(SceneConfig::default(), &mut rng);
        let mut world = TreeWorld::new(scene, Camera::default());
        for d in world.scene.photos().to_vec() {
            let n = world.scene.graph.get_mut(d.node());
            n.position = d.universe_pose().position;
            n.rotation = d.universe_pose().rotation;
        }
        let mut st = InteractionState::new(ms(400));
        st.mode = SceneMode::Universe;
        (st, world)
    }

    fn settle(world: &mut TreeWorld, at: Duration) -> Vec<TweenSignal> {
        world.tweens.update(&mut world.scene.graph, at)
    }

    /// NDC of a photo's image centre as seen by the camera.
    fn ndc_of(world: &TreeWorld, node: NodeId) -> Vec2 {
        let image = world.scene.decoration(node).unwrap().image();
        let p = world.camera.project(world.scene.graph.world_position(image)).unwrap();
        p.truncate()
    }

    fn pointing(st: &mut InteractionState) {
        st.hold.update(Gesture::Point, ms(0));
    }

    #[test]
    fn focus_lifts_and_flies_to_camera() {
        let (mut st, mut w) = universe();
        let node = w.scene.photos()[0].node();
        let world_before = w.scene.graph.world_position(node);

        focus(&mut st, &mut w, node, ms(0));
        assert_eq!(st.active_focus, Some(node));
        assert_eq!(st.original_parent, Some(w.scene.decorations));
        assert!(st.is_paused);
        assert_eq!(w.scene.graph.get(node).parent(), Some(w.scene.graph.root()));
        assert!((w.scene.graph.world_position(node) - world_before).length() < 1e-2);

        settle(&mut w, ms(FOCUS_MS));
        let n = w.scene.graph.get(node);
        assert_eq!(n.position, Vec3::new(0.0, 150.0, 1450.0));
        assert!((n.scale - Vec3::splat(FOCUS_SCALE)).length() < 1e-4);
        assert!(n.quat().dot(w.camera.orientation).abs() > 0.9999);
    }

    #[test]
    fn release_returns_home_then_unpauses() {
        let (mut st, mut w) = universe();
        let d = w.scene.photos()[1].clone();
        focus(&mut st, &mut w, d.node(), ms(0));
        settle(&mut w, ms(600));

        assert!(defocus(&mut st, &mut w, ms(1000)));
        assert!(st.active_focus.is_none());
        assert_eq!(w.scene.graph.get(d.node()).parent(), Some(d.home()));
        assert!(st.is_paused);

        assert!(settle(&mut w, ms(1499)).is_empty());
        assert_eq!(settle(&mut w, ms(1500)), vec![TweenSignal::Unpause]);
        let n = w.scene.graph.get(d.node());
        assert_eq!(n.position, d.universe_pose().position);
        assert_eq!(n.rotation, d.universe_pose().rotation);
        assert!(!defocus(&mut st, &mut w, ms(2000)));
    }

    #[test]
    fn focusing_b_releases_a_first() {
        let (mut st, mut w) = universe();
        let a = w.scene.photos()[0].clone();
        let b = w.scene.photos()[1].node();
        focus(&mut st, &mut w, a.node(), ms(0));
        settle(&mut w, ms(600));

        focus(&mut st, &mut w, b, ms(700));
        assert_eq!(st.active_focus, Some(b));
        assert_eq!(w.scene.graph.get(a.node()).parent(), Some(w.scene.decorations));
        assert_eq!(
            w.tweens.target_of(a.node(), Field::Position),
            Some(Target::Position(a.universe_pose().position))
        );
        assert_eq!(w.scene.graph.get(b).parent(), Some(w.scene.graph.root()));
    }

    #[test]
    fn pointing_at_a_photo_focuses_it() {
        let (mut st, mut w) = universe();
        pointing(&mut st);
        let node = w.scene.photos()[4].node();
        let mut cursor = Cursor { ndc: ndc_of(&w, node), visible: true, ..Cursor::default() };

        let picked = check_interaction(&mut st, &mut w, &mut cursor, ms(10));
        assert!(cursor.active);
        let picked = picked.unwrap();
        assert_eq!(st.active_focus, Some(picked));

        // hovering the focused photo again does nothing new
        assert_eq!(check_interaction(&mut st, &mut w, &mut cursor, ms(20)), None);
    }

    #[test]
    fn idle_outside_universe_or_mid_transition() {
        let (mut st, mut w) = universe();
        pointing(&mut st);
        let node = w.scene.photos()[4].node();
        let mut cursor = Cursor { ndc: ndc_of(&w, node), visible: true, ..Cursor::default() };

        st.is_transitioning = true;
        assert!(check_interaction(&mut st, &mut w, &mut cursor, ms(10)).is_none());
        st.is_transitioning = false;
        st.mode = SceneMode::Tree;
        assert!(check_interaction(&mut st, &mut w, &mut cursor, ms(10)).is_none());
        assert!(st.active_focus.is_none());
    }

    #[test]
    fn empty_space_is_a_no_op() {
        let (mut st, mut w) = universe();
        pointing(&mut st);
        let mut cursor = Cursor::default();
        assert!(check_interaction(&mut st, &mut w, &mut cursor, ms(10)).is_none());
        assert!(!cursor.active);
    }

    #[test]
    fn cursor_mirrors_the_fingertip() {
        let mut c = Cursor::default();
        c.point_at(&Landmark::new(0.25, 0.5), Viewport::new(800.0, 600.0));
        assert_eq!(c.ndc, Vec2::new(0.5, 0.0));
        assert_eq!(c.screen_px, Vec2::new(600.0, 300.0));
        assert!(c.visible);
        c.hide();
        assert!(!c.visible && !c.active);
    }
}
