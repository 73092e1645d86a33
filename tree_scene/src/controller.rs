//! Per-frame driver for the tree scene.
//!
//! ```text
//! detector result ──► on_hand ──► classify ─► debounce ─► switch / release
//!                                     └────► cursor
//! render frame    ──► tick    ──► tweens ─► guard timer ─► ambient ─► pick
//! ```
//!
//! `on_hand` runs once per landmark result (the detector's cadence), `tick`
//! once per rendered frame.

use std::time::Duration;

use hand_gesture::landmark::INDEX_TIP;
use hand_gesture::{classify_pose, Gesture, GestureConfig, LandmarkFrame, Trigger, Viewport};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::camera::Camera;
use crate::interact::{self, Cursor};
use crate::mode::{self, sparkle_size};
use crate::scene::{SceneConfig, TreeScene};
use crate::state::{InteractionState, SceneMode, TreeWorld};
use crate::tween::TweenSignal;

pub struct TreeController {
    state:    InteractionState,
    world:    TreeWorld,
    cursor:   Cursor,
    viewport: Viewport,
    rng:      StdRng,
}

impl TreeController {
    pub fn new(scene: SceneConfig, gestures: GestureConfig, viewport: Viewport, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let scene  = TreeScene::build(scene, &mut rng);
        let camera = Camera::with_aspect(viewport.width / viewport.height.max(1.0));
        TreeController {
            state:  InteractionState::new(gestures.trigger_hold()),
            world:  TreeWorld::new(scene, camera),
            cursor: Cursor::default(),
            viewport,
            rng,
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Input
    // ════════════════════════════════════════════════════════════════════════

    /// Feed one detector result (`None` when no hand was seen).
    pub fn on_hand(&mut self, frame: Option<&LandmarkFrame>, now: Duration) -> Gesture {
        let gesture = classify_pose(frame);

        match self.state.hold.update(gesture, now) {
            Some(Trigger::Fist) => {
                if self.state.active_focus.is_some() {
                    interact::defocus(&mut self.state, &mut self.world, now);
                } else {
                    mode::switch_mode(&mut self.state, &mut self.world, SceneMode::Tree, now, &mut self.rng);
                }
            }
            Some(Trigger::Open) => {
                mode::switch_mode(&mut self.state, &mut self.world, SceneMode::Universe, now, &mut self.rng);
            }
            None => {}
        }

        match frame {
            Some(f) if gesture == Gesture::Point => self.cursor.point_at(&f.point(INDEX_TIP), self.viewport),
            _ => self.cursor.hide(),
        }
        gesture
    }

    /// Advance animation and interaction to `now`.
    pub fn tick(&mut self, now: Duration) {
        for signal in self.world.tweens.update(&mut self.world.scene.graph, now) {
            match signal {
                TweenSignal::Unpause => {
                    if self.state.active_focus.is_none() {
                        self.state.is_paused = false;
                    }
                }
            }
        }

        mode::finish_transition(&mut self.state, now);
        mode::ambient_step(&self.state, &mut self.world, now.as_secs_f32());
        interact::check_interaction(&mut self.state, &mut self.world, &mut self.cursor, now);
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.world.camera.set_aspect(viewport.width, viewport.height);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Accessors
    // ════════════════════════════════════════════════════════════════════════

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn world(&self) -> &TreeWorld {
        &self.world
    }

    pub fn scene(&self) -> &TreeScene {
        &self.world.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.world.camera
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn mode(&self) -> SceneMode {
        self.state.mode
    }

    pub fn gesture(&self) -> Gesture {
        self.state.current_gesture()
    }

    /// Status line text: the current gesture name.
    pub fn status(&self) -> &'static str {
        self.gesture().name()
    }

    pub fn sparkle_size(&self, now: Duration) -> f32 {
        sparkle_size(self.state.mode, now.as_secs_f32())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
