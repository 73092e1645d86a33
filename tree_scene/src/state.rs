//! Interaction state and the world context the interaction systems act on.

use std::time::Duration;

use hand_gesture::{Gesture, HoldDebouncer};

use crate::camera::Camera;
use crate::graph::NodeId;
use crate::scene::TreeScene;
use crate::tween::Tweener;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SceneMode {
    #[default]
    Tree,
    Universe,
}

impl SceneMode {
    pub fn name(self) -> &'static str {
        match self {
            SceneMode::Tree     => "tree",
            SceneMode::Universe => "universe",
        }
    }

    /// Hint shown to the user while in this mode.
    pub fn instruction(self) -> &'static str {
        match self {
            SceneMode::Tree     => "OPEN HAND TO EXPLODE",
            SceneMode::Universe => "POINT TO ZOOM | FIST TO RETURN",
        }
    }
}

/// Everything the gesture layer decides with.  One per controller.
#[derive(Clone, Debug)]
pub struct InteractionState {
    pub hold:             HoldDebouncer,
    pub mode:             SceneMode,
    pub is_transitioning: bool,
    /// When the running transition stops blocking input.
    pub transition_end:   Option<Duration>,
    pub active_focus:     Option<NodeId>,
    /// Where the focused object lived before it was lifted to the scene root.
    pub original_parent:  Option<NodeId>,
    /// Halts ambient motion while an object is (or is returning from) focus.
    pub is_paused:        bool,
}

impl InteractionState {
    pub fn new(hold: Duration) -> Self {
        InteractionState {
            hold:             HoldDebouncer::new(hold),
            mode:             SceneMode::Tree,
            is_transitioning: false,
            transition_end:   None,
            active_focus:     None,
            original_parent:  None,
            is_paused:        false,
        }
    }

    pub fn current_gesture(&self) -> Gesture {
        self.hold.current()
    }

    pub fn gesture_hold_start(&self) -> Duration {
        self.hold.hold_start()
    }
}

/// The mutable scene the interaction systems drive.
#[derive(Clone, Debug)]
pub struct TreeWorld {
    pub scene:  TreeScene,
    pub tweens: Tweener,
    pub camera: Camera,
}

impl TreeWorld {
    pub fn new(scene: TreeScene, camera: Camera) -> Self {
        TreeWorld { scene, tweens: Tweener::new(), camera }
    }
}
