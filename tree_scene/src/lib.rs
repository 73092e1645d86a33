//! # tree_scene
//!
//! Gesture-driven state for the particle tree: a small scene graph, a tween
//! engine, the tree ⇄ universe mode machine and photo focus by pointing.
//! No rendering happens here; a renderer reads the graph after each tick.
//!
//! ## Controls
//!
//! | Held gesture | Tree mode | Universe mode |
//! |---|---|---|
//! | Open hand (400 ms) | scatter into the universe | — |
//! | Fist (400 ms) | — | release the focused photo, else gather back into the tree |
//! | Point | — | cursor; touching a photo flies it to the camera |
//!
//! ## Frame loop
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use hand_gesture::{GestureConfig, HandResults, Viewport};
//! use tree_scene::{SceneConfig, TreeController};
//!
//! let mut tree = TreeController::new(
//!     SceneConfig::default(),
//!     GestureConfig::default(),
//!     Viewport::new(1280.0, 720.0),
//!     7,
//! );
//! let results = HandResults::default();
//! let now = Duration::from_millis(16);
//! tree.on_hand(results.first_hand().as_ref(), now);   // per detector result
//! tree.tick(now);                                     // per rendered frame
//! ```

pub mod camera;
pub mod controller;
pub mod graph;
pub mod interact;
pub mod mode;
pub mod pick;
pub mod scene;
pub mod state;
pub mod tween;

pub use camera::{ndc_to_px, Camera, Ray};
pub use controller::TreeController;
pub use graph::{Node, NodeId, SceneGraph, Shape};
pub use interact::Cursor;
pub use pick::Hit;
pub use scene::{Decoration, Layers, Pose, SceneConfig, TreeScene};
pub use state::{InteractionState, SceneMode, TreeWorld};
pub use tween::{Easing, Field, Target, TweenKey, TweenSignal, TweenSpec, Tweener};
