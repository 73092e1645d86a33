//! # leap_tree
//!
//! A particle Christmas tree you steer with one hand, and a board of cards
//! you can pinch and drag.  Hands come from a LeapMotion controller or, by
//! default, from a keyboard/mouse simulator.
//!
//! ## Gesture → Action mapping (tree scene)
//!
//! | Gesture | Held | Action |
//! |---|---|---|
//! | Open hand | 400 ms | Explode the tree into the universe view |
//! | Fist | 400 ms | Release the focused photo, or gather back into the tree |
//! | Point | continuous | Cursor follows the index tip; hovering a photo zooms it in |
//!
//! ## Card scene
//!
//! | Gesture | Action |
//! |---|---|
//! | Pinch over a card | Grab it; the card follows the pinch and pushes neighbours away |
//! | Fingers apart / hand lost | Release |
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: keyboard and mouse synthesize a hand.
//! * `leap` — **Hardware mode**: polls a real LeapMotion controller via LeapC.
//!
//! ### Simulation controls
//!
//! | Input | Hand |
//! |---|---|
//! | Mouse | Index tip (or pinch point) position |
//! | `F` held | Fist |
//! | `O` held | Open hand |
//! | `P` held / left button | Point |
//! | `Space` held | Pinch |
//! | `H` | Hand in / out of view |
//! | `D` | Toggle the hand inset |
//! | `Enter` | Start gesture mode (card scene) |
//! | `Q` / `Esc` | Quit |

pub mod app;
pub mod assets;
pub mod canvas;
pub mod config;
pub mod error;
pub mod particles;
pub mod source;
pub mod visualizer;

pub use app::{run, CardApp, GestureSession, SceneKind, TreeApp};
pub use config::AppConfig;
pub use error::AppError;
