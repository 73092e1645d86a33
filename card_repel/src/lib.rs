//! # card_repel
//!
//! A board of cards that a pinch can pick up and drag.  While a card is
//! held, overlapping neighbours are nudged away from it a few pixels per
//! frame, so dragging a card through a cluster parts it.
//!
//! | Input | Effect |
//! |---|---|
//! | Pinch (thumb and index tips < 60 px) over a card | grab the first card under the pinch |
//! | Pinch held, moving | grabbed card's centre follows the pinch |
//! | Fingers apart, or no hand | release |
//!
//! ```rust
//! use card_repel::{grid_layout, CardBoard, RepelConfig};
//!
//! let mut board = CardBoard::new(grid_layout(6, 3, (200.0, 120.0), 20.0, (40.0, 40.0)), RepelConfig::default());
//! board.enter_free_layout().unwrap();
//! board.handle_grab(140.0, 100.0);
//! board.handle_grab(300.0, 100.0);
//! board.repel_step();
//! ```

pub mod board;
pub mod card;

pub use board::{CardBoard, Layout, LayoutError, PinchCursor, RepelConfig};
pub use card::{grid_layout, CardBody, CardId, Rect};
