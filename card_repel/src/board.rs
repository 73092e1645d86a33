//! The card board: grid layout, free layout, pinch grab and repulsion.
//!
//! Cards start in a grid.  Entering free layout (once, for good) snapshots
//! every grid rectangle as the card's physics state.  From then on a pinch
//! over a card grabs it, the grabbed card's centre follows the pinch, and
//! every frame with a card held pushes overlapping neighbours a fixed step
//! straight away from it.  There is no velocity; repeated steps converge.

use hand_gesture::landmark::{INDEX_TIP, THUMB_TIP};
use hand_gesture::{classify_pinch, Gesture, LandmarkFrame, Viewport, PINCH_THRESHOLD_PX};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::card::{CardBody, CardId, Rect};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("cards are already in free layout")]
    AlreadyFree,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepelConfig {
    pub pinch_threshold_px: f32,
    /// Extra clearance added to the sum of radii.
    pub padding:            f32,
    /// Distance a neighbour moves per step.
    pub push_step:          f32,
}

impl Default for RepelConfig {
    fn default() -> Self {
        RepelConfig {
            pinch_threshold_px: PINCH_THRESHOLD_PX,
            padding:            20.0,
            push_step:          5.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Layout {
    #[default]
    Grid,
    Free,
}

/// Where the pinch is on screen, and whether the fingers are closed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchCursor {
    pub x:        f32,
    pub y:        f32,
    pub pinching: bool,
}

#[derive(Clone, Debug)]
pub struct CardBoard {
    cards:   Vec<CardBody>,
    layout:  Layout,
    grabbed: Option<CardId>,
    config:  RepelConfig,
}

impl CardBoard {
    pub fn new(grid: impl IntoIterator<Item = Rect>, config: RepelConfig) -> Self {
        let cards = grid
            .into_iter()
            .enumerate()
            .map(|(i, rect)| CardBody { id: CardId(i), rect })
            .collect();
        CardBoard { cards, layout: Layout::Grid, grabbed: None, config }
    }

    pub fn cards(&self) -> &[CardBody] {
        &self.cards
    }

    pub fn card(&self, id: CardId) -> Option<&CardBody> {
        self.cards.get(id.0)
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn grabbed(&self) -> Option<CardId> {
        self.grabbed
    }

    pub fn config(&self) -> &RepelConfig {
        &self.config
    }

    /// Replace the grid rectangles (window resized).  Only meaningful while
    /// the grid still owns the layout.
    pub fn reflow(&mut self, grid: &[Rect]) -> Result<(), LayoutError> {
        if self.layout == Layout::Free {
            return Err(LayoutError::AlreadyFree);
        }
        for (card, rect) in self.cards.iter_mut().zip(grid) {
            card.rect = *rect;
        }
        Ok(())
    }

    /// Freeze the current rectangles and hand them to the physics.
    pub fn enter_free_layout(&mut self) -> Result<(), LayoutError> {
        if self.layout == Layout::Free {
            return Err(LayoutError::AlreadyFree);
        }
        self.layout = Layout::Free;
        info!(cards = self.cards.len(), "free layout");
        Ok(())
    }

    // ════════════════════════════════════════════════════════════════════════
    // Grab
    // ════════════════════════════════════════════════════════════════════════

    /// Pinch held at `(x, y)`: move the grabbed card there, or grab the first
    /// card (in list order) under the point.  Returns the grabbed card.
    pub fn handle_grab(&mut self, x: f32, y: f32) -> Option<CardId> {
        if self.layout != Layout::Free {
            return None;
        }

        match self.grabbed {
            Some(id) => {
                if let Some(card) = self.cards.get_mut(id.0) {
                    card.rect = card.rect.centered_on(x, y);
                }
            }
            None => {
                self.grabbed = self.cards.iter().find(|c| c.rect.contains(x, y)).map(|c| c.id);
                if let Some(id) = self.grabbed {
                    debug!(card = id.0, x, y, "grab");
                }
            }
        }
        self.grabbed
    }

    /// Drop whatever is held.  Returns the card that was released.
    pub fn release(&mut self) -> Option<CardId> {
        let released = self.grabbed.take();
        if let Some(id) = released {
            debug!(card = id.0, "release");
        }
        released
    }

    // ════════════════════════════════════════════════════════════════════════
    // Repulsion
    // ════════════════════════════════════════════════════════════════════════

    /// One positional correction pass around the grabbed card.  Returns how
    /// many neighbours moved.
    pub fn repel_step(&mut self) -> usize {
        let Some(held) = self.grabbed.and_then(|id| self.cards.get(id.0).copied()) else {
            return 0;
        };
        let (cx, cy) = held.rect.center();
        let mut moved = 0;

        for card in self.cards.iter_mut().filter(|c| c.id != held.id) {
            let (ox, oy) = card.rect.center();
            let (dx, dy) = (ox - cx, oy - cy);
            let dist     = (dx * dx + dy * dy).sqrt();
            let min_dist = held.radius() + card.radius() + self.config.padding;

            // coincident centres have no direction to push along
            if dist < min_dist && dist > 0.0 {
                let angle = dy.atan2(dx);
                card.rect.x += angle.cos() * self.config.push_step;
                card.rect.y += angle.sin() * self.config.push_step;
                moved += 1;
            }
        }
        moved
    }

    // ════════════════════════════════════════════════════════════════════════
    // Per-result driver
    // ════════════════════════════════════════════════════════════════════════

    /// Feed one detector result.  No hand releases any grab and returns
    /// `None`; otherwise the pinch cursor is returned.
    pub fn on_hand(&mut self, frame: Option<&LandmarkFrame>, viewport: Viewport) -> Option<PinchCursor> {
        let Some(hand) = frame else {
            self.release();
            return None;
        };

        let (ix, iy) = viewport.mirrored_px(&hand.point(INDEX_TIP));
        let (tx, ty) = viewport.mirrored_px(&hand.point(THUMB_TIP));
        let (x, y)   = ((ix + tx) / 2.0, (iy + ty) / 2.0);

        let pinching =
            classify_pinch(Some(hand), viewport, self.config.pinch_threshold_px) == Gesture::PinchActive;
        if pinching {
            self.handle_grab(x, y);
        } else {
            self.release();
        }
        self.repel_step();

        Some(PinchCursor { x, y, pinching })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_gesture::{synthetic_hand, HandPose};

    /// A at (100,100), B right beside it; both 200×120.
    fn board() -> CardBoard {
        let mut b = CardBoard::new(
            [Rect::new(100.0, 100.0, 200.0, 120.0), Rect::new(320.0, 100.0, 200.0, 120.0)],
            RepelConfig::default(),
        );
        b.enter_free_layout().unwrap();
        b
    }

    fn centre(b: &CardBoard, i: usize) -> (f32, f32) {
        b.cards()[i].rect.center()
    }

    #[test]
    fn free_layout_is_one_way() {
        let mut b = CardBoard::new([Rect::new(0.0, 0.0, 10.0, 10.0)], RepelConfig::default());
        assert_eq!(b.handle_grab(5.0, 5.0), None);
        b.reflow(&[Rect::new(50.0, 0.0, 10.0, 10.0)]).unwrap();
        b.enter_free_layout().unwrap();
        assert_eq!(b.cards()[0].rect.x, 50.0);
        assert_eq!(b.enter_free_layout(), Err(LayoutError::AlreadyFree));
        assert_eq!(b.reflow(&[]), Err(LayoutError::AlreadyFree));
    }

    #[test]
    fn first_card_in_list_order_wins() {
        let mut b = CardBoard::new(
            [Rect::new(0.0, 0.0, 100.0, 100.0), Rect::new(50.0, 50.0, 100.0, 100.0)],
            RepelConfig::default(),
        );
        b.enter_free_layout().unwrap();
        assert_eq!(b.handle_grab(75.0, 75.0), Some(CardId(0)));
    }

    #[test]
    fn grab_then_drag_then_push_apart() {
        let mut b = board();
        assert_eq!(b.handle_grab(200.0, 160.0), Some(CardId(0)));
        // grabbing does not move the card yet
        assert_eq!(centre(&b, 0), (200.0, 160.0));
        assert_eq!(b.repel_step(), 0);

        let mut frames = 0;
        loop {
            b.handle_grab(400.0, 160.0);
            if b.repel_step() == 0 {
                break;
            }
            frames += 1;
            assert!(frames < 100);
        }
        assert_eq!(centre(&b, 0), (400.0, 160.0));

        let (bx, by) = centre(&b, 1);
        assert_eq!(by, 160.0);
        assert_eq!(frames, 40);
        assert!(bx - 400.0 >= 220.0 && bx - 400.0 < 225.0);
    }

    #[test]
    fn coincident_centres_are_left_alone() {
        let mut b = CardBoard::new(
            [Rect::new(0.0, 0.0, 100.0, 100.0), Rect::new(0.0, 0.0, 100.0, 100.0)],
            RepelConfig::default(),
        );
        b.enter_free_layout().unwrap();
        b.handle_grab(50.0, 50.0);
        assert_eq!(b.repel_step(), 0);
        assert_eq!(b.cards()[1].rect, Rect::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn push_follows_the_separating_angle() {
        let mut b = CardBoard::new(
            [Rect::new(0.0, 0.0, 100.0, 100.0), Rect::new(30.0, 40.0, 100.0, 100.0)],
            RepelConfig::default(),
        );
        b.enter_free_layout().unwrap();
        b.handle_grab(10.0, 10.0);
        b.repel_step();
        let r = b.cards()[1].rect;
        assert!((r.x - 33.0).abs() < 1e-4);
        assert!((r.y - 44.0).abs() < 1e-4);
    }

    #[test]
    fn release_clears_the_grab() {
        let mut b = board();
        b.handle_grab(200.0, 160.0);
        assert_eq!(b.release(), Some(CardId(0)));
        assert_eq!(b.grabbed(), None);
        assert_eq!(b.release(), None);
    }

    #[test]
    fn pinch_drives_grab_and_release() {
        let vp = Viewport::new(1280.0, 720.0);
        let mut b = CardBoard::new([Rect::new(0.0, 0.0, 1280.0, 720.0)], RepelConfig::default());
        b.enter_free_layout().unwrap();

        let pinch = synthetic_hand(HandPose::Pinch, (0.5, 0.7), 0.12, 0.0);
        let cursor = b.on_hand(Some(&pinch), vp).unwrap();
        assert!(cursor.pinching);
        assert_eq!(b.grabbed(), Some(CardId(0)));

        let open = synthetic_hand(HandPose::Open, (0.5, 0.7), 0.12, 0.0);
        let cursor = b.on_hand(Some(&open), vp).unwrap();
        assert!(!cursor.pinching);
        assert_eq!(b.grabbed(), None);

        b.on_hand(Some(&pinch), vp);
        assert!(b.on_hand(None, vp).is_none());
        assert_eq!(b.grabbed(), None);
    }

    #[test]
    fn pinch_cursor_is_mirrored_midpoint() {
        let vp = Viewport::new(1000.0, 500.0);
        let mut b = CardBoard::new(Vec::new(), RepelConfig::default());
        let hand = synthetic_hand(HandPose::Pinch, (0.3, 0.6), 0.1, 0.2);
        let c = b.on_hand(Some(&hand), vp).unwrap();
        let mid_x = (hand.point(INDEX_TIP).x + hand.point(THUMB_TIP).x) / 2.0;
        let mid_y = (hand.point(INDEX_TIP).y + hand.point(THUMB_TIP).y) / 2.0;
        assert!((c.x - (1.0 - mid_x) * 1000.0).abs() < 1e-2);
        assert!((c.y - mid_y * 500.0).abs() < 1e-2);
    }

    #[test]
    fn config_from_json() {
        let cfg: RepelConfig = serde_json::from_str(r#"{ "push_step": 8.0 }"#).unwrap();
        assert_eq!(cfg.push_step, 8.0);
        assert_eq!(cfg.padding, 20.0);
        assert_eq!(cfg.pinch_threshold_px, 60.0);
    }
}
