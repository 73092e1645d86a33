//! Cards and their rectangles, in screen pixels.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub usize);

/// Axis-aligned rectangle; `x`, `y` is the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x:      f32,
    pub y:      f32,
    pub width:  f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect { x, y, width, height }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Edges count as inside.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn centered_on(&self, cx: f32, cy: f32) -> Rect {
        Rect { x: cx - self.width / 2.0, y: cy - self.height / 2.0, ..*self }
    }
}

/// Physics state of one card once the layout is free.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardBody {
    pub id:   CardId,
    pub rect: Rect,
}

impl CardBody {
    /// Repulsion treats a card as a circle of half its width.
    pub fn radius(&self) -> f32 {
        self.rect.width / 2.0
    }
}

/// Rectangles for `count` cards in rows of `columns`, left to right, top to
/// bottom, starting at `origin`.
pub fn grid_layout(
    count:   usize,
    columns: usize,
    size:    (f32, f32),
    gap:     f32,
    origin:  (f32, f32),
) -> Vec<Rect> {
    let columns = columns.max(1);
    (0..count)
        .map(|i| {
            let (col, row) = ((i % columns) as f32, (i / columns) as f32);
            Rect::new(
                origin.0 + col * (size.0 + gap),
                origin.1 + row * (size.1 + gap),
                size.0,
                size.1,
            )
        })
        .collect()
}
