//! Software framebuffer with the drawing primitives the visualizer needs.
//!
//! Pixels are 0x00RRGGBB as `minifb` expects.  All coordinates are signed and
//! clipped, so callers can draw shapes that hang off the edge of the window.

use glam::Vec2;

use crate::assets::PhotoTexture;
use crate::particles::Blend;

#[derive(Clone, Debug, PartialEq)]
pub struct Canvas {
    width:  usize,
    height: usize,
    buf:    Vec<u32>,
}

/// What fills a quad.
#[derive(Clone, Copy, Debug)]
pub enum QuadFill<'a> {
    Solid(u32),
    Texture(&'a PhotoTexture),
}

impl Canvas {
    pub fn new(width: usize, height: usize, color: u32) -> Self {
        Canvas { width, height, buf: vec![color; width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.buf
    }

    pub fn into_pixels(self) -> Vec<u32> {
        self.buf
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width  = width;
        self.height = height;
        self.buf.resize(width * height, 0);
    }

    pub fn clear(&mut self, color: u32) {
        self.buf.fill(color);
    }

    pub fn get(&self, x: i32, y: i32) -> Option<u32> {
        self.index(x, y).map(|i| self.buf[i])
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    // ── Pixels ────────────────────────────────────────────────────────────

    pub fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if let Some(i) = self.index(x, y) {
            self.buf[i] = color;
        }
    }

    /// Mix `color` over the pixel with coverage `alpha`.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: u32, alpha: f32) {
        if let Some(i) = self.index(x, y) {
            self.buf[i] = blend(self.buf[i], color, alpha);
        }
    }

    /// Add `color × alpha` to the pixel, saturating per channel.
    pub fn add_pixel(&mut self, x: i32, y: i32, color: u32, alpha: f32) {
        if let Some(i) = self.index(x, y) {
            self.buf[i] = add(self.buf[i], color, alpha);
        }
    }

    // ── Shapes ────────────────────────────────────────────────────────────

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(self.width as i32);
        let y1 = (y + h).min(self.height as i32);
        for row in y0..y1 {
            let start = row as usize * self.width;
            for col in x0..x1 {
                self.buf[start + col as usize] = color;
            }
        }
    }

    pub fn fill_rect_alpha(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32, alpha: f32) {
        for row in y.max(0)..(y + h).min(self.height as i32) {
            for col in x.max(0)..(x + w).min(self.width as i32) {
                self.blend_pixel(col, row, color, alpha);
            }
        }
    }

    /// Rectangle outline `thickness` pixels wide, drawn inside the rectangle.
    pub fn draw_border(&mut self, x: i32, y: i32, w: i32, h: i32, thickness: i32, color: u32) {
        let t = thickness.min(w / 2).min(h / 2).max(1);
        self.fill_rect(x, y, w, t, color);
        self.fill_rect(x, y + h - t, w, t, color);
        self.fill_rect(x, y + t, t, h - 2 * t, color);
        self.fill_rect(x + w - t, y + t, t, h - 2 * t, color);
    }

    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let (mut x, mut y, mut err) = (x0, y0, dx + dy);
        loop {
            self.set_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x   += sx;
            }
            if e2 <= dx {
                err += dx;
                y   += sy;
            }
        }
    }

    /// Disc of radius `r` with a soft edge.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: u32, alpha: f32, mode: Blend) {
        let r = r.max(0.5);
        let (x0, x1) = ((cx - r).floor() as i32, (cx + r).ceil() as i32);
        let (y0, y1) = ((cy - r).floor() as i32, (cy + r).ceil() as i32);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = (x as f32 + 0.5 - cx).hypot(y as f32 + 0.5 - cy);
                let coverage = (r - d + 0.5).clamp(0.0, 1.0) * alpha;
                if coverage <= 0.0 {
                    continue;
                }
                match mode {
                    Blend::Normal   => self.blend_pixel(x, y, color, coverage),
                    Blend::Additive => self.add_pixel(x, y, color, coverage),
                }
            }
        }
    }

    /// Circle outline.
    pub fn draw_ring(&mut self, cx: f32, cy: f32, r: f32, thickness: f32, color: u32) {
        let outer = r + thickness / 2.0;
        let inner = (r - thickness / 2.0).max(0.0);
        for y in (cy - outer).floor() as i32..=(cy + outer).ceil() as i32 {
            for x in (cx - outer).floor() as i32..=(cx + outer).ceil() as i32 {
                let d = (x as f32 + 0.5 - cx).hypot(y as f32 + 0.5 - cy);
                if d >= inner && d <= outer {
                    self.set_pixel(x, y, color);
                }
            }
        }
    }

    /// Fill a convex quad given as screen corners in order top-left,
    /// top-right, bottom-right, bottom-left (texture u,v 0,0 → 1,1).
    /// Either winding is drawn.
    pub fn fill_quad(&mut self, corners: [Vec2; 4], fill: QuadFill<'_>, alpha: f32) {
        let uv = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(0.0, 1.0)];
        self.fill_triangle([corners[0], corners[1], corners[2]], [uv[0], uv[1], uv[2]], fill, alpha);
        self.fill_triangle([corners[0], corners[2], corners[3]], [uv[0], uv[2], uv[3]], fill, alpha);
    }

    fn fill_triangle(&mut self, p: [Vec2; 3], uv: [Vec2; 3], fill: QuadFill<'_>, alpha: f32) {
        let area = edge(p[0], p[1], p[2]);
        if area.abs() < 1e-6 {
            return;
        }
        let min_x = p.iter().map(|v| v.x).fold(f32::INFINITY, f32::min).floor().max(0.0) as i32;
        let max_x = p.iter().map(|v| v.x).fold(f32::NEG_INFINITY, f32::max).ceil().min(self.width as f32 - 1.0) as i32;
        let min_y = p.iter().map(|v| v.y).fold(f32::INFINITY, f32::min).floor().max(0.0) as i32;
        let max_y = p.iter().map(|v| v.y).fold(f32::NEG_INFINITY, f32::max).ceil().min(self.height as f32 - 1.0) as i32;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let c = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(p[1], p[2], c) / area;
                let w1 = edge(p[2], p[0], c) / area;
                let w2 = edge(p[0], p[1], c) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }
                let color = match fill {
                    QuadFill::Solid(color) => color,
                    QuadFill::Texture(tex) => {
                        let t = uv[0] * w0 + uv[1] * w1 + uv[2] * w2;
                        tex.sample(t.x, t.y)
                    }
                };
                if alpha >= 1.0 {
                    self.set_pixel(x, y, color);
                } else {
                    self.blend_pixel(x, y, color, alpha);
                }
            }
        }
    }

    // ── Text ──────────────────────────────────────────────────────────────

    /// Draw `text` in the 3×5 bitmap font, each font pixel `scale` pixels wide.
    pub fn draw_text(&mut self, text: &str, x: i32, y: i32, scale: i32, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            for (row, &bits) in char_glyph(ch).iter().enumerate() {
                for col in 0..3 {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row as i32 * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx >= self.width as i32 {
                break;
            }
        }
    }

    /// Draw `text` horizontally centred on `cx`.
    pub fn draw_text_centered(&mut self, text: &str, cx: i32, y: i32, scale: i32, color: u32) {
        self.draw_text(text, cx - text_width(text, scale) / 2, y, scale, color);
    }
}

fn edge(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Width in pixels of `text` at `scale`, without the trailing gap.
pub fn text_width(text: &str, scale: i32) -> i32 {
    let n = text.chars().count() as i32;
    if n == 0 { 0 } else { (n * 4 - 1) * scale }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '|' => [0b010, 0b010, 0b010, 0b010, 0b010],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '>' => [0b100, 0b010, 0b001, 0b010, 0b100],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Mix two RGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
pub fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0 - t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    (lerp(ar, br) << 16) | (lerp(ag, bg) << 8) | lerp(ab, bb)
}

/// `a + b·t`, saturating per channel.
pub fn add(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let ch = |shift: u32| {
        let ca = (a >> shift) & 0xFF;
        let cb = (((b >> shift) & 0xFF) as f32 * t) as u32;
        (ca + cb).min(0xFF) << shift
    };
    ch(16) | ch(8) | ch(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_and_add() {
        assert_eq!(blend(0x000000, 0xffffff, 0.0), 0x000000);
        assert_eq!(blend(0x000000, 0xffffff, 1.0), 0xffffff);
        assert_eq!(add(0x80ff00, 0x80ff10, 1.0), 0xffff10);
        assert_eq!(add(0x101010, 0xffffff, 0.0), 0x101010);
    }

    #[test]
    fn rects_clip_at_the_edges() {
        let mut c = Canvas::new(10, 10, 0);
        c.fill_rect(-5, -5, 8, 8, 0xff);
        assert_eq!(c.get(0, 0), Some(0xff));
        assert_eq!(c.get(2, 2), Some(0xff));
        assert_eq!(c.get(3, 3), Some(0));
        c.fill_rect(8, 8, 100, 100, 0xaa);
        assert_eq!(c.get(9, 9), Some(0xaa));
        assert_eq!(c.get(10, 10), None);
    }

    #[test]
    fn border_leaves_the_middle_alone() {
        let mut c = Canvas::new(20, 20, 0);
        c.draw_border(0, 0, 20, 20, 3, 0x444444);
        assert_eq!(c.get(0, 10), Some(0x444444));
        assert_eq!(c.get(2, 2), Some(0x444444));
        assert_eq!(c.get(17, 19), Some(0x444444));
        assert_eq!(c.get(3, 3), Some(0));
        assert_eq!(c.get(10, 10), Some(0));
    }

    #[test]
    fn line_reaches_both_ends() {
        let mut c = Canvas::new(20, 20, 0);
        c.draw_line(1, 2, 15, 11, 0x1);
        assert_eq!(c.get(1, 2), Some(0x1));
        assert_eq!(c.get(15, 11), Some(0x1));
    }

    #[test]
    fn quad_fills_inside_only() {
        let mut c = Canvas::new(30, 30, 0);
        let q = [Vec2::new(5.0, 5.0), Vec2::new(25.0, 5.0), Vec2::new(25.0, 25.0), Vec2::new(5.0, 25.0)];
        c.fill_quad(q, QuadFill::Solid(0xeeeeee), 1.0);
        assert_eq!(c.get(15, 15), Some(0xeeeeee));
        assert_eq!(c.get(6, 24), Some(0xeeeeee));
        assert_eq!(c.get(2, 15), Some(0));

        // mirrored winding (a photo seen from behind) still draws
        let mut back = Canvas::new(30, 30, 0);
        back.fill_quad([q[1], q[0], q[3], q[2]], QuadFill::Solid(0x1), 1.0);
        assert_eq!(back.get(15, 15), Some(0x1));
    }

    #[test]
    fn textured_quad_maps_corners() {
        let tex = PhotoTexture {
            width:  2,
            height: 2,
            pixels: vec![0xff0000, 0x00ff00, 0x0000ff, 0xffffff],
        };
        let mut c = Canvas::new(40, 40, 0);
        let q = [Vec2::new(0.0, 0.0), Vec2::new(40.0, 0.0), Vec2::new(40.0, 40.0), Vec2::new(0.0, 40.0)];
        c.fill_quad(q, QuadFill::Texture(&tex), 1.0);
        assert_eq!(c.get(2, 2), Some(0xff0000));
        assert_eq!(c.get(37, 2), Some(0x00ff00));
        assert_eq!(c.get(2, 37), Some(0x0000ff));
        assert_eq!(c.get(37, 37), Some(0xffffff));
    }

    #[test]
    fn additive_circle_saturates() {
        let mut c = Canvas::new(10, 10, 0x808080);
        c.fill_circle(5.0, 5.0, 3.0, 0xffffff, 1.0, Blend::Additive);
        assert_eq!(c.get(5, 5), Some(0xffffff));
        assert_eq!(c.get(0, 0), Some(0x808080));
    }

    #[test]
    fn text_is_drawn_and_measured() {
        let mut c = Canvas::new(40, 10, 0);
        c.draw_text("1", 0, 0, 1, 0xcccccc);
        // '1' row 0 is 0b010
        assert_eq!(c.get(1, 0), Some(0xcccccc));
        assert_eq!(c.get(0, 0), Some(0));
        assert_eq!(text_width("12", 2), 14);
        assert_eq!(text_width("", 3), 0);
    }
}
