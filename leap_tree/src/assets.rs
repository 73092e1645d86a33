//! Photo assets: `{dir}/{n}.jpg`, then `{dir}/{n}.png`, then a generated
//! placeholder.  Missing or broken files never reach the user; the fallback
//! is only logged.

use std::path::Path;

use image::imageops::FilterType;
use tracing::{debug, info};

use crate::canvas::Canvas;

/// Side of every decoded photo texture, in pixels.
pub const TEXTURE_SIZE: u32 = 128;

const PLACEHOLDER_BG: u32 = 0x080808;
const PLACEHOLDER_BORDER: u32 = 0x444444;
const PLACEHOLDER_TEXT: u32 = 0xcccccc;

#[derive(Clone, Debug, PartialEq)]
pub struct PhotoTexture {
    pub width:  usize,
    pub height: usize,
    /// Row-major 0xRRGGBB.
    pub pixels: Vec<u32>,
}

impl PhotoTexture {
    /// Nearest-texel lookup; `u`, `v` in `[0, 1]` (clamped).
    pub fn sample(&self, u: f32, v: f32) -> u32 {
        let x = ((u.clamp(0.0, 1.0) * self.width as f32) as usize).min(self.width.saturating_sub(1));
        let y = ((v.clamp(0.0, 1.0) * self.height as f32) as usize).min(self.height.saturating_sub(1));
        self.pixels.get(y * self.width + x).copied().unwrap_or(PLACEHOLDER_BG)
    }
}

/// Where a texture came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhotoSource {
    Jpg,
    Png,
    Placeholder,
}

/// Load photo number `number` (1-based, as the files are named).
pub fn load_photo(dir: &Path, number: usize) -> (PhotoTexture, PhotoSource) {
    for (ext, source) in [("jpg", PhotoSource::Jpg), ("png", PhotoSource::Png)] {
        let path = dir.join(format!("{number}.{ext}"));
        match decode(&path) {
            Ok(tex) => return (tex, source),
            Err(e)  => debug!(path = %path.display(), error = %e, "photo unavailable, trying next"),
        }
    }
    (placeholder(number), PhotoSource::Placeholder)
}

/// Textures for photos `1..=count`, in decoration order.
pub fn load_photos(dir: &Path, count: usize) -> Vec<PhotoTexture> {
    let mut placeholders = 0;
    let photos: Vec<_> = (1..=count)
        .map(|n| {
            let (tex, source) = load_photo(dir, n);
            if source == PhotoSource::Placeholder {
                placeholders += 1;
            }
            tex
        })
        .collect();
    info!(dir = %dir.display(), count, placeholders, "photos loaded");
    photos
}

fn decode(path: &Path) -> Result<PhotoTexture, image::ImageError> {
    let img = image::open(path)?.to_rgba8();
    let img = image::imageops::resize(&img, TEXTURE_SIZE, TEXTURE_SIZE, FilterType::Triangle);
    let pixels = img
        .pixels()
        .map(|p| {
            let [r, g, b, _] = p.0;
            ((r as u32) << 16) | ((g as u32) << 8) | b as u32
        })
        .collect();
    Ok(PhotoTexture { width: TEXTURE_SIZE as usize, height: TEXTURE_SIZE as usize, pixels })
}

/// Dark square with a grey border and the photo number in the middle.
pub fn placeholder(number: usize) -> PhotoTexture {
    let size = TEXTURE_SIZE as i32;
    let inset = size / 25;
    let mut canvas = Canvas::new(size as usize, size as usize, PLACEHOLDER_BG);
    canvas.draw_border(inset, inset, size - 2 * inset, size - 2 * inset, inset, PLACEHOLDER_BORDER);

    let label = number.to_string();
    let scale = 8;
    canvas.draw_text_centered(&label, size / 2, size / 2 - 5 * scale / 2, scale, PLACEHOLDER_TEXT);

    PhotoTexture { width: size as usize, height: size as usize, pixels: canvas.into_pixels() }
}
