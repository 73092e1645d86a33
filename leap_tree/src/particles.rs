//! Particle clouds for the tree scene.
//!
//! Each cloud is a fixed set of points in the local space of one scene node
//! (see [`tree_scene::Layers`]); the renderer multiplies by the node's world
//! matrix, so tweening a node's scale or opacity moves its whole cloud.
//! Only snow moves point by point.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tree_scene::{Layers, NodeId, SceneConfig};

/// Number of points per cloud.  The software renderer draws every point every
/// frame, so these sit well below what a GPU would take.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub trunk:   usize,
    pub leaves:  usize,
    pub outline: usize,
    pub lights:  usize,
    pub dust:    usize,
    pub magic:   usize,
    pub snow:    usize,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        ParticleConfig {
            trunk:   1500,
            leaves:  6000,
            outline: 2000,
            lights:  800,
            dust:    1500,
            magic:   600,
            snow:    600,
        }
    }
}

impl ParticleConfig {
    pub fn total(&self) -> usize {
        self.trunk + self.leaves + self.outline + self.lights + self.dust + self.magic + self.snow
    }
}

/// How a cloud's points combine with what is already on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blend {
    Normal,
    Additive,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Cloud {
    pub points: Vec<Vec3>,
    /// 0xRRGGBB per point.
    pub colors: Vec<u32>,
    /// Point diameter in world units.
    pub size:   f32,
    pub blend:  Blend,
}

impl Cloud {
    fn with_capacity(n: usize, size: f32, blend: Blend) -> Self {
        Cloud { points: Vec::with_capacity(n), colors: Vec::with_capacity(n), size, blend }
    }

    fn push(&mut self, p: Vec3, color: u32) {
        self.points.push(p);
        self.colors.push(color);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Colours
// ════════════════════════════════════════════════════════════════════════════

pub const TRUNK_DARK: u32 = 0x5d4037;
pub const TRUNK_LIGHT: u32 = 0x8d6e63;
pub const LEAF_DARK: u32 = 0x001a00;
pub const LEAF_LIGHT: u32 = 0x00ff44;
pub const OUTLINE: u32 = 0xaaffaa;
pub const STAR: u32 = 0xffd700;
pub const LIGHT_COLORS: [u32; 5] = [0xff0000, 0xffd700, 0x0044ff, 0xff00ff, 0x00ffcc];
pub const DUST_A: u32 = 0x8800ff;
pub const DUST_B: u32 = 0xffaa00;
pub const MAGIC_A: u32 = 0x00ffff;
pub const MAGIC_B: u32 = 0xff0088;
pub const SNOW: u32 = 0xffffff;

/// Per-channel linear mix of two 0xRRGGBB colours.
pub fn lerp_color(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let ch = |shift: u32| {
        let ca = ((a >> shift) & 0xff) as f32;
        let cb = ((b >> shift) & 0xff) as f32;
        ((ca + (cb - ca) * t).round() as u32) << shift
    };
    ch(16) | ch(8) | ch(0)
}

// ════════════════════════════════════════════════════════════════════════════
// Generators
// ════════════════════════════════════════════════════════════════════════════

const LEAF_LAYERS: usize = 14;
const TRUNK_RADIUS: f32 = 60.0;
const STAR_RADIUS: f32 = 55.0;

fn ring<R: Rng>(rng: &mut R, r: f32) -> (f32, f32) {
    let angle = rng.random::<f32>() * std::f32::consts::TAU;
    (angle.cos() * r, angle.sin() * r)
}

pub fn trunk<R: Rng>(n: usize, cfg: &SceneConfig, rng: &mut R) -> Cloud {
    let height  = cfg.tree_height * 0.4;
    let start_y = -cfg.tree_height / 2.0 - 80.0;
    let mut c = Cloud::with_capacity(n, 5.0, Blend::Normal);
    for _ in 0..n {
        let h = rng.random::<f32>() * height;
        let r = rng.random::<f32>().sqrt() * TRUNK_RADIUS;
        let (x, z) = ring(rng, r);
        c.push(Vec3::new(x, start_y + h, z), lerp_color(TRUNK_DARK, TRUNK_LIGHT, rng.random()));
    }
    c
}

/// Stacked drooping cones, denser toward the bottom; darker inside,
/// brighter at the rim.
pub fn leaves<R: Rng>(n: usize, cfg: &SceneConfig, rng: &mut R) -> Cloud {
    let layer_h = cfg.tree_height / LEAF_LAYERS as f32;
    let mut c = Cloud::with_capacity(n, 5.0, Blend::Normal);
    for _ in 0..n {
        let layer    = ((rng.random::<f32>().powf(0.8) * LEAF_LAYERS as f32) as usize).min(LEAF_LAYERS - 1);
        let y_offset = rng.random::<f32>() * layer_h;
        let y        = -cfg.tree_height / 2.0 + layer as f32 * layer_h + y_offset;
        let progress = (layer as f32 + y_offset / layer_h) / LEAF_LAYERS as f32;
        let max_r    = (1.0 - progress * 0.95) * cfg.base_radius;

        let r     = rng.random::<f32>().sqrt() * max_r;
        let (x, z) = ring(rng, r);
        let droop = (r / max_r) * layer_h * 0.6;
        c.push(Vec3::new(x, y - droop, z), lerp_color(LEAF_DARK, LEAF_LIGHT, r / max_r));
    }
    c
}

/// Thin bright rims at the edge of each layer.
pub fn outline<R: Rng>(n: usize, cfg: &SceneConfig, rng: &mut R) -> Cloud {
    let layer_h = cfg.tree_height / LEAF_LAYERS as f32;
    let mut c = Cloud::with_capacity(n, 3.0, Blend::Additive);
    for _ in 0..n {
        let layer    = rng.random_range(0..LEAF_LAYERS);
        let y_offset = rng.random::<f32>() * layer_h * 0.2;
        let max_r    = (1.0 - layer as f32 / LEAF_LAYERS as f32 * 0.95) * cfg.base_radius;
        let r        = max_r * (0.98 + rng.random::<f32>() * 0.05);
        let (x, z)   = ring(rng, r);
        let y        = -cfg.tree_height / 2.0 + layer as f32 * layer_h + y_offset - layer_h * 0.5;
        c.push(Vec3::new(x, y, z), OUTLINE);
    }
    c
}

/// Two interleaved spirals of coloured bulbs just outside the foliage.
pub fn lights<R: Rng>(n: usize, cfg: &SceneConfig, rng: &mut R) -> Cloud {
    let mut c = Cloud::with_capacity(n, 12.0, Blend::Additive);
    for i in 0..n {
        let t = i as f32 / n as f32;
        let h = (t - 0.5) * cfg.tree_height * 0.95;
        let r = (1.0 - (h + cfg.tree_height / 2.0) / cfg.tree_height) * cfg.base_radius + 30.0;
        let angle = t * std::f32::consts::PI * 20.0 + (i % 2) as f32 * std::f32::consts::PI;
        let color = LIGHT_COLORS[((rng.random::<f32>() * 5.0) as usize).min(4)];
        c.push(Vec3::new(angle.cos() * r, h, angle.sin() * r), color);
    }
    c
}

/// Filled octahedron.
pub fn star<R: Rng>(rng: &mut R) -> Cloud {
    let n = 300;
    let mut c = Cloud::with_capacity(n, 8.0, Blend::Additive);
    for _ in 0..n {
        let v = Vec3::new(
            rng.random::<f32>() - 0.5,
            rng.random::<f32>() - 0.5,
            rng.random::<f32>() - 0.5,
        );
        // |x|+|y|+|z| <= 1 is the octahedron; push samples onto or inside it
        let l1 = v.x.abs() + v.y.abs() + v.z.abs();
        if l1 > 0.0 {
            let scale = rng.random::<f32>().cbrt() / l1;
            c.push(v * scale * STAR_RADIUS, STAR);
        }
    }
    c
}

/// Flat ring of dust around the scene, visible in universe mode.
pub fn dust<R: Rng>(n: usize, rng: &mut R) -> Cloud {
    let mut c = Cloud::with_capacity(n, 4.0, Blend::Additive);
    for _ in 0..n {
        let r = 1000.0 + rng.random::<f32>() * 1500.0;
        let (x, z) = ring(rng, r);
        let y = (rng.random::<f32>() - 0.5) * 1000.0;
        c.push(Vec3::new(x, y, z), lerp_color(DUST_A, DUST_B, rng.random()));
    }
    c
}

/// Spherical shell of sparkles, visible in universe mode.
pub fn magic<R: Rng>(n: usize, rng: &mut R) -> Cloud {
    let mut c = Cloud::with_capacity(n, 15.0, Blend::Additive);
    for _ in 0..n {
        let r     = 800.0 + rng.random::<f32>() * 2000.0;
        let theta = rng.random::<f32>() * std::f32::consts::TAU;
        let phi   = (2.0 * rng.random::<f32>() - 1.0).acos();
        let p = Vec3::new(r * phi.sin() * theta.cos(), r * phi.sin() * theta.sin(), r * phi.cos());
        c.push(p, lerp_color(MAGIC_A, MAGIC_B, rng.random()));
    }
    c
}

pub const SNOW_TOP: f32 = 1000.0;
pub const SNOW_BOTTOM: f32 = -1000.0;

/// Falling snow: a cloud plus one downward speed per flake.
#[derive(Clone, Debug, PartialEq)]
pub struct Snow {
    pub cloud:  Cloud,
    pub speeds: Vec<f32>,
}

impl Snow {
    pub fn new<R: Rng>(n: usize, rng: &mut R) -> Self {
        let mut cloud = Cloud::with_capacity(n, 6.0, Blend::Additive);
        let mut speeds = Vec::with_capacity(n);
        for _ in 0..n {
            let p = Vec3::new(
                (rng.random::<f32>() - 0.5) * 3000.0,
                SNOW_BOTTOM + rng.random::<f32>() * (SNOW_TOP - SNOW_BOTTOM),
                (rng.random::<f32>() - 0.5) * 3000.0,
            );
            cloud.push(p, SNOW);
            speeds.push(rng.random::<f32>() * 2.0 + 1.0);
        }
        Snow { cloud, speeds }
    }

    /// One frame of fall.  A flake below the floor reappears at the top.
    pub fn step(&mut self) {
        for (p, v) in self.cloud.points.iter_mut().zip(&self.speeds) {
            p.y -= v;
            if p.y < SNOW_BOTTOM {
                p.y = SNOW_TOP;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ParticleClouds — everything the tree scene draws as points
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct ParticleClouds {
    pub trunk:   Cloud,
    pub leaves:  Cloud,
    pub outline: Cloud,
    pub lights:  Cloud,
    pub star:    Cloud,
    pub dust:    Cloud,
    pub magic:   Cloud,
    pub snow:    Snow,
}

impl ParticleClouds {
    pub fn build<R: Rng>(cfg: &ParticleConfig, scene: &SceneConfig, rng: &mut R) -> Self {
        ParticleClouds {
            trunk:   trunk(cfg.trunk, scene, rng),
            leaves:  leaves(cfg.leaves, scene, rng),
            outline: outline(cfg.outline, scene, rng),
            lights:  lights(cfg.lights, scene, rng),
            star:    star(rng),
            dust:    dust(cfg.dust, rng),
            magic:   magic(cfg.magic, rng),
            snow:    Snow::new(cfg.snow, rng),
        }
    }

    /// Each cloud paired with the node it hangs from, back to front in
    /// drawing order.
    pub fn layers(&self, l: &Layers) -> [(NodeId, &Cloud); 8] {
        [
            (l.dust,    &self.dust),
            (l.magic,   &self.magic),
            (l.trunk,   &self.trunk),
            (l.leaves,  &self.leaves),
            (l.outline, &self.outline),
            (l.lights,  &self.lights),
            (l.star,    &self.star),
            (l.snow,    &self.snow.cloud),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(11)
    }

    #[test]
    fn color_lerp_endpoints() {
        assert_eq!(lerp_color(LEAF_DARK, LEAF_LIGHT, 0.0), LEAF_DARK);
        assert_eq!(lerp_color(LEAF_DARK, LEAF_LIGHT, 1.0), LEAF_LIGHT);
        assert_eq!(lerp_color(0x000000, 0xfe00fe, 0.5), 0x7f007f);
        assert_eq!(lerp_color(0x000000, 0xffffff, 7.0), 0xffffff);
    }

    #[test]
    fn counts_follow_config() {
        let cfg = ParticleConfig { trunk: 10, leaves: 20, outline: 30, lights: 40, dust: 50, magic: 60, snow: 70 };
        let clouds = ParticleClouds::build(&cfg, &SceneConfig::default(), &mut rng());
        assert_eq!(clouds.trunk.len(), 10);
        assert_eq!(clouds.leaves.len(), 20);
        assert_eq!(clouds.outline.len(), 30);
        assert_eq!(clouds.lights.len(), 40);
        assert_eq!(clouds.dust.len(), 50);
        assert_eq!(clouds.magic.len(), 60);
        assert_eq!(clouds.snow.cloud.len(), 70);
        assert_eq!(clouds.snow.speeds.len(), 70);
        assert!(!clouds.star.is_empty());
        assert_eq!(cfg.total(), 280);
    }

    #[test]
    fn foliage_narrows_toward_the_top() {
        let scene = SceneConfig::default();
        let c = leaves(4000, &scene, &mut rng());
        let radial = |p: &Vec3| p.x.hypot(p.z);
        let low: f32 = c.points.iter().filter(|p| p.y < -300.0).map(radial).fold(0.0, f32::max);
        let high: f32 = c.points.iter().filter(|p| p.y > 300.0).map(radial).fold(0.0, f32::max);
        assert!(low > high * 2.0, "low {low} high {high}");
        assert!(c.points.iter().all(|p| radial(p) <= scene.base_radius + 1e-3));
    }

    #[test]
    fn trunk_stays_thin_and_low() {
        let scene = SceneConfig::default();
        let c = trunk(500, &scene, &mut rng());
        for p in &c.points {
            assert!(p.x.hypot(p.z) <= TRUNK_RADIUS + 1e-3);
            assert!(p.y >= -scene.tree_height / 2.0 - 80.0);
            assert!(p.y < -scene.tree_height / 2.0 - 80.0 + scene.tree_height * 0.4);
        }
    }

    #[test]
    fn star_fits_its_octahedron() {
        let c = star(&mut rng());
        assert!(c.points.iter().all(|p| p.x.abs() + p.y.abs() + p.z.abs() <= STAR_RADIUS + 1e-3));
        assert!(c.colors.iter().all(|&col| col == STAR));
    }

    #[test]
    fn shells_keep_their_radii() {
        let d = dust(300, &mut rng());
        assert!(d.points.iter().all(|p| (1000.0 - 1e-2..=2500.0 + 1e-2).contains(&p.x.hypot(p.z))));
        let m = magic(300, &mut rng());
        assert!(m.points.iter().all(|p| (800.0 - 1e-1..=2800.0 + 1e-1).contains(&p.length())));
    }

    #[test]
    fn snow_falls_and_wraps() {
        let mut snow = Snow::new(1, &mut rng());
        snow.cloud.points[0].y = SNOW_BOTTOM + 0.5;
        snow.speeds[0] = 1.0;
        snow.step();
        assert_eq!(snow.cloud.points[0].y, SNOW_TOP);
        snow.step();
        assert_eq!(snow.cloud.points[0].y, SNOW_TOP - 1.0);
    }

    #[test]
    fn config_file_may_omit_counts() {
        let cfg: ParticleConfig = serde_json::from_str(r#"{ "snow": 5 }"#).unwrap();
        assert_eq!(cfg.snow, 5);
        assert_eq!(cfg.leaves, ParticleConfig::default().leaves);
    }
}
