//! Perspective camera.
//!
//! OpenGL conventions: the camera looks down its local −Z, NDC spans
//! `[-1, 1]` on every axis, and +Y is up on screen.

use glam::{Mat4, Quat, Vec2, Vec3, Vec4Swizzles};

pub const FOV_Y_DEG: f32 = 55.0;
pub const NEAR: f32 = 1.0;
pub const FAR: f32 = 10_000.0;
pub const START_POSITION: Vec3 = Vec3::new(0.0, 150.0, 1800.0);

/// A half-line in world space.  `direction` is unit length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin:    Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position:    Vec3,
    pub orientation: Quat,
    pub fov_y_deg:   f32,
    pub aspect:      f32,
    pub near:        f32,
    pub far:         f32,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            position:    START_POSITION,
            orientation: Quat::IDENTITY,
            fov_y_deg:   FOV_Y_DEG,
            aspect:      16.0 / 9.0,
            near:        NEAR,
            far:         FAR,
        }
    }
}

impl Camera {
    pub fn with_aspect(aspect: f32) -> Self {
        Camera { aspect, ..Camera::default() }
    }

    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position).inverse()
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    /// The point `distance` units straight ahead of the lens.
    pub fn focus_point(&self, distance: f32) -> Vec3 {
        self.position + self.forward() * distance
    }

    /// Ray from the eye through an NDC point.
    pub fn ray(&self, ndc: Vec2) -> Ray {
        let inv  = self.view_projection().inverse();
        let near = inv.project_point3(ndc.extend(-1.0));
        let far  = inv.project_point3(ndc.extend(1.0));
        Ray { origin: self.position, direction: (far - near).normalize() }
    }

    /// World point to `(ndc.x, ndc.y, view depth)`.  `None` behind the lens.
    pub fn project(&self, world: Vec3) -> Option<Vec3> {
        let clip = self.view_projection() * world.extend(1.0);
        if clip.w <= self.near * 0.5 {
            return None;
        }
        let ndc = clip.xy() / clip.w;
        Some(ndc.extend(clip.w))
    }
}

/// NDC to pixel coordinates (origin top left).
pub fn ndc_to_px(ndc: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new((ndc.x + 1.0) * 0.5 * width, (1.0 - ndc.y) * 0.5 * height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_ray_looks_forward() {
        let cam = Camera::default();
        let ray = cam.ray(Vec2::ZERO);
        assert_eq!(ray.origin, START_POSITION);
        assert!(ray.direction.dot(Vec3::NEG_Z) > 0.9999);
    }

    #[test]
    fn project_inverts_ray() {
        let cam = Camera::with_aspect(4.0 / 3.0);
        let ndc = Vec2::new(0.3, -0.6);
        let p = cam.ray(ndc).at(900.0);
        let back = cam.project(p).unwrap();
        assert!((back.x - ndc.x).abs() < 1e-3);
        assert!((back.y - ndc.y).abs() < 1e-3);
        assert!(back.z > 0.0);
    }

    #[test]
    fn behind_the_camera_is_culled() {
        let cam = Camera::default();
        assert!(cam.project(START_POSITION + Vec3::new(0.0, 0.0, 100.0)).is_none());
    }

    #[test]
    fn focus_point_is_in_front() {
        let cam = Camera::default();
        assert_eq!(cam.focus_point(350.0), Vec3::new(0.0, 150.0, 1450.0));
    }

    #[test]
    fn ndc_corners_map_to_pixels() {
        assert_eq!(ndc_to_px(Vec2::new(-1.0, 1.0), 800.0, 600.0), Vec2::ZERO);
        assert_eq!(ndc_to_px(Vec2::new(1.0, -1.0), 800.0, 600.0), Vec2::new(800.0, 600.0));
    }
}
