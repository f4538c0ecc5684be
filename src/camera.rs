//! Perspective camera for the fixed scene.

use glam::{Mat4, Vec3};

#[derive(Clone, Debug)]
pub struct PerspectiveCamera {
    pub fov_y_radians: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl PerspectiveCamera {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            fov_y_radians: 75.0_f32.to_radians(),
            aspect: width / height,
            near: 0.1,
            far: 1000.0,
            position: Vec3::new(0.0, 1.0, 2.0),
            target: Vec3::ZERO,
        }
    }

    /// Resize notification: only the aspect ratio changes.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.aspect = width / height;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_radians, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_viewport_updates_aspect() {
        let mut cam = PerspectiveCamera::new(800.0, 600.0);
        assert!((cam.aspect - 800.0 / 600.0).abs() < 1e-6);
        cam.set_viewport(1024.0, 768.0);
        assert!((cam.aspect - 1024.0 / 768.0).abs() < 1e-6);
    }

    #[test]
    fn projection_uses_near_far_planes() {
        let cam = PerspectiveCamera::new(640.0, 480.0);
        let proj = cam.projection_matrix();
        // A point on the near plane maps to NDC z = -1 in GL conventions.
        let p = proj.project_point3(Vec3::new(0.0, 0.0, -cam.near));
        assert!((p.z + 1.0).abs() < 1e-4);
    }
}
