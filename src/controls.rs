//! Interactive orbit controls with damping.

use crate::camera::PerspectiveCamera;
use glam::Vec3;

/// Advance one damping step and mutate the camera transform the controller
/// was bound to at construction. The render loop is the only caller.
pub trait CameraController {
    fn update(&mut self, camera: &mut PerspectiveCamera);
}

const MIN_POLAR: f32 = 0.01;
const MIN_RADIUS: f32 = 0.5;
const MAX_RADIUS: f32 = 50.0;

/// Spherical-coordinate orbit around the camera target. Pointer input moves
/// the target angles; `update` eases the current angles toward them so the
/// motion keeps coasting briefly after the pointer stops.
pub struct OrbitControls {
    azimuth: f32,
    polar: f32,
    radius: f32,
    target_azimuth: f32,
    target_polar: f32,
    target_radius: f32,
    /// Fraction of the remaining distance covered per step.
    damping: f32,
}

impl OrbitControls {
    /// Bind to `camera`, reading its current transform as the rest state.
    pub fn new(camera: &PerspectiveCamera) -> Self {
        let offset = camera.position - camera.target;
        let radius = offset.length().max(MIN_RADIUS);
        let azimuth = offset.x.atan2(offset.z);
        let polar = (offset.y / radius).clamp(-1.0, 1.0).acos();
        Self {
            azimuth,
            polar,
            radius,
            target_azimuth: azimuth,
            target_polar: polar,
            target_radius: radius,
            damping: 0.1,
        }
    }

    /// Pointer drag, in pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        let sensitivity = 0.005;
        self.target_azimuth -= dx * sensitivity;
        self.target_polar = (self.target_polar - dy * sensitivity)
            .clamp(MIN_POLAR, std::f32::consts::PI - MIN_POLAR);
    }

    /// Wheel zoom; positive delta moves away from the target.
    pub fn zoom(&mut self, delta: f32) {
        self.target_radius =
            (self.target_radius + delta * 0.002 * self.target_radius).clamp(MIN_RADIUS, MAX_RADIUS);
    }
}

impl CameraController for OrbitControls {
    fn update(&mut self, camera: &mut PerspectiveCamera) {
        self.azimuth += (self.target_azimuth - self.azimuth) * self.damping;
        self.polar += (self.target_polar - self.polar) * self.damping;
        self.radius += (self.target_radius - self.radius) * self.damping;

        let offset = Vec3::new(
            self.radius * self.polar.sin() * self.azimuth.sin(),
            self.radius * self.polar.cos(),
            self.radius * self.polar.sin() * self.azimuth.cos(),
        );
        camera.position = camera.target + offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_without_input_holds_the_bound_transform() {
        let mut cam = PerspectiveCamera::new(800.0, 600.0);
        let start = cam.position;
        let mut controls = OrbitControls::new(&cam);
        for _ in 0..10 {
            controls.update(&mut cam);
        }
        assert!((cam.position - start).length() < 1e-4);
    }

    #[test]
    fn damping_converges_toward_drag_target() {
        let mut cam = PerspectiveCamera::new(800.0, 600.0);
        let mut controls = OrbitControls::new(&cam);
        controls.rotate(200.0, 0.0);

        controls.update(&mut cam);
        let after_one = cam.position;
        for _ in 0..200 {
            controls.update(&mut cam);
        }
        let settled = cam.position;

        // One step moves partway; many steps settle, and further steps are
        // idempotent once converged.
        assert!((after_one - settled).length() > 1e-3);
        controls.update(&mut cam);
        assert!((cam.position - settled).length() < 1e-3);
        // Orbit preserves distance to the target.
        assert!((settled.length() - (Vec3::new(0.0, 1.0, 2.0)).length()).abs() < 1e-3);
    }

    #[test]
    fn polar_angle_is_clamped_away_from_poles() {
        let mut cam = PerspectiveCamera::new(800.0, 600.0);
        let mut controls = OrbitControls::new(&cam);
        controls.rotate(0.0, 1e6);
        for _ in 0..500 {
            controls.update(&mut cam);
        }
        // Camera never flips past the top pole.
        assert!(cam.position.y <= cam.target.y + MAX_RADIUS);
        assert!((cam.position - cam.target).length() > MIN_RADIUS * 0.9);
    }

    #[test]
    fn zoom_respects_radius_bounds() {
        let mut cam = PerspectiveCamera::new(800.0, 600.0);
        let mut controls = OrbitControls::new(&cam);
        controls.zoom(1e9);
        for _ in 0..500 {
            controls.update(&mut cam);
        }
        assert!((cam.position - cam.target).length() <= MAX_RADIUS + 1e-3);
    }
}
