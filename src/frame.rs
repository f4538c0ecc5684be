//! The per-frame animation loop and its uniform update contract.
//!
//! One iteration: read the clock, push elapsed time into both animated
//! materials, advance camera damping, submit one draw. The host's
//! frame-presentation callback re-arms the loop after each iteration, so
//! exactly one iteration is ever in flight.

use crate::camera::PerspectiveCamera;
use crate::clock::{Clock, TimeSource};
use crate::config::Rgb;
use crate::controls::CameraController;
use crate::uniforms::{clamped_pixel_ratio, UniformSet};

/// Submits one frame. The loop hands over the camera and the current uniform
/// values; drawing failures are the renderer's concern, not the loop's.
pub trait FrameRenderer {
    fn render(&mut self, camera: &PerspectiveCamera, uniforms: &UniformSet);
}

/// Owns all time-dependent scene state and drives it one frame at a time.
pub struct RenderLoop<T: TimeSource, C: CameraController> {
    clock: Clock<T>,
    uniforms: UniformSet,
    camera: PerspectiveCamera,
    controls: C,
    stopped: bool,
}

impl<T: TimeSource, C: CameraController> RenderLoop<T, C> {
    pub fn new(
        clock: Clock<T>,
        uniforms: UniformSet,
        camera: PerspectiveCamera,
        controls: C,
    ) -> Self {
        Self {
            clock,
            uniforms,
            camera,
            controls,
            stopped: false,
        }
    }

    /// One loop iteration. Per-frame writes are limited to the two time
    /// uniforms and the camera transform; everything else only moves on an
    /// external event.
    pub fn step(&mut self, renderer: &mut dyn FrameRenderer) {
        let elapsed = self.clock.elapsed();
        self.uniforms.tick(elapsed);
        self.controls.update(&mut self.camera);
        renderer.render(&self.camera, &self.uniforms);
    }

    /// Cancellation flag, checked once per iteration by the scheduler glue.
    /// Once set the loop is never re-armed.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Resize notification: recompute the camera aspect and the fireflies
    /// pixel-ratio uniform. No time-driven state is touched.
    pub fn apply_resize(&mut self, width: f32, height: f32, device_pixel_ratio: f64) {
        self.camera.set_viewport(width, height);
        self.uniforms.fireflies.pixel_ratio = clamped_pixel_ratio(device_pixel_ratio);
    }

    // Panel-driven writes. Each touches exactly one event-driven cell.

    pub fn set_fireflies_size(&mut self, size: f32) {
        self.uniforms.fireflies.size = size;
    }

    pub fn set_portal_color_start(&mut self, color: Rgb) {
        self.uniforms.portal.color_start = color;
    }

    pub fn set_portal_color_end(&mut self, color: Rgb) {
        self.uniforms.portal.color_end = color;
    }

    pub fn uniforms(&self) -> &UniformSet {
        &self.uniforms
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn controls_mut(&mut self) -> &mut C {
        &mut self.controls
    }
}
