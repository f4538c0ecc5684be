//! Shader uniform cells for the two animated materials.
//!
//! Uniforms come in two categories with disjoint writers: the time cells are
//! written once per frame by the render loop and by nothing else; every other
//! cell is written only from an external event (resize, panel change). All
//! writes and reads happen on the single rendering thread between frames, so
//! the structs are plain data with no interior mutability.

use crate::config::Rgb;

/// Largest device pixel ratio the fireflies sizing will honour; anything
/// denser just burns fill rate on sprites nobody can resolve.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

pub fn clamped_pixel_ratio(device_pixel_ratio: f64) -> f32 {
    device_pixel_ratio.min(MAX_PIXEL_RATIO) as f32
}

#[derive(Clone, Debug, PartialEq)]
pub struct FirefliesUniforms {
    pub time: f32,
    pub pixel_ratio: f32,
    pub size: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PortalUniforms {
    pub time: f32,
    pub color_start: Rgb,
    pub color_end: Rgb,
}

/// Both animated materials' uniform sets, owned by the enclosing app and
/// shared by reference with the renderer for the duration of a draw.
#[derive(Clone, Debug, PartialEq)]
pub struct UniformSet {
    pub fireflies: FirefliesUniforms,
    pub portal: PortalUniforms,
}

impl UniformSet {
    pub fn new(device_pixel_ratio: f64, size: f32, color_start: Rgb, color_end: Rgb) -> Self {
        Self {
            fireflies: FirefliesUniforms {
                time: 0.0,
                pixel_ratio: clamped_pixel_ratio(device_pixel_ratio),
                size,
            },
            portal: PortalUniforms {
                time: 0.0,
                color_start,
                color_end,
            },
        }
    }

    /// The render loop's only write: push elapsed time into both materials.
    pub fn tick(&mut self, elapsed: f32) {
        self.fireflies.time = elapsed;
        self.portal.time = elapsed;
    }
}
