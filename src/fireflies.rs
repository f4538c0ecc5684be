//! Firefly point-sprite field.

pub const FIREFLY_COUNT: usize = 30;

/// Static vertex data for the firefly points; positions never change after
/// generation, all motion happens in the vertex shader from `u_time`.
pub struct FirefliesGeometry {
    /// xyz triplets.
    pub positions: Vec<f32>,
    /// Per-point sprite scale in [0, 1).
    pub scales: Vec<f32>,
}

impl FirefliesGeometry {
    /// Scatter `count` points over the clearing: x/z in [-4, 4), y in
    /// [0, 1.5). `rand` supplies values in [0, 1) so callers choose between
    /// the browser RNG and a deterministic one under test.
    pub fn generate(count: usize, rand: &mut dyn FnMut() -> f32) -> Self {
        let mut positions = Vec::with_capacity(count * 3);
        let mut scales = Vec::with_capacity(count);
        for _ in 0..count {
            positions.push((rand() - 0.5) * 8.0);
            positions.push(rand() * 1.5);
            positions.push((rand() - 0.5) * 8.0);
            scales.push(rand());
        }
        Self { positions, scales }
    }
}
