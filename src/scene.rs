//! Scene assembly: binding loaded named meshes to the three fixed materials.
//!
//! The model file is decoded by an external loader; this module only sees
//! named vertex/index buffers. Lookup is by exact name match, but a missing
//! name yields a typed result the caller can report instead of a crash.

/// Which material a named sub-mesh is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshRole {
    /// Pre-lit surface, sampled from the baked lighting texture.
    Baked,
    /// The animated portal plane.
    PortalLight,
    /// Flat warm-white lamp heads.
    PoleLight,
}

/// Sub-mesh names the portal model is expected to contain.
pub const EXPECTED_MESHES: [&str; 4] = ["baked", "portal", "poleLightA", "poleLightB"];

pub fn role_for_name(name: &str) -> Option<MeshRole> {
    match name {
        "baked" => Some(MeshRole::Baked),
        "portal" => Some(MeshRole::PortalLight),
        "poleLightA" | "poleLightB" => Some(MeshRole::PoleLight),
        _ => None,
    }
}

/// Raw buffers for one sub-mesh, as handed over by the loader.
#[derive(Clone, Debug)]
pub struct MeshData {
    pub name: String,
    /// xyz triplets.
    pub positions: Vec<f32>,
    /// uv pairs; empty for meshes whose material ignores texture coordinates.
    pub uvs: Vec<f32>,
    pub indices: Vec<u16>,
}

/// One renderable node: a sub-mesh bound to its material.
#[derive(Clone, Debug)]
pub struct SceneNode {
    pub role: MeshRole,
    pub mesh: MeshData,
}

/// The assembled scene graph. Read-only after assembly.
#[derive(Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
}

impl SceneGraph {
    /// Attach one loaded mesh, binding it to a material by name. Returns the
    /// assigned role, or `None` when the name is not one the scene knows —
    /// the mesh is dropped and the caller decides how loudly to complain.
    pub fn attach(&mut self, mesh: MeshData) -> Option<MeshRole> {
        let role = role_for_name(&mesh.name)?;
        self.nodes.push(SceneNode { role, mesh });
        Some(role)
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    /// Expected sub-mesh names not attached yet; non-empty after the loader
    /// finishes means the model is incomplete.
    pub fn missing(&self) -> Vec<&'static str> {
        EXPECTED_MESHES
            .iter()
            .copied()
            .filter(|name| !self.nodes.iter().any(|n| n.mesh.name == *name))
            .collect()
    }
}
