//! WebGL2 renderer for the portal scene.
//!
//! Geometry and programs are uploaded once at assembly; the per-frame path
//! only writes uniforms and issues draws, so [`FrameRenderer::render`] has
//! no error path.

use std::collections::HashMap;

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    HtmlImageElement, WebGl2RenderingContext as GL, WebGlProgram, WebGlShader, WebGlTexture,
    WebGlUniformLocation, WebGlVertexArrayObject,
};

use crate::camera::PerspectiveCamera;
use crate::config::Rgb;
use crate::fireflies::FirefliesGeometry;
use crate::frame::FrameRenderer;
use crate::scene::{MeshRole, SceneNode};
use crate::uniforms::UniformSet;

/// Warm white of the pole lamp heads.
const POLE_LIGHT_COLOR: Rgb = [1.0, 1.0, 229.0 / 255.0];

/// Shared vertex stage for the triangle meshes. Meshes without texture
/// coordinates simply leave attribute 1 disabled.
const SURFACE_VERTEX_SHADER: &str = r#"#version 300 es
precision highp float;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec2 a_uv;

uniform mat4 u_view_projection;

out vec2 v_uv;

void main() {
    v_uv = a_uv;
    gl_Position = u_view_projection * vec4(a_position, 1.0);
}
"#;

/// Baked surface: pre-lit texture, no runtime lighting at all.
const BAKED_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

in vec2 v_uv;

uniform sampler2D u_baked;

out vec4 frag_color;

void main() {
    frag_color = texture(u_baked, v_uv);
}
"#;

const POLE_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

uniform vec3 u_color;

out vec4 frag_color;

void main() {
    frag_color = vec4(u_color, 1.0);
}
"#;

/// Portal plane: time-animated value noise blended between the two panel
/// colors, with a bright rim toward the edge of the plane.
const PORTAL_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

in vec2 v_uv;

uniform float u_time;
uniform vec3 u_color_start;
uniform vec3 u_color_end;

out vec4 frag_color;

float hash(vec2 p) {
    return fract(sin(dot(p, vec2(127.1, 311.7))) * 43758.5453123);
}

float noise(vec2 p) {
    vec2 i = floor(p);
    vec2 f = fract(p);
    vec2 u = f * f * (3.0 - 2.0 * f);
    float a = hash(i);
    float b = hash(i + vec2(1.0, 0.0));
    float c = hash(i + vec2(0.0, 1.0));
    float d = hash(i + vec2(1.0, 1.0));
    return mix(mix(a, b, u.x), mix(c, d, u.x), u.y);
}

void main() {
    // Displace the coordinates so the surface churns instead of scrolling.
    vec2 uv = v_uv + noise(v_uv * 6.0 + u_time * 0.1) * 0.1;
    float strength = noise(uv * 5.0 + vec2(0.0, u_time * 0.25));

    float glow = distance(v_uv, vec2(0.5)) * 5.0 - 1.4;
    strength += glow;
    strength += step(-0.2, strength) * 0.8;
    strength = clamp(strength, 0.0, 1.0);

    frag_color = vec4(mix(u_color_start, u_color_end, strength), 1.0);
}
"#;

const FIREFLIES_VERTEX_SHADER: &str = r#"#version 300 es
precision highp float;

layout(location = 0) in vec3 a_position;
layout(location = 1) in float a_scale;

uniform mat4 u_view;
uniform mat4 u_projection;
uniform float u_time;
uniform float u_pixel_ratio;
uniform float u_size;

void main() {
    vec3 p = a_position;
    p.y += sin(u_time + a_position.x * 100.0) * a_scale * 0.2;

    vec4 view_position = u_view * vec4(p, 1.0);
    gl_Position = u_projection * view_position;

    // Size attenuation: sprites shrink with distance, scaled for the
    // device pixel ratio so they look the same on dense displays.
    gl_PointSize = u_size * a_scale * u_pixel_ratio / -view_position.z;
}
"#;

const FIREFLIES_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

out vec4 frag_color;

void main() {
    float d = distance(gl_PointCoord, vec2(0.5));
    float strength = clamp(0.05 / d - 0.1, 0.0, 1.0);
    frag_color = vec4(vec3(strength), 1.0);
}
"#;

/// A linked program plus its resolved uniform locations.
struct Program {
    program: WebGlProgram,
    uniforms: HashMap<&'static str, WebGlUniformLocation>,
}

impl Program {
    fn new(
        gl: &GL,
        vertex_source: &str,
        fragment_source: &str,
        uniform_names: &[&'static str],
    ) -> Result<Self, JsValue> {
        let vertex_shader = compile_shader(gl, GL::VERTEX_SHADER, vertex_source)?;
        let fragment_shader = compile_shader(gl, GL::FRAGMENT_SHADER, fragment_source)?;

        let program = gl
            .create_program()
            .ok_or_else(|| JsValue::from_str("failed to create program"))?;
        gl.attach_shader(&program, &vertex_shader);
        gl.attach_shader(&program, &fragment_shader);
        gl.link_program(&program);

        if !gl
            .get_program_parameter(&program, GL::LINK_STATUS)
            .as_bool()
            .unwrap_or(false)
        {
            let log = gl
                .get_program_info_log(&program)
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(JsValue::from_str(&format!("failed to link program: {log}")));
        }

        let mut uniforms = HashMap::new();
        for &name in uniform_names {
            if let Some(location) = gl.get_uniform_location(&program, name) {
                uniforms.insert(name, location);
            }
        }

        Ok(Self { program, uniforms })
    }

    fn loc(&self, name: &str) -> Option<&WebGlUniformLocation> {
        self.uniforms.get(name)
    }
}

struct DrawEntry {
    role: MeshRole,
    vao: WebGlVertexArrayObject,
    index_count: i32,
}

pub struct SceneRenderer {
    gl: GL,
    baked: Program,
    pole: Program,
    portal: Program,
    fireflies: Program,
    meshes: Vec<DrawEntry>,
    fireflies_vao: WebGlVertexArrayObject,
    fireflies_count: i32,
    baked_texture: WebGlTexture,
    clear_color: Rgb,
}

impl SceneRenderer {
    pub fn new(gl: GL, field: &FirefliesGeometry, clear_color: Rgb) -> Result<Self, JsValue> {
        let baked = Program::new(
            &gl,
            SURFACE_VERTEX_SHADER,
            BAKED_FRAGMENT_SHADER,
            &["u_view_projection", "u_baked"],
        )?;
        let pole = Program::new(
            &gl,
            SURFACE_VERTEX_SHADER,
            POLE_FRAGMENT_SHADER,
            &["u_view_projection", "u_color"],
        )?;
        let portal = Program::new(
            &gl,
            SURFACE_VERTEX_SHADER,
            PORTAL_FRAGMENT_SHADER,
            &["u_view_projection", "u_time", "u_color_start", "u_color_end"],
        )?;
        let fireflies = Program::new(
            &gl,
            FIREFLIES_VERTEX_SHADER,
            FIREFLIES_FRAGMENT_SHADER,
            &["u_view", "u_projection", "u_time", "u_pixel_ratio", "u_size"],
        )?;

        gl.enable(GL::DEPTH_TEST);

        let fireflies_vao = upload_fireflies(&gl, field)?;
        let baked_texture = placeholder_texture(&gl)?;

        Ok(Self {
            gl,
            baked,
            pole,
            portal,
            fireflies,
            meshes: Vec::new(),
            fireflies_vao,
            fireflies_count: field.scales.len() as i32,
            baked_texture,
            clear_color,
        })
    }

    /// Upload one assembled scene node. Called once per sub-mesh at load
    /// time; nothing here runs per frame.
    pub fn attach_mesh(&mut self, node: &SceneNode) -> Result<(), JsValue> {
        let gl = &self.gl;
        let vao = gl
            .create_vertex_array()
            .ok_or_else(|| JsValue::from_str("failed to create vertex array"))?;
        gl.bind_vertex_array(Some(&vao));

        upload_f32_attribute(gl, 0, 3, &node.mesh.positions)?;
        if !node.mesh.uvs.is_empty() {
            upload_f32_attribute(gl, 1, 2, &node.mesh.uvs)?;
        }

        let index_buffer = gl
            .create_buffer()
            .ok_or_else(|| JsValue::from_str("failed to create index buffer"))?;
        gl.bind_buffer(GL::ELEMENT_ARRAY_BUFFER, Some(&index_buffer));
        unsafe {
            // The view must not outlive this call; no allocation happens
            // between creating it and the buffer_data upload.
            let view = js_sys::Uint16Array::view(&node.mesh.indices);
            gl.buffer_data_with_array_buffer_view(GL::ELEMENT_ARRAY_BUFFER, &view, GL::STATIC_DRAW);
        }

        gl.bind_vertex_array(None);

        self.meshes.push(DrawEntry {
            role: node.role,
            vao,
            index_count: node.mesh.indices.len() as i32,
        });
        Ok(())
    }

    /// Fetch the baked lighting image and upload it when it arrives. A 1x1
    /// placeholder stands in until then; a failed fetch leaves it in place.
    pub fn load_baked_texture(&self, url: &str) -> Result<(), JsValue> {
        let image = HtmlImageElement::new()?;
        let gl = self.gl.clone();
        let texture = self.baked_texture.clone();
        let img = image.clone();
        let onload = Closure::once(move || {
            gl.bind_texture(GL::TEXTURE_2D, Some(&texture));
            if let Err(err) = gl.tex_image_2d_with_u32_and_u32_and_html_image_element(
                GL::TEXTURE_2D,
                0,
                GL::RGBA as i32,
                GL::RGBA,
                GL::UNSIGNED_BYTE,
                &img,
            ) {
                web_sys::console::error_1(&err);
                return;
            }
            gl.generate_mipmap(GL::TEXTURE_2D);
        });
        image.set_onload(Some(onload.as_ref().unchecked_ref()));
        onload.forget();
        image.set_src(url);
        Ok(())
    }

    pub fn set_clear_color(&mut self, color: Rgb) {
        self.clear_color = color;
    }

    pub fn set_viewport(&self, width: i32, height: i32) {
        self.gl.viewport(0, 0, width, height);
    }
}

impl FrameRenderer for SceneRenderer {
    fn render(&mut self, camera: &PerspectiveCamera, uniforms: &UniformSet) {
        let gl = &self.gl;
        let [r, g, b] = self.clear_color;
        gl.clear_color(r, g, b, 1.0);
        gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);

        let view = camera.view_matrix();
        let projection = camera.projection_matrix();
        let view_projection = (projection * view).to_cols_array();

        for entry in &self.meshes {
            let program = match entry.role {
                MeshRole::Baked => &self.baked,
                MeshRole::PoleLight => &self.pole,
                MeshRole::PortalLight => &self.portal,
            };
            gl.use_program(Some(&program.program));
            if let Some(loc) = program.loc("u_view_projection") {
                gl.uniform_matrix4fv_with_f32_array(Some(loc), false, &view_projection);
            }
            match entry.role {
                MeshRole::Baked => {
                    gl.active_texture(GL::TEXTURE0);
                    gl.bind_texture(GL::TEXTURE_2D, Some(&self.baked_texture));
                    if let Some(loc) = program.loc("u_baked") {
                        gl.uniform1i(Some(loc), 0);
                    }
                }
                MeshRole::PoleLight => {
                    if let Some(loc) = program.loc("u_color") {
                        let [r, g, b] = POLE_LIGHT_COLOR;
                        gl.uniform3f(Some(loc), r, g, b);
                    }
                }
                MeshRole::PortalLight => {
                    if let Some(loc) = program.loc("u_time") {
                        gl.uniform1f(Some(loc), uniforms.portal.time);
                    }
                    if let Some(loc) = program.loc("u_color_start") {
                        let [r, g, b] = uniforms.portal.color_start;
                        gl.uniform3f(Some(loc), r, g, b);
                    }
                    if let Some(loc) = program.loc("u_color_end") {
                        let [r, g, b] = uniforms.portal.color_end;
                        gl.uniform3f(Some(loc), r, g, b);
                    }
                }
            }
            gl.bind_vertex_array(Some(&entry.vao));
            gl.draw_elements_with_i32(GL::TRIANGLES, entry.index_count, GL::UNSIGNED_SHORT, 0);
        }

        // Fireflies last: additive blend over the scene, no depth write so
        // the sprites never punch holes in each other.
        gl.use_program(Some(&self.fireflies.program));
        if let Some(loc) = self.fireflies.loc("u_view") {
            gl.uniform_matrix4fv_with_f32_array(Some(loc), false, &view.to_cols_array());
        }
        if let Some(loc) = self.fireflies.loc("u_projection") {
            gl.uniform_matrix4fv_with_f32_array(Some(loc), false, &projection.to_cols_array());
        }
        if let Some(loc) = self.fireflies.loc("u_time") {
            gl.uniform1f(Some(loc), uniforms.fireflies.time);
        }
        if let Some(loc) = self.fireflies.loc("u_pixel_ratio") {
            gl.uniform1f(Some(loc), uniforms.fireflies.pixel_ratio);
        }
        if let Some(loc) = self.fireflies.loc("u_size") {
            gl.uniform1f(Some(loc), uniforms.fireflies.size);
        }
        gl.depth_mask(false);
        gl.enable(GL::BLEND);
        gl.blend_func(GL::ONE, GL::ONE);
        gl.bind_vertex_array(Some(&self.fireflies_vao));
        gl.draw_arrays(GL::POINTS, 0, self.fireflies_count);
        gl.bind_vertex_array(None);
        gl.disable(GL::BLEND);
        gl.depth_mask(true);
    }
}

fn upload_f32_attribute(gl: &GL, location: u32, size: i32, data: &[f32]) -> Result<(), JsValue> {
    let buffer = gl
        .create_buffer()
        .ok_or_else(|| JsValue::from_str("failed to create vertex buffer"))?;
    gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
    unsafe {
        let view = js_sys::Float32Array::view(data);
        gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &view, GL::STATIC_DRAW);
    }
    gl.vertex_attrib_pointer_with_i32(location, size, GL::FLOAT, false, 0, 0);
    gl.enable_vertex_attrib_array(location);
    Ok(())
}

fn upload_fireflies(gl: &GL, field: &FirefliesGeometry) -> Result<WebGlVertexArrayObject, JsValue> {
    let vao = gl
        .create_vertex_array()
        .ok_or_else(|| JsValue::from_str("failed to create vertex array"))?;
    gl.bind_vertex_array(Some(&vao));
    upload_f32_attribute(gl, 0, 3, &field.positions)?;
    upload_f32_attribute(gl, 1, 1, &field.scales)?;
    gl.bind_vertex_array(None);
    Ok(vao)
}

/// Single mid-grey pixel shown on the baked mesh until its texture arrives.
fn placeholder_texture(gl: &GL) -> Result<WebGlTexture, JsValue> {
    let texture = gl
        .create_texture()
        .ok_or_else(|| JsValue::from_str("failed to create texture"))?;
    gl.bind_texture(GL::TEXTURE_2D, Some(&texture));
    gl.tex_image_2d_with_i32_and_i32_and_i32_and_i32_and_i32_and_u32_and_u32_and_opt_u8_array(
        GL::TEXTURE_2D,
        0,
        GL::RGBA as i32,
        1,
        1,
        0,
        GL::RGBA,
        GL::UNSIGNED_BYTE,
        Some(&[128, 128, 128, 255]),
    )?;
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_S, GL::CLAMP_TO_EDGE as i32);
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_T, GL::CLAMP_TO_EDGE as i32);
    gl.tex_parameteri(
        GL::TEXTURE_2D,
        GL::TEXTURE_MIN_FILTER,
        GL::LINEAR_MIPMAP_LINEAR as i32,
    );
    gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MAG_FILTER, GL::LINEAR as i32);
    gl.generate_mipmap(GL::TEXTURE_2D);
    Ok(texture)
}

fn compile_shader(gl: &GL, shader_type: u32, source: &str) -> Result<WebGlShader, JsValue> {
    let shader = gl
        .create_shader(shader_type)
        .ok_or_else(|| JsValue::from_str("failed to create shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if !gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        let log = gl
            .get_shader_info_log(&shader)
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(JsValue::from_str(&format!(
            "failed to compile shader: {log}"
        )));
    }

    Ok(shader)
}
