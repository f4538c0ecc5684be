#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

// Platform-neutral scene core, compiled on every target so the loop logic
// is testable with plain `cargo test` on the host.

pub mod camera;
pub mod clock;
pub mod config;
pub mod controls;
pub mod fireflies;
pub mod frame;
pub mod scene;
pub mod uniforms;

// Only compile browser glue when targeting wasm32.

#[cfg(target_arch = "wasm32")]
mod wasm {
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;

    mod app;
    mod render;

    /// Find the scene canvas and hand a running [`app::App`] back to the
    /// page, which wires the debug panel and the model loader to it.
    #[wasm_bindgen(js_name = "startScene")]
    pub fn start_scene() -> Result<app::App, JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas = document
            .get_element_by_id("c")
            .ok_or("canvas not found")?
            .dyn_into::<web_sys::HtmlCanvasElement>()?;

        app::App::start(canvas)
    }
}

// When compiling for non-wasm targets (e.g., `cargo test` on host),
// provide an empty stub so the crate still builds.
#[cfg(not(target_arch = "wasm32"))]
pub fn main() {}
