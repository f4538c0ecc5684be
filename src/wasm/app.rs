//! Browser glue: owns the scene state, schedules the render loop off
//! `requestAnimationFrame`, and exposes the debug-panel surface to JS.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{window, HtmlCanvasElement, MouseEvent, WebGl2RenderingContext as GL, WheelEvent};

use crate::camera::PerspectiveCamera;
use crate::clock::{Clock, TimeSource};
use crate::config::{parse_hex_color, SceneConfig};
use crate::controls::OrbitControls;
use crate::fireflies::{FirefliesGeometry, FIREFLY_COUNT};
use crate::frame::RenderLoop;
use crate::scene::{MeshData, SceneGraph};
use crate::uniforms::{clamped_pixel_ratio, UniformSet};

use super::render::SceneRenderer;

struct PerformanceTime(web_sys::Performance);

impl TimeSource for PerformanceTime {
    fn now_ms(&self) -> f64 {
        self.0.now()
    }
}

struct Pointer {
    dragging: bool,
    last_x: f32,
    last_y: f32,
}

struct Inner {
    frame_loop: RenderLoop<PerformanceTime, OrbitControls>,
    renderer: SceneRenderer,
    scene: SceneGraph,
    config: SceneConfig,
    canvas: HtmlCanvasElement,
    pointer: Pointer,
}

impl Inner {
    /// Host resize notification: resize the drawing surface, recompute the
    /// camera aspect and the fireflies pixel-ratio uniform.
    fn resize(&mut self, width: f64, height: f64, device_pixel_ratio: f64) {
        let ratio = clamped_pixel_ratio(device_pixel_ratio) as f64;
        self.canvas.set_width((width * ratio) as u32);
        self.canvas.set_height((height * ratio) as u32);
        let style = self.canvas.style();
        style.set_property("width", &format!("{width}px")).ok();
        style.set_property("height", &format!("{height}px")).ok();
        self.renderer
            .set_viewport((width * ratio) as i32, (height * ratio) as i32);
        self.frame_loop
            .apply_resize(width as f32, height as f32, device_pixel_ratio);
    }
}

/// Handle returned to the page. The scene runs on its own once started;
/// the page only calls back in for panel changes and model data.
#[wasm_bindgen]
pub struct App {
    inner: Rc<RefCell<Inner>>,
}

impl App {
    pub(super) fn start(canvas: HtmlCanvasElement) -> Result<App, JsValue> {
        let gl: GL = canvas
            .get_context("webgl2")?
            .ok_or("WebGL2 not supported")?
            .dyn_into()?;

        let win = window().ok_or("no window")?;
        let width = win.inner_width()?.as_f64().ok_or("bad width")?;
        let height = win.inner_height()?.as_f64().ok_or("bad height")?;
        let device_pixel_ratio = win.device_pixel_ratio();

        let config = SceneConfig::default();
        let mut rand = || js_sys::Math::random() as f32;
        let field = FirefliesGeometry::generate(FIREFLY_COUNT, &mut rand);

        let renderer = SceneRenderer::new(gl, &field, config.clear_color)?;
        renderer.load_baked_texture("resources/baked.jpg")?;

        let camera = PerspectiveCamera::new(width as f32, height as f32);
        let controls = OrbitControls::new(&camera);
        let uniforms = UniformSet::new(
            device_pixel_ratio,
            config.fireflies_size,
            config.portal_color_start,
            config.portal_color_end,
        );
        let clock = Clock::new(PerformanceTime(win.performance().ok_or("no performance")?));

        let inner = Rc::new(RefCell::new(Inner {
            frame_loop: RenderLoop::new(clock, uniforms, camera, controls),
            renderer,
            scene: SceneGraph::default(),
            config,
            canvas: canvas.clone(),
            pointer: Pointer {
                dragging: false,
                last_x: 0.0,
                last_y: 0.0,
            },
        }));

        inner
            .borrow_mut()
            .resize(width, height, device_pixel_ratio);

        register_resize_listener(&inner)?;
        register_pointer_listeners(&inner, &canvas)?;
        start_animation_loop(&inner)?;

        Ok(App { inner })
    }
}

#[wasm_bindgen]
impl App {
    /// Attach one named sub-mesh decoded by the page's model loader.
    /// Unknown names are dropped with a console diagnostic.
    #[wasm_bindgen(js_name = "loadMesh")]
    pub fn load_mesh(
        &self,
        name: String,
        positions: Vec<f32>,
        uvs: Vec<f32>,
        indices: Vec<u16>,
    ) -> Result<(), JsValue> {
        let mut inner = self.inner.borrow_mut();
        let mesh = MeshData {
            name,
            positions,
            uvs,
            indices,
        };
        match inner.scene.attach(mesh) {
            Some(_) => {
                let node = inner
                    .scene
                    .nodes()
                    .last()
                    .cloned()
                    .ok_or("scene is empty after attach")?;
                inner.renderer.attach_mesh(&node)
            }
            None => {
                web_sys::console::warn_1(&"ignoring sub-mesh with unknown name".into());
                Ok(())
            }
        }
    }

    /// Call after the loader has delivered everything; logs one diagnostic
    /// per expected sub-mesh that never arrived.
    #[wasm_bindgen(js_name = "finishAssembly")]
    pub fn finish_assembly(&self) {
        for name in self.inner.borrow().scene.missing() {
            web_sys::console::warn_1(&format!("model is missing sub-mesh '{name}'").into());
        }
    }

    #[wasm_bindgen(js_name = "setClearColor")]
    pub fn set_clear_color(&self, hex: &str) {
        let mut inner = self.inner.borrow_mut();
        if let Some(color) = parse_hex_color(hex) {
            inner.config.clear_color = color;
            inner.renderer.set_clear_color(color);
        }
    }

    #[wasm_bindgen(js_name = "setPortalColorStart")]
    pub fn set_portal_color_start(&self, hex: &str) {
        let mut inner = self.inner.borrow_mut();
        if let Some(color) = parse_hex_color(hex) {
            inner.config.portal_color_start = color;
            inner.frame_loop.set_portal_color_start(color);
        }
    }

    #[wasm_bindgen(js_name = "setPortalColorEnd")]
    pub fn set_portal_color_end(&self, hex: &str) {
        let mut inner = self.inner.borrow_mut();
        if let Some(color) = parse_hex_color(hex) {
            inner.config.portal_color_end = color;
            inner.frame_loop.set_portal_color_end(color);
        }
    }

    #[wasm_bindgen(js_name = "setFirefliesSize")]
    pub fn set_fireflies_size(&self, size: f32) {
        let mut inner = self.inner.borrow_mut();
        inner.config.fireflies_size = size;
        inner.frame_loop.set_fireflies_size(size);
    }

    /// Stop the render loop; it is never re-armed afterwards.
    pub fn stop(&self) {
        self.inner.borrow_mut().frame_loop.stop();
    }
}

fn register_resize_listener(inner: &Rc<RefCell<Inner>>) -> Result<(), JsValue> {
    let resize_closure = {
        let inner = inner.clone();
        Closure::wrap(Box::new(move || {
            let Some(win) = window() else { return };
            let width = win.inner_width().ok().and_then(|w| w.as_f64());
            let height = win.inner_height().ok().and_then(|h| h.as_f64());
            if let (Some(width), Some(height)) = (width, height) {
                inner
                    .borrow_mut()
                    .resize(width, height, win.device_pixel_ratio());
            }
        }) as Box<dyn FnMut()>)
    };
    window()
        .ok_or("no window")?
        .add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref())?;
    resize_closure.forget();
    Ok(())
}

fn register_pointer_listeners(
    inner: &Rc<RefCell<Inner>>,
    canvas: &HtmlCanvasElement,
) -> Result<(), JsValue> {
    let mousedown = {
        let inner = inner.clone();
        Closure::wrap(Box::new(move |event: MouseEvent| {
            let mut inner = inner.borrow_mut();
            inner.pointer.dragging = true;
            inner.pointer.last_x = event.client_x() as f32;
            inner.pointer.last_y = event.client_y() as f32;
        }) as Box<dyn FnMut(MouseEvent)>)
    };
    canvas.add_event_listener_with_callback("mousedown", mousedown.as_ref().unchecked_ref())?;
    mousedown.forget();

    let mousemove = {
        let inner = inner.clone();
        Closure::wrap(Box::new(move |event: MouseEvent| {
            let mut inner = inner.borrow_mut();
            if !inner.pointer.dragging {
                return;
            }
            let x = event.client_x() as f32;
            let y = event.client_y() as f32;
            let dx = x - inner.pointer.last_x;
            let dy = y - inner.pointer.last_y;
            inner.pointer.last_x = x;
            inner.pointer.last_y = y;
            inner.frame_loop.controls_mut().rotate(dx, dy);
        }) as Box<dyn FnMut(MouseEvent)>)
    };
    canvas.add_event_listener_with_callback("mousemove", mousemove.as_ref().unchecked_ref())?;
    mousemove.forget();

    let mouseup = {
        let inner = inner.clone();
        Closure::wrap(Box::new(move |_: MouseEvent| {
            inner.borrow_mut().pointer.dragging = false;
        }) as Box<dyn FnMut(MouseEvent)>)
    };
    canvas.add_event_listener_with_callback("mouseup", mouseup.as_ref().unchecked_ref())?;
    canvas.add_event_listener_with_callback("mouseleave", mouseup.as_ref().unchecked_ref())?;
    mouseup.forget();

    let wheel = {
        let inner = inner.clone();
        Closure::wrap(Box::new(move |event: WheelEvent| {
            event.prevent_default();
            inner
                .borrow_mut()
                .frame_loop
                .controls_mut()
                .zoom(event.delta_y() as f32);
        }) as Box<dyn FnMut(WheelEvent)>)
    };
    canvas.add_event_listener_with_callback("wheel", wheel.as_ref().unchecked_ref())?;
    wheel.forget();

    Ok(())
}

/// Cooperative scheduling off `requestAnimationFrame`: the closure re-arms
/// itself only after the current iteration's draw has returned, so exactly
/// one iteration is ever in flight.
///
/// `f` holds the animation-frame closure so that we can keep calling
/// `request_animation_frame` recursively. Storing it inside an `Option`
/// allows us to create the `Closure` first and then obtain a reference to
/// it from within itself.
fn start_animation_loop(inner: &Rc<RefCell<Inner>>) -> Result<(), JsValue> {
    let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();
    let inner = inner.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        {
            let inner = &mut *inner.borrow_mut();
            if inner.frame_loop.is_stopped() {
                // Clean stop path: simply never re-arm. The closure stays
                // alive through the Rc cycle, which is fine for a
                // page-lifetime loop.
                return;
            }
            inner.frame_loop.step(&mut inner.renderer);
        }

        // schedule next
        if let Some(win) = window() {
            win.request_animation_frame(f.borrow().as_ref().unwrap().as_ref().unchecked_ref())
                .ok();
        }
    }) as Box<dyn FnMut()>));

    window()
        .ok_or("no window")?
        .request_animation_frame(g.borrow().as_ref().unwrap().as_ref().unchecked_ref())?;

    Ok(())
}
