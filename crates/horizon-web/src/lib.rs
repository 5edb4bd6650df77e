pub mod runner;

use std::cell::RefCell;

use horizon_engine::{InputEvent, RenderTier, SurfaceProbe};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub use runner::EngineRunner;

thread_local! {
    static RUNNER: RefCell<EngineRunner> = RefCell::new(EngineRunner::new());
}

fn with_runner<R>(f: impl FnOnce(&mut EngineRunner) -> R) -> R {
    RUNNER.with(|cell| f(&mut cell.borrow_mut()))
}

/// Asks the browser for a WebGL2 (or WebGL) context on a scratch canvas.
pub struct BrowserProbe;

impl SurfaceProbe for BrowserProbe {
    fn probe(&self) -> RenderTier {
        let canvas = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.create_element("canvas").ok())
            .and_then(|el| el.dyn_into::<web_sys::HtmlCanvasElement>().ok());
        let Some(canvas) = canvas else {
            return RenderTier::Unsupported;
        };
        if matches!(canvas.get_context("webgl2"), Ok(Some(_))) {
            RenderTier::Hdr
        } else if matches!(canvas.get_context("webgl"), Ok(Some(_))) {
            RenderTier::Sdr
        } else {
            RenderTier::Unsupported
        }
    }
}

/// Whether the page can host the effect at all.
#[wasm_bindgen]
pub fn probe_surface() -> bool {
    BrowserProbe.probe().is_supported()
}

/// Start the engine. `config_json` may be empty or a partial config.
/// Returns `false` when the host should show its static fallback.
#[wasm_bindgen]
pub fn engine_init(config_json: &str) -> bool {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    with_runner(|r| r.init(config_json, &BrowserProbe))
}

#[wasm_bindgen]
pub fn engine_tick(now_ms: f64) {
    with_runner(|r| r.tick(now_ms));
}

#[wasm_bindgen]
pub fn engine_pointer_move(x: f32, y: f32) {
    with_runner(|r| r.push_input(InputEvent::PointerMove { x, y }));
}

#[wasm_bindgen]
pub fn engine_pointer_down(x: f32, y: f32) {
    with_runner(|r| r.push_input(InputEvent::PointerDown { x, y }));
}

#[wasm_bindgen]
pub fn engine_pointer_leave() {
    with_runner(|r| r.push_input(InputEvent::PointerLeave));
}

#[wasm_bindgen]
pub fn engine_visibility(visible: bool) {
    with_runner(|r| r.push_input(InputEvent::VisibilityChanged { visible }));
}

#[wasm_bindgen]
pub fn engine_resize(width: f32, height: f32) {
    with_runner(|r| r.push_input(InputEvent::Resize { width, height }));
}

/// Returns a cancel token, or `undefined` when nothing was scheduled.
#[wasm_bindgen]
pub fn engine_boost(amount: f32, duration_ms: f64) -> Option<u32> {
    with_runner(|r| r.boost(amount, duration_ms))
}

#[wasm_bindgen]
pub fn engine_dilate(factor: f32, duration_ms: f64) -> Option<u32> {
    with_runner(|r| r.dilate(factor, duration_ms))
}

#[wasm_bindgen]
pub fn engine_cancel(token: u32) -> bool {
    with_runner(|r| r.cancel(token))
}

#[wasm_bindgen]
pub fn engine_update_spin(target: f32, transition_ms: f64) {
    with_runner(|r| r.update_spin(target, transition_ms));
}

#[wasm_bindgen]
pub fn engine_update_inclination(target: f32, transition_ms: f64) {
    with_runner(|r| r.update_inclination(target, transition_ms));
}

#[wasm_bindgen]
pub fn engine_teardown() -> u32 {
    with_runner(|r| r.teardown())
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn get_buffer_ptr() -> *const f32 {
    with_runner(|r| r.buffer_ptr())
}

/// Copy of the frame header, for hosts without SharedArrayBuffer.
#[wasm_bindgen]
pub fn get_header() -> js_sys::Float32Array {
    with_runner(|r| js_sys::Float32Array::from(r.header()))
}

#[wasm_bindgen]
pub fn get_buffer_total_floats() -> u32 {
    with_runner(|r| r.buffer_total_floats())
}

#[wasm_bindgen]
pub fn get_star_vertex_count() -> u32 {
    with_runner(|r| r.star_vertex_count())
}

#[wasm_bindgen]
pub fn get_disk_vertex_count() -> u32 {
    with_runner(|r| r.disk_vertex_count())
}

#[wasm_bindgen]
pub fn get_ring_vertex_count() -> u32 {
    with_runner(|r| r.ring_vertex_count())
}

#[wasm_bindgen]
pub fn get_phase() -> u32 {
    with_runner(|r| r.phase())
}

#[wasm_bindgen]
pub fn get_star_visibility() -> f32 {
    with_runner(|r| r.star_visibility())
}

#[wasm_bindgen]
pub fn get_ring_visibility() -> f32 {
    with_runner(|r| r.ring_visibility())
}

#[wasm_bindgen]
pub fn get_overlay_opacity() -> f32 {
    with_runner(|r| r.overlay_opacity())
}

#[wasm_bindgen]
pub fn get_audio_gain() -> f32 {
    with_runner(|r| r.audio_gain())
}

#[wasm_bindgen]
pub fn get_proximity() -> f32 {
    with_runner(|r| r.proximity())
}

#[wasm_bindgen]
pub fn is_running() -> bool {
    with_runner(|r| r.is_running())
}
