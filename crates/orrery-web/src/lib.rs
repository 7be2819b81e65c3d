//! WASM exports for the orrery starfield.
//!
//! The JS host owns `requestAnimationFrame` and the visibility and
//! reduced-motion signals. After `starfield_init`, `starfield_set_hidden`
//! or `starfield_tick` it should call `requestAnimationFrame` whenever the
//! call reported a pending frame.

pub mod canvas;
pub mod runner;

use std::cell::RefCell;

use orrery_engine::{draw_frame, OpacityUpdate, OrreryError, StarfieldConfig, Viewport};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

pub use canvas::Canvas2d;
pub use runner::{HostScheduler, StarfieldRunner};

thread_local! {
    static RUNNER: RefCell<Option<StarfieldRunner>> = const { RefCell::new(None) };
}

/// Run `f` against the live runner. Calls made before a successful
/// `starfield_init` are logged and return `None`.
fn with_runner<R>(f: impl FnOnce(&mut StarfieldRunner) -> R) -> Option<R> {
    RUNNER.with(|cell| {
        let mut borrow = cell.borrow_mut();
        match borrow.as_mut() {
            Some(runner) => Some(f(runner)),
            None => {
                log::warn!("starfield not initialized; call starfield_init() first");
                None
            }
        }
    })
}

fn find_canvas(selector: &str) -> Result<HtmlCanvasElement, OrreryError> {
    let missing = || OrreryError::MissingSurface {
        selector: selector.to_string(),
    };
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.query_selector(selector).ok().flatten())
        .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        .ok_or_else(missing)
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|err| {
        log::error!("failed to serialize query result: {err}");
        String::from("{}")
    })
}

/// Look up the canvas and start the animation. Returns `false`, and starts
/// nothing, when the canvas is missing.
#[wasm_bindgen]
pub fn starfield_init(selector: &str) -> bool {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let canvas = match find_canvas(selector) {
        Ok(canvas) => canvas,
        Err(err) => {
            log::error!("{err}");
            return false;
        }
    };

    let viewport = Viewport::new(canvas.width() as f32, canvas.height() as f32);
    let seed = js_sys::Date::now() as u64;
    let mut runner = StarfieldRunner::new(viewport, StarfieldConfig::default(), seed);
    runner.start();

    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(runner);
    });
    log::info!("orrery: initialized on `{selector}`");
    true
}

/// Run one tick. Returns whether the host should request another frame.
#[wasm_bindgen]
pub fn starfield_tick(now_ms: f64) -> bool {
    with_runner(|r| {
        r.tick(now_ms);
        r.take_frame_request()
    })
    .unwrap_or(false)
}

/// Whether a frame was requested since the last tick (after init,
/// un-hiding, or a reconfiguration).
#[wasm_bindgen]
pub fn starfield_take_frame_request() -> bool {
    with_runner(|r| r.take_frame_request()).unwrap_or(false)
}

/// Replay the last built frame onto `ctx`.
#[wasm_bindgen]
pub fn starfield_draw(ctx: &CanvasRenderingContext2d) {
    with_runner(|r| draw_frame(r.frame(), &mut Canvas2d::new(ctx)));
}

#[wasm_bindgen]
pub fn starfield_resize(width: f32, height: f32) {
    with_runner(|r| r.resize(Viewport::new(width, height)));
}

/// Returns whether the host should request a frame.
#[wasm_bindgen]
pub fn starfield_set_hidden(hidden: bool) -> bool {
    with_runner(|r| {
        r.set_hidden(hidden);
        r.take_frame_request()
    })
    .unwrap_or(false)
}

#[wasm_bindgen]
pub fn starfield_set_reduced_motion(reduced_motion: bool) {
    with_runner(|r| r.set_reduced_motion(reduced_motion));
}

#[wasm_bindgen]
pub fn starfield_fps() -> u32 {
    with_runner(|r| r.fps()).unwrap_or(0)
}

// ---- Runtime controls ----

#[wasm_bindgen]
pub fn set_star_count(min: Option<u32>, max: Option<u32>) {
    with_runner(|r| r.set_count_range(min.map(|v| v as usize), max.map(|v| v as usize)));
}

#[wasm_bindgen]
pub fn set_star_size(min: Option<f32>, max: Option<f32>) {
    with_runner(|r| r.set_size_range(min, max));
}

#[wasm_bindgen]
pub fn set_opacity(
    base_min: Option<f32>,
    base_max: Option<f32>,
    flicker_frequency_min: Option<f32>,
    flicker_frequency_max: Option<f32>,
    flicker_amplitude_min: Option<f32>,
    flicker_amplitude_max: Option<f32>,
) {
    let update = OpacityUpdate {
        base_min,
        base_max,
        flicker_frequency_min,
        flicker_frequency_max,
        flicker_amplitude_min,
        flicker_amplitude_max,
    };
    with_runner(|r| r.set_opacity(update));
}

#[wasm_bindgen]
pub fn set_star_color(r: Option<u8>, g: Option<u8>, b: Option<u8>) {
    with_runner(|runner| runner.set_color(r, g, b));
}

#[wasm_bindgen]
pub fn set_ambient_light(enabled: Option<bool>, intensity: Option<f32>, max_radius: Option<f32>) {
    with_runner(|r| r.set_ambient_light(enabled, intensity, max_radius));
}

#[wasm_bindgen]
pub fn set_orbital_center(x: f32, y: f32) {
    with_runner(|r| r.set_orbital_center(x, y));
}

#[wasm_bindgen]
pub fn set_trail_config(pool_percentage: Option<f32>, max_points: Option<u32>, fade_factor: Option<f32>) {
    with_runner(|r| r.set_trail_config(pool_percentage, max_points.map(|v| v as usize), fade_factor));
}

// ---- Queries (JSON) ----

#[wasm_bindgen]
pub fn get_orbital_info() -> String {
    with_runner(|r| to_json(&r.orbital_info())).unwrap_or_default()
}

#[wasm_bindgen]
pub fn get_stars_info() -> String {
    with_runner(|r| to_json(&r.stars_info())).unwrap_or_default()
}

#[wasm_bindgen]
pub fn get_trail_info() -> String {
    with_runner(|r| to_json(&r.trail_info())).unwrap_or_default()
}

// ---- Frame data accessors ----

#[wasm_bindgen]
pub fn get_circles_ptr() -> *const f32 {
    with_runner(|r| r.circles_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_circle_count() -> u32 {
    with_runner(|r| r.circle_count()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_circle_floats() -> u32 {
    orrery_engine::CircleInstance::FLOATS as u32
}
