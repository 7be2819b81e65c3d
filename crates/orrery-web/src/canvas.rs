//! Canvas2D backend for the engine's raster boundary.

use std::f64::consts::TAU;

use orrery_engine::{AmbientGradient, BlendMode, Canvas, CircleInstance, Rgb};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

/// Borrowed 2D context. Draw-call failures are logged and skipped; a
/// failed fill never aborts the frame.
pub struct Canvas2d<'a> {
    ctx: &'a CanvasRenderingContext2d,
}

impl<'a> Canvas2d<'a> {
    pub fn new(ctx: &'a CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

fn rgba(r: u8, g: u8, b: u8, alpha: f32) -> String {
    format!("rgba({r}, {g}, {b}, {alpha})")
}

fn unit_to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn warn_on_err(what: &str, result: Result<(), JsValue>) {
    if let Err(err) = result {
        log::warn!("canvas {what} failed: {err:?}");
    }
}

impl Canvas for Canvas2d<'_> {
    fn clear(&mut self, width: f32, height: f32) {
        self.ctx.clear_rect(0.0, 0.0, f64::from(width), f64::from(height));
    }

    fn set_blend(&mut self, mode: BlendMode) {
        warn_on_err(
            "composite operation",
            self.ctx.set_global_composite_operation(mode.composite_operation()),
        );
    }

    fn fill_radial_gradient(&mut self, gradient: &AmbientGradient, width: f32, height: f32) {
        let center = gradient.center;
        let canvas_gradient = match self.ctx.create_radial_gradient(
            f64::from(center.x),
            f64::from(center.y),
            0.0,
            f64::from(center.x),
            f64::from(center.y),
            f64::from(gradient.radius),
        ) {
            Ok(g) => g,
            Err(err) => {
                log::warn!("canvas radial gradient failed: {err:?}");
                return;
            }
        };

        let Rgb { r, g, b } = gradient.color;
        for (offset, alpha) in gradient.stops() {
            warn_on_err("color stop", canvas_gradient.add_color_stop(offset, &rgba(r, g, b, alpha)));
        }

        self.ctx.set_fill_style_canvas_gradient(&canvas_gradient);
        self.ctx.fill_rect(0.0, 0.0, f64::from(width), f64::from(height));
    }

    fn fill_circle(&mut self, circle: &CircleInstance) {
        self.ctx.set_fill_style_str(&rgba(
            unit_to_byte(circle.r),
            unit_to_byte(circle.g),
            unit_to_byte(circle.b),
            circle.alpha,
        ));
        self.ctx.begin_path();
        warn_on_err(
            "arc",
            self.ctx.arc(
                f64::from(circle.x),
                f64::from(circle.y),
                f64::from(circle.radius),
                0.0,
                TAU,
            ),
        );
        self.ctx.fill();
    }
}
