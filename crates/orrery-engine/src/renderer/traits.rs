//! Raster backend boundary.
//!
//! The engine only decides what to draw. A backend implements [`Canvas`]
//! over its own 2D context and [`draw_frame`] replays a built frame onto it.

use super::instance::{CircleInstance, FrameBuffer};
use crate::systems::lighting::AmbientGradient;

/// Compositing mode for subsequent fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Normal alpha blending.
    SourceOver,
    /// Used for the ambient backdrop.
    Screen,
    /// Additive; stars and trails accumulate light.
    Lighter,
}

impl BlendMode {
    /// Canvas2D `globalCompositeOperation` name.
    pub fn composite_operation(self) -> &'static str {
        match self {
            BlendMode::SourceOver => "source-over",
            BlendMode::Screen => "screen",
            BlendMode::Lighter => "lighter",
        }
    }
}

/// Minimal immediate-mode 2D surface.
pub trait Canvas {
    /// Clear the rectangle `(0, 0, width, height)` to transparent.
    fn clear(&mut self, width: f32, height: f32);

    fn set_blend(&mut self, mode: BlendMode);

    /// Fill `(0, 0, width, height)` with the radial gradient.
    fn fill_radial_gradient(&mut self, gradient: &AmbientGradient, width: f32, height: f32);

    fn fill_circle(&mut self, circle: &CircleInstance);
}

/// Replay `frame` onto `canvas`.
///
/// The canvas is left in source-over mode.
pub fn draw_frame<C: Canvas + ?Sized>(frame: &FrameBuffer, canvas: &mut C) {
    canvas.clear(frame.width, frame.height);

    if let Some(ambient) = &frame.ambient {
        canvas.set_blend(BlendMode::Screen);
        canvas.fill_radial_gradient(ambient, frame.width, frame.height);
    }

    canvas.set_blend(BlendMode::Lighter);
    for circle in &frame.circles {
        if circle.radius > 0.0 && circle.alpha > 0.0 {
            canvas.fill_circle(circle);
        }
    }
    canvas.set_blend(BlendMode::SourceOver);
}
