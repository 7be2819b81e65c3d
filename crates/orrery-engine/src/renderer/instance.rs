use bytemuck::{Pod, Zeroable};

use crate::api::types::Rgb;
use crate::systems::lighting::AmbientGradient;

/// One filled circle. Wire format for hosts that read the frame through a
/// raw pointer: 8 floats = 32 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct CircleInstance {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    /// Color channels in [0, 1].
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub alpha: f32,
    _pad: f32,
}

impl CircleInstance {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    pub fn new(x: f32, y: f32, radius: f32, color: Rgb, alpha: f32) -> Self {
        let [r, g, b] = color.to_unit();
        Self {
            x,
            y,
            radius,
            r,
            g,
            b,
            alpha,
            _pad: 0.0,
        }
    }
}

/// Everything the raster backend needs to draw one frame.
///
/// The viewport is cleared, the ambient gradient (if any) is drawn with
/// screen blending, then all circles are drawn in order with additive
/// blending.
pub struct FrameBuffer {
    pub width: f32,
    pub height: f32,
    pub ambient: Option<AmbientGradient>,
    pub circles: Vec<CircleInstance>,
    /// Incremented every time a frame is built.
    pub frame_counter: u64,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::with_capacity(8192)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            ambient: None,
            circles: Vec::with_capacity(capacity),
            frame_counter: 0,
        }
    }

    /// Start a new frame of the given size.
    pub fn begin(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.ambient = None;
        self.circles.clear();
        self.frame_counter += 1;
    }

    pub fn push(&mut self, circle: CircleInstance) {
        self.circles.push(circle);
    }

    pub fn circle_count(&self) -> u32 {
        self.circles.len() as u32
    }

    /// Raw pointer to circle data for zero-copy reads from the host.
    pub fn circles_ptr(&self) -> *const f32 {
        self.circles.as_ptr() as *const f32
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
