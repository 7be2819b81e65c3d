//! Ambient backdrop light for the starfield.
//!
//! A single radial gradient centred on the orbital center, fading from the
//! configured intensity to transparent. Compact viewports use a shorter
//! falloff table; wide viewports use a denser one for smoother banding.

use glam::Vec2;

use crate::api::config::AmbientConfig;
use crate::api::types::{DeviceClass, Rgb, Viewport};

/// Gradient radius as a multiple of viewport width, before `max_radius`.
pub const GRADIENT_RADIUS_FACTOR: f32 = 1.2;

/// One color stop: `offset` in [0, 1] along the radius, `falloff` as a
/// fraction of the center intensity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub falloff: f32,
}

const fn stop(offset: f32, falloff: f32) -> GradientStop {
    GradientStop { offset, falloff }
}

pub const COMPACT_FALLOFF: [GradientStop; 8] = [
    stop(0.0, 1.0),
    stop(0.15, 0.95),
    stop(0.3, 0.85),
    stop(0.45, 0.7),
    stop(0.6, 0.5),
    stop(0.75, 0.25),
    stop(0.9, 0.1),
    stop(1.0, 0.0),
];

pub const WIDE_FALLOFF: [GradientStop; 12] = [
    stop(0.0, 1.0),
    stop(0.1, 0.98),
    stop(0.2, 0.92),
    stop(0.3, 0.82),
    stop(0.4, 0.68),
    stop(0.5, 0.52),
    stop(0.6, 0.38),
    stop(0.7, 0.25),
    stop(0.8, 0.15),
    stop(0.9, 0.08),
    stop(0.95, 0.03),
    stop(1.0, 0.0),
];

/// Radial gradient drawn with screen blending over the whole viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientGradient {
    pub center: Vec2,
    /// Outer radius; the inner radius is always zero.
    pub radius: f32,
    pub color: Rgb,
    /// Alpha at offset 0.
    pub intensity: f32,
    pub falloff: &'static [GradientStop],
}

impl AmbientGradient {
    /// Build the gradient for the current viewport, or `None` when disabled.
    pub fn new(
        config: &AmbientConfig,
        center: Vec2,
        viewport: Viewport,
        device_class: DeviceClass,
    ) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let falloff: &'static [GradientStop] = match device_class {
            DeviceClass::Compact => &COMPACT_FALLOFF,
            DeviceClass::Wide => &WIDE_FALLOFF,
        };
        Some(Self {
            center,
            radius: viewport.width * GRADIENT_RADIUS_FACTOR * config.max_radius,
            color: config.color,
            intensity: config.intensity,
            falloff,
        })
    }

    /// `(offset, alpha)` pairs, center outward.
    pub fn stops(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.falloff
            .iter()
            .map(|s| (s.offset, s.falloff * self.intensity))
    }
}
