use glam::Vec2;
use std::f32::consts::TAU;

use crate::api::types::{StarId, TrailId};

/// Fast opacity oscillation carried by every star.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flicker {
    pub base_alpha: f32,
    /// Frequency in Hz.
    pub frequency: f32,
    /// Phase offset in radians.
    pub phase: f32,
    pub amplitude: f32,
}

impl Flicker {
    /// `base_alpha × (1 + amplitude × sin(2π·t·frequency + phase))`.
    pub fn alpha_at(&self, t: f32) -> f32 {
        let wave = (TAU * t * self.frequency + self.phase).sin();
        self.base_alpha * (1.0 + self.amplitude * wave)
    }
}

impl Default for Flicker {
    fn default() -> Self {
        Self {
            base_alpha: 1.0,
            frequency: 0.0,
            phase: 0.0,
            amplitude: 0.0,
        }
    }
}

/// Slow secondary oscillation on a subset of small stars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Twinkle {
    /// Frequency in Hz.
    pub frequency: f32,
    pub amplitude: f32,
    /// Phase offset in radians.
    pub phase: f32,
}

impl Twinkle {
    /// Raw wave value in [-1, 1] at time `t`.
    pub fn wave_at(&self, t: f32) -> f32 {
        (TAU * t * self.frequency + self.phase).sin()
    }
}

/// A point-light on a fixed circular orbit.
///
/// Orbit radius, angular velocity, zone, size and the oscillation
/// parameters are fixed at creation; only `angle` and the trail lease
/// state change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    pub id: StarId,
    orbit_radius: f32,
    /// Orbital phase in radians, kept in [0, 2π).
    pub angle: f32,
    angular_velocity: f32,
    zone: f32,
    period: f32,
    size: f32,
    flicker: Flicker,
    twinkle: Option<Twinkle>,
    trail_eligible: bool,
    companion: bool,
    /// Trail buffer currently leased to this star.
    pub(crate) trail: Option<TrailId>,
    /// Visibility at the end of the previous update.
    pub(crate) was_in_bounds: bool,
}

impl Star {
    /// Create a star on an orbit of `orbit_radius` px, starting at `angle`,
    /// moving counter-clockwise at `angular_velocity` rad/s.
    pub fn new(id: StarId, orbit_radius: f32, angle: f32, angular_velocity: f32) -> Self {
        let period = if angular_velocity > 0.0 {
            TAU / angular_velocity
        } else {
            f32::INFINITY
        };
        Self {
            id,
            orbit_radius: orbit_radius.max(0.0),
            angle: angle.rem_euclid(TAU),
            angular_velocity,
            zone: 1.0,
            period,
            size: 1.0,
            flicker: Flicker::default(),
            twinkle: None,
            trail_eligible: false,
            companion: false,
            trail: None,
            was_in_bounds: false,
        }
    }

    // -- Builder pattern --

    pub fn with_zone(mut self, zone: f32) -> Self {
        self.zone = zone;
        self
    }

    /// Base orbital period before speed multipliers were applied.
    pub fn with_period(mut self, period: f32) -> Self {
        self.period = period;
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_flicker(mut self, flicker: Flicker) -> Self {
        self.flicker = flicker;
        self
    }

    pub fn with_twinkle(mut self, twinkle: Twinkle) -> Self {
        self.twinkle = Some(twinkle);
        self
    }

    pub fn with_trail_eligible(mut self, eligible: bool) -> Self {
        self.trail_eligible = eligible;
        self
    }

    /// Build a companion sharing this star's zone, speed and flicker, with
    /// its own radius, phase and size. Companions never twinkle and never
    /// lease trails.
    pub fn companion(&self, id: StarId, radius_scale: f32, angle: f32, size_scale: f32) -> Star {
        Star {
            id,
            orbit_radius: self.orbit_radius * radius_scale,
            angle: angle.rem_euclid(TAU),
            angular_velocity: self.angular_velocity,
            zone: self.zone,
            period: self.period,
            size: self.size * size_scale,
            flicker: self.flicker,
            twinkle: None,
            trail_eligible: false,
            companion: true,
            trail: None,
            was_in_bounds: false,
        }
    }

    // -- Accessors --

    pub fn orbit_radius(&self) -> f32 {
        self.orbit_radius
    }

    pub fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    pub fn zone(&self) -> f32 {
        self.zone
    }

    pub fn period(&self) -> f32 {
        self.period
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn flicker(&self) -> &Flicker {
        &self.flicker
    }

    pub fn twinkle(&self) -> Option<&Twinkle> {
        self.twinkle.as_ref()
    }

    pub fn has_twinkle(&self) -> bool {
        self.twinkle.is_some()
    }

    pub fn is_trail_eligible(&self) -> bool {
        self.trail_eligible
    }

    pub fn is_companion(&self) -> bool {
        self.companion
    }

    pub fn trail(&self) -> Option<TrailId> {
        self.trail
    }

    pub fn has_active_trail(&self) -> bool {
        self.trail.is_some()
    }

    pub fn was_in_bounds(&self) -> bool {
        self.was_in_bounds
    }

    /// Cartesian position about the orbital `center`.
    pub fn position(&self, center: Vec2) -> Vec2 {
        let (sin, cos) = self.angle.sin_cos();
        center + Vec2::new(cos, sin) * self.orbit_radius
    }

    /// Advance the orbital phase by `dt` seconds. The phase is wrapped
    /// every step so small increments keep full `f32` precision.
    pub fn advance(&mut self, dt: f32) {
        self.angle = (self.angle + self.angular_velocity * dt).rem_euclid(TAU);
    }

    /// Flicker-only alpha at time `t` (seconds).
    pub fn flicker_alpha(&self, t: f32) -> f32 {
        self.flicker.alpha_at(t)
    }

    /// Drop any lease and forget the previous visibility state.
    pub(crate) fn reset_trail_state(&mut self) {
        self.trail = None;
        self.was_in_bounds = false;
    }
}
