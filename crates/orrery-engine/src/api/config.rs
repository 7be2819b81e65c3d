use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::api::types::Rgb;
use crate::error::OrreryError;

/// Inclusive-exclusive float range `[min, max)` sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatRange {
    pub min: f32,
    pub max: f32,
}

impl FloatRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    /// Value at fraction `t` of the way from `min` to `max`.
    pub fn lerp(&self, t: f32) -> f32 {
        self.min + self.span() * t
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        self.lerp(rng.random::<f32>())
    }

    /// Returns the range with bounds swapped if they were inverted.
    pub fn ordered(self) -> Self {
        if self.min > self.max {
            Self::new(self.max, self.min)
        } else {
            self
        }
    }
}

/// Bounds on the generated star count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountConfig {
    pub min: usize,
    pub max: usize,
}

impl Default for CountConfig {
    fn default() -> Self {
        Self { min: 4000, max: 7500 }
    }
}

impl CountConfig {
    /// Hard ceiling on either bound.
    pub const MAX_STARS: usize = 50_000;

    /// Bounds ordered and capped at [`Self::MAX_STARS`].
    pub fn sanitized(self) -> Self {
        let min = self.min.min(Self::MAX_STARS);
        let max = self.max.min(Self::MAX_STARS);
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }
}

/// Base opacity and the fast flicker oscillation present on every star.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpacityConfig {
    pub base: FloatRange,
    /// Flicker frequency in Hz.
    pub flicker_frequency: FloatRange,
    pub flicker_amplitude: FloatRange,
}

impl Default for OpacityConfig {
    fn default() -> Self {
        Self {
            base: FloatRange::new(0.55, 0.9),
            flicker_frequency: FloatRange::new(0.03, 0.08),
            flicker_amplitude: FloatRange::new(0.08, 0.15),
        }
    }
}

/// Slow secondary oscillation applied to a few small stars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwinkleConfig {
    /// Probability that a small star twinkles.
    pub chance: f32,
    /// Twinkle frequency in Hz.
    pub frequency: FloatRange,
    pub amplitude: FloatRange,
}

impl Default for TwinkleConfig {
    fn default() -> Self {
        Self {
            chance: 0.05,
            frequency: FloatRange::new(0.08, 0.12),
            amplitude: FloatRange::new(0.18, 0.22),
        }
    }
}

/// Orbital layout and count scaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    /// Orbital center as a fraction of viewport width.
    pub center_x: f32,
    /// Orbital center as a fraction of viewport height.
    pub center_y: f32,
    /// Orbital period in seconds at zone 1; scales linearly with zone.
    pub base_period: f32,
    /// Relative period jitter, e.g. 0.05 for ±5%.
    pub period_jitter: f32,
    /// Viewport area (px²) per star before the device multiplier.
    pub area_per_star: f32,
    /// Widths at or below this are compact.
    pub compact_breakpoint: f32,
    pub compact_multiplier: f32,
    pub wide_multiplier: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            center_x: 1.0,
            center_y: 0.5,
            base_period: 60.0,
            period_jitter: 0.05,
            area_per_star: 600.0,
            compact_breakpoint: 768.0,
            compact_multiplier: 0.5,
            wide_multiplier: 1.5,
        }
    }
}

/// Radial backdrop centred on the orbital center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientConfig {
    pub enabled: bool,
    /// Alpha at the center of the gradient.
    pub intensity: f32,
    pub color: Rgb,
    /// Multiplier on the gradient radius (1.2 × viewport width).
    pub max_radius: f32,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            intensity: 1.2,
            color: Rgb::new(34, 51, 68),
            max_radius: 1.0,
        }
    }
}

/// Comet trail pool configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    /// Fraction of stars that are trail-eligible; also sizes the pool.
    pub pool_percentage: f32,
    /// Maximum number of points kept per trail.
    pub max_points: usize,
    /// Per-point alpha falloff from newest to oldest.
    pub fade_factor: f32,
    /// Margin (px) added on every side of the viewport for visibility tests.
    pub margin: f32,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            pool_percentage: 0.07,
            max_points: 100,
            fade_factor: 0.94,
            margin: 100.0,
        }
    }
}

/// Complete starfield configuration. Any subset can be overridden from JSON;
/// missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarfieldConfig {
    pub count: CountConfig,
    /// Star radius range in pixels.
    pub size: FloatRange,
    pub opacity: OpacityConfig,
    pub twinkle: TwinkleConfig,
    /// Trail and reduced-motion star color.
    pub color: Rgb,
    pub orbit: OrbitConfig,
    pub ambient: AmbientConfig,
    pub trail: TrailConfig,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            count: CountConfig::default(),
            size: Self::DEFAULT_SIZE,
            opacity: OpacityConfig::default(),
            twinkle: TwinkleConfig::default(),
            color: Self::DEFAULT_COLOR,
            orbit: OrbitConfig::default(),
            ambient: AmbientConfig::default(),
            trail: TrailConfig::default(),
        }
    }
}

impl StarfieldConfig {
    pub const DEFAULT_SIZE: FloatRange = FloatRange::new(0.4, 1.0);
    pub const DEFAULT_COLOR: Rgb = Rgb::new(173, 216, 255);

    /// Parse a config override from JSON. The result is sanitized.
    pub fn from_json(json: &str) -> Result<Self, OrreryError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Replace values generation cannot use with their defaults and order
    /// every range.
    ///
    /// Periods, areas and multipliers must be positive; jitter stays below
    /// one so every period (and angular velocity) stays positive;
    /// probabilities and fractions are clamped to [0, 1].
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let mut c = self.clone();

        c.count = c.count.sanitized();
        c.size = positive_range(c.size, defaults.size);

        c.opacity.base = finite_range(c.opacity.base, defaults.opacity.base);
        c.opacity.flicker_frequency =
            finite_range(c.opacity.flicker_frequency, defaults.opacity.flicker_frequency);
        c.opacity.flicker_amplitude =
            finite_range(c.opacity.flicker_amplitude, defaults.opacity.flicker_amplitude);

        c.twinkle.chance = unit_or(c.twinkle.chance, defaults.twinkle.chance);
        c.twinkle.frequency = finite_range(c.twinkle.frequency, defaults.twinkle.frequency);
        c.twinkle.amplitude = finite_range(c.twinkle.amplitude, defaults.twinkle.amplitude);

        let orbit = &mut c.orbit;
        let d = defaults.orbit;
        orbit.center_x = finite_or(orbit.center_x, d.center_x);
        orbit.center_y = finite_or(orbit.center_y, d.center_y);
        orbit.base_period = positive_or(orbit.base_period, d.base_period);
        orbit.period_jitter = finite_or(orbit.period_jitter, d.period_jitter)
            .abs()
            .min(MAX_PERIOD_JITTER);
        orbit.area_per_star = positive_or(orbit.area_per_star, d.area_per_star);
        orbit.compact_breakpoint = finite_or(orbit.compact_breakpoint, d.compact_breakpoint);
        orbit.compact_multiplier = positive_or(orbit.compact_multiplier, d.compact_multiplier);
        orbit.wide_multiplier = positive_or(orbit.wide_multiplier, d.wide_multiplier);

        c.ambient.intensity = finite_or(c.ambient.intensity, defaults.ambient.intensity).max(0.0);
        c.ambient.max_radius = finite_or(c.ambient.max_radius, defaults.ambient.max_radius).max(0.0);

        c.trail.pool_percentage = unit_or(c.trail.pool_percentage, defaults.trail.pool_percentage);
        c.trail.fade_factor = unit_or(c.trail.fade_factor, defaults.trail.fade_factor);
        c.trail.margin = finite_or(c.trail.margin, defaults.trail.margin).max(0.0);

        c
    }
}

/// Upper bound on the relative period jitter.
pub const MAX_PERIOD_JITTER: f32 = 0.95;

fn finite_or(v: f32, default: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        default
    }
}

fn positive_or(v: f32, default: f32) -> f32 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        default
    }
}

fn unit_or(v: f32, default: f32) -> f32 {
    finite_or(v, default).clamp(0.0, 1.0)
}

fn finite_range(r: FloatRange, default: FloatRange) -> FloatRange {
    FloatRange::new(finite_or(r.min, default.min), finite_or(r.max, default.max)).ordered()
}

fn positive_range(r: FloatRange, default: FloatRange) -> FloatRange {
    FloatRange::new(positive_or(r.min, default.min), positive_or(r.max, default.max)).ordered()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn defaults_match_reference_constants() {
        let c = StarfieldConfig::default();
        assert_eq!(c.count, CountConfig { min: 4000, max: 7500 });
        assert_eq!(c.size, FloatRange::new(0.4, 1.0));
        assert_eq!(c.opacity.base, FloatRange::new(0.55, 0.9));
        assert_eq!(c.color, Rgb::new(173, 216, 255));
        assert_eq!(c.orbit.center_x, 1.0);
        assert_eq!(c.orbit.center_y, 0.5);
        assert_eq!(c.ambient.color, Rgb::new(34, 51, 68));
        assert_eq!(c.trail.pool_percentage, 0.07);
        assert_eq!(c.trail.max_points, 100);
        assert_eq!(c.trail.fade_factor, 0.94);
        assert_eq!(c.trail.margin, 100.0);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{
            "count": { "max": 9000 },
            "trail": { "max_points": 40 }
        }"#;
        let c = StarfieldConfig::from_json(json).unwrap();
        assert_eq!(c.count.min, 4000);
        assert_eq!(c.count.max, 9000);
        assert_eq!(c.trail.max_points, 40);
        assert_eq!(c.trail.fade_factor, 0.94);
        assert_eq!(c.opacity, OpacityConfig::default());
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = StarfieldConfig::from_json("{ count: ").unwrap_err();
        assert!(matches!(err, OrreryError::Config(_)));
    }

    #[test]
    fn json_jitter_is_clamped_below_one() {
        let c = StarfieldConfig::from_json(r#"{ "orbit": { "period_jitter": 1.5 } }"#).unwrap();
        assert_eq!(c.orbit.period_jitter, MAX_PERIOD_JITTER);
        let c = StarfieldConfig::from_json(r#"{ "orbit": { "period_jitter": -0.1 } }"#).unwrap();
        assert!((c.orbit.period_jitter - 0.1).abs() < 1e-6);
    }

    #[test]
    fn json_non_positive_orbit_values_fall_back() {
        let json = r#"{ "orbit": {
            "base_period": 0.0,
            "area_per_star": -5.0,
            "compact_multiplier": 0.0,
            "wide_multiplier": -1.0
        } }"#;
        let c = StarfieldConfig::from_json(json).unwrap();
        let d = OrbitConfig::default();
        assert_eq!(c.orbit.base_period, d.base_period);
        assert_eq!(c.orbit.area_per_star, d.area_per_star);
        assert_eq!(c.orbit.compact_multiplier, d.compact_multiplier);
        assert_eq!(c.orbit.wide_multiplier, d.wide_multiplier);
    }

    #[test]
    fn json_ranges_are_ordered() {
        let json = r#"{
            "count": { "min": 9000, "max": 100 },
            "size": { "min": 2.0, "max": 0.5 },
            "opacity": { "base": { "min": 0.9, "max": 0.2 } }
        }"#;
        let c = StarfieldConfig::from_json(json).unwrap();
        assert_eq!(c.count, CountConfig { min: 100, max: 9000 });
        assert_eq!(c.size, FloatRange::new(0.5, 2.0));
        assert_eq!(c.opacity.base, FloatRange::new(0.2, 0.9));
    }

    #[test]
    fn count_bounds_are_capped() {
        let c = CountConfig { min: usize::MAX, max: 10 }.sanitized();
        assert_eq!(c, CountConfig { min: 10, max: CountConfig::MAX_STARS });
    }

    #[test]
    fn sanitized_clamps_fractions_and_keeps_valid_config() {
        let mut c = StarfieldConfig::default();
        assert_eq!(c.sanitized(), c);
        c.trail.pool_percentage = 3.0;
        c.trail.fade_factor = -1.0;
        c.twinkle.chance = f32::NAN;
        c.size = FloatRange::new(-1.0, f32::INFINITY);
        let s = c.sanitized();
        assert_eq!(s.trail.pool_percentage, 1.0);
        assert_eq!(s.trail.fade_factor, 0.0);
        assert_eq!(s.twinkle.chance, 0.05);
        assert_eq!(s.size, StarfieldConfig::DEFAULT_SIZE);
    }

    #[test]
    fn range_sample_stays_in_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let range = FloatRange::new(0.2, 0.3);
        for _ in 0..1000 {
            let v = range.sample(&mut rng);
            assert!(v >= 0.2 && v <= 0.3, "sample out of range: {v}");
        }
    }

    #[test]
    fn ordered_swaps_inverted_bounds() {
        assert_eq!(FloatRange::new(2.0, 1.0).ordered(), FloatRange::new(1.0, 2.0));
        assert_eq!(FloatRange::new(1.0, 2.0).ordered(), FloatRange::new(1.0, 2.0));
    }
}
