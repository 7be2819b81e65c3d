//! Star field generation.
//!
//! Radii are sampled area-uniformly over a disc whose radius is the viewport
//! diagonal, and everything else (period, size mix, speed multipliers,
//! companions) is conditioned on the continuous zone `1 + 3·r/rMax`.

use std::f32::consts::TAU;

use rand::seq::index;
use rand::Rng;

use crate::api::config::{FloatRange, StarfieldConfig};
use crate::api::types::{DeviceClass, StarId, Viewport};
use crate::components::star::{Flicker, Star, Twinkle};

/// Speed multiplier applied to comets, and again to the smallest comets.
pub const COMET_SPEEDUP: f32 = 1.2;
/// Speed multiplier for large non-comet stars in zones [2, 4).
pub const LARGE_STAR_SLOWDOWN: f32 = 0.5;

/// Desktop-only companion chance for zone < 2.
const WIDE_INNER_COMPANION_CHANCE: f32 = 0.8;
/// Desktop-only companion chance for zone in [2, 3).
const WIDE_MIDDLE_COMPANION_CHANCE: f32 = 0.15;
/// Companion chance for zone < 2 on every device class.
const INNER_COMPANION_CHANCE: f32 = 0.5;
const COMPANION_RADIUS_SPREAD: f32 = 0.2;
const COMPANION_SIZE_SPREAD: f32 = 0.3;

/// Size cut points at 20/40/60/80% of the configured size range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeThresholds {
    pub min: f32,
    pub smallest: f32,
    pub small: f32,
    pub small_medium: f32,
    pub large: f32,
    pub max: f32,
}

impl SizeThresholds {
    pub fn new(range: FloatRange) -> Self {
        Self {
            min: range.min,
            smallest: range.lerp(0.2),
            small: range.lerp(0.4),
            small_medium: range.lerp(0.6),
            large: range.lerp(0.8),
            max: range.max,
        }
    }
}

/// Output of one generation pass.
#[derive(Debug, Clone)]
pub struct Generation {
    /// All stars, companions included, with ids equal to their index.
    pub stars: Vec<Star>,
    /// Count of primary stars before companions.
    pub target_count: usize,
    /// Number of trail buffers to allocate; equals the eligible count.
    pub pool_size: usize,
    pub device_class: DeviceClass,
}

/// Primary star count for a viewport:
/// `clamp(floor(floor(area / areaPerStar) × multiplier), min, max)`.
pub fn target_count(viewport: Viewport, config: &StarfieldConfig) -> usize {
    let orbit = &config.orbit;
    let area_per_star = f64::from(orbit.area_per_star).max(f64::EPSILON);
    let base = (f64::from(viewport.area()) / area_per_star).floor();
    let multiplier = match viewport.device_class(orbit.compact_breakpoint) {
        DeviceClass::Compact => orbit.compact_multiplier,
        DeviceClass::Wide => orbit.wide_multiplier,
    };
    let adjusted = (base * f64::from(multiplier)).floor().max(0.0) as usize;
    adjusted.min(config.count.max).max(config.count.min)
}

/// Trail pool size for `count` stars: `floor(count × percentage)`.
pub fn pool_size(count: usize, percentage: f32) -> usize {
    let pct = f64::from(percentage.clamp(0.0, 1.0));
    ((count as f64) * pct).floor() as usize
}

/// Choose `pool_size(count, percentage)` distinct indices uniformly at
/// random. Returns a membership mask of length `count`.
pub fn pick_trail_eligible<R: Rng + ?Sized>(count: usize, percentage: f32, rng: &mut R) -> Vec<bool> {
    let mut mask = vec![false; count];
    let amount = pool_size(count, percentage).min(count);
    for i in index::sample(rng, count, amount) {
        mask[i] = true;
    }
    mask
}

/// Draw a star size from the zone-conditioned mix.
///
/// Zone < 2 is small/medium only; zones [2, 4) shift linearly toward large;
/// zone ≥ 4 is 80% large, 20% medium.
pub fn sample_size<R: Rng + ?Sized>(zone: f32, t: &SizeThresholds, rng: &mut R) -> f32 {
    let small_medium = FloatRange::new(t.min, t.small_medium);
    let medium_large = FloatRange::new(t.small_medium, t.large);
    let large = FloatRange::new(t.large, t.max);

    if zone < 2.0 {
        small_medium.sample(rng)
    } else if zone < 4.0 {
        let zone_factor = zone - 2.0;
        let large_chance = (0.3 + zone_factor * 0.2) * 0.8;
        let small_medium_chance = (0.7 - zone_factor * 0.2) * 0.8;
        if rng.random::<f32>() < large_chance {
            large.sample(rng)
        } else if rng.random::<f32>() < small_medium_chance {
            small_medium.sample(rng)
        } else {
            medium_large.sample(rng)
        }
    } else if rng.random::<f32>() < 0.8 {
        large.sample(rng)
    } else {
        medium_large.sample(rng)
    }
}

/// Generate a complete star field for `viewport`.
///
/// The config is sanitized first, so any input yields finite, positive
/// angular velocities.
pub fn generate<R: Rng + ?Sized>(viewport: Viewport, config: &StarfieldConfig, rng: &mut R) -> Generation {
    let config = &config.sanitized();
    let device_class = viewport.device_class(config.orbit.compact_breakpoint);
    let count = target_count(viewport, config);
    let eligible = pick_trail_eligible(count, config.trail.pool_percentage, rng);
    let pool_size = eligible.iter().filter(|e| **e).count();

    let max_radius = viewport.diagonal();
    let size_range = config.size.ordered();
    let thresholds = SizeThresholds::new(size_range);
    let jitter = config.orbit.period_jitter.abs();
    let period_jitter = FloatRange::new(1.0 - jitter, 1.0 + jitter);
    let opacity = &config.opacity;
    let twinkle_cfg = &config.twinkle;

    let mut stars = Vec::with_capacity(count * 3 / 2);

    for &trail_eligible in &eligible {
        let radius_ratio = rng.random::<f32>().sqrt();
        let radius = radius_ratio * max_radius;
        let angle = rng.random::<f32>() * TAU;
        let zone = 1.0 + 3.0 * radius_ratio;

        let period = config.orbit.base_period * zone * period_jitter.sample(rng);
        let mut omega = TAU / period;

        let size = sample_size(zone, &thresholds, rng);
        let twinkles = size <= thresholds.small && rng.random::<f32>() < twinkle_cfg.chance;

        if trail_eligible {
            omega *= COMET_SPEEDUP;
            if size <= thresholds.smallest {
                omega *= COMET_SPEEDUP;
            }
        } else if size > thresholds.large && (2.0..4.0).contains(&zone) {
            omega *= LARGE_STAR_SLOWDOWN;
        }

        let inner = zone < 2.0;
        let middle = (2.0..3.0).contains(&zone);
        let mut spawn_companion = false;
        if device_class == DeviceClass::Wide {
            if inner && rng.random::<f32>() < WIDE_INNER_COMPANION_CHANCE {
                spawn_companion = true;
            } else if middle && rng.random::<f32>() < WIDE_MIDDLE_COMPANION_CHANCE {
                spawn_companion = true;
            }
        }
        if inner && rng.random::<f32>() < INNER_COMPANION_CHANCE {
            spawn_companion = true;
        }

        let flicker = Flicker {
            frequency: opacity.flicker_frequency.sample(rng),
            phase: rng.random::<f32>() * TAU,
            base_alpha: opacity.base.sample(rng),
            amplitude: opacity.flicker_amplitude.sample(rng),
        };

        let mut star = Star::new(StarId(stars.len() as u32), radius, angle, omega)
            .with_zone(zone)
            .with_period(period)
            .with_size(size)
            .with_flicker(flicker)
            .with_trail_eligible(trail_eligible);
        if twinkles {
            star = star.with_twinkle(Twinkle {
                frequency: twinkle_cfg.frequency.sample(rng),
                amplitude: twinkle_cfg.amplitude.sample(rng),
                phase: rng.random::<f32>() * TAU,
            });
        }

        let companion = spawn_companion.then(|| {
            let radius_scale = 1.0 - COMPANION_RADIUS_SPREAD + rng.random::<f32>() * 2.0 * COMPANION_RADIUS_SPREAD;
            let angle = rng.random::<f32>() * TAU;
            let size_scale = 1.0 - COMPANION_SIZE_SPREAD + rng.random::<f32>() * 2.0 * COMPANION_SIZE_SPREAD;
            star.companion(StarId(stars.len() as u32 + 1), radius_scale, angle, size_scale)
        });

        stars.push(star);
        stars.extend(companion);
    }

    log::debug!(
        "generated {} stars ({} primary, {} trail-eligible) for {}x{}",
        stars.len(),
        count,
        pool_size,
        viewport.width,
        viewport.height,
    );

    Generation {
        stars,
        target_count: count,
        pool_size,
        device_class,
    }
}
