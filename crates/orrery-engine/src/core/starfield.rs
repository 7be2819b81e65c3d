use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::api::config::{CountConfig, FloatRange, StarfieldConfig};
use crate::api::info::{
    ActiveTrailInfo, OrbitalInfo, StarsInfo, TrailInfo, TrailStarCounts, ROTATION, ZONE_COUNT,
};
use crate::api::types::{DeviceClass, Rgb, Viewport};
use crate::components::star::Star;
use crate::renderer::instance::FrameBuffer;
use crate::systems::generator::{generate, pool_size};
use crate::systems::motion::{advance_orbits, update_trails, VisibleBounds};
use crate::systems::render::{build_frame, build_static_frame, FrameScene};
use crate::systems::trails::TrailPool;

/// Partial update of the six opacity bounds. `None` keeps the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OpacityUpdate {
    pub base_min: Option<f32>,
    pub base_max: Option<f32>,
    pub flicker_frequency_min: Option<f32>,
    pub flicker_frequency_max: Option<f32>,
    pub flicker_amplitude_min: Option<f32>,
    pub flicker_amplitude_max: Option<f32>,
}

/// The engine object: configuration, the live star collection, and the
/// trail pool, regenerated together.
pub struct Starfield {
    config: StarfieldConfig,
    viewport: Viewport,
    stars: Vec<Star>,
    pool: TrailPool,
    target_count: usize,
    device_class: DeviceClass,
    rng: ChaCha8Rng,
}

impl Starfield {
    /// Create and populate a starfield. The same `seed`, viewport and config
    /// always produce the same field.
    pub fn new(viewport: Viewport, config: StarfieldConfig, seed: u64) -> Self {
        let config = config.sanitized();
        let device_class = viewport.device_class(config.orbit.compact_breakpoint);
        let mut starfield = Self {
            config,
            viewport,
            stars: Vec::new(),
            pool: TrailPool::empty(),
            target_count: 0,
            device_class,
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        starfield.regenerate();
        starfield
    }

    /// Discard every star and the pool, then generate a fresh field.
    pub fn regenerate(&mut self) {
        let generation = generate(self.viewport, &self.config, &mut self.rng);
        self.stars = generation.stars;
        self.target_count = generation.target_count;
        self.device_class = generation.device_class;
        self.pool = TrailPool::new(generation.pool_size, self.config.trail.max_points);

        let center = self.center();
        log::info!(
            "starfield: center ({:.0}, {:.0}), {} stars, {:?}, trail pool {} ({} eligible)",
            center.x,
            center.y,
            self.stars.len(),
            self.device_class,
            self.pool.size(),
            self.eligible_count(),
        );
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.regenerate();
    }

    /// Replace the pool with a fresh one sized from the current target count
    /// and trail config. Every lease is dropped and visibility is forgotten,
    /// so visible eligible stars lease again on the next update.
    pub fn reinit_pool(&mut self) {
        let size = pool_size(self.target_count, self.config.trail.pool_percentage);
        self.pool = TrailPool::new(size, self.config.trail.max_points);
        for star in &mut self.stars {
            star.reset_trail_state();
        }
        log::info!(
            "trail pool reinitialised: {} buffers, {} points max",
            size,
            self.config.trail.max_points
        );
    }

    // -- Per-frame work --

    /// Orbital center in viewport pixels.
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.viewport.width * self.config.orbit.center_x,
            self.viewport.height * self.config.orbit.center_y,
        )
    }

    pub fn bounds(&self) -> VisibleBounds {
        VisibleBounds::new(self.viewport, self.config.trail.margin)
    }

    /// Advance all orbits by `dt` seconds, then run the trail state machine.
    pub fn update(&mut self, dt: f32) {
        let center = self.center();
        let bounds = self.bounds();
        advance_orbits(&mut self.stars, dt);
        update_trails(&mut self.stars, &mut self.pool, center, bounds);
    }

    /// Build the animated frame at time `t` seconds.
    pub fn build_frame(&self, t: f32, frame: &mut FrameBuffer) {
        build_frame(&self.scene(), t, frame);
    }

    /// Build the reduced-motion frame.
    pub fn build_static_frame(&self, frame: &mut FrameBuffer) {
        build_static_frame(&self.scene(), frame);
    }

    fn scene(&self) -> FrameScene<'_> {
        FrameScene {
            stars: &self.stars,
            pool: &self.pool,
            config: &self.config,
            viewport: self.viewport,
            center: self.center(),
            device_class: self.device_class,
        }
    }

    // -- Runtime configuration --

    /// Missing or zero bounds fall back to the defaults; both are capped at
    /// [`CountConfig::MAX_STARS`]. Regenerates.
    pub fn set_count_range(&mut self, min: Option<usize>, max: Option<usize>) {
        let defaults = CountConfig::default();
        let min = min.filter(|v| *v > 0).unwrap_or(defaults.min);
        let max = max.filter(|v| *v > 0).unwrap_or(defaults.max);
        self.config.count = CountConfig { min, max }.sanitized();
        log::info!("star count range set to {}..{}", self.config.count.min, self.config.count.max);
        self.regenerate();
    }

    /// Missing, non-positive or non-finite bounds fall back to the defaults.
    /// Regenerates.
    pub fn set_size_range(&mut self, min: Option<f32>, max: Option<f32>) {
        let defaults = StarfieldConfig::DEFAULT_SIZE;
        let positive = |v: &f32| v.is_finite() && *v > 0.0;
        let min = min.filter(positive).unwrap_or(defaults.min);
        let max = max.filter(positive).unwrap_or(defaults.max);
        self.config.size = FloatRange::new(min, max).ordered();
        log::info!("star size range set to {}..{}", self.config.size.min, self.config.size.max);
        self.regenerate();
    }

    /// Apply any subset of the opacity bounds. Regenerates.
    pub fn set_opacity(&mut self, update: OpacityUpdate) {
        let opacity = &mut self.config.opacity;
        apply_range(&mut opacity.base, "base alpha", update.base_min, update.base_max);
        apply_range(
            &mut opacity.flicker_frequency,
            "flicker frequency",
            update.flicker_frequency_min,
            update.flicker_frequency_max,
        );
        apply_range(
            &mut opacity.flicker_amplitude,
            "flicker amplitude",
            update.flicker_amplitude_min,
            update.flicker_amplitude_max,
        );
        log::info!("opacity updated: {:?}", self.config.opacity);
        self.regenerate();
    }

    /// Missing channels take the default color's channel. Takes effect on
    /// the next frame without regenerating.
    pub fn set_color(&mut self, r: Option<u8>, g: Option<u8>, b: Option<u8>) {
        let default = StarfieldConfig::DEFAULT_COLOR;
        self.config.color = Rgb::new(
            r.unwrap_or(default.r),
            g.unwrap_or(default.g),
            b.unwrap_or(default.b),
        );
        log::info!("star color set to {:?}", self.config.color);
    }

    /// Missing values keep their current setting. No regeneration.
    pub fn set_ambient_light(&mut self, enabled: Option<bool>, intensity: Option<f32>, max_radius: Option<f32>) {
        let ambient = &mut self.config.ambient;
        if let Some(enabled) = enabled {
            ambient.enabled = enabled;
        }
        if let Some(intensity) = finite("ambient intensity", intensity) {
            ambient.intensity = intensity.max(0.0);
        }
        if let Some(max_radius) = finite("ambient max radius", max_radius) {
            ambient.max_radius = max_radius.max(0.0);
        }
        log::info!("ambient light updated: {:?}", self.config.ambient);
    }

    /// Move the orbital center, given as fractions of the viewport.
    /// Non-finite coordinates keep the current value. Regenerates.
    pub fn set_orbital_center(&mut self, x: f32, y: f32) {
        if let Some(x) = finite("orbital center x", Some(x)) {
            self.config.orbit.center_x = x;
        }
        if let Some(y) = finite("orbital center y", Some(y)) {
            self.config.orbit.center_y = y;
        }
        log::info!(
            "orbital center set to ({}, {})",
            self.config.orbit.center_x,
            self.config.orbit.center_y
        );
        self.regenerate();
    }

    /// Missing values keep their current setting; the percentage is clamped
    /// to [0, 1]. Reinitialises the pool only; eligibility is not redrawn.
    pub fn set_trail_config(&mut self, pool_percentage: Option<f32>, max_points: Option<usize>, fade_factor: Option<f32>) {
        let trail = &mut self.config.trail;
        if let Some(pct) = finite("trail pool percentage", pool_percentage) {
            trail.pool_percentage = pct.clamp(0.0, 1.0);
        }
        if let Some(max_points) = max_points {
            trail.max_points = max_points;
        }
        if let Some(fade) = finite("trail fade factor", fade_factor) {
            trail.fade_factor = fade.clamp(0.0, 1.0);
        }
        log::info!("trail config updated: {:?}", self.config.trail);
        self.reinit_pool();
    }

    // -- Queries --

    pub fn orbital_info(&self) -> OrbitalInfo {
        let center = self.center();
        OrbitalInfo {
            center: center.to_array(),
            rotation: ROTATION,
            stars: self.stars.len(),
            zones: ZONE_COUNT,
            trails: self.pool.stats(),
        }
    }

    pub fn stars_info(&self) -> StarsInfo {
        StarsInfo {
            count: self.stars.len(),
            eligible_for_trails: self.eligible_count(),
            with_trails: self.trailed_count(),
        }
    }

    pub fn trail_info(&self) -> TrailInfo {
        let total = self.stars.len();
        let eligible = self.eligible_count();
        let percentage = if total == 0 {
            0.0
        } else {
            eligible as f32 / total as f32 * 100.0
        };
        // Pool order; star ids are indices into `stars`.
        let active_trails = self
            .pool
            .iter_active()
            .filter_map(|buffer| {
                let star = self.stars.get(buffer.owner()?.0 as usize)?;
                Some(ActiveTrailInfo {
                    id: buffer.id(),
                    zone: star.zone(),
                    size: star.size(),
                    points: buffer.len(),
                })
            })
            .collect();

        TrailInfo {
            config: self.config.trail,
            pool: self.pool.stats(),
            stars: TrailStarCounts {
                total,
                eligible,
                with_trails: self.trailed_count(),
                percentage,
            },
            active_trails,
        }
    }

    fn eligible_count(&self) -> usize {
        self.stars.iter().filter(|s| s.is_trail_eligible()).count()
    }

    fn trailed_count(&self) -> usize {
        self.stars.iter().filter(|s| s.has_active_trail()).count()
    }

    // -- Accessors --

    pub fn config(&self) -> &StarfieldConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn pool(&self) -> &TrailPool {
        &self.pool
    }

    /// Primary star count before companions.
    pub fn target_count(&self) -> usize {
        self.target_count
    }

    pub fn device_class(&self) -> DeviceClass {
        self.device_class
    }
}

/// Pass through finite values; warn about and drop the rest.
fn finite(name: &str, value: Option<f32>) -> Option<f32> {
    match value {
        Some(v) if v.is_finite() => Some(v),
        Some(v) => {
            log::warn!("ignoring non-finite {name}: {v}");
            None
        }
        None => None,
    }
}

fn apply_range(range: &mut FloatRange, name: &str, min: Option<f32>, max: Option<f32>) {
    if let Some(min) = finite(name, min) {
        range.min = min;
    }
    if let Some(max) = finite(name, max) {
        range.max = max;
    }
    *range = range.ordered();
}
