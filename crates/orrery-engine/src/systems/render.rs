use glam::Vec2;

use crate::api::config::StarfieldConfig;
use crate::api::types::{DeviceClass, Rgb, Viewport};
use crate::components::star::Star;
use crate::renderer::instance::{CircleInstance, FrameBuffer};
use crate::systems::lighting::AmbientGradient;
use crate::systems::trails::TrailPool;

/// Distance of the rotation marker from the orbital center, in pixels.
pub const MARKER_DISTANCE: f32 = 50.0;
pub const MARKER_RADIUS: f32 = 2.0;
pub const MARKER_ALPHA: f32 = 0.15;
/// Marker angle per second of elapsed time.
pub const MARKER_ANGULAR_SPEED: f32 = 0.5;

/// Trail dots are smaller than their star.
pub const TRAIL_SIZE_SCALE: f32 = 0.8;
/// Share of the owning star's alpha given to the newest trail point.
pub const TRAIL_ALPHA_SCALE: f32 = 0.6;

/// Relative size swing of twinkling stars.
pub const TWINKLE_SIZE_SWING: f32 = 0.1;
const TWINKLE_GLOW_SIZE: f32 = 1.3;
const TWINKLE_GLOW_ALPHA: f32 = 0.2;

/// Non-twinkling stars above this size get a soft glow.
pub const GLOW_MIN_SIZE: f32 = 0.8;
const GLOW_SIZE: f32 = 1.2;
const GLOW_ALPHA: f32 = 0.15;

/// Read-only view of everything a frame is built from.
pub struct FrameScene<'a> {
    pub stars: &'a [Star],
    pub pool: &'a TrailPool,
    pub config: &'a StarfieldConfig,
    pub viewport: Viewport,
    pub center: Vec2,
    pub device_class: DeviceClass,
}

/// Alpha of trail point `index` in a trail of `len` points, oldest first.
pub fn trail_point_alpha(star_alpha: f32, fade_factor: f32, len: usize, index: usize) -> f32 {
    let age = len.saturating_sub(index) as i32;
    star_alpha * fade_factor.powi(age) * TRAIL_ALPHA_SCALE
}

/// Build the full animated frame at time `t` (seconds).
///
/// Draw order: ambient gradient, rotation marker, all trails, then all
/// stars. Nothing in `scene` is mutated.
pub fn build_frame(scene: &FrameScene<'_>, t: f32, frame: &mut FrameBuffer) {
    frame.begin(scene.viewport.width, scene.viewport.height);
    frame.ambient = AmbientGradient::new(
        &scene.config.ambient,
        scene.center,
        scene.viewport,
        scene.device_class,
    );

    let marker_angle = MARKER_ANGULAR_SPEED * t;
    let marker = scene.center + Vec2::from_angle(marker_angle) * MARKER_DISTANCE;
    frame.push(CircleInstance::new(marker.x, marker.y, MARKER_RADIUS, Rgb::WHITE, MARKER_ALPHA));

    push_trails(scene, t, frame);

    for star in scene.stars {
        push_star(star, scene.center, t, frame);
    }
}

/// Build the reduced-motion frame: every star at its current position,
/// flat size and base alpha, in the configured color.
pub fn build_static_frame(scene: &FrameScene<'_>, frame: &mut FrameBuffer) {
    frame.begin(scene.viewport.width, scene.viewport.height);
    for star in scene.stars {
        let pos = star.position(scene.center);
        frame.push(CircleInstance::new(
            pos.x,
            pos.y,
            star.size(),
            scene.config.color,
            star.flicker().base_alpha,
        ));
    }
}

fn push_trails(scene: &FrameScene<'_>, t: f32, frame: &mut FrameBuffer) {
    let fade = scene.config.trail.fade_factor;
    let color = scene.config.color;

    for star in scene.stars {
        let Some(buffer) = star.trail().and_then(|id| scene.pool.get(id)) else {
            continue;
        };
        let len = buffer.len();
        if len <= 1 {
            continue;
        }
        let star_alpha = star.flicker_alpha(t);
        let radius = star.size() * TRAIL_SIZE_SCALE;
        // The newest point coincides with the star itself.
        for (i, p) in buffer.points().iter().take(len - 1).enumerate() {
            let alpha = trail_point_alpha(star_alpha, fade, len, i);
            frame.push(CircleInstance::new(p.x, p.y, radius, color, alpha));
        }
    }
}

fn push_star(star: &Star, center: Vec2, t: f32, frame: &mut FrameBuffer) {
    let pos = star.position(center);
    let mut alpha = star.flicker_alpha(t);
    let mut size = star.size();

    if let Some(twinkle) = star.twinkle() {
        let wave = twinkle.wave_at(t);
        alpha *= 1.0 + twinkle.amplitude * wave;
        size *= 1.0 + TWINKLE_SIZE_SWING * wave;
        frame.push(CircleInstance::new(
            pos.x,
            pos.y,
            size * TWINKLE_GLOW_SIZE,
            Rgb::WHITE,
            alpha * TWINKLE_GLOW_ALPHA,
        ));
        frame.push(CircleInstance::new(pos.x, pos.y, size, Rgb::WHITE, alpha));
        return;
    }

    frame.push(CircleInstance::new(pos.x, pos.y, size, Rgb::WHITE, alpha));
    if size > GLOW_MIN_SIZE {
        frame.push(CircleInstance::new(
            pos.x,
            pos.y,
            size * GLOW_SIZE,
            Rgb::WHITE,
            alpha * GLOW_ALPHA,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::StarId;
    use crate::components::star::{Flicker, Twinkle};
    use crate::systems::motion::{update_trails, VisibleBounds};

    fn steady(base_alpha: f32) -> Flicker {
        Flicker { base_alpha, frequency: 0.0, phase: 0.0, amplitude: 0.0 }
    }

    fn scene<'a>(stars: &'a [Star], pool: &'a TrailPool, config: &'a StarfieldConfig) -> FrameScene<'a> {
        FrameScene {
            stars,
            pool,
            config,
            viewport: Viewport::new(200.0, 200.0),
            center: Vec2::new(100.0, 100.0),
            device_class: DeviceClass::Compact,
        }
    }

    #[test]
    fn trail_alpha_grows_toward_newest_point() {
        let len = 10;
        let alphas: Vec<f32> = (0..len - 1).map(|i| trail_point_alpha(0.8, 0.94, len, i)).collect();
        for pair in alphas.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        let newest = 0.8 * 0.94f32.powi(2) * TRAIL_ALPHA_SCALE;
        assert!((alphas[len - 2] - newest).abs() < 1e-6);
    }

    #[test]
    fn plain_frame_has_marker_and_one_circle_per_small_star() {
        let config = StarfieldConfig::default();
        let pool = TrailPool::empty();
        let stars = vec![
            Star::new(StarId(0), 10.0, 0.0, 1.0).with_size(0.5).with_flicker(steady(0.7)),
            Star::new(StarId(1), 20.0, 1.0, 1.0).with_size(0.6).with_flicker(steady(0.7)),
        ];
        let mut frame = FrameBuffer::new();
        build_frame(&scene(&stars, &pool, &config), 0.0, &mut frame);

        assert_eq!(frame.circle_count(), 3);
        let marker = frame.circles[0];
        assert!((marker.x - 150.0).abs() < 1e-4 && (marker.y - 100.0).abs() < 1e-4);
        assert_eq!(marker.radius, MARKER_RADIUS);
        assert_eq!(marker.alpha, MARKER_ALPHA);
        assert!(frame.ambient.is_some());

        let first = frame.circles[1];
        assert!((first.x - 110.0).abs() < 1e-4);
        assert_eq!([first.r, first.g, first.b], [1.0, 1.0, 1.0]);
        assert!((first.alpha - 0.7).abs() < 1e-6);
    }

    #[test]
    fn large_star_gets_glow() {
        let config = StarfieldConfig::default();
        let pool = TrailPool::empty();
        let stars = vec![Star::new(StarId(0), 10.0, 0.0, 1.0).with_size(0.9).with_flicker(steady(0.5))];
        let mut frame = FrameBuffer::new();
        build_frame(&scene(&stars, &pool, &config), 0.0, &mut frame);

        assert_eq!(frame.circle_count(), 3);
        let glow = frame.circles[2];
        assert!((glow.radius - 0.9 * GLOW_SIZE).abs() < 1e-6);
        assert!((glow.alpha - 0.5 * GLOW_ALPHA).abs() < 1e-6);
    }

    #[test]
    fn twinkle_modulates_size_and_alpha() {
        let config = StarfieldConfig::default();
        let pool = TrailPool::empty();
        // Quarter period of a 1 Hz twinkle puts the wave at its peak.
        let stars = vec![Star::new(StarId(0), 10.0, 0.0, 1.0)
            .with_size(0.5)
            .with_flicker(steady(0.6))
            .with_twinkle(Twinkle { frequency: 1.0, amplitude: 0.2, phase: 0.0 })];
        let mut frame = FrameBuffer::new();
        build_frame(&scene(&stars, &pool, &config), 0.25, &mut frame);

        assert_eq!(frame.circle_count(), 3);
        let glow = frame.circles[1];
        let core = frame.circles[2];
        assert!((core.radius - 0.55).abs() < 1e-4);
        assert!((core.alpha - 0.72).abs() < 1e-4);
        assert!((glow.radius - 0.55 * 1.3).abs() < 1e-4);
        assert!((glow.alpha - 0.72 * 0.2).abs() < 1e-4);
    }

    #[test]
    fn trails_drawn_behind_stars_in_configured_color() {
        let config = StarfieldConfig::default();
        let mut pool = TrailPool::new(1, 10);
        let mut stars = vec![Star::new(StarId(0), 10.0, 0.0, 1.0)
            .with_size(0.5)
            .with_flicker(steady(1.0))
            .with_trail_eligible(true)];
        let center = Vec2::new(100.0, 100.0);
        let bounds = VisibleBounds::new(Viewport::new(200.0, 200.0), 0.0);
        for _ in 0..4 {
            stars[0].advance(0.1);
            update_trails(&mut stars, &mut pool, center, bounds);
        }

        let mut frame = FrameBuffer::new();
        build_frame(&scene(&stars, &pool, &config), 0.0, &mut frame);

        // marker + 3 trail dots + star
        assert_eq!(frame.circle_count(), 5);
        let [r, g, b] = config.color.to_unit();
        for dot in &frame.circles[1..4] {
            assert_eq!([dot.r, dot.g, dot.b], [r, g, b]);
            assert!((dot.radius - 0.4).abs() < 1e-6);
        }
        assert!(frame.circles[1].alpha < frame.circles[3].alpha);
    }

    #[test]
    fn single_point_trail_is_not_drawn() {
        let config = StarfieldConfig::default();
        let mut pool = TrailPool::new(1, 10);
        let mut stars = vec![Star::new(StarId(0), 10.0, 0.0, 1.0).with_trail_eligible(true)];
        let bounds = VisibleBounds::new(Viewport::new(200.0, 200.0), 0.0);
        update_trails(&mut stars, &mut pool, Vec2::new(100.0, 100.0), bounds);

        let mut frame = FrameBuffer::new();
        build_frame(&scene(&stars, &pool, &config), 0.0, &mut frame);
        assert_eq!(frame.circle_count(), 3);
    }

    #[test]
    fn static_frame_uses_base_alpha_and_config_color() {
        let config = StarfieldConfig::default();
        let pool = TrailPool::empty();
        let stars = vec![Star::new(StarId(0), 10.0, 0.0, 1.0)
            .with_size(0.9)
            .with_flicker(Flicker { base_alpha: 0.6, frequency: 1.0, phase: 0.3, amplitude: 0.1 })];
        let mut frame = FrameBuffer::new();
        build_static_frame(&scene(&stars, &pool, &config), &mut frame);

        assert!(frame.ambient.is_none());
        assert_eq!(frame.circle_count(), 1);
        let c = frame.circles[0];
        assert_eq!(c.alpha, 0.6);
        assert_eq!(c.radius, 0.9);
        assert_eq!([c.r, c.g, c.b], config.color.to_unit());
    }
}
