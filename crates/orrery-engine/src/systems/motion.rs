//! Orbital motion and the per-star trail lease state machine.
//!
//! These are free functions over the star slice and the pool so the
//! starfield can borrow both mutably at once.

use glam::Vec2;

use crate::api::types::Viewport;
use crate::components::star::Star;
use crate::systems::trails::TrailPool;

/// Viewport rectangle expanded by a margin on every side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl VisibleBounds {
    pub fn new(viewport: Viewport, margin: f32) -> Self {
        Self {
            min: Vec2::splat(-margin),
            max: Vec2::new(viewport.width + margin, viewport.height + margin),
        }
    }

    /// Inclusive on all edges.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Advance every star's orbital phase by `dt` seconds.
pub fn advance_orbits(stars: &mut [Star], dt: f32) {
    for star in stars.iter_mut() {
        star.advance(dt);
    }
}

/// Run one step of the trail state machine for every star.
///
/// A lease is only attempted on the frame a star crosses into `bounds`;
/// a star that enters while the pool is full stays trail-less until it
/// leaves and re-enters. Crossing out releases the lease. While leased and
/// visible, the current position is appended to the trail.
pub fn update_trails(stars: &mut [Star], pool: &mut TrailPool, center: Vec2, bounds: VisibleBounds) {
    for star in stars.iter_mut() {
        let pos = star.position(center);
        let in_bounds = bounds.contains(pos);

        if !star.was_in_bounds && in_bounds && star.is_trail_eligible() && star.trail.is_none() {
            star.trail = pool.acquire(star.id);
        }

        if star.was_in_bounds && !in_bounds {
            if let Some(id) = star.trail.take() {
                pool.release(id);
            }
        }

        if in_bounds {
            if let Some(id) = star.trail {
                pool.push_point(id, pos);
            }
        }

        star.was_in_bounds = in_bounds;
    }
}
