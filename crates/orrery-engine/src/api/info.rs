//! Read-only snapshots returned by the starfield queries.
//!
//! All of these serialize to JSON for the web host.

use serde::Serialize;

use crate::api::config::TrailConfig;
use crate::api::types::TrailId;
use crate::systems::trails::PoolStats;

/// Stars always move counter-clockwise.
pub const ROTATION: &str = "counter-clockwise";

/// Number of radial zones stars are classified into.
pub const ZONE_COUNT: u32 = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrbitalInfo {
    /// Orbital center in viewport pixels.
    pub center: [f32; 2],
    pub rotation: &'static str,
    pub stars: usize,
    pub zones: u32,
    pub trails: PoolStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StarsInfo {
    pub count: usize,
    pub eligible_for_trails: usize,
    pub with_trails: usize,
}

/// Star counts as seen from the trail pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrailStarCounts {
    pub total: usize,
    pub eligible: usize,
    pub with_trails: usize,
    /// Share of stars that are trail-eligible, in percent.
    pub percentage: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActiveTrailInfo {
    pub id: TrailId,
    pub zone: f32,
    pub size: f32,
    pub points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrailInfo {
    pub config: TrailConfig,
    pub pool: PoolStats,
    pub stars: TrailStarCounts,
    pub active_trails: Vec<ActiveTrailInfo>,
}
