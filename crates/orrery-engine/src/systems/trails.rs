//! Fixed-size pool of comet trail buffers.
//!
//! Buffers are leased to trail-eligible stars while they are visible and
//! returned when they leave. A buffer is available exactly when it has no
//! owner, and its point history is empty whenever it is available.

use std::collections::VecDeque;

use glam::Vec2;
use serde::Serialize;

use crate::api::types::{StarId, TrailId};

/// A capped position history leasable to one star at a time.
#[derive(Debug, Clone)]
pub struct TrailBuffer {
    id: TrailId,
    owner: Option<StarId>,
    points: VecDeque<Vec2>,
}

impl TrailBuffer {
    fn new(id: TrailId, capacity: usize) -> Self {
        Self {
            id,
            owner: None,
            points: VecDeque::with_capacity(capacity),
        }
    }

    pub fn id(&self) -> TrailId {
        self.id
    }

    pub fn is_available(&self) -> bool {
        self.owner.is_none()
    }

    /// Back-reference to the star holding the lease.
    pub fn owner(&self) -> Option<StarId> {
        self.owner
    }

    /// Points ordered oldest to newest.
    pub fn points(&self) -> &VecDeque<Vec2> {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Append `point`, evicting the oldest entries beyond `max_points`.
    fn push(&mut self, point: Vec2, max_points: usize) {
        self.points.push_back(point);
        while self.points.len() > max_points {
            self.points.pop_front();
        }
    }

    fn reset(&mut self) {
        self.owner = None;
        self.points.clear();
    }
}

/// Occupancy snapshot of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub total: usize,
    pub active: usize,
    pub available: usize,
}

/// Fixed-size trail pool. Leasing scans for the first free buffer; the pool
/// is a few hundred entries at most.
#[derive(Debug, Clone)]
pub struct TrailPool {
    buffers: Vec<TrailBuffer>,
    max_points: usize,
}

impl TrailPool {
    pub fn new(size: usize, max_points: usize) -> Self {
        let buffers = (0..size)
            .map(|i| TrailBuffer::new(TrailId(i as u32), max_points))
            .collect();
        Self { buffers, max_points }
    }

    /// Pool with no buffers; every lease attempt fails.
    pub fn empty() -> Self {
        Self::new(0, 0)
    }

    /// Number of buffers, leased or not.
    pub fn size(&self) -> usize {
        self.buffers.len()
    }

    pub fn max_points(&self) -> usize {
        self.max_points
    }

    /// Change the point cap, trimming the oldest points of longer trails.
    pub fn set_max_points(&mut self, max_points: usize) {
        self.max_points = max_points;
        for buffer in &mut self.buffers {
            while buffer.points.len() > max_points {
                buffer.points.pop_front();
            }
        }
    }

    /// Lease the first available buffer to `owner`. Returns `None` when the
    /// pool is exhausted.
    pub fn acquire(&mut self, owner: StarId) -> Option<TrailId> {
        let buffer = self.buffers.iter_mut().find(|b| b.is_available())?;
        buffer.points.clear();
        buffer.owner = Some(owner);
        log::debug!("trail {} leased to star {}", buffer.id.0, owner.0);
        Some(buffer.id)
    }

    /// Return a buffer to the pool, clearing its owner and points.
    /// Unknown ids are ignored.
    pub fn release(&mut self, id: TrailId) {
        if let Some(buffer) = self.get_mut(id) {
            if let Some(owner) = buffer.owner {
                log::debug!("trail {} released by star {}", id.0, owner.0);
            }
            buffer.reset();
        }
    }

    /// Append a point to a leased buffer. Points pushed to an available
    /// buffer are dropped.
    pub fn push_point(&mut self, id: TrailId, point: Vec2) {
        let max_points = self.max_points;
        if let Some(buffer) = self.get_mut(id) {
            if !buffer.is_available() {
                buffer.push(point, max_points);
            }
        }
    }

    pub fn get(&self, id: TrailId) -> Option<&TrailBuffer> {
        self.buffers.get(id.0 as usize)
    }

    fn get_mut(&mut self, id: TrailId) -> Option<&mut TrailBuffer> {
        self.buffers.get_mut(id.0 as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrailBuffer> {
        self.buffers.iter()
    }

    /// Buffers currently leased.
    pub fn iter_active(&self) -> impl Iterator<Item = &TrailBuffer> {
        self.buffers.iter().filter(|b| !b.is_available())
    }

    pub fn active_count(&self) -> usize {
        self.iter_active().count()
    }

    pub fn available_count(&self) -> usize {
        self.size() - self.active_count()
    }

    pub fn stats(&self) -> PoolStats {
        let active = self.active_count();
        PoolStats {
            total: self.size(),
            active,
            available: self.size() - active,
        }
    }
}

impl Default for TrailPool {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_pool_is_fully_available() {
        let pool = TrailPool::new(4, 10);
        assert_eq!(pool.stats(), PoolStats { total: 4, active: 0, available: 4 });
        assert!(pool.iter().all(|b| b.is_empty()));
    }

    #[test]
    fn acquire_takes_first_free_buffer() {
        let mut pool = TrailPool::new(3, 10);
        assert_eq!(pool.acquire(StarId(7)), Some(TrailId(0)));
        assert_eq!(pool.acquire(StarId(8)), Some(TrailId(1)));
        pool.release(TrailId(0));
        assert_eq!(pool.acquire(StarId(9)), Some(TrailId(0)));
        assert_eq!(pool.get(TrailId(0)).unwrap().owner(), Some(StarId(9)));
    }

    #[test]
    fn exhausted_pool_returns_none() {
        let mut pool = TrailPool::new(1, 10);
        assert!(pool.acquire(StarId(1)).is_some());
        assert_eq!(pool.acquire(StarId(2)), None);
        assert_eq!(pool.stats(), PoolStats { total: 1, active: 1, available: 0 });
    }

    #[test]
    fn empty_pool_never_leases() {
        let mut pool = TrailPool::empty();
        assert_eq!(pool.acquire(StarId(0)), None);
    }

    #[test]
    fn release_clears_owner_and_points() {
        let mut pool = TrailPool::new(1, 10);
        let id = pool.acquire(StarId(3)).unwrap();
        pool.push_point(id, Vec2::new(1.0, 2.0));
        pool.release(id);
        let buffer = pool.get(id).unwrap();
        assert!(buffer.is_available());
        assert_eq!(buffer.owner(), None);
        assert!(buffer.is_empty());
    }

    #[test]
    fn cap_keeps_most_recent_points_in_order() {
        let cap = 5;
        let mut pool = TrailPool::new(1, cap);
        let id = pool.acquire(StarId(0)).unwrap();
        for i in 0..(cap + 3) {
            pool.push_point(id, Vec2::new(i as f32, 0.0));
        }
        let xs: Vec<f32> = pool.get(id).unwrap().points().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn points_pushed_to_available_buffer_are_dropped() {
        let mut pool = TrailPool::new(1, 5);
        pool.push_point(TrailId(0), Vec2::ZERO);
        assert!(pool.get(TrailId(0)).unwrap().is_empty());
    }

    #[test]
    fn lowering_cap_trims_oldest_points() {
        let mut pool = TrailPool::new(1, 10);
        let id = pool.acquire(StarId(0)).unwrap();
        for i in 0..6 {
            pool.push_point(id, Vec2::new(i as f32, 0.0));
        }
        pool.set_max_points(2);
        let xs: Vec<f32> = pool.get(id).unwrap().points().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![4.0, 5.0]);
    }

    #[test]
    fn release_of_unknown_id_is_ignored() {
        let mut pool = TrailPool::new(1, 5);
        pool.release(TrailId(42));
        assert_eq!(pool.available_count(), 1);
    }
}
