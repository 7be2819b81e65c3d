//! Frame-driven animation loop.
//!
//! The host owns the actual scheduling primitive (a display-refresh
//! callback) and the visibility signal; the loop only decides when a next
//! frame is wanted and what each tick does.

use super::starfield::Starfield;
use super::time::{FpsCounter, FrameClock};
use crate::renderer::instance::FrameBuffer;

/// Host capability for scheduling the next tick.
pub trait FrameScheduler {
    /// Ask for one more tick on the next display refresh.
    fn request_frame(&mut self);
    /// Drop a pending request, if any.
    fn cancel_frame(&mut self);
}

pub struct AnimationLoop<S: FrameScheduler> {
    scheduler: S,
    clock: FrameClock,
    fps: FpsCounter,
    running: bool,
    hidden: bool,
    reduced_motion: bool,
}

impl<S: FrameScheduler> AnimationLoop<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            clock: FrameClock::new(),
            fps: FpsCounter::new(),
            running: false,
            hidden: false,
            reduced_motion: false,
        }
    }

    /// (Re)start the loop: drop any pending frame, reset timing so the
    /// next tick sees dt = 0, and request a frame. Does nothing while
    /// hidden.
    pub fn start(&mut self) {
        self.scheduler.cancel_frame();
        self.clock.reset();
        if self.hidden {
            self.running = false;
            return;
        }
        self.running = true;
        self.scheduler.request_frame();
    }

    pub fn stop(&mut self) {
        self.scheduler.cancel_frame();
        self.running = false;
    }

    /// Hidden views get no ticks; becoming visible restarts with a fresh
    /// clock.
    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
        if hidden {
            self.stop();
        } else {
            self.start();
        }
    }

    pub fn set_reduced_motion(&mut self, reduced_motion: bool) {
        self.reduced_motion = reduced_motion;
    }

    /// Run one tick at host time `now_ms`. Returns `true` if another frame
    /// was requested.
    pub fn tick(&mut self, now_ms: f64, starfield: &mut Starfield, frame: &mut FrameBuffer) -> bool {
        if !self.running {
            return false;
        }

        let dt = self.clock.advance(now_ms);
        self.fps.record(now_ms);

        if self.reduced_motion {
            starfield.build_static_frame(frame);
        } else {
            starfield.update(dt);
            starfield.build_frame((now_ms / 1000.0) as f32, frame);
        }

        if self.hidden {
            return false;
        }
        self.scheduler.request_frame();
        true
    }

    pub fn fps(&self) -> u32 {
        self.fps.fps()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::StarfieldConfig;
    use crate::api::types::Viewport;

    #[derive(Default)]
    struct MockScheduler {
        pending: bool,
        requests: u32,
        cancels: u32,
    }

    impl FrameScheduler for MockScheduler {
        fn request_frame(&mut self) {
            self.pending = true;
            self.requests += 1;
        }
        fn cancel_frame(&mut self) {
            self.pending = false;
            self.cancels += 1;
        }
    }

    fn field() -> Starfield {
        Starfield::new(Viewport::new(400.0, 300.0), StarfieldConfig::default(), 3)
    }

    fn angles(field: &Starfield) -> Vec<f32> {
        field.stars().iter().map(|s| s.angle).collect()
    }

    #[test]
    fn tick_before_start_does_nothing() {
        let mut lp = AnimationLoop::new(MockScheduler::default());
        let mut sf = field();
        let mut frame = FrameBuffer::new();
        assert!(!lp.tick(0.0, &mut sf, &mut frame));
        assert_eq!(frame.frame_counter, 0);
    }

    #[test]
    fn first_tick_uses_zero_dt_then_clamps() {
        let mut lp = AnimationLoop::new(MockScheduler::default());
        let mut sf = field();
        let mut frame = FrameBuffer::new();
        let before = angles(&sf);

        lp.start();
        assert!(lp.scheduler().pending);
        assert!(lp.tick(1000.0, &mut sf, &mut frame));
        assert_eq!(angles(&sf), before);

        // A 5 s stall advances by the 33 ms clamp only.
        lp.tick(6000.0, &mut sf, &mut frame);
        for (star, a0) in sf.stars().iter().zip(&before) {
            let moved = (star.angle - a0).rem_euclid(std::f32::consts::TAU);
            assert!((moved - star.angular_velocity() * 0.033).abs() < 1e-5);
        }
    }

    #[test]
    fn hidden_stops_requesting_and_resume_resets_clock() {
        let mut lp = AnimationLoop::new(MockScheduler::default());
        let mut sf = field();
        let mut frame = FrameBuffer::new();
        lp.start();
        lp.tick(0.0, &mut sf, &mut frame);

        lp.set_hidden(true);
        assert!(!lp.is_running());
        assert!(!lp.scheduler().pending);
        assert!(!lp.tick(16.0, &mut sf, &mut frame));

        lp.set_hidden(false);
        assert!(lp.is_running());
        assert!(lp.scheduler().pending);
        let before = angles(&sf);
        lp.tick(60_000.0, &mut sf, &mut frame);
        assert_eq!(angles(&sf), before);
    }

    #[test]
    fn start_while_hidden_stays_stopped() {
        let mut lp = AnimationLoop::new(MockScheduler::default());
        lp.set_hidden(true);
        lp.start();
        assert!(!lp.is_running());
        assert_eq!(lp.scheduler().requests, 0);
    }

    #[test]
    fn reduced_motion_freezes_angles_and_keeps_scheduling() {
        let mut lp = AnimationLoop::new(MockScheduler::default());
        let mut sf = field();
        let mut frame = FrameBuffer::new();
        lp.set_reduced_motion(true);
        lp.start();
        let before = angles(&sf);
        for i in 0..5 {
            assert!(lp.tick(i as f64 * 16.0, &mut sf, &mut frame));
        }
        assert_eq!(angles(&sf), before);
        assert!(frame.ambient.is_none());
        assert_eq!(frame.circles.len(), sf.stars().len());
        assert_eq!(sf.pool().active_count(), 0);
    }

    #[test]
    fn restart_cancels_pending_frame() {
        let mut lp = AnimationLoop::new(MockScheduler::default());
        lp.start();
        lp.start();
        assert_eq!(lp.scheduler().cancels, 2);
        assert_eq!(lp.scheduler().requests, 2);
    }
}
