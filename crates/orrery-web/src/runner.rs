use orrery_engine::{
    AnimationLoop, FrameBuffer, FrameScheduler, OpacityUpdate, OrbitalInfo, Starfield,
    StarfieldConfig, StarsInfo, TrailInfo, Viewport,
};

/// Frame requests recorded for the JS host, which owns
/// `requestAnimationFrame` and polls [`HostScheduler::take_request`]
/// after each call into the module.
#[derive(Debug, Default)]
pub struct HostScheduler {
    pending: bool,
}

impl HostScheduler {
    /// Whether a frame was requested since the last call. Clears the flag.
    pub fn take_request(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

impl FrameScheduler for HostScheduler {
    fn request_frame(&mut self) {
        self.pending = true;
    }

    fn cancel_frame(&mut self) {
        self.pending = false;
    }
}

/// Owns the starfield, its frame buffer and the animation loop.
///
/// The crate root keeps one runner in a `thread_local!` and exports free
/// functions around it, because wasm-bindgen cannot export generic structs.
pub struct StarfieldRunner {
    starfield: Starfield,
    frame: FrameBuffer,
    driver: AnimationLoop<HostScheduler>,
}

impl StarfieldRunner {
    pub fn new(viewport: Viewport, config: StarfieldConfig, seed: u64) -> Self {
        Self {
            starfield: Starfield::new(viewport, config, seed),
            frame: FrameBuffer::new(),
            driver: AnimationLoop::new(HostScheduler::default()),
        }
    }

    pub fn start(&mut self) {
        self.driver.start();
    }

    /// Run one tick at host time `now_ms`.
    pub fn tick(&mut self, now_ms: f64) {
        self.driver.tick(now_ms, &mut self.starfield, &mut self.frame);
    }

    pub fn take_frame_request(&mut self) -> bool {
        self.driver.scheduler_mut().take_request()
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.driver.set_hidden(hidden);
    }

    pub fn set_reduced_motion(&mut self, reduced_motion: bool) {
        self.driver.set_reduced_motion(reduced_motion);
    }

    pub fn fps(&self) -> u32 {
        self.driver.fps()
    }

    /// A regenerated field restarts the loop with a fresh clock.
    fn restart(&mut self) {
        if self.driver.is_running() {
            self.driver.start();
        }
    }

    // ---- Reconfiguration ----

    pub fn resize(&mut self, viewport: Viewport) {
        self.starfield.resize(viewport);
        self.restart();
    }

    pub fn set_count_range(&mut self, min: Option<usize>, max: Option<usize>) {
        self.starfield.set_count_range(min, max);
        self.restart();
    }

    pub fn set_size_range(&mut self, min: Option<f32>, max: Option<f32>) {
        self.starfield.set_size_range(min, max);
        self.restart();
    }

    pub fn set_opacity(&mut self, update: OpacityUpdate) {
        self.starfield.set_opacity(update);
        self.restart();
    }

    pub fn set_color(&mut self, r: Option<u8>, g: Option<u8>, b: Option<u8>) {
        self.starfield.set_color(r, g, b);
    }

    pub fn set_ambient_light(&mut self, enabled: Option<bool>, intensity: Option<f32>, max_radius: Option<f32>) {
        self.starfield.set_ambient_light(enabled, intensity, max_radius);
    }

    pub fn set_orbital_center(&mut self, x: f32, y: f32) {
        self.starfield.set_orbital_center(x, y);
        self.restart();
    }

    pub fn set_trail_config(&mut self, pool_percentage: Option<f32>, max_points: Option<usize>, fade_factor: Option<f32>) {
        self.starfield.set_trail_config(pool_percentage, max_points, fade_factor);
    }

    // ---- Queries ----

    pub fn orbital_info(&self) -> OrbitalInfo {
        self.starfield.orbital_info()
    }

    pub fn stars_info(&self) -> StarsInfo {
        self.starfield.stars_info()
    }

    pub fn trail_info(&self) -> TrailInfo {
        self.starfield.trail_info()
    }

    // ---- Pointer accessors ----

    pub fn circles_ptr(&self) -> *const f32 {
        self.frame.circles_ptr()
    }

    pub fn circle_count(&self) -> u32 {
        self.frame.circle_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> StarfieldRunner {
        StarfieldRunner::new(Viewport::new(640.0, 480.0), StarfieldConfig::default(), 1)
    }

    #[test]
    fn start_then_tick_keeps_requesting_frames() {
        let mut r = runner();
        assert!(!r.take_frame_request());
        r.start();
        assert!(r.take_frame_request());
        r.tick(0.0);
        assert!(r.take_frame_request());
        assert!(r.circle_count() > 0);
        assert!(!r.circles_ptr().is_null());
    }

    #[test]
    fn hidden_runner_stops_requesting() {
        let mut r = runner();
        r.start();
        r.set_hidden(true);
        assert!(!r.take_frame_request());
        r.tick(16.0);
        assert!(!r.take_frame_request());
        r.set_hidden(false);
        assert!(r.take_frame_request());
    }

    #[test]
    fn reconfiguring_a_stopped_runner_does_not_start_it() {
        let mut r = runner();
        r.set_orbital_center(0.5, 0.5);
        assert!(!r.take_frame_request());
        assert_eq!(r.orbital_info().center, [320.0, 240.0]);
    }
}
