/// Largest frame delta fed to the simulation, in seconds. Longer frames are
/// clamped so a stalled tab does not fling stars across their orbits.
pub const MAX_FRAME_DT: f32 = 0.033;

/// Length of one FPS sampling window in milliseconds.
pub const FPS_WINDOW_MS: f64 = 1000.0;

/// Turns host timestamps into clamped frame deltas.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    /// Timestamp of the previous tick, `None` right after a reset.
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous timestamp. The next `advance` returns 0.
    pub fn reset(&mut self) {
        self.last_ms = None;
    }

    /// Record `now_ms` and return the elapsed seconds since the previous
    /// tick, clamped to `[0, MAX_FRAME_DT]`.
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => (((now_ms - last) / 1000.0) as f32).clamp(0.0, MAX_FRAME_DT),
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        dt
    }
}

/// Counts frames per fixed window; the reading updates once per window.
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    window_start_ms: Option<f64>,
    frames: u32,
    fps: u32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, now_ms: f64) {
        let start = *self.window_start_ms.get_or_insert(now_ms);
        self.frames += 1;
        if now_ms - start >= FPS_WINDOW_MS {
            self.fps = self.frames;
            self.frames = 0;
            self.window_start_ms = Some(now_ms);
        }
    }

    /// Frames counted in the last completed window.
    pub fn fps(&self) -> u32 {
        self.fps
    }
}
