//! Frame timing for demos and the window loop.
//!
//! Uses `std::time` for high-precision timing with no external dependencies.
//! The one opinionated piece is the delta clamp: a long stall (asset load,
//! window drag, debugger break) otherwise arrives as a single huge `dt` and
//! makes an emitter age out its whole pool and spawn a burst in one frame.
//! Deltas above [`Time::max_delta`] are truncated instead.
//!
//! # Example
//!
//! ```ignore
//! use embers::time::Time;
//!
//! let mut time = Time::new();
//!
//! // In your frame loop:
//! let (elapsed, delta) = time.update();
//! emitter.update(delta);
//! ```

use std::time::{Duration, Instant};

/// Default ceiling for one frame's delta, seconds.
const DEFAULT_MAX_DELTA: f32 = 0.25;

/// Frame clock with delta clamping, FPS tracking and optional fixed stepping.
#[derive(Debug)]
pub struct Time {
    /// When the last frame occurred.
    last_frame: Instant,
    /// Sum of all deltas handed out so far, seconds.
    elapsed_secs: f32,
    /// Delta of the most recent frame, seconds.
    delta_secs: f32,
    /// Total frames since start.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Time of last FPS calculation.
    fps_update_time: Instant,
    /// How often to update the FPS calculation.
    fps_update_interval: Duration,
    /// Largest delta a single frame may report.
    max_delta: f32,
    /// Fixed delta time for deterministic stepping (optional).
    fixed_delta: Option<f32>,
    /// Time scale multiplier (1.0 = normal speed).
    time_scale: f32,
}

impl Time {
    /// Creates a clock starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            max_delta: DEFAULT_MAX_DELTA,
            fixed_delta: None,
            time_scale: 1.0,
        }
    }

    /// Advances the clock. Call once per frame.
    ///
    /// Returns `(elapsed, delta)` in seconds. The delta is the wall-clock
    /// time since the previous call, clamped to [`max_delta`](Self::max_delta)
    /// and scaled by the time scale; elapsed is the running sum of returned
    /// deltas, so it honors clamping and scale changes.
    pub fn update(&mut self) -> (f32, f32) {
        let now = Instant::now();
        let raw_delta = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        let clamped = raw_delta.min(self.max_delta);
        self.delta_secs = self.fixed_delta.unwrap_or(clamped) * self.time_scale;
        self.elapsed_secs += self.delta_secs;
        self.frame_count += 1;

        // Update FPS periodically, from unclamped wall time.
        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        (self.elapsed_secs, self.delta_secs)
    }

    /// Total simulated seconds handed out so far.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Delta of the most recent frame in seconds.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Calculated frames per second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Largest delta a single frame may report.
    #[inline]
    pub fn max_delta(&self) -> f32 {
        self.max_delta
    }

    /// Current time scale multiplier.
    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Sets the per-frame delta ceiling in seconds.
    pub fn set_max_delta(&mut self, max_delta: f32) {
        self.max_delta = max_delta.max(0.0);
    }

    /// Sets a fixed delta time for deterministic stepping.
    ///
    /// Pass `None` to return to real frame timing. A fixed delta bypasses
    /// the clamp; it is already predictable.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }

    /// Sets the time scale multiplier.
    ///
    /// - `1.0` = normal speed
    /// - `0.5` = half speed (slow motion)
    /// - `2.0` = double speed
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Resets the clock to its initial state, keeping the configured
    /// max delta, fixed delta and time scale.
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.last_frame = now;
        self.elapsed_secs = 0.0;
        self.delta_secs = 0.0;
        self.frame_count = 0;
        self.fps = 0.0;
        self.fps_frame_count = 0;
        self.fps_update_time = now;
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
