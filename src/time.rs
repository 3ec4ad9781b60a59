//! Frame timing for diagnostics.
//!
//! The animation is frame-stepped, not time-stepped: stars move a fixed
//! amount per frame whatever the cadence. `FrameClock` only counts frames
//! and measures the achieved rate so the host can log it.
//!
//! ```ignore
//! let mut clock = FrameClock::new(Instant::now());
//! if let Some(fps) = clock.tick(Instant::now()) {
//!     log::debug!("{:.1} fps", fps);
//! }
//! ```

use std::time::{Duration, Instant};

/// Frame counter with a periodically refreshed FPS figure.
#[derive(Debug)]
pub struct FrameClock {
    /// When the clock was created.
    start: Instant,
    /// Total frames since start.
    frame_count: u64,
    /// Most recent FPS measurement.
    fps: f32,
    /// Frame count at the last FPS measurement.
    fps_frame_count: u64,
    /// Time of the last FPS measurement.
    fps_update_time: Instant,
    /// How often the FPS figure is refreshed.
    fps_update_interval: Duration,
}

impl FrameClock {
    pub fn new(now: Instant) -> Self {
        Self::with_interval(now, Duration::from_secs(5))
    }

    /// Clock refreshing its FPS figure every `interval`.
    pub fn with_interval(now: Instant, interval: Duration) -> Self {
        Self {
            start: now,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: interval,
        }
    }

    /// Record a frame at `now`. Returns the new FPS figure when one was just
    /// measured.
    pub fn tick(&mut self, now: Instant) -> Option<f32> {
        self.frame_count += 1;

        let since = now.saturating_duration_since(self.fps_update_time);
        if since < self.fps_update_interval || since.is_zero() {
            return None;
        }

        let frames = self.frame_count - self.fps_frame_count;
        self.fps = frames as f32 / since.as_secs_f32();
        self.fps_frame_count = self.frame_count;
        self.fps_update_time = now;
        Some(self.fps)
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Last measured frames per second, 0.0 before the first measurement.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Time since the clock was created.
    #[inline]
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.start)
    }
}
