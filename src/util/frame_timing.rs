//! Frame limiter and smoothed frame-rate counter for the HUD.

use web_time::{Duration, Instant};

/// Weight of the newest sample in the FPS moving average.
const FPS_SMOOTHING: f32 = 0.05;

/// Caps the redraw rate and tracks a smoothed FPS.
pub struct FrameTiming {
    /// Target FPS (0 = unlimited).
    target_fps: u32,
    min_frame_duration: Duration,
    last_frame: Instant,
    smoothed_fps: f32,
}

impl FrameTiming {
    /// Create a frame timer with the given FPS target (0 = unlimited).
    pub fn new(target_fps: u32) -> Self {
        Self {
            target_fps,
            min_frame_duration: min_frame_duration(target_fps),
            last_frame: Instant::now(),
            smoothed_fps: if target_fps > 0 {
                target_fps as f32
            } else {
                60.0
            },
        }
    }

    /// Whether enough time has passed since the last frame to draw again.
    pub fn should_render(&self) -> bool {
        self.ready_at(Instant::now())
    }

    /// Mark a frame as drawn and fold its duration into the FPS average.
    pub fn end_frame(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.record(dt);
    }

    /// Smoothed frames per second.
    pub const fn fps(&self) -> f32 {
        self.smoothed_fps
    }

    fn ready_at(&self, now: Instant) -> bool {
        self.target_fps == 0
            || now.duration_since(self.last_frame) >= self.min_frame_duration
    }

    fn record(&mut self, dt: f32) {
        if dt > 0.0 {
            self.smoothed_fps = self.smoothed_fps * (1.0 - FPS_SMOOTHING)
                + FPS_SMOOTHING / dt;
        }
    }
}

fn min_frame_duration(target_fps: u32) -> Duration {
    if target_fps > 0 {
        Duration::from_secs_f64(1.0 / f64::from(target_fps))
    } else {
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_always_renders() {
        let timing = FrameTiming::new(0);
        assert!(timing.should_render());
        assert!(timing.ready_at(timing.last_frame));
    }

    #[test]
    fn capped_timer_waits_for_the_frame_interval() {
        let timing = FrameTiming::new(60);
        let start = timing.last_frame;
        assert!(!timing.ready_at(start + Duration::from_millis(5)));
        assert!(timing.ready_at(start + Duration::from_millis(17)));
    }

    #[test]
    fn fps_converges_towards_the_observed_rate() {
        let mut timing = FrameTiming::new(60);
        for _ in 0..500 {
            timing.record(1.0 / 30.0);
        }
        assert!((timing.fps() - 30.0).abs() < 0.5, "{}", timing.fps());
    }

    #[test]
    fn zero_dt_is_ignored() {
        let mut timing = FrameTiming::new(60);
        timing.record(0.0);
        assert_eq!(timing.fps(), 60.0);
    }
}
