//! Frame timing: seconds since program start plus an optional cap.

use std::time::{Duration, Instant};

/// Samples wall time once per frame and enforces the configured maximum
/// framerate by sleeping out the remainder of each frame's budget.
pub struct FrameClock {
    start: Instant,
    frame_start: Instant,
    time_previous_frame: f32,
    time_current_frame: f32,
    min_frame_time: Duration,
}

impl FrameClock {
    /// `max_framerate` of zero (or less) disables throttling.
    pub fn new(max_framerate: f32) -> Self {
        let min_frame_time = if max_framerate > 0.0 {
            Duration::from_secs_f32(1.0 / max_framerate)
        } else {
            Duration::ZERO
        };
        let now = Instant::now();
        Self {
            start: now,
            frame_start: now,
            time_previous_frame: 0.0,
            time_current_frame: 0.0,
            min_frame_time,
        }
    }

    /// Samples the clock at the top of a frame. The previous sample is
    /// kept so shading modes can see both frame times.
    pub fn begin_frame(&mut self) {
        self.frame_start = Instant::now();
        self.time_previous_frame = self.time_current_frame;
        self.time_current_frame = (self.frame_start - self.start).as_secs_f32();
    }

    pub fn time_previous_frame(&self) -> f32 {
        self.time_previous_frame
    }

    pub fn time_current_frame(&self) -> f32 {
        self.time_current_frame
    }

    /// Seconds between the last two `begin_frame` samples.
    pub fn delta(&self) -> f32 {
        self.time_current_frame - self.time_previous_frame
    }

    /// Sleeps away whatever remains of this frame's budget.
    pub fn throttle(&self) {
        if self.min_frame_time.is_zero() {
            return;
        }
        let spent = self.frame_start.elapsed();
        if let Some(remaining) = self.min_frame_time.checked_sub(spent) {
            std::thread::sleep(remaining);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_starts_from_zero() {
        let mut clock = FrameClock::new(0.0);
        clock.begin_frame();
        assert_eq!(clock.time_previous_frame(), 0.0);
        assert!(clock.time_current_frame() >= 0.0);
    }

    #[test]
    fn frames_advance_monotonically() {
        let mut clock = FrameClock::new(0.0);
        clock.begin_frame();
        std::thread::sleep(Duration::from_millis(5));
        let first = clock.time_current_frame();
        clock.begin_frame();
        assert_eq!(clock.time_previous_frame(), first);
        assert!(clock.time_current_frame() > first);
        assert!(clock.delta() > 0.0);
    }

    #[test]
    fn throttle_holds_a_frame_to_its_budget() {
        let mut clock = FrameClock::new(100.0);
        clock.begin_frame();
        clock.throttle();
        // A 100 fps cap means at least ~10ms per frame; allow slack for
        // coarse sleep granularity.
        assert!(clock.frame_start.elapsed() >= Duration::from_millis(8));
    }

    #[test]
    fn uncapped_clock_does_not_block() {
        let mut clock = FrameClock::new(0.0);
        clock.begin_frame();
        let before = Instant::now();
        clock.throttle();
        assert!(before.elapsed() < Duration::from_millis(50));
    }
}
