use std::time::{Duration, Instant};

/// Measures the wall-clock time between frames.
///
/// Deltas are capped at `max_delta`, so a stall such as a window drag does
/// not fast-forward animations or the auto-resume schedule.
#[derive(Debug)]
pub struct FrameClock {
    last_frame: Instant,
    max_delta: Duration,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}

impl FrameClock {
    #[must_use]
    pub fn new(max_delta: Duration) -> Self {
        Self {
            last_frame: Instant::now(),
            max_delta,
        }
    }

    /// Seconds since the previous call (or since construction).
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame);
        self.last_frame = now;
        delta.min(self.max_delta).as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_is_capped() {
        let mut clock = FrameClock::new(Duration::ZERO);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(clock.tick(), 0.0);
    }

    #[test]
    fn consecutive_ticks_are_small() {
        let mut clock = FrameClock::default();
        clock.tick();
        assert!(clock.tick() < 0.25);
    }
}
