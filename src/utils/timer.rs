//! Delta-driven timers. Each one accumulates the frame delta it is given and
//! decides on its own when to fire.

/// Fires once every `period` seconds.
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    period: f32,
    accumulator: f32,
}

impl Interval {
    #[must_use]
    pub fn new(period: f32) -> Self {
        Self {
            period: period.max(f32::EPSILON),
            accumulator: 0.0,
        }
    }

    /// Returns true when a period boundary was crossed. A delta spanning
    /// several periods still fires only once.
    pub fn tick(&mut self, delta: f32) -> bool {
        self.accumulator += delta;
        if self.accumulator >= self.period {
            self.accumulator %= self.period;
            true
        } else {
            false
        }
    }
}

/// Fires once, `duration` seconds after [`start`](Self::start).
#[derive(Debug, Clone, Copy)]
pub struct Countdown {
    duration: f32,
    elapsed: f32,
    active: bool,
}

impl Countdown {
    /// Creates an inactive countdown.
    #[must_use]
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            elapsed: 0.0,
            active: false,
        }
    }

    pub fn start(&mut self) {
        self.elapsed = 0.0;
        self.active = true;
    }

    pub fn cancel(&mut self) {
        self.active = false;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns true on the tick that completes the countdown.
    pub fn tick(&mut self, delta: f32) -> bool {
        if !self.active {
            return false;
        }

        self.elapsed += delta;
        if self.elapsed >= self.duration {
            self.active = false;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_fires_each_period() {
        let mut interval = Interval::new(5.0);
        assert!(!interval.tick(4.0));
        assert!(interval.tick(1.5));
        assert!(!interval.tick(3.0));
        assert!(interval.tick(1.5));
    }

    #[test]
    fn interval_fires_once_for_long_frames() {
        let mut interval = Interval::new(1.0);
        assert!(interval.tick(3.5));
        assert!(!interval.tick(0.25));
        assert!(interval.tick(0.25));
    }

    #[test]
    fn countdown_fires_once() {
        let mut timer = Countdown::new(1.0);
        assert!(!timer.tick(0.5));

        timer.start();
        assert!(!timer.tick(0.5));
        assert!(timer.is_active());

        assert!(timer.tick(0.6));
        assert!(!timer.tick(0.1));
        assert!(!timer.is_active());
    }

    #[test]
    fn cancelled_countdown_never_fires() {
        let mut timer = Countdown::new(1.0);
        timer.start();
        timer.cancel();
        assert!(!timer.tick(2.0));
    }
}
