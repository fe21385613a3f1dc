use std::time::Duration;

/// Gates simulation advances on accumulated frame time, independent of render cadence.
#[derive(Clone, Debug)]
pub struct TickClock {
    interval: Duration,
    elapsed: Duration,
}

impl TickClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Add one frame's delta. Returns true when a tick is due; the accumulator
    /// then restarts from zero, so a long stall yields a single tick.
    pub fn advance(&mut self, frame_delta: Duration) -> bool {
        self.elapsed = self.elapsed.saturating_add(frame_delta);
        if self.elapsed >= self.interval {
            self.elapsed = Duration::ZERO;
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
    fn ticks_only_after_interval_accumulates() {
        let mut clock = TickClock::new(Duration::from_millis(200));
        let frame = Duration::from_micros(16_667);
        let mut ticks = 0;
        for _ in 0..11 {
            if clock.advance(frame) {
                ticks += 1;
            }
        }
        assert_eq!(ticks, 0);
        assert!(clock.advance(frame));
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }

    #[test]
    fn long_stall_produces_one_tick() {
        let mut clock = TickClock::new(Duration::from_millis(200));
        assert!(clock.advance(Duration::from_secs(1)));
        assert!(!clock.advance(Duration::from_millis(10)));
    }

    #[test]
    fn exact_interval_is_due() {
        let mut clock = TickClock::new(Duration::from_millis(200));
        assert!(clock.advance(Duration::from_millis(200)));
    }
}
