/// Engine ticks per real-time second.
pub const TICKS_PER_SECOND: u64 = 20;

/// Tracks simulation time as a monotonic tick counter.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    tick: u64,
}

impl SimClock {
    /// Create a new clock at tick 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by one tick. Returns the new tick number.
    pub fn advance(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Return the current tick number.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Real time covered by the elapsed ticks.
    pub fn elapsed_seconds(&self) -> f64 {
        self.tick as f64 / TICKS_PER_SECOND as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_initial_state() {
        let clock = SimClock::new();
        assert_eq!(clock.tick(), 0);
        assert_eq!(clock.elapsed_seconds(), 0.0);
    }

    #[test]
    fn clock_advance_increments() {
        let mut clock = SimClock::new();
        clock.advance();
        clock.advance();
        assert_eq!(clock.advance(), 3);
        assert!((clock.elapsed_seconds() - 0.15).abs() < f64::EPSILON);
    }
}
