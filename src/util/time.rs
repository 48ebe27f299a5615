//! Time utilities for game simulation

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Get current Unix timestamp in milliseconds
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}

/// Default tick rate configuration
pub const SIMULATION_TPS: u32 = 60; // 60 ticks per second
pub const MAX_SIMULATION_TPS: u32 = 240;

/// Fixed-step tick source.
///
/// Every simulation timer in the game counts ticks; the only place wall-clock
/// seconds appear is the match clock, which is advanced by `delta()` per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickClock {
    tps: u32,
}

impl TickClock {
    pub fn new(tps: u32) -> Self {
        Self {
            tps: tps.clamp(1, MAX_SIMULATION_TPS),
        }
    }

    pub fn tps(&self) -> u32 {
        self.tps
    }

    /// Seconds covered by one tick
    pub fn delta(&self) -> f32 {
        1.0 / self.tps as f32
    }

    /// Wall-clock pacing between ticks
    pub fn tick_duration(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.tps as u64)
    }

    /// Number of whole ticks needed to cover `duration` (rounded up)
    pub fn ticks_for(&self, duration: Duration) -> u32 {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        let ticks = micros.saturating_mul(self.tps as u64).div_ceil(1_000_000);
        u32::try_from(ticks).unwrap_or(u32::MAX)
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new(SIMULATION_TPS)
    }
}

/// A simple timer for measuring durations
#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_micros(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }

    pub fn reset(&mut self) {
        self.start = Instant::now();
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_clock_runs_at_sixty() {
        let clock = TickClock::default();
        assert_eq!(clock.tps(), 60);
        assert!((clock.delta() - 1.0 / 60.0).abs() < f32::EPSILON);
        assert_eq!(clock.tick_duration(), Duration::from_micros(16_666));
    }

    #[test]
    fn tick_rate_is_clamped() {
        assert_eq!(TickClock::new(0).tps(), 1);
        assert_eq!(TickClock::new(10_000).tps(), MAX_SIMULATION_TPS);
    }

    #[test]
    fn ticks_for_rounds_up() {
        let clock = TickClock::new(60);
        assert_eq!(clock.ticks_for(Duration::from_secs(2)), 120);
        assert_eq!(clock.ticks_for(Duration::from_millis(2001)), 121);
        assert_eq!(clock.ticks_for(Duration::ZERO), 0);

        let clock = TickClock::new(50);
        assert_eq!(clock.ticks_for(Duration::from_secs(2)), 100);
    }

    #[test]
    fn ticks_for_saturates_on_huge_durations() {
        let clock = TickClock::new(MAX_SIMULATION_TPS);
        assert_eq!(clock.ticks_for(Duration::from_millis(400_000_000_000_000)), u32::MAX);
        assert_eq!(clock.ticks_for(Duration::MAX), u32::MAX);
    }
}
