//! Rate limiting utilities

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter type alias
pub type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Create a rate limiter with the specified messages per second
pub fn create_limiter(per_second: u32) -> Arc<Limiter> {
    let quota = Quota::per_second(NonZeroU32::new(per_second).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

/// Default cap on input messages per second
pub const INPUT_RATE_LIMIT: u32 = 600;

/// Flood protection for the input pump
#[derive(Clone)]
pub struct InputRateLimiter {
    limiter: Arc<Limiter>,
    /// Messages rejected so far
    dropped: u64,
}

impl InputRateLimiter {
    pub fn new(per_second: u32) -> Self {
        Self {
            limiter: create_limiter(per_second),
            dropped: 0,
        }
    }

    /// Check if an input message is allowed (returns true if allowed)
    pub fn check_input(&mut self) -> bool {
        let allowed = self.limiter.check().is_ok();
        if !allowed {
            self.dropped += 1;
        }
        allowed
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Default for InputRateLimiter {
    fn default() -> Self {
        Self::new(INPUT_RATE_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_is_capped() {
        let mut limiter = InputRateLimiter::new(5);
        let allowed = (0..20).filter(|_| limiter.check_input()).count();
        assert_eq!(allowed, 5);
        assert_eq!(limiter.dropped(), 15);
    }

    #[test]
    fn zero_rate_still_admits_one() {
        let mut limiter = InputRateLimiter::new(0);
        assert!(limiter.check_input());
    }
}
