//! Exponential backoff with additive jitter.
//!
//! `delay(attempt) = min(base * 2^attempt + jitter(0..=base), cap)` where `attempt` is the
//! zero-based index of the attempt that just failed and `cap` defaults to [`MAX_BACKOFF`].
//!
//! ```rust
//! use std::time::Duration;
//! use pulse_client::{Backoff, Jitter};
//!
//! let backoff = Backoff::new(Duration::from_millis(1000));
//! assert_eq!(backoff.delay_with_jitter(0, Jitter::None), Duration::from_millis(1000));
//! assert_eq!(backoff.delay_with_jitter(2, Jitter::None), Duration::from_millis(4000));
//! assert_eq!(backoff.delay_with_jitter(10, Jitter::None), Duration::from_secs(30)); // capped
//! ```
//!
//! Overflow behavior: the exponential term saturates before the cap is applied, so very large
//! attempt indices return the cap instead of panicking.

use crate::jitter::{as_millis_saturated, Jitter};
use rand::Rng;
use std::time::Duration;

/// Upper bound on any computed wait between attempts.
pub const MAX_BACKOFF: Duration = Duration::from_millis(30_000);

/// Exponential backoff calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    cap: Duration,
    jitter: Jitter,
}

impl Backoff {
    /// Backoff with the given base unit, uniform jitter and the 30 s cap.
    pub fn new(base: Duration) -> Self {
        Self { base, cap: MAX_BACKOFF, jitter: Jitter::Uniform }
    }

    /// Replace the jitter source.
    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    /// Override the cap. Values above [`MAX_BACKOFF`] are clamped.
    pub fn with_cap(mut self, cap: Duration) -> Self {
        self.cap = cap.min(MAX_BACKOFF);
        self
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn cap(&self) -> Duration {
        self.cap
    }

    pub fn jitter(&self) -> Jitter {
        self.jitter
    }

    /// Deterministic part of the delay: `min(base * 2^attempt, cap)`.
    pub fn exponential(&self, attempt: u32) -> Duration {
        let multiplier = 2u128.checked_pow(attempt).unwrap_or(u128::MAX);
        let millis = u128::from(as_millis_saturated(self.base)).saturating_mul(multiplier);
        let capped = millis.min(self.cap.as_millis());
        Duration::from_millis(capped as u64)
    }

    /// Full delay using the configured jitter source.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.delay_with_jitter(attempt, self.jitter)
    }

    /// Full delay using an explicit jitter source.
    pub fn delay_with_jitter(&self, attempt: u32, jitter: Jitter) -> Duration {
        let term = jitter.sample(self.base);
        self.combine(attempt, term)
    }

    /// Full delay drawing uniform jitter from `rng`.
    pub fn delay_with_rng<R: Rng>(&self, attempt: u32, rng: &mut R) -> Duration {
        let term = Jitter::Uniform.sample_with_rng(self.base, rng);
        self.combine(attempt, term)
    }

    fn combine(&self, attempt: u32, jitter: Duration) -> Duration {
        self.exponential(attempt).saturating_add(jitter).min(self.cap)
    }
}

/// One-shot form of the backoff formula with uniform jitter and the default cap.
pub fn delay(attempt: u32, base: Duration) -> Duration {
    Backoff::new(base).delay(attempt)
}
