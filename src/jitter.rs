//! Additive jitter sources for retry delays.
//!
//! The backoff formula adds a random term bounded by one base unit on top of the exponential
//! component. `Jitter` decides where that term comes from:
//! - `Uniform`: uniform in `[0, base]` from `rand`'s thread-local RNG (production default).
//! - `None`: always zero, for deterministic schedules.
//! - `Fixed`: a constant offset clamped to `[0, base]`, so tests can re-derive exact delays.
//!
//! Deterministic RNGs can also be injected through [`Jitter::sample_with_rng`].

use rand::{rng, Rng};
use std::time::Duration;

/// Source of the additive jitter term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Jitter {
    /// Random in `[0, base]`.
    #[default]
    Uniform,
    /// No jitter.
    None,
    /// Constant offset, clamped to `[0, base]`.
    Fixed(Duration),
}

impl Jitter {
    pub fn uniform() -> Self {
        Jitter::Uniform
    }

    pub fn fixed(offset: Duration) -> Self {
        Jitter::Fixed(offset)
    }

    /// Draw the jitter term for a base unit of `base`.
    pub fn sample(&self, base: Duration) -> Duration {
        let mut rng = rng();
        self.sample_with_rng(base, &mut rng)
    }

    /// Draw the jitter term with a caller-supplied RNG.
    pub fn sample_with_rng<R: Rng>(&self, base: Duration, rng: &mut R) -> Duration {
        match self {
            Jitter::None => Duration::ZERO,
            Jitter::Fixed(offset) => (*offset).min(base),
            Jitter::Uniform => {
                let millis = as_millis_saturated(base);
                if millis == 0 {
                    return Duration::ZERO;
                }
                Duration::from_millis(rng.random_range(0..=millis))
            }
        }
    }
}

pub(crate) fn as_millis_saturated(duration: Duration) -> u64 {
    duration.as_millis().try_into().unwrap_or(u64::MAX)
}
