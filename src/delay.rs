//! Injectable delay sources for simulated task work.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces the duration of the next simulated unit of work.
///
/// Each worker owns its own source, so implementations need not be `Sync`.
pub trait DelaySource {
    fn next_delay(&mut self) -> Duration;
}

/// Inclusive range of simulated work durations, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// A range that always yields the same duration.
    pub const fn fixed(ms: u64) -> Self {
        Self::new(ms, ms)
    }

    pub fn is_valid(&self) -> bool {
        self.min_ms <= self.max_ms
    }
}

/// Uniformly random delays within a [`DelayRange`].
pub struct RandomDelay<R> {
    rng: R,
    range: DelayRange,
}

impl<R: Rng> RandomDelay<R> {
    pub fn new(rng: R, range: DelayRange) -> Self {
        debug_assert!(range.is_valid(), "delay range min > max");
        Self { rng, range }
    }
}

impl RandomDelay<StdRng> {
    /// Deterministic source for a fixed seed.
    pub fn seeded(seed: u64, range: DelayRange) -> Self {
        Self::new(StdRng::seed_from_u64(seed), range)
    }

    /// Derive an independent source from a parent generator.
    pub fn derive<P: Rng>(parent: &mut P, range: DelayRange) -> Self {
        Self::new(StdRng::from_rng(parent), range)
    }
}

impl<R: Rng> DelaySource for RandomDelay<R> {
    fn next_delay(&mut self) -> Duration {
        let DelayRange { min_ms, max_ms } = self.range;
        if min_ms >= max_ms {
            return Duration::from_millis(min_ms);
        }
        Duration::from_millis(self.rng.random_range(min_ms..=max_ms))
    }
}

/// Always yields the same delay; used where timing must not vary.
#[derive(Clone, Copy, Debug)]
pub struct FixedDelay(Duration);

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self(delay)
    }
}

impl DelaySource for FixedDelay {
    fn next_delay(&mut self) -> Duration {
        self.0
    }
}
