//! Stimulus generators: random data values and per-cycle throttle decisions.
//!
//! Generators are pure decision functions over a shared pseudo-random
//! source. The source is created once per scenario run from the configured
//! seed and passed in explicitly, so runs replay bit-for-bit.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rvbench_common::{BenchError, BenchResult};
use std::cell::RefCell;
use std::rc::Rc;

/// The random source shared by every generator of one scenario run.
pub type SharedRng = Rc<RefCell<StdRng>>;

/// Creates the shared random source for one scenario run.
pub fn seeded_rng(seed: u64) -> SharedRng {
    Rc::new(RefCell::new(StdRng::seed_from_u64(seed)))
}

/// Draws uniformly random data values of a fixed bit width.
#[derive(Clone)]
pub struct DataGenerator {
    width: u32,
    rng: SharedRng,
}

impl DataGenerator {
    /// Creates a generator for `width`-bit values (1..=64).
    pub fn new(width: u32, rng: SharedRng) -> Self {
        Self { width, rng }
    }

    /// The configured bit width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns a uniformly random value in `[0, 2^width - 1]`.
    pub fn generate(&self) -> u64 {
        let max = if self.width >= 64 {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        };
        self.rng.borrow_mut().gen_range(0..=max)
    }
}

/// Draws per-cycle throttle decisions approximating a target rate.
///
/// A rate of 0 never asserts; otherwise each call draws a uniform integer in
/// `[1, round(1/rate)]` and asserts iff it is 1, so a rate of 1 always
/// asserts.
#[derive(Clone)]
pub struct RateGenerator {
    /// `round(1/rate)`, or 0 for "never assert".
    interval: u64,
    rng: SharedRng,
}

impl RateGenerator {
    /// Creates a generator for the given rate in `[0, 1]`.
    pub fn new(rate: f64, rng: SharedRng) -> BenchResult<Self> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(BenchError::Config(format!(
                "throttle rate must be in [0, 1], got {rate}"
            )));
        }
        let interval = if rate == 0.0 {
            0
        } else {
            (1.0 / rate).round() as u64
        };
        Ok(Self { interval, rng })
    }

    /// Draws one throttle decision.
    pub fn generate(&self) -> bool {
        if self.interval == 0 {
            return false;
        }
        self.rng.borrow_mut().gen_range(1..=self.interval) == 1
    }
}
