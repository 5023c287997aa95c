//! The reference model: an order-preserving expected-value queue.
//!
//! Values offered on the input side are appended; values observed on the
//! output side are compared against the front and removed. Strict FIFO order
//! is the only accepted semantics — no reordering, merging, or speculative
//! matching. The two ends are written by different watcher tasks, but each
//! end has exactly one writer, which is what makes the shared `RefCell`
//! handle safe without further coordination.

use rvbench_common::{BenchError, BenchResult};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tracing::trace;

/// A scoreboard handle shared between the two orchestrator watchers.
pub type SharedScoreboard = Rc<RefCell<Scoreboard>>;

/// Order-preserving record of offered values awaiting observation.
#[derive(Debug, Default)]
pub struct Scoreboard {
    queue: VecDeque<u64>,
    offered: u64,
    observed: u64,
}

impl Scoreboard {
    /// Creates an empty scoreboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty scoreboard behind a shared handle.
    pub fn shared() -> SharedScoreboard {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Records a completed input-side transfer.
    ///
    /// Called exactly once per input-side handshake, by the input watcher.
    pub fn record_offered(&mut self, value: u64) {
        trace!(value, ordinal = self.offered, "offered");
        self.queue.push_back(value);
        self.offered += 1;
    }

    /// Records a completed output-side transfer and checks it.
    ///
    /// An observation with an empty queue is an underflow (output produced
    /// without corresponding input); a value differing from the front of the
    /// queue is a correctness mismatch. Both are fatal.
    pub fn record_observed(&mut self, value: u64, time_fs: u64) -> BenchResult<()> {
        let expected = self.queue.pop_front().ok_or(BenchError::Underflow {
            time_fs,
            observed: value,
        })?;
        if expected != value {
            return Err(BenchError::Mismatch {
                index: self.observed,
                expected,
                got: value,
            });
        }
        trace!(value, ordinal = self.observed, "observed");
        self.observed += 1;
        Ok(())
    }

    /// The number of offered values not yet observed.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Total input-side transfers recorded.
    pub fn offered(&self) -> u64 {
        self.offered
    }

    /// Total output-side transfers recorded.
    pub fn observed(&self) -> u64 {
        self.observed
    }
}
