//! Signal storage and clock-edge detection.
//!
//! Each line the harness reads or drives is a [`SignalState`] holding its
//! current and previous values. The previous value feeds edge detection:
//! an edge exists only between two definite levels, so the X-to-0 transition
//! a line makes when it is first driven does not register as an edge.

use rvbench_common::{Logic, LogicVec};
use serde::{Deserialize, Serialize};

/// Opaque ID for a signal registered with the kernel.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct SignalId(u32);

impl SignalId {
    /// Creates a `SignalId` from a raw index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A clock-edge direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    /// A 0-to-1 transition.
    Rising,
    /// A 1-to-0 transition.
    Falling,
}

/// The runtime state of one signal.
///
/// Signals start all-X: every line is observably unresolved until its first
/// drive, which is what makes reset-tolerance rules checkable.
#[derive(Clone, Debug)]
pub struct SignalState {
    /// Name used for lookup and error reporting.
    pub name: String,
    /// Bit width.
    pub width: u32,
    /// Current value.
    pub value: LogicVec,
    /// Value before the most recent update batch (for edge detection).
    pub previous: LogicVec,
}

impl SignalState {
    /// Creates a signal initialized to all-X.
    pub fn new(name: impl Into<String>, width: u32) -> Self {
        let value = LogicVec::unknown(width);
        Self {
            name: name.into(),
            width,
            previous: value.clone(),
            value,
        }
    }
}

/// Returns the edge between two single-bit samples, if any.
///
/// Only transitions between definite levels count; transitions into or out
/// of X/Z are not edges.
pub fn edge_between(prev: Logic, curr: Logic) -> Option<Edge> {
    match (prev, curr) {
        (Logic::Zero, Logic::One) => Some(Edge::Rising),
        (Logic::One, Logic::Zero) => Some(Edge::Falling),
        _ => None,
    }
}
