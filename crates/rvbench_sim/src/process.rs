//! The cooperative task contract.
//!
//! Harness agents and watchers are [`Process`] state machines owned by the
//! kernel. A process runs only inside [`Process::resume`] calls, suspends by
//! returning a [`Wait`] on a named clock edge, and is cancellable at exactly
//! those suspension points: cancellation drops the state machine between
//! resumes, so any scoreboard or counter mutation a past resume made is
//! already complete.
//!
//! Values driven during a resume land on the next delta cycle. Every process
//! resumed at the same edge therefore samples the same pre-edge values,
//! whatever order they run in.

use crate::signal::{Edge, SignalId};
use crate::time::SimTime;
use rvbench_common::{BenchError, BenchResult, Logic, LogicVec};

/// Read access to signal values, shared by the kernel and [`SimCtx`].
pub trait SignalView {
    /// Returns the current value of a signal.
    fn value(&self, sig: SignalId) -> &LogicVec;

    /// Returns the name of a signal.
    fn signal_name(&self, sig: SignalId) -> &str;

    /// Returns the current simulation time in femtoseconds.
    fn time_fs(&self) -> u64;

    /// Returns bit 0 of a signal, for single-bit lines.
    fn bit(&self, sig: SignalId) -> Logic {
        self.value(sig).get(0)
    }
}

/// Why a process is being resumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wake {
    /// First resume, immediately after spawn.
    Start,
    /// The edge named by the process's current [`Wait`] occurred.
    Edge,
}

/// A suspension condition: one edge of one (single-bit) signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Wait {
    /// The signal whose edge ends the suspension.
    pub signal: SignalId,
    /// The edge direction.
    pub edge: Edge,
}

impl Wait {
    /// Suspends until the next rising edge of `signal`.
    pub fn rising(signal: SignalId) -> Self {
        Self {
            signal,
            edge: Edge::Rising,
        }
    }

    /// Suspends until the next falling edge of `signal`.
    pub fn falling(signal: SignalId) -> Self {
        Self {
            signal,
            edge: Edge::Falling,
        }
    }
}

/// The outcome of one resume.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Suspend until the given edge.
    Wait(Wait),
    /// The process has finished; it will not be resumed again.
    Done,
}

/// A cooperative task.
pub trait Process {
    /// Runs the process until its next suspension point.
    ///
    /// Returning `Err` is fatal to the whole run; no resume is retried.
    fn resume(&mut self, wake: Wake, cx: &mut SimCtx<'_>) -> BenchResult<Flow>;
}

/// The execution context handed to a process during a resume.
///
/// Reads observe current (pre-edge) values; drives take effect on the next
/// delta cycle.
pub struct SimCtx<'a> {
    time: SimTime,
    signals: &'a [crate::signal::SignalState],
    pending: &'a mut Vec<(SignalId, LogicVec)>,
}

impl<'a> SimCtx<'a> {
    pub(crate) fn new(
        time: SimTime,
        signals: &'a [crate::signal::SignalState],
        pending: &'a mut Vec<(SignalId, LogicVec)>,
    ) -> Self {
        Self {
            time,
            signals,
            pending,
        }
    }

    /// Returns the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Schedules `value` onto `sig` for the next delta cycle.
    pub fn drive(&mut self, sig: SignalId, value: LogicVec) -> BenchResult<()> {
        let state = &self.signals[sig.index()];
        if state.width != value.width() {
            return Err(BenchError::Usage(format!(
                "drive width {} does not match signal '{}' width {}",
                value.width(),
                state.name,
                state.width
            )));
        }
        self.pending.push((sig, value));
        Ok(())
    }

    /// Schedules a single-bit `value` onto `sig` for the next delta cycle.
    pub fn drive_bit(&mut self, sig: SignalId, value: Logic) -> BenchResult<()> {
        self.drive(sig, LogicVec::from_logic(value))
    }
}

impl SignalView for SimCtx<'_> {
    fn value(&self, sig: SignalId) -> &LogicVec {
        &self.signals[sig.index()].value
    }

    fn signal_name(&self, sig: SignalId) -> &str {
        &self.signals[sig.index()].name
    }

    fn time_fs(&self) -> u64 {
        self.time.fs
    }
}
