//! Error taxonomy shared by the simulation kernel and the harness layers.
//!
//! Every failure in a run is one of a small set of kinds: protocol
//! violations (unresolved samples outside reset, scoreboard underflow), data
//! mismatches, distinguished timeouts, usage errors, and engine-level
//! conditions. None of them is ever retried: a wait either succeeds within
//! its window or its outcome is definitive.

/// The standard result type for fallible harness operations.
pub type BenchResult<T> = Result<T, BenchError>;

/// Errors raised by the kernel, the agents, or a scenario.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    /// A bounded wait did not resolve within its window.
    ///
    /// Scenarios match on this variant to distinguish "expected not to
    /// happen" (converted to a pass) from "unexpected stall" (a failure).
    #[error("timeout waiting for {what} after {limit_fs} fs")]
    Timeout {
        /// What the wait was for.
        what: String,
        /// The window that elapsed, in femtoseconds.
        limit_fs: u64,
    },

    /// A sampled line carried X or Z on a clock edge outside reset.
    #[error("unresolved value on '{signal}' outside reset at {time_fs} fs")]
    Unresolved {
        /// The name of the offending line.
        signal: String,
        /// Time of the offending sample in femtoseconds.
        time_fs: u64,
    },

    /// An output-side transfer was observed with no pending input-side
    /// transfer recorded.
    #[error("output transfer with empty reference queue at {time_fs} fs (observed {observed:#x})")]
    Underflow {
        /// Time of the offending observation in femtoseconds.
        time_fs: u64,
        /// The value that appeared on the output data lines.
        observed: u64,
    },

    /// An observed value differed from the expected front-of-queue value.
    #[error("data mismatch on transfer {index}: expected {expected:#x}, got {got:#x}")]
    Mismatch {
        /// Zero-based ordinal of the output-side transfer.
        index: u64,
        /// The value recorded when the item was offered.
        expected: u64,
        /// The value observed on the output side.
        got: u64,
    },

    /// Double-start, stop-before-start, or a comparable misuse of a harness
    /// component. Signals a defect in the harness user, not the component
    /// under test.
    #[error("usage error: {0}")]
    Usage(String),

    /// A port name required by convention was not present in the kernel.
    #[error("unknown signal '{0}'")]
    UnknownSignal(String),

    /// The event queue drained while a wait was still pending.
    #[error("simulation stalled: no pending events at {time_fs} fs")]
    Stalled {
        /// Time at which the queue ran dry, in femtoseconds.
        time_fs: u64,
    },

    /// Too many delta cycles at a single time step.
    #[error("delta cycle limit exceeded at {time_fs} fs (max {max_deltas} deltas)")]
    DeltaCycleLimit {
        /// The time in femtoseconds where the limit was hit.
        time_fs: u64,
        /// The maximum number of delta cycles allowed.
        max_deltas: u32,
    },

    /// A scenario-level check on aggregate outcomes failed.
    #[error("assertion failed at {time_fs} fs: {message}")]
    AssertionFailed {
        /// Time in femtoseconds when the check failed.
        time_fs: u64,
        /// The check description, including the relevant counters/values.
        message: String,
    },

    /// A configuration value failed validation or parsing.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl BenchError {
    /// Returns true iff this error is a [`BenchError::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, BenchError::Timeout { .. })
    }
}
