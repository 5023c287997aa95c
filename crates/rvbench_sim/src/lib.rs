//! Discrete-event execution kernel for the rvbench verification harness.
//!
//! This crate is the "builtin" simulation backend the harness runs on: a
//! single-threaded, deterministic, cooperative discrete-event engine. It
//! provides exactly the surface the harness layer requires of any backend:
//!
//! - registration and name lookup of signals whose values are 4-state
//!   (so "unresolved" is a first-class sample outcome),
//! - atomic reads of current values and next-delta writes,
//! - free-running clock generators per domain,
//! - suspension of cooperative tasks on named clock edges,
//! - bounded waits with a distinguished timeout failure,
//! - the current simulated time in femtoseconds.
//!
//! # Modules
//!
//! - `time` — femtosecond-precision time with delta cycles
//! - `signal` — signal state and edge detection
//! - `process` — the cooperative task contract
//! - `kernel` — event queue, clocks, scheduler, bounded waits

#![warn(missing_docs)]

pub mod kernel;
pub mod process;
pub mod signal;
pub mod time;

pub use kernel::{Kernel, StepResult, TaskId, TaskState};
pub use process::{Flow, Process, SignalView, SimCtx, Wait, Wake};
pub use signal::{edge_between, Edge, SignalId, SignalState};
pub use time::{SimTime, FS_PER_MS, FS_PER_NS, FS_PER_PS, FS_PER_US};
