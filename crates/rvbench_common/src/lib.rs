//! Shared vocabulary for the rvbench verification harness.
//!
//! This crate holds the value and error types every other rvbench crate
//! speaks:
//!
//! - `logic` — IEEE 1164 four-state logic values
//! - `logic_vec` — packed vectors of 4-state values
//! - `error` — the harness-wide error taxonomy

#![warn(missing_docs)]

pub mod error;
pub mod logic;
pub mod logic_vec;

pub use error::{BenchError, BenchResult};
pub use logic::Logic;
pub use logic_vec::LogicVec;
