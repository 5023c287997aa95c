//! Verification harness for ready/valid queues crossing two clock domains.
//!
//! The component under test is opaque: it is reachable only through ten
//! convention-named lines (see [`ports`]), five per independently clocked
//! domain. The harness drives randomized, rate-controlled traffic into the
//! input domain, randomly throttles acceptance on the output domain, keeps
//! an order-preserving reference model of expected outputs, and detects
//! protocol violations, data mismatches, and timing-bound violations — all
//! on a deterministic cooperative discrete-event kernel.
//!
//! # Modules
//!
//! - `ports` — the port-name convention binding harness to component
//! - `interface` — edge-synchronized handshake observation and waits
//! - `stimulus` — data and throttle generators over a per-run seeded source
//! - `driver` — the input-side agent
//! - `monitor` — the output-side agent
//! - `scoreboard` — the order-preserving reference model
//! - `orchestrator` — per-domain watchers feeding the scoreboard
//! - `config` — the scenario configuration record (TOML-loadable)
//! - `scenario` — the end-to-end scenario library

#![warn(missing_docs)]

pub mod config;
pub mod driver;
pub mod interface;
pub mod monitor;
pub mod orchestrator;
pub mod ports;
pub mod scenario;
pub mod scoreboard;
pub mod stimulus;

pub use config::ScenarioConfig;
pub use driver::Driver;
pub use interface::{HandshakeInterface, Line};
pub use monitor::Monitor;
pub use orchestrator::Orchestrator;
pub use ports::{BenchPorts, DomainPorts};
pub use scenario::{
    reset_sequence, run_configured, run_scenario, run_suite, Scenario, ScenarioReport,
    RESET_HOLD_CYCLES,
};
pub use scoreboard::{Scoreboard, SharedScoreboard};
pub use stimulus::{seeded_rng, DataGenerator, RateGenerator, SharedRng};
