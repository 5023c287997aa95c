//! The scenario library: parameterized end-to-end verification procedures.
//!
//! Each scenario prepares the bench (clock bring-up and a per-domain reset
//! sequence), instantiates fresh agents and an orchestrator over a fresh
//! scoreboard, runs to its completion conditions under explicit windows, and
//! checks aggregate outcomes. Timeouts are definitive signals: the fill
//! scenario converts an expected timeout (no output while backpressured)
//! into a pass, while everywhere else a timeout is a failure.

use rvbench_common::{BenchError, BenchResult, Logic};
use rvbench_sim::Kernel;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use tracing::info;

use crate::config::ScenarioConfig;
use crate::driver::Driver;
use crate::interface::{HandshakeInterface, Line};
use crate::monitor::Monitor;
use crate::orchestrator::Orchestrator;
use crate::ports::{BenchPorts, DomainPorts};
use crate::scoreboard::{Scoreboard, SharedScoreboard};
use crate::stimulus::{seeded_rng, DataGenerator, RateGenerator, SharedRng};

/// Clock cycles each reset is held asserted.
pub const RESET_HOLD_CYCLES: u64 = 10;

/// Cycles allowed for the first post-reset handshake to become reachable.
const STARTUP_WINDOW_CYCLES: u64 = 100;

/// Throttle rate used by the fuzzed-rate scenario.
const FUZZ_RATE: f64 = 0.5;

/// The end-to-end procedures the harness can run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scenario {
    /// Clock and reset bring-up only.
    Reset,
    /// One item at full rate on both sides.
    SingleItem,
    /// Fill the queue against a never-ready consumer.
    FillToCapacity,
    /// Fill against backpressure, then drain at full rate.
    FillThenDrain,
    /// Both sides throttled to 50%, 4x capacity items.
    FuzzedRate,
    /// Both sides at full rate, 4x capacity items, throughput-bounded.
    FullRateStreaming,
}

impl Scenario {
    /// All scenarios, in suite execution order.
    pub const ALL: [Scenario; 6] = [
        Scenario::Reset,
        Scenario::SingleItem,
        Scenario::FillToCapacity,
        Scenario::FillThenDrain,
        Scenario::FuzzedRate,
        Scenario::FullRateStreaming,
    ];

    /// The scenario's configuration-file name.
    pub fn name(self) -> &'static str {
        match self {
            Scenario::Reset => "reset",
            Scenario::SingleItem => "single_item",
            Scenario::FillToCapacity => "fill_to_capacity",
            Scenario::FillThenDrain => "fill_then_drain",
            Scenario::FuzzedRate => "fuzzed_rate",
            Scenario::FullRateStreaming => "full_rate_streaming",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|sc| sc.name() == s)
            .ok_or_else(|| BenchError::Config(format!("unknown scenario '{s}'")))
    }
}

/// Aggregate outcome of one scenario run.
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    /// The scenario that ran.
    pub scenario: Scenario,
    /// Completed input-side transfers.
    pub transfers_in: u64,
    /// Completed output-side transfers.
    pub transfers_out: u64,
    /// Offered values never observed (queue residue at scenario end).
    pub residue: usize,
    /// Simulation time at scenario end, in femtoseconds.
    pub end_fs: u64,
}

/// Asserts and releases a domain's reset, holding it for
/// [`RESET_HOLD_CYCLES`] clock cycles.
pub fn reset_sequence(k: &mut Kernel, domain: &DomainPorts, period_fs: u64) -> BenchResult<()> {
    k.drive_bit(domain.reset, Logic::One)?;
    k.run_for(RESET_HOLD_CYCLES * period_fs)?;
    k.drive_bit(domain.reset, Logic::Zero)?;
    k.run_for(period_fs)?;
    Ok(())
}

/// The prepared bench: resolved ports, running clocks, released resets.
struct Bench {
    ports: BenchPorts,
    input: HandshakeInterface,
    output: HandshakeInterface,
    in_period: u64,
    out_period: u64,
    width: u32,
    capacity: u64,
    rng: SharedRng,
}

impl Bench {
    fn prepare(k: &mut Kernel, cfg: &ScenarioConfig) -> BenchResult<Self> {
        cfg.validate()?;
        let ports = BenchPorts::resolve(k)?;
        for data in [ports.input.data, ports.output.data] {
            if k.width(data) != cfg.data_width {
                return Err(BenchError::Config(format!(
                    "component data width {} does not match configured width {}",
                    k.width(data),
                    cfg.data_width
                )));
            }
        }
        let in_period = cfg.input_period_fs()?;
        let out_period = cfg.output_period_fs()?;
        k.ensure_clock(ports.input.clock, in_period)?;
        k.ensure_clock(ports.output.clock, out_period)?;
        reset_sequence(k, &ports.input, in_period)?;
        reset_sequence(k, &ports.output, out_period)?;
        Ok(Self {
            ports,
            input: HandshakeInterface::for_domain("input", &ports.input),
            output: HandshakeInterface::for_domain("output", &ports.output),
            in_period,
            out_period,
            width: cfg.data_width,
            capacity: cfg.capacity(),
            rng: seeded_rng(cfg.seed),
        })
    }

    fn driver(&self, rate: f64, target: u64) -> BenchResult<Driver> {
        Ok(Driver::new(
            self.input.clone(),
            DataGenerator::new(self.width, Rc::clone(&self.rng)),
            RateGenerator::new(rate, Rc::clone(&self.rng))?,
            target,
        ))
    }

    fn monitor(&self, rate: f64, target: u64) -> BenchResult<Monitor> {
        Ok(Monitor::new(
            self.output.clone(),
            RateGenerator::new(rate, Rc::clone(&self.rng))?,
            target,
        ))
    }

    fn orchestrator(&self) -> (Orchestrator, SharedScoreboard) {
        let scoreboard = Scoreboard::shared();
        let orch = Orchestrator::new(
            self.input.clone(),
            self.output.clone(),
            Rc::clone(&scoreboard),
        );
        (orch, scoreboard)
    }

    fn max_period(&self) -> u64 {
        self.in_period.max(self.out_period)
    }
}

fn ensure(k: &Kernel, cond: bool, message: String) -> BenchResult<()> {
    if cond {
        Ok(())
    } else {
        Err(BenchError::AssertionFailed {
            time_fs: k.time().fs,
            message,
        })
    }
}

/// Runs one scenario against a kernel with the component already installed.
pub fn run_scenario(
    k: &mut Kernel,
    cfg: &ScenarioConfig,
    scenario: Scenario,
) -> BenchResult<ScenarioReport> {
    info!(
        scenario = scenario.name(),
        backend = %cfg.backend,
        timescale = %cfg.timescale,
        width = cfg.data_width,
        capacity = cfg.capacity(),
        "scenario start"
    );
    let bench = Bench::prepare(k, cfg)?;
    let report = match scenario {
        Scenario::Reset => reset_scenario(k, &bench),
        Scenario::SingleItem => single_item(k, &bench),
        Scenario::FillToCapacity => fill_to_capacity(k, &bench),
        Scenario::FillThenDrain => fill_then_drain(k, &bench),
        Scenario::FuzzedRate => fuzzed_rate(k, &bench),
        Scenario::FullRateStreaming => full_rate_streaming(k, &bench),
    }?;
    info!(
        scenario = scenario.name(),
        transfers_in = report.transfers_in,
        transfers_out = report.transfers_out,
        end_fs = report.end_fs,
        "scenario pass"
    );
    Ok(report)
}

/// Runs every scenario in order on one kernel, resetting between them.
pub fn run_suite(k: &mut Kernel, cfg: &ScenarioConfig) -> BenchResult<Vec<ScenarioReport>> {
    Scenario::ALL
        .into_iter()
        .map(|s| run_scenario(k, cfg, s))
        .collect()
}

/// Runs the scenario named by the configuration, or the whole suite when no
/// name is given.
pub fn run_configured(k: &mut Kernel, cfg: &ScenarioConfig) -> BenchResult<Vec<ScenarioReport>> {
    match &cfg.scenario {
        Some(name) => Ok(vec![run_scenario(k, cfg, name.parse()?)?]),
        None => run_suite(k, cfg),
    }
}

/// Reset bring-up only: a second full reset pass on both domains must leave
/// no activity behind.
fn reset_scenario(k: &mut Kernel, bench: &Bench) -> BenchResult<ScenarioReport> {
    reset_sequence(k, &bench.ports.input, bench.in_period)?;
    reset_sequence(k, &bench.ports.output, bench.out_period)?;
    k.run_for(4 * bench.max_period())?;
    Ok(ScenarioReport {
        scenario: Scenario::Reset,
        transfers_in: 0,
        transfers_out: 0,
        residue: 0,
        end_fs: k.time().fs,
    })
}

fn single_item(k: &mut Kernel, bench: &Bench) -> BenchResult<ScenarioReport> {
    let (mut orch, sb) = bench.orchestrator();
    let mut mon = bench.monitor(1.0, 1)?;
    let mut drv = bench.driver(1.0, 1)?;
    orch.start(k)?;
    mon.start(k)?;
    drv.start(k)?;

    bench
        .input
        .await_handshake(k, Some(STARTUP_WINDOW_CYCLES * bench.in_period))?;
    bench
        .output
        .await_handshake(k, Some(STARTUP_WINDOW_CYCLES * bench.out_period))?;
    drv.wait_done(k, Some(10 * bench.in_period))?;
    mon.wait_done(k, Some(10 * bench.out_period))?;
    // Grace period: a duplicated or spurious item would surface here as an
    // underflow or a stray count.
    k.run_for(10 * bench.max_period())?;

    ensure(
        k,
        drv.transfer_count() == 1,
        format!("expected 1 input transfer, saw {}", drv.transfer_count()),
    )?;
    ensure(
        k,
        mon.transfer_count() == 1,
        format!("expected 1 output transfer, saw {}", mon.transfer_count()),
    )?;
    let (pending, observed) = {
        let sb = sb.borrow();
        (sb.pending(), sb.observed())
    };
    ensure(
        k,
        pending == 0 && observed == 1,
        format!("reference queue out of balance: pending {pending}, observed {observed}"),
    )?;

    drv.stop(k)?;
    mon.stop(k)?;
    orch.stop(k)?;
    Ok(ScenarioReport {
        scenario: Scenario::SingleItem,
        transfers_in: 1,
        transfers_out: 1,
        residue: 0,
        end_fs: k.time().fs,
    })
}

/// Drives the fill phase shared by the fill and fill-then-drain scenarios:
/// `capacity` items against a never-ready consumer, bounded to `capacity`
/// input cycles, with the no-output window converted from a timeout into a
/// pass.
fn fill_phase(
    k: &mut Kernel,
    bench: &Bench,
    drv: &Driver,
    mon: &Monitor,
    sb: &SharedScoreboard,
) -> BenchResult<()> {
    let capacity = bench.capacity;
    bench
        .input
        .await_handshake(k, Some(STARTUP_WINDOW_CYCLES * bench.in_period))?;
    drv.wait_done(k, Some(capacity * bench.in_period))?;

    // Expected absence: with the consumer never ready, an output handshake
    // inside this window is a backpressure violation.
    match bench
        .output
        .await_handshake(k, Some(capacity * bench.out_period))
    {
        Err(e) if e.is_timeout() => {}
        Ok(()) => {
            return Err(BenchError::AssertionFailed {
                time_fs: k.time().fs,
                message: "output transfer observed while consumer was backpressured".into(),
            })
        }
        Err(e) => return Err(e),
    }

    ensure(
        k,
        drv.transfer_count() == capacity,
        format!(
            "expected {} input transfers within {} cycles, saw {}",
            capacity,
            capacity,
            drv.transfer_count()
        ),
    )?;
    ensure(
        k,
        mon.transfer_count() == 0,
        format!(
            "expected 0 output transfers during fill, saw {}",
            mon.transfer_count()
        ),
    )?;
    let pending = sb.borrow().pending();
    ensure(
        k,
        pending == capacity as usize,
        format!("expected {capacity} pending items after fill, saw {pending}"),
    )
}

fn fill_to_capacity(k: &mut Kernel, bench: &Bench) -> BenchResult<ScenarioReport> {
    let capacity = bench.capacity;
    let (mut orch, sb) = bench.orchestrator();
    let mut mon = bench.monitor(0.0, capacity)?;
    let mut drv = bench.driver(1.0, capacity)?;
    orch.start(k)?;
    mon.start(k)?;
    drv.start(k)?;

    fill_phase(k, bench, &drv, &mon, &sb)?;

    drv.stop(k)?;
    mon.stop(k)?;
    orch.stop(k)?;
    Ok(ScenarioReport {
        scenario: Scenario::FillToCapacity,
        transfers_in: capacity,
        transfers_out: 0,
        residue: capacity as usize,
        end_fs: k.time().fs,
    })
}

fn fill_then_drain(k: &mut Kernel, bench: &Bench) -> BenchResult<ScenarioReport> {
    let capacity = bench.capacity;
    let (mut orch, sb) = bench.orchestrator();
    let mut mon = bench.monitor(0.0, capacity)?;
    let mut drv = bench.driver(1.0, capacity)?;
    orch.start(k)?;
    mon.start(k)?;
    drv.start(k)?;

    fill_phase(k, bench, &drv, &mon, &sb)?;

    // The backpressuring monitor owns the ready line; cancel it before the
    // drain monitor takes over.
    mon.stop(k)?;
    let mut drain = bench.monitor(1.0, capacity)?;
    drain.start(k)?;
    bench
        .output
        .await_handshake(k, Some(STARTUP_WINDOW_CYCLES * bench.out_period))?;
    drain.wait_done(k, Some(capacity * bench.out_period))?;

    ensure(
        k,
        drain.transfer_count() == capacity,
        format!(
            "expected {} drained transfers within {} cycles, saw {}",
            capacity,
            capacity,
            drain.transfer_count()
        ),
    )?;
    let (pending, observed) = {
        let sb = sb.borrow();
        (sb.pending(), sb.observed())
    };
    ensure(
        k,
        pending == 0 && observed == capacity,
        format!("reference queue out of balance after drain: pending {pending}, observed {observed}"),
    )?;

    drv.stop(k)?;
    drain.stop(k)?;
    orch.stop(k)?;
    Ok(ScenarioReport {
        scenario: Scenario::FillThenDrain,
        transfers_in: capacity,
        transfers_out: capacity,
        residue: 0,
        end_fs: k.time().fs,
    })
}

fn fuzzed_rate(k: &mut Kernel, bench: &Bench) -> BenchResult<ScenarioReport> {
    let items = 4 * bench.capacity;
    let inverse = (1.0 / FUZZ_RATE).round() as u64;
    let window = items * inverse * inverse * 4 * bench.max_period();

    let (mut orch, sb) = bench.orchestrator();
    let mut mon = bench.monitor(FUZZ_RATE, items)?;
    let mut drv = bench.driver(FUZZ_RATE, items)?;
    orch.start(k)?;
    mon.start(k)?;
    drv.start(k)?;

    mon.wait_done(k, Some(window))?;
    drv.wait_done(k, Some(10 * bench.in_period))?;
    finish_streaming(k, Scenario::FuzzedRate, items, &drv, &mon, &sb, &mut orch)?;
    let report = ScenarioReport {
        scenario: Scenario::FuzzedRate,
        transfers_in: items,
        transfers_out: items,
        residue: 0,
        end_fs: k.time().fs,
    };
    drv.stop(k)?;
    mon.stop(k)?;
    Ok(report)
}

fn full_rate_streaming(k: &mut Kernel, bench: &Bench) -> BenchResult<ScenarioReport> {
    let items = 4 * bench.capacity;
    // A correctly pipelined queue streams an item roughly every cycle of the
    // slower domain; a 2x budget separates pipelining from stalling.
    let window = 2 * bench.max_period() * items;

    let (mut orch, sb) = bench.orchestrator();
    let mut mon = bench.monitor(1.0, items)?;
    let mut drv = bench.driver(1.0, items)?;
    orch.start(k)?;
    mon.start(k)?;
    drv.start(k)?;

    bench.output.await_asserted(
        k,
        Line::Valid,
        Some(STARTUP_WINDOW_CYCLES * bench.out_period),
    )?;
    mon.wait_done(k, Some(window))?;
    drv.wait_done(k, Some(10 * bench.in_period))?;
    finish_streaming(
        k,
        Scenario::FullRateStreaming,
        items,
        &drv,
        &mon,
        &sb,
        &mut orch,
    )?;
    let report = ScenarioReport {
        scenario: Scenario::FullRateStreaming,
        transfers_in: items,
        transfers_out: items,
        residue: 0,
        end_fs: k.time().fs,
    };
    drv.stop(k)?;
    mon.stop(k)?;
    Ok(report)
}

/// Shared tail of the two streaming scenarios: count and balance checks,
/// then orchestrator shutdown.
fn finish_streaming(
    k: &mut Kernel,
    scenario: Scenario,
    items: u64,
    drv: &Driver,
    mon: &Monitor,
    sb: &SharedScoreboard,
    orch: &mut Orchestrator,
) -> BenchResult<()> {
    ensure(
        k,
        drv.transfer_count() == items,
        format!(
            "{scenario}: expected {items} input transfers, saw {}",
            drv.transfer_count()
        ),
    )?;
    ensure(
        k,
        mon.transfer_count() == items,
        format!(
            "{scenario}: expected {items} output transfers, saw {}",
            mon.transfer_count()
        ),
    )?;
    let (pending, observed) = {
        let sb = sb.borrow();
        (sb.pending(), sb.observed())
    };
    ensure(
        k,
        pending == 0 && observed == items,
        format!("{scenario}: reference queue out of balance: pending {pending}, observed {observed}"),
    )?;
    orch.stop(k)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_names_roundtrip() {
        for s in Scenario::ALL {
            assert_eq!(s.name().parse::<Scenario>().unwrap(), s);
        }
    }

    #[test]
    fn unknown_scenario_name() {
        let err = "drain_only".parse::<Scenario>().unwrap_err();
        assert!(matches!(err, BenchError::Config(_)));
    }

    #[test]
    fn display_matches_name() {
        assert_eq!(Scenario::FillThenDrain.to_string(), "fill_then_drain");
    }

    #[test]
    fn reset_scenario_runs_without_a_component() {
        // Reset bring-up needs only the convention ports; the component
        // itself stays quiet.
        let mut k = Kernel::new();
        BenchPorts::register(&mut k, 8).unwrap();
        let cfg = ScenarioConfig {
            data_width: 8,
            ..ScenarioConfig::default()
        };
        let report = run_scenario(&mut k, &cfg, Scenario::Reset).unwrap();
        assert_eq!(report.transfers_in, 0);
        assert_eq!(report.transfers_out, 0);
        assert!(report.end_fs > 0);
    }

    #[test]
    fn missing_ports_fail_fast() {
        let mut k = Kernel::new();
        let cfg = ScenarioConfig::default();
        let err = run_scenario(&mut k, &cfg, Scenario::Reset).unwrap_err();
        assert!(matches!(err, BenchError::UnknownSignal(_)));
    }

    #[test]
    fn width_mismatch_fails_fast() {
        let mut k = Kernel::new();
        BenchPorts::register(&mut k, 16).unwrap();
        let cfg = ScenarioConfig {
            data_width: 32,
            ..ScenarioConfig::default()
        };
        let err = run_scenario(&mut k, &cfg, Scenario::Reset).unwrap_err();
        assert!(matches!(err, BenchError::Config(_)));
    }
}
