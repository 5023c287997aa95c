//! The port-name convention binding the harness to the component under test.
//!
//! The queue component is opaque: the harness reaches it only through ten
//! named lines, five per clock domain. Whoever installs the component into
//! the kernel registers these names; the harness resolves them at scenario
//! start.

use rvbench_common::BenchResult;
use rvbench_sim::{Kernel, SignalId};

/// Input-domain clock.
pub const INPUT_CLOCK: &str = "input_clock";
/// Input-domain reset.
pub const INPUT_RESET: &str = "input_reset";
/// Input-side valid (driven by the harness).
pub const INPUT_VALID: &str = "input_valid";
/// Input-side ready (driven by the component).
pub const INPUT_READY: &str = "input_ready";
/// Input-side data (driven by the harness).
pub const INPUT_DATA: &str = "input_data";
/// Output-domain clock.
pub const OUTPUT_CLOCK: &str = "output_clock";
/// Output-domain reset.
pub const OUTPUT_RESET: &str = "output_reset";
/// Output-side valid (driven by the component).
pub const OUTPUT_VALID: &str = "output_valid";
/// Output-side ready (driven by the harness).
pub const OUTPUT_READY: &str = "output_ready";
/// Output-side data (driven by the component).
pub const OUTPUT_DATA: &str = "output_data";

/// The five lines of one clocked handshake domain.
#[derive(Clone, Copy, Debug)]
pub struct DomainPorts {
    /// The domain clock.
    pub clock: SignalId,
    /// The domain reset.
    pub reset: SignalId,
    /// The valid line.
    pub valid: SignalId,
    /// The ready line.
    pub ready: SignalId,
    /// The data lines.
    pub data: SignalId,
}

/// Both handshake domains of the component under test.
#[derive(Clone, Copy, Debug)]
pub struct BenchPorts {
    /// The input-side (producer-facing) domain.
    pub input: DomainPorts,
    /// The output-side (consumer-facing) domain.
    pub output: DomainPorts,
}

impl BenchPorts {
    /// Looks up all ten convention-named signals in the kernel.
    pub fn resolve(k: &Kernel) -> BenchResult<Self> {
        Ok(Self {
            input: DomainPorts {
                clock: k.signal(INPUT_CLOCK)?,
                reset: k.signal(INPUT_RESET)?,
                valid: k.signal(INPUT_VALID)?,
                ready: k.signal(INPUT_READY)?,
                data: k.signal(INPUT_DATA)?,
            },
            output: DomainPorts {
                clock: k.signal(OUTPUT_CLOCK)?,
                reset: k.signal(OUTPUT_RESET)?,
                valid: k.signal(OUTPUT_VALID)?,
                ready: k.signal(OUTPUT_READY)?,
                data: k.signal(OUTPUT_DATA)?,
            },
        })
    }

    /// Registers all ten convention-named signals with the given data width.
    ///
    /// Intended for component installers and tests; the harness itself only
    /// resolves.
    pub fn register(k: &mut Kernel, data_width: u32) -> BenchResult<Self> {
        let input = DomainPorts {
            clock: k.add_signal(INPUT_CLOCK, 1)?,
            reset: k.add_signal(INPUT_RESET, 1)?,
            valid: k.add_signal(INPUT_VALID, 1)?,
            ready: k.add_signal(INPUT_READY, 1)?,
            data: k.add_signal(INPUT_DATA, data_width)?,
        };
        let output = DomainPorts {
            clock: k.add_signal(OUTPUT_CLOCK, 1)?,
            reset: k.add_signal(OUTPUT_RESET, 1)?,
            valid: k.add_signal(OUTPUT_VALID, 1)?,
            ready: k.add_signal(OUTPUT_READY, 1)?,
            data: k.add_signal(OUTPUT_DATA, data_width)?,
        };
        Ok(Self { input, output })
    }
}
