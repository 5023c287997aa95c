//! Behavioral queue components the scenario tests run against.
//!
//! The reference component is the classic asynchronous FIFO: binary
//! read/write pointers exchanged across domains as gray codes through
//! two-flop synchronizers, with registered full/empty flags driving the
//! handshake lines. It is installed as two kernel processes, one per clock
//! domain, reachable only through the convention-named ports — exactly how
//! the harness sees a real device.
//!
//! The broken variants exist to prove the harness catches misbehavior:
//! a component that emits output with no input, one that corrupts stored
//! data, and one that never drives its ready line.

use rvbench_common::{BenchResult, Logic, LogicVec};
use rvbench_harness::BenchPorts;
use rvbench_sim::{Flow, Kernel, Process, SignalId, SignalView, SimCtx, Wait, Wake};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Deliberate defects for negative tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DutFault {
    /// Correct behavior.
    None,
    /// Stored values are flipped in their lowest bit.
    CorruptData,
    /// The input-side ready line is never driven.
    FloatInputReady,
}

/// Installs a correct behavioral CDC FIFO behind the convention ports.
pub fn install_fifo(k: &mut Kernel, width: u32, capacity_log2: u32) -> BenchResult<()> {
    install_fifo_with(k, width, capacity_log2, DutFault::None)
}

/// Installs the behavioral CDC FIFO with an optional deliberate defect.
pub fn install_fifo_with(
    k: &mut Kernel,
    width: u32,
    capacity_log2: u32,
    fault: DutFault,
) -> BenchResult<()> {
    assert!((1..=16).contains(&capacity_log2));
    let ports = BenchPorts::register(k, width)?;
    let depth = 1usize << capacity_log2;
    let mem = Rc::new(RefCell::new(vec![0u64; depth]));
    let wgray = Rc::new(Cell::new(0u64));
    let rgray = Rc::new(Cell::new(0u64));
    k.spawn(
        "dut_write_side",
        Box::new(WriteSide {
            clock: ports.input.clock,
            reset: ports.input.reset,
            valid: ports.input.valid,
            ready: ports.input.ready,
            data: ports.input.data,
            capacity_log2,
            mem: Rc::clone(&mem),
            wgray_out: Rc::clone(&wgray),
            rgray_in: Rc::clone(&rgray),
            wbin: 0,
            sync1: 0,
            sync2: 0,
            ready_q: false,
            corrupt: fault == DutFault::CorruptData,
            drive_ready: fault != DutFault::FloatInputReady,
        }),
    )?;
    k.spawn(
        "dut_read_side",
        Box::new(ReadSide {
            clock: ports.output.clock,
            reset: ports.output.reset,
            valid: ports.output.valid,
            ready: ports.output.ready,
            data: ports.output.data,
            width,
            capacity_log2,
            mem,
            rgray_out: rgray,
            wgray_in: wgray,
            rbin: 0,
            sync1: 0,
            sync2: 0,
            valid_q: false,
        }),
    )?;
    Ok(())
}

fn gray(b: u64) -> u64 {
    b ^ (b >> 1)
}

/// Write-domain half: accepts items while not full, publishes the write
/// pointer, synchronizes the read pointer.
struct WriteSide {
    clock: SignalId,
    reset: SignalId,
    valid: SignalId,
    ready: SignalId,
    data: SignalId,
    capacity_log2: u32,
    mem: Rc<RefCell<Vec<u64>>>,
    wgray_out: Rc<Cell<u64>>,
    rgray_in: Rc<Cell<u64>>,
    wbin: u64,
    sync1: u64,
    sync2: u64,
    /// The ready level currently visible on the line.
    ready_q: bool,
    corrupt: bool,
    drive_ready: bool,
}

impl Process for WriteSide {
    fn resume(&mut self, wake: Wake, cx: &mut SimCtx<'_>) -> BenchResult<Flow> {
        if wake == Wake::Edge {
            match cx.bit(self.reset) {
                Logic::One => {
                    self.wbin = 0;
                    self.sync1 = 0;
                    self.sync2 = 0;
                    self.ready_q = true;
                    self.wgray_out.set(0);
                    if self.drive_ready {
                        cx.drive_bit(self.ready, Logic::One)?;
                    }
                }
                Logic::Zero => {
                    let depth = 1u64 << self.capacity_log2;
                    let ptr_mask = (depth << 1) - 1;
                    if self.ready_q && cx.bit(self.valid) == Logic::One {
                        let mut value = cx.value(self.data).to_u64().unwrap_or(0);
                        if self.corrupt {
                            value ^= 1;
                        }
                        self.mem.borrow_mut()[(self.wbin % depth) as usize] = value;
                        self.wbin = (self.wbin + 1) & ptr_mask;
                    }
                    self.sync2 = self.sync1;
                    self.sync1 = self.rgray_in.get();
                    self.wgray_out.set(gray(self.wbin));
                    // Full when the gray pointers are exactly a lap apart.
                    let lap = self.sync2 ^ (0b11 << (self.capacity_log2 - 1));
                    let full = gray(self.wbin) == lap;
                    self.ready_q = !full;
                    if self.drive_ready {
                        cx.drive_bit(self.ready, Logic::from(!full))?;
                    }
                }
                _ => {}
            }
        }
        Ok(Flow::Wait(Wait::rising(self.clock)))
    }
}

/// Read-domain half: presents the front item while not empty, publishes the
/// read pointer, synchronizes the write pointer.
struct ReadSide {
    clock: SignalId,
    reset: SignalId,
    valid: SignalId,
    ready: SignalId,
    data: SignalId,
    width: u32,
    capacity_log2: u32,
    mem: Rc<RefCell<Vec<u64>>>,
    rgray_out: Rc<Cell<u64>>,
    wgray_in: Rc<Cell<u64>>,
    rbin: u64,
    sync1: u64,
    sync2: u64,
    /// The valid level currently visible on the line.
    valid_q: bool,
}

impl Process for ReadSide {
    fn resume(&mut self, wake: Wake, cx: &mut SimCtx<'_>) -> BenchResult<Flow> {
        if wake == Wake::Edge {
            match cx.bit(self.reset) {
                Logic::One => {
                    self.rbin = 0;
                    self.sync1 = 0;
                    self.sync2 = 0;
                    self.valid_q = false;
                    self.rgray_out.set(0);
                    cx.drive_bit(self.valid, Logic::Zero)?;
                    cx.drive(self.data, LogicVec::from_u64(0, self.width))?;
                }
                Logic::Zero => {
                    let depth = 1u64 << self.capacity_log2;
                    let ptr_mask = (depth << 1) - 1;
                    if self.valid_q && cx.bit(self.ready) == Logic::One {
                        self.rbin = (self.rbin + 1) & ptr_mask;
                    }
                    self.sync2 = self.sync1;
                    self.sync1 = self.wgray_in.get();
                    self.rgray_out.set(gray(self.rbin));
                    let empty = gray(self.rbin) == self.sync2;
                    self.valid_q = !empty;
                    cx.drive_bit(self.valid, Logic::from(!empty))?;
                    if !empty {
                        let value = self.mem.borrow()[(self.rbin % depth) as usize];
                        cx.drive(self.data, LogicVec::from_u64(value, self.width))?;
                    }
                }
                _ => {}
            }
        }
        Ok(Flow::Wait(Wait::rising(self.clock)))
    }
}

/// Installs a component that asserts output valid without ever accepting an
/// input: the canonical spurious-output offender.
pub fn install_leaky_dut(k: &mut Kernel, width: u32) -> BenchResult<()> {
    let ports = BenchPorts::register(k, width)?;
    k.spawn(
        "leaky_input_side",
        Box::new(LevelStub {
            clock: ports.input.clock,
            reset: ports.input.reset,
            line: ports.input.ready,
            level: Logic::Zero,
        }),
    )?;
    k.spawn(
        "leaky_output_side",
        Box::new(LeakyOutput {
            clock: ports.output.clock,
            reset: ports.output.reset,
            valid: ports.output.valid,
            data: ports.output.data,
            width,
        }),
    )?;
    Ok(())
}

/// Holds one line at a fixed level at every edge of its clock.
struct LevelStub {
    clock: SignalId,
    reset: SignalId,
    line: SignalId,
    level: Logic,
}

impl Process for LevelStub {
    fn resume(&mut self, wake: Wake, cx: &mut SimCtx<'_>) -> BenchResult<Flow> {
        if wake == Wake::Edge && cx.bit(self.reset).is_resolvable() {
            cx.drive_bit(self.line, self.level)?;
        }
        Ok(Flow::Wait(Wait::rising(self.clock)))
    }
}

/// Asserts output valid with zeroed data as soon as reset releases.
struct LeakyOutput {
    clock: SignalId,
    reset: SignalId,
    valid: SignalId,
    data: SignalId,
    width: u32,
}

impl Process for LeakyOutput {
    fn resume(&mut self, wake: Wake, cx: &mut SimCtx<'_>) -> BenchResult<Flow> {
        if wake == Wake::Edge {
            match cx.bit(self.reset) {
                Logic::One => {
                    cx.drive_bit(self.valid, Logic::Zero)?;
                    cx.drive(self.data, LogicVec::from_u64(0, self.width))?;
                }
                Logic::Zero => {
                    cx.drive_bit(self.valid, Logic::One)?;
                    cx.drive(self.data, LogicVec::from_u64(0, self.width))?;
                }
                _ => {}
            }
        }
        Ok(Flow::Wait(Wait::rising(self.clock)))
    }
}
