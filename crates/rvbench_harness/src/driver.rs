//! The input-side agent: offers randomized items into the input domain.
//!
//! The driver paces itself once per input-domain cycle, phase-locked to the
//! falling edge so driven values settle before the next rising edge is
//! sampled. Each cycle it draws a throttle decision and a data value; when
//! offering, it holds valid and the data until ready is observed on a rising
//! edge, then counts the transfer. It exits after its target count with
//! valid deasserted.

use rvbench_common::{BenchError, BenchResult, Logic, LogicVec};
use rvbench_sim::{Flow, Kernel, Process, SignalId, SimCtx, TaskId, Wait, Wake};
use std::cell::Cell;
use std::rc::Rc;
use tracing::trace;

use crate::interface::{HandshakeInterface, Line};
use crate::stimulus::{DataGenerator, RateGenerator};

/// Falling edges the driver waits after reset release before first offering.
const SETTLE_CYCLES: u8 = 2;

/// The input-side agent.
pub struct Driver {
    iface: HandshakeInterface,
    data: DataGenerator,
    rate: RateGenerator,
    target: u64,
    count: Rc<Cell<u64>>,
    task: Option<TaskId>,
}

impl Driver {
    /// Creates a driver that will offer `target` items.
    pub fn new(
        iface: HandshakeInterface,
        data: DataGenerator,
        rate: RateGenerator,
        target: u64,
    ) -> Self {
        Self {
            iface,
            data,
            rate,
            target,
            count: Rc::new(Cell::new(0)),
            task: None,
        }
    }

    /// Starts the driver task. Starting an already-started driver is a
    /// fatal usage error.
    pub fn start(&mut self, k: &mut Kernel) -> BenchResult<()> {
        if self.task.is_some() {
            return Err(BenchError::Usage("input driver already started".into()));
        }
        let data_sig = self.iface.data.ok_or_else(|| {
            BenchError::Usage("input driver requires an interface with data lines".into())
        })?;
        self.count.set(0);
        let task = k.spawn(
            "input_driver",
            Box::new(DriveTask {
                iface: self.iface.clone(),
                data_sig,
                width: self.data.width(),
                data: self.data.clone(),
                rate: self.rate.clone(),
                target: self.target,
                count: Rc::clone(&self.count),
                state: DriveState::AwaitRelease,
            }),
        )?;
        self.task = Some(task);
        Ok(())
    }

    /// Cancels the driver task. Stopping a never-started driver is a fatal
    /// usage error; the handle is cleared, so the driver may be started
    /// again afterwards.
    pub fn stop(&mut self, k: &mut Kernel) -> BenchResult<()> {
        let task = self
            .task
            .take()
            .ok_or_else(|| BenchError::Usage("input driver never started".into()))?;
        k.cancel(task);
        Ok(())
    }

    /// Monotonically non-decreasing snapshot of completed transfers.
    pub fn transfer_count(&self) -> u64 {
        self.count.get()
    }

    /// Runs the kernel until the driver finishes, or the window elapses.
    pub fn wait_done(&self, k: &mut Kernel, timeout_fs: Option<u64>) -> BenchResult<()> {
        let task = self
            .task
            .ok_or_else(|| BenchError::Usage("input driver never started".into()))?;
        k.run_until_task_done(task, timeout_fs, "input driver completion")
    }
}

enum DriveState {
    /// Waiting for the first falling edge outside reset.
    AwaitRelease,
    /// Counting down settle cycles after reset release.
    Settle(u8),
    /// At a falling edge, deciding whether to offer this cycle.
    Offer,
    /// Valid is held; watching rising edges for ready.
    AwaitReady,
}

struct DriveTask {
    iface: HandshakeInterface,
    data_sig: SignalId,
    width: u32,
    data: DataGenerator,
    rate: RateGenerator,
    target: u64,
    count: Rc<Cell<u64>>,
    state: DriveState,
}

impl Process for DriveTask {
    fn resume(&mut self, wake: Wake, cx: &mut SimCtx<'_>) -> BenchResult<Flow> {
        if wake == Wake::Start {
            cx.drive_bit(self.iface.valid, Logic::Zero)?;
            cx.drive(self.data_sig, LogicVec::from_u64(0, self.width))?;
            return Ok(Flow::Wait(Wait::falling(self.iface.clock)));
        }
        loop {
            match self.state {
                DriveState::AwaitRelease => {
                    if self.iface.in_reset(cx) {
                        return Ok(Flow::Wait(Wait::falling(self.iface.clock)));
                    }
                    self.state = DriveState::Settle(SETTLE_CYCLES);
                    return Ok(Flow::Wait(Wait::falling(self.iface.clock)));
                }
                DriveState::Settle(n) => {
                    if n > 1 {
                        self.state = DriveState::Settle(n - 1);
                        return Ok(Flow::Wait(Wait::falling(self.iface.clock)));
                    }
                    self.state = DriveState::Offer;
                }
                DriveState::Offer => {
                    if self.count.get() >= self.target {
                        cx.drive_bit(self.iface.valid, Logic::Zero)?;
                        return Ok(Flow::Done);
                    }
                    let produce = self.rate.generate();
                    let value = self.data.generate();
                    cx.drive_bit(self.iface.valid, Logic::from(produce))?;
                    cx.drive(self.data_sig, LogicVec::from_u64(value, self.width))?;
                    if produce {
                        self.state = DriveState::AwaitReady;
                        return Ok(Flow::Wait(Wait::rising(self.iface.clock)));
                    }
                    return Ok(Flow::Wait(Wait::falling(self.iface.clock)));
                }
                DriveState::AwaitReady => {
                    if !self.iface.in_reset(cx) && self.iface.sample(cx, Line::Ready)?.is_one() {
                        self.count.set(self.count.get() + 1);
                        trace!(count = self.count.get(), "input transfer accepted");
                        self.state = DriveState::Offer;
                        return Ok(Flow::Wait(Wait::falling(self.iface.clock)));
                    }
                    return Ok(Flow::Wait(Wait::rising(self.iface.clock)));
                }
            }
        }
    }
}
