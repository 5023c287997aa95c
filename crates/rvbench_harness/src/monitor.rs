//! The output-side agent: randomly accepts items from the output domain.
//!
//! Symmetric to the driver, on the consumer side: once per output-domain
//! cycle, phase-locked to the falling edge, it draws a throttle decision and
//! drives ready accordingly; while accepting, it counts a completed transfer
//! whenever valid is observed asserted on a rising edge. It exits after its
//! target count with ready deasserted.

use rvbench_common::{BenchError, BenchResult, Logic};
use rvbench_sim::{Flow, Kernel, Process, SimCtx, TaskId, Wait, Wake};
use std::cell::Cell;
use std::rc::Rc;
use tracing::trace;

use crate::interface::{HandshakeInterface, Line};
use crate::stimulus::RateGenerator;

/// The output-side agent.
pub struct Monitor {
    iface: HandshakeInterface,
    rate: RateGenerator,
    target: u64,
    count: Rc<Cell<u64>>,
    task: Option<TaskId>,
}

impl Monitor {
    /// Creates a monitor that will accept `target` items.
    pub fn new(iface: HandshakeInterface, rate: RateGenerator, target: u64) -> Self {
        Self {
            iface,
            rate,
            target,
            count: Rc::new(Cell::new(0)),
            task: None,
        }
    }

    /// Starts the monitor task. Starting an already-started monitor is a
    /// fatal usage error.
    pub fn start(&mut self, k: &mut Kernel) -> BenchResult<()> {
        if self.task.is_some() {
            return Err(BenchError::Usage("output monitor already started".into()));
        }
        self.count.set(0);
        let task = k.spawn(
            "output_monitor",
            Box::new(MonitorTask {
                iface: self.iface.clone(),
                rate: self.rate.clone(),
                target: self.target,
                count: Rc::clone(&self.count),
                state: MonitorState::AwaitRelease,
            }),
        )?;
        self.task = Some(task);
        Ok(())
    }

    /// Cancels the monitor task. Stopping a never-started monitor is a
    /// fatal usage error; the handle is cleared, so the monitor may be
    /// started again afterwards.
    pub fn stop(&mut self, k: &mut Kernel) -> BenchResult<()> {
        let task = self
            .task
            .take()
            .ok_or_else(|| BenchError::Usage("output monitor never started".into()))?;
        k.cancel(task);
        Ok(())
    }

    /// Monotonically non-decreasing snapshot of completed transfers.
    pub fn transfer_count(&self) -> u64 {
        self.count.get()
    }

    /// Runs the kernel until the monitor finishes, or the window elapses.
    pub fn wait_done(&self, k: &mut Kernel, timeout_fs: Option<u64>) -> BenchResult<()> {
        let task = self
            .task
            .ok_or_else(|| BenchError::Usage("output monitor never started".into()))?;
        k.run_until_task_done(task, timeout_fs, "output monitor completion")
    }
}

enum MonitorState {
    /// Waiting for the first falling edge outside reset.
    AwaitRelease,
    /// At a falling edge, deciding whether to accept this cycle.
    Accept,
    /// Ready is held; watching rising edges for valid.
    AwaitValid,
}

struct MonitorTask {
    iface: HandshakeInterface,
    rate: RateGenerator,
    target: u64,
    count: Rc<Cell<u64>>,
    state: MonitorState,
}

impl Process for MonitorTask {
    fn resume(&mut self, wake: Wake, cx: &mut SimCtx<'_>) -> BenchResult<Flow> {
        if wake == Wake::Start {
            cx.drive_bit(self.iface.ready, Logic::Zero)?;
            return Ok(Flow::Wait(Wait::falling(self.iface.clock)));
        }
        loop {
            match self.state {
                MonitorState::AwaitRelease => {
                    if self.iface.in_reset(cx) {
                        return Ok(Flow::Wait(Wait::falling(self.iface.clock)));
                    }
                    self.state = MonitorState::Accept;
                }
                MonitorState::Accept => {
                    if self.count.get() >= self.target {
                        cx.drive_bit(self.iface.ready, Logic::Zero)?;
                        return Ok(Flow::Done);
                    }
                    let consume = self.rate.generate();
                    cx.drive_bit(self.iface.ready, Logic::from(consume))?;
                    if consume {
                        self.state = MonitorState::AwaitValid;
                        return Ok(Flow::Wait(Wait::rising(self.iface.clock)));
                    }
                    return Ok(Flow::Wait(Wait::falling(self.iface.clock)));
                }
                MonitorState::AwaitValid => {
                    if !self.iface.in_reset(cx) && self.iface.sample(cx, Line::Valid)?.is_one() {
                        self.count.set(self.count.get() + 1);
                        trace!(count = self.count.get(), "output transfer accepted");
                        self.state = MonitorState::Accept;
                        return Ok(Flow::Wait(Wait::falling(self.iface.clock)));
                    }
                    return Ok(Flow::Wait(Wait::rising(self.iface.clock)));
                }
            }
        }
    }
}
