//! The orchestrator: one watcher task per domain feeding the scoreboard.
//!
//! The input watcher awaits handshakes on the input interface — with no
//! timeout, since the surrounding scenario imposes its own windows — and
//! records each offered value. The output watcher does the same on the
//! output interface, where the scoreboard checks ordering and detects
//! underflow. The watchers share no mutable state beyond the scoreboard
//! handle, and each touches only its own end of the queue.

use rvbench_common::{BenchError, BenchResult};
use rvbench_sim::{Flow, Kernel, Process, SignalView, SimCtx, TaskId, Wait, Wake};
use std::rc::Rc;

use crate::interface::{HandshakeInterface, Line};
use crate::scoreboard::SharedScoreboard;

/// Which end of the reference queue a watcher feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WatchSide {
    Offered,
    Observed,
}

/// Owns the two watcher tasks and the shared scoreboard handle.
pub struct Orchestrator {
    input: HandshakeInterface,
    output: HandshakeInterface,
    scoreboard: SharedScoreboard,
    watchers: Option<(TaskId, TaskId)>,
}

impl Orchestrator {
    /// Creates an orchestrator over the two interfaces and a scoreboard.
    pub fn new(
        input: HandshakeInterface,
        output: HandshakeInterface,
        scoreboard: SharedScoreboard,
    ) -> Self {
        Self {
            input,
            output,
            scoreboard,
            watchers: None,
        }
    }

    /// Spawns both watcher tasks. Starting twice is a fatal usage error.
    pub fn start(&mut self, k: &mut Kernel) -> BenchResult<()> {
        if self.watchers.is_some() {
            return Err(BenchError::Usage("orchestrator already started".into()));
        }
        let input = k.spawn(
            "input_watcher",
            Box::new(WatchTask {
                iface: self.input.clone(),
                scoreboard: Rc::clone(&self.scoreboard),
                side: WatchSide::Offered,
            }),
        )?;
        let output = k.spawn(
            "output_watcher",
            Box::new(WatchTask {
                iface: self.output.clone(),
                scoreboard: Rc::clone(&self.scoreboard),
                side: WatchSide::Observed,
            }),
        )?;
        self.watchers = Some((input, output));
        Ok(())
    }

    /// Cancels both watcher tasks. Stopping before a start is a fatal usage
    /// error.
    pub fn stop(&mut self, k: &mut Kernel) -> BenchResult<()> {
        let (input, output) = self
            .watchers
            .take()
            .ok_or_else(|| BenchError::Usage("orchestrator never started".into()))?;
        k.cancel(input);
        k.cancel(output);
        Ok(())
    }

    /// The shared scoreboard handle.
    pub fn scoreboard(&self) -> &SharedScoreboard {
        &self.scoreboard
    }
}

/// Watches one domain for handshakes and records them.
struct WatchTask {
    iface: HandshakeInterface,
    scoreboard: SharedScoreboard,
    side: WatchSide,
}

impl Process for WatchTask {
    fn resume(&mut self, wake: Wake, cx: &mut SimCtx<'_>) -> BenchResult<Flow> {
        if wake == Wake::Edge && !self.iface.in_reset(cx) {
            let valid = self.iface.sample(cx, Line::Valid)?;
            let ready = self.iface.sample(cx, Line::Ready)?;
            if (valid & ready).is_one() {
                let value = self.iface.sample_data(cx)?;
                match self.side {
                    WatchSide::Offered => self.scoreboard.borrow_mut().record_offered(value),
                    WatchSide::Observed => self
                        .scoreboard
                        .borrow_mut()
                        .record_observed(value, cx.time_fs())?,
                }
            }
        }
        Ok(Flow::Wait(Wait::rising(self.iface.clock)))
    }
}
