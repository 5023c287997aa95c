//! The discrete-event kernel: event queue, clock generators, and the
//! cooperative task scheduler.
//!
//! [`Kernel`] owns every signal, a min-heap of timed events, free-running
//! clock generators, and the task slots of all spawned processes. Each
//! [`step`](Kernel::step) applies one `(time, delta)` batch of events,
//! records which clock edges occurred, and resumes — in spawn order — every
//! task whose suspension matches one of those edges. Values driven during a
//! resume are scheduled one delta cycle later, so all tasks resumed at the
//! same edge sample the same pre-edge signal state.
//!
//! Bounded waits ([`run_until_task_done`](Kernel::run_until_task_done),
//! [`run_sampled`](Kernel::run_sampled)) report expiry as the distinguished
//! [`BenchError::Timeout`], which scenario code matches on to tell expected
//! absences from unexpected stalls.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use rvbench_common::{BenchError, BenchResult, Logic, LogicVec};
use tracing::debug;

use crate::process::{Flow, Process, SignalView, SimCtx, Wait, Wake};
use crate::signal::{edge_between, Edge, SignalId, SignalState};
use crate::time::SimTime;

/// Maximum delta cycles per time step before the kernel declares a runaway.
const MAX_DELTAS_PER_STEP: u32 = 10_000;

/// Opaque ID for a spawned task.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TaskId(u32);

impl TaskId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The lifecycle state of a task slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
    /// Suspended at a wait point.
    Waiting,
    /// Finished by returning [`Flow::Done`].
    Done,
    /// Cancelled at a suspension point.
    Cancelled,
}

/// The result of a single kernel step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepResult {
    /// A batch of events was applied.
    Advanced,
    /// The event queue was empty; nothing happened.
    Idle,
}

/// An event scheduled in the kernel's queue.
struct SimEvent {
    time: SimTime,
    /// Insertion sequence; breaks ties so same-instant events apply FIFO.
    seq: u64,
    kind: EventKind,
}

enum EventKind {
    Drive { signal: SignalId, value: LogicVec },
    ClockToggle { clock: usize },
}

impl PartialEq for SimEvent {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}

impl Eq for SimEvent {}

impl PartialOrd for SimEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.time.cmp(&other.time).then(self.seq.cmp(&other.seq))
    }
}

/// A free-running clock generator bound to one signal.
struct ClockGen {
    signal: SignalId,
    period_fs: u64,
}

struct TaskSlot {
    name: String,
    process: Option<Box<dyn Process>>,
    wait: Option<Wait>,
    state: TaskState,
}

/// The discrete-event execution engine.
pub struct Kernel {
    time: SimTime,
    seq: u64,
    events: BinaryHeap<Reverse<SimEvent>>,
    signals: Vec<SignalState>,
    names: HashMap<String, SignalId>,
    clocks: Vec<ClockGen>,
    tasks: Vec<TaskSlot>,
    deltas_at_time: u32,
    /// Edges observed in the most recently applied batch.
    last_edges: Vec<(SignalId, Edge)>,
}

impl Kernel {
    /// Creates an empty kernel at time zero.
    pub fn new() -> Self {
        Self {
            time: SimTime::zero(),
            seq: 0,
            events: BinaryHeap::new(),
            signals: Vec::new(),
            names: HashMap::new(),
            clocks: Vec::new(),
            tasks: Vec::new(),
            deltas_at_time: 0,
            last_edges: Vec::new(),
        }
    }

    /// Registers a new signal, initialized to all-X.
    pub fn add_signal(&mut self, name: &str, width: u32) -> BenchResult<SignalId> {
        if self.names.contains_key(name) {
            return Err(BenchError::Usage(format!(
                "signal '{name}' registered twice"
            )));
        }
        let id = SignalId::from_raw(self.signals.len() as u32);
        self.signals.push(SignalState::new(name, width));
        self.names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Looks a signal up by name.
    pub fn signal(&self, name: &str) -> BenchResult<SignalId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| BenchError::UnknownSignal(name.to_string()))
    }

    /// Returns the width of a signal.
    pub fn width(&self, sig: SignalId) -> u32 {
        self.signals[sig.index()].width
    }

    /// Returns the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Schedules `value` onto `sig` for the next delta cycle.
    pub fn drive(&mut self, sig: SignalId, value: LogicVec) -> BenchResult<()> {
        let state = &self.signals[sig.index()];
        if state.width != value.width() {
            return Err(BenchError::Usage(format!(
                "drive width {} does not match signal '{}' width {}",
                value.width(),
                state.name,
                state.width
            )));
        }
        let time = self.time.next_delta();
        self.push_event(time, EventKind::Drive { signal: sig, value });
        Ok(())
    }

    /// Schedules a single-bit `value` onto `sig` for the next delta cycle.
    pub fn drive_bit(&mut self, sig: SignalId, value: Logic) -> BenchResult<()> {
        self.drive(sig, LogicVec::from_logic(value))
    }

    /// Starts a free-running clock on `sig` with the given period.
    ///
    /// The signal is driven low immediately; the first rising edge follows
    /// half a period later. Starting a second clock on the same signal is a
    /// usage error.
    pub fn start_clock(&mut self, sig: SignalId, period_fs: u64) -> BenchResult<()> {
        if period_fs < 2 {
            return Err(BenchError::Config(format!(
                "clock period must be at least 2 fs, got {period_fs}"
            )));
        }
        if self.signals[sig.index()].width != 1 {
            return Err(BenchError::Usage(format!(
                "clock signal '{}' must be 1 bit wide",
                self.signals[sig.index()].name
            )));
        }
        if self.clocks.iter().any(|c| c.signal == sig) {
            return Err(BenchError::Usage(format!(
                "clock already running on '{}'",
                self.signals[sig.index()].name
            )));
        }
        debug!(
            signal = %self.signals[sig.index()].name,
            period_fs,
            "clock started"
        );
        let clock = self.clocks.len();
        self.clocks.push(ClockGen {
            signal: sig,
            period_fs,
        });
        self.drive_bit(sig, Logic::Zero)?;
        // Low for the fall-to-rise half, then the first rising toggle.
        let first = self.time.plus_fs(period_fs - period_fs / 2);
        self.push_event(first, EventKind::ClockToggle { clock });
        Ok(())
    }

    /// Starts a clock unless one with the same period is already running on
    /// `sig`; a running clock with a different period is a usage error.
    pub fn ensure_clock(&mut self, sig: SignalId, period_fs: u64) -> BenchResult<()> {
        if let Some(gen) = self.clocks.iter().find(|c| c.signal == sig) {
            if gen.period_fs != period_fs {
                return Err(BenchError::Usage(format!(
                    "clock on '{}' already running with period {} fs, requested {} fs",
                    self.signals[sig.index()].name,
                    gen.period_fs,
                    period_fs
                )));
            }
            return Ok(());
        }
        self.start_clock(sig, period_fs)
    }

    /// Spawns a cooperative task and resumes it once immediately.
    pub fn spawn(&mut self, name: &str, process: Box<dyn Process>) -> BenchResult<TaskId> {
        let id = TaskId(self.tasks.len() as u32);
        self.tasks.push(TaskSlot {
            name: name.to_string(),
            process: Some(process),
            wait: None,
            state: TaskState::Waiting,
        });
        debug!(task = name, "task spawned");
        self.resume_task(id, Wake::Start)?;
        Ok(id)
    }

    /// Cancels a task at its current suspension point.
    ///
    /// Cancelling a task that already finished is a no-op; the state machine
    /// is simply dropped, so any record it completed in a past resume stays
    /// intact.
    pub fn cancel(&mut self, id: TaskId) {
        let slot = &mut self.tasks[id.index()];
        if slot.state == TaskState::Waiting {
            slot.process = None;
            slot.wait = None;
            slot.state = TaskState::Cancelled;
            debug!(task = %slot.name, "task cancelled");
        }
    }

    /// Returns the lifecycle state of a task.
    pub fn task_state(&self, id: TaskId) -> TaskState {
        self.tasks[id.index()].state
    }

    /// Returns true iff the most recent step applied the given edge.
    pub fn edge_occurred(&self, sig: SignalId, edge: Edge) -> bool {
        self.last_edges.iter().any(|&(s, e)| s == sig && e == edge)
    }

    /// Applies the next `(time, delta)` batch of events.
    pub fn step(&mut self) -> BenchResult<StepResult> {
        let batch_time = match self.events.peek() {
            Some(Reverse(ev)) => ev.time,
            None => return Ok(StepResult::Idle),
        };
        if batch_time.fs != self.time.fs {
            self.deltas_at_time = 0;
        }
        self.deltas_at_time += 1;
        if self.deltas_at_time > MAX_DELTAS_PER_STEP {
            return Err(BenchError::DeltaCycleLimit {
                time_fs: batch_time.fs,
                max_deltas: MAX_DELTAS_PER_STEP,
            });
        }
        self.time = batch_time;

        let mut batch = Vec::new();
        while let Some(Reverse(ev)) = self.events.peek() {
            if ev.time == batch_time {
                batch.push(self.events.pop().unwrap().0);
            } else {
                break;
            }
        }

        self.last_edges.clear();
        for ev in batch {
            match ev.kind {
                EventKind::Drive { signal, value } => self.apply_value(signal, value),
                EventKind::ClockToggle { clock } => {
                    let gen_signal = self.clocks[clock].signal;
                    let period = self.clocks[clock].period_fs;
                    let next = if self.bit(gen_signal) == Logic::One {
                        self.apply_value(gen_signal, LogicVec::from_logic(Logic::Zero));
                        period - period / 2
                    } else {
                        self.apply_value(gen_signal, LogicVec::from_logic(Logic::One));
                        period / 2
                    };
                    let at = self.time.plus_fs(next);
                    self.push_event(at, EventKind::ClockToggle { clock });
                }
            }
        }

        let woken: Vec<usize> = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, slot)| {
                slot.state == TaskState::Waiting
                    && slot
                        .wait
                        .is_some_and(|w| self.edge_occurred(w.signal, w.edge))
            })
            .map(|(i, _)| i)
            .collect();
        for i in woken {
            self.tasks[i].wait = None;
            self.resume_task(TaskId(i as u32), Wake::Edge)?;
        }

        Ok(StepResult::Advanced)
    }

    /// Runs for the given duration of simulated time.
    pub fn run_for(&mut self, duration_fs: u64) -> BenchResult<()> {
        let end = self.time.fs + duration_fs;
        loop {
            match self.events.peek() {
                None => break,
                Some(Reverse(ev)) if ev.time.fs > end => break,
                Some(_) => {
                    self.step()?;
                }
            }
        }
        if self.time.fs < end {
            self.time = SimTime::from_fs(end);
        }
        Ok(())
    }

    /// Runs until the given task finishes, or the timeout window elapses.
    ///
    /// Waiting on a cancelled task is a usage error; a drained event queue
    /// while the task is still suspended is a stall.
    pub fn run_until_task_done(
        &mut self,
        task: TaskId,
        timeout_fs: Option<u64>,
        what: &str,
    ) -> BenchResult<()> {
        let deadline = timeout_fs.map(|t| self.time.fs + t);
        loop {
            match self.task_state(task) {
                TaskState::Done => return Ok(()),
                TaskState::Cancelled => {
                    return Err(BenchError::Usage(format!(
                        "waiting on cancelled task '{}'",
                        self.tasks[task.index()].name
                    )))
                }
                TaskState::Waiting => {}
            }
            self.bounded_step(deadline, timeout_fs, what)?;
        }
    }

    /// Runs until `sample` returns true at an occurrence of the named edge,
    /// or the timeout window elapses.
    ///
    /// `sample` is evaluated only on steps where the edge occurred, seeing
    /// the signal state at that edge; an `Err` from `sample` is fatal.
    pub fn run_sampled<F>(
        &mut self,
        clock: SignalId,
        edge: Edge,
        what: &str,
        timeout_fs: Option<u64>,
        mut sample: F,
    ) -> BenchResult<()>
    where
        F: FnMut(&Kernel) -> BenchResult<bool>,
    {
        let deadline = timeout_fs.map(|t| self.time.fs + t);
        loop {
            self.bounded_step(deadline, timeout_fs, what)?;
            if self.edge_occurred(clock, edge) && sample(self)? {
                return Ok(());
            }
        }
    }

    /// Steps once, failing with `Timeout` if the next event lies beyond the
    /// deadline and with `Stalled` if no event is pending.
    fn bounded_step(
        &mut self,
        deadline: Option<u64>,
        timeout_fs: Option<u64>,
        what: &str,
    ) -> BenchResult<()> {
        let next_fs = match self.events.peek() {
            Some(Reverse(ev)) => ev.time.fs,
            None => {
                return Err(BenchError::Stalled {
                    time_fs: self.time.fs,
                })
            }
        };
        if let Some(d) = deadline {
            if next_fs > d {
                self.time = SimTime::from_fs(d);
                return Err(BenchError::Timeout {
                    what: what.to_string(),
                    limit_fs: timeout_fs.unwrap_or(0),
                });
            }
        }
        self.step()?;
        Ok(())
    }

    fn apply_value(&mut self, sig: SignalId, value: LogicVec) {
        let state = &mut self.signals[sig.index()];
        state.previous = state.value.clone();
        state.value = value;
        if state.width == 1 {
            if let Some(edge) = edge_between(state.previous.get(0), state.value.get(0)) {
                self.last_edges.push((sig, edge));
            }
        }
    }

    fn push_event(&mut self, time: SimTime, kind: EventKind) {
        let seq = self.seq;
        self.seq += 1;
        self.events.push(Reverse(SimEvent { time, seq, kind }));
    }

    fn resume_task(&mut self, id: TaskId, wake: Wake) -> BenchResult<()> {
        let Some(mut process) = self.tasks[id.index()].process.take() else {
            return Ok(());
        };
        let mut pending = Vec::new();
        let outcome = {
            let mut cx = SimCtx::new(self.time, &self.signals, &mut pending);
            process.resume(wake, &mut cx)
        };
        for (sig, value) in pending {
            let time = self.time.next_delta();
            self.push_event(time, EventKind::Drive { signal: sig, value });
        }
        let slot = &mut self.tasks[id.index()];
        match outcome? {
            Flow::Wait(wait) => {
                slot.process = Some(process);
                slot.wait = Some(wait);
            }
            Flow::Done => {
                slot.state = TaskState::Done;
                debug!(task = %slot.name, "task finished");
            }
        }
        Ok(())
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalView for Kernel {
    fn value(&self, sig: SignalId) -> &LogicVec {
        &self.signals[sig.index()].value
    }

    fn signal_name(&self, sig: SignalId) -> &str {
        &self.signals[sig.index()].name
    }

    fn time_fs(&self) -> u64 {
        self.time.fs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FS_PER_NS;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Counts edges of one signal, optionally finishing after a quota.
    struct EdgeCounter {
        signal: SignalId,
        edge: Edge,
        count: Rc<RefCell<u64>>,
        quota: Option<u64>,
    }

    impl Process for EdgeCounter {
        fn resume(&mut self, wake: Wake, _cx: &mut SimCtx<'_>) -> BenchResult<Flow> {
            if wake == Wake::Edge {
                *self.count.borrow_mut() += 1;
                if let Some(q) = self.quota {
                    if *self.count.borrow() >= q {
                        return Ok(Flow::Done);
                    }
                }
            }
            Ok(Flow::Wait(Wait {
                signal: self.signal,
                edge: self.edge,
            }))
        }
    }

    /// Records its tag on every rising edge, for resumption-order tests.
    struct OrderRecorder {
        signal: SignalId,
        tag: u32,
        log: Rc<RefCell<Vec<u32>>>,
    }

    impl Process for OrderRecorder {
        fn resume(&mut self, wake: Wake, _cx: &mut SimCtx<'_>) -> BenchResult<Flow> {
            if wake == Wake::Edge {
                self.log.borrow_mut().push(self.tag);
            }
            Ok(Flow::Wait(Wait::rising(self.signal)))
        }
    }

    fn kernel_with_clock(period_ns: u64) -> (Kernel, SignalId) {
        let mut k = Kernel::new();
        let clk = k.add_signal("clk", 1).unwrap();
        k.start_clock(clk, period_ns * FS_PER_NS).unwrap();
        (k, clk)
    }

    #[test]
    fn clock_generates_rising_edges() {
        let (mut k, clk) = kernel_with_clock(10);
        let count = Rc::new(RefCell::new(0));
        k.spawn(
            "counter",
            Box::new(EdgeCounter {
                signal: clk,
                edge: Edge::Rising,
                count: Rc::clone(&count),
                quota: None,
            }),
        )
        .unwrap();
        k.run_for(100 * FS_PER_NS).unwrap();
        // Rising edges at 5, 15, ..., 95 ns.
        assert_eq!(*count.borrow(), 10);
    }

    #[test]
    fn clock_generates_falling_edges() {
        let (mut k, clk) = kernel_with_clock(10);
        let count = Rc::new(RefCell::new(0));
        k.spawn(
            "counter",
            Box::new(EdgeCounter {
                signal: clk,
                edge: Edge::Falling,
                count: Rc::clone(&count),
                quota: None,
            }),
        )
        .unwrap();
        k.run_for(100 * FS_PER_NS).unwrap();
        // Falling edges at 10, 20, ..., 100 ns.
        assert_eq!(*count.borrow(), 10);
    }

    #[test]
    fn odd_period_keeps_full_cycle() {
        // 3.1 ns period: rising edges one period apart despite uneven halves.
        let mut k = Kernel::new();
        let clk = k.add_signal("clk", 1).unwrap();
        k.start_clock(clk, 3_100_000).unwrap();
        let count = Rc::new(RefCell::new(0));
        k.spawn(
            "counter",
            Box::new(EdgeCounter {
                signal: clk,
                edge: Edge::Rising,
                count: Rc::clone(&count),
                quota: None,
            }),
        )
        .unwrap();
        k.run_for(31_000_000).unwrap();
        assert_eq!(*count.borrow(), 10);
    }

    #[test]
    fn drive_takes_effect_next_delta() {
        let mut k = Kernel::new();
        let sig = k.add_signal("input_valid", 1).unwrap();
        assert_eq!(k.bit(sig), Logic::X);
        k.drive_bit(sig, Logic::One).unwrap();
        // Not yet applied.
        assert_eq!(k.bit(sig), Logic::X);
        k.step().unwrap();
        assert_eq!(k.bit(sig), Logic::One);
    }

    #[test]
    fn resumption_order_is_spawn_order() {
        let (mut k, clk) = kernel_with_clock(10);
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in [0u32, 1, 2] {
            k.spawn(
                &format!("recorder{tag}"),
                Box::new(OrderRecorder {
                    signal: clk,
                    tag,
                    log: Rc::clone(&log),
                }),
            )
            .unwrap();
        }
        k.run_for(25 * FS_PER_NS).unwrap();
        // Two rising edges (5 ns, 15 ns), each resuming tasks in spawn order.
        assert_eq!(*log.borrow(), vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn cancellation_stops_resumes() {
        let (mut k, clk) = kernel_with_clock(10);
        let count = Rc::new(RefCell::new(0));
        let id = k
            .spawn(
                "counter",
                Box::new(EdgeCounter {
                    signal: clk,
                    edge: Edge::Rising,
                    count: Rc::clone(&count),
                    quota: None,
                }),
            )
            .unwrap();
        k.run_for(20 * FS_PER_NS).unwrap();
        let seen = *count.borrow();
        k.cancel(id);
        assert_eq!(k.task_state(id), TaskState::Cancelled);
        k.run_for(50 * FS_PER_NS).unwrap();
        assert_eq!(*count.borrow(), seen);
    }

    #[test]
    fn cancel_after_done_is_noop() {
        let (mut k, clk) = kernel_with_clock(10);
        let count = Rc::new(RefCell::new(0));
        let id = k
            .spawn(
                "counter",
                Box::new(EdgeCounter {
                    signal: clk,
                    edge: Edge::Rising,
                    count: Rc::clone(&count),
                    quota: Some(1),
                }),
            )
            .unwrap();
        k.run_for(20 * FS_PER_NS).unwrap();
        assert_eq!(k.task_state(id), TaskState::Done);
        k.cancel(id);
        assert_eq!(k.task_state(id), TaskState::Done);
    }

    #[test]
    fn run_until_task_done_completes() {
        let (mut k, clk) = kernel_with_clock(10);
        let count = Rc::new(RefCell::new(0));
        let id = k
            .spawn(
                "counter",
                Box::new(EdgeCounter {
                    signal: clk,
                    edge: Edge::Rising,
                    count: Rc::clone(&count),
                    quota: Some(3),
                }),
            )
            .unwrap();
        k.run_until_task_done(id, Some(100 * FS_PER_NS), "three edges")
            .unwrap();
        assert_eq!(*count.borrow(), 3);
        assert_eq!(k.task_state(id), TaskState::Done);
    }

    #[test]
    fn run_until_task_done_times_out() {
        let (mut k, clk) = kernel_with_clock(10);
        let count = Rc::new(RefCell::new(0));
        let id = k
            .spawn(
                "counter",
                Box::new(EdgeCounter {
                    signal: clk,
                    edge: Edge::Rising,
                    count: Rc::clone(&count),
                    quota: Some(1_000),
                }),
            )
            .unwrap();
        let err = k
            .run_until_task_done(id, Some(50 * FS_PER_NS), "a thousand edges")
            .unwrap_err();
        assert!(err.is_timeout());
        assert!(err.to_string().contains("a thousand edges"));
        // Time advanced to the deadline.
        assert_eq!(k.time_fs(), 50 * FS_PER_NS);
    }

    #[test]
    fn run_sampled_sees_edge_state() {
        let (mut k, clk) = kernel_with_clock(10);
        let flag = k.add_signal("flag", 1).unwrap();
        k.drive_bit(flag, Logic::Zero).unwrap();

        /// Raises `flag` after its third rising edge.
        struct Raiser {
            clk: SignalId,
            flag: SignalId,
            seen: u32,
        }
        impl Process for Raiser {
            fn resume(&mut self, wake: Wake, cx: &mut SimCtx<'_>) -> BenchResult<Flow> {
                if wake == Wake::Edge {
                    self.seen += 1;
                    if self.seen == 3 {
                        cx.drive_bit(self.flag, Logic::One)?;
                        return Ok(Flow::Done);
                    }
                }
                Ok(Flow::Wait(Wait::rising(self.clk)))
            }
        }
        k.spawn("raiser", Box::new(Raiser { clk, flag, seen: 0 }))
            .unwrap();
        k.run_sampled(clk, Edge::Rising, "flag high at edge", Some(100 * FS_PER_NS), |k| {
            Ok(k.bit(flag) == Logic::One)
        })
        .unwrap();
        // Flag was driven at the third edge, visible from the fourth: 35 ns.
        assert_eq!(k.time_fs(), 35 * FS_PER_NS);
    }

    #[test]
    fn run_sampled_times_out() {
        let (mut k, clk) = kernel_with_clock(10);
        let flag = k.add_signal("flag", 1).unwrap();
        k.drive_bit(flag, Logic::Zero).unwrap();
        let err = k
            .run_sampled(clk, Edge::Rising, "flag high", Some(40 * FS_PER_NS), |k| {
                Ok(k.bit(flag) == Logic::One)
            })
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[test]
    fn stalled_without_events() {
        let mut k = Kernel::new();
        let sig = k.add_signal("clk", 1).unwrap();
        let err = k
            .run_sampled(sig, Edge::Rising, "anything", None, |_| Ok(false))
            .unwrap_err();
        assert!(matches!(err, BenchError::Stalled { .. }));
    }

    #[test]
    fn duplicate_signal_name_rejected() {
        let mut k = Kernel::new();
        k.add_signal("clk", 1).unwrap();
        let err = k.add_signal("clk", 1).unwrap_err();
        assert!(matches!(err, BenchError::Usage(_)));
    }

    #[test]
    fn unknown_signal_lookup() {
        let k = Kernel::new();
        let err = k.signal("nope").unwrap_err();
        assert!(matches!(err, BenchError::UnknownSignal(_)));
    }

    #[test]
    fn ensure_clock_is_idempotent() {
        let mut k = Kernel::new();
        let clk = k.add_signal("clk", 1).unwrap();
        k.ensure_clock(clk, 10 * FS_PER_NS).unwrap();
        k.ensure_clock(clk, 10 * FS_PER_NS).unwrap();
        let err = k.ensure_clock(clk, 20 * FS_PER_NS).unwrap_err();
        assert!(matches!(err, BenchError::Usage(_)));
    }

    #[test]
    fn clock_rejects_wide_signal() {
        let mut k = Kernel::new();
        let bus = k.add_signal("bus", 8).unwrap();
        let err = k.start_clock(bus, 10 * FS_PER_NS).unwrap_err();
        assert!(matches!(err, BenchError::Usage(_)));
    }

    #[test]
    fn run_for_advances_time_without_events() {
        let mut k = Kernel::new();
        k.run_for(42).unwrap();
        assert_eq!(k.time_fs(), 42);
    }

    #[test]
    fn process_error_is_fatal() {
        let (mut k, clk) = kernel_with_clock(10);

        struct Faulty {
            clk: SignalId,
        }
        impl Process for Faulty {
            fn resume(&mut self, wake: Wake, cx: &mut SimCtx<'_>) -> BenchResult<Flow> {
                if wake == Wake::Edge {
                    return Err(BenchError::Unresolved {
                        signal: "input_ready".into(),
                        time_fs: cx.time_fs(),
                    });
                }
                Ok(Flow::Wait(Wait::rising(self.clk)))
            }
        }
        k.spawn("faulty", Box::new(Faulty { clk })).unwrap();
        let err = k.run_for(20 * FS_PER_NS).unwrap_err();
        assert!(matches!(err, BenchError::Unresolved { .. }));
    }
}
