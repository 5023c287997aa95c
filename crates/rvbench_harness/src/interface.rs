//! Edge-synchronized observation of one ready/valid handshake domain.
//!
//! A [`HandshakeInterface`] wraps the clock, reset, and handshake lines of
//! one domain. Its samplers are pure observers evaluated at clock edges:
//! while the domain is in reset (reset asserted, or reset itself
//! unresolved — the fail-safe reading), every observation is suppressed;
//! outside reset, an unresolved sample on any handshake line is a fatal
//! protocol error, never a retryable condition.

use rvbench_common::{BenchError, BenchResult, Logic};
use rvbench_sim::{Edge, Kernel, SignalId, SignalView};
use std::fmt;

use crate::ports::DomainPorts;

/// One of the two handshake control lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Line {
    /// The "data available" line.
    Valid,
    /// The "receiver ready" line.
    Ready,
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Valid => write!(f, "valid"),
            Line::Ready => write!(f, "ready"),
        }
    }
}

/// The lines of one clocked handshake domain, plus its name for reporting.
#[derive(Clone, Debug)]
pub struct HandshakeInterface {
    name: &'static str,
    /// The domain clock.
    pub clock: SignalId,
    /// The domain reset.
    pub reset: SignalId,
    /// The valid line.
    pub valid: SignalId,
    /// The ready line.
    pub ready: SignalId,
    /// The data lines, if this interface carries data observations.
    pub data: Option<SignalId>,
}

impl HandshakeInterface {
    /// Builds an interface over a domain's ports.
    pub fn for_domain(name: &'static str, ports: &DomainPorts) -> Self {
        Self {
            name,
            clock: ports.clock,
            reset: ports.reset,
            valid: ports.valid,
            ready: ports.ready,
            data: Some(ports.data),
        }
    }

    /// The domain name used in wait descriptions and errors.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// True if reset is asserted, or reset itself reads unresolved.
    pub fn in_reset(&self, view: &impl SignalView) -> bool {
        let r = view.bit(self.reset);
        !r.is_resolvable() || r == Logic::One
    }

    /// Samples one handshake line, requiring it to be resolvable.
    ///
    /// Callers must already have established that the domain is not in
    /// reset; an X or Z here is a protocol violation.
    pub fn sample(&self, view: &impl SignalView, line: Line) -> BenchResult<Logic> {
        let sig = match line {
            Line::Valid => self.valid,
            Line::Ready => self.ready,
        };
        let v = view.bit(sig);
        if !v.is_resolvable() {
            return Err(BenchError::Unresolved {
                signal: view.signal_name(sig).to_string(),
                time_fs: view.time_fs(),
            });
        }
        Ok(v)
    }

    /// True iff, at this edge, the domain is out of reset and `line` reads
    /// asserted.
    pub fn line_sampled(&self, view: &impl SignalView, line: Line) -> BenchResult<bool> {
        if self.in_reset(view) {
            return Ok(false);
        }
        Ok(self.sample(view, line)?.is_one())
    }

    /// True iff, at this edge, the domain is out of reset and both valid and
    /// ready read asserted.
    pub fn handshake_sampled(&self, view: &impl SignalView) -> BenchResult<bool> {
        if self.in_reset(view) {
            return Ok(false);
        }
        let valid = self.sample(view, Line::Valid)?;
        let ready = self.sample(view, Line::Ready)?;
        Ok((valid & ready).is_one())
    }

    /// Reads the data lines as an integer, requiring every bit resolvable.
    pub fn sample_data(&self, view: &impl SignalView) -> BenchResult<u64> {
        let sig = self.data.ok_or_else(|| {
            BenchError::Usage(format!("interface '{}' carries no data lines", self.name))
        })?;
        view.value(sig).to_u64().ok_or_else(|| BenchError::Unresolved {
            signal: view.signal_name(sig).to_string(),
            time_fs: view.time_fs(),
        })
    }

    /// Suspends until `line` reads asserted on a rising clock edge outside
    /// reset; fails with [`BenchError::Timeout`] if a window is given and
    /// elapses first.
    pub fn await_asserted(
        &self,
        k: &mut Kernel,
        line: Line,
        timeout_fs: Option<u64>,
    ) -> BenchResult<()> {
        let what = format!("{} {} asserted", self.name, line);
        k.run_sampled(self.clock, Edge::Rising, &what, timeout_fs, |k| {
            self.line_sampled(k, line)
        })
    }

    /// Suspends until valid and ready read asserted on the same rising clock
    /// edge outside reset; fails with [`BenchError::Timeout`] if a window is
    /// given and elapses first.
    pub fn await_handshake(&self, k: &mut Kernel, timeout_fs: Option<u64>) -> BenchResult<()> {
        let what = format!("{} handshake", self.name);
        k.run_sampled(self.clock, Edge::Rising, &what, timeout_fs, |k| {
            self.handshake_sampled(k)
        })
    }
}
