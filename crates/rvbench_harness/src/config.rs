//! Scenario configuration, loadable from TOML.
//!
//! One configuration record describes one scenario run: the simulation
//! backend and timescale, the data width and capacity of the queue under
//! test, the two clock periods (in timescale units, so fractional-nanosecond
//! periods stay exact), and the random seed. Agent targets and throttle
//! rates are chosen by the individual scenarios.

use rvbench_common::{BenchError, BenchResult};
use rvbench_sim::{FS_PER_NS, FS_PER_PS, FS_PER_US};
use serde::Deserialize;

/// Configuration record for one scenario run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Simulation backend name. Only `"builtin"` is known here.
    pub backend: String,
    /// Time unit for the clock periods, e.g. `"1ps"` or `"1ns"`.
    pub timescale: String,
    /// Width of the data lines in bits (1..=64).
    pub data_width: u32,
    /// Queue capacity as a power of two, expressed as log2 (1..=16).
    pub capacity_log2: u32,
    /// Input-domain clock period in timescale units.
    pub input_clock_period: u64,
    /// Output-domain clock period in timescale units.
    pub output_clock_period: u64,
    /// Seed for the per-run random source.
    pub seed: u64,
    /// Scenario name to run, when driven from a configuration file.
    pub scenario: Option<String>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            backend: "builtin".into(),
            timescale: "1ps".into(),
            data_width: 32,
            capacity_log2: 4,
            input_clock_period: 1_000,
            output_clock_period: 1_000,
            seed: 42,
            scenario: None,
        }
    }
}

impl ScenarioConfig {
    /// Parses a configuration from TOML text and validates it.
    pub fn from_toml_str(text: &str) -> BenchResult<Self> {
        let cfg: Self =
            toml::from_str(text).map_err(|e| BenchError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks every field against its allowed range.
    pub fn validate(&self) -> BenchResult<()> {
        if self.backend != "builtin" {
            return Err(BenchError::Config(format!(
                "unknown simulator backend '{}'",
                self.backend
            )));
        }
        if self.data_width == 0 || self.data_width > 64 {
            return Err(BenchError::Config(format!(
                "data width must be in 1..=64, got {}",
                self.data_width
            )));
        }
        if self.capacity_log2 == 0 || self.capacity_log2 > 16 {
            return Err(BenchError::Config(format!(
                "capacity log2 must be in 1..=16, got {}",
                self.capacity_log2
            )));
        }
        if self.input_clock_period == 0 || self.output_clock_period == 0 {
            return Err(BenchError::Config("clock periods must be > 0".into()));
        }
        parse_timescale(&self.timescale)?;
        Ok(())
    }

    /// Queue capacity in items.
    pub fn capacity(&self) -> u64 {
        1u64 << self.capacity_log2
    }

    /// Input-domain clock period in femtoseconds.
    pub fn input_period_fs(&self) -> BenchResult<u64> {
        Ok(self.input_clock_period * parse_timescale(&self.timescale)?)
    }

    /// Output-domain clock period in femtoseconds.
    pub fn output_period_fs(&self) -> BenchResult<u64> {
        Ok(self.output_clock_period * parse_timescale(&self.timescale)?)
    }
}

/// Parses a timescale like `"1ps"`, `"10ps"`, or `"1ns"` into femtoseconds
/// per unit.
fn parse_timescale(s: &str) -> BenchResult<u64> {
    let (digits, suffix) = s
        .char_indices()
        .find(|(_, c)| c.is_ascii_alphabetic())
        .map(|(i, _)| s.split_at(i))
        .ok_or_else(|| BenchError::Config(format!("malformed timescale '{s}'")))?;
    let count: u64 = digits
        .parse()
        .map_err(|_| BenchError::Config(format!("malformed timescale '{s}'")))?;
    if count == 0 {
        return Err(BenchError::Config(format!("malformed timescale '{s}'")));
    }
    let unit = match suffix {
        "fs" => 1,
        "ps" => FS_PER_PS,
        "ns" => FS_PER_NS,
        "us" => FS_PER_US,
        _ => {
            return Err(BenchError::Config(format!(
                "unsupported timescale unit '{suffix}'"
            )))
        }
    };
    Ok(count * unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = ScenarioConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.capacity(), 16);
        assert_eq!(cfg.input_period_fs().unwrap(), FS_PER_NS);
    }

    #[test]
    fn toml_roundtrip_with_defaults() {
        let cfg = ScenarioConfig::from_toml_str(
            r#"
            data_width = 7
            capacity_log2 = 2
            input_clock_period = 5000
            output_clock_period = 3100
            "#,
        )
        .unwrap();
        assert_eq!(cfg.data_width, 7);
        assert_eq!(cfg.capacity(), 4);
        // 3.1 ns expressed exactly in the default 1ps timescale.
        assert_eq!(cfg.output_period_fs().unwrap(), 3_100_000);
        assert_eq!(cfg.seed, 42);
    }

    #[test]
    fn scenario_name_passes_through() {
        let cfg = ScenarioConfig::from_toml_str(r#"scenario = "fill_to_capacity""#).unwrap();
        assert_eq!(cfg.scenario.as_deref(), Some("fill_to_capacity"));
    }

    #[test]
    fn unknown_field_rejected() {
        let err = ScenarioConfig::from_toml_str("depth = 4").unwrap_err();
        assert!(matches!(err, BenchError::Config(_)));
    }

    #[test]
    fn unknown_backend_rejected() {
        let err = ScenarioConfig::from_toml_str(r#"backend = "verilator""#).unwrap_err();
        assert!(err.to_string().contains("backend"));
    }

    #[test]
    fn width_bounds() {
        assert!(ScenarioConfig::from_toml_str("data_width = 0").is_err());
        assert!(ScenarioConfig::from_toml_str("data_width = 65").is_err());
        assert!(ScenarioConfig::from_toml_str("data_width = 64").is_ok());
    }

    #[test]
    fn capacity_bounds() {
        assert!(ScenarioConfig::from_toml_str("capacity_log2 = 0").is_err());
        assert!(ScenarioConfig::from_toml_str("capacity_log2 = 17").is_err());
    }

    #[test]
    fn zero_period_rejected() {
        assert!(ScenarioConfig::from_toml_str("input_clock_period = 0").is_err());
    }

    #[test]
    fn timescale_parsing() {
        assert_eq!(parse_timescale("1fs").unwrap(), 1);
        assert_eq!(parse_timescale("1ps").unwrap(), 1_000);
        assert_eq!(parse_timescale("10ps").unwrap(), 10_000);
        assert_eq!(parse_timescale("1ns").unwrap(), 1_000_000);
        assert_eq!(parse_timescale("1us").unwrap(), 1_000_000_000);
        assert!(parse_timescale("1ms").is_err());
        assert!(parse_timescale("ps").is_err());
        assert!(parse_timescale("0ns").is_err());
        assert!(parse_timescale("17").is_err());
    }
}
