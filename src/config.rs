//! Run parameters for a heat-diffusion simulation.
//!
//! [`SimulationConfig::default`] reproduces the reference run: a 100×100 grid,
//! 500 time steps, diffusion coefficient 0.01 and a hot top edge at 100.0.
//! Values can be loaded from JSON; any field missing from the file keeps its
//! default.

use crate::heat_error::HeatError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default grid edge length `N`.
pub const DEFAULT_GRID_SIZE: usize = 100;
/// Default number of time steps `T`.
pub const DEFAULT_TIME_STEPS: usize = 500;
/// Default diffusion coefficient `α` (time step folded in).
pub const DEFAULT_ALPHA: f64 = 0.01;
/// Default temperature of the fixed hot edge (global row 0).
pub const DEFAULT_SOURCE_TEMPERATURE: f64 = 100.0;

/// What to do with the `N mod P` rows left over by floor division.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemainderPolicy {
    /// Leftover rows are owned by nobody and stay at 0.0 in the gathered grid.
    #[default]
    Truncate,
    /// The last rank owns the leftover rows in addition to its share.
    AssignToLast,
    /// Refuse to run unless `P` divides `N`.
    Reject,
}

/// Fixed inputs of one simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub grid_size: usize,
    pub time_steps: usize,
    pub alpha: f64,
    pub source_temperature: f64,
    /// Hold global row 0 at `source_temperature` for the whole run instead of
    /// letting the stencil evolve it after the initial seeding.
    pub pin_source: bool,
    pub remainder: RemainderPolicy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            time_steps: DEFAULT_TIME_STEPS,
            alpha: DEFAULT_ALPHA,
            source_temperature: DEFAULT_SOURCE_TEMPERATURE,
            pin_source: false,
            remainder: RemainderPolicy::Truncate,
        }
    }
}

impl SimulationConfig {
    pub fn with_grid_size(mut self, grid_size: usize) -> Self {
        self.grid_size = grid_size;
        self
    }

    pub fn with_time_steps(mut self, time_steps: usize) -> Self {
        self.time_steps = time_steps;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_source_temperature(mut self, source_temperature: f64) -> Self {
        self.source_temperature = source_temperature;
        self
    }

    pub fn with_pin_source(mut self, pin_source: bool) -> Self {
        self.pin_source = pin_source;
        self
    }

    pub fn with_remainder(mut self, remainder: RemainderPolicy) -> Self {
        self.remainder = remainder;
        self
    }

    /// Parse a JSON document; absent fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, HeatError> {
        serde_json::from_str(json).map_err(|e| HeatError::ConfigParse(e.to_string()))
    }

    /// Read and parse a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, HeatError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Boundary validation for a run on `workers` ranks.
    ///
    /// Numerical stability of `alpha` is deliberately not checked.
    pub fn validate(&self, workers: usize) -> Result<(), HeatError> {
        if self.grid_size == 0 {
            return Err(HeatError::InvalidConfig("grid_size must be positive".into()));
        }
        if workers == 0 {
            return Err(HeatError::InvalidConfig("worker count must be positive".into()));
        }
        if !self.alpha.is_finite() {
            return Err(HeatError::InvalidConfig(format!(
                "alpha must be finite, got {}",
                self.alpha
            )));
        }
        if !self.source_temperature.is_finite() {
            return Err(HeatError::InvalidConfig(format!(
                "source_temperature must be finite, got {}",
                self.source_temperature
            )));
        }
        if self.grid_size < workers {
            return Err(HeatError::EmptyPartition {
                rank: workers - 1,
                grid_size: self.grid_size,
                workers,
            });
        }
        if self.remainder == RemainderPolicy::Reject && self.grid_size % workers != 0 {
            return Err(HeatError::NonDividingWorkers {
                grid_size: self.grid_size,
                workers,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_run() {
        let cfg = SimulationConfig::default();
        assert_eq!(cfg.grid_size, 100);
        assert_eq!(cfg.time_steps, 500);
        assert_eq!(cfg.alpha, 0.01);
        assert_eq!(cfg.source_temperature, 100.0);
        assert!(!cfg.pin_source);
        assert_eq!(cfg.remainder, RemainderPolicy::Truncate);
    }

    #[test]
    fn json_partial_keeps_defaults() {
        let cfg = SimulationConfig::from_json_str(r#"{"grid_size": 8, "remainder": "assign-to-last"}"#)
            .unwrap();
        assert_eq!(cfg.grid_size, 8);
        assert_eq!(cfg.time_steps, DEFAULT_TIME_STEPS);
        assert_eq!(cfg.remainder, RemainderPolicy::AssignToLast);
    }

    #[test]
    fn json_garbage_is_config_parse_error() {
        let err = SimulationConfig::from_json_str("{ grid_size: ").unwrap_err();
        assert!(matches!(err, HeatError::ConfigParse(_)));
    }

    #[test]
    fn validate_rejects_bad_inputs() {
        let cfg = SimulationConfig::default();
        assert!(cfg.validate(4).is_ok());
        assert!(matches!(cfg.validate(0), Err(HeatError::InvalidConfig(_))));
        assert!(matches!(
            cfg.clone().with_grid_size(0).validate(1),
            Err(HeatError::InvalidConfig(_))
        ));
        assert!(matches!(
            cfg.clone().with_alpha(f64::NAN).validate(1),
            Err(HeatError::InvalidConfig(_))
        ));
        assert!(matches!(
            cfg.clone().with_grid_size(3).validate(4),
            Err(HeatError::EmptyPartition { rank: 3, .. })
        ));
    }

    #[test]
    fn reject_policy_requires_even_split() {
        let cfg = SimulationConfig::default()
            .with_grid_size(10)
            .with_remainder(RemainderPolicy::Reject);
        assert!(cfg.validate(5).is_ok());
        assert!(matches!(
            cfg.validate(3),
            Err(HeatError::NonDividingWorkers {
                grid_size: 10,
                workers: 3
            })
        ));
        // truncation is the default and tolerates remainders
        assert!(cfg.with_remainder(RemainderPolicy::Truncate).validate(3).is_ok());
    }
}
