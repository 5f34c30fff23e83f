// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Engine configuration.
//!
//! Configuration is assembled with the following priority (later sources
//! override earlier ones):
//!
//! 1. Built-in defaults
//! 2. A YAML document supplied by the caller (`EngineConfig::from_yaml_str`)
//! 3. Environment variables (QSUBSTRATE_*)
//!
//! The engine itself never touches the filesystem; callers that persist
//! configuration hand the text in.

use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{Error, Result};

/// Configuration for one engine instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Hard cap on component dimension. Operator embedding is dense and
    /// exponential in register count, so merges that would cross this cap
    /// fail loudly instead of allocating unbounded memory.
    #[serde(default = "default_max_dimension")]
    pub max_component_dimension: usize,

    /// Tolerance for the trace and Hermiticity invariants.
    #[serde(default = "default_trace_tolerance")]
    pub trace_tolerance: f64,

    /// Run invariant checks after every mutating operation. Violations are
    /// logged, not raised; disable only in throughput-critical scopes.
    #[serde(default = "default_check_invariants")]
    pub check_invariants: bool,

    /// Seed for the Born-rule sampler. `None` seeds from entropy; tests set
    /// an explicit seed for reproducible outcomes.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

fn default_max_dimension() -> usize {
    64
}

fn default_trace_tolerance() -> f64 {
    1e-6
}

fn default_check_invariants() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_component_dimension: default_max_dimension(),
            trace_tolerance: default_trace_tolerance(),
            check_invariants: default_check_invariants(),
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    /// Parse configuration from a YAML document, then apply environment
    /// overrides.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut config: EngineConfig = serde_yaml::from_str(yaml)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("QSUBSTRATE_MAX_DIM") {
            if let Ok(dim) = val.parse() {
                self.max_component_dimension = dim;
            }
        }
        if let Ok(val) = env::var("QSUBSTRATE_SEED") {
            if let Ok(seed) = val.parse() {
                self.rng_seed = Some(seed);
            }
        }
        if let Ok(val) = env::var("QSUBSTRATE_CHECK_INVARIANTS") {
            if let Ok(flag) = val.parse() {
                self.check_invariants = flag;
            }
        }
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<()> {
        if self.max_component_dimension < 2 {
            return Err(Error::Config(
                "max_component_dimension must be at least 2".into(),
            ));
        }
        if !self.max_component_dimension.is_power_of_two() {
            return Err(Error::Config(format!(
                "max_component_dimension must be a power of two, got {}",
                self.max_component_dimension
            )));
        }
        if self.trace_tolerance <= 0.0 {
            return Err(Error::Config("trace_tolerance must be > 0".into()));
        }
        Ok(())
    }

    /// Maximum number of registers a single component may hold.
    pub fn max_registers_per_component(&self) -> usize {
        self.max_component_dimension.trailing_zeros() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests touching QSUBSTRATE_* variables must not interleave.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_component_dimension, 64);
        assert_eq!(config.max_registers_per_component(), 6);
        assert!(config.check_invariants);
        assert!(config.rng_seed.is_none());
    }

    #[test]
    fn test_from_yaml_str() {
        let _guard = ENV_LOCK.lock().unwrap();
        let config = EngineConfig::from_yaml_str(
            "max_component_dimension: 16\nrng_seed: 42\n",
        )
        .unwrap();
        assert_eq!(config.max_component_dimension, 16);
        assert_eq!(config.rng_seed, Some(42));
        // Unspecified fields fall back to defaults
        assert!((config.trace_tolerance - 1e-6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_env_overrides_take_precedence() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var("QSUBSTRATE_MAX_DIM", "16");
        env::set_var("QSUBSTRATE_SEED", "7");
        env::set_var("QSUBSTRATE_CHECK_INVARIANTS", "false");

        let config = EngineConfig::from_yaml_str("max_component_dimension: 32\n").unwrap();
        assert_eq!(config.max_component_dimension, 16);
        assert_eq!(config.rng_seed, Some(7));
        assert!(!config.check_invariants);

        // Unparseable values are ignored, leaving the prior value in place
        env::set_var("QSUBSTRATE_MAX_DIM", "not-a-number");
        let mut config = EngineConfig::default();
        config.apply_env_overrides();
        assert_eq!(config.max_component_dimension, 64);

        env::remove_var("QSUBSTRATE_MAX_DIM");
        env::remove_var("QSUBSTRATE_SEED");
        env::remove_var("QSUBSTRATE_CHECK_INVARIANTS");
    }

    #[test]
    fn test_rejects_non_power_of_two_dimension() {
        let config = EngineConfig {
            max_component_dimension: 48,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_tiny_dimension() {
        let config = EngineConfig {
            max_component_dimension: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_tolerance() {
        let config = EngineConfig {
            trace_tolerance: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
