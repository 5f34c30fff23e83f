// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Numerical validation of simulation state.
//!
//! Invariant checks report; they do not abort the simulation. The engine logs
//! violations and keeps running (best-effort correctness is a documented
//! tradeoff versus a scientific-grade solver).

use std::fmt;

use ndarray::Array2;
use num_complex::Complex64;

use crate::algebra;
use crate::error::{Error, Result, ValidationError};

/// Check that Tr(ρ) is within tolerance of 1.0.
pub fn check_trace(rho: &Array2<Complex64>, tolerance: f64) -> Result<()> {
    let trace = algebra::trace_real(rho);
    if (trace - 1.0).abs() > tolerance {
        return Err(ValidationError::TraceDrift { trace, tolerance }.into());
    }
    Ok(())
}

/// Check that ρ is Hermitian within tolerance.
pub fn check_hermitian(rho: &Array2<Complex64>, tolerance: f64) -> Result<()> {
    let deviation = algebra::hermiticity_deviation(rho);
    if deviation > tolerance {
        return Err(ValidationError::NotHermitian {
            deviation,
            tolerance,
        }
        .into());
    }
    Ok(())
}

/// Check a prospective component dimension against the configured cap.
pub fn check_dimension(requested: usize, limit: usize) -> Result<()> {
    if requested > limit {
        return Err(Error::DimensionLimit { requested, limit });
    }
    Ok(())
}

/// Report of a failed post-operation invariant check.
///
/// Carried as a value so callers can log it with context; never thrown.
#[derive(Debug)]
pub struct InvariantViolation {
    /// Trace at the time of the check.
    pub trace: f64,
    /// Hermiticity deviation at the time of the check.
    pub hermiticity_deviation: f64,
    /// Tolerance the check ran with.
    pub tolerance: f64,
}

impl InvariantViolation {
    /// Inspect a density matrix; `None` when all invariants hold.
    pub fn check(rho: &Array2<Complex64>, tolerance: f64) -> Option<Self> {
        let trace = algebra::trace_real(rho);
        let hermiticity_deviation = algebra::hermiticity_deviation(rho);
        if (trace - 1.0).abs() > tolerance || hermiticity_deviation > tolerance {
            Some(Self {
                trace,
                hermiticity_deviation,
                tolerance,
            })
        } else {
            None
        }
    }
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invariant violation: trace={:.9}, hermiticity_deviation={:.3e}, tolerance={:.1e}",
            self.trace, self.hermiticity_deviation, self.tolerance
        )
    }
}
