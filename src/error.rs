// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for the substrate engine.
//!
//! Expected domain conditions (unknown registers, cross-component gates,
//! degenerate measurements) are reported as values, never as panics: the
//! engine is driven by a real-time tick and must keep running.

use std::fmt;

use crate::engine::registry::{ComponentId, RegisterId};

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Engine error types.
#[derive(Debug)]
pub enum Error {
    /// Configuration error
    Config(String),
    /// Unknown register id
    InvalidRegister(RegisterId),
    /// Component handle refers to a merged-away arena slot
    StaleComponent(ComponentId),
    /// Two-register operation across components that were never merged
    ComponentMismatch { a: RegisterId, b: RegisterId },
    /// Operation would exceed the configured component dimension cap
    DimensionLimit { requested: usize, limit: usize },
    /// Numerical validation failed
    Validation(ValidationError),
    /// Snapshot serialization error
    Serialization(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::InvalidRegister(reg) => write!(f, "Unknown register: {}", reg),
            Error::StaleComponent(id) => write!(f, "Stale component handle: {}", id),
            Error::ComponentMismatch { a, b } => write!(
                f,
                "Registers {} and {} are not in the same component (merge first)",
                a, b
            ),
            Error::DimensionLimit { requested, limit } => write!(
                f,
                "Component dimension {} exceeds configured limit {}",
                requested, limit
            ),
            Error::Validation(e) => write!(f, "Validation error: {}", e),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Validation(e)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Validation errors.
#[derive(Debug)]
pub enum ValidationError {
    /// Field validation failed
    Field { field: String, message: String },
    /// Trace drifted outside tolerance
    TraceDrift { trace: f64, tolerance: f64 },
    /// Matrix is not Hermitian within tolerance
    NotHermitian { deviation: f64, tolerance: f64 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Field { field, message } => {
                write!(f, "Field '{}': {}", field, message)
            }
            ValidationError::TraceDrift { trace, tolerance } => {
                write!(
                    f,
                    "Trace {} deviates from 1.0 by more than {}",
                    trace, tolerance
                )
            }
            ValidationError::NotHermitian {
                deviation,
                tolerance,
            } => {
                write!(
                    f,
                    "Hermiticity deviation {:.3e} exceeds tolerance {:.3e}",
                    deviation, tolerance
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}
