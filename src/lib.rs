// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Quantum Substrate
//!
//! A density-matrix simulation engine for collections of two-level
//! registers. Registers live in factorized components that merge when
//! entangling operations span them; each component evolves under a
//! Lindblad master equation driven by a label-keyed operator table.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │                 Engine                   │
//! │  (registry, clock, RNG, sink flux)       │
//! ├──────────────┬──────────────────────────┤
//! │  Components  │     Operator Table       │
//! │  (ρ per set) │  (energies, channels)    │
//! ├──────────────┴──────────────────────────┤
//! │   Evolution (Euler / Lindblad)           │
//! │   Measurement (Born / projection)        │
//! ├──────────────────────────────────────────┤
//! │   Algebra (ndarray ⊗ num-complex)        │
//! └──────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`engine`]: The engine facade and component registry
//! - [`component`]: Density-matrix components and marginals
//! - [`operators`]: Operator table, gate embedding, H/L construction
//! - [`evolve`]: Lindblad integration and drain accounting
//! - [`measure`]: Projective measurement and inspection
//! - [`algebra`]: Complex matrix helpers
//! - [`config`]: Configuration management
//! - [`validation`]: Invariant checks
//! - [`error`]: Error types

pub mod algebra;
pub mod component;
pub mod config;
pub mod engine;
pub mod error;
pub mod evolve;
pub mod measure;
pub mod operators;
pub mod validation;

pub use component::{Component, ComponentSnapshot};
pub use config::EngineConfig;
pub use engine::registry::{ComponentId, RegisterId};
pub use engine::Engine;
pub use error::{Error, Result};
pub use measure::MeasurementOutcome;
pub use operators::table::{Drive, DriveKind, LabelId, OperatorSpec, OperatorTable};

#[cfg(test)]
pub mod test_utils;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
