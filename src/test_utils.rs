// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared test fixtures for engine tests.

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::operators::table::{LabelId, OperatorSpec, OperatorTable};

/// Deterministic engine with default limits and a fixed seed.
pub fn seeded_engine(seed: u64) -> Engine {
    Engine::with_seed(EngineConfig::default(), seed).unwrap()
}

/// Seeded engine with a ("lo", "hi") label pair already interned.
pub fn two_label_engine(seed: u64) -> (Engine, LabelId, LabelId) {
    let mut engine = seeded_engine(seed);
    let lo = engine.intern_label("lo");
    let hi = engine.intern_label("hi");
    (engine, lo, hi)
}

/// Operator table with a single decay channel hi → lo at `rate`.
pub fn decay_table(lo: LabelId, hi: LabelId, rate: f64) -> OperatorTable {
    let mut table = OperatorTable::new();
    table.set(
        hi,
        OperatorSpec {
            decay: Some((lo, rate)),
            ..Default::default()
        },
    );
    table
}
