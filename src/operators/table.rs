// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-label operator authoring data.
//!
//! Labels are arbitrary caller strings (text, emoji). They are interned to
//! small integer ids at this boundary; the numeric core never does
//! string-keyed lookups on the hot path.
//!
//! The table is rebuilt by the caller whenever coefficients change and passed
//! per evolution call; each call's table is authoritative (no incremental
//! update contract).

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Interned basis label id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LabelId(pub u32);

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "label#{}", self.0)
    }
}

/// Interns label strings to dense integer ids.
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    names: Vec<String>,
    index: HashMap<String, LabelId>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a label, returning its id (stable across repeated calls).
    pub fn intern(&mut self, name: &str) -> LabelId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = LabelId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), id);
        id
    }

    /// Look up an already-interned label.
    pub fn get(&self, name: &str) -> Option<LabelId> {
        self.index.get(name).copied()
    }

    /// Resolve an id back to its string.
    pub fn resolve(&self, id: LabelId) -> Option<&str> {
        self.names.get(id.0 as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Time-dependent driving envelope shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriveKind {
    #[default]
    None,
    Cosine,
    Sine,
    /// Square wave: `amplitude` while sin(2πft + φ) > 0, else 0.
    Pulse,
}

/// Time-dependent driving of a label's self-energy.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Drive {
    #[serde(default)]
    pub kind: DriveKind,
    /// Drive frequency in Hz.
    #[serde(default)]
    pub frequency: f64,
    /// Phase offset in radians.
    #[serde(default)]
    pub phase: f64,
    #[serde(default)]
    pub amplitude: f64,
}

impl Drive {
    /// Envelope value at simulated time t (seconds).
    pub fn value_at(&self, t: f64) -> f64 {
        let arg = 2.0 * std::f64::consts::PI * self.frequency * t + self.phase;
        match self.kind {
            DriveKind::None => 0.0,
            DriveKind::Cosine => self.amplitude * arg.cos(),
            DriveKind::Sine => self.amplitude * arg.sin(),
            DriveKind::Pulse => {
                if arg.sin() > 0.0 {
                    self.amplitude
                } else {
                    0.0
                }
            }
        }
    }
}

/// Physics coefficients for one basis label.
///
/// This is external authoring data; the engine consumes it through this
/// contract and does not judge whether the coefficients are physically
/// sensible.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperatorSpec {
    /// Static diagonal energy of this label.
    #[serde(default)]
    pub self_energy: f64,
    /// Optional time-dependent addition to the self-energy.
    #[serde(default)]
    pub drive: Drive,
    /// Symmetric coherent couplings to other labels.
    #[serde(default)]
    pub couplings: Vec<(LabelId, f64)>,
    /// Outgoing incoherent transfer rates: (target label, rate/s).
    #[serde(default)]
    pub transfers_out: Vec<(LabelId, f64)>,
    /// Incoming incoherent transfer rates: (source label, rate/s).
    #[serde(default)]
    pub transfers_in: Vec<(LabelId, f64)>,
    /// Spontaneous decay: (target label, rate/s).
    #[serde(default)]
    pub decay: Option<(LabelId, f64)>,
    /// Drain rate/s into the untracked sink.
    #[serde(default)]
    pub drain_rate: Option<f64>,
}

impl OperatorSpec {
    /// Diagonal energy at simulated time t.
    pub fn energy_at(&self, t: f64) -> f64 {
        self.self_energy + self.drive.value_at(t)
    }
}

/// Per-label coefficient table for one evolution step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperatorTable {
    specs: HashMap<LabelId, OperatorSpec>,
}

impl OperatorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, label: LabelId, spec: OperatorSpec) {
        self.specs.insert(label, spec);
    }

    pub fn get(&self, label: LabelId) -> Option<&OperatorSpec> {
        self.specs.get(&label)
    }

    /// Diagonal energy of a label at time t; unlisted labels contribute 0.
    pub fn energy_at(&self, label: LabelId, t: f64) -> f64 {
        self.specs.get(&label).map_or(0.0, |s| s.energy_at(t))
    }

    /// Symmetric coupling coefficient between two labels.
    ///
    /// Listed under either endpoint; the first match wins so a table that
    /// lists both directions does not double the coupling.
    pub fn coupling_between(&self, a: LabelId, b: LabelId) -> f64 {
        if let Some(spec) = self.specs.get(&a) {
            if let Some(&(_, g)) = spec.couplings.iter().find(|(other, _)| *other == b) {
                return g;
            }
        }
        if let Some(spec) = self.specs.get(&b) {
            if let Some(&(_, g)) = spec.couplings.iter().find(|(other, _)| *other == a) {
                return g;
            }
        }
        0.0
    }
}
