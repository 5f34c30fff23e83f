// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! One entangled cluster of registers and its quantum state.
//!
//! A component starts as a 1-register pure state vector and is lazily
//! promoted to a density matrix on first use by a non-unitary or
//! embedding-heavy operation; once mixed it stays mixed (deliberate
//! simplification). Components grow by merging and are never split.
//!
//! Register k is the k-th tensor factor from the left: its basis bit sits at
//! position (n − 1 − k) of the state index, bit 0 ↔ the register's `lo`
//! label and bit 1 ↔ `hi`.

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::algebra::{self, dagger, kron, outer};
use crate::engine::registry::{ComponentId, RegisterId};
use crate::error::{Error, Result, ValidationError};
use crate::operators::table::LabelId;
use crate::validation::InvariantViolation;

/// Trace mass below which renormalization and Born sampling refuse to divide.
pub(crate) const TRACE_FLOOR: f64 = 1e-12;

/// Pure state vector or dense density matrix.
#[derive(Debug, Clone)]
pub enum State {
    Pure(Array1<Complex64>),
    Mixed(Array2<Complex64>),
}

/// One entangled cluster: an ordered register list plus its state.
#[derive(Debug, Clone)]
pub struct Component {
    /// Arena handle; stamped on insertion.
    pub id: ComponentId,
    registers: Vec<RegisterId>,
    labels: Vec<(LabelId, LabelId)>,
    state: State,
}

impl Component {
    /// New 1-register component in the pure |lo⟩ state.
    pub fn new_pure(register: RegisterId, labels: (LabelId, LabelId)) -> Self {
        let mut amplitudes = Array1::zeros(2);
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            id: ComponentId::UNSET,
            registers: vec![register],
            labels: vec![labels],
            state: State::Pure(amplitudes),
        }
    }

    pub fn registers(&self) -> &[RegisterId] {
        &self.registers
    }

    /// (lo, hi) label pair per register, in tensor order.
    pub fn label_pairs(&self) -> &[(LabelId, LabelId)] {
        &self.labels
    }

    pub fn num_registers(&self) -> usize {
        self.registers.len()
    }

    pub fn dimension(&self) -> usize {
        1usize << self.registers.len()
    }

    pub fn is_pure(&self) -> bool {
        matches!(self.state, State::Pure(_))
    }

    pub fn contains(&self, register: RegisterId) -> bool {
        self.registers.contains(&register)
    }

    /// Tensor index of a register within this component.
    pub fn index_of(&self, register: RegisterId) -> Result<usize> {
        self.registers
            .iter()
            .position(|&r| r == register)
            .ok_or(Error::InvalidRegister(register))
    }

    /// Label pair of one register.
    pub fn labels_of(&self, register: RegisterId) -> Result<(LabelId, LabelId)> {
        let index = self.index_of(register)?;
        Ok(self.labels[index])
    }

    /// Promote a pure state |ψ⟩ to ρ = |ψ⟩⟨ψ|. Idempotent.
    pub fn ensure_density_matrix(&mut self) {
        if let State::Pure(v) = &self.state {
            self.state = State::Mixed(outer(v));
        }
    }

    /// Dense density matrix, when promoted.
    pub(crate) fn density(&self) -> Option<&Array2<Complex64>> {
        match &self.state {
            State::Mixed(rho) => Some(rho),
            State::Pure(_) => None,
        }
    }

    /// Replace the state with a new density matrix (marks the component mixed).
    pub(crate) fn replace_density(&mut self, rho: Array2<Complex64>) {
        self.state = State::Mixed(rho);
    }

    /// Rescale so Tr(ρ) = 1; false when the mass is below the floor.
    pub fn renormalize(&mut self) -> bool {
        match &mut self.state {
            State::Mixed(rho) => algebra::renormalize_trace(rho, TRACE_FLOOR),
            State::Pure(v) => {
                let norm_sqr: f64 = v.iter().map(|z| z.norm_sqr()).sum();
                if norm_sqr < TRACE_FLOOR {
                    return false;
                }
                let scale = Complex64::new(1.0 / norm_sqr.sqrt(), 0.0);
                v.mapv_inplace(|z| z * scale);
                true
            }
        }
    }

    /// Apply a full-space unitary: ρ′ = UρU†, then renormalize.
    ///
    /// Promotes to a density matrix first; embedding-based multiplies always
    /// leave the component marked mixed.
    pub fn apply_unitary(&mut self, u: &Array2<Complex64>) -> Result<()> {
        let dim = self.dimension();
        if u.nrows() != dim || u.ncols() != dim {
            return Err(ValidationError::Field {
                field: "u".into(),
                message: format!(
                    "operator is {}×{} but component dimension is {}",
                    u.nrows(),
                    u.ncols(),
                    dim
                ),
            }
            .into());
        }
        self.ensure_density_matrix();
        if let State::Mixed(rho) = &mut self.state {
            let next = u.dot(rho).dot(&dagger(u));
            *rho = next;
        }
        self.renormalize();
        Ok(())
    }

    /// Tensor this component with another: ρ = ρ_self ⊗ ρ_other, registers
    /// concatenated with order preserved on each side. The result carries no
    /// arena id yet.
    pub fn merge_with(self, other: Component) -> Component {
        let merged = kron(&self.dense(), &other.dense());

        let mut registers = self.registers;
        registers.extend_from_slice(&other.registers);
        let mut labels = self.labels;
        labels.extend_from_slice(&other.labels);

        Component {
            id: ComponentId::UNSET,
            registers,
            labels,
            state: State::Mixed(merged),
        }
    }

    /// Reduced 2×2 density matrix of one register: partial trace over every
    /// other register in the component.
    ///
    /// This is the single marginal routine behind measurement, inspection,
    /// purity, and coherence, so destructive and non-destructive consumers
    /// can never disagree.
    pub fn marginal_2x2(&self, register: RegisterId) -> Result<Array2<Complex64>> {
        let index = self.index_of(register)?;
        let n = self.registers.len();
        let shift = n - 1 - index;
        let rest_dim = 1usize << (n - 1);

        let mut marginal = Array2::zeros((2, 2));
        for rest in 0..rest_dim {
            let base_lo = insert_bit(rest, shift, 0);
            let base_hi = insert_bit(rest, shift, 1);
            let idx = [base_lo, base_hi];
            match &self.state {
                State::Pure(v) => {
                    for a in 0..2 {
                        for b in 0..2 {
                            marginal[[a, b]] += v[idx[a]] * v[idx[b]].conj();
                        }
                    }
                }
                State::Mixed(rho) => {
                    for a in 0..2 {
                        for b in 0..2 {
                            marginal[[a, b]] += rho[[idx[a], idx[b]]];
                        }
                    }
                }
            }
        }
        Ok(marginal)
    }

    /// Purity Tr(ρ_m²) of one register's marginal.
    pub fn purity_of(&self, register: RegisterId) -> Result<f64> {
        Ok(algebra::purity(&self.marginal_2x2(register)?))
    }

    /// Coherence |ρ_m[0,1]| of one register's marginal.
    pub fn coherence_of(&self, register: RegisterId) -> Result<f64> {
        Ok(self.marginal_2x2(register)?[[0, 1]].norm())
    }

    /// Diagonal of one register's marginal: (P(lo), P(hi)), unnormalized.
    pub fn probabilities_of(&self, register: RegisterId) -> Result<(f64, f64)> {
        let m = self.marginal_2x2(register)?;
        Ok((m[[0, 0]].re, m[[1, 1]].re))
    }

    /// Zero every entry inconsistent with `register` being in basis state
    /// `bit`. No renormalization; callers decide when to renormalize.
    pub(crate) fn project_register(&mut self, register: RegisterId, bit: usize) -> Result<()> {
        let index = self.index_of(register)?;
        let n = self.registers.len();
        let shift = n - 1 - index;
        self.ensure_density_matrix();
        if let State::Mixed(rho) = &mut self.state {
            let dim = rho.nrows();
            for i in 0..dim {
                for j in 0..dim {
                    if (i >> shift) & 1 != bit || (j >> shift) & 1 != bit {
                        rho[[i, j]] = Complex64::new(0.0, 0.0);
                    }
                }
            }
        }
        Ok(())
    }

    /// Check trace and Hermiticity within tolerance. Reports, never panics.
    pub fn validate_invariants(&self, tolerance: f64) -> Option<InvariantViolation> {
        match &self.state {
            State::Mixed(rho) => InvariantViolation::check(rho, tolerance),
            State::Pure(v) => {
                let norm_sqr: f64 = v.iter().map(|z| z.norm_sqr()).sum();
                if (norm_sqr - 1.0).abs() > tolerance {
                    Some(InvariantViolation {
                        trace: norm_sqr,
                        hermiticity_deviation: 0.0,
                        tolerance,
                    })
                } else {
                    None
                }
            }
        }
    }

    /// Density-matrix view of the state, promoting a copy if still pure.
    fn dense(&self) -> Array2<Complex64> {
        match &self.state {
            State::Mixed(rho) => rho.clone(),
            State::Pure(v) => outer(v),
        }
    }

    /// Serializable snapshot: the minimal persistence unit.
    pub fn snapshot(&self) -> ComponentSnapshot {
        let matrix = self.dense();
        ComponentSnapshot {
            registers: self.registers.clone(),
            labels: self.labels.clone(),
            dimension: self.dimension(),
            matrix,
        }
    }

    /// Rebuild a component from a snapshot. The restored component behaves
    /// identically to the one snapshotted.
    pub fn from_snapshot(snapshot: ComponentSnapshot) -> Result<Self> {
        let n = snapshot.registers.len();
        if n == 0 || snapshot.labels.len() != n {
            return Err(Error::Serialization(
                "snapshot register/label lists are inconsistent".into(),
            ));
        }
        let dim = 1usize << n;
        if snapshot.dimension != dim
            || snapshot.matrix.nrows() != dim
            || snapshot.matrix.ncols() != dim
        {
            return Err(Error::Serialization(format!(
                "snapshot dimension {} does not match {} registers",
                snapshot.dimension, n
            )));
        }
        Ok(Component {
            id: ComponentId::UNSET,
            registers: snapshot.registers,
            labels: snapshot.labels,
            state: State::Mixed(snapshot.matrix),
        })
    }
}

/// Insert `bit` at position `shift` of `rest`, shifting higher bits left.
fn insert_bit(rest: usize, shift: usize, bit: usize) -> usize {
    let low = rest & ((1 << shift) - 1);
    let high = (rest >> shift) << (shift + 1);
    high | (bit << shift) | low
}

/// Serializable form of one component:
/// (register order, labels, dimension, dense matrix entries).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentSnapshot {
    pub registers: Vec<RegisterId>,
    pub labels: Vec<(LabelId, LabelId)>,
    pub dimension: usize,
    pub matrix: Array2<Complex64>,
}
