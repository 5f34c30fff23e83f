// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Hamiltonian and jump-operator assembly for one component.
//!
//! A register participates in a channel only when its own label pair carries
//! the channel's endpoint labels; drain needs only the source label. The
//! operator table is 1-qubit authoring data; coherent cross-register
//! coupling goes through explicit 2-qubit gates instead.

use ndarray::Array2;
use num_complex::Complex64;

use crate::error::Result;
use crate::operators::embed::embed_1q;
use crate::operators::table::{LabelId, OperatorTable};

/// A Lindblad jump operator embedded into a component's full space.
#[derive(Debug, Clone)]
pub struct JumpOperator {
    /// Full-space operator matrix (unit-normalized; `rate` is kept separate).
    pub matrix: Array2<Complex64>,
    /// Channel rate in 1/s.
    pub rate: f64,
    /// Source label whose population the channel moves.
    pub source: LabelId,
    pub kind: JumpKind,
}

/// What a jump operator models. Drain channels lose population to an
/// untracked sink and are integrated without the refill term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    Transfer,
    Decay,
    Drain,
}

/// Build the component Hamiltonian at simulated time `t`.
///
/// For each register k with labels (lo, hi): a diagonal term
/// diag(E_lo(t), E_hi(t)) plus, when the table couples the register's own
/// two labels, a symmetric σx-type off-diagonal coupling. The sum is
/// Hermitian by construction.
pub fn build_hamiltonian(
    table: &OperatorTable,
    labels: &[(LabelId, LabelId)],
    t: f64,
) -> Result<Array2<Complex64>> {
    let n = labels.len();
    let dim = 1usize << n;
    let mut h = Array2::zeros((dim, dim));

    for (k, &(lo, hi)) in labels.iter().enumerate() {
        let mut h2: Array2<Complex64> = Array2::zeros((2, 2));
        h2[[0, 0]] = Complex64::new(table.energy_at(lo, t), 0.0);
        h2[[1, 1]] = Complex64::new(table.energy_at(hi, t), 0.0);

        let g = table.coupling_between(lo, hi);
        if g != 0.0 {
            h2[[0, 1]] = Complex64::new(g, 0.0);
            h2[[1, 0]] = Complex64::new(g, 0.0);
        }

        h = h + embed_1q(&h2, k, n)?;
    }
    Ok(h)
}

/// Build the jump operators for every configured channel on every register.
///
/// - Transfer a→b with rate γ (register carries both a and b): √γ·|b⟩⟨a|,
///   entered as matrix |b⟩⟨a| with the rate kept separate.
/// - Decay (same operator form, its own table field).
/// - Drain on label a with rate κ: projector |a⟩⟨a|; the dissipator applies
///   only the loss half since the sink is untracked.
pub fn build_jump_operators(
    table: &OperatorTable,
    labels: &[(LabelId, LabelId)],
) -> Result<Vec<JumpOperator>> {
    let n = labels.len();
    let mut ops = Vec::new();

    for (k, &(lo, hi)) in labels.iter().enumerate() {
        // bit 0 ↔ lo, bit 1 ↔ hi
        for (source, source_bit) in [(lo, 0usize), (hi, 1usize)] {
            let target = if source_bit == 0 { hi } else { lo };
            let target_bit = 1 - source_bit;
            let spec = match table.get(source) {
                Some(spec) => spec,
                None => continue,
            };

            for &(to, rate) in &spec.transfers_out {
                if to == target && rate > 0.0 {
                    ops.push(JumpOperator {
                        matrix: embed_1q(&ketbra(target_bit, source_bit), k, n)?,
                        rate,
                        source,
                        kind: JumpKind::Transfer,
                    });
                }
            }

            // Incoming rates are authored on the receiving label: population
            // flows from this register's other label into `source`.
            for &(from, rate) in &spec.transfers_in {
                if from == target && rate > 0.0 {
                    ops.push(JumpOperator {
                        matrix: embed_1q(&ketbra(source_bit, target_bit), k, n)?,
                        rate,
                        source: target,
                        kind: JumpKind::Transfer,
                    });
                }
            }

            if let Some((to, rate)) = spec.decay {
                if to == target && rate > 0.0 {
                    ops.push(JumpOperator {
                        matrix: embed_1q(&ketbra(target_bit, source_bit), k, n)?,
                        rate,
                        source,
                        kind: JumpKind::Decay,
                    });
                }
            }

            if let Some(rate) = spec.drain_rate {
                if rate > 0.0 {
                    ops.push(JumpOperator {
                        matrix: embed_1q(&ketbra(source_bit, source_bit), k, n)?,
                        rate,
                        source,
                        kind: JumpKind::Drain,
                    });
                }
            }
        }
    }
    Ok(ops)
}

/// 2×2 matrix unit |i⟩⟨j|.
fn ketbra(i: usize, j: usize) -> Array2<Complex64> {
    let mut m = Array2::zeros((2, 2));
    m[[i, j]] = Complex64::new(1.0, 0.0);
    m
}
