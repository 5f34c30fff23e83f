// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Lindblad dissipator computation.
//!
//! Transfer and decay channels use the full GKSL form
//! D[L](ρ) = γ (L ρ L† − ½{L†L, ρ}). Drain channels move population to an
//! untracked sink: the refill term L ρ L† has nowhere to land, so only the
//! loss half −½γ{L†L, ρ} is applied and the lost mass is accounted as flux.
//!
//! Ref: Breuer & Petruccione, "The Theory of Open Quantum Systems" (2002), Ch. 3.

use ndarray::Array2;
use num_complex::Complex64;

use crate::algebra::dagger;
use crate::operators::build::{JumpKind, JumpOperator};

/// Dissipator contribution of a single jump operator.
pub fn dissipator(op: &JumpOperator, rho: &Array2<Complex64>) -> Array2<Complex64> {
    let l = &op.matrix;
    let gamma = op.rate;

    if gamma == 0.0 {
        return Array2::zeros(rho.raw_dim());
    }

    let l_dag = dagger(l);
    let l_dag_l = l_dag.dot(l);
    let ldl_rho = l_dag_l.dot(rho);
    let rho_ldl = rho.dot(&l_dag_l);

    let half = Complex64::new(0.5, 0.0);
    let gamma_c = Complex64::new(gamma, 0.0);

    match op.kind {
        JumpKind::Transfer | JumpKind::Decay => {
            let l_rho_ldag = l.dot(rho).dot(&l_dag);
            (&l_rho_ldag - half * &ldl_rho - half * &rho_ldl) * gamma_c
        }
        JumpKind::Drain => (-(half * &ldl_rho) - half * &rho_ldl) * gamma_c,
    }
}

/// Sum of all dissipator contributions.
pub fn total_dissipator(ops: &[JumpOperator], rho: &Array2<Complex64>) -> Array2<Complex64> {
    let d = rho.nrows();
    let mut total = Array2::zeros((d, d));
    for op in ops {
        if op.matrix.nrows() != d {
            // Operators must be pre-embedded to the component dimension
            continue;
        }
        total = total + dissipator(op, rho);
    }
    total
}

/// Full Lindblad RHS: dρ/dt = -i[H, ρ] + Σ_k D[L_k](ρ).
pub fn lindblad_rhs(
    hamiltonian: &Array2<Complex64>,
    ops: &[JumpOperator],
    rho: &Array2<Complex64>,
) -> Array2<Complex64> {
    let i = Complex64::new(0.0, 1.0);

    let h_rho = hamiltonian.dot(rho);
    let rho_h = rho.dot(hamiltonian);
    let commutator = -i * (&h_rho - &rho_h);

    commutator + total_dissipator(ops, rho)
}
