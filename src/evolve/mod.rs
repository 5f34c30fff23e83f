// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Forward-Euler integrator for the Lindblad master equation.
//!
//! One step: ρ(t+dt) = ρ + dt·(−i[H(t), ρ] + Σ_k D[L_k](ρ)), followed by
//! trace renormalization. The Hamiltonian is rebuilt each call so
//! time-dependent drives take effect; the step scheme and the pre-step drain
//! accounting below are fixed contracts of the engine, not tunables.

pub mod dissipator;

use ndarray::Array2;
use num_complex::Complex64;

use crate::algebra::trace_real;
use crate::operators::build::{JumpKind, JumpOperator};
use crate::operators::table::LabelId;

pub use dissipator::{dissipator as jump_dissipator, lindblad_rhs, total_dissipator};

/// One explicit Euler step. Does not renormalize; callers renormalize after
/// accounting for drain losses.
pub fn euler_step(
    rho: &Array2<Complex64>,
    hamiltonian: &Array2<Complex64>,
    ops: &[JumpOperator],
    dt: f64,
) -> Array2<Complex64> {
    let dt_c = Complex64::new(dt, 0.0);
    let k = lindblad_rhs(hamiltonian, ops, rho);
    rho + &(dt_c * &k)
}

/// Pre-step drain flux: for every drain channel, rate · dt · P_pre(source),
/// where P_pre is the population of the drain source *before* the step.
///
/// Must be called on the pre-step ρ; the pre-step ordering is part of the
/// drain accounting contract.
pub fn drain_flux(
    rho: &Array2<Complex64>,
    ops: &[JumpOperator],
    dt: f64,
) -> Vec<(LabelId, f64)> {
    let mut flux = Vec::new();
    for op in ops {
        if op.kind != JumpKind::Drain || op.matrix.nrows() != rho.nrows() {
            continue;
        }
        // Drain matrices are projectors, so Tr(L ρ) is the source population.
        let population = trace_real(&op.matrix.dot(rho)).max(0.0);
        flux.push((op.source, op.rate * dt * population));
    }
    flux
}
