// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Dense embedding of 1- and 2-qubit operators into a component's full space.
//!
//! Register k is the k-th tensor factor counting from the left, so its basis
//! bit sits at position (n − 1 − k) of the state index. Both embeddings are
//! dense and exponential in n; the engine's dimension cap keeps that bounded.

use ndarray::Array2;
use num_complex::Complex64;

use crate::algebra::{identity, kron};
use crate::error::{Result, ValidationError};

/// Embed a 2×2 operator at register `target` of an n-register space:
/// I ⊗ … ⊗ U ⊗ … ⊗ I, built by Kronecker composition.
pub fn embed_1q(u: &Array2<Complex64>, target: usize, n: usize) -> Result<Array2<Complex64>> {
    if u.nrows() != 2 || u.ncols() != 2 {
        return Err(ValidationError::Field {
            field: "u".into(),
            message: format!("expected a 2×2 operator, got {}×{}", u.nrows(), u.ncols()),
        }
        .into());
    }
    if target >= n {
        return Err(ValidationError::Field {
            field: "target".into(),
            message: format!("register index {} out of range for {} registers", target, n),
        }
        .into());
    }
    let left = identity(1 << target);
    let right = identity(1 << (n - target - 1));
    Ok(kron(&kron(&left, u), &right))
}

/// Embed a 4×4 two-register operator at registers `idx_a` and `idx_b`.
///
/// Enumerates every pair of full-space basis indices, requires all non-target
/// bits to match, and copies the corresponding entry of `u`, whose row/column
/// index is (bit of idx_a << 1) | bit of idx_b. O(4ⁿ) dense cost.
pub fn embed_2q(
    u: &Array2<Complex64>,
    idx_a: usize,
    idx_b: usize,
    n: usize,
) -> Result<Array2<Complex64>> {
    if u.nrows() != 4 || u.ncols() != 4 {
        return Err(ValidationError::Field {
            field: "u".into(),
            message: format!("expected a 4×4 operator, got {}×{}", u.nrows(), u.ncols()),
        }
        .into());
    }
    if idx_a >= n || idx_b >= n {
        return Err(ValidationError::Field {
            field: "idx_a/idx_b".into(),
            message: format!(
                "register indices ({}, {}) out of range for {} registers",
                idx_a, idx_b, n
            ),
        }
        .into());
    }
    if idx_a == idx_b {
        return Err(ValidationError::Field {
            field: "idx_b".into(),
            message: "two-register operator needs two distinct registers".into(),
        }
        .into());
    }

    let dim = 1usize << n;
    let shift_a = n - 1 - idx_a;
    let shift_b = n - 1 - idx_b;
    let spectator_mask = !((1usize << shift_a) | (1usize << shift_b)) & (dim - 1);

    let mut out = Array2::zeros((dim, dim));
    for row in 0..dim {
        for col in 0..dim {
            if row & spectator_mask != col & spectator_mask {
                continue;
            }
            let u_row = (((row >> shift_a) & 1) << 1) | ((row >> shift_b) & 1);
            let u_col = (((col >> shift_a) & 1) << 1) | ((col >> shift_b) & 1);
            out[[row, col]] = u[[u_row, u_col]];
        }
    }
    Ok(out)
}

/// Hadamard gate.
pub fn hadamard() -> Array2<Complex64> {
    let h = Complex64::new(1.0 / 2.0_f64.sqrt(), 0.0);
    let mut m = Array2::zeros((2, 2));
    m[[0, 0]] = h;
    m[[0, 1]] = h;
    m[[1, 0]] = h;
    m[[1, 1]] = -h;
    m
}

/// Pauli X (basis flip).
pub fn pauli_x() -> Array2<Complex64> {
    let one = Complex64::new(1.0, 0.0);
    let mut m = Array2::zeros((2, 2));
    m[[0, 1]] = one;
    m[[1, 0]] = one;
    m
}

/// Pauli Z.
pub fn pauli_z() -> Array2<Complex64> {
    let one = Complex64::new(1.0, 0.0);
    let mut m = Array2::zeros((2, 2));
    m[[0, 0]] = one;
    m[[1, 1]] = -one;
    m
}

/// CNOT with the first register as control.
pub fn cnot() -> Array2<Complex64> {
    let one = Complex64::new(1.0, 0.0);
    let mut m = Array2::zeros((4, 4));
    m[[0, 0]] = one;
    m[[1, 1]] = one;
    m[[2, 3]] = one;
    m[[3, 2]] = one;
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{dagger, identity};
    use approx::assert_relative_eq;

    fn assert_matrix_close(a: &Array2<Complex64>, b: &Array2<Complex64>, tol: f64) {
        assert_eq!(a.shape(), b.shape());
        for ((i, j), val) in a.indexed_iter() {
            let diff = (val - b[[i, j]]).norm();
            assert!(
                diff < tol,
                "Mismatch at ({}, {}): {:?} vs {:?} (diff={})",
                i,
                j,
                val,
                b[[i, j]],
                diff
            );
        }
    }

    #[test]
    fn test_gates_are_unitary() {
        for gate in [hadamard(), pauli_x(), pauli_z()] {
            let product = gate.dot(&dagger(&gate));
            assert_matrix_close(&product, &identity(2), 1e-12);
        }
        let product = cnot().dot(&dagger(&cnot()));
        assert_matrix_close(&product, &identity(4), 1e-12);
    }

    #[test]
    fn test_embed_1q_at_left_position() {
        // X at register 0 of 2: X ⊗ I
        let full = embed_1q(&pauli_x(), 0, 2).unwrap();
        let expected = kron(&pauli_x(), &identity(2));
        assert_matrix_close(&full, &expected, 1e-15);
    }

    #[test]
    fn test_embed_1q_at_right_position() {
        // X at register 1 of 2: I ⊗ X
        let full = embed_1q(&pauli_x(), 1, 2).unwrap();
        let expected = kron(&identity(2), &pauli_x());
        assert_matrix_close(&full, &expected, 1e-15);
    }

    #[test]
    fn test_embed_1q_middle_of_three() {
        let full = embed_1q(&pauli_z(), 1, 3).unwrap();
        let expected = kron(&kron(&identity(2), &pauli_z()), &identity(2));
        assert_matrix_close(&full, &expected, 1e-15);
    }

    #[test]
    fn test_embed_1q_rejects_bad_target() {
        assert!(embed_1q(&pauli_x(), 2, 2).is_err());
        assert!(embed_1q(&identity(4), 0, 2).is_err());
    }

    #[test]
    fn test_embed_2q_adjacent_matches_kron() {
        // CNOT on registers (0, 1) of a 2-register space is CNOT itself
        let full = embed_2q(&cnot(), 0, 1, 2).unwrap();
        assert_matrix_close(&full, &cnot(), 1e-15);
    }

    #[test]
    fn test_embed_2q_swapped_indices() {
        // Control on register 1, target on register 0: |x y⟩ → |x⊕y y⟩
        let full = embed_2q(&cnot(), 1, 0, 2).unwrap();
        // |01⟩ (index 1) → |11⟩ (index 3)
        assert_relative_eq!(full[[3, 1]].re, 1.0, epsilon = 1e-15);
        assert_relative_eq!(full[[1, 1]].re, 0.0, epsilon = 1e-15);
        // |00⟩ untouched
        assert_relative_eq!(full[[0, 0]].re, 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_embed_2q_with_spectator() {
        // CNOT on (0, 2) of 3 registers: spectator register 1 must be
        // untouched. |1s0⟩ → |1s1⟩ for either spectator bit s.
        let full = embed_2q(&cnot(), 0, 2, 3).unwrap();
        // |100⟩ = 4 → |101⟩ = 5
        assert_relative_eq!(full[[5, 4]].re, 1.0, epsilon = 1e-15);
        // |110⟩ = 6 → |111⟩ = 7
        assert_relative_eq!(full[[7, 6]].re, 1.0, epsilon = 1e-15);
        // No spectator mixing: |100⟩ → |111⟩ must be zero
        assert_relative_eq!(full[[7, 4]].re, 0.0, epsilon = 1e-15);
        // Control clear: |000⟩ stays
        assert_relative_eq!(full[[0, 0]].re, 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_embed_2q_is_unitary_in_full_space() {
        let full = embed_2q(&cnot(), 2, 0, 3).unwrap();
        let product = full.dot(&dagger(&full));
        assert_matrix_close(&product, &identity(8), 1e-12);
    }

    #[test]
    fn test_embed_2q_rejects_degenerate_indices() {
        assert!(embed_2q(&cnot(), 1, 1, 2).is_err());
        assert!(embed_2q(&cnot(), 0, 3, 2).is_err());
    }
}
