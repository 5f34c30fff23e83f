// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Dense complex-matrix primitives.
//!
//! Everything operates on `ndarray::Array2<Complex64>`. Matrices stay small
//! (component dimension is capped by configuration), so the O(d³) multiplies
//! and O(d₁²d₂²) Kronecker products here are acceptable by construction.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

/// Conjugate transpose (dagger) of a matrix.
pub fn dagger(m: &Array2<Complex64>) -> Array2<Complex64> {
    m.t().mapv(|z| z.conj())
}

/// Kronecker (tensor) product: result dimension = d₁·d₂.
///
/// `a` indexes the high-order bits of the product space, matching the
/// convention that register 0 is the leftmost tensor factor.
pub fn kron(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Array2<Complex64> {
    let (ar, ac) = (a.nrows(), a.ncols());
    let (br, bc) = (b.nrows(), b.ncols());
    let mut out = Array2::zeros((ar * br, ac * bc));
    for i in 0..ar {
        for j in 0..ac {
            let a_ij = a[[i, j]];
            if a_ij == Complex64::new(0.0, 0.0) {
                continue;
            }
            for k in 0..br {
                for l in 0..bc {
                    out[[i * br + k, j * bc + l]] = a_ij * b[[k, l]];
                }
            }
        }
    }
    out
}

/// Trace of a square matrix.
pub fn trace(m: &Array2<Complex64>) -> Complex64 {
    let mut tr = Complex64::new(0.0, 0.0);
    for i in 0..m.nrows() {
        tr += m[[i, i]];
    }
    tr
}

/// Real part of the trace (the physical trace of a density matrix).
pub fn trace_real(m: &Array2<Complex64>) -> f64 {
    trace(m).re
}

/// Purity Tr(ρ²).
pub fn purity(rho: &Array2<Complex64>) -> f64 {
    trace_real(&rho.dot(rho))
}

/// Identity matrix of dimension d.
pub fn identity(d: usize) -> Array2<Complex64> {
    Array2::from_diag_elem(d, Complex64::new(1.0, 0.0))
}

/// Outer product |v⟩⟨v|.
pub fn outer(v: &Array1<Complex64>) -> Array2<Complex64> {
    let d = v.len();
    let mut out = Array2::zeros((d, d));
    for i in 0..d {
        for j in 0..d {
            out[[i, j]] = v[i] * v[j].conj();
        }
    }
    out
}

/// Largest absolute deviation from Hermiticity: max |m[i,j] − m[j,i]*|.
pub fn hermiticity_deviation(m: &Array2<Complex64>) -> f64 {
    let d = m.nrows();
    let mut max_dev = 0.0f64;
    for i in 0..d {
        for j in i..d {
            let dev = (m[[i, j]] - m[[j, i]].conj()).norm();
            max_dev = max_dev.max(dev);
        }
    }
    max_dev
}

/// True when the matrix is Hermitian within tolerance.
pub fn is_hermitian(m: &Array2<Complex64>, tol: f64) -> bool {
    m.nrows() == m.ncols() && hermiticity_deviation(m) <= tol
}

/// Rescale so that Tr(ρ) = 1. Returns false (leaving the matrix untouched)
/// when the trace is too small to divide by.
pub fn renormalize_trace(rho: &mut Array2<Complex64>, floor: f64) -> bool {
    let tr = trace_real(rho);
    if tr.abs() < floor {
        return false;
    }
    let scale = Complex64::new(1.0 / tr, 0.0);
    rho.mapv_inplace(|z| z * scale);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_dagger_swaps_and_conjugates() {
        let mut m = Array2::zeros((2, 2));
        m[[0, 1]] = c(1.0, 2.0);
        m[[1, 0]] = c(3.0, 4.0);
        let d = dagger(&m);
        assert_eq!(d[[0, 1]], c(3.0, -4.0));
        assert_eq!(d[[1, 0]], c(1.0, -2.0));
    }

    #[test]
    fn test_kron_dimensions_and_entries() {
        // σx ⊗ I
        let mut sx = Array2::zeros((2, 2));
        sx[[0, 1]] = c(1.0, 0.0);
        sx[[1, 0]] = c(1.0, 0.0);
        let out = kron(&sx, &identity(2));
        assert_eq!(out.nrows(), 4);
        // (σx ⊗ I)|00⟩ = |10⟩ → column 0 has a 1 at row 2
        assert_eq!(out[[2, 0]], c(1.0, 0.0));
        assert_eq!(out[[3, 1]], c(1.0, 0.0));
        assert_eq!(out[[0, 0]], c(0.0, 0.0));
    }

    #[test]
    fn test_kron_of_identities_is_identity() {
        let out = kron(&identity(2), &identity(4));
        for i in 0..8 {
            for j in 0..8 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(out[[i, j]].re, expected, epsilon = 1e-15);
            }
        }
    }

    #[test]
    fn test_outer_product_is_rank_one_projector() {
        // |+⟩ = (|0⟩ + |1⟩)/√2
        let inv_sqrt2 = 1.0 / 2.0_f64.sqrt();
        let v = Array1::from_vec(vec![c(inv_sqrt2, 0.0), c(inv_sqrt2, 0.0)]);
        let rho = outer(&v);
        assert_relative_eq!(trace_real(&rho), 1.0, epsilon = 1e-12);
        assert_relative_eq!(purity(&rho), 1.0, epsilon = 1e-12);
        assert_relative_eq!(rho[[0, 1]].re, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_hermiticity_deviation() {
        let mut m = identity(2);
        assert_relative_eq!(hermiticity_deviation(&m), 0.0, epsilon = 1e-15);
        m[[0, 1]] = c(0.0, 1.0);
        m[[1, 0]] = c(0.0, 1.0); // Hermitian pair would be (0, -1)
        assert!(hermiticity_deviation(&m) > 1.0);
        assert!(!is_hermitian(&m, 1e-9));
    }

    #[test]
    fn test_renormalize_trace() {
        let mut rho = identity(2) * c(3.0, 0.0);
        assert!(renormalize_trace(&mut rho, 1e-12));
        assert_relative_eq!(trace_real(&rho), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_renormalize_refuses_zero_trace() {
        let mut rho: Array2<Complex64> = Array2::zeros((2, 2));
        assert!(!renormalize_trace(&mut rho, 1e-12));
        assert_eq!(rho[[0, 0]], c(0.0, 0.0));
    }
}
