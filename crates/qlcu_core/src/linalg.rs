//! Dense linear algebra helpers
//!
//! Gantree: L0_Foundation → Linalg
//!
//! Kronecker products, adjoints and norms over `ndarray` complex matrices.
//! Index convention everywhere in QLCU: the first factor of a Kronecker
//! product is the most significant bit of the row/column index.

use crate::types::Matrix2;
use ndarray::{Array1, Array2};
use num_complex::Complex64;

/// Identity of dimension `dim`
pub fn identity(dim: usize) -> Array2<Complex64> {
    Array2::from_diag_elem(dim, Complex64::new(1.0, 0.0))
}

/// Lift a [`Matrix2`] into an ndarray matrix
pub fn from_mat2(m: &Matrix2) -> Array2<Complex64> {
    Array2::from_shape_fn((2, 2), |(i, j)| m[i][j])
}

/// Kronecker product `a ⊗ b`
pub fn kron(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Array2<Complex64> {
    let (ar, ac) = a.dim();
    let (br, bc) = b.dim();
    Array2::from_shape_fn((ar * br, ac * bc), |(i, j)| {
        a[[i / br, j / bc]] * b[[i % br, j % bc]]
    })
}

/// Kronecker product of a list, first entry most significant.
/// The empty product is the 1x1 identity.
/// Gantree: kron_list(mats) -> Array2 // 텐서곱
pub fn kron_list(mats: &[Array2<Complex64>]) -> Array2<Complex64> {
    mats.iter()
        .fold(identity(1), |acc, m| kron(&acc, m))
}

/// Conjugate transpose
pub fn dagger(a: &Array2<Complex64>) -> Array2<Complex64> {
    a.t().mapv(|z| z.conj())
}

/// Entry-wise closeness of two matrices of the same shape
pub fn approx_eq(a: &Array2<Complex64>, b: &Array2<Complex64>, atol: f64) -> bool {
    a.dim() == b.dim() && a.iter().zip(b.iter()).all(|(x, y)| (x - y).norm() <= atol)
}

/// Entry-wise closeness of two vectors of the same length
pub fn approx_eq_vec(a: &Array1<Complex64>, b: &Array1<Complex64>, atol: f64) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| (x - y).norm() <= atol)
}

/// Euclidean norm of a vector
pub fn norm(v: &Array1<Complex64>) -> f64 {
    v.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt()
}

/// Whether `a` is unitary to within `atol`
pub fn is_unitary(a: &Array2<Complex64>, atol: f64) -> bool {
    let (r, c) = a.dim();
    r == c && approx_eq(&a.dot(&dagger(a)), &identity(r), atol)
}

/// Spectral norm (largest singular value) by power iteration on `a†a`.
///
/// Meant for validating small block encodings, not for performance.
pub fn operator_norm(a: &Array2<Complex64>) -> f64 {
    let cols = a.ncols();
    if cols == 0 || a.nrows() == 0 {
        return 0.0;
    }
    let gram = dagger(a).dot(a);
    // deterministic start vector with support on every basis state
    let start: Array1<Complex64> =
        Array1::from_shape_fn(cols, |i| Complex64::new(1.0 + 0.1 * i as f64, 0.05 * i as f64));
    let start_norm = norm(&start);
    let mut v = start.mapv(|z| z / start_norm);

    let mut eig = 0.0;
    for _ in 0..500 {
        let w = gram.dot(&v);
        let w_norm = norm(&w);
        if w_norm == 0.0 {
            return 0.0;
        }
        v = w.mapv(|z| z / w_norm);
        let converged = (w_norm - eig).abs() <= 1e-14 * w_norm.max(1.0);
        eig = w_norm;
        if converged {
            break;
        }
    }
    eig.sqrt()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    #[test]
    fn test_kron_ordering() {
        // |1> ⊗ |0> has its amplitude at index 2
        let one = Array2::from_shape_vec((2, 1), vec![c(0.0), c(1.0)]).unwrap();
        let zero = Array2::from_shape_vec((2, 1), vec![c(1.0), c(0.0)]).unwrap();
        let state = kron(&one, &zero);
        assert_eq!(state.dim(), (4, 1));
        assert_abs_diff_eq!(state[[2, 0]].re, 1.0);
    }

    #[test]
    fn test_kron_list_empty_is_scalar_one() {
        let k = kron_list(&[]);
        assert_eq!(k.dim(), (1, 1));
        assert_abs_diff_eq!(k[[0, 0]].re, 1.0);
    }

    #[test]
    fn test_operator_norm_diagonal() {
        let d = Array2::from_diag(&Array1::from(vec![c(0.5), c(-2.0), c(1.0)]));
        assert_abs_diff_eq!(operator_norm(&d), 2.0, epsilon = 1e-8);
    }

    #[test]
    fn test_is_unitary() {
        assert!(is_unitary(&identity(4), 1e-12));
        let mut m = identity(2);
        m[[0, 0]] = c(2.0);
        assert!(!is_unitary(&m, 1e-12));
    }
}
