//! Chebyshev polynomials
//!
//! Gantree: L5_Qsp → Chebyshev
//!
//! Interpolants on the Chebyshev roots, stored as coefficients in the
//! `T_k` basis and evaluated with the Clenshaw recurrence.

use qlcu_core::{QlcuError, QlcuResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// `n` Chebyshev roots `cos((k + 1/2)π / n)`, descending
/// Gantree: chebyshev_roots(n) -> Vec<f64> // 체비셰프 근
pub fn chebyshev_roots(n: usize) -> Vec<f64> {
    (0..n)
        .map(|k| ((k as f64 + 0.5) * PI / n as f64).cos())
        .collect()
}

/// `n` Chebyshev extrema `cos(kπ / n)`, descending from 1
pub fn chebyshev_extrema(n: usize) -> Vec<f64> {
    (0..n).map(|k| (k as f64 * PI / n as f64).cos()).collect()
}

/// Polynomial `p(x) = Σ c_k T_k(x)`
/// Gantree: ChebyshevPolynomial{{coefficients}} // 체비셰프 다항식
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChebyshevPolynomial {
    coefficients: Vec<f64>,
}

impl ChebyshevPolynomial {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Degree-`degree` interpolant of `f` at the `degree + 1` Chebyshev roots.
    ///
    /// The coefficients are the type-II DCT of the sampled values divided by
    /// `degree + 1`, with the constant term halved.
    /// Gantree: from_function(f, d) -> Self // DCT 보간
    pub fn from_function<F: Fn(f64) -> f64>(f: F, degree: usize) -> Self {
        let n = degree + 1;
        let values: Vec<f64> = chebyshev_roots(n).into_iter().map(&f).collect();
        let mut coefficients: Vec<f64> = (0..n)
            .map(|k| {
                let dct: f64 = values
                    .iter()
                    .enumerate()
                    .map(|(j, y)| y * (PI * k as f64 * (2 * j + 1) as f64 / (2 * n) as f64).cos())
                    .sum();
                2.0 * dct / n as f64
            })
            .collect();
        coefficients[0] /= 2.0;
        Self { coefficients }
    }

    /// Polynomial with the given `T_k` coefficients
    pub fn from_coefficients(coefficients: Vec<f64>) -> QlcuResult<Self> {
        if coefficients.is_empty() {
            return Err(QlcuError::InvalidConfig(
                "Chebyshev polynomial needs at least one coefficient".into(),
            ));
        }
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(QlcuError::InvalidConfig(
                "Chebyshev coefficients must be finite".into(),
            ));
        }
        Ok(Self { coefficients })
    }

    /// The basis polynomial `T_n`
    /// Gantree: basis(n) -> Self // T_n
    pub fn basis(n: usize) -> Self {
        let mut coefficients = vec![0.0; n + 1];
        coefficients[n] = 1.0;
        Self { coefficients }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Coefficients `c_0 .. c_d`
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Nominal degree (number of coefficients minus one)
    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Interpolation nodes for this degree
    pub fn roots(&self) -> Vec<f64> {
        chebyshev_roots(self.degree() + 1)
    }

    /// Extrema of `T_{d+1}` on [-1, 1], excluding -1
    pub fn extrema(&self) -> Vec<f64> {
        chebyshev_extrema(self.degree() + 1)
    }

    /// Only even-index coefficients above `tol`
    pub fn is_even(&self, tol: f64) -> bool {
        self.coefficients.iter().skip(1).step_by(2).all(|c| c.abs() <= tol)
    }

    /// Only odd-index coefficients above `tol`
    pub fn is_odd(&self, tol: f64) -> bool {
        self.coefficients.iter().step_by(2).all(|c| c.abs() <= tol)
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Clenshaw evaluation at `x`
    /// Gantree: evaluate(x) -> f64 // 클렌쇼
    pub fn evaluate(&self, x: f64) -> f64 {
        let (mut b1, mut b2) = (0.0, 0.0);
        for c in self.coefficients.iter().skip(1).rev() {
            let b0 = c + 2.0 * x * b1 - b2;
            b2 = b1;
            b1 = b0;
        }
        self.coefficients[0] + x * b1 - b2
    }

    /// Evaluate at every point of `xs`
    pub fn evaluate_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.evaluate(x)).collect()
    }

    /// Largest `|p(x)|` over `samples` points evenly spaced in [-1, 1]
    pub fn sup_norm(&self, samples: usize) -> f64 {
        let n = samples.max(2);
        (0..n)
            .map(|i| self.evaluate(-1.0 + 2.0 * i as f64 / (n - 1) as f64).abs())
            .fold(0.0, f64::max)
    }
}

impl fmt::Display for ChebyshevPolynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<String> = self
            .coefficients
            .iter()
            .enumerate()
            .filter(|(_, c)| c.abs() > 1e-12)
            .map(|(k, c)| format!("{:+.6}·T{}", c, k))
            .collect();
        if terms.is_empty() {
            write!(f, "0")
        } else {
            write!(f, "{}", terms.join(" "))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
