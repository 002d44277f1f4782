//! QSP phase sequences
//!
//! Gantree: L5_Qsp → Phases
//!
//! A degree-`d` sequence has `d + 1` standard phases. Fitted sequences are
//! symmetric, so only the first `ceil((d+1)/2)` ("hat" phases) are free:
//!
//! ```text
//! d odd : φ = (φ̂0 .. φ̂m, φ̂m .. φ̂0)
//! d even: φ = (φ̂0 .. φ̂m-1, φ̂m, φ̂m-1 .. φ̂0)
//! ```
//!
//! The ansatz is `U = e^{iφ0 Z} Πk W(x) e^{iφk Z}` with
//! `W(x) = [[x, i√(1-x²)], [i√(1-x²), x]]`.

use ndarray::{array, Array2};
use num_complex::Complex64;
use qlcu_core::{qsp, QlcuError, QlcuResult};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

// ============================================================================
// Symmetric Reduction
// ============================================================================

/// Hat phases of a standard sequence: its first `ceil(len/2)` entries
/// Gantree: reduce_phases(φ) -> φ̂ // 대칭 축소
pub fn reduce_phases(phases: &[f64]) -> Vec<f64> {
    phases[..(phases.len() + 1) / 2].to_vec()
}

/// Mirror of `hat` for a degree-`degree` sequence, without the hat itself
pub(crate) fn mirror(hat: &[f64], degree: usize) -> impl Iterator<Item = &f64> + '_ {
    // even degree shares the middle phase
    hat.iter().rev().skip(if degree % 2 == 0 { 1 } else { 0 })
}

/// Standard phases from hat phases.
/// Fails when `hat` does not have `ceil((degree+1)/2)` entries.
/// Gantree: expand_phases(φ̂, d) -> Result<φ> // 대칭 확장
pub fn expand_phases(hat: &[f64], degree: usize) -> QlcuResult<Vec<f64>> {
    let expected = qsp::reduced_len(degree);
    if hat.len() != expected {
        return Err(QlcuError::InvalidPhases {
            expected,
            actual: hat.len(),
        });
    }
    let mut phases = Vec::with_capacity(degree + 1);
    phases.extend_from_slice(hat);
    phases.extend(mirror(hat, degree));
    Ok(phases)
}

/// `(π/4, 0, .., 0, π/4)`, the usual starting point of a fit
/// Gantree: default_phases(d) -> φ // 초기 위상
pub fn default_phases(degree: usize) -> Vec<f64> {
    let mut phases = vec![0.0; degree + 1];
    phases[0] = FRAC_PI_4;
    phases[degree] = FRAC_PI_4;
    phases
}

/// Random symmetric phases, hat entries uniform in the phase bounds
pub fn random_symmetric_phases(degree: usize, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let bound = qsp::PHASE_BOUND;
    let hat: Vec<f64> = (0..qsp::reduced_len(degree))
        .map(|_| rng.gen_range(-bound..bound))
        .collect();
    let mut phases = hat.clone();
    phases.extend(mirror(&hat, degree));
    phases
}

/// Whether `phases` equals its own reversal within `tol`
pub fn is_symmetric(phases: &[f64], tol: f64) -> bool {
    phases
        .iter()
        .zip(phases.iter().rev())
        .all(|(a, b)| (a - b).abs() <= tol)
}

// ============================================================================
// Ansatz
// ============================================================================

/// Signal operator `W(x)`
pub fn signal_operator(x: f64) -> Array2<Complex64> {
    let s = (1.0 - x * x).max(0.0).sqrt();
    array![
        [Complex64::new(x, 0.0), Complex64::new(0.0, s)],
        [Complex64::new(0.0, s), Complex64::new(x, 0.0)]
    ]
}

/// `e^{iφZ}`
pub fn phase_rotation(phi: f64) -> Array2<Complex64> {
    let zero = Complex64::new(0.0, 0.0);
    array![
        [Complex64::from_polar(1.0, phi), zero],
        [zero, Complex64::from_polar(1.0, -phi)]
    ]
}

/// The QSP unitary `U_φ(x)`.
/// Fails on an empty phase list.
/// Gantree: qsp_unitary(φ, x) -> Result<U> // QSP 유니터리
pub fn qsp_unitary(phases: &[f64], x: f64) -> QlcuResult<Array2<Complex64>> {
    let (first, rest) = phases.split_first().ok_or(QlcuError::InvalidPhases {
        expected: 1,
        actual: 0,
    })?;
    let w = signal_operator(x);
    let mut u = phase_rotation(*first);
    for &phi in rest {
        u = u.dot(&w).dot(&phase_rotation(phi));
    }
    Ok(u)
}

/// `Re <0|U_φ(x)|0>`, the polynomial realised by `phases`
pub fn qsp_response(phases: &[f64], x: f64) -> QlcuResult<f64> {
    Ok(qsp_unitary(phases, x)?[[0, 0]].re)
}

// ============================================================================
// Convention Conversion
// ============================================================================

/// Converts reflection-convention phases to half-turn angles for an
/// Rz/Rx circuit.
///
/// With `d = len - 1`, the first phase becomes `φ0 + φd + (d-1)π/2`, the
/// inner phases are shifted by `-π/2`, the list is reversed and scaled
/// by `-2/π`.
/// Gantree: qsp_phase_reflection(φ) -> Result<Vec<f64>> // 반사 규약
pub fn qsp_phase_reflection(phases: &[f64]) -> QlcuResult<Vec<f64>> {
    let (first, last) = match (phases.first(), phases.last()) {
        (Some(f), Some(l)) => (*f, *l),
        _ => {
            return Err(QlcuError::InvalidPhases {
                expected: 1,
                actual: 0,
            })
        }
    };
    let d = (phases.len() - 1) as f64;
    let inner = phases.get(1..phases.len() - 1).unwrap_or(&[]);

    let mut converted = Vec::with_capacity(inner.len() + 1);
    converted.push(first + last + (d - 1.0) * FRAC_PI_2);
    converted.extend(inner.iter().map(|p| p - FRAC_PI_2));
    Ok(converted.into_iter().rev().map(|p| -2.0 * p / PI).collect())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use qlcu_core::linalg;

    #[test]
    fn test_expand_and_reduce_are_inverse() {
        for degree in 0..8 {
            let hat: Vec<f64> = (0..qsp::reduced_len(degree))
                .map(|k| 0.1 * (k as f64 + 1.0))
                .collect();
            let phases = expand_phases(&hat, degree).unwrap();
            assert_eq!(phases.len(), degree + 1);
            assert!(is_symmetric(&phases, 0.0));
            assert_eq!(reduce_phases(&phases), hat);
        }
    }

    #[test]
    fn test_expand_shapes() {
        assert_eq!(expand_phases(&[1.0, 2.0], 3).unwrap(), vec![1.0, 2.0, 2.0, 1.0]);
        assert_eq!(expand_phases(&[1.0, 2.0], 2).unwrap(), vec![1.0, 2.0, 1.0]);
        assert_eq!(
            expand_phases(&[1.0, 2.0, 3.0], 3).unwrap_err(),
            QlcuError::InvalidPhases {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn test_default_and_random_seeds() {
        let d = default_phases(4);
        assert_eq!(d, vec![FRAC_PI_4, 0.0, 0.0, 0.0, FRAC_PI_4]);
        assert_eq!(default_phases(0), vec![FRAC_PI_4]);

        let a = random_symmetric_phases(5, 3);
        let b = random_symmetric_phases(5, 3);
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
        assert!(is_symmetric(&a, 0.0));
        assert!(a.iter().all(|p| p.abs() <= PI));
        assert_ne!(a, random_symmetric_phases(5, 4));
    }

    #[test]
    fn test_zero_phases_give_chebyshev_basis() {
        // W(x)^d = e^{i d acos(x) X}, so <0|W^d|0> = T_d(x)
        for degree in 1..6 {
            let phases = vec![0.0; degree + 1];
            for x in [-0.8, -0.1, 0.35, 0.9] {
                let t = (degree as f64 * f64::acos(x)).cos();
                assert_abs_diff_eq!(qsp_response(&phases, x).unwrap(), t, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_unitary_is_unitary() {
        let u = qsp_unitary(&[0.3, -1.1, 0.7, 0.2], 0.4).unwrap();
        assert!(linalg::is_unitary(&u, 1e-12));
        assert!(qsp_unitary(&[], 0.4).is_err());
    }

    #[test]
    fn test_default_phases_respond_with_zero() {
        // e^{iπ/4 Z} W e^{iπ/4 Z}: <0|U|0> = i x
        let r = qsp_response(&default_phases(1), 0.6).unwrap();
        assert_abs_diff_eq!(r, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_phase_reflection() {
        let converted = qsp_phase_reflection(&[0.1, 0.2, 0.3, 0.4]).unwrap();
        // d = 3: first = 0.1 + 0.4 + π, inner = 0.2 - π/2, 0.3 - π/2
        let expected: Vec<f64> = [0.3 - FRAC_PI_2, 0.2 - FRAC_PI_2, 0.5 + PI]
            .iter()
            .map(|p| -2.0 * p / PI)
            .collect();
        assert_eq!(converted.len(), 3);
        for (c, e) in converted.iter().zip(&expected) {
            assert_abs_diff_eq!(c, e, epsilon = 1e-12);
        }
        assert!(qsp_phase_reflection(&[]).is_err());
        assert_eq!(qsp_phase_reflection(&[0.5]).unwrap().len(), 1);
    }
}
