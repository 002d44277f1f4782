//! Loss functions for phase fitting
//!
//! Gantree: L5_Qsp → Loss
//!
//! `L(φ̂) = Σi |Re <0|U_φ(xi)|0> - f(xi)|²` over the sample points, with
//! `φ` the symmetric expansion of `φ̂`. Two back-ends build the same loss:
//! [`DirectLoss`] multiplies dense 2x2 matrices per sample, [`CompiledLoss`]
//! precomputes the signal rotations and propagates only the first row.

use crate::phases::{mirror, phase_rotation, signal_operator};
use num_complex::Complex64;
use qlcu_core::{QlcuError, QlcuResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Loss over hat phases
pub type LossFunction = Box<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// Builds the fitting loss for a set of samples
/// Gantree: LossCompiler // 손실 함수 생성기
pub trait LossCompiler: Send + Sync {
    /// Back-end name
    fn name(&self) -> &str;

    /// Loss of hat phases for a degree-`degree` sequence against
    /// `targets[i] = f(samples[i])`
    /// Gantree: construct_loss_function(x, f, d) -> Result<LossFunction> // 손실 구성
    fn construct_loss_function(
        &self,
        samples: &[f64],
        targets: &[f64],
        degree: usize,
    ) -> QlcuResult<LossFunction>;
}

fn check_samples(samples: &[f64], targets: &[f64]) -> QlcuResult<()> {
    if samples.len() != targets.len() {
        return Err(QlcuError::InvalidConfig(format!(
            "{} sample points but {} target values",
            samples.len(),
            targets.len()
        )));
    }
    if samples.is_empty() {
        return Err(QlcuError::InvalidConfig("no sample points".into()));
    }
    if let Some(x) = samples.iter().find(|x| !(-1.0..=1.0).contains(*x)) {
        return Err(QlcuError::InvalidConfig(format!(
            "sample point {} outside [-1, 1]",
            x
        )));
    }
    if targets.iter().any(|t| !t.is_finite()) {
        return Err(QlcuError::InvalidConfig("target values must be finite".into()));
    }
    Ok(())
}

// ============================================================================
// Direct Back-end
// ============================================================================

/// Dense matrix products per sample
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectLoss;

impl LossCompiler for DirectLoss {
    fn name(&self) -> &str {
        "direct"
    }

    fn construct_loss_function(
        &self,
        samples: &[f64],
        targets: &[f64],
        degree: usize,
    ) -> QlcuResult<LossFunction> {
        check_samples(samples, targets)?;
        let signals: Vec<_> = samples.iter().map(|&x| signal_operator(x)).collect();
        let targets = targets.to_vec();

        Ok(Box::new(move |hat: &[f64]| {
            let phases: Vec<f64> = hat.iter().chain(mirror(hat, degree)).copied().collect();
            let Some((first, rest)) = phases.split_first() else {
                return f64::INFINITY;
            };
            signals
                .iter()
                .zip(&targets)
                .map(|(w, t)| {
                    let mut u = phase_rotation(*first);
                    for &phi in rest {
                        u = u.dot(w).dot(&phase_rotation(phi));
                    }
                    (u[[0, 0]].re - t).powi(2)
                })
                .sum()
        }))
    }
}

// ============================================================================
// Compiled Back-end
// ============================================================================

/// Row propagation with precomputed `(x, i√(1-x²))` per sample.
///
/// Only `<0|U` is carried: `r ← r·W`, then `r ← r·e^{iφZ}`, so each layer
/// costs a handful of complex multiplications and no allocation per sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompiledLoss;

impl LossCompiler for CompiledLoss {
    fn name(&self) -> &str {
        "compiled"
    }

    fn construct_loss_function(
        &self,
        samples: &[f64],
        targets: &[f64],
        degree: usize,
    ) -> QlcuResult<LossFunction> {
        check_samples(samples, targets)?;
        let signals: Vec<(Complex64, Complex64)> = samples
            .iter()
            .map(|&x| {
                let s = (1.0 - x * x).max(0.0).sqrt();
                (Complex64::new(x, 0.0), Complex64::new(0.0, s))
            })
            .collect();
        let targets = targets.to_vec();

        Ok(Box::new(move |hat: &[f64]| {
            let rotations: Vec<Complex64> = hat
                .iter()
                .chain(mirror(hat, degree))
                .map(|&phi| Complex64::from_polar(1.0, phi))
                .collect();
            let Some((first, rest)) = rotations.split_first() else {
                return f64::INFINITY;
            };

            let mut total = 0.0;
            for ((c, is), t) in signals.iter().zip(&targets) {
                let (mut r0, mut r1) = (*first, Complex64::new(0.0, 0.0));
                for e in rest {
                    let w0 = r0 * c + r1 * is;
                    let w1 = r0 * is + r1 * c;
                    r0 = w0 * e;
                    r1 = w1 * e.conj();
                }
                total += (r0.re - t).powi(2);
            }
            total
        }))
    }
}

// ============================================================================
// Back-end Selection
// ============================================================================

/// Which [`LossCompiler`] a fit uses
/// Gantree: LossBackend // 손실 백엔드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LossBackend {
    /// [`DirectLoss`]
    #[default]
    Direct,

    /// [`CompiledLoss`]
    Compiled,
}

impl LossBackend {
    /// Compiler for this back-end
    pub fn compiler(&self) -> Box<dyn LossCompiler> {
        match self {
            LossBackend::Direct => Box::new(DirectLoss),
            LossBackend::Compiled => Box::new(CompiledLoss),
        }
    }
}

impl fmt::Display for LossBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LossBackend::Direct => write!(f, "direct"),
            LossBackend::Compiled => write!(f, "compiled"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
