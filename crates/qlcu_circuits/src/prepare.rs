//! Prepare boxes
//!
//! Gantree: L4_Lcu → Prepare
//!
//! Prepare loads `Σ_i sqrt(|c_i| / λ) |i>` on the index register, with
//! `λ = Σ_i |c_i|`, padded with zeros to a power of two.

use crate::qregs::PrepareQRegs;
use crate::register_box::{BoxKind, RegisterBox};
use crate::register_circuit::RegisterCircuit;
use crate::utils::ceil_log2;
use num_complex::Complex64;
use qlcu_core::{registers, tolerance, Gate, QlcuError, QlcuResult};

/// Prepare box over a `prepare` register
pub type PrepareBox = RegisterBox<PrepareQRegs>;

/// Payload of a Prepare box
/// Gantree: PrepareData{{amplitudes,l1_norm,n_terms}} // 준비 데이터
#[derive(Debug, Clone, PartialEq)]
pub struct PrepareData {
    amplitudes: Vec<Complex64>,
    l1_norm: Option<f64>,
    n_terms: usize,
    inverse: bool,
}

impl PrepareData {
    /// Loaded amplitudes, padded
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// λ, absent for custom amplitudes
    pub fn l1_norm(&self) -> Option<f64> {
        self.l1_norm
    }

    /// Number of unpadded entries
    pub fn n_terms(&self) -> usize {
        self.n_terms
    }

    /// Whether this is the unpreparation
    pub fn is_inverse(&self) -> bool {
        self.inverse
    }

    pub(crate) fn adjoint(&self) -> Self {
        Self {
            inverse: !self.inverse,
            ..self.clone()
        }
    }
}

/// Prepare box for term magnitudes, register [`registers::PREPARE`]
/// Gantree: prepare_box(magnitudes) -> Result<PrepareBox> // 준비 박스
pub fn prepare_box(magnitudes: &[f64]) -> QlcuResult<PrepareBox> {
    prepare_box_with(magnitudes, registers::PREPARE)
}

/// Prepare box for term magnitudes on a register called `register_name`
pub fn prepare_box_with(magnitudes: &[f64], register_name: &str) -> QlcuResult<PrepareBox> {
    if magnitudes.is_empty() {
        return Err(QlcuError::EmptyOperator);
    }
    if let Some(bad) = magnitudes.iter().find(|m| !m.is_finite() || **m < 0.0) {
        return Err(QlcuError::InvalidAmplitudes(format!(
            "magnitude {} is not a finite non-negative number",
            bad
        )));
    }
    let l1: f64 = magnitudes.iter().sum();
    if l1 <= tolerance::ATOL {
        return Err(QlcuError::InvalidAmplitudes(
            "magnitudes sum to zero".into(),
        ));
    }

    let n_prep = ceil_log2(magnitudes.len());
    let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1usize << n_prep];
    for (a, m) in amplitudes.iter_mut().zip(magnitudes) {
        *a = Complex64::new((m / l1).sqrt(), 0.0);
    }

    let data = PrepareData {
        amplitudes,
        l1_norm: Some(l1),
        n_terms: magnitudes.len(),
        inverse: false,
    };
    build(data, register_name)
}

/// Prepare box loading arbitrary normalised `amplitudes` (length a power of
/// two). Such a box has no λ.
/// Gantree: prepare_custom(amplitudes, name) -> Result<PrepareBox> // 사용자 준비
pub fn prepare_custom(amplitudes: &[Complex64], register_name: &str) -> QlcuResult<PrepareBox> {
    if amplitudes.is_empty() || !amplitudes.len().is_power_of_two() {
        return Err(QlcuError::InvalidAmplitudes(format!(
            "{} amplitudes is not a power of two",
            amplitudes.len()
        )));
    }
    let data = PrepareData {
        amplitudes: amplitudes.to_vec(),
        l1_norm: None,
        n_terms: amplitudes.len(),
        inverse: false,
    };
    build(data, register_name)
}

fn build(data: PrepareData, register_name: &str) -> QlcuResult<PrepareBox> {
    let n_prep = ceil_log2(data.amplitudes.len());
    let mut circuit = RegisterCircuit::with_name("PrepareMultiplexorBox");
    let prepare = circuit.add_q_register(register_name, n_prep)?;
    circuit.add_gate(Gate::StatePreparation {
        qubits: prepare.to_list(),
        amplitudes: data.amplitudes.clone(),
        inverse: false,
    })?;
    Ok(RegisterBox::new(PrepareQRegs { prepare }, circuit)?.with_kind(BoxKind::Prepare(data)))
}

impl RegisterBox<PrepareQRegs> {
    /// Prepare payload, also behind a power
    pub fn prepare_data(&self) -> QlcuResult<&PrepareData> {
        match self.kind() {
            BoxKind::Prepare(data) => Ok(data),
            BoxKind::Powered { base, .. } => base.prepare_data(),
            _ => Err(QlcuError::Unsupported(
                "box does not carry prepare data".into(),
            )),
        }
    }

    /// λ of the loaded magnitudes
    pub fn l1_norm(&self) -> QlcuResult<f64> {
        self.prepare_data()?.l1_norm().ok_or_else(|| {
            QlcuError::Unsupported("custom prepare boxes have no l1 norm".into())
        })
    }

    /// Index register width
    pub fn n_prepare_qubits(&self) -> usize {
        self.qregs().prepare.size
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_prepare_state() {
        let pb = prepare_box(&[1.0, 2.0, 1.0]).unwrap();
        assert_eq!(pb.n_prepare_qubits(), 2);
        assert_abs_diff_eq!(pb.l1_norm().unwrap(), 4.0, epsilon = 1e-12);

        let sv = pb.get_statevector(None).unwrap();
        let expected = [0.25, 0.5, 0.25, 0.0];
        for (k, p) in expected.iter().enumerate() {
            assert_abs_diff_eq!(sv[k].norm_sqr(), *p, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_single_magnitude_has_no_qubits() {
        let pb = prepare_box(&[3.0]).unwrap();
        assert_eq!(pb.n_prepare_qubits(), 0);
        assert_eq!(pb.get_statevector(None).unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_magnitudes() {
        assert_eq!(prepare_box(&[]).unwrap_err(), QlcuError::EmptyOperator);
        assert!(matches!(
            prepare_box(&[1.0, -1.0]),
            Err(QlcuError::InvalidAmplitudes(_))
        ));
        assert!(matches!(
            prepare_box(&[0.0, 0.0]),
            Err(QlcuError::InvalidAmplitudes(_))
        ));
    }

    #[test]
    fn test_custom_prepare() {
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let amps = [Complex64::new(h, 0.0), Complex64::new(0.0, h)];
        let pb = prepare_custom(&amps, "r").unwrap();
        assert_eq!(pb.qregs().prepare.name, "r");
        assert!(matches!(pb.l1_norm(), Err(QlcuError::Unsupported(_))));

        let sv = pb.get_statevector(None).unwrap();
        assert_abs_diff_eq!(sv[1].im, h, epsilon = 1e-12);

        assert!(prepare_custom(&[Complex64::new(1.0, 0.0)], "r").is_ok());
        // unnormalised
        assert!(prepare_custom(&amps[..1], "r").is_err());
        assert!(prepare_custom(&[amps[0], amps[1], amps[0]], "r").is_err());
    }

    #[test]
    fn test_adjoint_unprepares() {
        let pb = prepare_box(&[0.3, 0.7]).unwrap();
        let dag = pb.adjoint().unwrap();
        assert!(dag.prepare_data().unwrap().is_inverse());
        let u = pb.get_unitary(None, None).unwrap();
        let ud = dag.get_unitary(None, None).unwrap();
        let id = u.dot(&ud);
        assert_abs_diff_eq!(id[[0, 0]].re, 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(id[[1, 1]].re, 1.0, epsilon = 1e-10);
    }
}
