//! Single-qubit QSP circuits
//!
//! Gantree: L5_Qsp → QspCircuit
//!
//! The ansatz as gates: `e^{iφZ} = Rz(-2φ)` and `W(x) = Rx(-2 acos x)`,
//! applied from the last phase to the first, optionally between
//! Hadamards.

use crate::phases::qsp_unitary;
use ndarray::Array2;
use num_complex::Complex64;
use qlcu_backend::{CircuitBackend, DenseSimulator};
use qlcu_core::{registers, Circuit, CircuitBuilder, QlcuError, QlcuResult, Qubit};
use serde::{Deserialize, Serialize};

/// Circuit of `U_φ(x)` on qubit `q[0]`, conjugated by H when `hadamards`
/// Gantree: single_qubit_qsp_circuit(φ, x, h) -> Result<Circuit> // QSP 회로
pub fn single_qubit_qsp_circuit(phases: &[f64], x: f64, hadamards: bool) -> QlcuResult<Circuit> {
    let (first, rest) = phases.split_first().ok_or(QlcuError::InvalidPhases {
        expected: 1,
        actual: 0,
    })?;
    if !(-1.0..=1.0).contains(&x) {
        return Err(QlcuError::InvalidGateParameter(format!(
            "signal {} outside [-1, 1]",
            x
        )));
    }

    let q = Qubit::new(registers::STATE, 0);
    let theta = -2.0 * x.acos();
    let mut builder = CircuitBuilder::with_name("U_phi").register(registers::STATE, 1);
    if hadamards {
        builder = builder.h(&q);
    }
    for phi in rest.iter().rev() {
        builder = builder.rz(&q, -2.0 * phi).rx(&q, theta);
    }
    builder = builder.rz(&q, -2.0 * first);
    if hadamards {
        builder = builder.h(&q);
    }
    builder.build()
}

/// Dense unitary of [`single_qubit_qsp_circuit`]
pub fn qsp_circuit_unitary(
    phases: &[f64],
    x: f64,
    hadamards: bool,
) -> QlcuResult<Array2<Complex64>> {
    let circuit = single_qubit_qsp_circuit(phases, x, hadamards)?;
    DenseSimulator::new().unitary(&circuit)
}

/// Diagonal of the circuit unitary at one signal value
/// Gantree: QspSample{{x,u00,u11}} // 응답 표본
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QspSample {
    /// Signal value
    pub x: f64,

    /// `<0|U|0>`
    pub u00: Complex64,

    /// `<1|U|1>`
    pub u11: Complex64,
}

/// Circuit response at `points` signal values evenly spaced in [-1, 1]
/// Gantree: qsp_response_table(φ, n, h) -> Result<Vec<QspSample>> // 응답표
pub fn qsp_response_table(
    phases: &[f64],
    points: usize,
    hadamards: bool,
) -> QlcuResult<Vec<QspSample>> {
    if points < 2 {
        return Err(QlcuError::InvalidConfig(format!(
            "response table needs at least 2 points, got {}",
            points
        )));
    }
    let backend = DenseSimulator::new();
    (0..points)
        .map(|i| {
            let x = (-1.0 + 2.0 * i as f64 / (points - 1) as f64).clamp(-1.0, 1.0);
            let u = backend.unitary(&single_qubit_qsp_circuit(phases, x, hadamards)?)?;
            Ok(QspSample {
                x,
                u00: u[[0, 0]],
                u11: u[[1, 1]],
            })
        })
        .collect()
}

/// Largest entrywise gap between the circuit and [`qsp_unitary`]
pub fn circuit_deviation(phases: &[f64], x: f64) -> QlcuResult<f64> {
    let from_circuit = qsp_circuit_unitary(phases, x, false)?;
    let direct = qsp_unitary(phases, x)?;
    Ok((&from_circuit - &direct)
        .iter()
        .map(|z| z.norm())
        .fold(0.0, f64::max))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phases::qsp_response;
    use approx::assert_abs_diff_eq;
    use qlcu_core::{linalg, Gate};

    #[test]
    fn test_circuit_matches_ansatz() {
        let phases = [0.3, -0.7, 1.1, 0.25, -0.4];
        for x in [-1.0, -0.6, 0.0, 0.45, 0.99] {
            assert!(circuit_deviation(&phases, x).unwrap() < 1e-12, "x = {}", x);
        }
    }

    #[test]
    fn test_gate_layout() {
        let c = single_qubit_qsp_circuit(&[0.1, 0.2, 0.3], 0.5, true).unwrap();
        let gates = c.gates();
        // H, (Rz Rx) x 2, Rz, H
        assert_eq!(gates.len(), 7);
        assert!(matches!(gates[0], Gate::H(_)));
        assert!(matches!(gates[1], Gate::Rz(_, a) if (a + 0.6).abs() < 1e-15));
        assert!(matches!(gates[5], Gate::Rz(_, a) if (a + 0.2).abs() < 1e-15));
        assert!(matches!(gates[6], Gate::H(_)));
        assert_eq!(c.name(), Some("U_phi"));
    }

    #[test]
    fn test_hadamards_conjugate() {
        let phases = [0.2, 0.5, 0.2];
        let x = 0.3;
        let plain = qsp_circuit_unitary(&phases, x, false).unwrap();
        let wrapped = qsp_circuit_unitary(&phases, x, true).unwrap();
        let h = linalg::from_mat2(&Gate::H(Qubit::new("q", 0)).matrix().unwrap());
        assert!(linalg::approx_eq(&wrapped, &h.dot(&plain).dot(&h), 1e-12));
    }

    #[test]
    fn test_response_table() {
        let phases = [0.0; 4];
        let table = qsp_response_table(&phases, 5, false).unwrap();
        assert_eq!(table.len(), 5);
        assert_abs_diff_eq!(table[0].x, -1.0);
        assert_abs_diff_eq!(table[4].x, 1.0);
        for s in &table {
            assert_abs_diff_eq!(s.u00.re, qsp_response(&phases, s.x).unwrap(), epsilon = 1e-12);
        }
        assert!(qsp_response_table(&phases, 1, false).is_err());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(single_qubit_qsp_circuit(&[], 0.2, false).is_err());
        assert!(matches!(
            single_qubit_qsp_circuit(&[0.1], 1.5, false),
            Err(QlcuError::InvalidGateParameter(_))
        ));
    }
}
