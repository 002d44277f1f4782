//! Quantum gate definitions for QLCU
//!
//! Gantree: L1_Circuit → Gate
//!
//! Gates carry their own named-qubit arguments. Besides the usual
//! primitives there are composite gates that hold a sub-circuit
//! (`CircBox`, `QControl`), an amplitude-encoding `StatePreparation` and a
//! uniformly controlled `Multiplexor` of tensored single-qubit unitaries.

use crate::circuit::Circuit;
use crate::constants::tolerance;
use crate::error::{QlcuError, QlcuResult};
use crate::types::{mat2, Angle, Bit, Matrix2, Qubit};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Pattern-indexed list of per-target unitaries used by [`Gate::Multiplexor`].
/// Each pattern is read most significant control first.
pub type OpMap = Vec<(Vec<bool>, Vec<Matrix2>)>;

/// Quantum gate enumeration
/// Gantree: Gate // 게이트 enum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Gate {
    // ========================================================================
    // Single-Qubit Gates (Non-Parameterized)
    // ========================================================================
    /// Hadamard gate
    /// Gantree: H(Qubit) // 하다마드
    H(Qubit),

    /// Pauli-X gate (NOT)
    X(Qubit),

    /// Pauli-Y gate
    Y(Qubit),

    /// Pauli-Z gate
    Z(Qubit),

    /// S gate (sqrt(Z))
    S(Qubit),

    /// S-dagger gate
    Sdg(Qubit),

    /// T gate (fourth root of Z)
    T(Qubit),

    /// T-dagger gate
    Tdg(Qubit),

    // ========================================================================
    // Single-Qubit Parameterized Gates
    // ========================================================================
    /// Rotation around X-axis, `exp(-i θ X / 2)`
    /// Gantree: Rx(Qubit, Angle) // X 회전
    Rx(Qubit, Angle),

    /// Rotation around Y-axis, `exp(-i θ Y / 2)`
    Ry(Qubit, Angle),

    /// Rotation around Z-axis, `exp(-i θ Z / 2)`
    Rz(Qubit, Angle),

    /// Arbitrary single-qubit unitary
    /// Gantree: Unitary1q(Qubit, Matrix2) // 임의 U2
    Unitary1q(Qubit, Matrix2),

    // ========================================================================
    // Two-Qubit Gates
    // ========================================================================
    /// Controlled-X (control, target)
    Cx(Qubit, Qubit),

    /// Controlled-Z
    Cz(Qubit, Qubit),

    /// Swap
    Swap(Qubit, Qubit),

    // ========================================================================
    // Composite Gates
    // ========================================================================
    /// Unitary whose first column is `amplitudes` (normalised, length 2^k).
    /// `inverse` applies its adjoint.
    /// Gantree: StatePreparation{{qubits,amplitudes,inverse}} // 상태 준비
    StatePreparation {
        /// Prepared qubits, first most significant
        qubits: Vec<Qubit>,
        /// Target amplitudes
        amplitudes: Vec<Complex64>,
        /// Apply the adjoint
        inverse: bool,
    },

    /// Uniformly controlled tensor product of single-qubit unitaries.
    /// When the controls read a pattern of `op_map`, the matching list is
    /// applied to `targets` (one unitary per target); other patterns act as
    /// identity.
    /// Gantree: Multiplexor{{controls,targets,op_map}} // 멀티플렉서
    Multiplexor {
        /// Qubits read as the control pattern
        controls: Vec<Qubit>,
        /// Qubits the selected unitaries act on
        targets: Vec<Qubit>,
        /// Control pattern to per-target unitaries
        op_map: OpMap,
    },

    /// `body` applied to `targets` when every control is 1
    QControl {
        /// Control qubits, all required to be 1
        controls: Vec<Qubit>,
        /// Qubits wired to `body` in its sorted order
        targets: Vec<Qubit>,
        /// Controlled sub-circuit
        body: Box<Circuit>,
    },

    /// `body` as a single composite gate. Argument `i` is wired to the
    /// `i`-th qubit (bit) of `body` in its sorted order.
    /// Gantree: CircBox{{qubits,bits,body}} // 회로 상자
    CircBox {
        /// Qubit arguments
        qubits: Vec<Qubit>,
        /// Bit arguments
        bits: Vec<Bit>,
        /// Boxed sub-circuit
        body: Box<Circuit>,
    },

    // ========================================================================
    // Non-Unitary
    // ========================================================================
    /// Measure qubit into bit
    Measure(Qubit, Bit),

    /// Barrier (no-op)
    Barrier(Vec<Qubit>),
}

impl Gate {
    // ========================================================================
    // Query Methods
    // ========================================================================

    /// Qubits the gate acts on, in argument order
    /// Gantree: qubits(&self) -> Vec<Qubit> // 대상 큐비트
    pub fn qubits(&self) -> Vec<Qubit> {
        match self {
            Gate::H(q)
            | Gate::X(q)
            | Gate::Y(q)
            | Gate::Z(q)
            | Gate::S(q)
            | Gate::Sdg(q)
            | Gate::T(q)
            | Gate::Tdg(q)
            | Gate::Rx(q, _)
            | Gate::Ry(q, _)
            | Gate::Rz(q, _)
            | Gate::Unitary1q(q, _)
            | Gate::Measure(q, _) => vec![q.clone()],

            Gate::Cx(a, b) | Gate::Cz(a, b) | Gate::Swap(a, b) => vec![a.clone(), b.clone()],

            Gate::StatePreparation { qubits, .. } | Gate::CircBox { qubits, .. } => qubits.clone(),

            Gate::Multiplexor {
                controls, targets, ..
            }
            | Gate::QControl {
                controls, targets, ..
            } => controls.iter().chain(targets.iter()).cloned().collect(),

            Gate::Barrier(qs) => qs.clone(),
        }
    }

    /// Bits the gate writes
    pub fn bits(&self) -> Vec<Bit> {
        match self {
            Gate::Measure(_, b) => vec![b.clone()],
            Gate::CircBox { bits, .. } => bits.clone(),
            _ => Vec::new(),
        }
    }

    /// Check if single-qubit primitive
    pub fn is_single_qubit(&self) -> bool {
        self.matrix().is_some()
    }

    /// Check if the gate holds a sub-circuit or a structured matrix
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            Gate::StatePreparation { .. }
                | Gate::Multiplexor { .. }
                | Gate::QControl { .. }
                | Gate::CircBox { .. }
        )
    }

    /// Check if measurement
    pub fn is_measurement(&self) -> bool {
        matches!(self, Gate::Measure(..))
    }

    /// Get gate name
    pub fn name(&self) -> &'static str {
        match self {
            Gate::H(_) => "h",
            Gate::X(_) => "x",
            Gate::Y(_) => "y",
            Gate::Z(_) => "z",
            Gate::S(_) => "s",
            Gate::Sdg(_) => "sdg",
            Gate::T(_) => "t",
            Gate::Tdg(_) => "tdg",
            Gate::Rx(..) => "rx",
            Gate::Ry(..) => "ry",
            Gate::Rz(..) => "rz",
            Gate::Unitary1q(..) => "unitary1q",
            Gate::Cx(..) => "cx",
            Gate::Cz(..) => "cz",
            Gate::Swap(..) => "swap",
            Gate::StatePreparation { .. } => "state_preparation",
            Gate::Multiplexor { .. } => "multiplexor",
            Gate::QControl { .. } => "qcontrol",
            Gate::CircBox { .. } => "circbox",
            Gate::Measure(..) => "measure",
            Gate::Barrier(_) => "barrier",
        }
    }

    /// 2x2 matrix for single-qubit primitives, `None` otherwise
    /// Gantree: matrix(&self) -> Option<Matrix2> // 1Q 행렬
    pub fn matrix(&self) -> Option<Matrix2> {
        let o = Complex64::new(0.0, 0.0);
        let l = Complex64::new(1.0, 0.0);
        let i = Complex64::new(0.0, 1.0);
        let h = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
        let m = match self {
            Gate::H(_) => [[h, h], [h, -h]],
            Gate::X(_) => [[o, l], [l, o]],
            Gate::Y(_) => [[o, -i], [i, o]],
            Gate::Z(_) => [[l, o], [o, -l]],
            Gate::S(_) => [[l, o], [o, i]],
            Gate::Sdg(_) => [[l, o], [o, -i]],
            Gate::T(_) => [[l, o], [o, Complex64::from_polar(1.0, std::f64::consts::FRAC_PI_4)]],
            Gate::Tdg(_) => [[l, o], [o, Complex64::from_polar(1.0, -std::f64::consts::FRAC_PI_4)]],
            Gate::Rx(_, theta) => {
                let (c, s) = ((theta / 2.0).cos(), (theta / 2.0).sin());
                [
                    [Complex64::new(c, 0.0), Complex64::new(0.0, -s)],
                    [Complex64::new(0.0, -s), Complex64::new(c, 0.0)],
                ]
            }
            Gate::Ry(_, theta) => {
                let (c, s) = ((theta / 2.0).cos(), (theta / 2.0).sin());
                [
                    [Complex64::new(c, 0.0), Complex64::new(-s, 0.0)],
                    [Complex64::new(s, 0.0), Complex64::new(c, 0.0)],
                ]
            }
            Gate::Rz(_, theta) => [
                [Complex64::from_polar(1.0, -theta / 2.0), o],
                [o, Complex64::from_polar(1.0, theta / 2.0)],
            ],
            Gate::Unitary1q(_, u) => *u,
            _ => return None,
        };
        Some(m)
    }

    // ========================================================================
    // Transformations
    // ========================================================================

    /// Adjoint gate
    /// Gantree: dagger(&self) -> Result<Gate> // 수반
    pub fn dagger(&self) -> QlcuResult<Gate> {
        let g = match self {
            Gate::H(_) | Gate::X(_) | Gate::Y(_) | Gate::Z(_) => self.clone(),
            Gate::Cx(..) | Gate::Cz(..) | Gate::Swap(..) | Gate::Barrier(_) => self.clone(),
            Gate::S(q) => Gate::Sdg(q.clone()),
            Gate::Sdg(q) => Gate::S(q.clone()),
            Gate::T(q) => Gate::Tdg(q.clone()),
            Gate::Tdg(q) => Gate::T(q.clone()),
            Gate::Rx(q, a) => Gate::Rx(q.clone(), -a),
            Gate::Ry(q, a) => Gate::Ry(q.clone(), -a),
            Gate::Rz(q, a) => Gate::Rz(q.clone(), -a),
            Gate::Unitary1q(q, u) => Gate::Unitary1q(q.clone(), mat2::dagger(u)),
            Gate::StatePreparation {
                qubits,
                amplitudes,
                inverse,
            } => Gate::StatePreparation {
                qubits: qubits.clone(),
                amplitudes: amplitudes.clone(),
                inverse: !inverse,
            },
            Gate::Multiplexor {
                controls,
                targets,
                op_map,
            } => Gate::Multiplexor {
                controls: controls.clone(),
                targets: targets.clone(),
                op_map: op_map
                    .iter()
                    .map(|(bits, ops)| (bits.clone(), ops.iter().map(mat2::dagger).collect()))
                    .collect(),
            },
            Gate::QControl {
                controls,
                targets,
                body,
            } => Gate::QControl {
                controls: controls.clone(),
                targets: targets.clone(),
                body: Box::new(body.dagger()?),
            },
            Gate::CircBox { qubits, bits, body } => Gate::CircBox {
                qubits: qubits.clone(),
                bits: bits.clone(),
                body: Box::new(body.dagger()?),
            },
            Gate::Measure(..) => {
                return Err(QlcuError::NonUnitaryOperation(self.name().to_string()))
            }
        };
        Ok(g)
    }

    /// Rewire the gate's outer arguments. Sub-circuits keep their own units.
    pub fn map_units(&self, fq: &dyn Fn(&Qubit) -> Qubit, fb: &dyn Fn(&Bit) -> Bit) -> Gate {
        let mq = |qs: &[Qubit]| qs.iter().map(fq).collect::<Vec<_>>();
        match self {
            Gate::H(q) => Gate::H(fq(q)),
            Gate::X(q) => Gate::X(fq(q)),
            Gate::Y(q) => Gate::Y(fq(q)),
            Gate::Z(q) => Gate::Z(fq(q)),
            Gate::S(q) => Gate::S(fq(q)),
            Gate::Sdg(q) => Gate::Sdg(fq(q)),
            Gate::T(q) => Gate::T(fq(q)),
            Gate::Tdg(q) => Gate::Tdg(fq(q)),
            Gate::Rx(q, a) => Gate::Rx(fq(q), *a),
            Gate::Ry(q, a) => Gate::Ry(fq(q), *a),
            Gate::Rz(q, a) => Gate::Rz(fq(q), *a),
            Gate::Unitary1q(q, u) => Gate::Unitary1q(fq(q), *u),
            Gate::Cx(a, b) => Gate::Cx(fq(a), fq(b)),
            Gate::Cz(a, b) => Gate::Cz(fq(a), fq(b)),
            Gate::Swap(a, b) => Gate::Swap(fq(a), fq(b)),
            Gate::StatePreparation {
                qubits,
                amplitudes,
                inverse,
            } => Gate::StatePreparation {
                qubits: mq(qubits),
                amplitudes: amplitudes.clone(),
                inverse: *inverse,
            },
            Gate::Multiplexor {
                controls,
                targets,
                op_map,
            } => Gate::Multiplexor {
                controls: mq(controls),
                targets: mq(targets),
                op_map: op_map.clone(),
            },
            Gate::QControl {
                controls,
                targets,
                body,
            } => Gate::QControl {
                controls: mq(controls),
                targets: mq(targets),
                body: body.clone(),
            },
            Gate::CircBox { qubits, bits, body } => Gate::CircBox {
                qubits: mq(qubits),
                bits: bits.iter().map(fb).collect(),
                body: body.clone(),
            },
            Gate::Measure(q, b) => Gate::Measure(fq(q), fb(b)),
            Gate::Barrier(qs) => Gate::Barrier(mq(qs)),
        }
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check argument shapes and parameters
    /// Gantree: validate(&self) -> Result // 검증
    pub fn validate(&self) -> QlcuResult<()> {
        let qubits = self.qubits();
        let unique: BTreeSet<&Qubit> = qubits.iter().collect();
        if unique.len() != qubits.len() {
            return Err(QlcuError::InvalidGateParameter(format!(
                "{} acts on a repeated qubit",
                self.name()
            )));
        }

        match self {
            Gate::Rx(_, a) | Gate::Ry(_, a) | Gate::Rz(_, a) if !a.is_finite() => Err(
                QlcuError::InvalidGateParameter(format!("angle {} must be finite", a)),
            ),
            Gate::Unitary1q(_, u) if !mat2::is_unitary(u, tolerance::NORM_ATOL) => Err(
                QlcuError::InvalidGateParameter("unitary1q matrix is not unitary".into()),
            ),
            Gate::StatePreparation {
                qubits, amplitudes, ..
            } => {
                if amplitudes.len() != 1usize << qubits.len() {
                    return Err(QlcuError::InvalidAmplitudes(format!(
                        "{} amplitudes for {} qubits",
                        amplitudes.len(),
                        qubits.len()
                    )));
                }
                let norm: f64 = amplitudes.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt();
                if (norm - 1.0).abs() > tolerance::NORM_ATOL {
                    return Err(QlcuError::InvalidAmplitudes(format!(
                        "amplitude vector has norm {}",
                        norm
                    )));
                }
                Ok(())
            }
            Gate::Multiplexor {
                controls,
                targets,
                op_map,
            } => {
                let mut seen = BTreeSet::new();
                for (bits, ops) in op_map {
                    if bits.len() != controls.len() || ops.len() != targets.len() {
                        return Err(QlcuError::InvalidGateParameter(format!(
                            "multiplexor entry has {} control bits and {} unitaries, expected {} and {}",
                            bits.len(),
                            ops.len(),
                            controls.len(),
                            targets.len()
                        )));
                    }
                    if !seen.insert(bits.clone()) {
                        return Err(QlcuError::InvalidGateParameter(
                            "multiplexor has a repeated control pattern".into(),
                        ));
                    }
                    if ops.iter().any(|u| !mat2::is_unitary(u, tolerance::NORM_ATOL)) {
                        return Err(QlcuError::InvalidGateParameter(
                            "multiplexor entry is not unitary".into(),
                        ));
                    }
                }
                Ok(())
            }
            Gate::QControl { targets, body, .. } if body.n_qubits() != targets.len() => {
                Err(QlcuError::InvalidGateParameter(format!(
                    "controlled body has {} qubits but {} targets were given",
                    body.n_qubits(),
                    targets.len()
                )))
            }
            Gate::CircBox { qubits, bits, body }
                if body.n_qubits() != qubits.len() || body.n_bits() != bits.len() =>
            {
                Err(QlcuError::InvalidGateParameter(format!(
                    "box has {} qubits and {} bits but was wired to {} and {}",
                    body.n_qubits(),
                    body.n_bits(),
                    qubits.len(),
                    bits.len()
                )))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self.qubits().iter().map(|q| q.to_string()).collect();
        match self {
            Gate::Rx(_, a) | Gate::Ry(_, a) | Gate::Rz(_, a) => {
                write!(f, "{}({:.4}) {}", self.name(), a, args.join(","))
            }
            Gate::CircBox { body, .. } | Gate::QControl { body, .. } => write!(
                f,
                "{}[{}] {}",
                self.name(),
                body.name().unwrap_or("-"),
                args.join(",")
            ),
            _ => write!(f, "{} {}", self.name(), args.join(",")),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn q(i: usize) -> Qubit {
        Qubit::new("q", i)
    }

    #[test]
    fn test_gate_qubits() {
        assert_eq!(Gate::H(q(0)).qubits(), vec![q(0)]);
        assert_eq!(Gate::Cx(q(0), q(1)).qubits(), vec![q(0), q(1)]);
        let mux = Gate::Multiplexor {
            controls: vec![q(0)],
            targets: vec![q(1), q(2)],
            op_map: vec![],
        };
        assert_eq!(mux.qubits(), vec![q(0), q(1), q(2)]);
    }

    #[test]
    fn test_dagger_pairs() {
        assert_eq!(Gate::S(q(0)).dagger().unwrap(), Gate::Sdg(q(0)));
        assert_eq!(Gate::Rz(q(0), 0.3).dagger().unwrap(), Gate::Rz(q(0), -0.3));
        assert!(Gate::Measure(q(0), Bit::new("c", 0)).dagger().is_err());
    }

    #[test]
    fn test_rotation_matrices_unitary() {
        for g in [Gate::Rx(q(0), 0.7), Gate::Ry(q(0), -1.1), Gate::Rz(q(0), 2.5), Gate::T(q(0))] {
            let m = g.matrix().unwrap();
            assert!(mat2::is_unitary(&m, 1e-12), "{} not unitary", g);
        }
    }

    #[test]
    fn test_validate_repeated_qubit() {
        assert!(Gate::Cx(q(0), q(0)).validate().is_err());
        assert!(Gate::Cx(q(0), q(1)).validate().is_ok());
    }

    #[test]
    fn test_validate_state_preparation() {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let good = Gate::StatePreparation {
            qubits: vec![q(0)],
            amplitudes: vec![Complex64::new(s, 0.0), Complex64::new(s, 0.0)],
            inverse: false,
        };
        assert!(good.validate().is_ok());
        let bad = Gate::StatePreparation {
            qubits: vec![q(0)],
            amplitudes: vec![Complex64::new(1.0, 0.0), Complex64::new(1.0, 0.0)],
            inverse: false,
        };
        assert!(matches!(bad.validate(), Err(QlcuError::InvalidAmplitudes(_))));
    }

    #[test]
    fn test_validate_multiplexor_shape() {
        let mux = Gate::Multiplexor {
            controls: vec![q(0)],
            targets: vec![q(1)],
            op_map: vec![(vec![true, false], vec![mat2::identity()])],
        };
        assert!(mux.validate().is_err());
    }

    #[test]
    fn test_map_units() {
        let g = Gate::Cx(q(0), q(1));
        let mapped = g.map_units(&|x| Qubit::new("r", x.index + 1), &|b| b.clone());
        assert_eq!(mapped, Gate::Cx(Qubit::new("r", 1), Qubit::new("r", 2)));
    }
}
