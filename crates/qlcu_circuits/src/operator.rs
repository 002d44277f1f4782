//! Multiplexed decomposition of a Pauli operator
//!
//! Gantree: L4_Lcu → MultiplexedOperator
//!
//! Each term `c · P` is split into a non-negative magnitude `|c|`, a phase
//! `arg c`, and one single-qubit unitary per state qubit. The phase factor
//! is folded into the unitary of state qubit 0, so the term can be applied
//! by a multiplexor without a separate phase gate.

use crate::utils::{ceil_log2, int_to_bits};
use ndarray::Array2;
use num_complex::Complex64;
use qlcu_core::{
    linalg, mat2, tolerance, Matrix2, OpMap, Pauli, PauliOperator, PauliString, QlcuError,
    QlcuResult,
};
use std::fmt;

// ============================================================================
// Term
// ============================================================================

/// One decomposed term
/// Gantree: MultiplexedOperatorTerm{{magnitude,phase,op_list}} // 분해된 항
#[derive(Debug, Clone, PartialEq)]
pub struct MultiplexedOperatorTerm {
    pauli: PauliString,
    coefficient: Complex64,
    magnitude: f64,
    phase: f64,
    paulis: Vec<Pauli>,
    op_list: Vec<Matrix2>,
}

impl MultiplexedOperatorTerm {
    /// Decompose `coefficient · pauli` over `n_state_qubits`
    /// Gantree: new(pauli, coeff, n) -> Result<Self> // 항 분해
    pub fn new(pauli: PauliString, coefficient: Complex64, n_state_qubits: usize) -> QlcuResult<Self> {
        if n_state_qubits == 0 {
            return Err(QlcuError::InvalidGateParameter(
                "a multiplexed term needs at least one state qubit".into(),
            ));
        }
        let paulis = pauli.to_list(n_state_qubits)?;
        let (magnitude, phase) = coefficient.to_polar();
        let factor = Complex64::from_polar(1.0, phase);

        let mut op_list: Vec<Matrix2> = paulis.iter().map(Pauli::matrix).collect();
        op_list[0] = mat2::scale(&op_list[0], factor);

        Ok(Self {
            pauli,
            coefficient,
            magnitude,
            phase,
            paulis,
            op_list,
        })
    }

    /// Source Pauli string
    pub fn pauli(&self) -> &PauliString {
        &self.pauli
    }

    /// Source coefficient
    pub fn coefficient(&self) -> Complex64 {
        self.coefficient
    }

    /// `|c|`
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    /// `arg c` in radians
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// `e^{i arg c}`
    pub fn phase_factor(&self) -> Complex64 {
        Complex64::from_polar(1.0, self.phase)
    }

    /// Phase factor is ±1
    pub fn is_hermitian(&self) -> bool {
        let f = self.phase_factor();
        f.im.abs() < tolerance::PHASE_ATOL && (f.re.abs() - 1.0).abs() < tolerance::PHASE_ATOL
    }

    /// Per-qubit Paulis, without the phase
    pub fn paulis(&self) -> &[Pauli] {
        &self.paulis
    }

    /// Per-qubit unitaries applied by Select, phase folded into qubit 0
    pub fn op_list(&self) -> &[Matrix2] {
        &self.op_list
    }

    /// Tensor product of [`op_list`](Self::op_list)
    pub fn unitary(&self) -> Array2<Complex64> {
        let mats: Vec<Array2<Complex64>> = self.op_list.iter().map(linalg::from_mat2).collect();
        linalg::kron_list(&mats)
    }

    /// `magnitude · unitary`, which equals `coefficient · pauli`
    pub fn matrix(&self) -> Array2<Complex64> {
        self.unitary().mapv(|z| z * self.magnitude)
    }
}

impl fmt::Display for MultiplexedOperatorTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.6} · e^(i{:.6}) · {}",
            self.magnitude, self.phase, self.pauli
        )
    }
}

// ============================================================================
// Operator
// ============================================================================

/// Terms of an operator ready for Prepare and Select
/// Gantree: MultiplexedOperator{{terms,n_prep,n_state}} // 멀티플렉스 연산자
#[derive(Debug, Clone, PartialEq)]
pub struct MultiplexedOperator {
    terms: Vec<MultiplexedOperatorTerm>,
    n_prep_qubits: usize,
    n_state_qubits: usize,
}

impl MultiplexedOperator {
    /// Decompose every term of `operator`, in its enumeration order
    pub fn new(operator: &PauliOperator, n_state_qubits: usize) -> QlcuResult<Self> {
        if operator.is_empty() {
            return Err(QlcuError::EmptyOperator);
        }
        let terms = operator
            .terms()
            .iter()
            .map(|(s, c)| MultiplexedOperatorTerm::new(s.clone(), *c, n_state_qubits))
            .collect::<QlcuResult<Vec<_>>>()?;
        let n_prep_qubits = ceil_log2(terms.len());
        log::debug!(
            "decomposed {} terms over {} state qubits, {} index qubits",
            terms.len(),
            n_state_qubits,
            n_prep_qubits
        );
        Ok(Self {
            terms,
            n_prep_qubits,
            n_state_qubits,
        })
    }

    /// Decomposed terms
    pub fn terms(&self) -> &[MultiplexedOperatorTerm] {
        &self.terms
    }

    /// Number of terms
    pub fn n_terms(&self) -> usize {
        self.terms.len()
    }

    /// `ceil(log2(n_terms))`
    pub fn n_prep_qubits(&self) -> usize {
        self.n_prep_qubits
    }

    /// State register width
    pub fn n_state_qubits(&self) -> usize {
        self.n_state_qubits
    }

    /// Term magnitudes in order
    pub fn magnitudes(&self) -> Vec<f64> {
        self.terms.iter().map(|t| t.magnitude).collect()
    }

    /// Sum of magnitudes
    pub fn l1_norm(&self) -> f64 {
        self.terms.iter().map(|t| t.magnitude).sum()
    }

    /// Every term has a real coefficient
    pub fn is_hermitian(&self) -> bool {
        self.terms.iter().all(MultiplexedOperatorTerm::is_hermitian)
    }

    /// Multiplexor table: term `i` is keyed by `i` in binary over the index
    /// qubits, preceded by `n_control` set bits. With `adjoint` every
    /// unitary is conjugated.
    /// Gantree: op_map(n_control, adjoint) -> OpMap // 멀티플렉서 표
    pub fn op_map(&self, n_control: usize, adjoint: bool) -> OpMap {
        self.terms
            .iter()
            .enumerate()
            .map(|(i, term)| {
                let mut pattern = vec![true; n_control];
                pattern.extend(int_to_bits(i as u64, self.n_prep_qubits));
                let ops = if adjoint {
                    term.op_list.iter().map(mat2::dagger).collect()
                } else {
                    term.op_list.clone()
                };
                (pattern, ops)
            })
            .collect()
    }

    /// Σ magnitude · unitary
    pub fn matrix(&self) -> Array2<Complex64> {
        let dim = 1usize << self.n_state_qubits;
        self.terms
            .iter()
            .fold(Array2::zeros((dim, dim)), |acc, t| acc + t.matrix())
    }
}

/// Split `operator` into terms, index width and hermiticity
/// Gantree: decompose(op, n) -> Result<(terms, n_prep, hermitian)> // 분해
pub fn decompose(
    operator: &PauliOperator,
    n_state_qubits: usize,
) -> QlcuResult<(Vec<MultiplexedOperatorTerm>, usize, bool)> {
    let m = MultiplexedOperator::new(operator, n_state_qubits)?;
    let hermitian = m.is_hermitian();
    Ok((m.terms, m.n_prep_qubits, hermitian))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn ps(s: &str) -> PauliString {
        PauliString::parse(s).unwrap()
    }

    #[test]
    fn test_term_reconstructs() {
        for c in [
            Complex64::new(0.7, 0.0),
            Complex64::new(-1.3, 0.0),
            Complex64::new(0.0, 2.0),
            Complex64::new(0.4, -0.9),
        ] {
            let term = MultiplexedOperatorTerm::new(ps("XZY"), c, 3).unwrap();
            let expected = ps("XZY").matrix(3).unwrap().mapv(|z| z * c);
            assert!(linalg::approx_eq(&term.matrix(), &expected, 1e-12));

            // phase kept apart from the raw Paulis
            let raw: Vec<Array2<Complex64>> = term
                .paulis()
                .iter()
                .map(|p| linalg::from_mat2(&p.matrix()))
                .collect();
            let rebuilt = linalg::kron_list(&raw).mapv(|z| z * term.magnitude() * term.phase_factor());
            assert!(linalg::approx_eq(&rebuilt, &expected, 1e-12));
        }
    }

    #[test]
    fn test_hermitian_flags() {
        let t = MultiplexedOperatorTerm::new(ps("Z"), Complex64::new(-2.0, 0.0), 1).unwrap();
        assert!(t.is_hermitian());
        assert_abs_diff_eq!(t.phase().abs(), PI, epsilon = 1e-12);
        assert_abs_diff_eq!(t.magnitude(), 2.0, epsilon = 1e-12);

        let t = MultiplexedOperatorTerm::new(ps("Z"), Complex64::new(0.0, 1.0), 1).unwrap();
        assert!(!t.is_hermitian());
    }

    #[test]
    fn test_index_width() {
        let mut op = PauliOperator::new();
        let strings = ["ZII", "IZI", "IIZ", "XXI", "IXX"];
        for (k, s) in strings.iter().enumerate() {
            op.add_term(ps(s), Complex64::new(k as f64 + 1.0, 0.0));
        }
        let (terms, n_prep, hermitian) = decompose(&op, 3).unwrap();
        assert_eq!(terms.len(), 5);
        assert_eq!(n_prep, 3);
        assert!(hermitian);
    }

    #[test]
    fn test_op_map_patterns() {
        let op = PauliOperator::new()
            .with_term(ps("Z"), 1.0)
            .with_term(ps("X"), 1.0)
            .with_term(ps("Y"), 1.0);
        let m = MultiplexedOperator::new(&op, 1).unwrap();
        let table = m.op_map(1, false);
        assert_eq!(table.len(), 3);
        assert_eq!(table[2].0, vec![true, true, false]);
        assert_eq!(table[0].0, vec![true, false, false]);
    }

    #[test]
    fn test_matrix_matches_operator() {
        let op = PauliOperator::new()
            .with_term(ps("ZZ"), Complex64::new(0.5, 0.5))
            .with_term(ps("XI"), -0.25);
        let m = MultiplexedOperator::new(&op, 2).unwrap();
        assert!(linalg::approx_eq(&m.matrix(), &op.matrix(2).unwrap(), 1e-12));
        assert!(!m.is_hermitian());
    }

    #[test]
    fn test_empty_and_out_of_range() {
        assert_eq!(
            MultiplexedOperator::new(&PauliOperator::new(), 2).unwrap_err(),
            QlcuError::EmptyOperator
        );
        let op = PauliOperator::new().with_term(ps("IIZ"), 1.0);
        assert!(matches!(
            MultiplexedOperator::new(&op, 2),
            Err(QlcuError::QubitOutOfRange { .. })
        ));
    }
}
