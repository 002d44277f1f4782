//! Pauli strings and Pauli-sum operators
//!
//! Gantree: L0_Foundation → Pauli
//!
//! A [`PauliOperator`] is an insertion-ordered sum of
//! `coefficient * PauliString` terms. The order in which terms are added is
//! the order the LCU index register enumerates them.

use crate::error::{QlcuError, QlcuResult};
use crate::linalg;
use crate::types::Matrix2;
use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Pauli
// ============================================================================

/// Single-qubit Pauli
/// Gantree: Pauli // I/X/Y/Z
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pauli {
    /// Identity
    I,
    /// Pauli X
    X,
    /// Pauli Y
    Y,
    /// Pauli Z
    Z,
}

impl Pauli {
    /// 2x2 matrix of this Pauli
    pub fn matrix(&self) -> Matrix2 {
        let o = Complex64::new(0.0, 0.0);
        let l = Complex64::new(1.0, 0.0);
        let i = Complex64::new(0.0, 1.0);
        match self {
            Pauli::I => [[l, o], [o, l]],
            Pauli::X => [[o, l], [l, o]],
            Pauli::Y => [[o, -i], [i, o]],
            Pauli::Z => [[l, o], [o, -l]],
        }
    }

    /// Parse from a single character
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'I' => Some(Pauli::I),
            'X' => Some(Pauli::X),
            'Y' => Some(Pauli::Y),
            'Z' => Some(Pauli::Z),
            _ => None,
        }
    }
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Pauli::I => 'I',
            Pauli::X => 'X',
            Pauli::Y => 'Y',
            Pauli::Z => 'Z',
        };
        write!(f, "{}", c)
    }
}

// ============================================================================
// Pauli String
// ============================================================================

/// Tensor product of Paulis keyed by state-qubit index.
/// Qubits not present act as identity.
/// Gantree: PauliString{{map}} // 파울리 문자열
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PauliString {
    map: BTreeMap<usize, Pauli>,
}

impl PauliString {
    /// Identity string
    pub fn identity() -> Self {
        Self::default()
    }

    /// Build from `(qubit, pauli)` pairs. Identity entries are dropped.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (usize, Pauli)>) -> Self {
        let map = pairs
            .into_iter()
            .filter(|(_, p)| *p != Pauli::I)
            .collect();
        Self { map }
    }

    /// Parse a dense string such as `"ZI"`, character `k` acting on qubit `k`
    pub fn parse(s: &str) -> QlcuResult<Self> {
        let mut pairs = Vec::with_capacity(s.len());
        for (k, c) in s.chars().enumerate() {
            let p = Pauli::from_char(c).ok_or_else(|| {
                QlcuError::InvalidGateParameter(format!("'{}' is not a Pauli", c))
            })?;
            pairs.push((k, p));
        }
        Ok(Self::from_pairs(pairs))
    }

    /// Pauli on `qubit`
    pub fn get(&self, qubit: usize) -> Pauli {
        self.map.get(&qubit).copied().unwrap_or(Pauli::I)
    }

    /// Non-identity entries in qubit order
    pub fn iter(&self) -> impl Iterator<Item = (usize, Pauli)> + '_ {
        self.map.iter().map(|(q, p)| (*q, *p))
    }

    /// Largest qubit index touched, if any
    pub fn max_qubit(&self) -> Option<usize> {
        self.map.keys().next_back().copied()
    }

    /// Dense list of Paulis over `n_qubits`
    pub fn to_list(&self, n_qubits: usize) -> QlcuResult<Vec<Pauli>> {
        if let Some(max) = self.max_qubit() {
            if max >= n_qubits {
                return Err(QlcuError::QubitOutOfRange {
                    qubit: max,
                    max: n_qubits.saturating_sub(1),
                });
            }
        }
        Ok((0..n_qubits).map(|q| self.get(q)).collect())
    }

    /// Dense matrix over `n_qubits`, qubit 0 most significant
    pub fn matrix(&self, n_qubits: usize) -> QlcuResult<Array2<Complex64>> {
        let factors: Vec<Array2<Complex64>> = self
            .to_list(n_qubits)?
            .iter()
            .map(|p| linalg::from_mat2(&p.matrix()))
            .collect();
        Ok(linalg::kron_list(&factors))
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.map.is_empty() {
            return write!(f, "I");
        }
        let parts: Vec<String> = self.iter().map(|(q, p)| format!("{}{}", p, q)).collect();
        write!(f, "{}", parts.join(" "))
    }
}

// ============================================================================
// Pauli Operator
// ============================================================================

/// Pauli-sum operator with insertion-ordered terms
/// Gantree: PauliOperator{{terms}} // 파울리 합 연산자
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PauliOperator {
    terms: Vec<(PauliString, Complex64)>,
}

impl PauliOperator {
    /// Empty operator
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `coefficient * string`. A repeated string accumulates into its
    /// first occurrence, keeping the original position.
    pub fn add_term(&mut self, string: PauliString, coefficient: Complex64) {
        if let Some(slot) = self.terms.iter_mut().find(|(s, _)| *s == string) {
            slot.1 += coefficient;
        } else {
            self.terms.push((string, coefficient));
        }
    }

    /// Consuming builder form of [`add_term`](Self::add_term)
    pub fn with_term(mut self, string: PauliString, coefficient: impl Into<Complex64>) -> Self {
        self.add_term(string, coefficient.into());
        self
    }

    /// Terms in enumeration order
    pub fn terms(&self) -> &[(PauliString, Complex64)] {
        &self.terms
    }

    /// Number of terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// No terms
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Smallest qubit count that holds every term
    pub fn n_qubits(&self) -> usize {
        self.terms
            .iter()
            .filter_map(|(s, _)| s.max_qubit())
            .max()
            .map_or(0, |m| m + 1)
    }

    /// Sum of coefficient magnitudes
    pub fn l1_norm(&self) -> f64 {
        self.terms.iter().map(|(_, c)| c.norm()).sum()
    }

    /// Dense matrix over `n_qubits`, qubit 0 most significant
    /// Gantree: matrix(n) -> Array2 // 희소→밀집 행렬
    pub fn matrix(&self, n_qubits: usize) -> QlcuResult<Array2<Complex64>> {
        let dim = 1usize << n_qubits;
        let mut out = Array2::zeros((dim, dim));
        for (string, coefficient) in &self.terms {
            out = out + string.matrix(n_qubits)?.mapv(|z| z * *coefficient);
        }
        Ok(out)
    }
}

impl FromIterator<(PauliString, Complex64)> for PauliOperator {
    fn from_iter<T: IntoIterator<Item = (PauliString, Complex64)>>(iter: T) -> Self {
        let mut op = PauliOperator::new();
        for (s, c) in iter {
            op.add_term(s, c);
        }
        op
    }
}

impl fmt::Display for PauliOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .terms
            .iter()
            .map(|(s, c)| format!("({:.4}{:+.4}i)*[{}]", c.re, c.im, s))
            .collect();
        write!(f, "{}", parts.join(" + "))
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
    fn test_parse_and_display() {
        let s = PauliString::parse("ZIX").unwrap();
        assert_eq!(s.get(0), Pauli::Z);
        assert_eq!(s.get(1), Pauli::I);
        assert_eq!(s.get(2), Pauli::X);
        assert_eq!(s.to_string(), "Z0 X2");
        assert!(PauliString::parse("ZQ").is_err());
    }

    #[test]
    fn test_string_matrix_big_endian() {
        // Z on qubit 0 of two: diag(1, 1, -1, -1)
        let m = PauliString::parse("ZI").unwrap().matrix(2).unwrap();
        let diag: Vec<f64> = (0..4).map(|i| m[[i, i]].re).collect();
        assert_eq!(diag, vec![1.0, 1.0, -1.0, -1.0]);
    }

    #[test]
    fn test_string_out_of_range() {
        let s = PauliString::parse("IIZ").unwrap();
        assert!(matches!(
            s.matrix(2),
            Err(QlcuError::QubitOutOfRange { qubit: 2, .. })
        ));
    }

    #[test]
    fn test_operator_accumulates_in_place() {
        let op = PauliOperator::new()
            .with_term(PauliString::parse("ZI").unwrap(), 1.0)
            .with_term(PauliString::parse("IZ").unwrap(), -0.5)
            .with_term(PauliString::parse("ZI").unwrap(), 0.25);
        assert_eq!(op.len(), 2);
        assert_abs_diff_eq!(op.terms()[0].1.re, 1.25);
        assert_eq!(op.terms()[1].0, PauliString::parse("IZ").unwrap());
        assert_eq!(op.n_qubits(), 2);
        assert_abs_diff_eq!(op.l1_norm(), 1.75);
    }

    #[test]
    fn test_operator_matrix() {
        let op = PauliOperator::new()
            .with_term(PauliString::parse("ZI").unwrap(), 1.0)
            .with_term(PauliString::parse("IZ").unwrap(), -0.5);
        let m = op.matrix(2).unwrap();
        let diag: Vec<f64> = (0..4).map(|i| m[[i, i]].re).collect();
        assert_eq!(diag, vec![0.5, 1.5, -1.5, -0.5]);
    }
}
