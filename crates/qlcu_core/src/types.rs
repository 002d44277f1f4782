//! Core types for QLCU
//!
//! Gantree: L0_Foundation → CoreTypes
//!
//! Unit identifiers (named qubits and bits), registers and 2x2 matrix
//! helpers used by gates and multiplexed operators.

use crate::error::{QlcuError, QlcuResult};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// Rotation angle in radians
pub type Angle = f64;

/// Dense 2x2 complex matrix, row major
/// Gantree: Matrix2 = [[C64;2];2] // 단일 큐비트 행렬
pub type Matrix2 = [[Complex64; 2]; 2];

// ============================================================================
// Unit Identifiers
// ============================================================================

/// A qubit addressed by register name and index.
///
/// Ordering is lexicographic on `(register, index)`. Circuits list their
/// qubits in this order and the first qubit is the most significant index
/// of every unitary and statevector.
/// Gantree: Qubit{{register,index}} // 이름 있는 큐비트
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Qubit {
    /// Register name
    pub register: String,
    /// Position inside the register
    pub index: usize,
}

impl Qubit {
    /// Create a qubit id
    pub fn new(register: impl Into<String>, index: usize) -> Self {
        Self {
            register: register.into(),
            index,
        }
    }
}

impl fmt::Display for Qubit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.register, self.index)
    }
}

/// A classical bit addressed by register name and index
/// Gantree: Bit{{register,index}} // 이름 있는 비트
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Bit {
    /// Register name
    pub register: String,
    /// Position inside the register
    pub index: usize,
}

impl Bit {
    /// Create a bit id
    pub fn new(register: impl Into<String>, index: usize) -> Self {
        Self {
            register: register.into(),
            index,
        }
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.register, self.index)
    }
}

// ============================================================================
// Registers
// ============================================================================

/// Named qubit register
/// Gantree: QubitRegister{{name,size}} // 큐비트 레지스터
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QubitRegister {
    /// Register name
    pub name: String,
    /// Number of qubits
    pub size: usize,
}

impl QubitRegister {
    /// Create a register description
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    /// Qubit `index` of this register
    pub fn qubit(&self, index: usize) -> QlcuResult<Qubit> {
        if index >= self.size {
            return Err(QlcuError::QubitOutOfRange {
                qubit: index,
                max: self.size.saturating_sub(1),
            });
        }
        Ok(Qubit::new(self.name.clone(), index))
    }

    /// All qubits in index order
    pub fn to_list(&self) -> Vec<Qubit> {
        (0..self.size)
            .map(|i| Qubit::new(self.name.clone(), i))
            .collect()
    }

    /// Number of qubits
    pub fn len(&self) -> usize {
        self.size
    }

    /// Empty register
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Whether `qubit` belongs to this register
    pub fn contains(&self, qubit: &Qubit) -> bool {
        qubit.register == self.name && qubit.index < self.size
    }
}

impl fmt::Display for QubitRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.size)
    }
}

/// Named bit register
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BitRegister {
    /// Register name
    pub name: String,
    /// Number of bits
    pub size: usize,
}

impl BitRegister {
    /// Create a register description
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    /// All bits in index order
    pub fn to_list(&self) -> Vec<Bit> {
        (0..self.size)
            .map(|i| Bit::new(self.name.clone(), i))
            .collect()
    }

    /// Number of bits
    pub fn len(&self) -> usize {
        self.size
    }

    /// Empty register
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

impl fmt::Display for BitRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.size)
    }
}

// ============================================================================
// 2x2 Matrix Helpers
// Gantree: mat2 // 2x2 행렬 연산
// ============================================================================

pub mod mat2 {
    //! Small helpers over [`Matrix2`](super::Matrix2)

    use super::Matrix2;
    use num_complex::Complex64;

    const ZERO: Complex64 = Complex64::new(0.0, 0.0);
    const ONE: Complex64 = Complex64::new(1.0, 0.0);

    /// Identity
    pub fn identity() -> Matrix2 {
        [[ONE, ZERO], [ZERO, ONE]]
    }

    /// Matrix product `a * b`
    pub fn mul(a: &Matrix2, b: &Matrix2) -> Matrix2 {
        let mut out = [[ZERO; 2]; 2];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, entry) in row.iter_mut().enumerate() {
                *entry = a[i][0] * b[0][j] + a[i][1] * b[1][j];
            }
        }
        out
    }

    /// Conjugate transpose
    pub fn dagger(a: &Matrix2) -> Matrix2 {
        [
            [a[0][0].conj(), a[1][0].conj()],
            [a[0][1].conj(), a[1][1].conj()],
        ]
    }

    /// Multiply every entry by `s`
    pub fn scale(a: &Matrix2, s: Complex64) -> Matrix2 {
        [[a[0][0] * s, a[0][1] * s], [a[1][0] * s, a[1][1] * s]]
    }

    /// Entry-wise comparison
    pub fn approx_eq(a: &Matrix2, b: &Matrix2, atol: f64) -> bool {
        (0..2).all(|i| (0..2).all(|j| (a[i][j] - b[i][j]).norm() <= atol))
    }

    /// `a * a† == I`
    pub fn is_unitary(a: &Matrix2, atol: f64) -> bool {
        approx_eq(&mul(a, &dagger(a)), &identity(), atol)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qubit_ordering() {
        let mut qubits = vec![Qubit::new("q", 1), Qubit::new("a", 0), Qubit::new("q", 0)];
        qubits.sort();
        assert_eq!(
            qubits,
            vec![Qubit::new("a", 0), Qubit::new("q", 0), Qubit::new("q", 1)]
        );
    }

    #[test]
    fn test_register_qubits() {
        let reg = QubitRegister::new("p", 3);
        assert_eq!(reg.to_list().len(), 3);
        assert_eq!(reg.qubit(2).unwrap(), Qubit::new("p", 2));
        assert!(reg.qubit(3).is_err());
        assert!(reg.contains(&Qubit::new("p", 0)));
        assert!(!reg.contains(&Qubit::new("q", 0)));
        assert_eq!(reg.to_string(), "p[3]");
    }

    #[test]
    fn test_mat2_unitary() {
        let h = 1.0 / 2f64.sqrt();
        let hadamard = [
            [Complex64::new(h, 0.0), Complex64::new(h, 0.0)],
            [Complex64::new(h, 0.0), Complex64::new(-h, 0.0)],
        ];
        assert!(mat2::is_unitary(&hadamard, 1e-12));
        assert!(mat2::approx_eq(
            &mat2::mul(&hadamard, &hadamard),
            &mat2::identity(),
            1e-12
        ));
    }
}
