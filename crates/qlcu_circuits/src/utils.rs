//! Helpers for building and checking block encodings
//!
//! Gantree: L4_Lcu → Utils

use ndarray::Array2;
use num_complex::Complex64;
use qlcu_core::{linalg, tolerance, Pauli, PauliOperator, PauliString, QlcuError, QlcuResult};

pub use qlcu_core::linalg::kron_list;

/// `value` as `length` bits, most significant first.
/// Bits above `length` are dropped.
/// Gantree: int_to_bits(value, length) -> Vec<bool> // 정수→비트열
pub fn int_to_bits(value: u64, length: usize) -> Vec<bool> {
    (0..length)
        .rev()
        .map(|k| k < 64 && (value >> k) & 1 == 1)
        .collect()
}

/// Number of index qubits that address `n_terms` terms
pub fn ceil_log2(n_terms: usize) -> usize {
    if n_terms <= 1 {
        0
    } else {
        (usize::BITS - (n_terms - 1).leading_zeros()) as usize
    }
}

/// `operator / l1_norm(operator)` as a dense matrix over `n_state_qubits`.
/// This is the block an LCU of `operator` encodes.
/// Gantree: block_encoded_matrix(op, n) -> Result<Array2> // 목표 블록
pub fn block_encoded_matrix(
    operator: &PauliOperator,
    n_state_qubits: usize,
) -> QlcuResult<Array2<Complex64>> {
    let l1 = operator.l1_norm();
    let m = operator.matrix(n_state_qubits)?;
    Ok(m.mapv(|z| z / l1))
}

/// U·U ≈ I
pub fn is_involutory(unitary: &Array2<Complex64>) -> bool {
    let (rows, cols) = unitary.dim();
    if rows != cols {
        return false;
    }
    linalg::approx_eq(&unitary.dot(unitary), &linalg::identity(rows), tolerance::ATOL)
}

/// Operator with diagonal `-(2^n - 1 - 2k) / (2^n - 1)` over basis states
/// `k`, a uniform grid of `[-1, 1]` with `2^n_qubits` points.
/// Qubit `n - 1 - j` carries `Z` with weight `-2^j / (2^n - 1)`.
/// `n_qubits` must stay below 64.
/// Gantree: diagonal_block_encoding(n) -> Result<PauliOperator> // 대각 블록 인코딩
pub fn diagonal_block_encoding(n_qubits: usize) -> QlcuResult<PauliOperator> {
    let size = u32::try_from(n_qubits)
        .ok()
        .and_then(|n| 1u64.checked_shl(n))
        .ok_or_else(|| {
            QlcuError::InvalidConfig(format!(
                "diagonal grid over {} qubits does not fit in 64 bits",
                n_qubits
            ))
        })?;
    let scale = (size - 1) as f64;
    Ok((0..n_qubits)
        .rev()
        .map(|j| {
            let string = PauliString::from_pairs([(n_qubits - 1 - j, Pauli::Z)]);
            let weight = -((1u64 << j) as f64) / scale;
            (string, Complex64::new(weight, 0.0))
        })
        .collect())
}

// ============================================================================
// Tests
// ============================================================================
