//! Error types for QLCU
//!
//! Gantree: L0_Foundation → Errors
//!
//! One error enum shared by every crate in the workspace. Variants are
//! grouped by the stage that raises them: construction (boxes, maps,
//! operators), composition (absorbing boxes into circuits), selection
//! (post/pre-selection of dense results) and numerics.

// Error variant fields are self-documenting via error messages
#![allow(missing_docs)]

use thiserror::Error;

/// Main error type for QLCU
/// Gantree: QlcuError // enum
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QlcuError {
    // ========================================================================
    // Construction Errors
    // ========================================================================
    /// Paired register groups differ in length
    /// Gantree: MismatchedSize{{box,circ}} // 크기 불일치
    #[error("Register group size mismatch: box side has {box_size}, circuit side has {circ_size}")]
    MismatchedSize { box_size: usize, circ_size: usize },

    /// A qubit or bit appears twice on one side of a map
    /// Gantree: DuplicateElement(String) // 중복 원소
    #[error("Element {0} appears more than once in the input")]
    DuplicateElement(String),

    /// Role record has no `control` group
    #[error("Register groups do not have a 'control' group")]
    MissingControlGroup,

    /// Role group not present in the owned circuit
    /// Gantree: MissingGroup{{group,register}} // 그룹 누락
    #[error("Group '{group}' refers to register '{register}' which is not in the circuit")]
    MissingGroup { group: String, register: String },

    /// Two role groups share a register
    #[error("Register '{0}' is used by more than one group")]
    OverlappingGroups(String),

    /// Register name already used in the circuit
    #[error("Register '{0}' already exists in the circuit")]
    DuplicateRegister(String),

    /// Control count of zero
    #[error("Invalid number of control qubits: {0}")]
    InvalidControlCount(usize),

    /// Control index does not fit in the control register
    #[error("Control index {index} does not fit in {n_control} control qubits")]
    InvalidControlIndex { index: u64, n_control: usize },

    /// Prepare and Select disagree on the index register
    /// Gantree: SizeMismatch{{prepare,select}} // 준비/선택 불일치
    #[error("Prepare register has {prepare} qubits but Select expects {select}")]
    SizeMismatch { prepare: usize, select: usize },

    /// Qubit index out of range
    /// Gantree: QubitOutOfRange{{q,max}} // 큐비트 범위
    #[error("Qubit {qubit} out of range: max is {max}")]
    QubitOutOfRange { qubit: usize, max: usize },

    /// Operator without terms
    #[error("Operator has no terms")]
    EmptyOperator,

    /// Amplitude vector cannot be prepared
    #[error("Invalid amplitudes: {0}")]
    InvalidAmplitudes(String),

    /// Invalid gate parameter
    #[error("Invalid gate parameter: {0}")]
    InvalidGateParameter(String),

    // ========================================================================
    // Composition Errors
    // ========================================================================
    /// Containment rule broken while absorbing a box
    /// Gantree: SubsetViolation(String) // 부분집합 위반
    #[error("Subset violation: {0}")]
    SubsetViolation(String),

    /// Gate on a qubit that the circuit does not own
    #[error("Qubit {0} is not in the circuit")]
    UnknownQubit(String),

    /// Gate on a bit that the circuit does not own
    #[error("Bit {0} is not in the circuit")]
    UnknownBit(String),

    // ========================================================================
    // Selection Errors
    // ========================================================================
    /// Malformed post/pre-selection
    /// Gantree: InvalidSelection(String) // 선택 오류
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// Renormalisation of a zero-norm slice
    #[error("Post selected statevector is vanishingly small")]
    VanishingNorm,

    // ========================================================================
    // Numeric Errors
    // ========================================================================
    /// Circuit contains a measurement or other non-unitary operation
    #[error("Non-unitary operation '{0}' cannot be simulated densely")]
    NonUnitaryOperation(String),

    /// Dense simulation limit exceeded
    #[error("Circuit has {qubits} qubits, dense limit is {max}")]
    TooManyQubits { qubits: usize, max: usize },

    /// Phase vector length does not match the degree
    #[error("Phase vector has length {actual}, expected {expected}")]
    InvalidPhases { expected: usize, actual: usize },

    /// Configuration rejected by validation
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    /// Statevector or unitary with the wrong shape
    #[error("Invalid state: {0}")]
    InvalidState(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(String),

    /// Operation not available for this box
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result type alias for QLCU operations
/// Gantree: QlcuResult<T> // type alias
pub type QlcuResult<T> = Result<T, QlcuError>;

// ============================================================================
// Error Conversion Helpers
// ============================================================================

impl From<serde_json::Error> for QlcuError {
    fn from(err: serde_json::Error) -> Self {
        QlcuError::JsonError(err.to_string())
    }
}

// ============================================================================
// Error Helpers
// ============================================================================

impl QlcuError {
    /// Raised while building a box, map or operator
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            QlcuError::MismatchedSize { .. }
                | QlcuError::DuplicateElement(_)
                | QlcuError::MissingControlGroup
                | QlcuError::MissingGroup { .. }
                | QlcuError::OverlappingGroups(_)
                | QlcuError::DuplicateRegister(_)
                | QlcuError::InvalidControlCount(_)
                | QlcuError::InvalidControlIndex { .. }
                | QlcuError::SizeMismatch { .. }
                | QlcuError::QubitOutOfRange { .. }
                | QlcuError::EmptyOperator
                | QlcuError::InvalidAmplitudes(_)
                | QlcuError::InvalidGateParameter(_)
        )
    }

    /// Raised while absorbing a box into a circuit
    pub fn is_composition_error(&self) -> bool {
        matches!(
            self,
            QlcuError::SubsetViolation(_) | QlcuError::UnknownQubit(_) | QlcuError::UnknownBit(_)
        )
    }

    /// Raised while post/pre-selecting a dense result
    pub fn is_selection_error(&self) -> bool {
        matches!(
            self,
            QlcuError::InvalidSelection(_) | QlcuError::VanishingNorm
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QlcuError::MismatchedSize {
            box_size: 3,
            circ_size: 2,
        };
        assert!(err.to_string().contains('3'));
        assert!(err.to_string().contains('2'));
    }

    #[test]
    fn test_categories() {
        assert!(QlcuError::DuplicateElement("q[0]".into()).is_construction_error());
        assert!(QlcuError::MissingControlGroup.is_construction_error());
        assert!(QlcuError::SubsetViolation("x".into()).is_composition_error());
        assert!(QlcuError::VanishingNorm.is_selection_error());
        assert!(!QlcuError::VanishingNorm.is_construction_error());
        assert!(!QlcuError::EmptyOperator.is_selection_error());
    }

    #[test]
    fn test_from_json_error() {
        let err: QlcuError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, QlcuError::JsonError(_)));
    }
}
