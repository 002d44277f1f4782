//! # QLCU Core
//!
//! Foundation types, Pauli operators, gates and named-register circuits for
//! building LCU block encodings.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qlcu_core // L0+L1: Foundation + Circuit
//!     L0_Foundation // 기반 타입/상수/에러
//!         CoreTypes // Qubit, Bit, 레지스터, 2x2 행렬
//!         Constants // 허용 오차/레지스터 이름/QSP 기본값
//!         Errors // 에러 타입
//!         Linalg // 텐서곱, 수반, 노름
//!         Pauli // 파울리 문자열과 합 연산자
//!     L1_Circuit // 회로 구조
//!         Gate // 게이트 enum (복합 게이트 포함)
//!         Circuit // 이름 있는 레지스터 회로
//!         CircuitBuilder // 빌더 패턴
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qlcu_core::prelude::*;
//!
//! let q0 = Qubit::new("q", 0);
//! let q1 = Qubit::new("q", 1);
//! let circuit = CircuitBuilder::with_name("bell")
//!     .register("q", 2)
//!     .h(&q0)
//!     .cx(&q0, &q1)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(circuit.n_qubits(), 2);
//! ```
//!
//! ## Pauli Operators
//!
//! ```rust
//! use qlcu_core::prelude::*;
//!
//! let op = PauliOperator::new()
//!     .with_term(PauliString::parse("ZI").unwrap(), 1.0)
//!     .with_term(PauliString::parse("IZ").unwrap(), -0.5);
//!
//! assert_eq!(op.len(), 2);
//! assert!((op.l1_norm() - 1.5).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Core types (Gantree: L0_Foundation → CoreTypes)
pub mod types;

/// Constants (Gantree: L0_Foundation → Constants)
pub mod constants;

/// Error types (Gantree: L0_Foundation → Errors)
pub mod error;

/// Dense matrix helpers (Gantree: L0_Foundation → Linalg)
pub mod linalg;

/// Pauli operators (Gantree: L0_Foundation → Pauli)
pub mod pauli;

/// Quantum gates (Gantree: L1_Circuit → Gate)
pub mod gate;

/// Circuit structure (Gantree: L1_Circuit → Circuit)
pub mod circuit;

/// Circuit builder (Gantree: L1_Circuit → CircuitBuilder)
pub mod builder;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::CircuitBuilder;
pub use circuit::Circuit;
pub use constants::{qsp, registers, simulation, tolerance};
pub use error::{QlcuError, QlcuResult};
pub use gate::{Gate, OpMap};
pub use pauli::{Pauli, PauliOperator, PauliString};
pub use types::{mat2, Angle, Bit, BitRegister, Matrix2, Qubit, QubitRegister};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use qlcu_core::prelude::*;
    //! ```

    pub use crate::builder::CircuitBuilder;
    pub use crate::circuit::Circuit;
    pub use crate::constants::{qsp, registers, simulation, tolerance};
    pub use crate::error::{QlcuError, QlcuResult};
    pub use crate::gate::{Gate, OpMap};
    pub use crate::linalg;
    pub use crate::pauli::{Pauli, PauliOperator, PauliString};
    pub use crate::types::{mat2, Angle, Bit, BitRegister, Matrix2, Qubit, QubitRegister};
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_composite_gate_wiring() {
        let mut body = Circuit::with_name("inner");
        body.add_q_register("x", 2).unwrap();
        body.add_gate(Gate::Cx(Qubit::new("x", 0), Qubit::new("x", 1)))
            .unwrap();

        let mut outer = Circuit::new();
        outer.add_q_register("q", 3).unwrap();
        let boxed = Gate::CircBox {
            qubits: vec![Qubit::new("q", 2), Qubit::new("q", 0)],
            bits: vec![],
            body: Box::new(body.clone()),
        };
        outer.add_gate(boxed).unwrap();
        assert_eq!(outer.count_composite(), 1);

        // wrong arity is rejected
        let bad = Gate::CircBox {
            qubits: vec![Qubit::new("q", 1)],
            bits: vec![],
            body: Box::new(body),
        };
        assert!(outer.add_gate(bad).is_err());
    }

    #[test]
    fn test_circuit_json_roundtrip() {
        let circuit = CircuitBuilder::with_name("rot")
            .register("q", 1)
            .rz(&Qubit::new("q", 0), 0.25)
            .build()
            .unwrap();
        let json = serde_json::to_string(&circuit).unwrap();
        let back: Circuit = serde_json::from_str(&json).unwrap();
        assert_eq!(circuit, back);
    }

    #[test]
    fn test_pauli_operator_hermitian_matrix() {
        let op = PauliOperator::new()
            .with_term(PauliString::parse("XY").unwrap(), 0.3)
            .with_term(PauliString::parse("ZZ").unwrap(), -1.2);
        let m = op.matrix(2).unwrap();
        assert!(linalg::approx_eq(&m, &linalg::dagger(&m), 1e-12));
    }

    #[test]
    fn test_qsp_constants() {
        assert_eq!(qsp::DEFAULT_MAX_ITERATIONS, 500);
        assert!((qsp::PHASE_BOUND - std::f64::consts::PI).abs() < 1e-15);
        assert_eq!(registers::MAX_MULTIPLEXOR_CONTROLS, 4);
    }
}
