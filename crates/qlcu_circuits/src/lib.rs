//! # QLCU Circuits
//!
//! Register-composable boxes and LCU block encodings of Pauli operators.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qlcu_circuits // L3+L4: Registers + LCU
//!     L3_Registers // 레지스터 대수
//!         QRegs // 역할별 레지스터 그룹
//!         RegisterMap // 박스→회로 단위 매핑
//!         RegisterCircuit // 박스를 흡수하는 회로
//!         RegisterBox // 수반/제어/거듭제곱
//!     L4_Lcu // 블록 인코딩
//!         MultiplexedOperator // 항 분해
//!         Prepare // 계수 상태 준비
//!         Select // 멀티플렉서
//!         Lcu // Prepare† Select Prepare
//!         Utils // 비트열, 대각 인코딩, 검사
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qlcu_circuits::prelude::*;
//!
//! let op = PauliOperator::new()
//!     .with_term(PauliString::parse("ZZ").unwrap(), 1.0)
//!     .with_term(PauliString::parse("XI").unwrap(), 0.5)
//!     .with_term(PauliString::parse("IX").unwrap(), 0.5);
//!
//! let lcu = build_lcu(&op, 2).unwrap();
//! let block = lcu.block_encoding().unwrap();
//! let target = lcu.block_encoded_matrix().unwrap();
//! assert!(linalg::approx_eq(&block, &target, 1e-10));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Role records (Gantree: L3_Registers → QRegs)
pub mod qregs;

/// Unit maps (Gantree: L3_Registers → RegisterMap)
pub mod register_map;

/// Hosting circuits (Gantree: L3_Registers → RegisterCircuit)
pub mod register_circuit;

/// Boxes and their algebra (Gantree: L3_Registers → RegisterBox)
pub mod register_box;

/// Term decomposition (Gantree: L4_Lcu → MultiplexedOperator)
pub mod operator;

/// Prepare boxes (Gantree: L4_Lcu → Prepare)
pub mod prepare;

/// Select boxes (Gantree: L4_Lcu → Select)
pub mod select;

/// LCU boxes (Gantree: L4_Lcu → Lcu)
pub mod lcu;

/// Helpers (Gantree: L4_Lcu → Utils)
pub mod utils;

// ============================================================================
// Re-exports
// ============================================================================

pub use lcu::{build_lcu, build_lcu_with, lcu_box, LcuBox, LcuData};
pub use operator::{decompose, MultiplexedOperator, MultiplexedOperatorTerm};
pub use prepare::{prepare_box, prepare_box_with, prepare_custom, PrepareBox, PrepareData};
pub use qregs::{CircuitQRegs, Controlled, LcuQRegs, PrepareQRegs, QRegs, SelectQRegs};
pub use register_box::{apply_control_index, BoxKind, RegisterBox};
pub use register_circuit::RegisterCircuit;
pub use register_map::{CRegMap, QRegMap, RegisterMap, UnitGroup};
pub use select::{select_box, select_box_with, SelectBox, SelectData};
pub use utils::{
    block_encoded_matrix, diagonal_block_encoding, int_to_bits, is_involutory, kron_list,
};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use qlcu_circuits::prelude::*;
    //! ```

    pub use crate::lcu::{build_lcu, lcu_box, LcuBox};
    pub use crate::prepare::{prepare_box, PrepareBox};
    pub use crate::qregs::{Controlled, QRegs};
    pub use crate::register_box::RegisterBox;
    pub use crate::register_circuit::RegisterCircuit;
    pub use crate::register_map::{CRegMap, QRegMap};
    pub use crate::select::{select_box, SelectBox};
    pub use qlcu_backend::SelectionMap;
    pub use qlcu_core::{
        linalg, Circuit, Gate, Pauli, PauliOperator, PauliString, QlcuError, QlcuResult, Qubit,
        QubitRegister,
    };
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Integration Tests
// ============================================================================
