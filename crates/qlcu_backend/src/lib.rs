//! # QLCU Backend
//!
//! Dense evaluation of circuits and exact post-selection of the results.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qlcu_backend // L2: Backend
//!     BackendTrait // CircuitBackend trait
//!     DenseSimulator // 밀집 유니터리/상태벡터
//!     PostSelect // 선택 사전과 (후)선택 알고리즘, 고정소수점 판독
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qlcu_backend::prelude::*;
//! use qlcu_core::{CircuitBuilder, Qubit};
//!
//! let q0 = Qubit::new("q", 0);
//! let q1 = Qubit::new("q", 1);
//! let circuit = CircuitBuilder::new()
//!     .register("q", 2)
//!     .h(&q0)
//!     .cx(&q0, &q1)
//!     .build()
//!     .unwrap();
//!
//! let backend = DenseSimulator::new();
//! let sv = backend.statevector(&circuit).unwrap();
//!
//! // keep the branch where q[0] reads 0
//! let post = SelectionMap::new().with(q0.clone(), 0);
//! let branch = statevector_postselect(&circuit.qubits(), &sv, &post, true).unwrap();
//! assert!((branch[0].re - 1.0).abs() < 1e-12);
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Backend trait (Gantree: L2_Backend → BackendTrait)
pub mod execution;

/// Dense simulator (Gantree: L2_Backend → DenseSimulator)
pub mod simulator;

/// Post-selection (Gantree: L2_Backend → PostSelect)
pub mod postselect;

// ============================================================================
// Re-exports
// ============================================================================

pub use execution::CircuitBackend;
pub use postselect::{
    bit_fixed_point, circuit_statevector_postselect, circuit_unitary_postselect,
    dist_to_fixed_point, statevector_postselect, unitary_postselect, SelectionMap,
};
pub use simulator::{multiplexor_matrix, state_preparation_matrix, DenseSimulator};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases

    pub use crate::execution::CircuitBackend;
    pub use crate::postselect::{
        circuit_statevector_postselect, circuit_unitary_postselect, statevector_postselect,
        unitary_postselect, SelectionMap,
    };
    pub use crate::simulator::DenseSimulator;
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use approx::assert_abs_diff_eq;
    use qlcu_core::{linalg, Circuit, CircuitBuilder, Gate, Qubit};

    #[test]
    fn test_controlled_rotation_postselected() {
        // a[0] controls Ry on q[0]; post-selecting a[0] = 1 with pre a[0] = 1
        // leaves the rotation, a[0] = 0 leaves identity
        let mut body = Circuit::with_register("t", 1);
        body.add_gate(Gate::Ry(Qubit::new("t", 0), 0.8)).unwrap();

        let mut circuit = Circuit::new();
        circuit.add_q_register("a", 1).unwrap();
        circuit.add_q_register("q", 1).unwrap();
        circuit
            .add_gate(Gate::QControl {
                controls: vec![Qubit::new("a", 0)],
                targets: vec![Qubit::new("q", 0)],
                body: Box::new(body.clone()),
            })
            .unwrap();

        let sim = DenseSimulator::new();
        let u = sim.unitary(&circuit).unwrap();
        let a0 = Qubit::new("a", 0);

        let on = unitary_postselect(
            &circuit.qubits(),
            &u,
            &SelectionMap::new().with(a0.clone(), 1),
            Some(&SelectionMap::new().with(a0.clone(), 1)),
        )
        .unwrap();
        assert!(linalg::approx_eq(&on, &sim.unitary(&body).unwrap(), 1e-12));

        let off = unitary_postselect(
            &circuit.qubits(),
            &u,
            &SelectionMap::new().with(a0, 0),
            None,
        )
        .unwrap();
        assert!(linalg::approx_eq(&off, &linalg::identity(2), 1e-12));
    }

    #[test]
    fn test_batch_unitaries() {
        let q0 = Qubit::new("q", 0);
        let circuits = vec![
            CircuitBuilder::new().register("q", 1).x(&q0).build().unwrap(),
            CircuitBuilder::new().register("q", 1).z(&q0).build().unwrap(),
        ];
        let us = DenseSimulator::new().unitary_batch(&circuits).unwrap();
        assert_eq!(us.len(), 2);
        assert_abs_diff_eq!(us[0][[0, 1]].re, 1.0);
        assert_abs_diff_eq!(us[1][[1, 1]].re, -1.0);
    }
}
