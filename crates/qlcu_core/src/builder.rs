//! Circuit builder for QLCU
//!
//! Gantree: L1_Circuit → CircuitBuilder
//!
//! Fluent builder over named registers. The first failing gate is kept and
//! reported by [`CircuitBuilder::build`]; later calls become no-ops.

use crate::circuit::Circuit;
use crate::error::{QlcuError, QlcuResult};
use crate::gate::Gate;
use crate::types::{Angle, Matrix2, Qubit};

/// Fluent circuit builder (consuming self pattern)
/// Gantree: CircuitBuilder // 빌더 패턴
#[derive(Debug, Clone, Default)]
pub struct CircuitBuilder {
    /// Internal circuit being built
    /// Gantree: circuit: Circuit // 내부 회로
    circuit: Circuit,

    /// First error hit while building
    error: Option<QlcuError>,
}

impl CircuitBuilder {
    // ========================================================================
    // Constructor
    // ========================================================================

    /// Create a new circuit builder
    /// Gantree: new() -> Self // 생성자
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with circuit name
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            circuit: Circuit::with_name(name),
            error: None,
        }
    }

    /// Add a qubit register
    pub fn register(mut self, name: &str, size: usize) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.circuit.add_q_register(name, size) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Add any gate
    pub fn gate(mut self, gate: Gate) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.circuit.add_gate(gate) {
                self.error = Some(e);
            }
        }
        self
    }

    // ========================================================================
    // Single-Qubit Gates
    // ========================================================================

    /// Add Hadamard gate
    /// Gantree: h(self, q) -> Self // H 추가
    pub fn h(self, qubit: &Qubit) -> Self {
        self.gate(Gate::H(qubit.clone()))
    }

    /// Add Pauli-X gate
    pub fn x(self, qubit: &Qubit) -> Self {
        self.gate(Gate::X(qubit.clone()))
    }

    /// Add Pauli-Y gate
    pub fn y(self, qubit: &Qubit) -> Self {
        self.gate(Gate::Y(qubit.clone()))
    }

    /// Add Pauli-Z gate
    pub fn z(self, qubit: &Qubit) -> Self {
        self.gate(Gate::Z(qubit.clone()))
    }

    /// Add S gate
    pub fn s(self, qubit: &Qubit) -> Self {
        self.gate(Gate::S(qubit.clone()))
    }

    /// Add T gate
    pub fn t(self, qubit: &Qubit) -> Self {
        self.gate(Gate::T(qubit.clone()))
    }

    /// Add Rx rotation
    pub fn rx(self, qubit: &Qubit, angle: Angle) -> Self {
        self.gate(Gate::Rx(qubit.clone(), angle))
    }

    /// Add Ry rotation
    pub fn ry(self, qubit: &Qubit, angle: Angle) -> Self {
        self.gate(Gate::Ry(qubit.clone(), angle))
    }

    /// Add Rz rotation
    pub fn rz(self, qubit: &Qubit, angle: Angle) -> Self {
        self.gate(Gate::Rz(qubit.clone(), angle))
    }

    /// Add an arbitrary single-qubit unitary
    pub fn unitary1q(self, qubit: &Qubit, u: Matrix2) -> Self {
        self.gate(Gate::Unitary1q(qubit.clone(), u))
    }

    // ========================================================================
    // Two-Qubit Gates
    // ========================================================================

    /// Add CNOT gate
    pub fn cx(self, control: &Qubit, target: &Qubit) -> Self {
        self.gate(Gate::Cx(control.clone(), target.clone()))
    }

    /// Add CZ gate
    pub fn cz(self, control: &Qubit, target: &Qubit) -> Self {
        self.gate(Gate::Cz(control.clone(), target.clone()))
    }

    /// Add SWAP gate
    pub fn swap(self, a: &Qubit, b: &Qubit) -> Self {
        self.gate(Gate::Swap(a.clone(), b.clone()))
    }

    // ========================================================================
    // Layer Operations
    // ========================================================================

    /// Hadamard on every qubit of register `name`
    pub fn h_layer(self, name: &str) -> Self {
        let qubits = self
            .circuit
            .q_register(name)
            .map(|r| r.to_list())
            .unwrap_or_default();
        qubits.iter().fold(self, |b, q| b.h(q))
    }

    /// X on every qubit of register `name`
    pub fn x_layer(self, name: &str) -> Self {
        let qubits = self
            .circuit
            .q_register(name)
            .map(|r| r.to_list())
            .unwrap_or_default();
        qubits.iter().fold(self, |b, q| b.x(q))
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Build and return the circuit, or the first error
    /// Gantree: build(self) -> Result<Circuit> // 빌드
    pub fn build(self) -> QlcuResult<Circuit> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.circuit),
        }
    }

    /// Get reference to current circuit state
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_basic() {
        let q0 = Qubit::new("q", 0);
        let q1 = Qubit::new("q", 1);
        let circuit = CircuitBuilder::with_name("bell")
            .register("q", 2)
            .h(&q0)
            .cx(&q0, &q1)
            .build()
            .unwrap();
        assert_eq!(circuit.n_qubits(), 2);
        assert_eq!(circuit.gate_count(), 2);
        assert_eq!(circuit.name(), Some("bell"));
    }

    #[test]
    fn test_builder_layers() {
        let circuit = CircuitBuilder::new()
            .register("p", 3)
            .h_layer("p")
            .x_layer("p")
            .build()
            .unwrap();
        assert_eq!(circuit.count_1q(), 6);
    }

    #[test]
    fn test_builder_keeps_first_error() {
        let result = CircuitBuilder::new()
            .register("q", 1)
            .h(&Qubit::new("r", 0))
            .register("q", 1)
            .build();
        assert!(matches!(result, Err(QlcuError::UnknownQubit(_))));
    }
}
