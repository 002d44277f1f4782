//! Circuits that absorb boxes
//!
//! Gantree: L3_Registers → RegisterCircuit
//!
//! A [`RegisterCircuit`] is a plain [`Circuit`] plus the wiring rules for
//! adding a [`RegisterBox`] as a composite gate. Without a map the box
//! qubits must already exist in the circuit under the same names. With a
//! map every box qubit is routed through it.

use crate::qregs::QRegs;
use crate::register_box::RegisterBox;
use crate::register_map::{CRegMap, QRegMap, RegisterMap, Unit};
use qlcu_core::{Bit, BitRegister, Circuit, Gate, QlcuError, QlcuResult, Qubit, QubitRegister};
use std::collections::BTreeSet;
use std::fmt;

/// Circuit over named registers that can absorb boxes
/// Gantree: RegisterCircuit{{circuit}} // 레지스터 회로
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterCircuit {
    circuit: Circuit,
}

impl RegisterCircuit {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Empty circuit without registers
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty named circuit
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            circuit: Circuit::with_name(name),
        }
    }

    /// Wrap an existing circuit
    pub fn from_circuit(circuit: Circuit) -> Self {
        Self { circuit }
    }

    // ========================================================================
    // Registers and Gates
    // ========================================================================

    /// Add a qubit register
    pub fn add_q_register(&mut self, name: impl Into<String>, size: usize) -> QlcuResult<QubitRegister> {
        self.circuit.add_q_register(name, size)
    }

    /// Add a copy of `reg`
    pub fn add_q_register_like(&mut self, reg: &QubitRegister) -> QlcuResult<()> {
        self.circuit.add_q_register_like(reg)
    }

    /// Add a bit register
    pub fn add_c_register(&mut self, name: impl Into<String>, size: usize) -> QlcuResult<BitRegister> {
        self.circuit.add_c_register(name, size)
    }

    /// Add a gate
    pub fn add_gate(&mut self, gate: Gate) -> QlcuResult<()> {
        self.circuit.add_gate(gate)
    }

    /// Qubit registers
    pub fn q_registers(&self) -> &[QubitRegister] {
        self.circuit.q_registers()
    }

    /// Bit registers
    pub fn c_registers(&self) -> &[BitRegister] {
        self.circuit.c_registers()
    }

    /// Sorted qubits
    pub fn qubits(&self) -> Vec<Qubit> {
        self.circuit.qubits()
    }

    /// Sorted bits
    pub fn bits(&self) -> Vec<Bit> {
        self.circuit.bits()
    }

    /// Number of qubits
    pub fn n_qubits(&self) -> usize {
        self.circuit.n_qubits()
    }

    /// Circuit name
    pub fn name(&self) -> Option<&str> {
        self.circuit.name()
    }

    /// Set circuit name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.circuit.set_name(name);
    }

    /// Underlying circuit
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Consume into the underlying circuit
    pub fn into_circuit(self) -> Circuit {
        self.circuit
    }

    /// Same registers, no gates, same name
    pub fn empty_like(&self) -> QlcuResult<RegisterCircuit> {
        let mut out = RegisterCircuit::new();
        if let Some(name) = self.name() {
            out.set_name(name);
        }
        for reg in self.q_registers() {
            out.add_q_register_like(reg)?;
        }
        for reg in self.c_registers() {
            out.circuit.add_c_register_like(reg)?;
        }
        Ok(out)
    }

    /// Adjoint circuit
    pub fn dagger(&self) -> QlcuResult<RegisterCircuit> {
        Ok(Self::from_circuit(self.circuit.dagger()?))
    }

    // ========================================================================
    // Box Composition
    // ========================================================================

    /// Add `register_box` as one composite gate.
    ///
    /// Without `qreg_map` every box qubit must be a qubit of this circuit.
    /// With a map, its box side must lie in the box, its circuit side in this
    /// circuit, and it must cover every box qubit. Bits follow the same rules
    /// with `creg_map`.
    /// Gantree: add_registerbox(box, qmap, cmap) -> Result<&mut Self> // 박스 흡수
    pub fn add_registerbox<R: QRegs>(
        &mut self,
        register_box: &RegisterBox<R>,
        qreg_map: Option<&QRegMap>,
        creg_map: Option<&CRegMap>,
    ) -> QlcuResult<&mut Self> {
        let qubits = route(
            &register_box.qubits(),
            &self.qubits(),
            qreg_map,
            "qubit",
        )?;
        let bits = route(&register_box.bits(), &self.bits(), creg_map, "bit")?;

        log::debug!(
            "absorbing {} ({} qubits) into {}",
            register_box.name().unwrap_or("box"),
            qubits.len(),
            self.name().unwrap_or("circuit")
        );
        self.circuit.add_gate(Gate::CircBox {
            qubits,
            bits,
            body: Box::new(register_box.get_circuit().circuit().clone()),
        })?;
        Ok(self)
    }

    /// Append the gates of `other`, which must act on units of this circuit
    pub fn append(&mut self, other: &RegisterCircuit) -> QlcuResult<&mut Self> {
        self.circuit.append(&other.circuit)?;
        Ok(self)
    }
}

/// Circuit units that receive `box_units`, in box order
fn route<U>(
    box_units: &[U],
    circ_units: &[U],
    map: Option<&RegisterMap<U>>,
    what: &str,
) -> QlcuResult<Vec<U>>
where
    U: Unit,
{
    let circ_set: BTreeSet<&U> = circ_units.iter().collect();
    match map {
        None => {
            if let Some(missing) = box_units.iter().find(|u| !circ_set.contains(u)) {
                return Err(QlcuError::SubsetViolation(format!(
                    "box {} {} is not in the circuit",
                    what, missing
                )));
            }
            Ok(box_units.to_vec())
        }
        Some(map) => {
            let box_set: BTreeSet<&U> = box_units.iter().collect();
            if let Some(extra) = map.box_units().iter().find(|u| !box_set.contains(u)) {
                return Err(QlcuError::SubsetViolation(format!(
                    "mapped {} {} is not in the box",
                    what, extra
                )));
            }
            if let Some(extra) = map.circ_units().iter().find(|u| !circ_set.contains(u)) {
                return Err(QlcuError::SubsetViolation(format!(
                    "mapped {} {} is not in the circuit",
                    what, extra
                )));
            }
            box_units
                .iter()
                .map(|u| {
                    map.get(u).cloned().ok_or_else(|| {
                        QlcuError::SubsetViolation(format!("box {} {} is not mapped", what, u))
                    })
                })
                .collect()
        }
    }
}

impl From<Circuit> for RegisterCircuit {
    fn from(circuit: Circuit) -> Self {
        Self::from_circuit(circuit)
    }
}

impl fmt::Display for RegisterCircuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.circuit)
    }
}

// ============================================================================
// Tests
// ============================================================================
