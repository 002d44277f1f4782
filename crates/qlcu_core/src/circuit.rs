//! Quantum circuit structure for QLCU
//!
//! Gantree: L1_Circuit → Circuit
//!
//! A circuit owns named qubit and bit registers and a gate list. Units are
//! always listed in sorted `(register, index)` order, which fixes the
//! index convention of every dense matrix computed from the circuit.

use crate::error::{QlcuError, QlcuResult};
use crate::gate::Gate;
use crate::types::{Bit, BitRegister, Qubit, QubitRegister};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Quantum circuit over named registers
/// Gantree: Circuit // 회로 구조체
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Qubit registers in insertion order
    /// Gantree: q_registers: Vec<QubitRegister> // 큐비트 레지스터
    q_registers: Vec<QubitRegister>,

    /// Bit registers in insertion order
    c_registers: Vec<BitRegister>,

    /// Gate sequence
    /// Gantree: gates: Vec<Gate> // 게이트 목록
    gates: Vec<Gate>,

    /// Optional circuit name
    name: Option<String>,
}

impl Circuit {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a new empty circuit without registers
    /// Gantree: new() -> Self // 생성자
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a circuit with a name
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Create a circuit with one qubit register
    pub fn with_register(name: impl Into<String>, size: usize) -> Self {
        Self {
            q_registers: vec![QubitRegister::new(name, size)],
            ..Self::default()
        }
    }

    // ========================================================================
    // Registers
    // ========================================================================

    /// Add a qubit register
    /// Gantree: add_q_register(&mut, name, size) -> Result<QubitRegister> // 레지스터 추가
    pub fn add_q_register(&mut self, name: impl Into<String>, size: usize) -> QlcuResult<QubitRegister> {
        let reg = QubitRegister::new(name, size);
        self.add_q_register_like(&reg)?;
        Ok(reg)
    }

    /// Add an existing register description
    pub fn add_q_register_like(&mut self, reg: &QubitRegister) -> QlcuResult<()> {
        if self.q_registers.iter().any(|r| r.name == reg.name) {
            return Err(QlcuError::DuplicateRegister(reg.name.clone()));
        }
        self.q_registers.push(reg.clone());
        Ok(())
    }

    /// Add a bit register
    pub fn add_c_register(&mut self, name: impl Into<String>, size: usize) -> QlcuResult<BitRegister> {
        let reg = BitRegister::new(name, size);
        self.add_c_register_like(&reg)?;
        Ok(reg)
    }

    /// Add an existing bit register description
    pub fn add_c_register_like(&mut self, reg: &BitRegister) -> QlcuResult<()> {
        if self.c_registers.iter().any(|r| r.name == reg.name) {
            return Err(QlcuError::DuplicateRegister(reg.name.clone()));
        }
        self.c_registers.push(reg.clone());
        Ok(())
    }

    /// Qubit registers
    pub fn q_registers(&self) -> &[QubitRegister] {
        &self.q_registers
    }

    /// Bit registers
    pub fn c_registers(&self) -> &[BitRegister] {
        &self.c_registers
    }

    /// Find a qubit register by name
    pub fn q_register(&self, name: &str) -> Option<&QubitRegister> {
        self.q_registers.iter().find(|r| r.name == name)
    }

    /// All qubits, sorted
    /// Gantree: qubits(&self) -> Vec<Qubit> // 정렬된 큐비트
    pub fn qubits(&self) -> Vec<Qubit> {
        let mut qs: Vec<Qubit> = self.q_registers.iter().flat_map(|r| r.to_list()).collect();
        qs.sort();
        qs
    }

    /// All bits, sorted
    pub fn bits(&self) -> Vec<Bit> {
        let mut bs: Vec<Bit> = self.c_registers.iter().flat_map(|r| r.to_list()).collect();
        bs.sort();
        bs
    }

    /// Number of qubits
    pub fn n_qubits(&self) -> usize {
        self.q_registers.iter().map(|r| r.size).sum()
    }

    /// Number of bits
    pub fn n_bits(&self) -> usize {
        self.c_registers.iter().map(|r| r.size).sum()
    }

    /// Whether the circuit owns `qubit`
    pub fn has_qubit(&self, qubit: &Qubit) -> bool {
        self.q_registers.iter().any(|r| r.contains(qubit))
    }

    /// Whether the circuit owns `bit`
    pub fn has_bit(&self, bit: &Bit) -> bool {
        self.c_registers
            .iter()
            .any(|r| r.name == bit.register && bit.index < r.size)
    }

    // ========================================================================
    // Basic Operations
    // ========================================================================

    /// Add a gate to the circuit
    /// Gantree: add_gate(&mut, Gate) -> Result // 게이트 추가
    pub fn add_gate(&mut self, gate: Gate) -> QlcuResult<()> {
        for qubit in gate.qubits() {
            if !self.has_qubit(&qubit) {
                return Err(QlcuError::UnknownQubit(qubit.to_string()));
            }
        }
        for bit in gate.bits() {
            if !self.has_bit(&bit) {
                return Err(QlcuError::UnknownBit(bit.to_string()));
            }
        }
        gate.validate()?;
        self.gates.push(gate);
        Ok(())
    }

    /// Add multiple gates
    pub fn add_gates(&mut self, gates: impl IntoIterator<Item = Gate>) -> QlcuResult<()> {
        for gate in gates {
            self.add_gate(gate)?;
        }
        Ok(())
    }

    /// Append the gates of `other`, which must act on units of this circuit
    pub fn append(&mut self, other: &Circuit) -> QlcuResult<()> {
        self.add_gates(other.gates.iter().cloned())
    }

    /// Get gates
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Get circuit name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set circuit name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Check if circuit is empty
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    // ========================================================================
    // Transformations
    // ========================================================================

    /// Reversed circuit of conjugated gates
    /// Gantree: dagger(&self) -> Result<Circuit> // 수반 회로
    pub fn dagger(&self) -> QlcuResult<Circuit> {
        let gates = self
            .gates
            .iter()
            .rev()
            .map(Gate::dagger)
            .collect::<QlcuResult<Vec<_>>>()?;
        Ok(Circuit {
            q_registers: self.q_registers.clone(),
            c_registers: self.c_registers.clone(),
            gates,
            name: self.name.as_ref().map(|n| format!("{}†", n)),
        })
    }

    /// Copy with registers renamed by `renames` (old name → new name).
    /// Names absent from the map are kept.
    pub fn rename_registers(&self, renames: &BTreeMap<String, String>) -> QlcuResult<Circuit> {
        let rename = |n: &String| renames.get(n).cloned().unwrap_or_else(|| n.clone());

        let mut out = Circuit {
            name: self.name.clone(),
            ..Circuit::default()
        };
        for reg in &self.q_registers {
            out.add_q_register(rename(&reg.name), reg.size)?;
        }
        for reg in &self.c_registers {
            out.add_c_register(rename(&reg.name), reg.size)?;
        }

        let fq = |q: &Qubit| Qubit::new(rename(&q.register), q.index);
        let fb = |b: &Bit| Bit::new(rename(&b.register), b.index);
        out.gates = self.gates.iter().map(|g| g.map_units(&fq, &fb)).collect();
        Ok(out)
    }

    // ========================================================================
    // Circuit Analysis
    // ========================================================================

    /// Calculate circuit depth (longest path), composite gates count as one
    /// Gantree: depth(&self) -> usize // 깊이 계산
    pub fn depth(&self) -> usize {
        let mut qubit_depths: HashMap<Qubit, usize> = HashMap::new();
        for gate in &self.gates {
            let qubits = gate.qubits();
            let max_depth = qubits
                .iter()
                .filter_map(|q| qubit_depths.get(q))
                .max()
                .copied()
                .unwrap_or(0);
            for q in qubits {
                qubit_depths.insert(q, max_depth + 1);
            }
        }
        qubit_depths.into_values().max().unwrap_or(0)
    }

    /// Get total gate count
    /// Gantree: gate_count(&self) -> usize // 게이트 수
    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    /// Count single-qubit primitives
    pub fn count_1q(&self) -> usize {
        self.gates.iter().filter(|g| g.is_single_qubit()).count()
    }

    /// Count composite gates
    pub fn count_composite(&self) -> usize {
        self.gates.iter().filter(|g| g.is_composite()).count()
    }

    /// Count measurement operations
    pub fn count_measurements(&self) -> usize {
        self.gates.iter().filter(|g| g.is_measurement()).count()
    }
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let regs: Vec<String> = self.q_registers.iter().map(|r| r.to_string()).collect();
        writeln!(
            f,
            "Circuit {}({} qubits, {} gates)",
            self.name.as_deref().unwrap_or(""),
            self.n_qubits(),
            self.gates.len()
        )?;
        writeln!(f, "  Registers: {}", regs.join(" "))?;
        writeln!(f, "  Depth: {}", self.depth())?;
        writeln!(f, "  Composite gates: {}", self.count_composite())?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn q(i: usize) -> Qubit {
        Qubit::new("q", i)
    }

    #[test]
    fn test_registers_and_qubit_order() {
        let mut circuit = Circuit::new();
        circuit.add_q_register("q", 2).unwrap();
        circuit.add_q_register("a", 1).unwrap();
        assert_eq!(circuit.n_qubits(), 3);
        assert_eq!(circuit.qubits()[0], Qubit::new("a", 0));
        assert!(matches!(
            circuit.add_q_register("q", 1),
            Err(QlcuError::DuplicateRegister(_))
        ));
    }

    #[test]
    fn test_add_gate_unknown_qubit() {
        let mut circuit = Circuit::with_register("q", 2);
        assert!(circuit.add_gate(Gate::H(q(0))).is_ok());
        assert!(matches!(
            circuit.add_gate(Gate::H(q(5))),
            Err(QlcuError::UnknownQubit(_))
        ));
        assert!(matches!(
            circuit.add_gate(Gate::Measure(q(0), Bit::new("c", 0))),
            Err(QlcuError::UnknownBit(_))
        ));
    }

    #[test]
    fn test_dagger_reverses() {
        let mut circuit = Circuit::with_register("q", 2);
        circuit.set_name("u");
        circuit.add_gate(Gate::S(q(0))).unwrap();
        circuit.add_gate(Gate::Cx(q(0), q(1))).unwrap();
        let dag = circuit.dagger().unwrap();
        assert_eq!(dag.gates()[0], Gate::Cx(q(0), q(1)));
        assert_eq!(dag.gates()[1], Gate::Sdg(q(0)));
        assert_eq!(dag.name(), Some("u†"));
        // original untouched
        assert_eq!(circuit.gates()[0], Gate::S(q(0)));
    }

    #[test]
    fn test_rename_registers() {
        let mut circuit = Circuit::with_register("q", 2);
        circuit.add_gate(Gate::Cz(q(0), q(1))).unwrap();
        let renames: BTreeMap<String, String> = [("q".to_string(), "s".to_string())].into();
        let renamed = circuit.rename_registers(&renames).unwrap();
        assert!(renamed.q_register("s").is_some());
        assert_eq!(
            renamed.gates()[0],
            Gate::Cz(Qubit::new("s", 0), Qubit::new("s", 1))
        );
    }

    #[test]
    fn test_clone_is_deep() {
        let mut a = Circuit::with_register("q", 1);
        a.add_gate(Gate::X(q(0))).unwrap();
        let mut b = a.clone();
        b.add_gate(Gate::Z(q(0))).unwrap();
        assert_eq!(a.gate_count(), 1);
        assert_eq!(b.gate_count(), 2);
    }

    #[test]
    fn test_depth() {
        let mut circuit = Circuit::with_register("q", 3);
        circuit.add_gate(Gate::H(q(0))).unwrap();
        circuit.add_gate(Gate::H(q(1))).unwrap();
        circuit.add_gate(Gate::Cx(q(0), q(1))).unwrap();
        circuit.add_gate(Gate::H(q(2))).unwrap();
        assert_eq!(circuit.depth(), 2);
    }
}
