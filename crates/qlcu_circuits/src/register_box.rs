//! Register boxes
//!
//! Gantree: L3_Registers → RegisterBox
//!
//! A [`RegisterBox`] is a circuit, a role record naming its registers, an
//! optional post-selection and a kind. The kind keeps what a specialised box
//! knows about itself (its operator, its parts, its power) so that
//! `adjoint`, `controlled` and `powered` can build something better than
//! the generic construction.
//!
//! Controlled boxes get their control register added under a chosen name.
//! A control index `k` means "act when the control register reads `k`"
//! and is realised by X gates on the zero bits of `k` around an all-ones
//! controlled body.

use crate::lcu::{controlled_lcu_circuit, LcuData};
use crate::prepare::PrepareData;
use crate::qregs::{CircuitQRegs, Controlled, QRegs};
use crate::register_circuit::RegisterCircuit;
use crate::select::{controlled_select_circuit, SelectData};
use crate::utils::int_to_bits;
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use qlcu_backend::{
    statevector_postselect, unitary_postselect, CircuitBackend, DenseSimulator, SelectionMap,
};
use qlcu_core::{
    linalg, registers, Bit, BitRegister, Circuit, Gate, QlcuError, QlcuResult, Qubit,
    QubitRegister,
};
use std::collections::{BTreeMap, BTreeSet};

// ============================================================================
// Kinds
// ============================================================================

/// What a box knows about itself
/// Gantree: BoxKind<R> // 박스 종류
#[derive(Debug, Clone)]
pub enum BoxKind<R: QRegs> {
    /// Plain circuit
    Circuit,
    /// State preparation on the index register
    Prepare(PrepareData),
    /// Multiplexed Pauli terms
    Select(SelectData),
    /// Prepare, Select, Prepare†
    Lcu(LcuData),
    /// A controlled box
    Controlled {
        /// Width of the control register
        n_control: usize,
        /// Control value that triggers the body
        control_index: u64,
    },
    /// `base` repeated `power` times
    Powered {
        /// Repeated box
        base: Box<RegisterBox<R>>,
        /// Number of repetitions
        power: usize,
    },
}

// ============================================================================
// Register Box
// ============================================================================

/// Circuit with named register groups and a post-selection
/// Gantree: RegisterBox<R>{{qregs,circuit,postselect,kind}} // 레지스터 박스
#[derive(Debug, Clone)]
pub struct RegisterBox<R: QRegs> {
    qregs: R,
    circuit: RegisterCircuit,
    postselect: SelectionMap,
    kind: BoxKind<R>,
}

impl<R: QRegs> RegisterBox<R> {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Box over `circuit`. Every group of `qregs` must be a register of the
    /// circuit, with the same size, and no register may serve two groups.
    /// Gantree: new(qregs, circuit) -> Result<Self> // 박스 생성
    pub fn new(qregs: R, circuit: RegisterCircuit) -> QlcuResult<Self> {
        check_groups(&qregs, &circuit)?;
        Ok(Self {
            qregs,
            circuit,
            postselect: SelectionMap::new(),
            kind: BoxKind::Circuit,
        })
    }

    pub(crate) fn with_kind(mut self, kind: BoxKind<R>) -> Self {
        self.kind = kind;
        self
    }

    /// Attach a post-selection on qubits of this box
    pub fn with_postselect(mut self, postselect: SelectionMap) -> QlcuResult<Self> {
        for (qubit, value) in postselect.iter() {
            if !self.circuit.circuit().has_qubit(qubit) {
                return Err(QlcuError::InvalidSelection(format!(
                    "post-selected qubit {} is not in the box",
                    qubit
                )));
            }
            if value > 1 {
                return Err(QlcuError::InvalidSelection(format!(
                    "post-selection value {} for {} is not 0 or 1",
                    value, qubit
                )));
            }
        }
        self.postselect = postselect;
        Ok(self)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Role record
    pub fn qregs(&self) -> &R {
        &self.qregs
    }

    /// Owned circuit
    pub fn get_circuit(&self) -> &RegisterCircuit {
        &self.circuit
    }

    /// Post-selection of this box
    pub fn postselect(&self) -> &SelectionMap {
        &self.postselect
    }

    /// Kind payload
    pub fn kind(&self) -> &BoxKind<R> {
        &self.kind
    }

    /// Circuit name
    pub fn name(&self) -> Option<&str> {
        self.circuit.name()
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

    /// Qubit registers
    pub fn q_registers(&self) -> &[QubitRegister] {
        self.circuit.q_registers()
    }

    /// Bit registers
    pub fn c_registers(&self) -> &[BitRegister] {
        self.circuit.c_registers()
    }

    /// Empty circuit with the registers of this box, ready to host it
    /// Gantree: initialise_circuit() -> Result<RegisterCircuit> // 빈 회로
    pub fn initialise_circuit(&self) -> QlcuResult<RegisterCircuit> {
        self.circuit.empty_like()
    }

    /// This box as one composite gate on its own qubits
    pub fn to_circbox(&self) -> Gate {
        Gate::CircBox {
            qubits: self.qubits(),
            bits: self.bits(),
            body: Box::new(self.circuit.circuit().clone()),
        }
    }

    // ========================================================================
    // Algebra
    // ========================================================================

    /// Adjoint box, same groups and post-selection.
    /// The adjoint of a power is the power of the adjoint.
    /// Gantree: adjoint() -> Result<Self> // 수반 박스
    pub fn adjoint(&self) -> QlcuResult<Self> {
        if let BoxKind::Powered { base, power } = &self.kind {
            return base.adjoint()?.powered(*power);
        }
        let kind = match &self.kind {
            BoxKind::Prepare(data) => BoxKind::Prepare(data.adjoint()),
            BoxKind::Select(data) => BoxKind::Select(data.adjoint()),
            BoxKind::Lcu(data) => BoxKind::Lcu(data.adjoint()?),
            other => other.clone(),
        };
        Ok(Self {
            qregs: self.qregs.clone(),
            circuit: self.circuit.dagger()?,
            postselect: self.postselect.clone(),
            kind,
        })
    }

    /// This box applied `power` times. The post-selection is kept.
    /// Gantree: powered(n) -> Result<Self> // 거듭제곱
    pub fn powered(&self, power: usize) -> QlcuResult<Self> {
        let mut circuit = self.initialise_circuit()?;
        circuit.set_name(format!("{}^{}", self.name().unwrap_or("Box"), power));
        for _ in 0..power {
            circuit.add_registerbox(self, None, None)?;
        }
        Ok(Self {
            qregs: self.qregs.clone(),
            circuit,
            postselect: self.postselect.clone(),
            kind: BoxKind::Powered {
                base: Box::new(self.clone()),
                power,
            },
        })
    }

    /// [`controlled_with`](Self::controlled_with) using control register
    /// [`registers::CONTROL`]
    pub fn controlled(
        &self,
        n_control: usize,
        control_index: Option<u64>,
    ) -> QlcuResult<RegisterBox<Controlled<R>>> {
        self.controlled_with(registers::CONTROL, n_control, control_index)
    }

    /// Box that applies this one when a new `n_control`-qubit register
    /// called `control_name` reads `control_index` (all ones by default).
    ///
    /// Select boxes with at most [`registers::MAX_MULTIPLEXOR_CONTROLS`]
    /// controls widen their multiplexor; LCU boxes control only their
    /// Select; powers control each repetition of their base.
    /// Gantree: controlled_with(name, n, index) -> Result<RegisterBox<Controlled<R>>> // 제어 박스
    pub fn controlled_with(
        &self,
        control_name: &str,
        n_control: usize,
        control_index: Option<u64>,
    ) -> QlcuResult<RegisterBox<Controlled<R>>> {
        let index = check_control(n_control, control_index)?;

        let body = match &self.kind {
            BoxKind::Select(data) if n_control <= registers::MAX_MULTIPLEXOR_CONTROLS => {
                controlled_select_circuit(self, data, control_name, n_control)?
            }
            BoxKind::Lcu(data) => controlled_lcu_circuit(self, data, control_name, n_control)?,
            BoxKind::Powered { base, power } => {
                let mut circuit = base.initialise_circuit()?;
                circuit.set_name(format!("QControlPowerBox{}", n_control));
                circuit.add_q_register(control_name, n_control)?;
                let step = base.controlled_with(control_name, n_control, None)?;
                for _ in 0..*power {
                    circuit.add_registerbox(&step, None, None)?;
                }
                circuit
            }
            _ => self.qcontrol_circuit(control_name, n_control)?,
        };

        let qregs = Controlled {
            base: self.qregs.clone(),
            control: QubitRegister::new(control_name, n_control),
        };
        let circuit = apply_control_index(&qregs, &body, Some(index))?;
        log::debug!(
            "controlled {} on {}[{}] at index {}",
            self.name().unwrap_or("box"),
            control_name,
            n_control,
            index
        );

        Ok(RegisterBox {
            postselect: self.postselect.clone(),
            ..RegisterBox::new(qregs, circuit)?.with_kind(BoxKind::Controlled {
                n_control,
                control_index: index,
            })
        })
    }

    /// Generic all-ones controlled body
    fn qcontrol_circuit(&self, control_name: &str, n_control: usize) -> QlcuResult<RegisterCircuit> {
        let mut circuit = self.initialise_circuit()?;
        circuit.set_name(format!("QControl{}", self.name().unwrap_or("Box")));
        let control = circuit.add_q_register(control_name, n_control)?;
        circuit.add_gate(Gate::QControl {
            controls: control.to_list(),
            targets: self.qubits(),
            body: Box::new(self.circuit.circuit().clone()),
        })?;
        Ok(circuit)
    }

    // ========================================================================
    // Renaming
    // ========================================================================

    /// Copy with qubit registers renamed (old name → new name). Every old
    /// name must be a register of the box.
    /// Gantree: rename_q_registers(renames) -> Result<Self> // 레지스터 이름 변경
    pub fn rename_q_registers(&self, renames: &BTreeMap<String, String>) -> QlcuResult<Self> {
        for old in renames.keys() {
            if self.circuit.circuit().q_register(old).is_none() {
                return Err(QlcuError::SubsetViolation(format!(
                    "register {} is not in the box",
                    old
                )));
            }
        }
        self.renamed(renames)
    }

    pub(crate) fn renamed(&self, renames: &BTreeMap<String, String>) -> QlcuResult<Self> {
        let rename = |n: &str| renames.get(n).cloned().unwrap_or_else(|| n.to_string());

        let mut qregs = self.qregs.clone();
        qregs.rename(&rename);
        let circuit = RegisterCircuit::from_circuit(self.circuit.circuit().rename_registers(renames)?);
        let postselect = self
            .postselect
            .map_qubits(|q| Qubit::new(rename(q.register.as_str()), q.index));
        let kind = match &self.kind {
            BoxKind::Powered { base, power } => BoxKind::Powered {
                base: Box::new(base.renamed(renames)?),
                power: *power,
            },
            BoxKind::Lcu(data) => BoxKind::Lcu(data.renamed(renames)?),
            other => other.clone(),
        };
        Ok(Self {
            postselect,
            ..Self::new(qregs, circuit)?.with_kind(kind)
        })
    }

    // ========================================================================
    // Dense Evaluation
    // ========================================================================

    /// Unitary of the box, optionally (pre/)post-selected.
    /// A pre-selection needs a post-selection over the same qubits.
    /// Gantree: get_unitary(post, pre) -> Result<Array2> // 유니터리
    pub fn get_unitary(
        &self,
        post_select: Option<&SelectionMap>,
        pre_select: Option<&SelectionMap>,
    ) -> QlcuResult<Array2<Complex64>> {
        self.get_unitary_with(&DenseSimulator::new(), post_select, pre_select)
    }

    /// [`get_unitary`](Self::get_unitary) on a chosen backend
    pub fn get_unitary_with(
        &self,
        backend: &dyn CircuitBackend,
        post_select: Option<&SelectionMap>,
        pre_select: Option<&SelectionMap>,
    ) -> QlcuResult<Array2<Complex64>> {
        let unitary = backend.unitary(self.circuit.circuit())?;
        match (post_select, pre_select) {
            (None, None) => Ok(unitary),
            (None, Some(_)) => Err(QlcuError::InvalidSelection(
                "pre-selection given without post-selection".into(),
            )),
            (Some(post), pre) => unitary_postselect(&self.qubits(), &unitary, post, pre),
        }
    }

    /// Statevector from |0...0>, optionally post-selected and renormalised
    /// (a vanishing branch is returned as is)
    /// Gantree: get_statevector(post) -> Result<Array1> // 상태벡터
    pub fn get_statevector(&self, post_select: Option<&SelectionMap>) -> QlcuResult<Array1<Complex64>> {
        self.get_statevector_with(&DenseSimulator::new(), post_select)
    }

    /// [`get_statevector`](Self::get_statevector) on a chosen backend
    pub fn get_statevector_with(
        &self,
        backend: &dyn CircuitBackend,
        post_select: Option<&SelectionMap>,
    ) -> QlcuResult<Array1<Complex64>> {
        let sv = backend.statevector(self.circuit.circuit())?;
        let Some(post) = post_select else {
            return Ok(sv);
        };
        let mut branch = statevector_postselect(&self.qubits(), &sv, post, false)?;
        let norm = linalg::norm(&branch);
        if norm > 0.0 {
            branch.mapv_inplace(|z| z / norm);
        }
        Ok(branch)
    }

    /// Unitary restricted by the box's own post-selection, with the
    /// post-selected qubits starting in 0
    pub fn postselected_unitary(&self) -> QlcuResult<Array2<Complex64>> {
        self.get_unitary(Some(&self.postselect), None)
    }
}

impl RegisterBox<CircuitQRegs> {
    /// Box with one group per register of `circuit`
    /// Gantree: from_circuit(circuit) -> Result<Self> // 회로→박스
    pub fn from_circuit(circuit: Circuit) -> QlcuResult<Self> {
        let qregs = CircuitQRegs::from_registers(circuit.q_registers());
        Self::new(qregs, RegisterCircuit::from_circuit(circuit))
    }
}

// ============================================================================
// Control Index
// ============================================================================

/// Resolve the control index, all ones by default
fn check_control(n_control: usize, control_index: Option<u64>) -> QlcuResult<u64> {
    if n_control == 0 || n_control >= 64 {
        return Err(QlcuError::InvalidControlCount(n_control));
    }
    let all_ones = (1u64 << n_control) - 1;
    let index = control_index.unwrap_or(all_ones);
    if index > all_ones {
        return Err(QlcuError::InvalidControlIndex { index, n_control });
    }
    Ok(index)
}

/// Wrap an all-ones controlled `body` so that it fires on `control_index`:
/// X on every control qubit whose bit of the index is 0, before and after.
/// `qregs` must have a control group.
/// Gantree: apply_control_index(qregs, body, index) -> Result<RegisterCircuit> // 제어 인덱스
pub fn apply_control_index<Q: QRegs>(
    qregs: &Q,
    body: &RegisterCircuit,
    control_index: Option<u64>,
) -> QlcuResult<RegisterCircuit> {
    let control = qregs.control().ok_or(QlcuError::MissingControlGroup)?;
    let index = check_control(control.size, control_index)?;

    let flips: Vec<Gate> = int_to_bits(index, control.size)
        .into_iter()
        .zip(control.to_list())
        .filter(|(bit, _)| !bit)
        .map(|(_, q)| Gate::X(q))
        .collect();

    let mut circuit = body.empty_like()?;
    circuit.set_name(format!(
        "QC{}({}){}",
        control.size,
        index,
        body.name().unwrap_or("")
    ));
    for gate in &flips {
        circuit.add_gate(gate.clone())?;
    }
    circuit.append(body)?;
    for gate in flips {
        circuit.add_gate(gate)?;
    }
    Ok(circuit)
}

fn check_groups<R: QRegs>(qregs: &R, circuit: &RegisterCircuit) -> QlcuResult<()> {
    let mut seen = BTreeSet::new();
    for (role, reg) in qregs.groups() {
        match circuit.circuit().q_register(&reg.name) {
            Some(owned) if owned.size == reg.size => {}
            _ => {
                return Err(QlcuError::MissingGroup {
                    group: role.to_string(),
                    register: reg.to_string(),
                })
            }
        }
        if !seen.insert(reg.name.as_str()) {
            return Err(QlcuError::OverlappingGroups(reg.name.clone()));
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
