//! Select boxes
//!
//! Gantree: L4_Lcu → Select
//!
//! Select applies term `i` to the state register when the index register
//! reads `i`, as a single multiplexor. Controlling a Select with a few
//! qubits widens the multiplexor instead of wrapping it, so the controlled
//! box stays one multiplexor.

use crate::operator::MultiplexedOperator;
use crate::qregs::{QRegs, SelectQRegs, PREPARE_ROLE, STATE_ROLE};
use crate::register_box::{BoxKind, RegisterBox};
use crate::register_circuit::RegisterCircuit;
use qlcu_core::{registers, Gate, PauliOperator, QlcuError, QlcuResult, QubitRegister};

/// Select box over `prepare` and `state` registers
pub type SelectBox = RegisterBox<SelectQRegs>;

/// Payload of a Select box
/// Gantree: SelectData{{operator,multiplexed,adjoint}} // 선택 데이터
#[derive(Debug, Clone, PartialEq)]
pub struct SelectData {
    operator: PauliOperator,
    multiplexed: MultiplexedOperator,
    adjoint: bool,
}

impl SelectData {
    /// Source operator
    pub fn operator(&self) -> &PauliOperator {
        &self.operator
    }

    /// Decomposed terms
    pub fn multiplexed(&self) -> &MultiplexedOperator {
        &self.multiplexed
    }

    /// Whether the box applies the conjugated terms
    pub fn is_adjoint(&self) -> bool {
        self.adjoint
    }

    pub(crate) fn adjoint(&self) -> Self {
        Self {
            adjoint: !self.adjoint,
            ..self.clone()
        }
    }
}

/// Select box for `operator` with registers [`registers::PREPARE`] and
/// [`registers::STATE`]
/// Gantree: select_box(op, n_state) -> Result<SelectBox> // 선택 박스
pub fn select_box(operator: &PauliOperator, n_state_qubits: usize) -> QlcuResult<SelectBox> {
    select_box_with(operator, n_state_qubits, registers::PREPARE, registers::STATE)
}

/// Select box with custom register names
pub fn select_box_with(
    operator: &PauliOperator,
    n_state_qubits: usize,
    prepare_name: &str,
    state_name: &str,
) -> QlcuResult<SelectBox> {
    let multiplexed = MultiplexedOperator::new(operator, n_state_qubits)?;

    let mut circuit = RegisterCircuit::with_name("SelectMultiplexorBox");
    let prepare = circuit.add_q_register(prepare_name, multiplexed.n_prep_qubits())?;
    let state = circuit.add_q_register(state_name, n_state_qubits)?;
    circuit.add_gate(Gate::Multiplexor {
        controls: prepare.to_list(),
        targets: state.to_list(),
        op_map: multiplexed.op_map(0, false),
    })?;

    let data = SelectData {
        operator: operator.clone(),
        multiplexed,
        adjoint: false,
    };
    Ok(RegisterBox::new(SelectQRegs { prepare, state }, circuit)?.with_kind(BoxKind::Select(data)))
}

/// Body of a controlled Select: one multiplexor whose controls are
/// `control ++ prepare`, each pattern prefixed with set control bits
pub(crate) fn controlled_select_circuit<R: QRegs>(
    select: &RegisterBox<R>,
    data: &SelectData,
    control_name: &str,
    n_control: usize,
) -> QlcuResult<RegisterCircuit> {
    let prepare = role(select, PREPARE_ROLE)?;
    let state = role(select, STATE_ROLE)?;

    let mut circuit = select.initialise_circuit()?;
    circuit.set_name(format!("QControlSelectMultiplexorBox{}", n_control));
    let control = circuit.add_q_register(control_name, n_control)?;

    let mut controls = control.to_list();
    controls.extend(prepare.to_list());
    circuit.add_gate(Gate::Multiplexor {
        controls,
        targets: state.to_list(),
        op_map: data.multiplexed.op_map(n_control, data.adjoint),
    })?;
    Ok(circuit)
}

fn role<R: QRegs>(b: &RegisterBox<R>, role: &str) -> QlcuResult<QubitRegister> {
    b.qregs().group(role).cloned().ok_or_else(|| QlcuError::MissingGroup {
        group: role.to_string(),
        register: String::new(),
    })
}

impl RegisterBox<SelectQRegs> {
    /// Select payload
    pub fn select_data(&self) -> QlcuResult<&SelectData> {
        match self.kind() {
            BoxKind::Select(data) => Ok(data),
            BoxKind::Powered { base, .. } => base.select_data(),
            _ => Err(QlcuError::Unsupported(
                "box does not carry select data".into(),
            )),
        }
    }

    /// Index register width
    pub fn n_prep_qubits(&self) -> usize {
        self.qregs().prepare.size
    }

    /// State register width
    pub fn n_state_qubits(&self) -> usize {
        self.qregs().state.size
    }
}

// ============================================================================
// Tests
// ============================================================================
