//! LCU block encodings
//!
//! Gantree: L4_Lcu → Lcu
//!
//! `U = Prepare† · Select · Prepare` with the index register post-selected
//! on zero. The selected block is `H / λ`. Controlling an LCU only
//! controls its Select.

use crate::operator::decompose;
use crate::prepare::{prepare_box_with, PrepareBox};
use crate::qregs::{LcuQRegs, QRegs, PREPARE_ROLE};
use crate::register_box::{BoxKind, RegisterBox};
use crate::register_circuit::RegisterCircuit;
use crate::register_map::QRegMap;
use crate::select::{select_box_with, SelectBox};
use crate::utils::block_encoded_matrix;
use ndarray::Array2;
use num_complex::Complex64;
use qlcu_backend::SelectionMap;
use qlcu_core::{linalg, registers, PauliOperator, QlcuError, QlcuResult};
use std::collections::BTreeMap;

/// LCU box over `prepare` and `state` registers
pub type LcuBox = RegisterBox<LcuQRegs>;

/// Payload of an LCU box: its parts
/// Gantree: LcuData{{prepare,select}} // LCU 구성 요소
#[derive(Debug, Clone)]
pub struct LcuData {
    prepare: Box<PrepareBox>,
    select: Box<SelectBox>,
}

impl LcuData {
    /// Prepare part
    pub fn prepare(&self) -> &PrepareBox {
        &self.prepare
    }

    /// Select part
    pub fn select(&self) -> &SelectBox {
        &self.select
    }

    pub(crate) fn adjoint(&self) -> QlcuResult<Self> {
        Ok(Self {
            prepare: self.prepare.clone(),
            select: Box::new(self.select.adjoint()?),
        })
    }

    pub(crate) fn renamed(&self, renames: &BTreeMap<String, String>) -> QlcuResult<Self> {
        Ok(Self {
            prepare: Box::new(self.prepare.renamed(renames)?),
            select: Box::new(self.select.renamed(renames)?),
        })
    }
}

/// Compose `prepare` and `select` into an LCU.
/// The index widths must agree.
/// Gantree: lcu_box(prepare, select) -> Result<LcuBox> // LCU 합성
pub fn lcu_box(prepare: PrepareBox, select: SelectBox) -> QlcuResult<LcuBox> {
    if prepare.n_prepare_qubits() != select.n_prep_qubits() {
        return Err(QlcuError::SizeMismatch {
            prepare: prepare.n_prepare_qubits(),
            select: select.n_prep_qubits(),
        });
    }

    let qregs = LcuQRegs {
        prepare: select.qregs().prepare.clone(),
        state: select.qregs().state.clone(),
    };
    let mut circuit = select.initialise_circuit()?;
    circuit.set_name("LCUBox");

    let prepare_map = QRegMap::build([&prepare.qregs().prepare], [&qregs.prepare])?;
    circuit
        .add_registerbox(&prepare, Some(&prepare_map), None)?
        .add_registerbox(&select, None, None)?
        .add_registerbox(&prepare.adjoint()?, Some(&prepare_map), None)?;

    let postselect = SelectionMap::zeros(&qregs.prepare.to_list());
    log::debug!(
        "LCU over {} index and {} state qubits",
        qregs.prepare.size,
        qregs.state.size
    );
    let data = LcuData {
        prepare: Box::new(prepare),
        select: Box::new(select),
    };
    Ok(RegisterBox::new(qregs, circuit)?
        .with_kind(BoxKind::Lcu(data))
        .with_postselect(postselect)?)
}

/// LCU of `operator` on `n_state_qubits`, registers
/// [`registers::PREPARE`] and [`registers::STATE`]
/// Gantree: build_lcu(op, n_state) -> Result<LcuBox> // 연산자→LCU
pub fn build_lcu(operator: &PauliOperator, n_state_qubits: usize) -> QlcuResult<LcuBox> {
    build_lcu_with(operator, n_state_qubits, registers::PREPARE, registers::STATE)
}

/// [`build_lcu`] with custom register names
pub fn build_lcu_with(
    operator: &PauliOperator,
    n_state_qubits: usize,
    prepare_name: &str,
    state_name: &str,
) -> QlcuResult<LcuBox> {
    let (terms, _, _) = decompose(operator, n_state_qubits)?;
    let magnitudes: Vec<f64> = terms.iter().map(|t| t.magnitude()).collect();
    let prepare = prepare_box_with(&magnitudes, prepare_name)?;
    let select = select_box_with(operator, n_state_qubits, prepare_name, state_name)?;
    lcu_box(prepare, select)
}

/// Body of a controlled LCU: Prepare, controlled Select, Prepare†
pub(crate) fn controlled_lcu_circuit<R: QRegs>(
    lcu: &RegisterBox<R>,
    data: &LcuData,
    control_name: &str,
    n_control: usize,
) -> QlcuResult<RegisterCircuit> {
    let mut circuit = lcu.initialise_circuit()?;
    circuit.set_name(format!("QControlLCUBox{}", n_control));
    let control = circuit.add_q_register(control_name, n_control)?;

    let prepare_reg = lcu
        .qregs()
        .group(PREPARE_ROLE)
        .cloned()
        .ok_or_else(|| QlcuError::MissingGroup {
            group: PREPARE_ROLE.into(),
            register: String::new(),
        })?;
    let prepare_map = QRegMap::build([&data.prepare.qregs().prepare], [&prepare_reg])?;

    // role-wise wiring, so the parts may use other register names
    let select = data.select.controlled_with(control_name, n_control, None)?;
    let mut box_groups = vec![control.clone()];
    let mut circ_groups = vec![control];
    for (role, reg) in data.select.qregs().groups() {
        let target = lcu.qregs().group(role).ok_or_else(|| QlcuError::MissingGroup {
            group: role.to_string(),
            register: reg.name.clone(),
        })?;
        box_groups.push(reg.clone());
        circ_groups.push(target.clone());
    }
    let select_map = QRegMap::build(box_groups, circ_groups)?;

    circuit
        .add_registerbox(data.prepare.as_ref(), Some(&prepare_map), None)?
        .add_registerbox(&select, Some(&select_map), None)?
        .add_registerbox(&data.prepare.adjoint()?, Some(&prepare_map), None)?;
    Ok(circuit)
}

impl RegisterBox<LcuQRegs> {
    /// LCU payload, also behind a power
    pub fn lcu_data(&self) -> QlcuResult<&LcuData> {
        match self.kind() {
            BoxKind::Lcu(data) => Ok(data),
            BoxKind::Powered { base, .. } => base.lcu_data(),
            _ => Err(QlcuError::Unsupported("box does not carry LCU data".into())),
        }
    }

    /// λ = Σ|c_i|
    pub fn l1_norm(&self) -> QlcuResult<f64> {
        self.lcu_data()?.prepare.l1_norm()
    }

    /// Encoded operator
    pub fn operator(&self) -> QlcuResult<&PauliOperator> {
        Ok(self.lcu_data()?.select.select_data()?.operator())
    }

    /// Every coefficient is real
    pub fn is_hermitian(&self) -> QlcuResult<bool> {
        Ok(self.lcu_data()?.select.select_data()?.multiplexed().is_hermitian())
    }

    /// Index register width
    pub fn n_prepare_qubits(&self) -> usize {
        self.qregs().prepare.size
    }

    /// State register width
    pub fn n_state_qubits(&self) -> usize {
        self.qregs().state.size
    }

    /// `H / λ` (or its adjoint) of the underlying LCU.
    ///
    /// A powered box reports its base block; the block of `U^n` is not
    /// `(H / λ)^n` in general.
    pub fn block_encoded_matrix(&self) -> QlcuResult<Array2<Complex64>> {
        let select = self.lcu_data()?.select.select_data()?;
        let m = block_encoded_matrix(select.operator(), self.n_state_qubits())?;
        if select.is_adjoint() {
            Ok(linalg::dagger(&m))
        } else {
            Ok(m)
        }
    }

    /// Post-selected unitary, the block this box does encode
    pub fn block_encoding(&self) -> QlcuResult<Array2<Complex64>> {
        self.get_unitary(Some(self.postselect()), None)
    }
}

// ============================================================================
// Tests
// ============================================================================
