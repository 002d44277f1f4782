//! Named register groups of a box
//!
//! Gantree: L3_Registers → QRegs
//!
//! Every box carries a small record naming the role of each register it
//! owns ("prepare", "state", "control", ...). The record is a plain struct
//! per box kind; [`QRegs`] gives uniform access to the groups so that
//! generic code can ask for a role without knowing the concrete record.

use qlcu_core::QubitRegister;
use std::fmt;

/// Role name of the control group
pub const CONTROL_ROLE: &str = "control";

/// Role name of the index register
pub const PREPARE_ROLE: &str = "prepare";

/// Role name of the register the encoded operator acts on
pub const STATE_ROLE: &str = "state";

// ============================================================================
// Capability Trait
// ============================================================================

/// Role-to-register record
/// Gantree: QRegs // 레지스터 그룹 trait
pub trait QRegs: Clone + fmt::Debug + Send + Sync {
    /// `(role, register)` pairs in declaration order
    fn groups(&self) -> Vec<(&str, &QubitRegister)>;

    /// Mutable access to every register, same order as [`groups`](Self::groups)
    fn registers_mut(&mut self) -> Vec<&mut QubitRegister>;

    /// Register playing `role`, first match wins
    fn group(&self, role: &str) -> Option<&QubitRegister> {
        self.groups()
            .into_iter()
            .find(|(r, _)| *r == role)
            .map(|(_, reg)| reg)
    }

    /// The control group, when the record has one
    /// Gantree: control() -> Option<&QubitRegister> // 제어 그룹 확인
    fn control(&self) -> Option<&QubitRegister> {
        self.group(CONTROL_ROLE)
    }

    /// Registers in declaration order
    fn registers(&self) -> Vec<QubitRegister> {
        self.groups().into_iter().map(|(_, r)| r.clone()).collect()
    }

    /// Rename registers with `rename` (old name → new name)
    fn rename(&mut self, rename: &dyn Fn(&str) -> String) {
        for reg in self.registers_mut() {
            reg.name = rename(&reg.name);
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// Groups of a Prepare box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareQRegs {
    /// Index register
    pub prepare: QubitRegister,
}

impl QRegs for PrepareQRegs {
    fn groups(&self) -> Vec<(&str, &QubitRegister)> {
        vec![(PREPARE_ROLE, &self.prepare)]
    }

    fn registers_mut(&mut self) -> Vec<&mut QubitRegister> {
        vec![&mut self.prepare]
    }
}

/// Groups of a Select box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQRegs {
    /// Index register
    pub prepare: QubitRegister,
    /// System register
    pub state: QubitRegister,
}

impl QRegs for SelectQRegs {
    fn groups(&self) -> Vec<(&str, &QubitRegister)> {
        vec![(PREPARE_ROLE, &self.prepare), (STATE_ROLE, &self.state)]
    }

    fn registers_mut(&mut self) -> Vec<&mut QubitRegister> {
        vec![&mut self.prepare, &mut self.state]
    }
}

/// Groups of an LCU box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LcuQRegs {
    /// Index register, post-selected on zero
    pub prepare: QubitRegister,
    /// System register
    pub state: QubitRegister,
}

impl QRegs for LcuQRegs {
    fn groups(&self) -> Vec<(&str, &QubitRegister)> {
        vec![(PREPARE_ROLE, &self.prepare), (STATE_ROLE, &self.state)]
    }

    fn registers_mut(&mut self) -> Vec<&mut QubitRegister> {
        vec![&mut self.prepare, &mut self.state]
    }
}

/// Groups of `R` plus a control register.
///
/// The control group is listed first so that nested controls resolve to the
/// outermost one.
/// Gantree: Controlled<R>{{base,control}} // 제어 레코드
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controlled<R> {
    /// Groups of the uncontrolled box
    pub base: R,
    /// Control register
    pub control: QubitRegister,
}

impl<R: QRegs> QRegs for Controlled<R> {
    fn groups(&self) -> Vec<(&str, &QubitRegister)> {
        let mut groups = vec![(CONTROL_ROLE, &self.control)];
        groups.extend(self.base.groups());
        groups
    }

    fn registers_mut(&mut self) -> Vec<&mut QubitRegister> {
        let mut regs = vec![&mut self.control];
        regs.extend(self.base.registers_mut());
        regs
    }
}

/// Groups named after the registers of an arbitrary circuit
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CircuitQRegs {
    groups: Vec<(String, QubitRegister)>,
}

impl CircuitQRegs {
    /// One group per register, role = register name
    pub fn from_registers<'a>(registers: impl IntoIterator<Item = &'a QubitRegister>) -> Self {
        Self {
            groups: registers
                .into_iter()
                .map(|r| (r.name.clone(), r.clone()))
                .collect(),
        }
    }
}

impl QRegs for CircuitQRegs {
    fn groups(&self) -> Vec<(&str, &QubitRegister)> {
        self.groups.iter().map(|(n, r)| (n.as_str(), r)).collect()
    }

    fn registers_mut(&mut self) -> Vec<&mut QubitRegister> {
        self.groups.iter_mut().map(|(_, r)| r).collect()
    }

    // role follows the register
    fn rename(&mut self, rename: &dyn Fn(&str) -> String) {
        for (role, reg) in self.groups.iter_mut() {
            reg.name = rename(&reg.name);
            *role = reg.name.clone();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
