//! Pairings between box units and circuit units
//!
//! Gantree: L3_Registers → RegisterMap
//!
//! A map is built from two equally long lists of groups. A group is a whole
//! register, a single unit or an explicit list of units. Paired groups must
//! flatten to the same number of units, and no unit may appear twice on
//! either side.

use qlcu_core::{Bit, BitRegister, QlcuError, QlcuResult, Qubit, QubitRegister};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ============================================================================
// Units and Groups
// ============================================================================

/// Addressable unit (qubit or bit)
pub trait Unit: Clone + Ord + fmt::Debug + fmt::Display {}

impl Unit for Qubit {}
impl Unit for Bit {}

/// One side of a pairing
/// Gantree: UnitGroup<U> // 레지스터 | 단위 | 단위 목록
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitGroup<U> {
    /// A whole register, units in index order
    Register {
        /// Register name
        name: String,
        /// Units of the register
        units: Vec<U>,
    },
    /// One unit
    Unit(U),
    /// An explicit unit list
    Units(Vec<U>),
}

impl<U: Unit> UnitGroup<U> {
    /// Flattened units
    pub fn units(&self) -> Vec<U> {
        match self {
            UnitGroup::Register { units, .. } | UnitGroup::Units(units) => units.clone(),
            UnitGroup::Unit(u) => vec![u.clone()],
        }
    }

    /// Number of units
    pub fn len(&self) -> usize {
        match self {
            UnitGroup::Register { units, .. } | UnitGroup::Units(units) => units.len(),
            UnitGroup::Unit(_) => 1,
        }
    }

    /// No units
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn kind(&self) -> &'static str {
        match self {
            UnitGroup::Register { .. } => "REG",
            UnitGroup::Unit(_) => "UNIT",
            UnitGroup::Units(_) => "UNITS",
        }
    }
}

impl<U: Unit> fmt::Display for UnitGroup<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitGroup::Register { name, units } => write!(f, "{}[{}]", name, units.len()),
            UnitGroup::Unit(u) => write!(f, "{}", u),
            UnitGroup::Units(units) => {
                let names: Vec<String> = units.iter().map(|u| u.to_string()).collect();
                write!(f, "[{}]", names.join(", "))
            }
        }
    }
}

impl From<&QubitRegister> for UnitGroup<Qubit> {
    fn from(reg: &QubitRegister) -> Self {
        UnitGroup::Register {
            name: reg.name.clone(),
            units: reg.to_list(),
        }
    }
}

impl From<QubitRegister> for UnitGroup<Qubit> {
    fn from(reg: QubitRegister) -> Self {
        UnitGroup::from(&reg)
    }
}

impl From<Qubit> for UnitGroup<Qubit> {
    fn from(q: Qubit) -> Self {
        UnitGroup::Unit(q)
    }
}

impl From<Vec<Qubit>> for UnitGroup<Qubit> {
    fn from(qs: Vec<Qubit>) -> Self {
        UnitGroup::Units(qs)
    }
}

impl From<&BitRegister> for UnitGroup<Bit> {
    fn from(reg: &BitRegister) -> Self {
        UnitGroup::Register {
            name: reg.name.clone(),
            units: reg.to_list(),
        }
    }
}

impl From<BitRegister> for UnitGroup<Bit> {
    fn from(reg: BitRegister) -> Self {
        UnitGroup::from(&reg)
    }
}

impl From<Bit> for UnitGroup<Bit> {
    fn from(b: Bit) -> Self {
        UnitGroup::Unit(b)
    }
}

impl From<Vec<Bit>> for UnitGroup<Bit> {
    fn from(bs: Vec<Bit>) -> Self {
        UnitGroup::Units(bs)
    }
}

// ============================================================================
// Register Map
// ============================================================================

/// Validated pairing from box units to circuit units
/// Gantree: RegisterMap<U>{{pairs,element_map}} // 박스→회로 매핑
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterMap<U> {
    pairs: Vec<(UnitGroup<U>, UnitGroup<U>)>,
    box_units: Vec<U>,
    circ_units: Vec<U>,
    element_map: BTreeMap<U, U>,
}

/// Qubit map
pub type QRegMap = RegisterMap<Qubit>;

/// Bit map
pub type CRegMap = RegisterMap<Bit>;

impl<U: Unit> RegisterMap<U> {
    /// Pair `box_groups[i]` with `circ_groups[i]`.
    /// Gantree: build(box_groups, circ_groups) -> Result<Self> // 매핑 생성
    pub fn build<B, C>(
        box_groups: impl IntoIterator<Item = B>,
        circ_groups: impl IntoIterator<Item = C>,
    ) -> QlcuResult<Self>
    where
        B: Into<UnitGroup<U>>,
        C: Into<UnitGroup<U>>,
    {
        let box_groups: Vec<UnitGroup<U>> = box_groups.into_iter().map(Into::into).collect();
        let circ_groups: Vec<UnitGroup<U>> = circ_groups.into_iter().map(Into::into).collect();
        if box_groups.len() != circ_groups.len() {
            return Err(QlcuError::MismatchedSize {
                box_size: box_groups.len(),
                circ_size: circ_groups.len(),
            });
        }
        Self::from_pairs(box_groups.into_iter().zip(circ_groups))
    }

    /// Build from explicit `(box, circ)` pairs
    pub fn from_pairs<B, C>(pairs: impl IntoIterator<Item = (B, C)>) -> QlcuResult<Self>
    where
        B: Into<UnitGroup<U>>,
        C: Into<UnitGroup<U>>,
    {
        let pairs: Vec<(UnitGroup<U>, UnitGroup<U>)> = pairs
            .into_iter()
            .map(|(b, c)| (b.into(), c.into()))
            .collect();

        for (b, c) in &pairs {
            if b.len() != c.len() {
                return Err(QlcuError::MismatchedSize {
                    box_size: b.len(),
                    circ_size: c.len(),
                });
            }
        }

        let box_units: Vec<U> = pairs.iter().flat_map(|(b, _)| b.units()).collect();
        let circ_units: Vec<U> = pairs.iter().flat_map(|(_, c)| c.units()).collect();
        check_unique(&box_units)?;
        check_unique(&circ_units)?;

        let element_map = box_units
            .iter()
            .cloned()
            .zip(circ_units.iter().cloned())
            .collect();
        Ok(Self {
            pairs,
            box_units,
            circ_units,
            element_map,
        })
    }

    /// Concatenate maps: each map contributes one group per side.
    /// Duplicates across maps are rejected.
    /// Gantree: concat(maps) -> Result<Self> // 매핑 이어붙이기
    pub fn concat(maps: &[RegisterMap<U>]) -> QlcuResult<Self> {
        Self::from_pairs(maps.iter().map(|m| {
            (
                UnitGroup::Units(m.box_units.clone()),
                UnitGroup::Units(m.circ_units.clone()),
            )
        }))
    }

    /// Box unit → circuit unit
    pub fn element_map(&self) -> &BTreeMap<U, U> {
        &self.element_map
    }

    /// Image of `unit`
    pub fn get(&self, unit: &U) -> Option<&U> {
        self.element_map.get(unit)
    }

    /// Box side, flattened in pair order
    pub fn box_units(&self) -> &[U] {
        &self.box_units
    }

    /// Circuit side, flattened in pair order
    pub fn circ_units(&self) -> &[U] {
        &self.circ_units
    }

    /// Group pairs
    pub fn pairs(&self) -> &[(UnitGroup<U>, UnitGroup<U>)] {
        &self.pairs
    }

    /// Number of mapped units
    pub fn len(&self) -> usize {
        self.box_units.len()
    }

    /// No mapped units
    pub fn is_empty(&self) -> bool {
        self.box_units.is_empty()
    }
}

fn check_unique<U: Unit>(units: &[U]) -> QlcuResult<()> {
    let mut seen = BTreeSet::new();
    for u in units {
        if !seen.insert(u) {
            return Err(QlcuError::DuplicateElement(u.to_string()));
        }
    }
    Ok(())
}

impl<U: Unit> fmt::Display for RegisterMap<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "RegisterMap (box -> circ)")?;
        for (b, c) in &self.pairs {
            writeln!(f, "  {}: {} -> {}", b.kind(), b, c)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn q(r: &str, i: usize) -> Qubit {
        Qubit::new(r, i)
    }

    #[test]
    fn test_register_pairs() {
        let map = QRegMap::build(
            [QubitRegister::new("p", 2), QubitRegister::new("q", 1)],
            [QubitRegister::new("x", 2), QubitRegister::new("y", 1)],
        )
        .unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&q("p", 1)), Some(&q("x", 1)));
        assert_eq!(map.get(&q("q", 0)), Some(&q("y", 0)));
        assert_eq!(map.circ_units()[2], q("y", 0));
    }

    #[test]
    fn test_mixed_group_kinds() {
        // a register against an explicit list of the same length
        let map = QRegMap::from_pairs([(
            UnitGroup::from(QubitRegister::new("p", 2)),
            UnitGroup::from(vec![q("c", 3), q("c", 0)]),
        )])
        .unwrap();
        assert_eq!(map.get(&q("p", 0)), Some(&q("c", 3)));
    }

    #[test]
    fn test_group_count_mismatch() {
        let err = QRegMap::build([q("p", 0), q("p", 1)], [q("x", 0)]).unwrap_err();
        assert_eq!(
            err,
            QlcuError::MismatchedSize {
                box_size: 2,
                circ_size: 1
            }
        );
    }

    #[test]
    fn test_group_cardinality_mismatch() {
        let err = QRegMap::build([QubitRegister::new("p", 2)], [QubitRegister::new("x", 3)])
            .unwrap_err();
        assert!(matches!(err, QlcuError::MismatchedSize { .. }));
    }

    #[test]
    fn test_duplicates_rejected() {
        let err = QRegMap::build([q("p", 0), q("p", 0)], [q("x", 0), q("x", 1)]).unwrap_err();
        assert_eq!(err, QlcuError::DuplicateElement("p[0]".into()));

        let err = QRegMap::build([q("p", 0), q("p", 1)], [q("x", 1), q("x", 1)]).unwrap_err();
        assert!(matches!(err, QlcuError::DuplicateElement(_)));
    }

    #[test]
    fn test_concat() {
        let a = QRegMap::build([q("p", 0)], [q("x", 0)]).unwrap();
        let b = QRegMap::build([q("q", 0)], [q("y", 0)]).unwrap();
        let both = QRegMap::concat(&[a.clone(), b]).unwrap();
        assert_eq!(both.len(), 2);
        assert_eq!(both.get(&q("q", 0)), Some(&q("y", 0)));

        assert!(matches!(
            QRegMap::concat(&[a.clone(), a]),
            Err(QlcuError::DuplicateElement(_))
        ));
    }

    #[test]
    fn test_bit_map_and_display() {
        let map = CRegMap::build([BitRegister::new("c", 2)], [BitRegister::new("m", 2)]).unwrap();
        assert_eq!(map.get(&Bit::new("c", 1)), Some(&Bit::new("m", 1)));
        let text = map.to_string();
        assert!(text.starts_with("RegisterMap (box -> circ)"));
        assert!(text.contains("REG: c[2] -> m[2]"));
    }
}
