//! Exact (un)selection of dense results
//!
//! Gantree: L2_Backend → PostSelect
//!
//! Post-selection is index slicing: each selected qubit is moved to the
//! front of the qubit list and the vector (or matrix) is cut to the half
//! matching the required value. The selected qubits are consumed from a
//! worklist in map order; the remaining qubits keep their relative order.

use crate::execution::CircuitBackend;
use crate::simulator::DenseSimulator;
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use qlcu_core::{linalg, Circuit, QlcuError, QlcuResult, Qubit};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Selection Map
// ============================================================================

/// Ordered map from qubit to required classical value (0 or 1)
/// Gantree: SelectionMap{{entries}} // 선택 사전
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionMap {
    entries: Vec<(Qubit, u8)>,
}

impl SelectionMap {
    /// Empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Every qubit of `qubits` required to read 0
    pub fn zeros<'a>(qubits: impl IntoIterator<Item = &'a Qubit>) -> Self {
        qubits.into_iter().map(|q| (q.clone(), 0)).collect()
    }

    /// Set the value for `qubit`, keeping its position if already present
    pub fn insert(&mut self, qubit: Qubit, value: u8) {
        if let Some(slot) = self.entries.iter_mut().find(|(q, _)| *q == qubit) {
            slot.1 = value;
        } else {
            self.entries.push((qubit, value));
        }
    }

    /// Consuming form of [`insert`](Self::insert)
    pub fn with(mut self, qubit: Qubit, value: u8) -> Self {
        self.insert(qubit, value);
        self
    }

    /// Required value for `qubit`
    pub fn get(&self, qubit: &Qubit) -> Option<u8> {
        self.entries.iter().find(|(q, _)| q == qubit).map(|(_, v)| *v)
    }

    /// Whether `qubit` is selected
    pub fn contains(&self, qubit: &Qubit) -> bool {
        self.get(qubit).is_some()
    }

    /// Remove `qubit`, returning its value
    pub fn remove(&mut self, qubit: &Qubit) -> Option<u8> {
        let pos = self.entries.iter().position(|(q, _)| q == qubit)?;
        Some(self.entries.remove(pos).1)
    }

    /// Entries in order
    pub fn iter(&self) -> impl Iterator<Item = (&Qubit, u8)> + '_ {
        self.entries.iter().map(|(q, v)| (q, *v))
    }

    /// Selected qubits in order
    pub fn qubits(&self) -> Vec<Qubit> {
        self.entries.iter().map(|(q, _)| q.clone()).collect()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of `other` appended (or overwritten in place)
    pub fn merged(&self, other: &SelectionMap) -> SelectionMap {
        let mut out = self.clone();
        for (q, v) in other.iter() {
            out.insert(q.clone(), v);
        }
        out
    }

    /// Rewrite every qubit through `f`
    pub fn map_qubits(&self, f: impl Fn(&Qubit) -> Qubit) -> SelectionMap {
        self.entries.iter().map(|(q, v)| (f(q), *v)).collect()
    }

    /// Same qubits in the same order
    pub fn same_keys(&self, other: &SelectionMap) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|((a, _), (b, _))| a == b)
    }

    fn validate(&self, qubits: &[Qubit]) -> QlcuResult<()> {
        for (q, v) in self.iter() {
            if v > 1 {
                return Err(QlcuError::InvalidSelection(format!(
                    "value for {} must be 0 or 1, got {}",
                    q, v
                )));
            }
            if !qubits.contains(q) {
                return Err(QlcuError::InvalidSelection(format!(
                    "{} is not one of the selected circuit's qubits",
                    q
                )));
            }
        }
        Ok(())
    }
}

impl FromIterator<(Qubit, u8)> for SelectionMap {
    fn from_iter<T: IntoIterator<Item = (Qubit, u8)>>(iter: T) -> Self {
        let mut map = SelectionMap::new();
        for (q, v) in iter {
            map.insert(q, v);
        }
        map
    }
}

impl fmt::Display for SelectionMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(q, v)| format!("{}: {}", q, v)).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

// ============================================================================
// Slicing
// ============================================================================

/// Full index of reduced index `r` once bit `value` is reinserted for the
/// qubit at `pos` of an `n`-qubit list (position 0 most significant)
fn insert_bit(r: usize, n: usize, pos: usize, value: u8) -> usize {
    let low_bits = n - 1 - pos;
    let low = r & ((1usize << low_bits) - 1);
    let high = r >> low_bits;
    (high << (low_bits + 1)) | ((value as usize) << low_bits) | low
}

fn position(remaining: &[Qubit], qubit: &Qubit) -> QlcuResult<usize> {
    remaining
        .iter()
        .position(|q| q == qubit)
        .ok_or_else(|| QlcuError::InvalidSelection(format!("{} selected twice", qubit)))
}

fn check_len(n_qubits: usize, len: usize) -> QlcuResult<()> {
    if len != 1usize << n_qubits {
        return Err(QlcuError::InvalidState(format!(
            "length {} does not match {} qubits",
            len, n_qubits
        )));
    }
    Ok(())
}

/// Post-select a statevector.
///
/// Returns the unnormalised slice unless `renorm` is set, in which case a
/// zero-norm slice is an error.
/// Gantree: statevector_postselect(qubits, sv, post, renorm) -> Result<Array1> // 상태 후선택
pub fn statevector_postselect(
    qubits: &[Qubit],
    statevector: &Array1<Complex64>,
    post_select: &SelectionMap,
    renorm: bool,
) -> QlcuResult<Array1<Complex64>> {
    check_len(qubits.len(), statevector.len())?;
    post_select.validate(qubits)?;

    let mut remaining: Vec<Qubit> = qubits.to_vec();
    let mut sv = statevector.clone();
    for (qubit, value) in post_select.iter() {
        let n = remaining.len();
        let pos = position(&remaining, qubit)?;
        sv = Array1::from_shape_fn(1usize << (n - 1), |r| sv[insert_bit(r, n, pos, value)]);
        remaining.remove(pos);
    }

    if renorm {
        let norm = linalg::norm(&sv);
        if norm == 0.0 {
            return Err(QlcuError::VanishingNorm);
        }
        sv.mapv_inplace(|z| z / norm);
    }
    Ok(sv)
}

/// Post-select (and optionally pre-select) a unitary.
///
/// Rows are restricted by `post_select`. Columns are restricted by
/// `pre_select` when given, otherwise every post-selected qubit is assumed
/// to start in 0. Both maps must list the same qubits in the same order.
/// Gantree: unitary_postselect(qubits, u, post, pre) -> Result<Array2> // 유니터리 후선택
pub fn unitary_postselect(
    qubits: &[Qubit],
    unitary: &Array2<Complex64>,
    post_select: &SelectionMap,
    pre_select: Option<&SelectionMap>,
) -> QlcuResult<Array2<Complex64>> {
    let (rows, cols) = unitary.dim();
    if rows != cols {
        return Err(QlcuError::InvalidState(format!(
            "unitary is {}x{}",
            rows, cols
        )));
    }
    check_len(qubits.len(), rows)?;
    post_select.validate(qubits)?;
    if let Some(pre) = pre_select {
        if !pre.same_keys(post_select) {
            return Err(QlcuError::InvalidSelection(
                "pre and post selection must have the same keys, in the same order".into(),
            ));
        }
        pre.validate(qubits)?;
    }

    let mut remaining: Vec<Qubit> = qubits.to_vec();
    let mut u = unitary.clone();
    for (qubit, post_value) in post_select.iter() {
        let pre_value = pre_select.and_then(|p| p.get(qubit)).unwrap_or(0);
        let n = remaining.len();
        let pos = position(&remaining, qubit)?;
        let half = 1usize << (n - 1);
        u = Array2::from_shape_fn((half, half), |(r, c)| {
            u[[
                insert_bit(r, n, pos, post_value),
                insert_bit(c, n, pos, pre_value),
            ]]
        });
        remaining.remove(pos);
    }
    Ok(u)
}

// ============================================================================
// Circuit Helpers
// ============================================================================

/// Statevector of `circuit` from the dense simulator, post-selected.
/// Global phase is whatever the simulator produces.
/// Gantree: circuit_statevector_postselect(circ, post, renorm) -> Result<Array1> // 회로 상태 후선택
pub fn circuit_statevector_postselect(
    circuit: &Circuit,
    post_select: &SelectionMap,
    renorm: bool,
) -> QlcuResult<Array1<Complex64>> {
    let sv = DenseSimulator::new().statevector(circuit)?;
    statevector_postselect(&circuit.qubits(), &sv, post_select, renorm)
}

/// Unitary of `circuit` from the dense simulator, post- and pre-selected
/// Gantree: circuit_unitary_postselect(circ, post, pre) -> Result<Array2> // 회로 유니터리 후선택
pub fn circuit_unitary_postselect(
    circuit: &Circuit,
    post_select: &SelectionMap,
    pre_select: Option<&SelectionMap>,
) -> QlcuResult<Array2<Complex64>> {
    let u = DenseSimulator::new().unitary(circuit)?;
    unitary_postselect(&circuit.qubits(), &u, post_select, pre_select)
}

// ============================================================================
// Fixed-Point Readout
// ============================================================================

/// Bits read as a binary fraction `0.b0 b1 ... b(n-1)`, so `n` bits step
/// through [0, 1) in increments of `2^-n`
/// Gantree: bit_fixed_point(bits) -> Result<f64> // 고정소수점
pub fn bit_fixed_point(bits: &[u8]) -> QlcuResult<f64> {
    let mut value = 0.0;
    let mut weight = 0.5;
    for &b in bits {
        if b > 1 {
            return Err(QlcuError::InvalidSelection(format!(
                "bit must be 0 or 1, got {}",
                b
            )));
        }
        value += b as f64 * weight;
        weight *= 0.5;
    }
    Ok(value)
}

/// Distribution over bit strings mapped to fixed-point values.
///
/// Returned in ascending value order; strings of different lengths that
/// land on the same value have their probabilities summed.
/// Gantree: dist_to_fixed_point(dist) -> Result<Vec<(f64,f64)>> // 분포 변환
pub fn dist_to_fixed_point(dist: &BTreeMap<Vec<u8>, f64>) -> QlcuResult<Vec<(f64, f64)>> {
    let mut points = dist
        .iter()
        .map(|(bits, p)| Ok((bit_fixed_point(bits)?, *p)))
        .collect::<QlcuResult<Vec<(f64, f64)>>>()?;
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut merged: Vec<(f64, f64)> = Vec::with_capacity(points.len());
    for (x, p) in points {
        match merged.last_mut() {
            Some(last) if last.0 == x => last.1 += p,
            _ => merged.push((x, p)),
        }
    }
    Ok(merged)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn q(i: usize) -> Qubit {
        Qubit::new("q", i)
    }

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    #[test]
    fn test_insert_bit() {
        // 3 qubits, middle qubit set to 1
        assert_eq!(insert_bit(0b00, 3, 1, 1), 0b010);
        assert_eq!(insert_bit(0b11, 3, 1, 0), 0b101);
        assert_eq!(insert_bit(0b1, 2, 0, 1), 0b11);
    }

    #[test]
    fn test_bell_postselect_first_half() {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let bell = Array1::from(vec![c(s), c(0.0), c(0.0), c(s)]);
        let post = SelectionMap::new().with(q(0), 0);
        let out = statevector_postselect(&[q(0), q(1)], &bell, &post, false).unwrap();
        assert_eq!(out.len(), 2);
        assert_abs_diff_eq!(out[0].re, s);
        assert_abs_diff_eq!(out[1].re, 0.0);
    }

    #[test]
    fn test_postselect_second_qubit() {
        let v = Array1::from(vec![c(1.0), c(2.0), c(3.0), c(4.0)]);
        let post = SelectionMap::new().with(q(1), 1);
        let out = statevector_postselect(&[q(0), q(1)], &v, &post, false).unwrap();
        assert_abs_diff_eq!(out[0].re, 2.0);
        assert_abs_diff_eq!(out[1].re, 4.0);
    }

    #[test]
    fn test_renorm_vanishing() {
        let v = Array1::from(vec![c(0.0), c(0.0), c(1.0), c(0.0)]);
        let post = SelectionMap::new().with(q(0), 0);
        assert!(matches!(
            statevector_postselect(&[q(0), q(1)], &v, &post, true),
            Err(QlcuError::VanishingNorm)
        ));
        let post = SelectionMap::new().with(q(0), 1);
        let out = statevector_postselect(&[q(0), q(1)], &v, &post, true).unwrap();
        assert_abs_diff_eq!(out[0].re, 1.0);
    }

    #[test]
    fn test_unitary_postselect_blocks() {
        // 2 qubits, entries encode (row, col)
        let u = Array2::from_shape_fn((4, 4), |(r, c)| Complex64::new(r as f64, c as f64));
        let qs = [q(0), q(1)];
        let post = SelectionMap::new().with(q(0), 1);

        let default = unitary_postselect(&qs, &u, &post, None).unwrap();
        assert_eq!(default.dim(), (2, 2));
        assert_abs_diff_eq!(default[[0, 0]].re, 2.0);
        assert_abs_diff_eq!(default[[0, 0]].im, 0.0);

        let pre = SelectionMap::new().with(q(0), 1);
        let both = unitary_postselect(&qs, &u, &post, Some(&pre)).unwrap();
        assert_abs_diff_eq!(both[[1, 1]].re, 3.0);
        assert_abs_diff_eq!(both[[1, 1]].im, 3.0);
    }

    #[test]
    fn test_selection_order_mismatch() {
        let u = Array2::from_shape_fn((4, 4), |(r, c)| c64(r, c));
        let post = SelectionMap::new().with(q(0), 0).with(q(1), 0);
        let pre = SelectionMap::new().with(q(1), 0).with(q(0), 0);
        assert!(matches!(
            unitary_postselect(&[q(0), q(1)], &u, &post, Some(&pre)),
            Err(QlcuError::InvalidSelection(_))
        ));
        let bad = SelectionMap::new().with(q(0), 2);
        assert!(unitary_postselect(&[q(0), q(1)], &u, &bad, None).is_err());
        let foreign = SelectionMap::new().with(Qubit::new("p", 0), 0);
        assert!(unitary_postselect(&[q(0), q(1)], &u, &foreign, None).is_err());
    }

    fn c64(r: usize, c: usize) -> Complex64 {
        Complex64::new(r as f64, c as f64)
    }

    #[test]
    fn test_multiple_selection_worklist() {
        // select q0 = 1 then q2 = 0 out of 3 qubits: keeps indices 0b100, 0b110
        let v = Array1::from_shape_fn(8, |i| c(i as f64));
        let post = SelectionMap::new().with(q(0), 1).with(q(2), 0);
        let out = statevector_postselect(&[q(0), q(1), q(2)], &v, &post, false).unwrap();
        assert_abs_diff_eq!(out[0].re, 4.0);
        assert_abs_diff_eq!(out[1].re, 6.0);
    }

    #[test]
    fn test_selection_map_insert_keeps_position() {
        let mut m = SelectionMap::new().with(q(0), 0).with(q(1), 0);
        m.insert(q(0), 1);
        assert_eq!(m.qubits(), vec![q(0), q(1)]);
        assert_eq!(m.get(&q(0)), Some(1));
        assert_eq!(m.remove(&q(1)), Some(0));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_circuit_statevector_postselect() {
        let circuit = qlcu_core::CircuitBuilder::new()
            .register("q", 2)
            .h(&q(0))
            .cx(&q(0), &q(1))
            .build()
            .unwrap();
        let post = SelectionMap::new().with(q(0), 1);
        let out = circuit_statevector_postselect(&circuit, &post, true).unwrap();
        assert_eq!(out.len(), 2);
        assert_abs_diff_eq!(out[0].norm(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out[1].norm(), 1.0, epsilon = 1e-12);

        let raw = circuit_statevector_postselect(&circuit, &post, false).unwrap();
        assert_abs_diff_eq!(raw[1].norm(), std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
    }

    #[test]
    fn test_circuit_unitary_postselect() {
        // CX with control q0: q0 = 1 in and out leaves X on q1
        let circuit = qlcu_core::CircuitBuilder::new()
            .register("q", 2)
            .cx(&q(0), &q(1))
            .build()
            .unwrap();
        let sel = SelectionMap::new().with(q(0), 1);
        let x = circuit_unitary_postselect(&circuit, &sel, Some(&sel)).unwrap();
        assert_abs_diff_eq!(x[[0, 1]].re, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x[[0, 0]].norm(), 0.0, epsilon = 1e-12);

        // default pre-selection is 0, which never reaches q0 = 1
        let off = circuit_unitary_postselect(&circuit, &sel, None).unwrap();
        assert!(off.iter().all(|z| z.norm() < 1e-12));
    }

    #[test]
    fn test_bit_fixed_point() {
        assert_abs_diff_eq!(bit_fixed_point(&[]).unwrap(), 0.0);
        assert_abs_diff_eq!(bit_fixed_point(&[1]).unwrap(), 0.5);
        assert_abs_diff_eq!(bit_fixed_point(&[0, 1, 1]).unwrap(), 0.375);
        assert_abs_diff_eq!(bit_fixed_point(&[1, 1, 1, 1]).unwrap(), 0.9375);
        assert!(matches!(
            bit_fixed_point(&[0, 2]),
            Err(QlcuError::InvalidSelection(_))
        ));
    }

    #[test]
    fn test_dist_to_fixed_point() {
        let dist: BTreeMap<Vec<u8>, f64> = [
            (vec![1, 1], 0.1),
            (vec![0, 0], 0.4),
            (vec![1, 0], 0.3),
            (vec![1], 0.2),
        ]
        .into_iter()
        .collect();
        let points = dist_to_fixed_point(&dist).unwrap();
        assert_eq!(points.len(), 3);
        assert_abs_diff_eq!(points[0].0, 0.0);
        assert_abs_diff_eq!(points[0].1, 0.4);
        // "1" and "10" both read 0.5
        assert_abs_diff_eq!(points[1].0, 0.5);
        assert_abs_diff_eq!(points[1].1, 0.5);
        assert_abs_diff_eq!(points[2].0, 0.75);

        let bad: BTreeMap<Vec<u8>, f64> = [(vec![3], 1.0)].into_iter().collect();
        assert!(dist_to_fixed_point(&bad).is_err());
    }
}
