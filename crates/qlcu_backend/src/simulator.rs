//! Dense simulator backend for QLCU
//!
//! Gantree: L2_Backend → DenseSimulator
//!
//! Exact statevector and unitary evaluation. Local gate matrices are
//! applied through bit masks; composite gates are expanded recursively.

use crate::execution::CircuitBackend;
use ndarray::{Array1, Array2, ArrayViewMut1, Axis};
use num_complex::Complex64;
use qlcu_core::constants::simulation;
use qlcu_core::{linalg, Circuit, Gate, Matrix2, QlcuError, QlcuResult, Qubit};
use std::collections::HashMap;

/// Dense simulator backend
/// Gantree: DenseSimulator // 밀집 시뮬레이터
#[derive(Debug, Clone)]
pub struct DenseSimulator {
    /// Backend name
    name: String,

    /// Qubit limit
    /// Gantree: max_qubits: usize // 최대 큐비트
    max_qubits: usize,
}

impl Default for DenseSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl DenseSimulator {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a simulator with the default qubit limit
    /// Gantree: new() -> Self // 생성자
    pub fn new() -> Self {
        Self {
            name: "dense_simulator".to_string(),
            max_qubits: simulation::MAX_DENSE_QUBITS,
        }
    }

    /// Set the qubit limit
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    /// Set backend name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    // ========================================================================
    // Gate Matrices
    // ========================================================================

    /// Local matrix of `gate` over its own arguments, `None` for barriers
    /// Gantree: gate_matrix(&self, gate) -> Result<Option<Array2>> // 게이트 행렬
    pub fn gate_matrix(&self, gate: &Gate) -> QlcuResult<Option<Array2<Complex64>>> {
        if let Some(m) = gate.matrix() {
            return Ok(Some(linalg::from_mat2(&m)));
        }
        let l = Complex64::new(1.0, 0.0);
        let m = match gate {
            Gate::Cx(..) => permutation_matrix(&[0, 1, 3, 2]),
            Gate::Swap(..) => permutation_matrix(&[0, 2, 1, 3]),
            Gate::Cz(..) => Array2::from_diag(&Array1::from(vec![l, l, l, -l])),
            Gate::StatePreparation {
                amplitudes,
                inverse,
                ..
            } => {
                let u = state_preparation_matrix(amplitudes)?;
                if *inverse {
                    linalg::dagger(&u)
                } else {
                    u
                }
            }
            Gate::Multiplexor {
                controls,
                targets,
                op_map,
            } => multiplexor_matrix(controls.len(), targets.len(), op_map),
            Gate::QControl { controls, body, .. } => {
                let inner = self.unitary(body)?;
                let block = inner.nrows();
                let dim = block << controls.len();
                let mut m = linalg::identity(dim);
                let offset = dim - block;
                m.slice_mut(ndarray::s![offset.., offset..]).assign(&inner);
                m
            }
            Gate::CircBox { body, .. } => self.unitary(body)?,
            Gate::Barrier(_) => return Ok(None),
            Gate::Measure(..) => {
                return Err(QlcuError::NonUnitaryOperation(gate.name().to_string()))
            }
            _ => {
                return Err(QlcuError::InternalError(format!(
                    "no matrix for gate {}",
                    gate.name()
                )))
            }
        };
        Ok(Some(m))
    }

    // ========================================================================
    // Application
    // ========================================================================

    fn apply_gates<F>(&self, circuit: &Circuit, mut apply: F) -> QlcuResult<()>
    where
        F: FnMut(&[usize], &Array2<Complex64>),
    {
        let index: HashMap<Qubit, usize> = circuit
            .qubits()
            .into_iter()
            .enumerate()
            .map(|(i, q)| (q, i))
            .collect();

        for gate in circuit.gates() {
            let Some(m) = self.gate_matrix(gate)? else {
                continue;
            };
            let positions = gate
                .qubits()
                .iter()
                .map(|q| {
                    index
                        .get(q)
                        .copied()
                        .ok_or_else(|| QlcuError::UnknownQubit(q.to_string()))
                })
                .collect::<QlcuResult<Vec<_>>>()?;
            apply(&positions, &m);
        }
        Ok(())
    }
}

impl CircuitBackend for DenseSimulator {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_qubits(&self) -> usize {
        self.max_qubits
    }

    fn unitary(&self, circuit: &Circuit) -> QlcuResult<Array2<Complex64>> {
        self.check_size(circuit)?;
        let n = circuit.n_qubits();
        log::trace!(
            "dense unitary of {} ({} qubits, {} gates)",
            circuit.name().unwrap_or("-"),
            n,
            circuit.gate_count()
        );
        let mut u = linalg::identity(1usize << n);
        self.apply_gates(circuit, |positions, m| {
            for mut column in u.axis_iter_mut(Axis(1)) {
                apply_matrix(&mut column, n, positions, m);
            }
        })?;
        Ok(u)
    }

    fn statevector(&self, circuit: &Circuit) -> QlcuResult<Array1<Complex64>> {
        self.check_size(circuit)?;
        let n = circuit.n_qubits();
        let mut state = Array1::zeros(1usize << n);
        state[0] = Complex64::new(1.0, 0.0);
        self.apply_gates(circuit, |positions, m| {
            apply_matrix(&mut state.view_mut(), n, positions, m);
        })?;
        Ok(state)
    }
}

// ============================================================================
// Matrix Kernels
// ============================================================================

/// Apply the `2^k x 2^k` matrix `m` to the qubits at `positions` of an
/// `n`-qubit vector. Position 0 is the most significant index bit and
/// `positions[0]` is the most significant row/column bit of `m`.
pub fn apply_matrix(
    state: &mut ArrayViewMut1<Complex64>,
    n: usize,
    positions: &[usize],
    m: &Array2<Complex64>,
) {
    if positions.len() == 1 {
        let p = positions[0];
        let u: Matrix2 = [[m[[0, 0]], m[[0, 1]]], [m[[1, 0]], m[[1, 1]]]];
        apply_single_qubit_gate(state, n, p, &u);
        return;
    }

    let k = positions.len();
    let masks: Vec<usize> = positions.iter().map(|&p| 1usize << (n - 1 - p)).collect();
    let full = masks.iter().fold(0, |acc, m| acc | m);
    let sub = 1usize << k;
    let mut idx = vec![0usize; sub];
    let mut amps = vec![Complex64::new(0.0, 0.0); sub];

    for base in 0..(1usize << n) {
        if base & full != 0 {
            continue;
        }
        for j in 0..sub {
            let mut i = base;
            for (b, mask) in masks.iter().enumerate() {
                if (j >> (k - 1 - b)) & 1 == 1 {
                    i |= mask;
                }
            }
            idx[j] = i;
            amps[j] = state[i];
        }
        for r in 0..sub {
            let mut acc = Complex64::new(0.0, 0.0);
            for (c, amp) in amps.iter().enumerate() {
                acc += m[[r, c]] * amp;
            }
            state[idx[r]] = acc;
        }
    }
}

fn apply_single_qubit_gate(state: &mut ArrayViewMut1<Complex64>, n: usize, p: usize, u: &Matrix2) {
    let mask = 1usize << (n - 1 - p);
    for i in 0..(1usize << n) {
        if i & mask == 0 {
            let j = i | mask;
            let (a, b) = (state[i], state[j]);
            state[i] = u[0][0] * a + u[0][1] * b;
            state[j] = u[1][0] * a + u[1][1] * b;
        }
    }
}

fn permutation_matrix(perm: &[usize]) -> Array2<Complex64> {
    let dim = perm.len();
    let mut m = Array2::zeros((dim, dim));
    for (col, &row) in perm.iter().enumerate() {
        m[[row, col]] = Complex64::new(1.0, 0.0);
    }
    m
}

/// Block-diagonal matrix of a multiplexor: block `p` is the Kronecker
/// product of the unitaries registered for control pattern `p`, identity
/// when the pattern is absent.
/// Gantree: multiplexor_matrix(nc, nt, op_map) -> Array2 // 블록 대각
pub fn multiplexor_matrix(
    n_controls: usize,
    n_targets: usize,
    op_map: &[(Vec<bool>, Vec<Matrix2>)],
) -> Array2<Complex64> {
    let block = 1usize << n_targets;
    let dim = block << n_controls;
    let mut m = linalg::identity(dim);
    for (bits, ops) in op_map {
        let p = bits.iter().fold(0usize, |acc, &b| (acc << 1) | b as usize);
        let factors: Vec<Array2<Complex64>> = ops.iter().map(linalg::from_mat2).collect();
        let offset = p * block;
        m.slice_mut(ndarray::s![offset..offset + block, offset..offset + block])
            .assign(&linalg::kron_list(&factors));
    }
    m
}

/// Unitary whose first column is `amplitudes`.
///
/// Phase-corrected Householder reflection: with `θ = arg a₀`,
/// `y = a·e^{-iθ}` and `w = e₀ - y`, the matrix `e^{iθ}(I - 2ww†/w†w)`
/// maps |0> to `a`.
/// Gantree: state_preparation_matrix(amps) -> Result<Array2> // 하우스홀더
pub fn state_preparation_matrix(amplitudes: &[Complex64]) -> QlcuResult<Array2<Complex64>> {
    let dim = amplitudes.len();
    if dim == 0 || !dim.is_power_of_two() {
        return Err(QlcuError::InvalidAmplitudes(format!(
            "length {} is not a power of two",
            dim
        )));
    }
    let theta = if amplitudes[0].norm() > 0.0 {
        amplitudes[0].arg()
    } else {
        0.0
    };
    let phase = Complex64::from_polar(1.0, theta);
    let y: Vec<Complex64> = amplitudes.iter().map(|a| a / phase).collect();

    let mut w = y.iter().map(|v| -v).collect::<Vec<_>>();
    w[0] += Complex64::new(1.0, 0.0);
    let w_norm_sqr: f64 = w.iter().map(|v| v.norm_sqr()).sum();

    let mut u = linalg::identity(dim);
    if w_norm_sqr > f64::EPSILON {
        for r in 0..dim {
            for c in 0..dim {
                u[[r, c]] -= w[r] * w[c].conj() * (2.0 / w_norm_sqr);
            }
        }
    }
    Ok(u.mapv(|z| z * phase))
}

// ============================================================================
// Tests
// ============================================================================
