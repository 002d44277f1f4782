//! Backend trait for dense circuit evaluation
//!
//! Gantree: L2_Backend → BackendTrait
//!
//! Everything above this layer treats unitary and statevector extraction
//! as an opaque capability behind [`CircuitBackend`].

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use qlcu_core::{Circuit, QlcuError, QlcuResult};

/// Dense evaluation capability
/// Gantree: CircuitBackend // 백엔드 trait
pub trait CircuitBackend: Send + Sync {
    /// Get backend name
    fn name(&self) -> &str;

    /// Largest circuit accepted
    fn max_qubits(&self) -> usize;

    /// Dense unitary of `circuit` in its sorted qubit order, first qubit
    /// most significant
    /// Gantree: unitary(circuit) -> Result<Array2>
    fn unitary(&self, circuit: &Circuit) -> QlcuResult<Array2<Complex64>>;

    /// Statevector of `circuit` applied to |0...0>
    /// Gantree: statevector(circuit) -> Result<Array1>
    fn statevector(&self, circuit: &Circuit) -> QlcuResult<Array1<Complex64>>;

    /// Unitaries of several circuits
    fn unitary_batch(&self, circuits: &[Circuit]) -> QlcuResult<Vec<Array2<Complex64>>> {
        circuits.iter().map(|c| self.unitary(c)).collect()
    }

    /// Reject circuits above [`max_qubits`](Self::max_qubits)
    fn check_size(&self, circuit: &Circuit) -> QlcuResult<()> {
        let n = circuit.n_qubits();
        if n > self.max_qubits() {
            return Err(QlcuError::TooManyQubits {
                qubits: n,
                max: self.max_qubits(),
            });
        }
        Ok(())
    }
}
