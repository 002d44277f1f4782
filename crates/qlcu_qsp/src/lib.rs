//! # QLCU QSP
//!
//! Chebyshev targets and quantum signal processing phase fitting.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qlcu_qsp // L5: QSP numerics
//!     Chebyshev // 체비셰프 보간과 평가
//!     Phases // 대칭 축소/확장, 안자츠
//!     Loss // 직접/컴파일 손실 백엔드
//!     Minimizer // 투영 BFGS
//!     QspConfig // 설정
//!     QspAngleOptimizer // 상태 기계, fit_qsp
//!     QspCircuit // Rz/Rx 단일 큐비트 회로
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qlcu_qsp::prelude::*;
//!
//! // T1(x) = x
//! let result = fit_qsp(|x| x, 1, None).unwrap();
//! assert!(result.loss < 1e-6);
//! assert_eq!(result.phases.len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Chebyshev polynomials (Gantree: L5_Qsp → Chebyshev)
pub mod chebyshev;

/// Phase sequences and the ansatz (Gantree: L5_Qsp → Phases)
pub mod phases;

/// Loss back-ends (Gantree: L5_Qsp → Loss)
pub mod loss;

/// Bounded minimisation (Gantree: L5_Qsp → Minimizer)
pub mod minimizer;

/// Configuration (Gantree: L5_Qsp → QspConfig)
pub mod config;

/// Angle optimizer (Gantree: L5_Qsp → QspAngleOptimizer)
pub mod optimizer;

/// Circuits (Gantree: L5_Qsp → QspCircuit)
pub mod circuit;

// ============================================================================
// Re-exports
// ============================================================================

pub use chebyshev::{chebyshev_extrema, chebyshev_roots, ChebyshevPolynomial};
pub use circuit::{
    circuit_deviation, qsp_circuit_unitary, qsp_response_table, single_qubit_qsp_circuit,
    QspSample,
};
pub use config::QspConfig;
pub use loss::{CompiledLoss, DirectLoss, LossBackend, LossCompiler, LossFunction};
pub use minimizer::{BoundedMinimizer, MinimizeOutcome, ProjectedBfgs};
pub use optimizer::{
    fit_qsp, fit_qsp_with, sample_points, OptimizerState, QspAngleOptimizer, QspResult,
};
pub use phases::{
    default_phases, expand_phases, is_symmetric, phase_rotation, qsp_phase_reflection,
    qsp_response, qsp_unitary, random_symmetric_phases, reduce_phases, signal_operator,
};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use qlcu_qsp::prelude::*;
    //! ```

    pub use crate::chebyshev::ChebyshevPolynomial;
    pub use crate::circuit::single_qubit_qsp_circuit;
    pub use crate::config::QspConfig;
    pub use crate::loss::{LossBackend, LossCompiler};
    pub use crate::optimizer::{fit_qsp, fit_qsp_with, OptimizerState, QspAngleOptimizer, QspResult};
    pub use crate::phases::{expand_phases, qsp_response, qsp_unitary, reduce_phases};
    pub use qlcu_core::{QlcuError, QlcuResult};
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_chebyshev_target_fit() {
        // odd degree-3 interpolant, bounded by 1/2
        let target = ChebyshevPolynomial::from_function(|x| 0.4 * (1.5 * x).sin(), 3);
        assert!(target.is_odd(1e-12));
        let mut opt = QspAngleOptimizer::new(3, QspConfig::default()).unwrap();
        let result = opt.fit(|x| target.evaluate(x)).unwrap().clone();
        assert!(result.loss < 1e-6, "loss {}", result.loss);

        // the fit interpolates the target at the sample points
        let fitted = opt.evaluate(opt.samples()).unwrap();
        for (x, y) in opt.samples().iter().zip(fitted) {
            assert_abs_diff_eq!(y, target.evaluate(*x), epsilon = 1e-3);
        }
    }

    #[test]
    fn test_fitted_phases_drive_circuit() {
        let result = fit_qsp(|x| 0.5 * x, 1, None).unwrap();
        for x in [0.1, 0.5, 0.9] {
            let u = qsp_circuit_unitary(&result.phases, x, false).unwrap();
            assert_abs_diff_eq!(u[[0, 0]].re, result.evaluate(x).unwrap(), epsilon = 1e-12);
            assert!(circuit_deviation(&result.phases, x).unwrap() < 1e-12);
        }
    }

    #[test]
    fn test_reflection_of_fitted_phases() {
        let result = fit_qsp(|x| x, 1, None).unwrap();
        let half_turns = qsp_phase_reflection(&result.phases).unwrap();
        assert_eq!(half_turns.len(), 1);
        assert!(half_turns[0].is_finite());
    }
}
