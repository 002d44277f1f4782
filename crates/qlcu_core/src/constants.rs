//! Constants for QLCU
//!
//! Gantree: L0_Foundation → Constants
//!
//! Numerical tolerances, default register names and QSP defaults.

// ============================================================================
// Numerical Tolerances
// Gantree: tolerance // 허용 오차
// ============================================================================

pub mod tolerance {
    //! Floating point tolerances

    /// Absolute tolerance for matrix identities
    /// Gantree: ATOL: f64 = 1e-10
    pub const ATOL: f64 = 1e-10;

    /// Phase considered real when its imaginary part is below this
    pub const PHASE_ATOL: f64 = 1e-10;

    /// Amplitude vectors must be normalised to this accuracy
    pub const NORM_ATOL: f64 = 1e-8;
}

// ============================================================================
// Register Names
// Gantree: registers // 레지스터 이름
// ============================================================================

pub mod registers {
    //! Default register names used by the LCU constructions

    /// Index (prepare) register
    pub const PREPARE: &str = "p";

    /// State register
    pub const STATE: &str = "q";

    /// Control register added by `controlled`
    pub const CONTROL: &str = "a";

    /// Control crossover for controlled Select.
    ///
    /// Up to this many controls the Select multiplexor is widened with the
    /// control bits; above it the generic controlled wrap is used.
    /// Gantree: MAX_MULTIPLEXOR_CONTROLS: usize = 4
    pub const MAX_MULTIPLEXOR_CONTROLS: usize = 4;
}

// ============================================================================
// Simulation Limits
// ============================================================================

pub mod simulation {
    //! Dense simulation limits

    /// Largest circuit the dense simulator accepts
    pub const MAX_DENSE_QUBITS: usize = 14;
}

// ============================================================================
// QSP Parameters
// Gantree: qsp // QSP 매개변수
// ============================================================================

pub mod qsp {
    //! Defaults for QSP phase fitting

    use std::f64::consts::PI;

    /// Phase bound for the minimiser, phases live in [-BOUND, BOUND]
    pub const PHASE_BOUND: f64 = PI;

    /// Default maximum number of minimiser iterations
    pub const DEFAULT_MAX_ITERATIONS: usize = 500;

    /// Default projected-gradient tolerance
    pub const DEFAULT_GTOL: f64 = 1e-8;

    /// Default relative loss-change tolerance
    pub const DEFAULT_FTOL: f64 = 1e-12;

    /// Default finite-difference step
    pub const DEFAULT_FD_STEP: f64 = 1e-7;

    /// Residual above which a finished fit is reported as unconverged
    pub const DEFAULT_ACCURACY: f64 = 1e-6;

    /// Number of independent phases for a degree `d` symmetric sequence
    /// Gantree: reduced_len(d) -> usize // ceil((d+1)/2)
    pub fn reduced_len(degree: usize) -> usize {
        (degree + 2) / 2
    }

    /// Number of Chebyshev sample points used by the loss
    pub fn n_samples(degree: usize) -> usize {
        reduced_len(degree)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduced_len() {
        assert_eq!(qsp::reduced_len(0), 1);
        assert_eq!(qsp::reduced_len(1), 1);
        assert_eq!(qsp::reduced_len(2), 2);
        assert_eq!(qsp::reduced_len(3), 2);
        assert_eq!(qsp::reduced_len(6), 4);
    }

    #[test]
    fn test_register_names_order() {
        // control sorts before prepare, prepare before state
        assert!(registers::CONTROL < registers::PREPARE);
        assert!(registers::PREPARE < registers::STATE);
    }
}
