//! QSP fitting configuration
//!
//! Gantree: L5_Qsp → QspConfig
//!
//! Loss back-end, minimiser tolerances and seeding for phase fits.

use crate::loss::LossBackend;
use crate::minimizer::ProjectedBfgs;
use qlcu_core::{qsp, QlcuError, QlcuResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// QSP fitting configuration
/// Gantree: QspConfig // 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QspConfig {
    /// Loss evaluation back-end
    /// Gantree: backend: LossBackend // direct/compiled
    pub backend: LossBackend,

    /// Minimiser iteration cap
    /// Gantree: max_iterations: usize // 최대 반복 (500)
    pub max_iterations: usize,

    /// Projected-gradient tolerance
    pub gtol: f64,

    /// Relative loss-change tolerance
    pub ftol: f64,

    /// Finite-difference step for gradients
    pub fd_step: f64,

    /// Residual loss above which a fit is reported with a warning
    /// Gantree: accuracy: f64 // 허용 잔차
    pub accuracy: f64,

    /// Seed for random symmetric starting phases, `None` for `(π/4, 0, .., π/4)`
    /// Gantree: seed: Option<u64> // 시드
    pub seed: Option<u64>,
}

impl Default for QspConfig {
    fn default() -> Self {
        Self {
            backend: LossBackend::default(),
            max_iterations: qsp::DEFAULT_MAX_ITERATIONS,
            gtol: qsp::DEFAULT_GTOL,
            ftol: qsp::DEFAULT_FTOL,
            fd_step: qsp::DEFAULT_FD_STEP,
            accuracy: qsp::DEFAULT_ACCURACY,
            seed: None,
        }
    }
}

impl QspConfig {
    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Set loss back-end
    /// Gantree: with_backend(self,b) -> Self // 백엔드 설정
    pub fn with_backend(mut self, backend: LossBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Set iteration cap
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Set gradient tolerance
    pub fn with_gtol(mut self, gtol: f64) -> Self {
        self.gtol = gtol;
        self
    }

    /// Set relative loss-change tolerance
    pub fn with_ftol(mut self, ftol: f64) -> Self {
        self.ftol = ftol;
        self
    }

    /// Set finite-difference step
    pub fn with_fd_step(mut self, fd_step: f64) -> Self {
        self.fd_step = fd_step;
        self
    }

    /// Set residual threshold
    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Set random seed
    /// Gantree: with_seed(self,s) -> Self // 시드 설정
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Validate configuration
    /// Gantree: validate(&self) -> Result<(), String> // 검증
    pub fn validate(&self) -> Result<(), String> {
        if self.max_iterations == 0 {
            return Err("max_iterations must be at least 1".into());
        }
        if !(self.gtol > 0.0) {
            return Err(format!("gtol must be positive, got {}", self.gtol));
        }
        if !(self.ftol >= 0.0) {
            return Err(format!("ftol must be non-negative, got {}", self.ftol));
        }
        if !(self.fd_step > 0.0 && self.fd_step < 1e-2) {
            return Err(format!("fd_step must be in (0, 1e-2), got {}", self.fd_step));
        }
        if !(self.accuracy > 0.0) {
            return Err(format!("accuracy must be positive, got {}", self.accuracy));
        }
        Ok(())
    }

    /// Minimiser for these tolerances
    pub fn minimizer(&self) -> ProjectedBfgs {
        ProjectedBfgs::new()
            .with_max_iterations(self.max_iterations)
            .with_gtol(self.gtol)
            .with_ftol(self.ftol)
            .with_fd_step(self.fd_step)
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Serialize to JSON
    pub fn to_json(&self) -> QlcuResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON and validate
    pub fn from_json(json: &str) -> QlcuResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate().map_err(QlcuError::InvalidConfig)?;
        Ok(config)
    }
}

impl fmt::Display for QspConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "QSP Configuration:")?;
        writeln!(f, "  Backend: {}", self.backend)?;
        writeln!(f, "  Max iterations: {}", self.max_iterations)?;
        writeln!(f, "  gtol / ftol: {:.1e} / {:.1e}", self.gtol, self.ftol)?;
        writeln!(f, "  FD step: {:.1e}", self.fd_step)?;
        writeln!(f, "  Accuracy: {:.1e}", self.accuracy)?;
        match self.seed {
            Some(seed) => write!(f, "  Seed: {}", seed),
            None => write!(f, "  Seed: default phases"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QspConfig::default();
        assert_eq!(config.backend, LossBackend::Direct);
        assert_eq!(config.max_iterations, 500);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = QspConfig::default()
            .with_backend(LossBackend::Compiled)
            .with_max_iterations(50)
            .with_gtol(1e-6)
            .with_seed(9);
        assert_eq!(config.backend, LossBackend::Compiled);
        assert_eq!(config.max_iterations, 50);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.minimizer().max_iterations, 50);
        assert_eq!(config.minimizer().gtol, 1e-6);
    }

    #[test]
    fn test_validation() {
        assert!(QspConfig::default().with_max_iterations(0).validate().is_err());
        assert!(QspConfig::default().with_gtol(0.0).validate().is_err());
        assert!(QspConfig::default().with_fd_step(0.5).validate().is_err());
        assert!(QspConfig::default().with_accuracy(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = QspConfig::default()
            .with_backend(LossBackend::Compiled)
            .with_seed(42);
        let json = config.to_json().unwrap();
        assert!(json.contains("\"compiled\""));
        assert_eq!(QspConfig::from_json(&json).unwrap(), config);

        let bad = json.replace("\"max_iterations\": 500", "\"max_iterations\": 0");
        assert!(matches!(
            QspConfig::from_json(&bad),
            Err(QlcuError::InvalidConfig(_))
        ));
        assert!(matches!(
            QspConfig::from_json("{"),
            Err(QlcuError::JsonError(_))
        ));
    }

    #[test]
    fn test_display() {
        let text = QspConfig::default().with_seed(3).to_string();
        assert!(text.contains("Backend: direct"));
        assert!(text.contains("Seed: 3"));
    }
}
