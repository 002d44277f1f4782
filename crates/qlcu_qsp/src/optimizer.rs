//! QSP angle optimizer
//!
//! Gantree: L5_Qsp → QspAngleOptimizer
//!
//! Fits symmetric QSP phases so that `Re <0|U_φ(x)|0>` matches a target
//! polynomial at the `ceil((d+1)/2)` sample points
//! `xi = cos((2i - 1)π / (4 d̃))`. A poor local minimum is a result, not
//! an error: the residual is reported and the caller may reseed.

use crate::config::QspConfig;
use crate::loss::LossBackend;
use crate::minimizer::BoundedMinimizer;
use crate::phases::{
    default_phases, expand_phases, qsp_response, random_symmetric_phases, reduce_phases,
};
use log::{debug, info, warn};
use qlcu_core::{qsp, QlcuError, QlcuResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Lifecycle of a fit
/// Gantree: OptimizerState // 최적화 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizerState {
    /// No starting phases yet
    Uninitialized,

    /// Starting phases chosen
    Seeded,

    /// Minimising the loss
    Fitting,

    /// Fit finished, result available
    Converged,
}

impl fmt::Display for OptimizerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OptimizerState::Uninitialized => "uninitialized",
            OptimizerState::Seeded => "seeded",
            OptimizerState::Fitting => "fitting",
            OptimizerState::Converged => "converged",
        };
        write!(f, "{}", s)
    }
}

/// Outcome of a phase fit
/// Gantree: QspResult // 적합 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QspResult {
    /// Polynomial degree
    pub degree: usize,

    /// Standard phases, `degree + 1` of them
    pub phases: Vec<f64>,

    /// Independent hat phases
    pub reduced_phases: Vec<f64>,

    /// Residual loss at the sample points
    pub loss: f64,

    /// Minimiser iterations
    pub iterations: usize,

    /// Loss evaluations
    pub evaluations: usize,

    /// Minimiser met a tolerance
    pub converged: bool,

    /// Minimiser stop reason
    pub message: String,

    /// Loss back-end used
    pub backend: LossBackend,
}

impl QspResult {
    /// Residual is at most `accuracy`
    pub fn within(&self, accuracy: f64) -> bool {
        self.loss <= accuracy
    }

    /// Realised polynomial at `x`
    pub fn evaluate(&self, x: f64) -> QlcuResult<f64> {
        qsp_response(&self.phases, x)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> QlcuResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for QspResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "QSP fit (degree {}, {} back-end)", self.degree, self.backend)?;
        writeln!(f, "  Loss: {:.3e}", self.loss)?;
        writeln!(
            f,
            "  Iterations: {} ({} evaluations)",
            self.iterations, self.evaluations
        )?;
        writeln!(f, "  Stop: {}", self.message)?;
        write!(f, "  Phases: {:?}", self.phases)
    }
}

/// Sample points `cos((2i - 1)π / (4 d̃))`, `i = 1..=d̃`
/// Gantree: sample_points(d) -> Vec<f64> // 표본점
pub fn sample_points(degree: usize) -> Vec<f64> {
    let n = qsp::n_samples(degree);
    (1..=n)
        .map(|i| ((2 * i - 1) as f64 * PI / (4 * n) as f64).cos())
        .collect()
}

/// QSP angle optimizer
/// Gantree: QspAngleOptimizer // 각도 최적화기
#[derive(Debug, Clone)]
pub struct QspAngleOptimizer {
    degree: usize,
    config: QspConfig,
    state: OptimizerState,
    samples: Vec<f64>,
    seed_phases: Option<Vec<f64>>,
    result: Option<QspResult>,
}

impl QspAngleOptimizer {
    // ========================================================================
    // Constructor
    // ========================================================================

    /// Optimizer for degree-`degree` phases
    /// Gantree: new(d, config) -> Result<Self> // 생성자
    pub fn new(degree: usize, config: QspConfig) -> QlcuResult<Self> {
        config.validate().map_err(QlcuError::InvalidConfig)?;
        Ok(Self {
            degree,
            samples: sample_points(degree),
            config,
            state: OptimizerState::Uninitialized,
            seed_phases: None,
            result: None,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Polynomial degree
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Configuration
    pub fn config(&self) -> &QspConfig {
        &self.config
    }

    /// Current state
    pub fn state(&self) -> OptimizerState {
        self.state
    }

    /// Points where the loss compares against the target
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Starting phases, once seeded
    pub fn seed_phases(&self) -> Option<&[f64]> {
        self.seed_phases.as_deref()
    }

    /// Last fit
    pub fn result(&self) -> Option<&QspResult> {
        self.result.as_ref()
    }

    /// Fitted standard phases
    pub fn phases(&self) -> Option<&[f64]> {
        self.result.as_ref().map(|r| r.phases.as_slice())
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Choose starting phases; valid from any state and discards a
    /// previous result.
    ///
    /// `None` uses random symmetric phases when the configuration carries a
    /// seed, `(π/4, 0, .., 0, π/4)` otherwise. Explicit phases must have
    /// `degree + 1` entries; only their first half is used.
    /// Gantree: seed(&mut, φ0) -> Result<&mut Self> // 초기화
    pub fn seed(&mut self, phases: Option<&[f64]>) -> QlcuResult<&mut Self> {
        let phases = match phases {
            Some(p) if p.len() != self.degree + 1 => {
                return Err(QlcuError::InvalidPhases {
                    expected: self.degree + 1,
                    actual: p.len(),
                })
            }
            Some(p) => p.to_vec(),
            None => match self.config.seed {
                Some(seed) => random_symmetric_phases(self.degree, seed),
                None => default_phases(self.degree),
            },
        };
        if phases.iter().any(|p| !p.is_finite()) {
            return Err(QlcuError::InvalidConfig("seed phases must be finite".into()));
        }
        debug!("seeded degree-{} fit with {:?}", self.degree, phases);
        self.seed_phases = Some(phases);
        self.result = None;
        self.state = OptimizerState::Seeded;
        Ok(self)
    }

    /// Fit the seeded phases to `target`. Seeds with the defaults first when
    /// uninitialized; a finished optimizer must be reseeded.
    /// Gantree: fit(&mut, f) -> Result<&QspResult> // 적합
    pub fn fit<F: Fn(f64) -> f64>(&mut self, target: F) -> QlcuResult<&QspResult> {
        match self.state {
            OptimizerState::Uninitialized => {
                self.seed(None)?;
            }
            OptimizerState::Seeded => {}
            OptimizerState::Fitting | OptimizerState::Converged => {
                return Err(QlcuError::InvalidState(format!(
                    "cannot fit from state '{}', reseed first",
                    self.state
                )))
            }
        }
        let seed = self
            .seed_phases
            .as_deref()
            .ok_or_else(|| QlcuError::InternalError("seeded without phases".into()))?;
        let hat0 = reduce_phases(seed);

        let targets: Vec<f64> = self.samples.iter().map(|&x| target(x)).collect();
        let loss = self.config.backend.compiler().construct_loss_function(
            &self.samples,
            &targets,
            self.degree,
        )?;

        self.state = OptimizerState::Fitting;
        let minimizer = self.config.minimizer();
        let bounds = vec![(-qsp::PHASE_BOUND, qsp::PHASE_BOUND); hat0.len()];
        debug!(
            "fitting {} hat phases with {} over {} samples",
            hat0.len(),
            minimizer.name(),
            self.samples.len()
        );
        let outcome = match minimizer.minimize(&*loss, &hat0, &bounds) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.state = OptimizerState::Seeded;
                return Err(e);
            }
        };

        let phases = expand_phases(&outcome.x, self.degree)?;
        info!(
            "QSP degree {} optimisation error: {:.3e} ({} iterations)",
            self.degree, outcome.fun, outcome.iterations
        );
        if outcome.fun > self.config.accuracy {
            warn!(
                "QSP degree {} residual {:.3e} exceeds {:.1e}: {}",
                self.degree, outcome.fun, self.config.accuracy, outcome.message
            );
        }

        self.state = OptimizerState::Converged;
        let result = self.result.insert(QspResult {
            degree: self.degree,
            phases,
            reduced_phases: outcome.x,
            loss: outcome.fun,
            iterations: outcome.iterations,
            evaluations: outcome.evaluations,
            converged: outcome.converged,
            message: outcome.message,
            backend: self.config.backend,
        });
        Ok(&*result)
    }

    /// Realised polynomial at each of `xs`
    pub fn evaluate(&self, xs: &[f64]) -> QlcuResult<Vec<f64>> {
        let phases = self
            .phases()
            .ok_or_else(|| QlcuError::InvalidState("optimizer has not been fitted".into()))?;
        xs.iter().map(|&x| qsp_response(phases, x)).collect()
    }
}

/// Fit degree-`degree` phases to `target` with the default configuration.
/// `seed_phases`, when given, must have `degree + 1` entries.
/// Gantree: fit_qsp(f, d, φ0) -> Result<QspResult> // 위상 적합
pub fn fit_qsp<F: Fn(f64) -> f64>(
    target: F,
    degree: usize,
    seed_phases: Option<&[f64]>,
) -> QlcuResult<QspResult> {
    fit_qsp_with(target, degree, seed_phases, &QspConfig::default())
}

/// [`fit_qsp`] with an explicit configuration
pub fn fit_qsp_with<F: Fn(f64) -> f64>(
    target: F,
    degree: usize,
    seed_phases: Option<&[f64]>,
    config: &QspConfig,
) -> QlcuResult<QspResult> {
    let mut optimizer = QspAngleOptimizer::new(degree, config.clone())?;
    optimizer.seed(seed_phases)?;
    Ok(optimizer.fit(target)?.clone())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phases::is_symmetric;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_sample_points() {
        let xs = sample_points(1);
        assert_eq!(xs.len(), 1);
        assert_abs_diff_eq!(xs[0], (PI / 4.0).cos(), epsilon = 1e-15);

        let xs = sample_points(4);
        assert_eq!(xs.len(), 3);
        assert_abs_diff_eq!(xs[1], (3.0 * PI / 12.0).cos(), epsilon = 1e-15);
        assert!(xs.iter().all(|x| *x > 0.0 && *x < 1.0));
    }

    #[test]
    fn test_fit_t1() {
        let result = fit_qsp(|x| x, 1, None).unwrap();
        assert!(result.loss < 1e-6, "loss {}", result.loss);
        assert_eq!(result.phases.len(), 2);
        for x in sample_points(1) {
            assert_abs_diff_eq!(result.evaluate(x).unwrap(), x, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_state_machine() {
        let mut opt = QspAngleOptimizer::new(3, QspConfig::default()).unwrap();
        assert_eq!(opt.state(), OptimizerState::Uninitialized);
        assert!(opt.evaluate(&[0.1]).is_err());

        opt.seed(None).unwrap();
        assert_eq!(opt.state(), OptimizerState::Seeded);
        assert_eq!(opt.seed_phases().unwrap(), default_phases(3).as_slice());

        opt.fit(|x| 0.5 * x).unwrap();
        assert_eq!(opt.state(), OptimizerState::Converged);
        assert!(opt.fit(|x| x).is_err());

        // reseeding reopens the optimizer
        opt.seed(Some(&[0.0; 4])).unwrap();
        assert!(opt.result().is_none());
        let r = opt.fit(|x| 4.0 * x.powi(3) - 3.0 * x).unwrap();
        // zero phases already realise T3
        assert!(r.loss < 1e-20);
        assert_eq!(r.iterations, 0);
    }

    #[test]
    fn test_seed_length_checked() {
        let mut opt = QspAngleOptimizer::new(2, QspConfig::default()).unwrap();
        assert_eq!(
            opt.seed(Some(&[0.1, 0.2])).unwrap_err(),
            QlcuError::InvalidPhases {
                expected: 3,
                actual: 2
            }
        );
        assert_eq!(opt.state(), OptimizerState::Uninitialized);
    }

    #[test]
    fn test_fit_odd_and_even_targets() {
        // half of T3 and half of T2
        let cases: [(usize, fn(f64) -> f64); 2] = [
            (3, |x| 0.5 * (4.0 * x.powi(3) - 3.0 * x)),
            (2, |x| 0.5 * (2.0 * x * x - 1.0)),
        ];
        for (degree, f) in cases {
            let result = fit_qsp(f, degree, None).unwrap();
            assert!(result.loss < 1e-6, "degree {}: loss {}", degree, result.loss);
            assert!(is_symmetric(&result.phases, 0.0));
            assert!(result.reduced_phases.iter().all(|p| p.abs() <= PI));
        }
    }

    #[test]
    fn test_backends_fit_alike() {
        let target = |x: f64| 0.4 * x;
        let direct = fit_qsp_with(target, 1, None, &QspConfig::default()).unwrap();
        let compiled = fit_qsp_with(
            target,
            1,
            None,
            &QspConfig::default().with_backend(LossBackend::Compiled),
        )
        .unwrap();
        assert_eq!(compiled.backend, LossBackend::Compiled);
        assert!(direct.loss < 1e-6 && compiled.loss < 1e-6);
        for x in [0.2, 0.7] {
            assert_abs_diff_eq!(
                direct.evaluate(x).unwrap(),
                compiled.evaluate(x).unwrap(),
                epsilon = 1e-3
            );
        }
    }

    #[test]
    fn test_random_seed_is_reproducible() {
        let config = QspConfig::default().with_seed(5).with_max_iterations(3);
        let mut a = QspAngleOptimizer::new(4, config.clone()).unwrap();
        let mut b = QspAngleOptimizer::new(4, config).unwrap();
        a.seed(None).unwrap();
        b.seed(None).unwrap();
        assert_eq!(a.seed_phases(), b.seed_phases());
        assert_ne!(a.seed_phases().unwrap(), default_phases(4).as_slice());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = QspConfig::default().with_max_iterations(0);
        assert!(matches!(
            QspAngleOptimizer::new(2, config),
            Err(QlcuError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_result_json() {
        let result = fit_qsp(|x| x, 1, None).unwrap();
        let json = result.to_json().unwrap();
        let back: QspResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.phases.len(), 2);
        assert_eq!(back.backend, LossBackend::Direct);
    }
}
