//! Bounded quasi-Newton minimisation
//!
//! Gantree: L5_Qsp → Minimizer
//!
//! Projected BFGS over a box: central finite-difference gradients, an
//! inverse-Hessian update, Armijo backtracking along the projected path.

use log::{debug, warn};
use ndarray::{Array1, Array2};
use qlcu_core::{qsp, QlcuError, QlcuResult};
use serde::{Deserialize, Serialize};

/// Result of a bounded minimisation
/// Gantree: MinimizeOutcome{{x,fun,iterations,evaluations,converged}} // 최소화 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimizeOutcome {
    /// Best point found
    pub x: Vec<f64>,

    /// Objective at `x`
    pub fun: f64,

    /// Quasi-Newton iterations taken
    pub iterations: usize,

    /// Objective evaluations, gradients included
    pub evaluations: usize,

    /// A stopping tolerance was met
    pub converged: bool,

    /// Why the minimiser stopped
    pub message: String,
}

/// Minimiser of a scalar function over a box
/// Gantree: BoundedMinimizer // 경계 최소화기
pub trait BoundedMinimizer {
    /// Minimiser name
    fn name(&self) -> &str;

    /// Minimise `f` from `x0` with `bounds[i] = (lower, upper)`
    fn minimize(
        &self,
        f: &dyn Fn(&[f64]) -> f64,
        x0: &[f64],
        bounds: &[(f64, f64)],
    ) -> QlcuResult<MinimizeOutcome>;
}

/// Projected BFGS
/// Gantree: ProjectedBfgs // 투영 BFGS
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectedBfgs {
    /// Iteration cap
    pub max_iterations: usize,

    /// Stop when the projected gradient's largest entry is below this
    pub gtol: f64,

    /// Stop when the relative decrease of `f` is below this
    pub ftol: f64,

    /// Central-difference step
    pub fd_step: f64,

    /// Backtracking steps before the line search gives up
    pub max_line_search: usize,
}

impl Default for ProjectedBfgs {
    fn default() -> Self {
        Self {
            max_iterations: qsp::DEFAULT_MAX_ITERATIONS,
            gtol: qsp::DEFAULT_GTOL,
            ftol: qsp::DEFAULT_FTOL,
            fd_step: qsp::DEFAULT_FD_STEP,
            max_line_search: 40,
        }
    }
}

/// Armijo sufficient-decrease constant
const ARMIJO_C1: f64 = 1e-4;

/// Objective with an evaluation counter
struct Counted<'a> {
    f: &'a dyn Fn(&[f64]) -> f64,
    evaluations: usize,
}

impl Counted<'_> {
    fn eval(&mut self, x: &Array1<f64>) -> f64 {
        self.evaluations += 1;
        x.as_slice().map_or_else(|| (self.f)(&x.to_vec()), |s| (self.f)(s))
    }

    fn gradient(&mut self, x: &Array1<f64>, h: f64) -> Array1<f64> {
        let mut g = Array1::zeros(x.len());
        let mut shifted = x.clone();
        for i in 0..x.len() {
            shifted[i] = x[i] + h;
            let fp = self.eval(&shifted);
            shifted[i] = x[i] - h;
            let fm = self.eval(&shifted);
            shifted[i] = x[i];
            g[i] = (fp - fm) / (2.0 * h);
        }
        g
    }
}

impl ProjectedBfgs {
    /// Minimiser with the default tolerances
    pub fn new() -> Self {
        Self::default()
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

    /// Set relative decrease tolerance
    pub fn with_ftol(mut self, ftol: f64) -> Self {
        self.ftol = ftol;
        self
    }

    /// Set finite-difference step
    pub fn with_fd_step(mut self, h: f64) -> Self {
        self.fd_step = h;
        self
    }

    fn project(x: &mut Array1<f64>, bounds: &[(f64, f64)]) {
        for (xi, &(lo, hi)) in x.iter_mut().zip(bounds) {
            *xi = xi.clamp(lo, hi);
        }
    }

    /// Largest entry of `x - P(x - g)`
    fn projected_gradient_norm(x: &Array1<f64>, g: &Array1<f64>, bounds: &[(f64, f64)]) -> f64 {
        x.iter()
            .zip(g.iter())
            .zip(bounds)
            .map(|((&xi, &gi), &(lo, hi))| (xi - (xi - gi).clamp(lo, hi)).abs())
            .fold(0.0, f64::max)
    }

    /// Zero the components of `d` that push through an active bound
    fn mask_active(d: &mut Array1<f64>, x: &Array1<f64>, bounds: &[(f64, f64)]) {
        for ((di, &xi), &(lo, hi)) in d.iter_mut().zip(x.iter()).zip(bounds) {
            if (xi <= lo && *di < 0.0) || (xi >= hi && *di > 0.0) {
                *di = 0.0;
            }
        }
    }
}

impl BoundedMinimizer for ProjectedBfgs {
    fn name(&self) -> &str {
        "projected-bfgs"
    }

    fn minimize(
        &self,
        f: &dyn Fn(&[f64]) -> f64,
        x0: &[f64],
        bounds: &[(f64, f64)],
    ) -> QlcuResult<MinimizeOutcome> {
        if x0.len() != bounds.len() {
            return Err(QlcuError::InvalidConfig(format!(
                "{} starting values but {} bounds",
                x0.len(),
                bounds.len()
            )));
        }
        if let Some((lo, hi)) = bounds.iter().find(|(lo, hi)| !(lo <= hi)) {
            return Err(QlcuError::InvalidConfig(format!(
                "empty bound [{}, {}]",
                lo, hi
            )));
        }

        let n = x0.len();
        let mut obj = Counted { f, evaluations: 0 };
        let mut x = Array1::from_vec(x0.to_vec());
        Self::project(&mut x, bounds);
        let mut fx = obj.eval(&x);
        if n == 0 {
            return Ok(MinimizeOutcome {
                x: Vec::new(),
                fun: fx,
                iterations: 0,
                evaluations: obj.evaluations,
                converged: true,
                message: "no free variables".into(),
            });
        }
        let mut g = obj.gradient(&x, self.fd_step);
        let mut h_inv: Array2<f64> = Array2::eye(n);

        let mut converged = false;
        let mut message = String::from("iteration limit reached");
        let mut iterations = 0;

        while iterations < self.max_iterations {
            let pg = Self::projected_gradient_norm(&x, &g, bounds);
            if pg <= self.gtol {
                converged = true;
                message = "projected gradient below gtol".into();
                break;
            }
            iterations += 1;

            let mut d = -h_inv.dot(&g);
            Self::mask_active(&mut d, &x, bounds);
            if g.dot(&d) >= 0.0 {
                // curvature model went bad, restart from steepest descent
                h_inv = Array2::eye(n);
                d = -&g;
                Self::mask_active(&mut d, &x, bounds);
                if g.dot(&d) >= 0.0 {
                    converged = true;
                    message = "stationary on the bounds".into();
                    break;
                }
            }

            // backtracking along the projected path
            let mut alpha = 1.0;
            let mut accepted = None;
            for _ in 0..self.max_line_search {
                let mut trial = &x + &(alpha * &d);
                Self::project(&mut trial, bounds);
                let ft = obj.eval(&trial);
                let decrease = g.dot(&(&trial - &x));
                if ft <= fx + ARMIJO_C1 * decrease {
                    accepted = Some((trial, ft));
                    break;
                }
                alpha *= 0.5;
            }
            let Some((x_new, f_new)) = accepted else {
                warn!("line search stalled at f = {:.3e} after {} iterations", fx, iterations);
                message = "line search failed".into();
                break;
            };

            let g_new = obj.gradient(&x_new, self.fd_step);
            let s = &x_new - &x;
            let y = &g_new - &g;
            let sy = s.dot(&y);
            if sy > 1e-12 {
                // H ← (I - ρ s yᵀ) H (I - ρ y sᵀ) + ρ s sᵀ
                let rho = 1.0 / sy;
                let hy = h_inv.dot(&y);
                let yhy = y.dot(&hy);
                for i in 0..n {
                    for j in 0..n {
                        h_inv[[i, j]] += rho * ((1.0 + rho * yhy) * s[i] * s[j]
                            - hy[i] * s[j]
                            - s[i] * hy[j]);
                    }
                }
            }

            let reduction = fx - f_new;
            debug!(
                "iteration {}: f = {:.6e}, |pg| = {:.3e}, step = {:.3e}",
                iterations, f_new, pg, alpha
            );
            x = x_new;
            g = g_new;
            let previous = fx;
            fx = f_new;
            if reduction <= self.ftol * previous.abs().max(fx.abs()).max(1.0) {
                converged = true;
                message = "relative reduction below ftol".into();
                break;
            }
        }

        Ok(MinimizeOutcome {
            x: x.to_vec(),
            fun: fx,
            iterations,
            evaluations: obj.evaluations,
            converged,
            message,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn rosenbrock(x: &[f64]) -> f64 {
        (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2)
    }

    #[test]
    fn test_quadratic() {
        let f = |x: &[f64]| (x[0] - 0.5).powi(2) + 3.0 * (x[1] + 0.25).powi(2);
        let out = ProjectedBfgs::new()
            .minimize(&f, &[2.0, 2.0], &[(-3.0, 3.0), (-3.0, 3.0)])
            .unwrap();
        assert!(out.converged, "{}", out.message);
        assert_abs_diff_eq!(out.x[0], 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(out.x[1], -0.25, epsilon = 1e-5);
        assert!(out.fun < 1e-10);
    }

    #[test]
    fn test_rosenbrock() {
        let out = ProjectedBfgs::new()
            .with_max_iterations(2000)
            .minimize(&rosenbrock, &[-1.2, 1.0], &[(-5.0, 5.0), (-5.0, 5.0)])
            .unwrap();
        assert_abs_diff_eq!(out.x[0], 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(out.x[1], 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_active_bound() {
        // unconstrained minimum at x = 2, box ends at 1
        let f = |x: &[f64]| (x[0] - 2.0).powi(2);
        let out = ProjectedBfgs::new()
            .minimize(&f, &[0.0], &[(-1.0, 1.0)])
            .unwrap();
        assert!(out.converged);
        assert_abs_diff_eq!(out.x[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_start_is_projected() {
        let f = |x: &[f64]| x[0] * x[0];
        let out = ProjectedBfgs::new()
            .minimize(&f, &[10.0], &[(-1.0, 1.0)])
            .unwrap();
        assert_abs_diff_eq!(out.x[0], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rejects_bad_bounds() {
        let f = |x: &[f64]| x[0];
        let m = ProjectedBfgs::new();
        assert!(m.minimize(&f, &[0.0, 0.0], &[(-1.0, 1.0)]).is_err());
        assert!(m.minimize(&f, &[0.0], &[(1.0, -1.0)]).is_err());
    }
}
