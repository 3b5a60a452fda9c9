//! ArgminLbfgs — argmin's L-BFGS behind the [`Minimizer`] contract.
//!
//! Configuration:
//! - [`LineSearcher`]: More–Thuente (default) or Hager–Zhang; parses
//!   case-insensitively from strings.
//! - `history_size`: L-BFGS memory `m` (≥ 1), default [`DEFAULT_HISTORY_SIZE`].
//! - `tol_grad` / `tol_cost`: optional argmin stopping tolerances (finite,
//!   > 0). Defaults: `tol_grad = 1e-6`, `tol_cost = None`.
use std::str::FromStr;

use crate::{
    logging::init_logging,
    optimization::{
        argmin_bridge::{
            adapter::ArgMinAdapter,
            builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
            run::run_lbfgs,
        },
        errors::{OptError, OptResult},
        objective::{
            traits::{Minimizer, Objective},
            types::{DEFAULT_HISTORY_SIZE, Theta},
            validation::{validate_theta0, verify_tol_cost, verify_tol_grad},
        },
    },
};

/// Line-search algorithm used by [`ArgminLbfgs`].
///
/// Implements `FromStr` and accepts case-insensitive names
/// (`"MoreThuente"`, `"HagerZhang"`). Unknown names return
/// `OptError::InvalidLineSearch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineSearcher {
    #[default]
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArgminLbfgs {
    pub line_searcher: LineSearcher,
    pub history_size: usize,
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
}

impl Default for ArgminLbfgs {
    fn default() -> Self {
        Self {
            line_searcher: LineSearcher::default(),
            history_size: DEFAULT_HISTORY_SIZE,
            tol_grad: Some(1e-6),
            tol_cost: None,
        }
    }
}

impl ArgminLbfgs {
    /// # Errors
    /// - [`OptError::InvalidHistorySize`] when `history_size == 0`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for a
    ///   non-finite or non-positive tolerance.
    pub fn new(
        line_searcher: LineSearcher, history_size: usize, tol_grad: Option<f64>,
        tol_cost: Option<f64>,
    ) -> OptResult<Self> {
        if history_size == 0 {
            return Err(OptError::InvalidHistorySize {
                size: history_size,
                reason: "History size must be at least 1.",
            });
        }
        verify_tol_grad(tol_grad)?;
        verify_tol_cost(tol_cost)?;
        Ok(Self { line_searcher, history_size, tol_grad, tol_cost })
    }
}

impl Minimizer for ArgminLbfgs {
    fn minimize(
        &self, objective: &dyn Objective, theta0: Theta, max_iterations: usize, verbose: bool,
    ) -> OptResult<Theta> {
        validate_theta0(&theta0)?;
        if verbose {
            init_logging();
        }
        let problem = ArgMinAdapter::new(objective);
        match self.line_searcher {
            LineSearcher::MoreThuente => {
                let solver = build_optimizer_more_thuente(self)?;
                run_lbfgs(theta0, max_iterations, verbose, problem, solver)
            }
            LineSearcher::HagerZhang => {
                let solver = build_optimizer_hager_zhang(self)?;
                run_lbfgs(theta0, max_iterations, verbose, problem, solver)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::objective::types::CostGradient;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // c(θ) = (θ₀ − 1)² + 10(θ₁ + 2)²
    fn stretched_bowl(theta: &Theta) -> OptResult<CostGradient> {
        let (a, b) = (theta[0] - 1.0, theta[1] + 2.0);
        Ok(CostGradient::new(a * a + 10.0 * b * b, array![2.0 * a, 20.0 * b]))
    }

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Line-search parsing.
    // - Configuration validation.
    // - Convergence with both line searches and error propagation.
    // -------------------------------------------------------------------------

    #[test]
    fn line_searcher_parses_case_insensitively() {
        assert_eq!("MoreThuente".parse::<LineSearcher>(), Ok(LineSearcher::MoreThuente));
        assert_eq!("HAGERZHANG".parse::<LineSearcher>(), Ok(LineSearcher::HagerZhang));
        assert!(matches!(
            "backtracking".parse::<LineSearcher>(),
            Err(OptError::InvalidLineSearch { .. })
        ));
    }

    #[test]
    fn new_rejects_invalid_configuration() {
        let ls = LineSearcher::MoreThuente;
        assert!(matches!(
            ArgminLbfgs::new(ls, 0, None, None),
            Err(OptError::InvalidHistorySize { .. })
        ));
        assert!(matches!(
            ArgminLbfgs::new(ls, 5, Some(-1.0), None),
            Err(OptError::InvalidTolGrad { .. })
        ));
        assert!(matches!(
            ArgminLbfgs::new(ls, 5, None, Some(f64::NAN)),
            Err(OptError::InvalidTolCost { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Both line searches reach the minimum of an ill-scaled quadratic.
    //
    // Given
    // -----
    // - Start (5, 5), 100 iterations, default tolerances.
    //
    // Expect
    // ------
    // - θ within 1e-4 of (1, −2).
    fn converges_with_both_line_searches() {
        for line_searcher in [LineSearcher::MoreThuente, LineSearcher::HagerZhang] {
            // Arrange
            let lbfgs = ArgminLbfgs { line_searcher, ..ArgminLbfgs::default() };

            // Act
            let theta = lbfgs
                .minimize(&stretched_bowl, array![5.0, 5.0], 100, false)
                .expect("run should succeed");

            // Assert
            assert_abs_diff_eq!(theta[0], 1.0, epsilon = 1e-4);
            assert_abs_diff_eq!(theta[1], -2.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn objective_failure_surfaces_unchanged() {
        let failing = |_: &Theta| -> OptResult<CostGradient> {
            Err(OptError::BatchEvaluationFailed { batch: 0, text: "worker died".into() })
        };
        let res = ArgminLbfgs::default().minimize(&failing, array![1.0], 10, false);
        assert_eq!(
            res,
            Err(OptError::BatchEvaluationFailed { batch: 0, text: "worker died".into() })
        );
    }
}
