//! Fixed-step gradient descent.
//!
//! `θ ← θ − α·∇c(θ)`, with two stopping heuristics over a window of the last
//! three costs:
//! - **converged**: the last two costs differ by less than `limit`;
//! - **ascending**: costs increased strictly across the whole window, which
//!   means `α` is too large to be stable.
//!
//! The θ returned is the last one evaluated before termination, not
//! necessarily the lowest-cost one seen.
use std::sync::Arc;

use crate::optimization::{
    errors::{OptError, OptResult},
    minimizers::common::{IterationReporter, ListenerSlot, evaluate_checked},
    objective::{
        traits::{IterationListener, Minimizer, Objective},
        types::Theta,
        validation::{validate_theta0, verify_non_negative, verify_positive},
    },
};

/// Number of trailing costs inspected by the stopping heuristics.
const COST_HISTORY: usize = 3;

#[derive(Debug, Clone)]
pub struct GradientDescent {
    alpha: f64,
    limit: f64,
    listener: ListenerSlot,
}

impl GradientDescent {
    /// Create a gradient descent minimizer.
    ///
    /// - `alpha`: learning rate, finite and > 0.
    /// - `limit`: convergence threshold on consecutive costs, finite and ≥ 0.
    ///
    /// # Errors
    /// [`OptError::InvalidLearningRate`] / [`OptError::InvalidLimit`].
    pub fn new(alpha: f64, limit: f64) -> OptResult<Self> {
        verify_positive(alpha, |value, reason| OptError::InvalidLearningRate { value, reason })?;
        verify_non_negative(limit, |value, reason| OptError::InvalidLimit { value, reason })?;
        Ok(Self { alpha, limit, listener: ListenerSlot::default() })
    }

    pub fn with_listener(mut self, listener: Arc<dyn IterationListener>) -> Self {
        self.listener = ListenerSlot(Some(listener));
        self
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn limit(&self) -> f64 {
        self.limit
    }
}

impl Minimizer for GradientDescent {
    fn minimize(
        &self, objective: &dyn Objective, theta0: Theta, max_iterations: usize, verbose: bool,
    ) -> OptResult<Theta> {
        validate_theta0(&theta0)?;
        let reporter = IterationReporter::new("GradientDescent", verbose, &self.listener);
        let mut last_costs = [f64::MAX; COST_HISTORY];
        let last = COST_HISTORY - 1;
        let mut theta = theta0;

        for iteration in 0..max_iterations {
            let evaluation = evaluate_checked(objective, &theta)?;
            last_costs.rotate_left(1);
            last_costs[last] = evaluation.cost;

            if (last_costs[last] - last_costs[last - 1]).abs() < self.limit {
                log::debug!("GradientDescent: converged at iteration {iteration}");
                break;
            }
            if ascending(&last_costs) {
                log::warn!(
                    "GradientDescent: cost increased for {COST_HISTORY} iterations, \
                     learning rate {} looks too large; stopping",
                    self.alpha
                );
                break;
            }

            theta.scaled_add(-self.alpha, &evaluation.gradient);
            if !reporter.finished(iteration, evaluation.cost, &theta) {
                break;
            }
        }
        Ok(theta)
    }
}

/// `true` when every cost in the window is strictly larger than its predecessor.
fn ascending(costs: &[f64]) -> bool {
    costs.windows(2).all(|w| w[0] < w[1])
}
