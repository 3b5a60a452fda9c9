//! Newton-Raphson style scaled-gradient steps.
//!
//! Update: `θ ← θ − ∇c(θ) / c(θ)`. The gradient is scaled by the reciprocal
//! of the cost rather than by an inverse Hessian; this is the root-finding
//! Newton step applied to `c` itself. The run stops as soon as the cost fails
//! to decrease and returns the last θ whose cost still decreased. A cost of
//! exactly zero leaves the step undefined, so that θ is returned as is.
use std::sync::Arc;

use crate::optimization::{
    errors::OptResult,
    minimizers::common::{IterationReporter, ListenerSlot, evaluate_checked},
    objective::{
        traits::{IterationListener, Minimizer, Objective},
        types::Theta,
        validation::validate_theta0,
    },
};

#[derive(Debug, Clone, Default)]
pub struct NewtonRaphson {
    listener: ListenerSlot,
}

impl NewtonRaphson {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listener(mut self, listener: Arc<dyn IterationListener>) -> Self {
        self.listener = ListenerSlot(Some(listener));
        self
    }
}

impl Minimizer for NewtonRaphson {
    fn minimize(
        &self, objective: &dyn Objective, theta0: Theta, max_iterations: usize, verbose: bool,
    ) -> OptResult<Theta> {
        validate_theta0(&theta0)?;
        let reporter = IterationReporter::new("NewtonRaphson", verbose, &self.listener);
        let mut theta = theta0;
        let mut previous = theta.clone();
        let mut last_cost = f64::MAX;

        for iteration in 0..max_iterations {
            let evaluation = evaluate_checked(objective, &theta)?;
            if evaluation.cost >= last_cost {
                log::debug!(
                    "NewtonRaphson: cost rose from {last_cost} to {} at iteration {iteration}; stopping",
                    evaluation.cost
                );
                return Ok(previous);
            }
            if evaluation.cost == 0.0 {
                log::debug!("NewtonRaphson: zero cost at iteration {iteration}; stopping");
                return Ok(theta);
            }
            last_cost = evaluation.cost;
            previous.assign(&theta);
            theta.scaled_add(-1.0 / evaluation.cost, &evaluation.gradient);
            if !reporter.finished(iteration, evaluation.cost, &theta) {
                break;
            }
        }
        Ok(theta)
    }
}
