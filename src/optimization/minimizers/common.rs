//! Plumbing shared by every minimizer loop.
//!
//! - [`evaluate_checked`]: one objective evaluation with the gradient
//!   contract enforced.
//! - [`IterationReporter`]: verbose logging plus listener dispatch, one call
//!   per completed iteration.
use std::fmt;

use crate::{
    logging::init_logging,
    optimization::{
        errors::OptResult,
        objective::{
            traits::{Objective, SharedListener},
            types::{CostGradient, Theta},
            validation::{validate_cost, validate_grad_dim},
        },
    },
};

/// Evaluate `objective` at `theta` and enforce the cost-gradient contract.
///
/// # Errors
/// - Any error returned by the objective (e.g. a failed mini-batch task).
/// - [`OptError::GradientDimMismatch`](crate::optimization::errors::OptError)
///   when the gradient length differs from `theta.len()`.
/// - [`OptError::NonFiniteCost`](crate::optimization::errors::OptError) when
///   the cost is NaN or infinite.
pub(crate) fn evaluate_checked(
    objective: &dyn Objective, theta: &Theta,
) -> OptResult<CostGradient> {
    let out = objective.evaluate_cost(theta)?;
    validate_grad_dim(&out.gradient, theta.len())?;
    validate_cost(out.cost)?;
    Ok(out)
}

/// Optional listener slot carried by minimizer configurations.
#[derive(Clone, Default)]
pub(crate) struct ListenerSlot(pub(crate) Option<SharedListener>);

impl fmt::Debug for ListenerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => write!(f, "ListenerSlot(Some(..))"),
            None => write!(f, "ListenerSlot(None)"),
        }
    }
}

/// Per-run iteration reporting: verbose cost lines and listener callbacks.
pub(crate) struct IterationReporter<'a> {
    name: &'static str,
    verbose: bool,
    listener: Option<&'a SharedListener>,
}

impl<'a> IterationReporter<'a> {
    /// Build a reporter; installs the crate logger when `verbose` is set.
    pub(crate) fn new(name: &'static str, verbose: bool, listener: &'a ListenerSlot) -> Self {
        if verbose {
            init_logging();
        }
        Self { name, verbose, listener: listener.0.as_ref() }
    }

    /// Report a finished iteration. Returns `false` when the listener asks
    /// the run to stop.
    pub(crate) fn finished(&self, iteration: usize, cost: f64, theta: &Theta) -> bool {
        if self.verbose {
            log::info!("{} | Iteration {:>6} | Cost: {:.6e}", self.name, iteration, cost);
        } else {
            log::trace!("{} | Iteration {} | Cost: {}", self.name, iteration, cost);
        }
        match self.listener {
            Some(listener) => {
                let keep_going = listener.on_iteration_finished(iteration, cost, theta);
                if !keep_going {
                    log::debug!("{}: stopped by iteration listener at {}", self.name, iteration);
                }
                keep_going
            }
            None => true,
        }
    }

    pub(crate) fn verbose(&self) -> bool {
        self.verbose
    }
}
