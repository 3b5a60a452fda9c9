//! Public contracts shared by every minimizer.
//!
//! - [`Objective`]: what callers implement; maps `θ` to a cost and gradient.
//! - [`Minimizer`]: what every algorithm implements; drives `θ` downhill.
//! - [`IterationListener`]: optional per-iteration callback that can stop a run.
//!
//! Convention: objectives are *minimized*. An objective must be a pure
//! function of `θ` given its fixed external data; minimizers never mutate
//! the `θ` they pass in and copy it whenever they need to keep a prior state.
use std::sync::Arc;

use crate::optimization::{
    errors::OptResult,
    objective::types::{CostGradient, Theta},
};

/// User-implemented objective interface.
///
/// Required:
/// - `evaluate_cost(&Theta) -> OptResult<CostGradient>`: evaluate `c(θ)` and
///   `∇c(θ)`. The gradient length must equal `θ.len()`; a mismatch is a
///   contract error surfaced by the minimizers as
///   [`OptError::GradientDimMismatch`](crate::optimization::errors::OptError).
///   Returning an error aborts the enclosing minimization immediately.
///
/// Closures `Fn(&Theta) -> OptResult<CostGradient>` implement this trait.
pub trait Objective {
    fn evaluate_cost(&self, theta: &Theta) -> OptResult<CostGradient>;
}

impl<F> Objective for F
where
    F: Fn(&Theta) -> OptResult<CostGradient>,
{
    fn evaluate_cost(&self, theta: &Theta) -> OptResult<CostGradient> {
        self(theta)
    }
}

/// Algorithm interface: `minimize(objective, θ0, max_iterations, verbose) -> θ*`.
///
/// - `theta0` is consumed; the returned vector is owned by the caller.
/// - `max_iterations` bounds the outer loop (its exact meaning is documented
///   per algorithm, e.g. Fmincg may count evaluations instead).
/// - `verbose` installs the crate logger and emits one `info` line per
///   iteration with the current cost.
///
/// Normal non-convergence is never an error; only contract violations
/// (bad gradients, failed batch evaluations, invalid input) are.
pub trait Minimizer {
    fn minimize(
        &self, objective: &dyn Objective, theta0: Theta, max_iterations: usize, verbose: bool,
    ) -> OptResult<Theta>;
}

/// Per-iteration callback.
///
/// Called once per completed iteration with the 0-based iteration index,
/// the cost reached and the current parameters. Returning `false` stops the
/// run; the minimizer then returns its current `θ`.
pub trait IterationListener: Send + Sync {
    fn on_iteration_finished(&self, iteration: usize, cost: f64, theta: &Theta) -> bool;
}

impl<F> IterationListener for F
where
    F: Fn(usize, f64, &Theta) -> bool + Send + Sync,
{
    fn on_iteration_finished(&self, iteration: usize, cost: f64, theta: &Theta) -> bool {
        self(iteration, cost, theta)
    }
}

/// Shared handle to a listener, cloned into minimizer configurations.
pub type SharedListener = Arc<dyn IterationListener>;
