//! Executor wiring for the argmin-backed L-BFGS minimizer.
use argmin::core::{Executor, IterState, Solver, State};
#[cfg(feature = "obs_slog")]
use argmin::core::{CostFunction, Gradient};
#[cfg(feature = "obs_slog")]
use argmin_math::ArgminL2Norm;

use crate::optimization::{
    argmin_bridge::adapter::ArgMinAdapter,
    errors::OptResult,
    objective::{
        types::{Grad, Theta},
        validation::validate_theta_hat,
    },
};

/// Argmin state type produced by the L-BFGS solvers.
pub type LbfgsState = IterState<Theta, Grad, (), (), (), f64>;

/// run_lbfgs — execute a configured L-BFGS solver from `theta0`.
///
/// Runs at most `max_iterations` solver iterations and returns the best
/// parameter argmin recorded. With `verbose` and the `obs_slog` feature, the
/// initial state is logged and argmin's terminal observer is attached.
///
/// # Errors
/// - Objective errors raised inside argmin callbacks, unchanged.
/// - Backend errors mapped through `From<argmin::core::Error>`.
/// - [`OptError::MissingThetaHat`](crate::optimization::errors::OptError) /
///   `InvalidThetaHat` when argmin returns no usable parameter.
pub fn run_lbfgs<'a, S>(
    theta0: Theta, max_iterations: usize, verbose: bool, problem: ArgMinAdapter<'a>, solver: S,
) -> OptResult<Theta>
where
    S: Solver<ArgMinAdapter<'a>, LbfgsState>,
{
    #[cfg(feature = "obs_slog")]
    if verbose {
        log_initial_state(&theta0, &problem)?;
    }
    let executor = Executor::new(problem, solver)
        .configure(|state| state.param(theta0).max_iters(max_iterations as u64));
    #[cfg(feature = "obs_slog")]
    let executor = if verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        executor.add_observer(observer, argmin::core::observers::ObserverMode::Always)
    } else {
        executor
    };

    let mut state = executor.run()?.state().clone();
    let summary = format!(
        "ArgminLbfgs | {} iterations | best cost {:.6e} | {:?}",
        state.get_iter(),
        state.get_best_cost(),
        state.get_termination_status()
    );
    if verbose {
        log::info!("{summary}");
    } else {
        log::debug!("{summary}");
    }
    validate_theta_hat(state.take_best_param())
}

// ---- Helper Methods ----

#[cfg(feature = "obs_slog")]
fn log_initial_state(theta0: &Theta, problem: &ArgMinAdapter<'_>) -> OptResult<()> {
    let c0 = problem.cost(theta0)?;
    let g0n = problem.gradient(theta0).ok().map(|g| g.l2_norm());
    log::info!(
        "init: c(theta0) = {:.6}{}",
        c0,
        g0n.map(|n| format!(", ||grad|| = {:.6}", n)).unwrap_or_default()
    );
    Ok(())
}
