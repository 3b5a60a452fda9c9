//! argmin_bridge — argmin's L-BFGS as one more [`Minimizer`].
//!
//! Purpose
//! -------
//! Let any [`Objective`] be minimized by argmin's L-BFGS with a
//! More–Thuente or Hager–Zhang line search, behind the same
//! `minimize(objective, θ0, max_iterations, verbose)` contract as the native
//! minimizers.
//!
//! Key behaviors
//! -------------
//! - [`adapter::ArgMinAdapter`] implements argmin's `CostFunction` and
//!   `Gradient`, validating every cost and gradient.
//! - [`builders`] constructs the solver for the chosen line search and wires
//!   the optional tolerances.
//! - [`run::run_lbfgs`] executes the solver and returns argmin's best
//!   parameter.
//!
//! Conventions
//! -----------
//! - Objective errors raised inside argmin callbacks come back to the caller
//!   as the original `OptError`; argmin's own errors are mapped through
//!   `From<argmin::core::Error>`.
//! - With the `obs_slog` feature and `verbose = true`, argmin's terminal
//!   observer prints per-iteration progress.
//!
//! [`Minimizer`]: crate::optimization::objective::Minimizer
//! [`Objective`]: crate::optimization::objective::Objective

pub mod adapter;
pub mod builders;
pub mod lbfgs;
pub mod run;

pub use self::lbfgs::{ArgminLbfgs, LineSearcher};
