//! objective — contracts shared by every minimizer.
//!
//! Purpose
//! -------
//! Define what a minimizer consumes ([`Objective`]) and what it exposes
//! ([`Minimizer`]), together with the numeric aliases, validation helpers and
//! finite-difference tools that every algorithm relies on.
//!
//! Key behaviors
//! -------------
//! - [`Objective::evaluate_cost`] maps `θ` to a [`CostGradient`]; any
//!   `Fn(&Theta) -> OptResult<CostGradient>` closure is an objective.
//! - [`Minimizer::minimize`] drives `θ0` towards a minimum for at most
//!   `max_iterations` iterations and returns the final `θ`.
//! - [`IterationListener`] receives one callback per completed iteration and
//!   can stop the run early.
//!
//! Invariants & assumptions
//! ------------------------
//! - A gradient has the same length as the `θ` it was evaluated at.
//! - An objective error is fatal to the run that observed it; minimizers
//!   propagate it unchanged.
//!
//! Downstream usage
//! ----------------
//! - Model code implements [`Objective`] (or [`crate::optimization::batch::BatchObjective`]
//!   for data-parallel evaluation) and hands it to any minimizer.
//! - [`finite_diff::check_gradient`] is the recommended smoke test for a new
//!   analytic gradient.
//!
//! Testing notes
//! -------------
//! - Each submodule carries its own unit tests.

pub mod finite_diff;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::finite_diff::{GradientCheck, check_gradient, numerical_gradient};
pub use self::traits::{IterationListener, Minimizer, Objective, SharedListener};
pub use self::types::{Cost, CostGradient, DEFAULT_HISTORY_SIZE, Features, Grad, Outcomes, Theta};

pub mod prelude {
    pub use super::traits::{IterationListener, Minimizer, Objective};
    pub use super::types::{CostGradient, Grad, Theta};
}
