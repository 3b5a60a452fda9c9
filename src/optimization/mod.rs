//! optimization — minimizers, objective contracts, and unified error surface.
//!
//! Purpose
//! -------
//! Provide a cohesive minimization layer: callers implement an objective
//! `c(θ)` with gradient `∇c(θ)`, pick a minimizer, and obtain `θ*` without
//! caring which algorithm (or which backend) produced it.
//!
//! Key behaviors
//! -------------
//! - Define the [`objective::Objective`] and [`objective::Minimizer`]
//!   contracts plus shared numeric aliases and validation (`objective`).
//! - Implement gradient descent, Newton-Raphson, nonlinear conjugate
//!   gradient, OWL-QN and particle swarm (`minimizers`).
//! - Evaluate a training set in parallel mini-batches behind the objective
//!   contract (`batch`).
//! - Expose argmin's L-BFGS through the same contract (`argmin_bridge`).
//! - Normalize configuration issues, contract violations, batch failures and
//!   backend errors into a single enum (`errors::OptError`) with a common
//!   result alias (`OptResult<T>`).
//!
//! Invariants & assumptions
//! ------------------------
//! - Minimizers never panic on bad input; they return `OptError`.
//! - Normal non-convergence is not an error. Only contract violations
//!   (malformed gradient, non-finite cost, non-descent direction) and
//!   objective failures abort a run.
//!
//! Conventions
//! -----------
//! - All algorithms minimize. Maximization is the caller's sign flip.
//! - `verbose = true` installs the crate logger (see [`crate::logging`]) and
//!   prints per-iteration cost at `info`.
//!
//! Downstream usage
//! ----------------
//! - Front-ends typically import the curated surface via
//!   `optimization::prelude::*`.
//!
//! Testing notes
//! -------------
//! - Unit tests live in each submodule; cross-minimizer scenarios live in
//!   `tests/integration_minimizers.rs`.

pub mod argmin_bridge;
pub mod batch;
pub mod errors;
pub mod minimizers;
pub mod objective;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_minimize::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::argmin_bridge::{ArgminLbfgs, LineSearcher};
    pub use super::batch::{BatchObjective, MiniBatchObjective, MiniBatchOptions};
    pub use super::errors::{OptError, OptResult};
    pub use super::minimizers::{
        Fmincg, FmincgBudget, GradientDescent, NewtonRaphson, Owlqn, OwlqnOptions, ParticleSwarm,
    };
    pub use super::objective::prelude::*;
}
