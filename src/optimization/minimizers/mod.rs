//! minimizers — iterative algorithms behind the [`Minimizer`] contract.
//!
//! Purpose
//! -------
//! Offer interchangeable minimizers for a caller-supplied [`Objective`]:
//!
//! | Minimizer            | Uses gradient | Configuration                          |
//! |----------------------|---------------|----------------------------------------|
//! | [`GradientDescent`]  | yes           | `alpha`, `limit`                       |
//! | [`NewtonRaphson`]    | yes           | none                                   |
//! | [`Fmincg`]           | yes           | iteration vs evaluation budget         |
//! | [`Owlqn`]            | yes           | `m`, `l1weight`, `tol`, `grad_check`   |
//! | [`ParticleSwarm`]    | no            | `num_particles`, `alpha`, `beta`, `phi`|
//!
//! Key behaviors
//! -------------
//! - Every loop is synchronous and single-threaded; parallelism, if any,
//!   lives inside the objective.
//! - Normal non-convergence is not an error: a minimizer that runs out of
//!   iterations or stalls returns its current `θ`.
//! - Contract violations (wrong gradient length, non-finite cost,
//!   non-descent search direction) and objective failures abort the run
//!   with an [`OptError`](crate::optimization::errors::OptError).
//!
//! Conventions
//! -----------
//! - `verbose = true` installs the crate logger and prints one `info` line
//!   per iteration; otherwise iterations are logged at `trace`.
//! - Every minimizer accepts an optional [`IterationListener`] via
//!   `with_listener`.
//!
//! [`Minimizer`]: crate::optimization::objective::Minimizer
//! [`Objective`]: crate::optimization::objective::Objective
//! [`IterationListener`]: crate::optimization::objective::IterationListener

pub(crate) mod common;
pub mod fmincg;
pub mod gradient_descent;
pub mod newton_raphson;
pub mod owlqn;
pub mod particle_swarm;

pub use self::fmincg::{Fmincg, FmincgBudget};
pub use self::gradient_descent::GradientDescent;
pub use self::newton_raphson::NewtonRaphson;
pub use self::owlqn::{CorrectionHistory, Owlqn, OwlqnOptions};
pub use self::particle_swarm::ParticleSwarm;
