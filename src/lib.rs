//! rust_minimize — pluggable function-minimization engine.
//!
//! Purpose
//! -------
//! Serve as the crate root for a family of minimizers that drive a parameter
//! vector `θ` towards a minimum of a caller-supplied objective `c(θ)` with
//! gradient `∇c(θ)`. The objective may be non-convex; it may also be a
//! data-parallel mini-batch aggregate of many per-batch evaluations.
//!
//! Key behaviors
//! -------------
//! - Re-export the optimization layer (`optimization`) as the public crate
//!   surface: objective contracts, minimizers, the mini-batch aggregator and
//!   the argmin bridge.
//! - Provide an idempotent logger initializer (`logging`) used by every
//!   minimizer when `verbose == true`.
//!
//! Invariants & assumptions
//! ------------------------
//! - All heavy numerical work lives in `optimization`; this file performs no
//!   computation.
//! - Every fallible public entrypoint returns `OptResult<T>`; no library code
//!   panics on invalid input.
//!
//! Conventions
//! -----------
//! - Parameters and gradients are `ndarray::Array1<f64>` (`Theta`, `Grad`);
//!   training data is `ndarray::Array2<f64>` with one training vector per row.
//! - Minimizers are synchronous and single-threaded; only the mini-batch
//!   aggregator introduces parallelism.
//!
//! Downstream usage
//! ----------------
//! - Implement [`optimization::objective::Objective`] (or pass a closure),
//!   pick a minimizer from [`optimization::minimizers`] and call
//!   [`optimization::objective::Minimizer::minimize`].
//! - Wrap a per-batch evaluator in
//!   [`optimization::batch::MiniBatchObjective`] to evaluate a training set
//!   in parallel; the result is itself an `Objective`.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each algorithm; end-to-end scenarios live in
//!   `tests/integration_minimizers.rs`.

pub mod logging;
pub mod optimization;
