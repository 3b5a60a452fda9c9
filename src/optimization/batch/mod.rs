//! batch — data-parallel mini-batch objectives.
//!
//! Purpose
//! -------
//! Turn a per-batch cost ([`BatchObjective`]) over a training set into an
//! ordinary [`Objective`](crate::optimization::objective::Objective) whose
//! cost and gradient are the unweighted means over all batches.
//!
//! Key behaviors
//! -------------
//! - [`partition`](partition::partition) splits `n` rows into inclusive
//!   [`BatchRange`]s once, at construction.
//! - Each batch is materialized with a leading bias column of ones.
//! - [`MiniBatchObjective`] evaluates batches on an owned rayon pool and
//!   joins on all of them before returning.
//!
//! Invariants & assumptions
//! ------------------------
//! - Batches never overlap and are read-only during evaluation, so tasks
//!   share no mutable state.
//! - The pool lives exactly as long as the objective that owns it.
//!
//! Conventions
//! -----------
//! - Features are `n × k` and outcomes `n × o`, one training vector per row;
//!   the evaluator sees `k + 1` feature columns.
//! - A failed or panicking batch is fatal for that evaluation and reported as
//!   [`OptError::BatchEvaluationFailed`](crate::optimization::errors::OptError).
//!
//! Testing notes
//! -------------
//! - `partition` tests check coverage and counts over a grid of `(n, b)`.
//! - `aggregator` tests check averaging, failure propagation and the
//!   full-batch path.

pub mod aggregator;
pub mod partition;

pub use self::aggregator::{BatchObjective, MiniBatchObjective, MiniBatchOptions};
pub use self::partition::{Batch, BatchRange};
