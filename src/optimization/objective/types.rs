//! objective::types — shared numeric aliases for every minimizer.
//!
//! Purpose
//! -------
//! Centralize the core numeric types used across the optimization layer so
//! that algorithms, the mini-batch aggregator and the argmin bridge agree on
//! a single representation of parameters, gradients and costs.
//!
//! Invariants & assumptions
//! ------------------------
//! - All vectors are `ndarray` containers over `f64`.
//! - A [`CostGradient`] produced for a parameter vector `θ` carries a
//!   gradient of length `θ.len()`; minimizers verify this on every
//!   evaluation.
//!
//! Conventions
//! -----------
//! - `Theta` and `Grad` are column vectors of length `d`, the number of free
//!   parameters.
//! - Training data is `Features` (`n × k`, one training vector per row) and
//!   `Outcomes` (`n × o`).
use ndarray::{Array1, Array2};

/// Parameter vector `θ`.
pub type Theta = Array1<f64>;

/// Gradient vector `∇c(θ)`, matching the shape of `Theta`.
pub type Grad = Array1<f64>;

/// Scalar objective value `c(θ)`.
pub type Cost = f64;

/// Training inputs, one vector per row.
pub type Features = Array2<f64>;

/// Training targets, one row per training vector.
pub type Outcomes = Array2<f64>;

/// Default correction-history size (`m`) for the quasi-Newton minimizers.
pub const DEFAULT_HISTORY_SIZE: usize = 10;

/// Cost-gradient pair produced by a single objective evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct CostGradient {
    pub cost: Cost,
    pub gradient: Grad,
}

impl CostGradient {
    pub fn new(cost: Cost, gradient: Grad) -> Self {
        Self { cost, gradient }
    }
}
