//! Bridge from an [`Objective`] to argmin's `CostFunction` and `Gradient`.
use argmin::core::{CostFunction, Error, Gradient};

use crate::optimization::objective::{
    traits::Objective,
    types::{Cost, Grad, Theta},
    validation::{validate_cost, validate_grad},
};

/// Bridges any [`Objective`] into argmin.
///
/// - `CostFunction::cost` returns `c(θ)`, rejecting NaN/±∞.
/// - `Gradient::gradient` returns `∇c(θ)`, checked for length and finiteness.
///
/// Argmin asks for cost and gradient separately, so one solver step may
/// evaluate the objective twice at the same `θ`.
#[derive(Clone, Copy)]
pub struct ArgMinAdapter<'a> {
    pub objective: &'a dyn Objective,
}

impl<'a> ArgMinAdapter<'a> {
    pub fn new(objective: &'a dyn Objective) -> Self {
        Self { objective }
    }
}

impl CostFunction for ArgMinAdapter<'_> {
    type Param = Theta;
    type Output = Cost;

    /// # Errors
    /// Propagates any `OptError` from the objective via `?`; returns
    /// `NonFiniteCost` for a NaN/±∞ value.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let out = self.objective.evaluate_cost(theta)?;
        validate_cost(out.cost)?;
        Ok(out.cost)
    }
}

impl Gradient for ArgMinAdapter<'_> {
    type Param = Theta;
    type Gradient = Grad;

    /// # Errors
    /// Propagates objective errors; returns `GradientDimMismatch` or
    /// `InvalidGradient` when the gradient is malformed.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let out = self.objective.evaluate_cost(theta)?;
        validate_grad(&out.gradient, theta.len())?;
        Ok(out.gradient)
    }
}
