//! objective::finite_diff — numerical gradients and gradient checks.
//!
//! Purpose
//! -------
//! Provide finite-difference approximations of an [`Objective`]'s gradient
//! and of directional derivatives, so callers can verify analytic
//! gradients and minimizers can run diagnostic checks without depending on
//! the `finitediff` API directly.
//!
//! Key behaviors
//! -------------
//! - [`numerical_gradient`] prefers central differences and falls back to
//!   forward differences when the central estimate fails validation.
//! - [`check_gradient`] compares the analytic gradient with the numerical
//!   one coordinate by coordinate.
//! - [`directional_derivative`] differentiates a scalar function along a
//!   direction (used by the OWL-QN gradient check).
//!
//! Invariants & assumptions
//! ------------------------
//! - `finitediff` closures must return `f64`, so any error raised by the
//!   objective is captured in a `RefCell` slot and the closure returns
//!   `NaN`; the first captured error is surfaced after differencing.
//! - Gradients returned from this module satisfy [`validate_grad`].
//!
//! Testing notes
//! -------------
//! - Unit tests cover agreement with analytic gradients, detection of a
//!   wrong gradient and propagation of objective errors.
use std::cell::RefCell;

use finitediff::FiniteDiff;
use ndarray::Array1;

use crate::optimization::{
    errors::{OptError, OptResult},
    objective::{
        traits::Objective,
        types::{Grad, Theta},
        validation::validate_grad,
    },
};

/// Result of comparing an analytic gradient with its numerical estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientCheck {
    pub analytic: Grad,
    pub numerical: Grad,
    /// Largest absolute coordinate-wise deviation.
    pub max_abs_diff: f64,
    /// Coordinate where `max_abs_diff` occurs.
    pub worst_index: usize,
}

/// numerical_gradient — finite-difference gradient of an objective's cost.
///
/// Parameters
/// ----------
/// - `objective`: `&dyn Objective`
///   Only the cost of each evaluation is used.
/// - `theta`: `&Theta`
///   Point at which the gradient is approximated.
///
/// Returns
/// -------
/// `OptResult<Grad>`
///   Central-difference gradient, or the forward-difference one when the
///   central estimate is not finite.
///
/// Errors
/// ------
/// - Any error raised by `objective` during differencing.
/// - [`OptError::InvalidGradient`] if neither scheme yields finite values.
pub fn numerical_gradient(objective: &dyn Objective, theta: &Theta) -> OptResult<Grad> {
    let closure_err: RefCell<Option<OptError>> = RefCell::new(None);
    let cost_func = |x: &Theta| -> f64 {
        match objective.evaluate_cost(x) {
            Ok(out) => out.cost,
            Err(e) => {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                f64::NAN
            }
        }
    };
    let fd_grad = theta.central_diff(&cost_func);
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    match validate_grad(&fd_grad, theta.len()) {
        Ok(()) => Ok(fd_grad),
        Err(_) => run_fd_diff(theta, &cost_func, &closure_err),
    }
}

/// check_gradient — compare the analytic gradient against finite differences.
///
/// Returns
/// -------
/// `OptResult<GradientCheck>` when every coordinate agrees within `tol`
/// (absolute deviation).
///
/// Errors
/// ------
/// - [`OptError::GradientDimMismatch`] if the analytic gradient has the
///   wrong length.
/// - [`OptError::GradientCheckFailed`] for the worst coordinate when the
///   largest deviation exceeds `tol`.
/// - Any error raised by `objective`.
pub fn check_gradient(
    objective: &dyn Objective, theta: &Theta, tol: f64,
) -> OptResult<GradientCheck> {
    let analytic = objective.evaluate_cost(theta)?.gradient;
    validate_grad(&analytic, theta.len())?;
    let numerical = numerical_gradient(objective, theta)?;
    let (worst_index, max_abs_diff) = analytic
        .iter()
        .zip(numerical.iter())
        .map(|(a, n)| (a - n).abs())
        .enumerate()
        .fold((0, 0.0_f64), |best, (i, d)| if d > best.1 { (i, d) } else { best });
    if max_abs_diff > tol {
        return Err(OptError::GradientCheckFailed {
            index: worst_index,
            analytic: analytic[worst_index],
            numerical: numerical[worst_index],
        });
    }
    Ok(GradientCheck { analytic, numerical, max_abs_diff, worst_index })
}

/// directional_derivative — numerical slope of `func` at `x` along `dir`.
///
/// Differentiates `t ↦ func(x + t·dir)` at `t = 0` with a forward
/// difference. Errors raised by `func` are captured and returned.
pub fn directional_derivative<G>(func: G, x: &Theta, dir: &Grad) -> OptResult<f64>
where
    G: Fn(&Theta) -> OptResult<f64>,
{
    let closure_err: RefCell<Option<OptError>> = RefCell::new(None);
    let along = |t: &Array1<f64>| -> f64 {
        let mut point = x.clone();
        point.scaled_add(t[0], dir);
        match func(&point) {
            Ok(v) => v,
            Err(e) => {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                f64::NAN
            }
        }
    };
    let slope = Array1::from(vec![0.0]).forward_diff(&along);
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    Ok(slope[0])
}

/// Forward-difference fallback with error capture and validation.
fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<OptError>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::objective::types::CostGradient;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn quadratic(theta: &Theta) -> OptResult<CostGradient> {
        let shifted = theta - &array![1.0, -2.0];
        Ok(CostGradient::new(shifted.dot(&shifted), &shifted * 2.0))
    }

    #[test]
    // Purpose
    // -------
    // Central differences reproduce the analytic gradient of a quadratic.
    //
    // Given
    // -----
    // - `c(θ) = ‖θ − (1, −2)‖²` at `θ = (0.5, 0.5)`.
    //
    // Expect
    // ------
    // - Numerical gradient ≈ `(−1, 5)`.
    fn numerical_gradient_matches_quadratic() {
        // Arrange
        let theta = array![0.5, 0.5];

        // Act
        let grad = numerical_gradient(&quadratic, &theta).expect("FD gradient should succeed");

        // Assert
        assert_abs_diff_eq!(grad[0], -1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(grad[1], 5.0, epsilon = 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // A sign-flipped analytic gradient fails the check at the worst index.
    fn check_gradient_flags_inverted_gradient() {
        // Arrange
        let inverted = |theta: &Theta| -> OptResult<CostGradient> {
            let out = quadratic(theta)?;
            Ok(CostGradient::new(out.cost, -out.gradient))
        };

        // Act
        let res = check_gradient(&inverted, &array![0.5, 0.5], 1e-4);

        // Assert
        assert!(matches!(res, Err(OptError::GradientCheckFailed { index: 1, .. })));
    }

    #[test]
    fn check_gradient_accepts_correct_gradient() {
        let out = check_gradient(&quadratic, &array![3.0, 0.0], 1e-4).expect("check should pass");
        assert!(out.max_abs_diff < 1e-4);
    }

    #[test]
    // Purpose
    // -------
    // Errors raised inside the differencing closure are surfaced.
    fn numerical_gradient_propagates_objective_errors() {
        let failing = |_: &Theta| -> OptResult<CostGradient> {
            Err(OptError::BatchEvaluationFailed { batch: 0, text: "down".into() })
        };
        let res = numerical_gradient(&failing, &array![1.0]);
        assert!(matches!(res, Err(OptError::BatchEvaluationFailed { batch: 0, .. })));
    }

    #[test]
    fn directional_derivative_matches_gradient_projection() {
        // ∇c(0.5, 0.5) = (−1, 5); along (1, 1) the slope is 4.
        let dir = array![1.0, 1.0];
        let slope = directional_derivative(|x| quadratic(x).map(|o| o.cost), &array![0.5, 0.5], &dir)
            .expect("slope should be computed");
        assert_abs_diff_eq!(slope, 4.0, epsilon = 1e-5);
    }
}
