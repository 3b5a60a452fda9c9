//! Validation helpers for minimizer configuration and objective output.
//!
//! This module centralizes common consistency checks used across the
//! optimization layer:
//!
//! - **Configuration checks**: [`verify_positive`], [`verify_non_negative`],
//!   [`verify_tol_grad`], [`verify_tol_cost`] ensure numeric knobs are finite
//!   and in range when provided.
//! - **Objective output**: [`validate_grad`] enforces correct dimension and
//!   finite entries, [`validate_cost`] rejects NaN/±∞ costs.
//! - **Parameters**: [`validate_theta0`] checks the starting point,
//!   [`validate_theta_hat`] the final estimate.
//!
//! These helpers standardize error reporting by returning domain-specific
//! [`OptError`] variants, making higher-level code more uniform and easier
//! to debug.
use crate::optimization::{
    errors::{OptError, OptResult},
    objective::types::{Grad, Theta},
};

/// Require a finite, strictly positive value.
///
/// `make_err` builds the caller's specific error from the offending value and
/// a reason string.
///
/// # Errors
/// Whatever `make_err` returns when `value` is non-finite or ≤ 0.0.
pub fn verify_positive(
    value: f64, make_err: impl Fn(f64, &'static str) -> OptError,
) -> OptResult<()> {
    if !value.is_finite() {
        return Err(make_err(value, "Value must be finite."));
    }
    if value <= 0.0 {
        return Err(make_err(value, "Value must be positive."));
    }
    Ok(())
}

/// Require a finite, non-negative value.
///
/// # Errors
/// Whatever `make_err` returns when `value` is non-finite or < 0.0.
pub fn verify_non_negative(
    value: f64, make_err: impl Fn(f64, &'static str) -> OptError,
) -> OptResult<()> {
    if !value.is_finite() {
        return Err(make_err(value, "Value must be finite."));
    }
    if value < 0.0 {
        return Err(make_err(value, "Value must be non-negative."));
    }
    Ok(())
}

/// Validate the optional gradient‐norm tolerance.
///
/// - Accepts `None` (no stopping rule on gradient).
/// - If `Some`, the value must be **finite** and **strictly positive**.
///
/// # Errors
/// Returns [`OptError::InvalidTolGrad`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    match tol {
        Some(tol) => verify_positive(tol, |tol, reason| OptError::InvalidTolGrad { tol, reason }),
        None => Ok(()),
    }
}

/// Validate the optional cost‐change tolerance (for convergence).
///
/// # Errors
/// Returns [`OptError::InvalidTolCost`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    match tol {
        Some(tol) => verify_positive(tol, |tol, reason| OptError::InvalidTolCost { tol, reason }),
        None => Ok(()),
    }
}

/// Validate a gradient vector against dimension and finiteness.
///
/// Checks:
/// - `grad.len() == dim`
/// - every element is finite (`NaN` or `±∞` are rejected)
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] if length does not match `dim`.
/// - [`OptError::InvalidGradient`] with the index/value/reason of the first
///   offending element.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    validate_grad_dim(grad, dim)?;
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            });
        }
    }
    Ok(())
}

/// Validate only the gradient dimension.
///
/// # Errors
/// [`OptError::GradientDimMismatch`] if `grad.len() != dim`.
pub fn validate_grad_dim(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    Ok(())
}

/// Validate that a scalar cost is finite.
///
/// # Errors
/// Returns [`OptError::NonFiniteCost`] if the value is `NaN` or infinite.
pub fn validate_cost(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}

/// Validate a starting point: non-empty with finite coordinates.
///
/// # Errors
/// - [`OptError::EmptyTheta`] if `theta` has no coordinates.
/// - [`OptError::InvalidThetaInput`] for the first non-finite coordinate.
pub fn validate_theta0(theta: &Theta) -> OptResult<()> {
    if theta.is_empty() {
        return Err(OptError::EmptyTheta);
    }
    for (index, &value) in theta.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidThetaInput { index, value });
        }
    }
    Ok(())
}

/// Validate and unwrap an estimated parameter vector (`theta_hat`).
///
/// Accepts only a present vector with all **finite** entries.
///
/// # Errors
/// - [`OptError::MissingThetaHat`] if no vector was provided.
/// - [`OptError::InvalidThetaHat`] if any element is non-finite.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    match theta_hat {
        Some(t) => {
            for (index, &value) in t.iter().enumerate() {
                if !value.is_finite() {
                    return Err(OptError::InvalidThetaHat {
                        index,
                        value,
                        reason: "Parameter estimates must be finite.",
                    });
                }
            }
            Ok(t)
        }
        None => Err(OptError::MissingThetaHat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Range checks for configuration knobs.
    // - Gradient dimension/finiteness checks.
    // - Starting-point and estimate validation.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // `verify_positive` rejects zero, negatives and non-finite values and
    // forwards the offending value to the error builder.
    fn verify_positive_rejects_out_of_range_values() {
        let make = |value, reason| OptError::InvalidLearningRate { value, reason };
        assert!(verify_positive(0.5, make).is_ok());
        assert!(matches!(
            verify_positive(0.0, make),
            Err(OptError::InvalidLearningRate { value, .. }) if value == 0.0
        ));
        assert!(verify_positive(-1.0, make).is_err());
        assert!(verify_positive(f64::NAN, make).is_err());
        assert!(verify_positive(f64::INFINITY, make).is_err());
    }

    #[test]
    fn verify_non_negative_accepts_zero() {
        let make = |value, reason| OptError::InvalidL1Weight { value, reason };
        assert!(verify_non_negative(0.0, make).is_ok());
        assert!(verify_non_negative(-1e-12, make).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Optional tolerances accept `None` and reject non-positive values.
    fn optional_tolerances_are_checked_when_present() {
        assert!(verify_tol_grad(None).is_ok());
        assert!(verify_tol_cost(Some(1e-8)).is_ok());
        assert!(matches!(verify_tol_grad(Some(0.0)), Err(OptError::InvalidTolGrad { .. })));
        assert!(matches!(verify_tol_cost(Some(f64::NAN)), Err(OptError::InvalidTolCost { .. })));
    }

    #[test]
    // Purpose
    // -------
    // A gradient of the wrong length is a contract error.
    //
    // Given
    // -----
    // - A 2-element gradient checked against dimension 3.
    //
    // Expect
    // ------
    // - `GradientDimMismatch { expected: 3, found: 2 }`.
    fn validate_grad_reports_dimension_mismatch() {
        // Arrange
        let grad = array![1.0, 2.0];

        // Act
        let res = validate_grad(&grad, 3);

        // Assert
        assert_eq!(res, Err(OptError::GradientDimMismatch { expected: 3, found: 2 }));
    }

    #[test]
    fn validate_grad_reports_first_non_finite_entry() {
        let grad = array![1.0, f64::INFINITY, f64::NAN];
        assert!(matches!(validate_grad(&grad, 3), Err(OptError::InvalidGradient { index: 1, .. })));
    }

    #[test]
    fn validate_theta0_rejects_empty_and_non_finite() {
        assert_eq!(validate_theta0(&Theta::zeros(0)), Err(OptError::EmptyTheta));
        assert!(matches!(
            validate_theta0(&array![0.0, f64::NAN]),
            Err(OptError::InvalidThetaInput { index: 1, .. })
        ));
        assert!(validate_theta0(&array![0.0, -3.0]).is_ok());
    }

    #[test]
    fn validate_theta_hat_requires_present_finite_vector() {
        assert_eq!(validate_theta_hat(None), Err(OptError::MissingThetaHat));
        assert!(validate_theta_hat(Some(array![f64::NAN])).is_err());
        assert_eq!(validate_theta_hat(Some(array![1.0])), Ok(array![1.0]));
    }

    #[test]
    fn validate_cost_rejects_nan() {
        assert!(validate_cost(1.0).is_ok());
        assert_eq!(
            validate_cost(f64::NEG_INFINITY),
            Err(OptError::NonFiniteCost { value: f64::NEG_INFINITY })
        );
    }
}
