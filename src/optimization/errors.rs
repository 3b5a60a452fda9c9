//! optimization::errors — unified error surface for every minimizer.
//!
//! All fallible entrypoints in the optimization layer return
//! [`OptResult<T>`]. Errors raised inside argmin callbacks are tunneled
//! through `argmin::core::Error` and recovered intact by the
//! `From<Error>` conversion below.
use argmin::core::{ArgminError, Error};

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Objective contract ----
    /// Gradient dimensions do not match parameter dimensions.
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Gradient elements need to be finite
    InvalidGradient {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// Cost function returned a non-finite value.
    NonFiniteCost {
        value: f64,
    },

    /// Initial parameter vector has no coordinates.
    EmptyTheta,

    /// Parameter vector contains a non-finite coordinate.
    InvalidThetaInput {
        index: usize,
        value: f64,
    },

    // ---- Configuration ----
    /// Learning rate needs to be positive and finite.
    InvalidLearningRate {
        value: f64,
        reason: &'static str,
    },
    /// Convergence limit needs to be non-negative and finite.
    InvalidLimit {
        value: f64,
        reason: &'static str,
    },
    /// History size needs to be at least 1.
    InvalidHistorySize {
        size: usize,
        reason: &'static str,
    },
    /// L1 weight needs to be non-negative and finite.
    InvalidL1Weight {
        value: f64,
        reason: &'static str,
    },
    /// Relative-improvement tolerance needs to be positive and finite.
    InvalidTolerance {
        tol: f64,
        reason: &'static str,
    },
    /// Gradient tolerance needs to be positive and finite.
    InvalidTolGrad {
        tol: f64,
        reason: &'static str,
    },
    /// Cost change tolerance needs to be positive and finite.
    InvalidTolCost {
        tol: f64,
        reason: &'static str,
    },
    /// Invalid line searcher name.
    InvalidLineSearch {
        name: String,
        reason: &'static str,
    },
    /// Swarm needs at least one particle.
    InvalidParticleCount {
        count: usize,
        reason: &'static str,
    },
    /// Swarm weights (alpha, beta, phi) need to be finite.
    InvalidSwarmCoefficient {
        name: &'static str,
        value: f64,
    },
    /// Worker pool needs at least one thread.
    InvalidThreadCount {
        count: usize,
        reason: &'static str,
    },

    // ---- Training data ----
    /// Mini-batch objective needs at least one training vector.
    EmptyTrainingSet,
    /// Features and outcomes disagree on the number of training vectors.
    TrainingSetShapeMismatch {
        features: usize,
        outcomes: usize,
    },

    // ---- Algorithm contract ----
    /// The search direction does not descend; almost always a wrong gradient.
    NonDescentDirection {
        directional_derivative: f64,
        reason: &'static str,
    },

    /// Analytic and numerical gradients disagree beyond tolerance.
    GradientCheckFailed {
        index: usize,
        analytic: f64,
        numerical: f64,
    },

    // ---- Mini-batch ----
    /// A batch evaluation task failed; the aggregate cost is unusable.
    BatchEvaluationFailed {
        batch: usize,
        text: String,
    },
    /// The worker pool could not be started.
    ThreadPoolBuild {
        text: String,
    },

    // ---- Optimizer outcome ----
    /// Estimated parameters must be finite.
    InvalidThetaHat {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// Theta hat is missing
    MissingThetaHat,

    // ---- Argmin ---
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter {
        text: String,
    },
    /// Wrapper for argmin::NotImplemented
    NotImplemented {
        text: String,
    },
    /// Wrapper for argmin::NotInitialized
    NotInitialized {
        text: String,
    },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated {
        text: String,
    },
    /// Wrapper for argmin::CheckPointNotFound
    CheckPointNotFound {
        text: String,
    },
    /// Wrapper for argmin::PotentialBug
    PotentialBug {
        text: String,
    },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError {
        text: String,
    },
    /// Wrapper for other argmin::Error types
    BackendError {
        text: String,
    },

    // ---- Fallback ----
    UnknownError,
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Objective contract ----
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }
            OptError::NonFiniteCost { value } => {
                write!(f, "Non-finite cost value: {value}")
            }
            OptError::EmptyTheta => {
                write!(f, "Parameter vector must have at least one coordinate")
            }
            OptError::InvalidThetaInput { index, value } => {
                write!(f, "Invalid theta input at index {index}: {value}, must be finite")
            }

            // ---- Configuration ----
            OptError::InvalidLearningRate { value, reason } => {
                write!(f, "Invalid learning rate {value}: {reason}")
            }
            OptError::InvalidLimit { value, reason } => {
                write!(f, "Invalid convergence limit {value}: {reason}")
            }
            OptError::InvalidHistorySize { size, reason } => {
                write!(f, "Invalid correction history size {size}: {reason}")
            }
            OptError::InvalidL1Weight { value, reason } => {
                write!(f, "Invalid L1 weight {value}: {reason}")
            }
            OptError::InvalidTolerance { tol, reason } => {
                write!(f, "Invalid relative improvement tolerance {tol}: {reason}")
            }
            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "Invalid gradient tolerance {tol}: {reason}")
            }
            OptError::InvalidTolCost { tol, reason } => {
                write!(f, "Invalid cost function change tolerance {tol}: {reason}")
            }
            OptError::InvalidLineSearch { name, reason } => {
                write!(f, "Invalid line searcher '{name}': {reason}")
            }
            OptError::InvalidParticleCount { count, reason } => {
                write!(f, "Invalid particle count {count}: {reason}")
            }
            OptError::InvalidSwarmCoefficient { name, value } => {
                write!(f, "Invalid swarm coefficient {name} = {value}, must be finite")
            }
            OptError::InvalidThreadCount { count, reason } => {
                write!(f, "Invalid thread count {count}: {reason}")
            }

            // ---- Training data ----
            OptError::EmptyTrainingSet => {
                write!(f, "Training set must contain at least one vector")
            }
            OptError::TrainingSetShapeMismatch { features, outcomes } => {
                write!(
                    f,
                    "Training set shape mismatch: {features} feature rows vs {outcomes} outcome rows"
                )
            }

            // ---- Algorithm contract ----
            OptError::NonDescentDirection { directional_derivative, reason } => {
                write!(
                    f,
                    "Non-descent search direction (directional derivative {directional_derivative}): {reason}"
                )
            }
            OptError::GradientCheckFailed { index, analytic, numerical } => {
                write!(
                    f,
                    "Gradient check failed at index {index}: analytic {analytic} vs numerical {numerical}"
                )
            }

            // ---- Mini-batch ----
            OptError::BatchEvaluationFailed { batch, text } => {
                write!(f, "Evaluation of batch {batch} failed: {text}")
            }
            OptError::ThreadPoolBuild { text } => {
                write!(f, "Failed to build worker pool: {text}")
            }

            // ---- Optimizer outcome ----
            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "Invalid estimated parameter at index {index}: {value}: {reason}")
            }
            OptError::MissingThetaHat => {
                write!(f, "Missing estimated parameters (theta hat)")
            }

            // ---- Argmin ----
            OptError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            OptError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            OptError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            OptError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            OptError::CheckPointNotFound { text } => {
                write!(f, "Checkpoint not found: {text}")
            }
            OptError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            OptError::ImpossibleError { text } => {
                write!(f, "Impossible error: {text}")
            }
            OptError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Fallback ----
            OptError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        // Objective errors raised inside argmin callbacks come back unchanged.
        let original_err = match original_err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match original_err.downcast() {
            Ok(opt_err) => match opt_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => OptError::CheckPointNotFound { text },
                ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                _ => OptError::UnknownError,
            },
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Round-tripping an `OptError` through `argmin::core::Error`.
    // - Mapping of native argmin error kinds and foreign errors.
    // - Display strings carrying the offending values.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // An objective error tunneled through argmin must come back unchanged.
    //
    // Given
    // -----
    // - `OptError::NonFiniteCost { value: NaN }` converted into `Error`.
    //
    // Expect
    // ------
    // - Converting back yields `NonFiniteCost` rather than `BackendError`.
    fn opt_error_survives_argmin_round_trip() {
        // Arrange
        let err: Error = OptError::BatchEvaluationFailed { batch: 3, text: "boom".into() }.into();

        // Act
        let back = OptError::from(err);

        // Assert
        assert_eq!(back, OptError::BatchEvaluationFailed { batch: 3, text: "boom".into() });
    }

    #[test]
    // Purpose
    // -------
    // Native argmin errors map onto their wrapper variants.
    fn argmin_error_kinds_are_mapped() {
        let err: Error = ArgminError::InvalidParameter { text: "m".into() }.into();
        assert_eq!(OptError::from(err), OptError::InvalidParameter { text: "m".into() });
    }

    #[test]
    // Purpose
    // -------
    // Foreign errors fall back to `BackendError` with their message.
    fn foreign_errors_become_backend_errors() {
        let err: Error = std::io::Error::other("disk").into();
        assert_eq!(OptError::from(err), OptError::BackendError { text: "disk".into() });
    }

    #[test]
    fn display_reports_directional_derivative() {
        let err = OptError::NonDescentDirection {
            directional_derivative: 2.5,
            reason: "check your gradient",
        };
        let text = err.to_string();
        assert!(text.contains("2.5"));
        assert!(text.contains("check your gradient"));
    }
}
