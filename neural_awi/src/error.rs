//! Error types for neural_awi.

use awi_core::AwiCoreError;
use thiserror::Error;

/// Errors that can occur while building or evaluating an AWI loss.
#[derive(Error, Debug)]
pub enum AwiError {
    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// Tensor shape mismatch.
    #[error("tensor shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape.
        expected: Vec<usize>,
        /// Actual shape.
        got: Vec<usize>,
    },

    /// Tensor has a shape the operation cannot interpret.
    #[error("invalid shape: {message}")]
    InvalidShape {
        /// Description of the problem.
        message: String,
    },

    /// The regularized normal matrix could not be inverted.
    #[error("singular normal matrix: pivot {index} is {pivot:e}; use epsilon > 0")]
    SingularMatrix {
        /// Elimination step at which the pivot vanished.
        index: usize,
        /// Value of the offending pivot.
        pivot: f64,
    },

    /// Error from the pure math layer.
    #[error(transparent)]
    Core(#[from] AwiCoreError),
}

/// Result type for neural_awi operations.
pub type Result<T> = std::result::Result<T, AwiError>;

impl AwiError {
    /// Shape mismatch between two tensor dimension arrays.
    pub(crate) fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        AwiError::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        AwiError::InvalidConfig {
            message: message.into(),
        }
    }
}
