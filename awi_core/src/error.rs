//! Error types for awi_core operations.
//!
//! Provides a simple error enum with no external dependencies for no_std compatibility.

use core::fmt;

/// Error types that can occur during awi_core operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AwiCoreError {
    /// A signal or image with zero samples along some axis.
    EmptyInput,
    /// The padding target is smaller than the input along an axis.
    PadTargetTooSmall {
        /// Axis index (0 for rows / 1D length, 1 for columns).
        axis: usize,
        /// Input extent along the axis.
        input: usize,
        /// Requested extent along the axis.
        target: usize,
    },
    /// The Gaussian spread of a penalty template is not a positive finite number.
    NonPositiveSpread {
        /// The offending spread value.
        value: f32,
    },
    /// A buffer length does not match the dimensions it is meant to describe.
    LengthMismatch {
        /// Expected number of elements.
        expected: usize,
        /// Number of elements provided.
        got: usize,
    },
}

impl fmt::Display for AwiCoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AwiCoreError::EmptyInput => write!(f, "input has no samples"),
            AwiCoreError::PadTargetTooSmall {
                axis,
                input,
                target,
            } => write!(
                f,
                "cannot pad axis {} from {} to smaller extent {}",
                axis, input, target
            ),
            AwiCoreError::NonPositiveSpread { value } => {
                write!(f, "penalty spread must be positive and finite, got {}", value)
            }
            AwiCoreError::LengthMismatch { expected, got } => {
                write!(f, "length mismatch: expected {} elements, got {}", expected, got)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AwiCoreError {}
