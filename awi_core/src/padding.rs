//! Edge-padding arithmetic.
//!
//! The reconstruction is centred inside the operator's row space before the
//! solve. When the total pad along an axis is odd, the leftover sample goes to
//! the trailing side.

use crate::error::AwiCoreError;

/// Leading and trailing pad along one axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgePad {
    /// Samples inserted before the data.
    pub lead: usize,
    /// Samples inserted after the data.
    pub trail: usize,
}

impl EdgePad {
    /// Create a pad from explicit lead/trail counts.
    #[inline]
    pub const fn new(lead: usize, trail: usize) -> Self {
        Self { lead, trail }
    }

    /// Compute the pad that grows `input` samples to `target` samples.
    ///
    /// `lead = floor(total / 2)`, `trail = total - lead`.
    ///
    /// # Errors
    /// Returns [`AwiCoreError::PadTargetTooSmall`] if `target < input`.
    pub fn to_len(input: usize, target: usize) -> Result<Self, AwiCoreError> {
        Self::along_axis(0, input, target)
    }

    fn along_axis(axis: usize, input: usize, target: usize) -> Result<Self, AwiCoreError> {
        if target < input {
            return Err(AwiCoreError::PadTargetTooSmall {
                axis,
                input,
                target,
            });
        }
        let total = target - input;
        let lead = total / 2;
        Ok(Self::new(lead, total - lead))
    }

    /// Total number of inserted samples.
    #[inline]
    pub const fn total(&self) -> usize {
        self.lead + self.trail
    }

    /// True if nothing is inserted.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Independent edge pads for the row and column axes of an image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgePad2d {
    /// Pad along axis 0 (top / bottom).
    pub rows: EdgePad,
    /// Pad along axis 1 (left / right).
    pub cols: EdgePad,
}

impl EdgePad2d {
    /// Compute the pad that grows an `input` image to the `target` shape.
    ///
    /// # Errors
    /// Returns [`AwiCoreError::PadTargetTooSmall`] naming the first axis that
    /// would have to shrink.
    pub fn to_shape(input: [usize; 2], target: [usize; 2]) -> Result<Self, AwiCoreError> {
        Ok(Self {
            rows: EdgePad::along_axis(0, input[0], target[0])?,
            cols: EdgePad::along_axis(1, input[1], target[1])?,
        })
    }
}

/// Length of the full (linear) correlation of two length-`len` signals.
///
/// This is the row count of the 1D convolution operator and the length the
/// reconstruction is padded to.
#[inline]
pub const fn full_len(len: usize) -> usize {
    if len == 0 {
        0
    } else {
        2 * len - 1
    }
}
