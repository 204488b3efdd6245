//! Layout of the dense convolution operators.
//!
//! Convolution by a target is expressed as a matrix so the filter can be found
//! with a linear least-squares solve:
//!
//! - 1D: a Toeplitz matrix of shape `(2h - 1, h)`. Column `i` holds the target
//!   starting at row `i`.
//! - 2D: a doubly-block-Toeplitz matrix. Each image row `i` gets its own
//!   Toeplitz block of shape `(2W - 1, W)`, placed at block position
//!   `(i + j, j)` for every block column `j`.
//!
//! This module only describes *where* values go. Tensor crates walk the
//! placement plans to scatter differentiable values; the host builders at the
//! bottom are the reference the tensor builders are checked against.

use core::ops::Range;

#[cfg(any(feature = "std", feature = "alloc"))]
use crate::alloc_prelude::*;
use crate::error::AwiCoreError;
use crate::padding::full_len;

/// Rows and columns of a dense operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorShape {
    /// Number of rows (length of the padded right-hand side).
    pub rows: usize,
    /// Number of columns (length of the solved filter).
    pub cols: usize,
}

impl OperatorShape {
    /// Create a new shape.
    #[inline]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Total number of entries.
    #[inline]
    pub const fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// True if the operator has no entries.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shape as a `[rows, cols]` array.
    #[inline]
    pub const fn dims(&self) -> [usize; 2] {
        [self.rows, self.cols]
    }
}

/// Shape of the Toeplitz operator for a signal of `len` samples.
///
/// # Errors
/// [`AwiCoreError::EmptyInput`] if `len == 0`.
pub fn toeplitz_shape(len: usize) -> Result<OperatorShape, AwiCoreError> {
    if len == 0 {
        return Err(AwiCoreError::EmptyInput);
    }
    Ok(OperatorShape::new(full_len(len), len))
}

/// Shape of the doubly-block-Toeplitz operator for a `height x width` image.
///
/// Rows: `2 * height * (2 * width - 1) - (2 * width - 1)`, columns: `height * width`.
///
/// # Errors
/// [`AwiCoreError::EmptyInput`] if either extent is zero.
pub fn doubly_block_shape(height: usize, width: usize) -> Result<OperatorShape, AwiCoreError> {
    let block = toeplitz_shape(width)?;
    if height == 0 {
        return Err(AwiCoreError::EmptyInput);
    }
    let rows = 2 * (height * block.rows) - block.rows;
    Ok(OperatorShape::new(rows, height * block.cols))
}

/// One shifted copy of the signal inside a Toeplitz operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnPlacement {
    /// Destination column.
    pub col: usize,
    /// First destination row.
    pub row: usize,
    /// Signal length.
    pub len: usize,
}

impl ColumnPlacement {
    /// Destination row range.
    #[inline]
    pub fn rows(&self) -> Range<usize> {
        self.row..self.row + self.len
    }

    /// Destination column range (a single column).
    #[inline]
    pub fn cols(&self) -> Range<usize> {
        self.col..self.col + 1
    }
}

/// Placement plan of a Toeplitz operator: column `i` gets the signal at row `i`.
pub fn toeplitz_placements(len: usize) -> impl Iterator<Item = ColumnPlacement> {
    (0..len).map(move |i| ColumnPlacement {
        col: i,
        row: i,
        len,
    })
}

/// One Toeplitz block inside a doubly-block-Toeplitz operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPlacement {
    /// Image row whose Toeplitz matrix fills this block.
    pub source_row: usize,
    /// First destination row.
    pub row: usize,
    /// First destination column.
    pub col: usize,
    /// Shape of the block.
    pub block: OperatorShape,
}

impl BlockPlacement {
    /// Destination row range.
    #[inline]
    pub fn rows(&self) -> Range<usize> {
        self.row..self.row + self.block.rows
    }

    /// Destination column range.
    #[inline]
    pub fn cols(&self) -> Range<usize> {
        self.col..self.col + self.block.cols
    }
}

/// Placement plan of a doubly-block-Toeplitz operator, grouped by source row.
///
/// Block `(i + j, j)` holds the Toeplitz matrix of image row `i`. An empty
/// image yields an empty plan.
pub fn doubly_block_placements(
    height: usize,
    width: usize,
) -> impl Iterator<Item = BlockPlacement> {
    let block = OperatorShape::new(full_len(width), width);
    let height = if width == 0 { 0 } else { height };
    (0..height).flat_map(move |i| {
        (0..height).map(move |j| BlockPlacement {
            source_row: i,
            row: (i + j) * block.rows,
            col: j * block.cols,
            block,
        })
    })
}

/// Build the Toeplitz operator of `signal` on the host, row-major.
///
/// # Errors
/// [`AwiCoreError::EmptyInput`] for an empty signal.
#[cfg(any(feature = "std", feature = "alloc"))]
pub fn toeplitz(signal: &[f32]) -> Result<Vec<f32>, AwiCoreError> {
    let shape = toeplitz_shape(signal.len())?;
    let mut out = Vec::new();
    out.resize(shape.len(), 0.0f32);
    for p in toeplitz_placements(signal.len()) {
        for (k, &value) in signal.iter().enumerate() {
            out[(p.row + k) * shape.cols + p.col] = value;
        }
    }
    Ok(out)
}

/// Build the doubly-block-Toeplitz operator of a row-major image on the host.
///
/// # Errors
/// [`AwiCoreError::EmptyInput`] for an empty image,
/// [`AwiCoreError::LengthMismatch`] if `image.len() != height * width`.
#[cfg(any(feature = "std", feature = "alloc"))]
pub fn doubly_block_toeplitz(
    image: &[f32],
    height: usize,
    width: usize,
) -> Result<Vec<f32>, AwiCoreError> {
    let shape = doubly_block_shape(height, width)?;
    if image.len() != height * width {
        return Err(AwiCoreError::LengthMismatch {
            expected: height * width,
            got: image.len(),
        });
    }

    let mut out = Vec::new();
    out.resize(shape.len(), 0.0f32);
    for p in doubly_block_placements(height, width) {
        let source = &image[p.source_row * width..(p.source_row + 1) * width];
        let block = toeplitz(source)?;
        for r in 0..p.block.rows {
            let dst = (p.row + r) * shape.cols + p.col;
            let src = r * p.block.cols;
            out[dst..dst + p.block.cols].copy_from_slice(&block[src..src + p.block.cols]);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toeplitz_shape() {
        assert_eq!(toeplitz_shape(5).unwrap(), OperatorShape::new(9, 5));
        assert_eq!(toeplitz_shape(1).unwrap(), OperatorShape::new(1, 1));
        assert_eq!(toeplitz_shape(0), Err(AwiCoreError::EmptyInput));
    }

    #[test]
    fn test_doubly_block_shape() {
        // r_block = 5, rows = 2 * 3 * 5 - 5 = 25, cols = 9
        assert_eq!(doubly_block_shape(3, 3).unwrap(), OperatorShape::new(25, 9));
        // (2H - 1)(2W - 1) rows
        assert_eq!(doubly_block_shape(2, 4).unwrap(), OperatorShape::new(21, 8));
        assert_eq!(doubly_block_shape(0, 4), Err(AwiCoreError::EmptyInput));
        assert_eq!(doubly_block_shape(4, 0), Err(AwiCoreError::EmptyInput));
    }

    #[test]
    fn test_placements_count() {
        assert_eq!(toeplitz_placements(4).count(), 4);
        assert_eq!(doubly_block_placements(3, 2).count(), 9);
        assert_eq!(doubly_block_placements(3, 0).count(), 0);
    }

    #[test]
    fn test_block_placements_stay_inside() {
        let shape = doubly_block_shape(3, 4).unwrap();
        for p in doubly_block_placements(3, 4) {
            assert!(p.rows().end <= shape.rows);
            assert!(p.cols().end <= shape.cols);
        }
    }

    #[cfg(any(feature = "std", feature = "alloc"))]
    #[test]
    fn test_toeplitz_columns_are_shifted_copies() {
        let signal = [1.0f32, 2.0, 3.0];
        let op = toeplitz(&signal).unwrap();
        let cols = 3;

        #[rustfmt::skip]
        let expected = [
            1.0, 0.0, 0.0,
            2.0, 1.0, 0.0,
            3.0, 2.0, 1.0,
            0.0, 3.0, 2.0,
            0.0, 0.0, 3.0,
        ];
        assert_eq!(op.len(), 5 * cols);
        assert_eq!(&op[..], &expected[..]);
    }

    #[cfg(any(feature = "std", feature = "alloc"))]
    #[test]
    fn test_doubly_block_structure() {
        // 2x2 image: rows [1, 2] and [3, 4]
        let image = [1.0f32, 2.0, 3.0, 4.0];
        let op = doubly_block_toeplitz(&image, 2, 2).unwrap();
        let shape = doubly_block_shape(2, 2).unwrap();
        assert_eq!(shape, OperatorShape::new(9, 4));

        let at = |r: usize, c: usize| op[r * shape.cols + c];

        // Block (0, 0) is toeplitz([1, 2])
        assert_eq!(at(0, 0), 1.0);
        assert_eq!(at(1, 0), 2.0);
        assert_eq!(at(1, 1), 1.0);
        assert_eq!(at(2, 1), 2.0);

        // Block (1, 0) is toeplitz([3, 4]) and so is block (2, 1)
        assert_eq!(at(3, 0), 3.0);
        assert_eq!(at(4, 0), 4.0);
        assert_eq!(at(6, 2), 3.0);
        assert_eq!(at(7, 3), 3.0);

        // Block (1, 1) is toeplitz([1, 2])
        assert_eq!(at(3, 2), 1.0);
        assert_eq!(at(5, 3), 2.0);

        // Block (0, 1) is empty
        for r in 0..3 {
            for c in 2..4 {
                assert_eq!(at(r, c), 0.0);
            }
        }
    }

    #[cfg(any(feature = "std", feature = "alloc"))]
    #[test]
    fn test_doubly_block_rejects_bad_length() {
        let err = doubly_block_toeplitz(&[1.0, 2.0, 3.0], 2, 2).unwrap_err();
        assert_eq!(err, AwiCoreError::LengthMismatch { expected: 4, got: 3 });
    }
}
