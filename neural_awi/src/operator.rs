//! Differentiable convolution operators.
//!
//! Builds the Toeplitz (1D) and doubly-block-Toeplitz (2D) matrices of a
//! target by scattering the target values into a zero matrix following the
//! placement plans of [`awi_core::operator`]. Gradients flow through the
//! placed values; the zero fill carries none.

use awi_core::{doubly_block_placements, doubly_block_shape, toeplitz_placements, toeplitz_shape};
use burn::prelude::*;

use crate::error::Result;

/// Toeplitz operator of a 1D signal, shape `[2h - 1, h]`.
///
/// Column `i` holds the signal starting at row `i`.
pub fn toeplitz<B: Backend>(signal: Tensor<B, 1>, device: &B::Device) -> Result<Tensor<B, 2>> {
    let [len] = signal.dims();
    let shape = toeplitz_shape(len)?;
    let column = signal.to_device(device).reshape([len, 1]);

    let mut op = Tensor::<B, 2>::zeros(shape.dims(), device);
    for p in toeplitz_placements(len) {
        op = op.slice_assign([p.rows(), p.cols()], column.clone());
    }
    Ok(op)
}

/// Doubly-block-Toeplitz operator of a 2D image, shape `[(2H - 1)(2W - 1), H * W]`.
///
/// Block `(i + j, j)` holds the Toeplitz operator of image row `i`.
pub fn doubly_block_toeplitz<B: Backend>(
    image: Tensor<B, 2>,
    device: &B::Device,
) -> Result<Tensor<B, 2>> {
    let [height, width] = image.dims();
    let shape = doubly_block_shape(height, width)?;
    let image = image.to_device(device);

    // One Toeplitz block per image row, reused for every block column.
    let blocks = (0..height)
        .map(|i| {
            let row = image.clone().slice([i..i + 1, 0..width]).reshape([width]);
            toeplitz(row, device)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut op = Tensor::<B, 2>::zeros(shape.dims(), device);
    for p in doubly_block_placements(height, width) {
        op = op.slice_assign([p.rows(), p.cols()], blocks[p.source_row].clone());
    }
    Ok(op)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn values<const D: usize>(t: Tensor<TestBackend, D>) -> Vec<f32> {
        t.to_data().to_vec().unwrap()
    }

    #[test]
    fn test_toeplitz_shape_and_columns() {
        let device = Default::default();
        let signal = Tensor::<TestBackend, 1>::from_data([1.0f32, 2.0, 3.0], &device);

        let op = toeplitz(signal, &device).unwrap();
        assert_eq!(op.dims(), [5, 3]);

        #[rustfmt::skip]
        let expected = vec![
            1.0, 0.0, 0.0,
            2.0, 1.0, 0.0,
            3.0, 2.0, 1.0,
            0.0, 3.0, 2.0,
            0.0, 0.0, 3.0,
        ];
        assert_eq!(values(op), expected);
    }

    #[test]
    fn test_toeplitz_single_sample() {
        let device = Default::default();
        let signal = Tensor::<TestBackend, 1>::from_data([4.0f32], &device);
        let op = toeplitz(signal, &device).unwrap();
        assert_eq!(op.dims(), [1, 1]);
        assert_eq!(values(op), vec![4.0]);
    }

    #[test]
    fn test_doubly_block_matches_host_reference() {
        let device = Default::default();
        let data = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let image = Tensor::<TestBackend, 1>::from_data(data, &device).reshape([2, 3]);

        let op = doubly_block_toeplitz(image, &device).unwrap();
        assert_eq!(op.dims(), [15, 6]);

        let reference = awi_core::doubly_block_toeplitz(&data, 2, 3).unwrap();
        assert_eq!(values(op), reference);
    }
}
