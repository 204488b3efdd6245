//! Zero-lag penalty templates as tensors.
//!
//! The values come from [`awi_core::template`]; they depend only on shape and
//! spread, so they are computed on the host and uploaded to `device`.

use burn::prelude::*;
use burn::tensor::TensorData;

use crate::error::Result;

/// 1D penalty template with `len` taps.
pub fn penalty_template_1d<B: Backend>(
    len: usize,
    std: f32,
    device: &B::Device,
) -> Result<Tensor<B, 1>> {
    let values = awi_core::penalty_template_1d(len, std)?;
    Ok(Tensor::from_data(TensorData::new(values, [len]), device))
}

/// 2D penalty template with `shape = [height, width]` taps and per-axis spread.
pub fn penalty_template_2d<B: Backend>(
    shape: [usize; 2],
    std: (f32, f32),
    device: &B::Device,
) -> Result<Tensor<B, 2>> {
    let values = awi_core::penalty_template_2d(shape[0], shape[1], std)?;
    Ok(Tensor::from_data(TensorData::new(values, shape), device))
}
