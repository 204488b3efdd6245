//! Edge-padding aligner.
//!
//! Centres a signal or image inside a larger extent with a constant fill.
//! The split between leading and trailing pad comes from
//! [`awi_core::EdgePad`]: an odd total puts the extra sample at the end.

use awi_core::{EdgePad, EdgePad2d};
use burn::prelude::*;

use crate::error::Result;

/// Pad a 1D signal to `length` samples.
pub fn pad_edges_to_len<B: Backend>(
    signal: Tensor<B, 1>,
    length: usize,
    value: f32,
    device: &B::Device,
) -> Result<Tensor<B, 1>> {
    let [len] = signal.dims();
    let pad = EdgePad::to_len(len, length)?;
    let signal = signal.to_device(device);
    if pad.is_empty() {
        return Ok(signal);
    }

    // The signal's gradient is read back from this window.
    let padded = Tensor::<B, 1>::full([length], value, device);
    Ok(padded.slice_assign([pad.lead..pad.lead + len], signal))
}

/// Pad a 2D image to `shape`, each axis centred independently.
pub fn pad_edges_to_shape<B: Backend>(
    image: Tensor<B, 2>,
    shape: [usize; 2],
    value: f32,
    device: &B::Device,
) -> Result<Tensor<B, 2>> {
    let [rows, cols] = image.dims();
    let pad = EdgePad2d::to_shape([rows, cols], shape)?;
    let image = image.to_device(device);
    if pad.rows.is_empty() && pad.cols.is_empty() {
        return Ok(image);
    }

    let row_window = pad.rows.lead..pad.rows.lead + rows;
    let col_window = pad.cols.lead..pad.cols.lead + cols;
    let padded = Tensor::<B, 2>::full(shape, value, device);
    Ok(padded.slice_assign([row_window, col_window], image))
}
