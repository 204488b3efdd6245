//! Zero-lag penalty templates.
//!
//! A template weights filter energy by its distance from zero lag. It is an
//! inverted Gaussian sampled on a fixed grid spanning `[-10, 10]`, shifted and
//! scaled so that its values lie in `[0, 1]`: about 0 at the zero-lag tap and
//! 1 at the tap farthest from it.
//!
//! For even lengths the Gaussian is moved half a grid step towards the start
//! so that its minimum falls on index `(n - 1) / 2`, the tap at which the
//! identity filter appears after centred padding.

use core::f32::consts::PI;

#[cfg(any(feature = "std", feature = "alloc"))]
use crate::alloc_prelude::*;
use crate::error::AwiCoreError;

/// Half width of the sampling grid. Samples span `[-GRID_HALF_WIDTH, GRID_HALF_WIDTH]`.
pub const GRID_HALF_WIDTH: f32 = 10.0;

/// Index of the zero-lag tap in a filter of `len` taps.
#[inline]
pub const fn zero_lag_index(len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (len - 1) / 2
    }
}

/// Spacing between consecutive grid samples.
#[inline]
pub fn grid_spacing(samples: usize) -> f32 {
    if samples < 2 {
        0.0
    } else {
        2.0 * GRID_HALF_WIDTH / (samples - 1) as f32
    }
}

/// Grid coordinate of sample `index` out of `samples`.
///
/// The first half is stepped from the start and the second half from the end,
/// so mirrored samples have exactly opposite coordinates.
#[inline]
pub fn grid_coordinate(index: usize, samples: usize) -> f32 {
    if samples < 2 {
        return -GRID_HALF_WIDTH;
    }
    let step = grid_spacing(samples);
    if index < samples / 2 {
        -GRID_HALF_WIDTH + step * index as f32
    } else {
        GRID_HALF_WIDTH - step * (samples - 1 - index) as f32
    }
}

/// Grid coordinate of the zero-lag tap: 0 for odd lengths, `-step / 2` for even.
#[inline]
pub fn zero_lag_offset(samples: usize) -> f32 {
    let parity = (samples % 2) as f32;
    grid_spacing(samples) * (parity - 1.0) / 2.0
}

/// Un-normalized 1D Gaussian `a * exp(-(x - mean)^2 / (2 std^2))`.
#[inline]
pub fn gaussian(x: f32, amplitude: f32, std: f32, mean: f32) -> f32 {
    let d = x - mean;
    amplitude * libm::expf(-(d * d) / (2.0 * std * std))
}

/// 2D Gaussian with normalization constant, `a / (2 pi sx sy) * exp(...)`.
#[inline]
pub fn gaussian_2d(x: f32, y: f32, mean: (f32, f32), std: (f32, f32), amplitude: f32) -> f32 {
    let (mx, my) = mean;
    let (sx, sy) = std;
    let dx = x - mx;
    let dy = y - my;
    amplitude / (2.0 * PI * sx * sy)
        * libm::expf(-(dx * dx / (2.0 * sx * sx) + dy * dy / (2.0 * sy * sy)))
}

fn check_spread(std: f32) -> Result<(), AwiCoreError> {
    if std.is_finite() && std > 0.0 {
        Ok(())
    } else {
        Err(AwiCoreError::NonPositiveSpread { value: std })
    }
}

/// Negate, lift by the max absolute value, then scale into `[0, 1]`.
///
/// A flat result (single sample, or a spread so wide the Gaussian is
/// constant) stays all zeros.
fn invert_and_normalize(values: &mut [f32]) {
    for v in values.iter_mut() {
        *v = -*v;
    }
    let lift = max_abs(values);
    for v in values.iter_mut() {
        *v += lift;
    }
    let scale = max_abs(values);
    if scale > 0.0 && scale.is_finite() {
        for v in values.iter_mut() {
            *v /= scale;
        }
    } else {
        values.fill(0.0);
    }
}

fn max_abs(values: &[f32]) -> f32 {
    values.iter().fold(0.0f32, |acc, v| acc.max(libm::fabsf(*v)))
}

/// Fill `out` with the 1D penalty template of length `out.len()`.
///
/// # Errors
/// [`AwiCoreError::NonPositiveSpread`] if `std` is not positive and finite.
pub fn fill_penalty_template_1d(out: &mut [f32], std: f32) -> Result<(), AwiCoreError> {
    check_spread(std)?;
    let n = out.len();
    let mean = zero_lag_offset(n);
    for (i, v) in out.iter_mut().enumerate() {
        *v = gaussian(grid_coordinate(i, n), 1.0, std, mean);
    }
    invert_and_normalize(out);
    Ok(())
}

/// Fill `out` (row-major, `height x width`) with the 2D penalty template.
///
/// Rows sample the first grid axis and columns the second; each axis is
/// centred on its own zero-lag tap.
///
/// # Errors
/// [`AwiCoreError::NonPositiveSpread`] for a bad spread,
/// [`AwiCoreError::LengthMismatch`] if `out.len() != height * width`.
pub fn fill_penalty_template_2d(
    out: &mut [f32],
    height: usize,
    width: usize,
    std: (f32, f32),
) -> Result<(), AwiCoreError> {
    check_spread(std.0)?;
    check_spread(std.1)?;
    if out.len() != height * width {
        return Err(AwiCoreError::LengthMismatch {
            expected: height * width,
            got: out.len(),
        });
    }

    let mean = (zero_lag_offset(height), zero_lag_offset(width));
    for r in 0..height {
        let x = grid_coordinate(r, height);
        for c in 0..width {
            let y = grid_coordinate(c, width);
            out[r * width + c] = gaussian_2d(x, y, mean, std, 1.0);
        }
    }
    invert_and_normalize(out);
    Ok(())
}

/// 1D penalty template of `len` taps.
///
/// # Errors
/// See [`fill_penalty_template_1d`].
#[cfg(any(feature = "std", feature = "alloc"))]
pub fn penalty_template_1d(len: usize, std: f32) -> Result<Vec<f32>, AwiCoreError> {
    let mut out = Vec::new();
    out.resize(len, 0.0f32);
    fill_penalty_template_1d(&mut out, std)?;
    Ok(out)
}

/// 2D penalty template of `height x width` taps, row-major.
///
/// # Errors
/// See [`fill_penalty_template_2d`].
#[cfg(any(feature = "std", feature = "alloc"))]
pub fn penalty_template_2d(
    height: usize,
    width: usize,
    std: (f32, f32),
) -> Result<Vec<f32>, AwiCoreError> {
    let mut out = Vec::new();
    out.resize(height * width, 0.0f32);
    fill_penalty_template_2d(&mut out, height, width, std)?;
    Ok(out)
}
