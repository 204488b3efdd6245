//! Regularizers commonly added to an AWI loss.

use burn::prelude::*;

/// Anisotropic total variation of a `[batch, channel, H, W]` tensor.
///
/// Sum of absolute differences between horizontal and vertical neighbours.
/// An axis of extent 1 contributes nothing.
pub fn total_variation<B: Backend>(x: Tensor<B, 4>) -> Tensor<B, 1> {
    let [batch, channels, height, width] = x.dims();
    let device = x.device();
    let mut tv = Tensor::<B, 1>::zeros([1], &device);

    if width > 1 {
        let left = x.clone().slice([0..batch, 0..channels, 0..height, 0..width - 1]);
        let right = x.clone().slice([0..batch, 0..channels, 0..height, 1..width]);
        tv = tv + (left - right).abs().sum();
    }
    if height > 1 {
        let top = x.clone().slice([0..batch, 0..channels, 0..height - 1, 0..width]);
        let bottom = x.slice([0..batch, 0..channels, 1..height, 0..width]);
        tv = tv + (top - bottom).abs().sum();
    }
    tv
}

/// KL-divergence penalty `sum(sigma^2 + mu^2 - ln(sigma) - 1/2)`.
///
/// `sigma` must be positive; zero gives an infinite penalty.
pub fn kl_divergence<B: Backend, const D: usize>(
    mu: Tensor<B, D>,
    sigma: Tensor<B, D>,
) -> Tensor<B, 1> {
    let terms = sigma.clone() * sigma.clone() + mu.clone() * mu - sigma.log();
    terms.sub_scalar(0.5).sum()
}
