//! AWI loss functions.
//!
//! Every variant follows the same per-sample recipe:
//! - build (or reuse) the convolution operator `Z` of the target
//! - pad the reconstruction to the operator's row count
//! - solve the regularized normal equations for the filter `v`
//! - score `0.5 * ||T * v|| / ||v||` against the zero-lag penalty template `T`
//!
//! The batched variants rebuild the operator for every sample and channel.
//! The single-target variants hold one target's solver in an
//! [`OperatorCache`].
//!
//! The total-variation and KL-divergence regularizers live in
//! [`regularization`]; they are added to an AWI loss by the caller.

mod batched;
mod cache;
pub mod regularization;
mod single;

pub use batched::{AwiLoss1d, AwiLoss2d, AwiOutput1d, AwiOutput2d};
pub use cache::OperatorCache;
pub use regularization::{kl_divergence, total_variation};
pub use single::{SingleAwiArgs, SingleAwiLoss1d, SingleAwiLoss2d, SingleAwiOutput};

use burn::prelude::*;

use crate::error::{AwiError, Result};

/// Penalty energy `0.5 * ||T * v|| / ||v||` of one filter, shape `[1]`.
///
/// `template` and `filter` must have the same number of elements.
pub fn penalty_energy<B: Backend>(template: Tensor<B, 1>, filter: Tensor<B, 1>) -> Tensor<B, 1> {
    let weighted = template * filter.clone();
    let weighted_norm = (weighted.clone() * weighted).sum().sqrt();
    let norm = (filter.clone() * filter).sum().sqrt();

    (weighted_norm / norm).mul_scalar(0.5)
}

/// Drop leading unit axes so that only the trailing `K` axes remain.
///
/// Used by the single-target losses, which accept `[1, 1, H, W]`, `[1, H, W]`
/// and `[H, W]` alike.
pub(crate) fn squeeze_leading<B: Backend, const D: usize, const K: usize>(
    tensor: Tensor<B, D>,
) -> Result<Tensor<B, K>> {
    let dims = tensor.dims();
    if D < K {
        return Err(AwiError::InvalidShape {
            message: format!("expected at least {} axes, got shape {:?}", K, dims),
        });
    }

    let (leading, trailing) = dims.split_at(D - K);
    if leading.iter().any(|&d| d != 1) {
        return Err(AwiError::InvalidShape {
            message: format!(
                "leading axes must all be 1 for a single target, got shape {:?}",
                dims
            ),
        });
    }

    let mut shape = [0usize; K];
    shape.copy_from_slice(trailing);
    Ok(tensor.reshape(shape))
}

/// Check that reconstruction and target have identical shapes.
pub(crate) fn check_same_shape<const D: usize>(recon: [usize; D], target: [usize; D]) -> Result<()> {
    if recon != target {
        return Err(AwiError::shape_mismatch(&target, &recon));
    }
    Ok(())
}
