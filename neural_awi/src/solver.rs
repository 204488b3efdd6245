//! Regularized least-squares solver.
//!
//! Finds the filter `w` minimizing `||Z w - d||^2` through the normal equations
//!
//! ```text
//! M = Z^T Z + diag(alpha * diag(Z^T Z) + epsilon)
//! w = M^-1 Z^T d
//! ```
//!
//! The inverse is an explicit Gauss-Jordan elimination written with Burn
//! tensor primitives (slice, matmul, division, slice_assign), so on an
//! autodiff backend gradients flow through the inversion into `Z` and `d`.
//! There is no pivoting: `M` is symmetric positive (semi-)definite, and the
//! ridge terms are what keep its pivots away from zero.

use burn::prelude::*;
use burn::tensor::ElementConversion;

use crate::error::{AwiError, Result};

/// A pivot smaller than this fraction of the largest diagonal entry is singular.
pub const PIVOT_TOLERANCE: f64 = 1e-7;

/// Normal matrix `Z^T Z` with its diagonal scaled by `1 + alpha` and shifted by `epsilon`.
pub fn regularized_normal<B: Backend>(
    operator: Tensor<B, 2>,
    alpha: f64,
    epsilon: f64,
) -> Tensor<B, 2> {
    let [_, n] = operator.dims();
    let device = operator.device();

    let normal = operator.clone().transpose().matmul(operator);
    let eye = Tensor::<B, 2>::eye(n, &device);
    let diagonal = normal.clone() * eye.clone();

    normal + diagonal.mul_scalar(alpha) + eye.mul_scalar(epsilon)
}

/// Invert a square matrix by Gauss-Jordan elimination.
///
/// # Errors
/// - [`AwiError::ShapeMismatch`] if the matrix is not square.
/// - [`AwiError::SingularMatrix`] if a pivot is non-finite or below
///   [`PIVOT_TOLERANCE`] relative to the largest diagonal magnitude.
pub fn invert<B: Backend>(matrix: Tensor<B, 2>) -> Result<Tensor<B, 2>> {
    let [n, m] = matrix.dims();
    if n != m {
        return Err(AwiError::shape_mismatch(&[n, n], &[n, m]));
    }
    let device = matrix.device();
    let eye = Tensor::<B, 2>::eye(n, &device);

    let scale = (matrix.clone() * eye.clone())
        .abs()
        .max()
        .into_scalar()
        .elem::<f64>();

    // [M | I] -> [I | M^-1]
    let mut aug = Tensor::cat(vec![matrix, eye], 1);
    for k in 0..n {
        let row = aug.clone().slice([k..k + 1, 0..2 * n]);
        let pivot = row.clone().slice([0..1, k..k + 1]);

        let value = pivot.clone().into_scalar().elem::<f64>();
        if !value.is_finite() || value.abs() <= PIVOT_TOLERANCE * scale {
            return Err(AwiError::SingularMatrix {
                index: k,
                pivot: value,
            });
        }

        let row = row / pivot;
        let column = aug.clone().slice([0..n, k..k + 1]);
        aug = (aug - column.matmul(row.clone())).slice_assign([k..k + 1, 0..2 * n], row);
    }

    Ok(aug.slice([0..n, n..2 * n]))
}

/// Inverse of the regularized normal matrix together with `Z^T`.
pub fn regularized_inverse<B: Backend>(
    operator: Tensor<B, 2>,
    alpha: f64,
    epsilon: f64,
) -> Result<(Tensor<B, 2>, Tensor<B, 2>)> {
    let inverse = invert(regularized_normal(operator.clone(), alpha, epsilon))?;
    Ok((inverse, operator.transpose()))
}

/// Precomputed solution operator `M^-1 Z^T` for one convolution operator.
///
/// Applying it to a padded right-hand side yields the filter. Building it is
/// the expensive part of a solve, which is what single-target losses cache.
#[derive(Debug, Clone)]
pub struct RegularizedSolver<B: Backend> {
    projector: Tensor<B, 2>,
}

impl<B: Backend> RegularizedSolver<B> {
    /// Form and invert the regularized normal matrix of `operator`.
    pub fn new(operator: Tensor<B, 2>, alpha: f64, epsilon: f64) -> Result<Self> {
        let (inverse, adjoint) = regularized_inverse(operator, alpha, epsilon)?;
        Ok(Self {
            projector: inverse.matmul(adjoint),
        })
    }

    /// Number of right-hand side samples expected by [`Self::solve`].
    pub fn rhs_len(&self) -> usize {
        self.projector.dims()[1]
    }

    /// Number of filter taps returned by [`Self::solve`].
    pub fn filter_len(&self) -> usize {
        self.projector.dims()[0]
    }

    /// Solve for the filter given the padded right-hand side.
    ///
    /// # Errors
    /// [`AwiError::ShapeMismatch`] if `rhs` does not have [`Self::rhs_len`] samples.
    pub fn solve(&self, rhs: Tensor<B, 1>) -> Result<Tensor<B, 1>> {
        let [m] = rhs.dims();
        if m != self.rhs_len() {
            return Err(AwiError::shape_mismatch(&[self.rhs_len()], &[m]));
        }
        let filter = self.projector.clone().matmul(rhs.reshape([m, 1]));
        Ok(filter.reshape([self.filter_len()]))
    }

    /// Drop the autograd history of the solution operator.
    pub fn detach(self) -> Self {
        Self {
            projector: self.projector.detach(),
        }
    }
}

/// Solve `min ||Z w - d||^2` with ridge stabilization in one call.
pub fn solve_regularized<B: Backend>(
    operator: Tensor<B, 2>,
    rhs: Tensor<B, 1>,
    alpha: f64,
    epsilon: f64,
) -> Result<Tensor<B, 1>> {
    RegularizedSolver::new(operator, alpha, epsilon)?.solve(rhs)
}
