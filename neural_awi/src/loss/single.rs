//! Single-target AWI losses with a cached solver.
//!
//! These fit one reconstruction against one fixed target, the common setup
//! when a model is fitted to a single observation over many optimizer steps.
//! Building and inverting the normal matrix dominates the cost, so the
//! solution operator of the target is cached between calls.

use awi_core::full_len;
use burn::prelude::*;

use super::{check_same_shape, penalty_energy, squeeze_leading, OperatorCache};
use crate::config::{validate_ridge, validate_spread, SingleAwiLossConfig};
use crate::error::AwiError;
use crate::operator::{doubly_block_toeplitz, toeplitz};
use crate::padding::{pad_edges_to_len, pad_edges_to_shape};
use crate::template::{penalty_template_1d, penalty_template_2d};

/// Per-call parameters of the single-target losses.
#[derive(Config, Debug)]
pub struct SingleAwiArgs {
    /// Ridge term proportional to the diagonal of the normal matrix.
    #[config(default = 0.0)]
    pub alpha: f64,

    /// Ridge term added to every diagonal entry of the normal matrix.
    #[config(default = 0.0)]
    pub epsilon: f64,

    /// Spread of the zero-lag penalty template.
    #[config(default = 1.0)]
    pub std: f32,
}

impl Default for SingleAwiArgs {
    fn default() -> Self {
        Self::new()
    }
}

impl SingleAwiArgs {
    /// Validate the parameters.
    pub fn validate(&self) -> crate::Result<()> {
        validate_ridge(self.alpha, self.epsilon)?;
        validate_spread(self.std)
    }
}

/// Output of a single-target loss.
#[derive(Debug, Clone)]
pub struct SingleAwiOutput<B: Backend, const D: usize> {
    /// Loss value, shape `[1]`.
    pub loss: Tensor<B, 1>,
    /// Solved filter, same shape as the squeezed target.
    pub filter: Tensor<B, D>,
    /// Penalty template the filter was scored against.
    pub template: Tensor<B, D>,
}

/// Single-target 1D AWI loss.
///
/// Accepts `[h]`, `[1, h]`, `[1, 1, h]` and so on; all axes but the last must be 1.
#[derive(Debug)]
pub struct SingleAwiLoss1d<B: Backend> {
    cache: OperatorCache<B>,
}

impl<B: Backend> SingleAwiLoss1d<B> {
    /// Create a new loss with an empty cache.
    pub fn new(config: SingleAwiLossConfig) -> Self {
        Self {
            cache: OperatorCache::new(config.cache),
        }
    }

    /// The solver cache.
    pub fn cache(&self) -> &OperatorCache<B> {
        &self.cache
    }

    /// Drop the cached solver.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    /// Compute the loss of `recon` against `target`.
    ///
    /// # Errors
    /// - [`AwiError::ShapeMismatch`] if the shapes differ, or if a
    ///   [`CachePolicy::Forever`](crate::config::CachePolicy::Forever) cache
    ///   holds a solver for a different length.
    /// - [`AwiError::InvalidShape`] if a leading axis is not 1.
    /// - [`AwiError::SingularMatrix`] if the normal matrix cannot be inverted.
    pub fn forward<const D: usize>(
        &mut self,
        recon: Tensor<B, D>,
        target: Tensor<B, D>,
        args: &SingleAwiArgs,
    ) -> crate::Result<SingleAwiOutput<B, 1>> {
        args.validate()?;
        check_same_shape(recon.dims(), target.dims())?;

        let recon: Tensor<B, 1> = squeeze_leading(recon)?;
        let target: Tensor<B, 1> = squeeze_leading(target)?;
        let [len] = target.dims();
        let device = recon.device();

        let solver = self
            .cache
            .get_or_build(&target, args.alpha, args.epsilon, || {
                toeplitz(target.clone(), &device)
            })?;
        if solver.filter_len() != len {
            return Err(AwiError::shape_mismatch(&[solver.filter_len()], &[len]));
        }

        let rhs = pad_edges_to_len(recon, solver.rhs_len(), 0.0, &device)?;
        let filter = solver.solve(rhs)?;
        let template = penalty_template_1d::<B>(len, args.std, &device)?;
        let loss = penalty_energy(template.clone(), filter.clone());

        Ok(SingleAwiOutput {
            loss,
            filter,
            template,
        })
    }
}

/// Single-target 2D AWI loss.
///
/// Accepts `[H, W]`, `[1, H, W]`, `[1, 1, H, W]` and so on; all axes but the
/// last two must be 1.
#[derive(Debug)]
pub struct SingleAwiLoss2d<B: Backend> {
    cache: OperatorCache<B>,
}

impl<B: Backend> SingleAwiLoss2d<B> {
    /// Create a new loss with an empty cache.
    pub fn new(config: SingleAwiLossConfig) -> Self {
        Self {
            cache: OperatorCache::new(config.cache),
        }
    }

    /// The solver cache.
    pub fn cache(&self) -> &OperatorCache<B> {
        &self.cache
    }

    /// Drop the cached solver.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    /// Compute the loss of `recon` against `target`.
    ///
    /// The template uses `args.std` along both axes.
    ///
    /// # Errors
    /// Same as [`SingleAwiLoss1d::forward`].
    pub fn forward<const D: usize>(
        &mut self,
        recon: Tensor<B, D>,
        target: Tensor<B, D>,
        args: &SingleAwiArgs,
    ) -> crate::Result<SingleAwiOutput<B, 2>> {
        args.validate()?;
        check_same_shape(recon.dims(), target.dims())?;

        let recon: Tensor<B, 2> = squeeze_leading(recon)?;
        let target: Tensor<B, 2> = squeeze_leading(target)?;
        let [height, width] = target.dims();
        let device = recon.device();

        let solver = self
            .cache
            .get_or_build(&target, args.alpha, args.epsilon, || {
                doubly_block_toeplitz(target.clone(), &device)
            })?;
        if solver.filter_len() != height * width {
            return Err(AwiError::shape_mismatch(
                &[solver.filter_len()],
                &[height * width],
            ));
        }

        let padded = [full_len(height), full_len(width)];
        let rhs = pad_edges_to_shape(recon, padded, 0.0, &device)?.reshape([padded[0] * padded[1]]);
        let filter = solver.solve(rhs)?;
        let template = penalty_template_2d::<B>([height, width], (args.std, args.std), &device)?;
        let loss = penalty_energy(
            template.clone().reshape([height * width]),
            filter.clone(),
        );

        Ok(SingleAwiOutput {
            loss,
            filter: filter.reshape([height, width]),
            template,
        })
    }
}
