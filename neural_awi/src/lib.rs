//! # neural_awi
//!
//! Differentiable Adaptive Waveform Inversion (AWI) loss with Burn.
//!
//! AWI compares a reconstruction with a target by solving, per sample, for
//! the convolutional filter that maps the reconstruction onto the target.
//! A perfect reconstruction needs only a zero-lag spike; any shift or
//! distortion spreads filter energy to other lags, which a penalty template
//! scores. The loss is differentiable with respect to the reconstruction.
//!
//! ## Features
//!
//! - **Batched losses**: `AwiLoss1d` over `[batch, length]`, `AwiLoss2d` over
//!   `[batch, channel, H, W]`, operators rebuilt per sample
//! - **Single-target losses**: `SingleAwiLoss1d` / `SingleAwiLoss2d` cache the
//!   solution operator of a fixed target across calls
//! - **Operators**: Toeplitz and doubly-block-Toeplitz convolution matrices
//! - **Solver**: ridge-stabilized normal equations with a differentiable inverse
//! - **Regularizers**: total variation and KL divergence
//!
//! ## Quick Start
//!
//! ```ignore
//! use burn::backend::{Autodiff, NdArray};
//! use neural_awi::prelude::*;
//!
//! type MyBackend = Autodiff<NdArray>;
//!
//! let device = Default::default();
//! let loss = AwiLoss1d::new(AwiLossConfig::new().with_epsilon(1e-6))?;
//!
//! let target = Tensor::<MyBackend, 2>::from_data([[0.0, 0.0, 1.0, 0.0, 0.0]], &device);
//! let recon = Tensor::<MyBackend, 2>::from_data([[0.0, 1.0, 0.0, 0.0, 0.0]], &device)
//!     .require_grad();
//!
//! let out = loss.forward(recon.clone(), target)?;
//! let grads = out.loss.backward();
//! let recon_grad = recon.grad(&grads);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! awi_core (pure math: shapes, placements, padding, templates, fingerprints)
//!     │
//!     ▼
//! neural_awi
//!     operator ──┐
//!     padding ───┼──► solver ──► loss (batched / single + cache)
//!     template ──┘
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Standard library support
//! - `ndarray` (default): CPU backend using ndarray
//! - `wgpu`: GPU acceleration via WebGPU

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod loss;
pub mod operator;
pub mod padding;
pub mod solver;
pub mod template;

// Re-export key types for convenience
pub use config::{AwiLossConfig, CachePolicy, Reduction, SingleAwiLossConfig};
pub use error::{AwiError, Result};
pub use loss::{
    AwiLoss1d, AwiLoss2d, AwiOutput1d, AwiOutput2d, SingleAwiArgs, SingleAwiLoss1d,
    SingleAwiLoss2d, SingleAwiOutput,
};

// Re-export from awi_core for convenience
pub use awi_core::AwiCoreError;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{AwiLossConfig, CachePolicy, Reduction, SingleAwiLossConfig};
    pub use crate::error::{AwiError, Result};
    pub use crate::loss::{
        kl_divergence, penalty_energy, total_variation, AwiLoss1d, AwiLoss2d, AwiOutput1d,
        AwiOutput2d, OperatorCache, SingleAwiArgs, SingleAwiLoss1d, SingleAwiLoss2d,
        SingleAwiOutput,
    };
    pub use crate::operator::{doubly_block_toeplitz, toeplitz};
    pub use crate::padding::{pad_edges_to_len, pad_edges_to_shape};
    pub use crate::solver::{
        invert, regularized_inverse, regularized_normal, solve_regularized, RegularizedSolver,
    };
    pub use crate::template::{penalty_template_1d, penalty_template_2d};

    pub use awi_core::AwiCoreError;
    pub use burn::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use burn::prelude::*;

    type TestBackend = Autodiff<NdArray>;

    #[test]
    fn test_public_api() {
        let _config = AwiLossConfig::default();
        let _single = SingleAwiLossConfig::default();
        let _args = SingleAwiArgs::default();
        let _loss = AwiLoss1d::new(AwiLossConfig::new()).unwrap();
    }

    #[test]
    fn test_loss_is_differentiable() {
        let device = Default::default();
        let target =
            Tensor::<TestBackend, 2>::from_data([[0.0f32, 0.5, 1.0, 0.5, 0.0]], &device);
        let recon = Tensor::<TestBackend, 2>::from_data([[0.5f32, 1.0, 0.5, 0.0, 0.0]], &device)
            .require_grad();

        let loss = AwiLoss1d::new(AwiLossConfig::new().with_epsilon(1e-4)).unwrap();
        let out = loss.forward(recon.clone(), target).unwrap();
        let grads = out.loss.backward();

        let grad = recon.grad(&grads).unwrap();
        let data: Vec<f32> = grad.to_data().to_vec().unwrap();
        assert_eq!(data.len(), 5);
        assert!(data.iter().all(|g| g.is_finite()));
        assert!(data.iter().any(|g| g.abs() > 1e-6));
    }
}
