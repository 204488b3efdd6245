//! Batched AWI losses.
//!
//! Every sample (and in 2D every channel) gets its own operator, built from
//! its target and discarded after the solve. Terms are accumulated in order
//! and reduced by [`Reduction`].

use awi_core::full_len;
use burn::prelude::*;
use burn::tensor::ElementConversion;

use super::{check_same_shape, penalty_energy};
use crate::config::{AwiLossConfig, Reduction};
use crate::error::{AwiError, Result};
use crate::operator::{doubly_block_toeplitz, toeplitz};
use crate::padding::{pad_edges_to_len, pad_edges_to_shape};
use crate::solver::solve_regularized;
use crate::template::{penalty_template_1d, penalty_template_2d};

/// Output of [`AwiLoss1d::forward`].
#[derive(Debug, Clone)]
pub struct AwiOutput1d<B: Backend> {
    /// Reduced loss, shape `[1]`.
    pub loss: Tensor<B, 1>,
    /// Per-sample filters `[batch, length]`, when `return_filters` is set.
    pub filters: Option<Tensor<B, 2>>,
    /// Penalty template `[length]`, when `return_filters` is set.
    pub template: Option<Tensor<B, 1>>,
}

/// Output of [`AwiLoss2d::forward`].
#[derive(Debug, Clone)]
pub struct AwiOutput2d<B: Backend> {
    /// Reduced loss, shape `[1]`.
    pub loss: Tensor<B, 1>,
    /// Per-sample filters `[batch, channels, H, W]`, when `return_filters`
    /// is set. Each sample's filters are averaged over channels and the mean
    /// is repeated on every channel. The average is reporting only; each
    /// channel contributes its own term to the loss.
    pub filters: Option<Tensor<B, 4>>,
    /// Penalty template `[H, W]`, when `return_filters` is set.
    pub template: Option<Tensor<B, 2>>,
}

/// Batched 1D AWI loss over `[batch, length]` signals.
#[derive(Debug, Clone)]
pub struct AwiLoss1d {
    config: AwiLossConfig,
}

impl AwiLoss1d {
    /// Create a new loss.
    ///
    /// # Errors
    /// [`AwiError::InvalidConfig`] if the configuration does not validate.
    pub fn new(config: AwiLossConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The loss configuration.
    pub fn config(&self) -> &AwiLossConfig {
        &self.config
    }

    /// Compute the loss of `recon` against `target`, both `[batch, length]`.
    pub fn forward<B: Backend>(
        &self,
        recon: Tensor<B, 2>,
        target: Tensor<B, 2>,
    ) -> Result<AwiOutput1d<B>> {
        check_same_shape(recon.dims(), target.dims())?;
        let [batch, len] = recon.dims();
        if batch == 0 {
            return Err(AwiError::InvalidShape {
                message: "batch is empty".to_string(),
            });
        }

        let device = recon.device();
        let cfg = &self.config;
        let template = penalty_template_1d::<B>(len, cfg.std, &device)?;

        let mut total = Tensor::<B, 1>::zeros([1], &device);
        let mut filters = Vec::new();
        for b in 0..batch {
            let sample = |t: &Tensor<B, 2>| t.clone().slice([b..b + 1, 0..len]).reshape([len]);

            let op = toeplitz(sample(&target), &device)?;
            let [rows, _] = op.dims();
            let rhs = pad_edges_to_len(sample(&recon), rows, 0.0, &device)?;
            let filter = solve_regularized(op, rhs, cfg.alpha, cfg.epsilon)?;

            let term = penalty_energy(template.clone(), filter.clone());
            trace_term(b, None, &term);
            total = total + term;

            if cfg.return_filters {
                filters.push(filter.reshape([1, len]));
            }
        }

        let loss = reduce(total, &cfg.reduction, batch);
        if !cfg.return_filters {
            return Ok(AwiOutput1d {
                loss,
                filters: None,
                template: None,
            });
        }
        Ok(AwiOutput1d {
            loss,
            filters: Some(Tensor::cat(filters, 0)),
            template: Some(template),
        })
    }
}

/// Batched 2D AWI loss over `[batch, channel, H, W]` images.
#[derive(Debug, Clone)]
pub struct AwiLoss2d {
    config: AwiLossConfig,
}

impl AwiLoss2d {
    /// Create a new loss.
    ///
    /// # Errors
    /// [`AwiError::InvalidConfig`] if the configuration does not validate.
    pub fn new(config: AwiLossConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The loss configuration.
    pub fn config(&self) -> &AwiLossConfig {
        &self.config
    }

    /// Compute the loss of `recon` against `target`, both `[batch, channel, H, W]`.
    ///
    /// Each (sample, channel) pair is an independent term. The template uses
    /// the configured `std` along both axes.
    pub fn forward<B: Backend>(
        &self,
        recon: Tensor<B, 4>,
        target: Tensor<B, 4>,
    ) -> Result<AwiOutput2d<B>> {
        check_same_shape(recon.dims(), target.dims())?;
        let [batch, channels, height, width] = recon.dims();
        if batch == 0 || channels == 0 {
            return Err(AwiError::InvalidShape {
                message: format!("no images in shape {:?}", recon.dims()),
            });
        }

        let device = recon.device();
        let cfg = &self.config;
        let taps = height * width;
        let padded = [full_len(height), full_len(width)];
        let template = penalty_template_2d::<B>([height, width], (cfg.std, cfg.std), &device)?;
        let template_flat = template.clone().reshape([taps]);

        let mut total = Tensor::<B, 1>::zeros([1], &device);
        let mut filters = Vec::new();
        for b in 0..batch {
            let mut channel_sum = Tensor::<B, 1>::zeros([taps], &device);
            for c in 0..channels {
                let image = |t: &Tensor<B, 4>| {
                    t.clone()
                        .slice([b..b + 1, c..c + 1, 0..height, 0..width])
                        .reshape([height, width])
                };

                let op = doubly_block_toeplitz(image(&target), &device)?;
                let rhs = pad_edges_to_shape(image(&recon), padded, 0.0, &device)?
                    .reshape([padded[0] * padded[1]]);
                let filter = solve_regularized(op, rhs, cfg.alpha, cfg.epsilon)?;

                let term = penalty_energy(template_flat.clone(), filter.clone());
                trace_term(b, Some(c), &term);
                total = total + term;

                if cfg.return_filters {
                    channel_sum = channel_sum + filter;
                }
            }
            if cfg.return_filters {
                let mean = channel_sum.div_scalar(channels as f32);
                filters.push(mean.reshape([1, 1, height, width]).repeat_dim(1, channels));
            }
        }

        let loss = reduce(total, &cfg.reduction, batch * channels);
        if !cfg.return_filters {
            return Ok(AwiOutput2d {
                loss,
                filters: None,
                template: None,
            });
        }
        Ok(AwiOutput2d {
            loss,
            filters: Some(Tensor::cat(filters, 0)),
            template: Some(template),
        })
    }
}

fn reduce<B: Backend>(total: Tensor<B, 1>, reduction: &Reduction, terms: usize) -> Tensor<B, 1> {
    match reduction {
        Reduction::Sum => total,
        Reduction::Mean => total.div_scalar(terms as f32),
    }
}

fn trace_term<B: Backend>(sample: usize, channel: Option<usize>, term: &Tensor<B, 1>) {
    if !log::log_enabled!(log::Level::Trace) {
        return;
    }
    let value = term.clone().into_scalar().elem::<f32>();
    match channel {
        Some(c) => log::trace!("awi term sample={} channel={}: {}", sample, c, value),
        None => log::trace!("awi term sample={}: {}", sample, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn scalar(t: Tensor<TestBackend, 1>) -> f32 {
        t.into_scalar().elem::<f32>()
    }

    fn impulses(positions: &[usize], len: usize) -> Tensor<TestBackend, 2> {
        let mut data = vec![0.0f32; positions.len() * len];
        for (b, &p) in positions.iter().enumerate() {
            data[b * len + p] = 1.0;
        }
        Tensor::<TestBackend, 1>::from_data(data.as_slice(), &Default::default())
            .reshape([positions.len(), len])
    }

    #[test]
    fn test_new_validates_config() {
        assert!(AwiLoss1d::new(AwiLossConfig::new().with_std(-1.0)).is_err());
        assert!(AwiLoss2d::new(AwiLossConfig::new().with_alpha(f64::NAN)).is_err());
        assert!(AwiLoss1d::new(AwiLossConfig::new()).is_ok());
    }

    #[test]
    fn test_identity_1d() {
        let loss = AwiLoss1d::new(AwiLossConfig::new().with_epsilon(1e-6)).unwrap();
        let x = impulses(&[2, 2], 5);

        let out = loss.forward(x.clone(), x).unwrap();
        assert!(scalar(out.loss) < 0.05);
        assert!(out.filters.is_none());
        assert!(out.template.is_none());
    }

    #[test]
    fn test_shifted_batch_sums_terms() {
        let loss = AwiLoss1d::new(AwiLossConfig::new().with_epsilon(1e-6)).unwrap();
        let target = impulses(&[2, 2], 5);
        let recon = impulses(&[0, 2], 5);

        // One fully shifted sample (0.5) plus one exact sample (0).
        let value = scalar(loss.forward(recon, target).unwrap().loss);
        assert!((value - 0.5).abs() < 1e-3, "{}", value);
    }

    #[test]
    fn test_return_filters_shapes_1d() {
        let config = AwiLossConfig::new()
            .with_epsilon(1e-6)
            .with_return_filters(true);
        let loss = AwiLoss1d::new(config).unwrap();
        let x = impulses(&[1, 2, 3], 5);

        let out = loss.forward(x.clone(), x).unwrap();
        let filters = out.filters.unwrap();
        assert_eq!(filters.dims(), [3, 5]);
        assert_eq!(out.template.unwrap().dims(), [5]);

        // Identical signals recover the zero-lag spike for every sample.
        let data: Vec<f32> = filters.to_data().to_vec().unwrap();
        for b in 0..3 {
            assert!((data[b * 5 + 2] - 1.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_shape_mismatch_1d() {
        let loss = AwiLoss1d::new(AwiLossConfig::new()).unwrap();
        let err = loss
            .forward(impulses(&[2], 5), impulses(&[2, 2], 5))
            .unwrap_err();
        assert!(matches!(err, AwiError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_identity_2d_filters() {
        let device = Default::default();
        let mut data = vec![0.0f32; 2 * 2 * 9];
        for image in 0..4 {
            data[image * 9 + 4] = 1.0;
        }
        let x = Tensor::<TestBackend, 1>::from_data(data.as_slice(), &device).reshape([2, 2, 3, 3]);

        let config = AwiLossConfig::new()
            .with_epsilon(1e-6)
            .with_return_filters(true);
        let out = AwiLoss2d::new(config).unwrap().forward(x.clone(), x).unwrap();

        assert!(scalar(out.loss) < 0.05);
        let filters = out.filters.unwrap();
        assert_eq!(filters.dims(), [2, 2, 3, 3]);
        assert_eq!(out.template.unwrap().dims(), [3, 3]);

        let values: Vec<f32> = filters.to_data().to_vec().unwrap();
        for image in 0..4 {
            assert!((values[image * 9 + 4] - 1.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_2d_filters_share_channel_mean() {
        let device = Default::default();
        let mut target = vec![0.0f32; 2 * 9];
        target[4] = 1.0;
        target[9 + 4] = 1.0;
        let mut recon = target.clone();
        recon[9 + 4] = 0.0;
        recon[9 + 3] = 1.0;
        let target =
            Tensor::<TestBackend, 1>::from_data(target.as_slice(), &device).reshape([1, 2, 3, 3]);
        let recon =
            Tensor::<TestBackend, 1>::from_data(recon.as_slice(), &device).reshape([1, 2, 3, 3]);

        let config = AwiLossConfig::new()
            .with_epsilon(1e-6)
            .with_return_filters(true);
        let out = AwiLoss2d::new(config).unwrap().forward(recon, target).unwrap();

        let filters = out.filters.unwrap();
        assert_eq!(filters.dims(), [1, 2, 3, 3]);
        let values: Vec<f32> = filters.to_data().to_vec().unwrap();
        let (first, second) = values.split_at(9);
        for (a, b) in first.iter().zip(second) {
            assert!((a - b).abs() < 1e-6);
        }
        // Half the energy from the aligned channel, half from the shifted one.
        assert!((first[4] - 0.5).abs() < 1e-3);
        let total: f32 = first.iter().sum();
        assert!((total - 1.0).abs() < 1e-3);
    }
}
