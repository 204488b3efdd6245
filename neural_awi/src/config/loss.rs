//! Loss configuration types.

use std::str::FromStr;

use burn::config::Config;

use crate::error::AwiError;

/// How per-sample loss terms are combined into the scalar loss.
#[derive(Config, Debug, PartialEq, Eq)]
pub enum Reduction {
    /// Sum of all per-sample (per-channel) terms.
    Sum,
    /// Sum divided by the number of terms (batch, or batch x channel in 2D).
    Mean,
}

impl FromStr for Reduction {
    type Err = AwiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sum" => Ok(Reduction::Sum),
            "mean" => Ok(Reduction::Mean),
            other => Err(AwiError::invalid_config(format!(
                "reduction must be \"sum\" or \"mean\", got {:?}",
                other
            ))),
        }
    }
}

/// When a single-target loss rebuilds its cached operator.
#[derive(Config, Debug, PartialEq, Eq)]
pub enum CachePolicy {
    /// Build on the first call and reuse for the lifetime of the loss, even if
    /// later calls pass a different target or different ridge parameters.
    Forever,
    /// Rebuild whenever the content fingerprint of the target, or the ridge
    /// parameters, differ from those the cache was built with.
    ///
    /// The fingerprint is taken on the host, so every call, cache hits
    /// included, copies the target off the device and waits for it. On a GPU
    /// backend that is one sync per optimizer step; use `Forever` when the
    /// target is known not to change.
    ByContent,
}

/// Configuration for the batched AWI losses.
#[derive(Config, Debug)]
pub struct AwiLossConfig {
    /// Ridge term proportional to the diagonal of the normal matrix.
    #[config(default = 0.0)]
    pub alpha: f64,

    /// Ridge term added to every diagonal entry of the normal matrix.
    #[config(default = 0.0)]
    pub epsilon: f64,

    /// Spread of the zero-lag penalty template (grid units, grid spans [-10, 10]).
    #[config(default = 1.0)]
    pub std: f32,

    /// How per-sample terms are combined.
    #[config(default = "Reduction::Sum")]
    pub reduction: Reduction,

    /// Return the solved filters and the penalty template with the loss.
    #[config(default = false)]
    pub return_filters: bool,
}

impl Default for AwiLossConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AwiLossConfig {
    /// Set the reduction from its name (`"sum"` or `"mean"`).
    ///
    /// # Errors
    /// [`AwiError::InvalidConfig`] for any other name.
    pub fn with_reduction_name(self, name: &str) -> crate::Result<Self> {
        Ok(self.with_reduction(name.parse()?))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        validate_ridge(self.alpha, self.epsilon)?;
        validate_spread(self.std)
    }
}

/// Configuration for the single-target AWI losses.
///
/// Ridge parameters and spread are passed per call; only the cache behaviour
/// is fixed at construction.
#[derive(Config, Debug)]
pub struct SingleAwiLossConfig {
    /// Cache invalidation policy for the operator and inverted normal matrix.
    #[config(default = "CachePolicy::ByContent")]
    pub cache: CachePolicy,
}

impl Default for SingleAwiLossConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn validate_ridge(alpha: f64, epsilon: f64) -> crate::Result<()> {
    if !alpha.is_finite() || alpha < 0.0 {
        return Err(AwiError::invalid_config(format!(
            "alpha must be finite and non-negative, got {}",
            alpha
        )));
    }
    if !epsilon.is_finite() || epsilon < 0.0 {
        return Err(AwiError::invalid_config(format!(
            "epsilon must be finite and non-negative, got {}",
            epsilon
        )));
    }
    Ok(())
}

pub(crate) fn validate_spread(std: f32) -> crate::Result<()> {
    if !std.is_finite() || std <= 0.0 {
        return Err(AwiError::invalid_config(format!(
            "std must be positive and finite, got {}",
            std
        )));
    }
    Ok(())
}
