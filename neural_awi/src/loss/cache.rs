//! Solver cache for the single-target losses.

use awi_core::fingerprint_f32;
use burn::prelude::*;

use crate::config::CachePolicy;
use crate::error::Result;
use crate::solver::RegularizedSolver;

/// Identity of a cached solver: target content plus ridge parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CacheKey {
    target: u64,
    alpha: u64,
    epsilon: u64,
}

impl CacheKey {
    fn new<B: Backend, const D: usize>(target: &Tensor<B, D>, alpha: f64, epsilon: f64) -> Self {
        let data = target.to_data();
        Self {
            target: fingerprint_f32(&target.dims(), data.iter::<f32>()),
            alpha: alpha.to_bits(),
            epsilon: epsilon.to_bits(),
        }
    }
}

/// Holds the detached solution operator of one target.
///
/// The target is a constant of the optimization, so the cached solver carries
/// no autograd history; gradients reach the reconstruction through the
/// right-hand side only.
#[derive(Debug)]
pub struct OperatorCache<B: Backend> {
    policy: CachePolicy,
    entry: Option<(CacheKey, RegularizedSolver<B>)>,
    builds: usize,
    readbacks: usize,
}

impl<B: Backend> OperatorCache<B> {
    /// Create an empty cache.
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            entry: None,
            builds: 0,
            readbacks: 0,
        }
    }

    /// Invalidation policy of this cache.
    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Whether a solver is currently cached.
    pub fn is_cached(&self) -> bool {
        self.entry.is_some()
    }

    /// Number of times a solver has been built.
    pub fn builds(&self) -> usize {
        self.builds
    }

    /// Number of times a target was copied to the host to be fingerprinted.
    pub fn readbacks(&self) -> usize {
        self.readbacks
    }

    /// Drop the cached solver; the next call rebuilds it.
    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            log::debug!("operator cache invalidated");
        }
    }

    /// Return the cached solver for `target`, building it with `build` when
    /// the policy requires.
    ///
    /// Under [`CachePolicy::Forever`] the first solver is returned for every
    /// later call, whatever the target or ridge parameters. Under
    /// [`CachePolicy::ByContent`] a different target (by content and shape) or
    /// different `alpha`/`epsilon` trigger a rebuild.
    ///
    /// Fingerprinting copies the target to the host, which synchronizes with
    /// the device. `ByContent` pays that on every call, hits included;
    /// `Forever` only on the call that builds.
    pub fn get_or_build<const D: usize, F>(
        &mut self,
        target: &Tensor<B, D>,
        alpha: f64,
        epsilon: f64,
        build: F,
    ) -> Result<RegularizedSolver<B>>
    where
        F: FnOnce() -> Result<Tensor<B, 2>>,
    {
        let key = match (&self.policy, &self.entry) {
            (CachePolicy::Forever, Some((cached, _))) => *cached,
            _ => {
                self.readbacks += 1;
                CacheKey::new(target, alpha, epsilon)
            }
        };

        if let Some((cached, solver)) = &self.entry {
            if *cached == key {
                log::debug!("operator cache hit");
                return Ok(solver.clone());
            }
            log::warn!("target or ridge parameters changed, rebuilding cached operator");
        }

        let solver = RegularizedSolver::new(build()?, alpha, epsilon)?.detach();
        self.builds += 1;
        log::debug!(
            "built cached operator: {} x {} (alpha={}, epsilon={})",
            solver.rhs_len(),
            solver.filter_len(),
            alpha,
            epsilon
        );

        self.entry = Some((key, solver.clone()));
        Ok(solver)
    }
}
