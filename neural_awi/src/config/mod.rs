//! Configuration types for neural_awi.
//!
//! Burn-style configuration structs for the batched and single-target losses.

mod loss;

pub use loss::{AwiLossConfig, CachePolicy, Reduction, SingleAwiLossConfig};
pub(crate) use loss::{validate_ridge, validate_spread};
