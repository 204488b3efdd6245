//! # awi_core
//!
//! Pure mathematical building blocks for Adaptive Waveform Inversion (AWI) losses.
//!
//! An AWI loss finds, per sample, the convolutional filter that best maps a
//! reconstruction onto a target, then penalizes how far that filter is from a
//! zero-lag spike. This crate holds everything about that computation that
//! does not need tensors or autodiff:
//!
//! - **Operator layout**: shapes and placement plans of the Toeplitz and
//!   doubly-block-Toeplitz convolution operators, plus host reference builders
//! - **Edge padding**: centred pad arithmetic with the odd sample trailing
//! - **Penalty templates**: inverted, normalized Gaussians centred on zero lag
//! - **Fingerprints**: FNV-1a content hashes for operator caches
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables standard library support
//! - `alloc`: Enables heap allocation (Vec, etc.) without full std
//!
//! ## Usage
//!
//! ```
//! use awi_core::prelude::*;
//!
//! let shape = toeplitz_shape(5).unwrap();
//! assert_eq!(shape.dims(), [9, 5]);
//!
//! let pad = EdgePad::to_len(5, shape.rows).unwrap();
//! assert_eq!((pad.lead, pad.trail), (2, 2));
//!
//! let mut template = [0.0f32; 5];
//! fill_penalty_template_1d(&mut template, 1.0).unwrap();
//! assert!(template[zero_lag_index(5)] < 1e-6);
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Conditional std/alloc support
#[cfg(feature = "std")]
extern crate std;

#[cfg(all(feature = "alloc", not(feature = "std")))]
extern crate alloc;

// Internal alloc prelude for conditional compilation
#[cfg(feature = "std")]
mod alloc_prelude {
    pub use std::vec::Vec;
}

#[cfg(all(feature = "alloc", not(feature = "std")))]
mod alloc_prelude {
    pub use alloc::vec::Vec;
}

pub mod error;
pub mod hash;
pub mod operator;
pub mod padding;
pub mod template;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::AwiCoreError;
    pub use crate::hash::{fingerprint_f32, Fnv1a64};
    pub use crate::operator::{
        doubly_block_placements, doubly_block_shape, toeplitz_placements, toeplitz_shape,
        BlockPlacement, ColumnPlacement, OperatorShape,
    };
    pub use crate::padding::{full_len, EdgePad, EdgePad2d};
    pub use crate::template::{
        fill_penalty_template_1d, fill_penalty_template_2d, gaussian, gaussian_2d,
        grid_coordinate, grid_spacing, zero_lag_index, zero_lag_offset, GRID_HALF_WIDTH,
    };

    #[cfg(any(feature = "std", feature = "alloc"))]
    pub use crate::operator::{doubly_block_toeplitz, toeplitz};
    #[cfg(any(feature = "std", feature = "alloc"))]
    pub use crate::template::{penalty_template_1d, penalty_template_2d};
}

// Re-export everything at crate root for convenience
pub use error::AwiCoreError;
pub use hash::{fingerprint_f32, Fnv1a64};
pub use operator::{
    doubly_block_placements, doubly_block_shape, toeplitz_placements, toeplitz_shape,
    BlockPlacement, ColumnPlacement, OperatorShape,
};
pub use padding::{full_len, EdgePad, EdgePad2d};
pub use template::{
    fill_penalty_template_1d, fill_penalty_template_2d, gaussian, gaussian_2d, grid_coordinate,
    grid_spacing, zero_lag_index, zero_lag_offset, GRID_HALF_WIDTH,
};

#[cfg(any(feature = "std", feature = "alloc"))]
pub use operator::{doubly_block_toeplitz, toeplitz};
#[cfg(any(feature = "std", feature = "alloc"))]
pub use template::{penalty_template_1d, penalty_template_2d};
