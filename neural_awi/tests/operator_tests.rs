//! Property tests for the tensor building blocks.
//!
//! # Test Categories
//!
//! 1. **Operators** - tensor operators agree with the host reference layout
//! 2. **Padding** - tensor padding agrees with the `EdgePad` split
//! 3. **Solver** - the regularized solve satisfies the normal equations

use burn::backend::NdArray;
use burn::prelude::*;
use proptest::prelude::*;

use neural_awi::prelude::{
    doubly_block_toeplitz, pad_edges_to_len, pad_edges_to_shape, penalty_template_1d,
    regularized_normal, solve_regularized, toeplitz,
};

type TestBackend = NdArray;

fn values<const D: usize>(t: Tensor<TestBackend, D>) -> Vec<f32> {
    t.to_data().to_vec().unwrap()
}

// =============================================================================
// Operators
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn toeplitz_matches_host_reference(
        signal in prop::collection::vec(-5.0f32..5.0, 1..10),
    ) {
        let device = Default::default();
        let tensor = Tensor::<TestBackend, 1>::from_data(signal.as_slice(), &device);

        let op = toeplitz(tensor, &device).unwrap();
        let h = signal.len();
        prop_assert_eq!(op.dims(), [2 * h - 1, h]);
        prop_assert_eq!(values(op), awi_core::toeplitz(&signal).unwrap());
    }

    #[test]
    fn doubly_block_matches_host_reference(
        h in 1usize..5,
        w in 1usize..5,
        seed in prop::collection::vec(-5.0f32..5.0, 16),
    ) {
        let device = Default::default();
        let image: Vec<f32> = seed[..h * w].to_vec();
        let tensor = Tensor::<TestBackend, 1>::from_data(image.as_slice(), &device).reshape([h, w]);

        let op = doubly_block_toeplitz(tensor, &device).unwrap();
        prop_assert_eq!(op.dims(), [(2 * h - 1) * (2 * w - 1), h * w]);
        prop_assert_eq!(values(op), awi_core::doubly_block_toeplitz(&image, h, w).unwrap());
    }
}

// =============================================================================
// Padding
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn padded_signal_sits_at_edge_pad_offset(
        signal in prop::collection::vec(-5.0f32..5.0, 1..10),
        grow in 0usize..7,
    ) {
        let device = Default::default();
        let len = signal.len();
        let tensor = Tensor::<TestBackend, 1>::from_data(signal.as_slice(), &device);

        let padded = values(pad_edges_to_len(tensor, len + grow, 0.0, &device).unwrap());
        let pad = awi_core::EdgePad::to_len(len, len + grow).unwrap();

        prop_assert_eq!(padded.len(), len + grow);
        prop_assert!(padded[..pad.lead].iter().all(|v| *v == 0.0));
        prop_assert_eq!(&padded[pad.lead..pad.lead + len], signal.as_slice());
        prop_assert!(padded[pad.lead + len..].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn padded_image_keeps_every_pixel(
        h in 1usize..5,
        w in 1usize..5,
        grow_h in 0usize..4,
        grow_w in 0usize..4,
    ) {
        let device = Default::default();
        let image: Vec<f32> = (0..h * w).map(|i| i as f32 + 1.0).collect();
        let tensor = Tensor::<TestBackend, 1>::from_data(image.as_slice(), &device).reshape([h, w]);
        let shape = [h + grow_h, w + grow_w];

        let padded = values(pad_edges_to_shape(tensor, shape, 0.0, &device).unwrap());
        let pad = awi_core::EdgePad2d::to_shape([h, w], shape).unwrap();

        prop_assert_eq!(padded.len(), shape[0] * shape[1]);
        for r in 0..h {
            for c in 0..w {
                let at = (r + pad.rows.lead) * shape[1] + c + pad.cols.lead;
                prop_assert_eq!(padded[at], image[r * w + c]);
            }
        }
        let total: f32 = padded.iter().sum();
        let expected: f32 = image.iter().sum();
        prop_assert_eq!(total, expected);
    }
}

// =============================================================================
// Solver
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// `M w = Z^T d` holds for the returned filter.
    #[test]
    fn solve_satisfies_normal_equations(
        signal in prop::collection::vec(0.5f32..2.0, 2..6),
        rhs_seed in prop::collection::vec(-1.0f32..1.0, 11),
        epsilon in 0.1f64..1.0,
    ) {
        let device = Default::default();
        let h = signal.len();
        let rows = 2 * h - 1;
        let op = toeplitz(
            Tensor::<TestBackend, 1>::from_data(signal.as_slice(), &device),
            &device,
        )
        .unwrap();
        let rhs = Tensor::<TestBackend, 1>::from_data(&rhs_seed[..rows], &device);

        let w = solve_regularized(op.clone(), rhs.clone(), 0.1, epsilon).unwrap();
        let lhs = regularized_normal(op.clone(), 0.1, epsilon).matmul(w.reshape([h, 1]));
        let expected = op.transpose().matmul(rhs.reshape([rows, 1]));

        for (a, b) in values(lhs).iter().zip(values(expected)) {
            prop_assert!((a - b).abs() < 1e-2 * (1.0 + b.abs()), "{} vs {}", a, b);
        }
    }

    #[test]
    fn template_tensor_stays_in_unit_range(len in 1usize..20, std in 0.1f32..5.0) {
        let device = Default::default();
        let template = values(penalty_template_1d::<TestBackend>(len, std, &device).unwrap());
        prop_assert_eq!(template.len(), len);
        prop_assert!(template.iter().all(|v| (-1e-6..=1.0 + 1e-6).contains(v)));
    }
}
