//! Example: aligning a shifted pulse by gradient descent on the AWI loss.
//!
//! A Gaussian pulse is reconstructed with a lag of a few samples. Plain
//! gradient descent on the reconstruction, driven by the batched 1D AWI loss,
//! moves the filter energy back to zero lag. The loss and the filter peak are
//! printed as training progresses.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=info cargo run -p neural_awi --example fit_shifted_pulse
//! ```

use burn::backend::{Autodiff, NdArray};
use burn::prelude::*;
use burn::tensor::ElementConversion;

use neural_awi::{
    config::{AwiLossConfig, SingleAwiLossConfig},
    loss::{AwiLoss1d, SingleAwiArgs, SingleAwiLoss1d},
    Result,
};

type MyBackend = Autodiff<NdArray>;

const LEN: usize = 21;
const STEPS: usize = 200;
const LEARNING_RATE: f32 = 0.5;

fn pulse(shift: f32, device: &<MyBackend as Backend>::Device) -> Tensor<MyBackend, 2> {
    let centre = (LEN as f32 - 1.0) / 2.0 + shift;
    let data: Vec<f32> = (0..LEN)
        .map(|i| {
            let x = i as f32 - centre;
            (-x * x / 4.0).exp()
        })
        .collect();
    Tensor::<MyBackend, 1>::from_data(data.as_slice(), device).reshape([1, LEN])
}

/// Index and value of the largest filter tap.
fn peak(filter: Tensor<NdArray, 1>) -> (usize, f32) {
    let data: Vec<f32> = filter.to_data().to_vec().unwrap_or_default();
    data.iter()
        .copied()
        .enumerate()
        .fold((0, f32::MIN), |best, (i, v)| if v > best.1 { (i, v) } else { best })
}

fn main() -> Result<()> {
    env_logger::init();

    let device = Default::default();
    let target = pulse(0.0, &device);
    let mut recon = pulse(3.0, &device).require_grad();

    let loss = AwiLoss1d::new(AwiLossConfig::new().with_epsilon(1e-3))?;
    let mut monitor = SingleAwiLoss1d::<NdArray>::new(SingleAwiLossConfig::new());
    let args = SingleAwiArgs::new().with_epsilon(1e-3);

    println!("Fitting a pulse shifted by 3 samples ({} taps, zero lag at {})", LEN, LEN / 2);
    println!();

    for step in 0..=STEPS {
        let out = loss.forward(recon.clone(), target.clone())?;
        let value = out.loss.clone().into_scalar().elem::<f32>();

        if step % 25 == 0 {
            // The single-target loss keeps the target's solver between checks.
            let monitor_out = monitor.forward(recon.clone().inner(), target.clone().inner(), &args)?;
            let (lag, tap) = peak(monitor_out.filter);
            println!("  step {:>4}  loss {:.5}  filter peak at {:>2} ({:.3})", step, value, lag, tap);
        }
        if step == STEPS {
            break;
        }

        let grads = out.loss.backward();
        let Some(grad) = recon.grad(&grads) else {
            log::warn!("no gradient reached the reconstruction, stopping");
            break;
        };
        let updated = recon.clone().inner() - grad.mul_scalar(LEARNING_RATE);
        recon = Tensor::from_inner(updated).require_grad();
    }

    log::info!("solver built {} time(s) for the monitor", monitor.cache().builds());
    Ok(())
}
