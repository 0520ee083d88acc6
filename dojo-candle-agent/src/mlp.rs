//! Multilayer perceptron.
mod base;
mod config;
use anyhow::Result;
pub use base::Mlp;
use candle_core::{Tensor, D};
use candle_nn::{ops::softmax, Linear, Module};
pub use config::{Activation, MlpConfig, WeightInit};

impl Activation {
    /// Applies the activation function.
    pub fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        Ok(match self {
            Self::Linear => xs.clone(),
            Self::Relu => xs.relu()?,
            Self::Tanh => xs.tanh()?,
            Self::Softmax => softmax(xs, D::Minus1)?,
        })
    }
}

fn mlp_forward(
    xs: Tensor,
    layers: &[Linear],
    activation: &Activation,
    activation_out: &Activation,
) -> Result<Tensor> {
    let n_layers = layers.len();
    let mut xs = xs;

    for (i, layer) in layers.iter().enumerate() {
        xs = layer.forward(&xs)?;
        xs = match i + 1 == n_layers {
            false => activation.forward(&xs)?,
            true => activation_out.forward(&xs)?,
        };
    }

    Ok(xs)
}
