use crate::util::{OutDim, ProbOut};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Activation functions.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Identity.
    Linear,

    /// ReLU.
    Relu,

    /// Hyperbolic tangent.
    Tanh,

    /// Softmax over the last dimension.
    Softmax,
}

/// Initialization of the weights of linear layers.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum WeightInit {
    /// Uniform in `[-limit, limit]` with `limit = sqrt(6 / fan_in)`, zero bias.
    HeUniform,

    /// The default initialization of [`candle_nn::linear`].
    Default,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Mlp`](super::Mlp).
///
/// Stored as JSON, e.g.,
///
/// ```json
/// {"in_dim":4,"units":[],"out_dim":2,"activation":"relu","activation_out":"linear","init":"he_uniform"}
/// ```
///
/// With empty `units`, the network is a single linear layer from `in_dim` to `out_dim`.
pub struct MlpConfig {
    pub(super) in_dim: usize,
    pub(super) units: Vec<usize>,
    pub(super) out_dim: usize,
    #[serde(default = "default_activation")]
    pub(super) activation: Activation,
    #[serde(default = "default_activation_out")]
    pub(super) activation_out: Activation,
    #[serde(default = "default_init")]
    pub(super) init: WeightInit,
}

fn default_activation() -> Activation {
    Activation::Relu
}

fn default_activation_out() -> Activation {
    Activation::Linear
}

fn default_init() -> WeightInit {
    WeightInit::HeUniform
}

impl MlpConfig {
    /// Creates configuration of MLP with ReLU hidden layers, linear output
    /// and He-uniform initialization.
    pub fn new(in_dim: usize, units: Vec<usize>, out_dim: usize) -> Self {
        Self {
            in_dim,
            units,
            out_dim,
            activation: default_activation(),
            activation_out: default_activation_out(),
            init: default_init(),
        }
    }

    /// Sets the activation function of hidden layers.
    pub fn activation(mut self, v: Activation) -> Self {
        self.activation = v;
        self
    }

    /// Sets the activation function of the output layer.
    pub fn activation_out(mut self, v: Activation) -> Self {
        self.activation_out = v;
        self
    }

    /// Sets the weight initialization.
    pub fn init(mut self, v: WeightInit) -> Self {
        self.init = v;
        self
    }

    /// The input dimension.
    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    /// Dimensions of all layers from the input to the output.
    pub fn dims(&self) -> Vec<usize> {
        let mut dims = vec![self.in_dim];
        dims.extend(self.units.iter());
        dims.push(self.out_dim);
        dims
    }

    /// Activation functions applied after each linear layer.
    pub fn layer_activations(&self) -> Vec<Activation> {
        let mut acts = vec![self.activation; self.units.len()];
        acts.push(self.activation_out);
        acts
    }

    /// Loads [`MlpConfig`] from JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        Ok(serde_json::from_reader(rdr)?)
    }

    /// Saves [`MlpConfig`] as JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_json::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

impl OutDim for MlpConfig {
    fn get_out_dim(&self) -> usize {
        self.out_dim
    }
}

impl ProbOut for MlpConfig {
    fn is_prob_out(&self) -> bool {
        self.activation_out == Activation::Softmax
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_json_defaults() -> Result<()> {
        let config: MlpConfig = serde_json::from_str(r#"{"in_dim":2,"units":[],"out_dim":3}"#)?;
        assert_eq!(config, MlpConfig::new(2, vec![], 3));
        assert_eq!(config.dims(), vec![2, 3]);
        assert_eq!(config.layer_activations(), vec![Activation::Linear]);
        assert!(!config.is_prob_out());
        Ok(())
    }

    #[test]
    fn test_save_load() -> Result<()> {
        let config = MlpConfig::new(8, vec![64, 64], 4)
            .activation(Activation::Tanh)
            .activation_out(Activation::Softmax)
            .init(WeightInit::Default);
        let dir = TempDir::new("mlp_config")?;
        let path = dir.path().join("config.json");
        config.save(&path)?;
        assert_eq!(MlpConfig::load(&path)?, config);
        assert_eq!(
            config.layer_activations(),
            vec![Activation::Tanh, Activation::Tanh, Activation::Softmax]
        );
        assert!(config.is_prob_out());
        Ok(())
    }
}
