use crate::{
    model::SubModel1,
    opt::{Optimizer, OptimizerConfig},
    util::OutDim,
};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`BcModel`].
///
/// The type parameter `C` is the configuration of the policy model, which outputs
/// a score or a probability for each action.
pub struct BcModelConfig<C>
where
    C: OutDim + Clone,
{
    /// Configuration of the policy model.
    pub policy_model_config: Option<C>,

    /// Configuration of the optimizer.
    #[serde(default = "default_opt_config")]
    pub opt_config: OptimizerConfig,
}

fn default_opt_config() -> OptimizerConfig {
    OptimizerConfig::Adam { lr: 5e-4 }
}

impl<C> Default for BcModelConfig<C>
where
    C: DeserializeOwned + Serialize + OutDim + Clone,
{
    fn default() -> Self {
        Self {
            policy_model_config: None,
            opt_config: default_opt_config(),
        }
    }
}

impl<C> BcModelConfig<C>
where
    C: DeserializeOwned + Serialize + OutDim + Clone,
{
    /// Sets configurations for the policy model.
    pub fn policy_model_config(mut self, v: C) -> Self {
        self.policy_model_config = Some(v);
        self
    }

    /// Sets optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Constructs [`BcModelConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`BcModelConfig`] to as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Policy model for behaviour cloning.
///
/// The model's architecture is specified by the type parameter `P`,
/// which must implement [`SubModel1`].
pub struct BcModel<P>
where
    P: SubModel1<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim,
{
    varmap: VarMap,

    /// Dimension of the output vector.
    out_dim: usize,

    /// Policy model.
    policy_model: P,

    /// Optimizer.
    opt: Optimizer,

    /// Policy model configuration.
    policy_model_config: P::Config,
}

impl<P> BcModel<P>
where
    P: SubModel1<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    /// Constructs [`BcModel`].
    pub fn build(config: BcModelConfig<P::Config>, device: Device) -> Result<Self> {
        let policy_model_config = config
            .policy_model_config
            .context("policy_model_config is not set.")?;
        let out_dim = policy_model_config.get_out_dim();
        let varmap = VarMap::new();

        // Build policy model
        let policy_model = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            P::build(vb, policy_model_config.clone())?
        };
        let opt = config.opt_config.build(varmap.all_vars())?;

        Ok(Self {
            varmap,
            out_dim,
            policy_model,
            opt,
            policy_model_config,
        })
    }

    /// Outputs action scores given observation(s).
    pub fn forward(&self, obs: &P::Input) -> Result<Tensor> {
        self.policy_model.forward(obs)
    }

    /// Updates the parameters with the gradient of `loss`.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        self.opt.backward_step(loss)
    }

    /// The number of actions.
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    /// The configuration of the policy model.
    pub fn policy_model_config(&self) -> &P::Config {
        &self.policy_model_config
    }

    /// Returns the variables of the model.
    pub fn get_varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Saves the parameters in safetensors format.
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.varmap.save(&path)?;
        info!("Save bc model to {:?}", path.as_ref());
        Ok(())
    }

    /// Loads the parameters from a safetensors file.
    pub fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.varmap.load(&path)?;
        info!("Load bc model from {:?}", path.as_ref());
        Ok(())
    }
}
