//! Configuration of DQN agent.
use super::{DqnModelConfig, EpsilonGreedy};
use crate::{model::SubModel1, opt::OptimizerConfig, util::CriticLoss, util::OutDim, Device};
use anyhow::Result;
use candle_core::Tensor;
use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    marker::PhantomData,
    path::Path,
};

/// Configuration of [`Dqn`](super::Dqn) agent.
///
/// `Q` is the type parameter of the action-value function.
#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct DqnConfig<Q>
where
    Q: SubModel1<Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
{
    /// Configuration of the action-value function and its optimizer.
    pub model_config: DqnModelConfig<Q::Config>,

    /// Optimization steps between updates of the target network.
    pub target_update_interval: usize,

    /// Discount factor.
    pub discount_factor: f64,

    /// Coefficient of the target network update, `1.0` for a hard copy.
    pub tau: f64,

    /// Exploration strategy in training mode.
    pub explorer: EpsilonGreedy,

    /// Loss function.
    pub critic_loss: CriticLoss,

    /// Device of the networks.
    pub device: Option<Device>,

    /// Random seed of exploration.
    pub seed: u64,

    /// Unused, keeps the type parameter.
    #[serde(skip)]
    pub phantom: PhantomData<Q>,
}

impl<Q> Clone for DqnConfig<Q>
where
    Q: SubModel1<Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
{
    fn clone(&self) -> Self {
        Self {
            model_config: self.model_config.clone(),
            target_update_interval: self.target_update_interval,
            discount_factor: self.discount_factor,
            tau: self.tau,
            explorer: self.explorer.clone(),
            critic_loss: self.critic_loss.clone(),
            device: self.device,
            seed: self.seed,
            phantom: PhantomData,
        }
    }
}

impl<Q> Default for DqnConfig<Q>
where
    Q: SubModel1<Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
{
    /// Constructs DQN config with default parameters.
    fn default() -> Self {
        Self {
            model_config: DqnModelConfig::default().opt_config(OptimizerConfig::Adam { lr: 1e-4 }),
            target_update_interval: 1,
            discount_factor: 1.0,
            tau: 1.0,
            explorer: EpsilonGreedy::default(),
            critic_loss: CriticLoss::Mse,
            device: None,
            seed: 42,
            phantom: PhantomData,
        }
    }
}

impl<Q> DqnConfig<Q>
where
    Q: SubModel1<Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
{
    /// Sets the configuration of the action-value function.
    pub fn model_config(mut self, v: DqnModelConfig<Q::Config>) -> Self {
        self.model_config = v;
        self
    }

    /// Sets the configuration of the action-value function, keeping the optimizer.
    pub fn q_config(mut self, v: Q::Config) -> Self {
        self.model_config = self.model_config.q_config(v);
        self
    }

    /// Sets the interval of target network updates in optimization steps.
    pub fn target_update_interval(mut self, v: usize) -> Self {
        self.target_update_interval = v;
        self
    }

    /// Sets the discount factor.
    pub fn discount_factor(mut self, v: f64) -> Self {
        self.discount_factor = v;
        self
    }

    /// Sets the coefficient of the target network update.
    pub fn tau(mut self, v: f64) -> Self {
        self.tau = v;
        self
    }

    /// Sets the explorer.
    pub fn explorer(mut self, v: EpsilonGreedy) -> Self {
        self.explorer = v;
        self
    }

    /// Sets the loss function.
    pub fn critic_loss(mut self, v: CriticLoss) -> Self {
        self.critic_loss = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = Some(v);
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Loads [`DqnConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of DQN agent from {:?}", path_);
        Ok(b)
    }

    /// Saves [`DqnConfig`] to YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of DQN agent into {:?}", path_);
        Ok(())
    }
}
