//! Configuration of behavior cloning (BC) agent.
use super::BcModelConfig;
use crate::{model::SubModel1, util::OutDim, Device};
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

/// Configuration of [`Bc`](super::Bc) agent.
///
/// `P` is the type parameter of the policy model.
#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct BcConfig<P>
where
    P: SubModel1<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
{
    /// Configuration of the policy model and its optimizer.
    pub policy_model_config: BcModelConfig<P::Config>,

    /// Mini-batch size.
    pub batch_size: usize,

    /// The number of epochs per episode.
    pub n_epochs: usize,

    /// Shuffles samples at every epoch.
    pub shuffle: bool,

    /// Device of the policy model.
    pub device: Option<Device>,

    /// Random seed of shuffling.
    pub seed: u64,

    /// Unused, keeps the type parameter.
    #[serde(skip)]
    pub phantom: PhantomData<P>,
}

impl<P> Clone for BcConfig<P>
where
    P: SubModel1<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
{
    fn clone(&self) -> Self {
        Self {
            policy_model_config: self.policy_model_config.clone(),
            batch_size: self.batch_size,
            n_epochs: self.n_epochs,
            shuffle: self.shuffle,
            device: self.device,
            seed: self.seed,
            phantom: PhantomData,
        }
    }
}

impl<P> Default for BcConfig<P>
where
    P: SubModel1<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
{
    fn default() -> Self {
        Self {
            policy_model_config: Default::default(),
            batch_size: 32,
            n_epochs: 50,
            shuffle: true,
            device: None,
            seed: 42,
            phantom: PhantomData,
        }
    }
}

impl<P> BcConfig<P>
where
    P: SubModel1<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
{
    /// Sets batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the number of epochs.
    pub fn n_epochs(mut self, v: usize) -> Self {
        self.n_epochs = v;
        self
    }

    /// Sets if samples are shuffled.
    pub fn shuffle(mut self, v: bool) -> Self {
        self.shuffle = v;
        self
    }

    /// Sets the configuration of the policy model.
    pub fn policy_model_config(mut self, policy_model_config: BcModelConfig<P::Config>) -> Self {
        self.policy_model_config = policy_model_config;
        self
    }

    /// Sets device.
    pub fn device(mut self, device: Device) -> Self {
        self.device = Some(device);
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Loads [`BcConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of BC agent from {:?}", path_);
        Ok(b)
    }

    /// Saves [`BcConfig`] to YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of BC agent into {:?}", path_);
        Ok(())
    }
}
