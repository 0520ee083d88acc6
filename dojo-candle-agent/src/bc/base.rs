//! Behavior cloning (BC) agent implemented with candle.
use super::{BcConfig, BcModel};
use crate::{
    model::SubModel1,
    util::{argmax, obs_batch, OutDim, ProbOut},
};
use anyhow::Result;
use candle_core::{Device, Tensor, D};
use candle_nn::ops::log_softmax;
use dojo_core::{error::DojoError, util::Episode, Configurable, Env, Policy};
use log::{debug, info};
use rand::{rngs::SmallRng, seq::SliceRandom, SeedableRng};
use serde::{de::DeserializeOwned, Serialize};
use std::{fs, marker::PhantomData, path::Path};

/// Loss and accuracy at every epoch of [`Bc::fit`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FitHistory {
    /// Mean of the loss over samples.
    pub loss: Vec<f32>,

    /// Fraction of samples whose predicted action matches the label.
    pub acc: Vec<f32>,
}

/// Behavior cloning (BC) agent for discrete actions implemented with candle.
///
/// The policy model is trained by classification with the categorical
/// cross-entropy loss on one-hot labels. `P` is the type parameter of the
/// policy model.
pub struct Bc<E, P>
where
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + ProbOut + std::fmt::Debug + PartialEq + Clone,
{
    policy_model: BcModel<P>,
    batch_size: usize,
    n_epochs: usize,
    shuffle: bool,
    device: Device,
    rng: SmallRng,
    phantom: PhantomData<E>,
}

impl<E, P> Policy<E> for Bc<E, P>
where
    E: Env,
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + ProbOut + std::fmt::Debug + PartialEq + Clone,
    E::Obs: TryInto<Tensor, Error = candle_core::Error>,
    E::Act: From<usize>,
{
    /// Returns the action with the maximum output of the policy model.
    fn sample(&mut self, obs: &E::Obs) -> Result<E::Act> {
        let obs: Tensor = obs.clone().try_into()?;
        let a = self.policy_model.forward(&obs.to_device(&self.device)?)?.detach();
        Ok(argmax(&a)?[0].into())
    }
}

impl<E, P> Configurable for Bc<E, P>
where
    E: Env,
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + ProbOut + std::fmt::Debug + PartialEq + Clone,
{
    type Config = BcConfig<P>;

    /// Constructs BC agent.
    fn build(config: Self::Config) -> Result<Self> {
        let device: Device = config.device.unwrap_or_default().try_into()?;
        let policy_model = BcModel::build(config.policy_model_config, device.clone())?;

        Ok(Self {
            policy_model,
            batch_size: config.batch_size.max(1),
            n_epochs: config.n_epochs,
            shuffle: config.shuffle,
            device,
            rng: SmallRng::seed_from_u64(config.seed),
            phantom: PhantomData,
        })
    }
}

impl<E, P> Bc<E, P>
where
    E: Env,
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + ProbOut + std::fmt::Debug + PartialEq + Clone,
{
    /// Log-probabilities of actions.
    fn log_probs(&self, out: &Tensor) -> Result<Tensor> {
        match self.policy_model.policy_model_config().is_prob_out() {
            true => Ok(out.clamp(1e-7f32, 1f32)?.log()?),
            false => Ok(log_softmax(out, D::Minus1)?),
        }
    }

    /// Trains the policy model on labeled samples.
    ///
    /// * `obs` - observations of shape `[n_samples, obs_dim]`.
    /// * `labels` - one-hot actions of shape `[n_samples, n_actions]`.
    pub fn fit(&mut self, obs: &Tensor, labels: &Tensor, n_epochs: usize) -> Result<FitHistory> {
        let n_samples = obs.dims()[0];
        if n_samples == 0 {
            return Err(DojoError::EmptyBatch("no samples to fit".to_string()).into());
        }
        let n_actions = self.policy_model.out_dim();
        if labels.dims() != [n_samples, n_actions] {
            return Err(DojoError::ShapeMismatch {
                context: "labels of BC".to_string(),
                expected: n_samples * n_actions,
                actual: labels.elem_count(),
            }
            .into());
        }
        let obs = obs.to_device(&self.device)?;
        let labels = labels.to_device(&self.device)?;
        let mut history = FitHistory::default();

        for epoch in 0..n_epochs {
            let mut ixs = (0..n_samples as u32).collect::<Vec<_>>();
            if self.shuffle {
                ixs.shuffle(&mut self.rng);
            }
            let mut loss_sum = 0f32;
            let mut n_correct = 0usize;

            for batch_ixs in ixs.chunks(self.batch_size) {
                let ix = Tensor::from_slice(batch_ixs, batch_ixs.len(), &self.device)?;
                let x = obs.index_select(&ix, 0)?;
                let y = labels.index_select(&ix, 0)?;
                let out = self.policy_model.forward(&x)?;
                let loss = (&y * self.log_probs(&out)?)?
                    .sum(D::Minus1)?
                    .mean_all()?
                    .neg()?;
                self.policy_model.backward_step(&loss)?;

                loss_sum += loss.to_scalar::<f32>()? * batch_ixs.len() as f32;
                n_correct += argmax(&out)?
                    .iter()
                    .zip(argmax(&y)?.iter())
                    .filter(|(a, b)| a == b)
                    .count();
            }

            let loss = loss_sum / n_samples as f32;
            let acc = n_correct as f32 / n_samples as f32;
            debug!("Epoch {}, loss = {}, acc = {}", epoch, loss, acc);
            history.loss.push(loss);
            history.acc.push(acc);
        }

        Ok(history)
    }

    /// Trains the policy model on the observations and one-hot actions of an episode.
    pub fn fit_episode(&mut self, episode: &Episode<E>, n_epochs: usize) -> Result<FitHistory>
    where
        E::Obs: TryInto<Tensor, Error = candle_core::Error>,
    {
        if episode.is_empty() {
            return Err(DojoError::EmptyBatch("empty episode".to_string()).into());
        }
        let obs = obs_batch(&episode.obs, &self.device)?;
        let n_actions = episode.one_hot_acts[0].len();
        let labels = episode.one_hot_acts.concat();
        let labels = Tensor::from_vec(labels, (episode.len(), n_actions), &self.device)?;
        self.fit(&obs, &labels, n_epochs)
    }

    /// The number of epochs in the configuration.
    pub fn n_epochs(&self) -> usize {
        self.n_epochs
    }

    /// The policy model.
    pub fn policy_model(&self) -> &BcModel<P> {
        &self.policy_model
    }

    /// Loads the parameters of the policy model from a file.
    pub fn load_weights(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.policy_model.load(path)
    }

    /// Saves the parameters of the policy model in a file.
    pub fn save_weights(&self, path: impl AsRef<Path>) -> Result<()> {
        self.policy_model.save(path)
    }

    /// Save model parameters in the given directory.
    ///
    /// The parameters of the policy model are saved as `policy_model.safetensors`.
    pub fn save_params(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        self.policy_model
            .save(path.join("policy_model.safetensors"))?;
        info!("Saved BC parameters in {:?}", path);
        Ok(())
    }

    /// Load model parameters in the given directory.
    pub fn load_params(&mut self, path: &Path) -> Result<()> {
        self.policy_model
            .load(path.join("policy_model.safetensors"))?;
        Ok(())
    }
}
