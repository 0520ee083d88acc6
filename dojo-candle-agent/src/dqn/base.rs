//! DQN agent implemented with candle.
use super::{config::DqnConfig, explorer::EpsilonGreedy, model::DqnModel};
use crate::{
    model::SubModel1,
    util::{argmax, smooth_l1_loss, track, CriticLoss, OutDim},
};
use anyhow::Result;
use dojo_core::{
    error::DojoError,
    record::{Record, RecordValue},
    Agent, Configurable, Env, Policy, Transition,
};
use candle_core::{Device, Tensor};
use candle_nn::loss::mse;
use log::{debug, info};
use rand::{rngs::SmallRng, SeedableRng};
use serde::{de::DeserializeOwned, Serialize};
use std::{fs, marker::PhantomData, path::Path};

/// DQN agent implemented with candle.
///
/// The agent is updated with every transition as soon as it is observed.
/// The action taken at the next observation is decided in [`Agent::opt`]
/// with the epsilon-greedy explorer on the target network, and the same
/// action is used for the TD target:
///
/// `target = r + discount_factor * Q_tgt(o_t+1, a_t+1)`, or `r` if `o_t+1` is terminal.
///
/// The optimization step counter, the decay of epsilon and the target network
/// sync advance only on non-terminal transitions.
#[allow(clippy::upper_case_acronyms)]
pub struct Dqn<E, Q>
where
    E: Env,
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
{
    qnet: DqnModel<Q>,
    qnet_tgt: DqnModel<Q>,
    target_update_interval: usize,
    discount_factor: f64,
    tau: f64,
    explorer: EpsilonGreedy,
    critic_loss: CriticLoss,
    device: Device,
    n_opts: usize,
    train: bool,
    rng: SmallRng,
    phantom: PhantomData<E>,
}

impl<E, Q> Dqn<E, Q>
where
    E: Env,
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    E::Obs: TryInto<Tensor, Error = candle_core::Error>,
    E::Act: From<usize> + Into<usize>,
{
    fn obs_to_tensor(&self, obs: &E::Obs) -> Result<Tensor> {
        let obs: Tensor = obs.clone().try_into()?;
        Ok(obs.to_device(&self.device)?)
    }

    fn opt_(&mut self, transition: &Transition<E>) -> Result<(usize, Record)> {
        let obs = self.obs_to_tensor(&transition.obs)?;
        let next_obs = self.obs_to_tensor(&transition.next_obs)?;
        let q = self.qnet.forward(&obs)?;
        let q_next = self.qnet_tgt.forward(&next_obs)?.detach();

        let next_act = self.explorer.action(&q_next, &mut self.rng)?;
        let q_target = match transition.is_terminated {
            true => transition.reward,
            false => {
                let q_next: Vec<f32> = q_next.flatten_all()?.to_vec1()?;
                transition.reward + (self.discount_factor as f32) * q_next[next_act]
            }
        };

        let act: usize = transition.act.clone().into();
        let mut truth: Vec<f32> = q.detach().flatten_all()?.to_vec1()?;
        if act >= truth.len() {
            return Err(DojoError::InvalidAction {
                action: act,
                n_actions: truth.len(),
            }
            .into());
        }
        truth[act] = q_target;
        let truth = Tensor::from_vec(truth, q.dims(), &self.device)?;

        let loss = match self.critic_loss {
            CriticLoss::Mse => mse(&q, &truth)?,
            CriticLoss::SmoothL1 => smooth_l1_loss(&q, &truth)?,
        };
        self.qnet.backward_step(&loss)?;

        // A terminal transition ends the episode before the counters move
        if !transition.is_terminated {
            self.n_opts += 1;
            self.explorer.update(self.n_opts);
            if self.target_update_interval > 0 && self.n_opts % self.target_update_interval == 0 {
                track(self.qnet_tgt.get_varmap(), self.qnet.get_varmap(), self.tau)?;
            }
        }

        let epsilon = self.explorer.epsilon();
        debug!("n_opts = {}, epsilon = {}", self.n_opts, epsilon);
        let record = Record::from_slice(&[
            ("loss", RecordValue::Scalar(loss.to_scalar::<f32>()?)),
            ("q_target", RecordValue::Scalar(q_target)),
            ("epsilon", RecordValue::Scalar(epsilon as f32)),
        ]);

        Ok((next_act, record))
    }

    /// Returns the action values of the online network.
    pub fn q_values(&self, obs: &E::Obs) -> Result<Vec<f32>> {
        let obs = self.obs_to_tensor(obs)?;
        Ok(self.qnet.forward(&obs)?.flatten_all()?.to_vec1()?)
    }

    /// Returns the action values of the target network.
    pub fn target_q_values(&self, obs: &E::Obs) -> Result<Vec<f32>> {
        let obs = self.obs_to_tensor(obs)?;
        Ok(self.qnet_tgt.forward(&obs)?.flatten_all()?.to_vec1()?)
    }

    /// The current value of epsilon.
    pub fn epsilon(&self) -> f64 {
        self.explorer.epsilon()
    }

    /// The number of optimization steps.
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }

    /// Loads the weights of the online network from a file and copies them to the target network.
    pub fn load_model(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.qnet.load(&path)?;
        track(self.qnet_tgt.get_varmap(), self.qnet.get_varmap(), 1.0)?;
        Ok(())
    }

    /// Saves the weights of the online network in a file.
    pub fn save_model_weights(&self, path: impl AsRef<Path>) -> Result<()> {
        self.qnet.save(path)
    }
}

impl<E, Q> Policy<E> for Dqn<E, Q>
where
    E: Env,
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    E::Obs: TryInto<Tensor, Error = candle_core::Error>,
    E::Act: From<usize> + Into<usize>,
{
    /// In training mode, takes an epsilon-greedy action on the target network.
    /// Otherwise takes the greedy action on the online network.
    fn sample(&mut self, obs: &E::Obs) -> Result<E::Act> {
        let obs = self.obs_to_tensor(obs)?;
        let a = match self.train {
            true => {
                let q = self.qnet_tgt.forward(&obs)?;
                self.explorer.action(&q, &mut self.rng)?
            }
            false => argmax(&self.qnet.forward(&obs)?)?[0],
        };
        Ok(a.into())
    }
}

impl<E, Q> Configurable for Dqn<E, Q>
where
    E: Env,
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    E::Obs: TryInto<Tensor, Error = candle_core::Error>,
    E::Act: From<usize> + Into<usize>,
{
    type Config = DqnConfig<Q>;

    /// Constructs DQN agent.
    ///
    /// The target network starts as a copy of the online network.
    fn build(config: Self::Config) -> Result<Self> {
        let device: Device = config.device.unwrap_or_default().try_into()?;
        let qnet = DqnModel::build(config.model_config.clone(), device.clone())?;
        let qnet_tgt = DqnModel::build(config.model_config, device.clone())?;
        track(qnet_tgt.get_varmap(), qnet.get_varmap(), 1.0)?;

        Ok(Dqn {
            qnet,
            qnet_tgt,
            target_update_interval: config.target_update_interval,
            discount_factor: config.discount_factor,
            tau: config.tau,
            explorer: config.explorer,
            critic_loss: config.critic_loss,
            device,
            n_opts: 0,
            train: false,
            rng: SmallRng::seed_from_u64(config.seed),
            phantom: PhantomData,
        })
    }
}

impl<E, Q> Agent<E> for Dqn<E, Q>
where
    E: Env,
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    E::Obs: TryInto<Tensor, Error = candle_core::Error>,
    E::Act: From<usize> + Into<usize>,
{
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn opt(&mut self, transition: &Transition<E>) -> Result<(E::Act, Record)> {
        let (next_act, record) = self.opt_(transition)?;
        Ok((next_act.into(), record))
    }

    /// Save model parameters in the given directory.
    ///
    /// The parameters of the online and target networks are saved as `qnet.safetensors`
    /// and `qnet_tgt.safetensors`. The configuration of the network is saved as `qnet.json`.
    fn save_params(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        self.qnet.save(path.join("qnet.safetensors"))?;
        self.qnet_tgt.save(path.join("qnet_tgt.safetensors"))?;
        fs::write(
            path.join("qnet.json"),
            serde_json::to_string(self.qnet.q_config())?,
        )?;
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.qnet.load(path.join("qnet.safetensors"))?;
        self.qnet_tgt.load(path.join("qnet_tgt.safetensors"))?;
        info!("Loaded DQN parameters from {:?}", path);
        Ok(())
    }
}
