//! Train [`Agent`].
mod config;
use crate::{
    record::{AggregateRecorder, Record, RecordValue::Scalar},
    Agent, Env, Obs, Step, Transition,
};
use anyhow::Result;
pub use config::TrainerConfig;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, path::Path};

/// Decides whether a transition ends at a terminal state.
///
/// With [`TerminalCondition::ObsThreshold`], a transition is terminal when
/// `next_obs[index] >= threshold`. For MountainCar, `index = 0` and
/// `threshold = 0.5` mean the car reached the flag.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum TerminalCondition {
    /// The `is_terminated` flag of the environment.
    EnvFlag,

    /// A threshold on an element of the next observation.
    ObsThreshold {
        /// Index of the element.
        index: usize,
        /// Threshold.
        threshold: f32,
    },
}

impl TerminalCondition {
    /// Returns `true` if the step reached a terminal state.
    pub fn is_terminal<E: Env>(&self, step: &Step<E>) -> bool {
        match self {
            Self::EnvFlag => step.is_terminated,
            Self::ObsThreshold { index, threshold } => step
                .obs
                .value_at(*index)
                .map_or(false, |v| v >= *threshold),
        }
    }
}

/// Statistics of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainStats {
    /// The number of finished episodes.
    pub n_episodes: usize,

    /// The number of environment steps.
    pub env_steps: usize,

    /// The maximum episode return, zero when no episode has finished.
    pub max_return: f32,

    /// The average return over the last episodes.
    pub avg_return: f32,
}

/// Manages the online training loop.
///
/// # Training loop
///
/// Every environment step is immediately followed by an optimization step
/// of the agent with the transition. There is no replay buffer.
///
/// 1. Build [`Env`] and set the agent to training mode.
/// 2. For each episode, reset [`Env`] and sample the first action.
/// 3. Apply the action, build a [`Transition`] and call [`Agent::opt`], which returns
///    the next action.
/// 4. `env_steps += 1`. If `env_steps % save_interval == 0`, the parameters are
///    saved in `(model_dir)/(env_steps)`.
/// 5. The episode ends at a terminal state decided by [`TerminalCondition`], at
///    truncation, or when `env_steps` reaches `max_env_steps`. `max_env_steps`
///    is the only bound of environments built without a time limit.
/// 6. Every `record_interval` episodes, the episode return and the average
///    return over the last `avg_return_window` episodes are logged and the
///    recorder is flushed.
///
/// After the loop, the parameters are saved in `(model_dir)/final`.
/// Without any episode, the returns in [`TrainStats`] are zero.
pub struct Trainer<E: Env> {
    env_config: E::Config,
    config: TrainerConfig,
}

impl<E: Env> Trainer<E> {
    /// Constructs a trainer.
    pub fn build(config: TrainerConfig, env_config: E::Config) -> Self {
        Self { env_config, config }
    }

    fn save_model<A: Agent<E>>(agent: &A, model_dir: &Path) {
        match agent.save_params(model_dir) {
            Ok(()) => info!("Saved the model in {:?}.", model_dir),
            Err(e) => warn!("Failed to save model in {:?}: {}", model_dir, e),
        }
    }

    /// Runs an episode, returning the episode return.
    fn train_episode<A: Agent<E>>(
        &self,
        env: &mut E,
        agent: &mut A,
        recorder: &mut Box<dyn AggregateRecorder>,
        env_steps: &mut usize,
    ) -> Result<f32> {
        let mut obs = env.reset()?;
        let mut act = agent.sample(&obs)?;
        let mut episode_return = 0f32;

        loop {
            if self.config.render {
                env.render();
            }
            let (step, record_env) = env.step(&act)?;
            episode_return += step.reward;
            let is_terminated = self.config.terminal.is_terminal(&step);
            let transition = Transition::from_step(obs, &step, is_terminated);
            let (next_act, record_agent) = agent.opt(&transition)?;
            *env_steps += 1;

            if self.config.save_interval > 0 && *env_steps % self.config.save_interval == 0 {
                if let Some(model_dir) = &self.config.model_dir {
                    let path = Path::new(model_dir).join(env_steps.to_string());
                    Self::save_model(agent, &path);
                }
            }

            if let Ok(eps) = record_agent.get_scalar("epsilon") {
                debug!("env_steps = {}, epsilon = {}", env_steps, eps);
            }
            let record = record_env.merge(record_agent);
            if !record.is_empty() {
                recorder.store(record);
            }

            if transition.is_done() || *env_steps >= self.config.max_env_steps {
                return Ok(episode_return);
            }
            obs = step.obs;
            act = next_act;
        }
    }

    /// Train the agent.
    pub fn train<A>(
        &mut self,
        agent: &mut A,
        recorder: &mut Box<dyn AggregateRecorder>,
    ) -> Result<TrainStats>
    where
        A: Agent<E>,
    {
        let mut env = E::build(&self.env_config, self.config.seed)?;
        let window = self.config.avg_return_window.max(1);
        let mut returns = VecDeque::with_capacity(window);
        let mut stats = TrainStats {
            n_episodes: 0,
            env_steps: 0,
            max_return: 0.0,
            avg_return: 0.0,
        };
        agent.train();

        for episode in 1..=self.config.n_episodes {
            let episode_return =
                self.train_episode(&mut env, agent, recorder, &mut stats.env_steps)?;
            stats.n_episodes = episode;
            stats.max_return = match episode {
                1 => episode_return,
                _ => stats.max_return.max(episode_return),
            };
            if returns.len() == window {
                returns.pop_front();
            }
            returns.push_back(episode_return);
            stats.avg_return = returns.iter().sum::<f32>() / returns.len() as f32;

            let mut record = Record::from_scalar("episode_return", episode_return);
            record.insert("avg_return", Scalar(stats.avg_return));
            recorder.store(record);

            if self.config.record_interval > 0 && episode % self.config.record_interval == 0 {
                info!(
                    "Episode: {}, env_steps: {}, return: {}, avg_return: {}, max_return: {}",
                    episode, stats.env_steps, episode_return, stats.avg_return, stats.max_return
                );
                recorder.flush(episode as _);
            }

            if stats.env_steps >= self.config.max_env_steps {
                info!("Reached the maximum number of environment steps");
                break;
            }
        }

        if let Some(model_dir) = &self.config.model_dir {
            Self::save_model(agent, &Path::new(model_dir).join("final"));
        }

        Ok(stats)
    }
}
