//! Configuration of [`Trainer`](super::Trainer).
use super::TerminalCondition;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainerConfig {
    /// The number of training episodes.
    pub n_episodes: usize,

    /// The maximum number of environment steps. Training stops when reached.
    pub max_env_steps: usize,

    /// Interval of saving model parameters in environment steps.
    pub save_interval: usize,

    /// Interval of logging and flushing records in episodes.
    pub record_interval: usize,

    /// The number of recent episodes over which the average return is computed.
    pub avg_return_window: usize,

    /// How terminal states are detected.
    pub terminal: TerminalCondition,

    /// Renders the environment at every step.
    pub render: bool,

    /// Random seed of the environment.
    pub seed: i64,

    /// Where to save the trained model.
    pub model_dir: Option<String>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            n_episodes: 3000,
            max_env_steps: 1_000_000,
            save_interval: 1000,
            record_interval: 1,
            avg_return_window: 5,
            terminal: TerminalCondition::EnvFlag,
            render: false,
            seed: 0,
            model_dir: None,
        }
    }
}

impl TrainerConfig {
    /// Sets the number of training episodes.
    pub fn n_episodes(mut self, v: usize) -> Self {
        self.n_episodes = v;
        self
    }

    /// Sets the maximum number of environment steps.
    pub fn max_env_steps(mut self, v: usize) -> Self {
        self.max_env_steps = v;
        self
    }

    /// Sets the interval of saving in environment steps.
    pub fn save_interval(mut self, v: usize) -> Self {
        self.save_interval = v;
        self
    }

    /// Sets the interval of recording in episodes.
    pub fn record_interval(mut self, v: usize) -> Self {
        self.record_interval = v;
        self
    }

    /// Sets the window size of the average return.
    pub fn avg_return_window(mut self, v: usize) -> Self {
        self.avg_return_window = v;
        self
    }

    /// Sets the terminal condition.
    pub fn terminal(mut self, v: TerminalCondition) -> Self {
        self.terminal = v;
        self
    }

    /// Sets if the environment is rendered.
    pub fn render(mut self, v: bool) -> Self {
        self.render = v;
        self
    }

    /// Sets the random seed of the environment.
    pub fn seed(mut self, v: i64) -> Self {
        self.seed = v;
        self
    }

    /// Sets the directory the trained model being saved.
    pub fn model_dir<T: Into<String>>(mut self, model_dir: T) -> Self {
        self.model_dir = Some(model_dir.into());
        self
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
