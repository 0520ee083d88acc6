//! Configuration of [`ClassicEnv`](crate::ClassicEnv).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`ClassicEnv`](crate::ClassicEnv).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClassicEnvConfig {
    /// Name of the environment, e.g., `CartPole-v0`.
    pub name: String,

    /// Time limit. If `None`, the limit of the named environment is used.
    pub max_steps: Option<usize>,

    /// Wait after rendering a frame in milliseconds.
    pub render_wait_millis: u64,
}

impl Default for ClassicEnvConfig {
    fn default() -> Self {
        Self {
            name: "CartPole-v0".to_string(),
            max_steps: None,
            render_wait_millis: 20,
        }
    }
}

impl ClassicEnvConfig {
    /// Sets the name of the environment.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the time limit.
    pub fn max_steps(mut self, v: Option<usize>) -> Self {
        self.max_steps = v;
        self
    }

    /// Sets the wait after rendering.
    pub fn render_wait_millis(mut self, v: u64) -> Self {
        self.render_wait_millis = v;
        self
    }

    /// Loads [`ClassicEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ClassicEnvConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
