//! Deterministic toy environment and agent used in tests.
//!
//! [`DummyEnv`] is a corridor of `length` cells. The agent starts at cell 0,
//! action 1 moves one cell to the right and action 0 stays. Every step gives
//! reward -1 and the episode terminates at the last cell.
use crate::{
    record::{Record, RecordValue},
    Act, Agent, Env, Info, Obs, Policy, Step, Transition,
};
use anyhow::Result;
use std::{fs, path::Path};

/// Dummy observation, the position of the agent.
#[derive(Clone, Debug, PartialEq)]
pub struct DummyObs(pub Vec<f32>);

impl Obs for DummyObs {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn value_at(&self, ix: usize) -> Option<f32> {
        self.0.get(ix).copied()
    }
}

/// Dummy action.
#[derive(Clone, Debug, PartialEq)]
pub struct DummyAct(pub usize);

impl Act for DummyAct {}

impl From<DummyAct> for usize {
    fn from(act: DummyAct) -> Self {
        act.0
    }
}

/// Dummy info.
#[derive(Clone, Debug)]
pub struct DummyInfo;

impl Info for DummyInfo {}

/// Configuration of [`DummyEnv`].
#[derive(Clone, Debug)]
pub struct DummyEnvConfig {
    /// The number of steps to the goal.
    pub length: usize,

    /// Time limit.
    pub max_steps: usize,
}

impl Default for DummyEnvConfig {
    fn default() -> Self {
        Self {
            length: 5,
            max_steps: 20,
        }
    }
}

impl DummyEnvConfig {
    /// Sets the number of steps to the goal.
    pub fn length(mut self, v: usize) -> Self {
        self.length = v;
        self
    }

    /// Sets the time limit.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }
}

/// Dummy env.
pub struct DummyEnv {
    config: DummyEnvConfig,
    pos: usize,
    steps: usize,
}

impl DummyEnv {
    fn obs(&self) -> DummyObs {
        DummyObs(vec![self.pos as f32])
    }
}

impl Env for DummyEnv {
    type Config = DummyEnvConfig;
    type Act = DummyAct;
    type Obs = DummyObs;
    type Info = DummyInfo;

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            pos: 0,
            steps: 0,
        })
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        if a.0 == 1 {
            self.pos += 1;
        }
        self.steps += 1;
        let is_terminated = self.pos >= self.config.length;
        let is_truncated = !is_terminated && self.steps >= self.config.max_steps;
        let step = Step::new(
            self.obs(),
            a.clone(),
            -1.0,
            is_terminated,
            is_truncated,
            DummyInfo,
        );
        Ok((step, Record::empty()))
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.pos = 0;
        self.steps = 0;
        Ok(self.obs())
    }

    fn reset_with_index(&mut self, _ix: usize) -> Result<Self::Obs> {
        self.reset()
    }
}

/// A policy always taking the same action.
pub struct ConstantPolicy {
    act: usize,
}

impl ConstantPolicy {
    /// Constructs the policy.
    pub fn new(act: usize) -> Self {
        Self { act }
    }
}

impl Policy<DummyEnv> for ConstantPolicy {
    fn sample(&mut self, _obs: &DummyObs) -> Result<DummyAct> {
        Ok(DummyAct(self.act))
    }
}

/// An agent taking the same action and counting optimization steps.
pub struct DummyAgent {
    act: usize,
    train: bool,

    /// The number of calls of [`Agent::opt`].
    pub n_opts: usize,

    /// The number of terminal transitions given to [`Agent::opt`].
    pub n_terminal: usize,
}

impl DummyAgent {
    /// Constructs the agent.
    pub fn new(act: usize) -> Self {
        Self {
            act,
            train: false,
            n_opts: 0,
            n_terminal: 0,
        }
    }
}

impl Policy<DummyEnv> for DummyAgent {
    fn sample(&mut self, _obs: &DummyObs) -> Result<DummyAct> {
        Ok(DummyAct(self.act))
    }
}

impl Agent<DummyEnv> for DummyAgent {
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn opt(&mut self, transition: &Transition<DummyEnv>) -> Result<(DummyAct, Record)> {
        self.n_opts += 1;
        if transition.is_terminated {
            self.n_terminal += 1;
        }
        let record = Record::from_slice(&[("loss", RecordValue::Scalar(self.n_opts as f32))]);
        Ok((DummyAct(self.act), record))
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        fs::write(path.join("n_opts.txt"), self.n_opts.to_string())?;
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.n_opts = fs::read_to_string(path.join("n_opts.txt"))?.trim().parse()?;
        Ok(())
    }
}
