//! Exploration strategy of DQN.
use crate::util::argmax;
use anyhow::Result;
use candle_core::Tensor;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Epsilon-greedy explorer for DQN.
///
/// With probability `epsilon`, a uniformly random action is taken, otherwise
/// the action with the maximum value. `epsilon` starts from `eps_start` and
/// is multiplied by `decay` at every call of [`EpsilonGreedy::decay`], but never
/// goes below `eps_min`.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonGreedy {
    /// Initial value of epsilon.
    pub eps_start: f64,

    /// Lower bound of epsilon.
    pub eps_min: f64,

    /// Multiplicative decay, clamped to `(0, 1]`.
    pub decay: f64,

    /// Interval of decay in optimization steps.
    pub decay_interval: usize,

    #[serde(skip)]
    n_decays: usize,
}

impl Default for EpsilonGreedy {
    fn default() -> Self {
        Self {
            eps_start: 0.5,
            eps_min: 0.05,
            decay: 0.99,
            decay_interval: 250,
            n_decays: 0,
        }
    }
}

impl EpsilonGreedy {
    /// Constructs epsilon-greedy explorer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the epsilon value at the start.
    pub fn eps_start(mut self, v: f64) -> Self {
        self.eps_start = v;
        self
    }

    /// Set the lower bound of epsilon.
    pub fn eps_min(mut self, v: f64) -> Self {
        self.eps_min = v;
        self
    }

    /// Set the decay rate.
    pub fn decay(mut self, v: f64) -> Self {
        self.decay = v;
        self
    }

    /// Set the interval of decay in optimization steps.
    pub fn decay_interval(mut self, v: usize) -> Self {
        self.decay_interval = v;
        self
    }

    /// The current value of epsilon.
    pub fn epsilon(&self) -> f64 {
        let decay = self.decay.clamp(0.0, 1.0);
        let n = self.n_decays.min(i32::MAX as usize) as i32;
        (self.eps_start * decay.powi(n)).max(self.eps_min)
    }

    /// Decays epsilon once.
    pub fn decay_once(&mut self) {
        self.n_decays += 1;
    }

    /// Decays epsilon if `n_opts` is a multiple of the decay interval.
    pub fn update(&mut self, n_opts: usize) {
        if self.decay_interval > 0 && n_opts % self.decay_interval == 0 {
            self.decay_once();
        }
    }

    /// Takes an action based on action values of a single observation.
    ///
    /// * `q` - action values of shape `[1, n_actions]`.
    pub fn action(&self, q: &Tensor, rng: &mut impl Rng) -> Result<usize> {
        let n_actions = q.dims()[q.dims().len() - 1];
        if rng.gen::<f64>() < self.epsilon() {
            Ok(rng.gen_range(0..n_actions))
        } else {
            Ok(argmax(q)?[0])
        }
    }
}
