//! Classic-control environment.
use crate::{CartPole, ClassicEnvConfig, ClassicObs, DiscreteAct, Dynamics, MountainCar};
use anyhow::Result;
use dojo_core::{error::DojoError, record::Record, Env, Step};
use log::trace;
use rand::{rngs::SmallRng, SeedableRng};
use std::{thread, time::Duration};

/// Returns the dynamics and the default time limit of the named environment.
fn make(name: &str) -> Result<(Box<dyn Dynamics>, usize)> {
    match name {
        "CartPole-v0" => Ok((Box::new(CartPole::default()), 200)),
        "CartPole-v1" => Ok((Box::new(CartPole::default()), 500)),
        "MountainCar-v0" => Ok((Box::new(MountainCar::default()), 200)),
        _ => Err(DojoError::UnknownEnv(name.to_string()).into()),
    }
}

/// A classic-control environment with a time limit.
///
/// An episode is truncated when the number of steps reaches the time limit
/// without reaching a terminal state.
pub struct ClassicEnv {
    name: String,
    dynamics: Box<dyn Dynamics>,
    rng: SmallRng,
    max_steps: usize,
    count_steps: usize,
    render_wait_millis: u64,
}

impl ClassicEnv {
    /// Names of the available environments.
    pub const NAMES: [&'static str; 3] = ["CartPole-v0", "CartPole-v1", "MountainCar-v0"];

    /// The name of the environment.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The dimension of observations.
    pub fn observation_dim(&self) -> usize {
        self.dynamics.obs_dim()
    }

    /// The number of discrete actions.
    pub fn n_actions(&self) -> usize {
        self.dynamics.n_actions()
    }

    /// The time limit.
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    fn obs(&self) -> ClassicObs {
        ClassicObs::from(self.dynamics.state())
    }
}

impl Env for ClassicEnv {
    type Config = ClassicEnvConfig;
    type Obs = ClassicObs;
    type Act = DiscreteAct;
    type Info = ();

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        let (dynamics, max_steps) = make(&config.name)?;
        Ok(Self {
            name: config.name.clone(),
            dynamics,
            rng: SmallRng::seed_from_u64(seed as u64),
            max_steps: config.max_steps.unwrap_or(max_steps),
            count_steps: 0,
            render_wait_millis: config.render_wait_millis,
        })
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        let n_actions = self.n_actions();
        if a.0 >= n_actions {
            return Err(DojoError::InvalidAction {
                action: a.0,
                n_actions,
            }
            .into());
        }

        let (reward, is_terminated) = self.dynamics.step(a.0);
        self.count_steps += 1;
        let is_truncated = !is_terminated && self.count_steps >= self.max_steps;
        let obs = self.obs();
        trace!("{}: step {}, obs = {:?}", self.name, self.count_steps, obs.0);

        let step = Step::new(obs, *a, reward, is_terminated, is_truncated, ());
        Ok((step, Record::empty()))
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.dynamics.reset(&mut self.rng);
        self.count_steps = 0;
        Ok(self.obs())
    }

    /// Resets the environment with a random number generator seeded by `ix`.
    fn reset_with_index(&mut self, ix: usize) -> Result<Self::Obs> {
        self.rng = SmallRng::seed_from_u64(ix as u64);
        self.reset()
    }

    fn render(&self) {
        println!("{}", self.dynamics.frame());
        if self.render_wait_millis > 0 {
            thread::sleep(Duration::from_millis(self.render_wait_millis));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dojo_core::Obs;

    #[test]
    fn test_build_known_envs() -> Result<()> {
        for (name, dim, n_actions, max_steps) in [
            ("CartPole-v0", 4, 2, 200),
            ("CartPole-v1", 4, 2, 500),
            ("MountainCar-v0", 2, 3, 200),
        ] {
            let mut env = ClassicEnv::build(&ClassicEnvConfig::default().name(name), 0)?;
            assert_eq!(env.observation_dim(), dim);
            assert_eq!(env.n_actions(), n_actions);
            assert_eq!(env.max_steps(), max_steps);
            assert_eq!(env.reset()?.len(), dim);
        }
        Ok(())
    }

    #[test]
    fn test_unknown_env() {
        let config = ClassicEnvConfig::default().name("LunarLander-v2");
        let err = ClassicEnv::build(&config, 0).err().unwrap();
        assert_eq!(
            err.downcast_ref::<DojoError>(),
            Some(&DojoError::UnknownEnv("LunarLander-v2".to_string()))
        );
    }

    #[test]
    fn test_invalid_action() -> Result<()> {
        let mut env = ClassicEnv::build(&ClassicEnvConfig::default(), 0)?;
        env.reset()?;
        assert!(env.step(&DiscreteAct(2)).is_err());
        Ok(())
    }

    #[test]
    fn test_reset_with_index_is_deterministic() -> Result<()> {
        let config = ClassicEnvConfig::default();
        let mut env1 = ClassicEnv::build(&config, 0)?;
        let mut env2 = ClassicEnv::build(&config, 1)?;
        assert_eq!(env1.reset_with_index(3)?, env2.reset_with_index(3)?);
        let obs = env1.reset_with_index(4)?;
        assert!(obs.0.iter().all(|v| v.abs() <= 0.05));
        Ok(())
    }

    #[test]
    fn test_mountain_car_truncation() -> Result<()> {
        let config = ClassicEnvConfig::default()
            .name("MountainCar-v0")
            .max_steps(Some(10));
        let mut env = ClassicEnv::build(&config, 0)?;
        let obs = env.reset()?;
        assert!(obs.0[0] >= -0.6 && obs.0[0] < -0.4);
        assert_eq!(obs.0[1], 0.0);

        for i in 1..=10 {
            let (step, _) = env.step(&DiscreteAct(1))?;
            assert_eq!(step.reward, -1.0);
            assert!(!step.is_terminated);
            assert_eq!(step.is_truncated, i == 10);
        }
        Ok(())
    }
}
