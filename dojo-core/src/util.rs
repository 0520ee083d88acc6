//! Utilities for interaction of policies and environments.
use crate::{error::DojoError, Env, Policy};
use anyhow::Result;

/// Trajectory of a single episode.
///
/// `obs[t]` is the observation at which `acts[t]` was taken and `rewards[t]`
/// is the reward of that step. `one_hot_acts[t]` is `acts[t]` encoded as a
/// one-hot vector, the label used in behavioral cloning.
pub struct Episode<E: Env> {
    /// Observations.
    pub obs: Vec<E::Obs>,

    /// Actions.
    pub acts: Vec<E::Act>,

    /// One-hot encoded actions.
    pub one_hot_acts: Vec<Vec<f32>>,

    /// Rewards.
    pub rewards: Vec<f32>,
}

impl<E: Env> Episode<E> {
    /// The number of steps.
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    /// Returns `true` if the episode has no step.
    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    /// Sum of rewards.
    pub fn total_reward(&self) -> f32 {
        self.rewards.iter().sum()
    }
}

/// Returns a vector of length `n` with `1.0` at `index` and `0.0` elsewhere.
pub fn one_hot(n: usize, index: usize) -> Result<Vec<f32>> {
    if index >= n {
        return Err(DojoError::InvalidAction {
            action: index,
            n_actions: n,
        }
        .into());
    }
    let mut v = vec![0f32; n];
    v[index] = 1.0;
    Ok(v)
}

/// Runs an episode with the policy and collects the trajectory.
///
/// Actions are converted to indices for one-hot encoding with `n_actions` classes.
pub fn generate_episode<E, P>(
    env: &mut E,
    policy: &mut P,
    n_actions: usize,
    render: bool,
) -> Result<Episode<E>>
where
    E: Env,
    E::Act: Into<usize>,
    P: Policy<E>,
{
    let mut episode = Episode {
        obs: vec![],
        acts: vec![],
        one_hot_acts: vec![],
        rewards: vec![],
    };
    let mut obs = env.reset()?;

    loop {
        if render {
            env.render();
        }
        let act = policy.sample(&obs)?;
        episode.one_hot_acts.push(one_hot(n_actions, act.clone().into())?);
        let (step, _) = env.step(&act)?;
        episode.obs.push(obs);
        episode.acts.push(act);
        episode.rewards.push(step.reward);
        if step.is_done() {
            break;
        }
        obs = step.obs;
    }

    Ok(episode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dummy::{ConstantPolicy, DummyEnv, DummyEnvConfig, DummyObs};

    #[test]
    fn test_one_hot() -> Result<()> {
        for n in 1..5 {
            for i in 0..n {
                let v = one_hot(n, i)?;
                assert_eq!(v.len(), n);
                assert_eq!(v[i], 1.0);
                assert_eq!(v.iter().filter(|&&x| x == 1.0).count(), 1);
                assert_eq!(v.iter().sum::<f32>(), 1.0);
            }
        }
        assert!(one_hot(2, 2).is_err());
        assert!(one_hot(0, 0).is_err());
        Ok(())
    }

    #[test]
    fn test_generate_episode() -> Result<()> {
        let mut env = <DummyEnv as Env>::build(&DummyEnvConfig::default().length(3), 0)?;
        let mut policy = ConstantPolicy::new(1);
        let episode = generate_episode(&mut env, &mut policy, 2, false)?;

        assert_eq!(episode.len(), 3);
        assert_eq!(episode.total_reward(), -3.0);
        assert_eq!(
            episode.obs,
            vec![DummyObs(vec![0.0]), DummyObs(vec![1.0]), DummyObs(vec![2.0])]
        );
        assert!(episode.one_hot_acts.iter().all(|a| a == &vec![0.0, 1.0]));
        assert!(generate_episode(&mut env, &mut policy, 1, false).is_err());
        Ok(())
    }
}
