//! Default implementation of the [`Evaluator`] trait.
use super::Evaluator;
use crate::{
    record::{Record, RecordValue},
    Env, Policy,
};
use anyhow::Result;
use log::debug;

/// Returns the mean and the standard deviation of episode returns.
///
/// The standard deviation is the population one, i.e., the sum of squared
/// deviations is divided by the number of samples. An empty slice gives `(0.0, 0.0)`.
pub fn returns_mean_std(returns: &[f32]) -> (f32, f32) {
    if returns.is_empty() {
        return (0.0, 0.0);
    }
    let n = returns.len() as f32;
    let mean = returns.iter().sum::<f32>() / n;
    let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f32>() / n;
    (mean, var.sqrt())
}

/// Runs a fixed number of episodes and computes statistics of the returns.
///
/// The returned [`Record`] has the following keys:
///
/// * `"Episode return"` - the mean of the episode returns
/// * `"Episode return std"` - the standard deviation of the episode returns
/// * `"Episode returns"` - all episode returns in [`RecordValue::Array1`]
///
/// ```ignore
/// let mut evaluator = DefaultEvaluator::<ClassicEnv>::new(&env_config, 42, 100)?;
/// let record = evaluator.evaluate(&mut agent)?;
/// println!("Average return: {}", record.get_scalar("Episode return")?);
/// ```
pub struct DefaultEvaluator<E: Env> {
    n_episodes: usize,
    render: bool,
    env: E,
}

impl<E: Env> Evaluator<E> for DefaultEvaluator<E> {
    fn evaluate<P>(&mut self, policy: &mut P) -> Result<Record>
    where
        P: Policy<E>,
    {
        let mut returns = Vec::with_capacity(self.n_episodes);

        for ix in 0..self.n_episodes {
            let mut prev_obs = self.env.reset_with_index(ix)?;
            let mut r_total = 0f32;

            loop {
                if self.render {
                    self.env.render();
                }
                let act = policy.sample(&prev_obs)?;
                let (step, _) = self.env.step(&act)?;
                r_total += step.reward;
                if step.is_done() {
                    break;
                }
                prev_obs = step.obs;
            }

            debug!("Evaluation episode {}, return = {}", ix, r_total);
            returns.push(r_total);
        }

        let (mean, std) = returns_mean_std(&returns);
        let mut record = Record::from_scalar("Episode return", mean);
        record.insert("Episode return std", RecordValue::Scalar(std));
        record.insert("Episode returns", RecordValue::Array1(returns));
        Ok(record)
    }
}

impl<E: Env> DefaultEvaluator<E> {
    /// Constructs [`DefaultEvaluator`] running `n_episodes` episodes.
    pub fn new(config: &E::Config, seed: i64, n_episodes: usize) -> Result<Self> {
        Ok(Self {
            n_episodes,
            render: false,
            env: E::build(config, seed)?,
        })
    }

    /// Renders the environment at every step.
    pub fn render(mut self, v: bool) -> Self {
        self.render = v;
        self
    }
}
