//! Classic-control environments implemented in Rust.
//!
//! [`ClassicEnv`] implements [`Env`](dojo_core::Env) for the following environments:
//!
//! | name | actions | observation | time limit |
//! |---|---|---|---|
//! | `CartPole-v0` | 2 | `[x, x_dot, theta, theta_dot]` | 200 |
//! | `CartPole-v1` | 2 | `[x, x_dot, theta, theta_dot]` | 500 |
//! | `MountainCar-v0` | 3 | `[position, velocity]` | 200 |
//!
//! ```no_run
//! use dojo_classic_env::{ClassicEnv, ClassicEnvConfig, DiscreteAct};
//! use dojo_core::Env;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = ClassicEnvConfig::default().name("MountainCar-v0");
//! let mut env = ClassicEnv::build(&config, 42)?;
//! let obs = env.reset()?;
//! let (step, _) = env.step(&DiscreteAct(2))?;
//! # Ok(())
//! # }
//! ```
mod act;
mod cartpole;
mod config;
mod env;
mod mountain_car;
mod obs;
pub use act::DiscreteAct;
pub use cartpole::CartPole;
pub use config::ClassicEnvConfig;
pub use env::ClassicEnv;
pub use mountain_car::MountainCar;
pub use obs::ClassicObs;

#[cfg(feature = "candle")]
mod candle;

use rand::rngs::SmallRng;

/// Dynamics of a classic-control system.
pub trait Dynamics {
    /// Samples an initial state.
    fn reset(&mut self, rng: &mut SmallRng);

    /// Applies an action and returns the reward and whether a terminal state is reached.
    ///
    /// The action must be less than [`Dynamics::n_actions`].
    fn step(&mut self, act: usize) -> (f32, bool);

    /// The current state as an observation vector.
    fn state(&self) -> Vec<f32>;

    /// The number of discrete actions.
    fn n_actions(&self) -> usize;

    /// The dimension of observations.
    fn obs_dim(&self) -> usize;

    /// A one-line text image of the current state.
    fn frame(&self) -> String;
}

const FRAME_WIDTH: usize = 40;

/// Maps `v` in `[lo, hi]` to a column of a text frame.
fn column(v: f64, lo: f64, hi: f64) -> usize {
    let r = ((v - lo) / (hi - lo)).clamp(0.0, 1.0);
    ((FRAME_WIDTH - 1) as f64 * r).round() as usize
}
