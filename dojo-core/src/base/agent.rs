//! Agent.
use super::{Env, Policy, Transition};
use crate::record::Record;
use anyhow::Result;
use std::path::Path;

/// Represents a policy trained online, one transition at a time.
pub trait Agent<E: Env>: Policy<E> {
    /// Set the policy to training mode.
    fn train(&mut self);

    /// Set the policy to evaluation mode.
    fn eval(&mut self);

    /// Return if it is in training mode.
    fn is_train(&self) -> bool;

    /// Performs an optimization step with the given transition.
    ///
    /// Returns the action to be taken at `transition.next_obs` together with
    /// a [`Record`] of values computed in the step. The action is decided within
    /// the update because the target value may depend on it.
    fn opt(&mut self, transition: &Transition<E>) -> Result<(E::Act, Record)>;

    /// Save the parameters of the agent in the given directory.
    ///
    /// This method commonly creates a number of files in the directory.
    /// For example, the DQN agent in `dojo-candle-agent` saves the online
    /// and the target Q-networks.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Load the parameters of the agent from the given directory.
    fn load_params(&mut self, path: &Path) -> Result<()>;
}
