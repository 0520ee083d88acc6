//! DQN and behavioral cloning programs on classic-control environments.
//!
//! * [`dqn_app`] trains a DQN agent online, or tests a trained one, in an environment of
//!   [`dojo_classic_env`]. Run it with the `dqn` binary.
//! * [`imitation`] clones an expert Q-network into a policy network with behavioral cloning.
//!   Run it with the `imitation` binary.
//!
//! Both binaries log with [`env_logger`]; set `RUST_LOG` to change the level from `info`.
pub mod dqn_app;
pub mod imitation;

use anyhow::Result;
use dojo_candle_agent::{mlp::MlpConfig, util::OutDim};
use dojo_core::error::DojoError;

/// Checks that the network matches the observation and action spaces of an environment.
pub fn check_model_dims(config: &MlpConfig, obs_dim: usize, n_actions: usize) -> Result<()> {
    if config.in_dim() != obs_dim {
        return Err(DojoError::ShapeMismatch {
            context: "input of the network".to_string(),
            expected: obs_dim,
            actual: config.in_dim(),
        }
        .into());
    }
    if config.get_out_dim() != n_actions {
        return Err(DojoError::ShapeMismatch {
            context: "output of the network".to_string(),
            expected: n_actions,
            actual: config.get_out_dim(),
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_model_dims() {
        let config = MlpConfig::new(4, vec![], 2);
        assert!(check_model_dims(&config, 4, 2).is_ok());
        assert!(check_model_dims(&config, 2, 2).is_err());
        assert!(check_model_dims(&config, 4, 3).is_err());
    }
}
