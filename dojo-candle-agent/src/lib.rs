//! DQN and behavioral cloning agents implemented with [candle](https://crates.io/crates/candle-core).
//!
//! * [`dqn::Dqn`] - online DQN updated with a single transition per environment step
//! * [`bc::Bc`] - behavioral cloning of a discrete-action policy by classification
//! * [`mlp::Mlp`] - the feed-forward network used by both agents
pub mod bc;
pub mod dqn;
pub mod mlp;
pub mod model;
pub mod opt;
pub mod util;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq, Default)]
/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
pub enum Device {
    /// The main CPU device.
    #[default]
    Cpu,

    /// The main GPU device.
    Cuda(usize),
}

impl TryFrom<Device> for candle_core::Device {
    type Error = candle_core::Error;

    fn try_from(device: Device) -> Result<Self, Self::Error> {
        match device {
            Device::Cpu => Ok(candle_core::Device::Cpu),
            Device::Cuda(n) => candle_core::Device::new_cuda(n),
        }
    }
}
