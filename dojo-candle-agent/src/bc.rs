//! Behavioral cloning (BC) agent.
mod base;
mod config;
mod model;

pub use base::{Bc, FitHistory};
pub use config::BcConfig;
pub use model::{BcModel, BcModelConfig};
