#![warn(missing_docs)]
//! Core traits and the training loop of dojo.
//!
//! The crate defines the entities that interact during training:
//! an environment ([`Env`]) emitting observations ([`Obs`]), a policy ([`Policy`])
//! mapping observations to actions ([`Act`]), and an agent ([`Agent`]) that updates
//! itself from single transitions ([`Transition`]). [`Trainer`] runs the online
//! training loop and [`DefaultEvaluator`] measures episode returns.
pub mod dummy;
pub mod error;
pub mod record;
pub mod util;

mod base;
pub use base::{Act, Agent, Configurable, Env, Info, Obs, Policy, Step, Transition};

mod evaluator;
pub use evaluator::{returns_mean_std, DefaultEvaluator, Evaluator};

mod trainer;
pub use trainer::{TerminalCondition, TrainStats, Trainer, TrainerConfig};
