//! DQN program.
//!
//! With `--train 1` (default), the agent is trained online with [`Trainer`] and its
//! parameters are saved in `--model-dir`. With `--train 0`, the greedy policy is
//! evaluated over 100 episodes, optionally after loading weights with `--model`.
use crate::check_model_dims;
use anyhow::Result;
use clap::Parser;
use dojo_candle_agent::{
    dqn::{Dqn, DqnConfig},
    mlp::{Mlp, MlpConfig},
};
use dojo_classic_env::{ClassicEnv, ClassicEnvConfig};
use dojo_core::{
    record::{AggregateRecorder, NullRecorder},
    Agent, Configurable, DefaultEvaluator, Env as _, Evaluator as _, TerminalCondition,
    TrainStats, Trainer, TrainerConfig,
};
use dojo_tensorboard::TensorboardRecorder;
use log::info;
use std::{fs, path::Path};

type DqnAgent = Dqn<ClassicEnv, Mlp>;

/// The number of episodes in testing.
pub const N_TEST_EPISODES: usize = 100;

/// Train/test DQN agent in a classic-control environment
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct DqnArgs {
    /// Name of the environment
    #[arg(long, default_value = "CartPole-v0")]
    pub env: String,

    /// Render the environment (0 or 1)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
    pub render: u8,

    /// Train (1) or test (0) the agent
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=1))]
    pub train: u8,

    /// Weights file (or parameter directory) of the Q-network loaded for testing
    #[arg(long)]
    pub model: Option<String>,

    /// Directory where parameters are saved during training
    #[arg(long, default_value = "./model/dqn")]
    pub model_dir: String,

    /// YAML file of the agent configuration
    #[arg(long)]
    pub config: Option<String>,

    /// Directory of TensorBoard event files
    #[arg(long)]
    pub logdir: Option<String>,

    /// The number of training episodes
    #[arg(long)]
    pub episodes: Option<usize>,

    /// Random seed of the environment
    #[arg(long, default_value_t = 0)]
    pub seed: i64,

    /// The maximum number of environment steps in training [default: 1000000]
    #[arg(long)]
    pub max_env_steps: Option<usize>,
}

/// Reaching the flag of MountainCar is detected on the position of the car.
pub fn terminal_condition(env_name: &str) -> TerminalCondition {
    match env_name.starts_with("MountainCar") {
        true => TerminalCondition::ObsThreshold {
            index: 0,
            threshold: 0.5,
        },
        false => TerminalCondition::EnvFlag,
    }
}

/// Configuration of the environment with its registered time limit.
pub fn env_config(args: &DqnArgs) -> ClassicEnvConfig {
    ClassicEnvConfig::default().name(args.env.clone())
}

/// Configuration of the environment in training.
///
/// With [`TerminalCondition::ObsThreshold`], episodes end only at the threshold,
/// so the time limit is removed and `max_env_steps` of the trainer bounds them.
pub fn train_env_config(args: &DqnArgs) -> ClassicEnvConfig {
    let config = env_config(args);
    match terminal_condition(&args.env) {
        TerminalCondition::ObsThreshold { .. } => config.max_steps(Some(usize::MAX)),
        TerminalCondition::EnvFlag => config,
    }
}

/// Loads the agent configuration from `--config`, or uses the defaults with
/// a single linear layer from observations to action values.
pub fn agent_config(args: &DqnArgs, obs_dim: usize, n_actions: usize) -> Result<DqnConfig<Mlp>> {
    let config = match &args.config {
        Some(path) => {
            info!("Load agent configuration from {}", path);
            DqnConfig::load(path)?
        }
        None => DqnConfig::default().q_config(MlpConfig::new(obs_dim, vec![], n_actions)),
    };
    if let Some(q_config) = config.model_config.get_q_config() {
        check_model_dims(q_config, obs_dim, n_actions)?;
    }
    Ok(config)
}

/// Configuration of the trainer from the command line.
pub fn trainer_config(args: &DqnArgs) -> TrainerConfig {
    let mut config = TrainerConfig::default()
        .terminal(terminal_condition(&args.env))
        .render(args.render == 1)
        .seed(args.seed)
        .model_dir(args.model_dir.clone());
    if let Some(n) = args.episodes {
        config = config.n_episodes(n);
    }
    if let Some(n) = args.max_env_steps {
        config = config.max_env_steps(n);
    }
    config
}

fn create_recorder(args: &DqnArgs) -> Box<dyn AggregateRecorder> {
    match &args.logdir {
        Some(logdir) => Box::new(TensorboardRecorder::new(logdir)),
        None => Box::new(NullRecorder::new()),
    }
}

fn env_dims(env_config: &ClassicEnvConfig, seed: i64) -> Result<(usize, usize)> {
    let env = ClassicEnv::build(env_config, seed)?;
    Ok((env.observation_dim(), env.n_actions()))
}

/// Trains the agent. The configurations are saved in the model directory.
pub fn train(args: &DqnArgs) -> Result<TrainStats> {
    let env_config = train_env_config(args);
    let (obs_dim, n_actions) = env_dims(&env_config, args.seed)?;
    let agent_config = agent_config(args, obs_dim, n_actions)?;
    let trainer_config = trainer_config(args);

    fs::create_dir_all(&args.model_dir)?;
    agent_config.save(Path::new(&args.model_dir).join("agent.yaml"))?;
    trainer_config.save(Path::new(&args.model_dir).join("trainer.yaml"))?;

    let mut agent = DqnAgent::build(agent_config)?;
    let mut recorder = create_recorder(args);
    let mut trainer = Trainer::<ClassicEnv>::build(trainer_config, env_config);
    let stats = trainer.train(&mut agent, &mut recorder)?;

    info!(
        "Finished training: episodes = {}, env_steps = {}, max_return = {}, avg_return = {}",
        stats.n_episodes, stats.env_steps, stats.max_return, stats.avg_return
    );
    Ok(stats)
}

/// Evaluates the greedy policy, returning the mean and the standard deviation of episode returns.
pub fn test(args: &DqnArgs) -> Result<(f32, f32)> {
    let env_config = env_config(args);
    let (obs_dim, n_actions) = env_dims(&env_config, args.seed)?;
    let mut agent = DqnAgent::build(agent_config(args, obs_dim, n_actions)?)?;

    if let Some(model) = &args.model {
        let path = Path::new(model);
        match path.is_dir() {
            true => agent.load_params(path)?,
            false => agent.load_model(path)?,
        }
        info!("Loaded the model from {}", model);
    }
    agent.eval();

    let mut evaluator = DefaultEvaluator::<ClassicEnv>::new(&env_config, args.seed, N_TEST_EPISODES)?
        .render(args.render == 1);
    let record = evaluator.evaluate(&mut agent)?;
    let mean = record.get_scalar("Episode return")?;
    let std = record.get_scalar("Episode return std")?;
    info!("Test: average return = {}, std = {}", mean, std);

    Ok((mean, std))
}

/// Entry point of the DQN program, training or testing by `--train`.
pub fn run(args: &DqnArgs) -> Result<()> {
    match args.train {
        1 => {
            train(args)?;
        }
        _ => {
            test(args)?;
        }
    }
    Ok(())
}
