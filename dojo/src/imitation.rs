//! Behavioral cloning of an expert Q-network.
//!
//! The expert is a network whose configuration is a JSON file of [`MlpConfig`] and
//! whose weights are a safetensors file, e.g., `qnet.json` and `qnet.safetensors`
//! saved by the DQN program. A second network with the same configuration is fitted
//! to the expert's greedy actions on the episodes the expert generates.
use crate::check_model_dims;
use anyhow::Result;
use clap::Parser;
use dojo_candle_agent::{
    bc::{Bc, BcConfig, BcModelConfig},
    mlp::{Mlp, MlpConfig},
    opt::OptimizerConfig,
    util::OutDim,
};
use dojo_classic_env::{ClassicEnv, ClassicEnvConfig};
use dojo_core::{
    returns_mean_std,
    util::{generate_episode, one_hot, Episode},
    Configurable, Env, Policy,
};
use log::info;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

type BcAgent = Bc<ClassicEnv, Mlp>;

/// Clone an expert policy with behavioral cloning
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct ImitationArgs {
    /// JSON file of the network configuration
    #[arg(long, default_value = "CartPole-v1-config.json")]
    pub model_config_path: String,

    /// Safetensors file of the expert weights
    #[arg(long, default_value = "CartPole-v1-weights.safetensors")]
    pub expert_weights_path: String,

    /// Render the environment
    #[arg(long, conflicts_with = "no_render")]
    pub render: bool,

    /// Do not render the environment (default)
    #[arg(long)]
    pub no_render: bool,

    /// Name of the environment
    #[arg(long, default_value = "CartPole-v1")]
    pub env: String,

    /// The number of expert episodes to train on
    #[arg(long, default_value_t = 10)]
    pub episodes: usize,

    /// The number of epochs per episode [default: the agent configuration, 50]
    #[arg(long)]
    pub epochs: Option<usize>,

    /// Directory of the outputs
    #[arg(long, default_value = "behaviour_cloning")]
    pub out_dir: String,

    /// Evaluate the expert as well
    #[arg(long)]
    pub test_expert: bool,

    /// Random seed
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

/// Options of [`Imitation`].
#[derive(Debug, Clone, PartialEq)]
pub struct ImitationOpts {
    /// Directory where diagrams, parameters and the accuracy log are written.
    pub out_dir: PathBuf,

    /// Learning rate of the cloned model.
    pub lr: f64,

    /// Mini-batch size.
    pub batch_size: usize,

    /// Seed of the shuffling of samples.
    pub seed: u64,
}

impl Default for ImitationOpts {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("behaviour_cloning"),
            lr: 5e-4,
            batch_size: 32,
            seed: 0,
        }
    }
}

impl ImitationOpts {
    /// Sets the output directory.
    pub fn out_dir(mut self, v: impl Into<PathBuf>) -> Self {
        self.out_dir = v.into();
        self
    }

    /// Sets the learning rate of the cloned model.
    pub fn lr(mut self, v: f64) -> Self {
        self.lr = v;
        self
    }

    /// Sets the mini-batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the seed of the shuffling of samples.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }
}

fn bc_config(mlp_config: MlpConfig, opts: &ImitationOpts) -> BcConfig<Mlp> {
    let model_config = BcModelConfig::default()
        .policy_model_config(mlp_config)
        .opt_config(OptimizerConfig::Adam { lr: opts.lr });
    BcConfig::default()
        .policy_model_config(model_config)
        .batch_size(opts.batch_size)
        .seed(opts.seed)
}

/// Graphviz description of the layers of a network.
pub fn model_dot(name: &str, config: &MlpConfig) -> String {
    let dims = config.dims();
    let mut dot = format!("digraph {} {{\n    rankdir=TB;\n    node [shape=box];\n", name);
    dot += &format!("    input [label=\"input: {}\"];\n", dims[0]);

    let mut prev = "input".to_string();
    for (i, act) in config.layer_activations().iter().enumerate() {
        let node = format!("ln{}", i);
        dot += &format!(
            "    {} [label=\"{}: dense {} to {}, {:?}\"];\n",
            node,
            node,
            dims[i],
            dims[i + 1],
            act
        );
        dot += &format!("    {} -> {};\n", prev, node);
        prev = node;
    }

    dot += "}\n";
    dot
}

/// Appends a line `"\n{episodes} {acc} std: {std} mean: {mean}"` to the file.
pub fn append_accuracy_log(
    path: impl AsRef<Path>,
    episodes: usize,
    acc: f32,
    std: f32,
    mean: f32,
) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    write!(file, "\n{} {} std: {} mean: {}", episodes, acc, std, mean)?;
    Ok(())
}

fn evaluate<P: Policy<ClassicEnv>>(
    policy: &mut P,
    env: &mut ClassicEnv,
    n_actions: usize,
    num_episodes: usize,
) -> Result<(f32, f32)> {
    let mut returns = Vec::with_capacity(num_episodes);
    for _ in 0..num_episodes {
        returns.push(generate_episode(env, policy, n_actions, false)?.total_reward());
    }
    let (mean, std) = returns_mean_std(&returns);
    Ok((std, mean))
}

/// Trains a network to imitate the greedy actions of an expert network.
pub struct Imitation {
    expert: BcAgent,
    model: BcAgent,
    model_config: MlpConfig,
    out_dir: PathBuf,
}

impl Imitation {
    /// Builds the expert from the configuration and weights files, and a freshly
    /// initialized model with the same configuration.
    ///
    /// Diagrams of both networks are written as `imitation_expert_model.dot` and
    /// `imitation_model.dot` in the output directory.
    pub fn new(
        model_config_path: impl AsRef<Path>,
        expert_weights_path: impl AsRef<Path>,
        opts: ImitationOpts,
    ) -> Result<Self> {
        let model_config = MlpConfig::load(&model_config_path)?;
        let mut expert = BcAgent::build(bc_config(model_config.clone(), &opts))?;
        expert.load_weights(&expert_weights_path)?;
        info!("Loaded the expert from {:?}", expert_weights_path.as_ref());
        let model = BcAgent::build(bc_config(model_config.clone(), &opts))?;

        fs::create_dir_all(&opts.out_dir)?;
        fs::write(
            opts.out_dir.join("imitation_expert_model.dot"),
            model_dot("expert", &model_config),
        )?;
        fs::write(
            opts.out_dir.join("imitation_model.dot"),
            model_dot("model", &model_config),
        )?;

        Ok(Self {
            expert,
            model,
            model_config,
            out_dir: opts.out_dir,
        })
    }

    /// The number of actions of the networks.
    pub fn n_actions(&self) -> usize {
        self.model_config.get_out_dim()
    }

    /// The configuration of the networks.
    pub fn model_config(&self) -> &MlpConfig {
        &self.model_config
    }

    /// The cloned model.
    pub fn model(&self) -> &BcAgent {
        &self.model
    }

    /// The cloned model, e.g., to sample actions with it.
    pub fn model_mut(&mut self) -> &mut BcAgent {
        &mut self.model
    }

    /// The path of the accuracy log.
    pub fn accuracy_log_path(&self) -> PathBuf {
        self.out_dir.join("accuracy.txt")
    }

    /// One-hot encoding of an action.
    pub fn make_one_hot(n_actions: usize, action: usize) -> Result<Vec<f32>> {
        one_hot(n_actions, action)
    }

    /// Runs an episode with the expert.
    pub fn run_expert(&mut self, env: &mut ClassicEnv, render: bool) -> Result<Episode<ClassicEnv>> {
        let n_actions = self.n_actions();
        generate_episode(env, &mut self.expert, n_actions, render)
    }

    /// Runs an episode with the cloned model.
    pub fn run_model(&mut self, env: &mut ClassicEnv, render: bool) -> Result<Episode<ClassicEnv>> {
        let n_actions = self.n_actions();
        generate_episode(env, &mut self.model, n_actions, render)
    }

    /// Fits the model on `num_episodes` expert episodes, `num_epochs` epochs each.
    /// With `None`, the number of epochs of the agent configuration is used.
    ///
    /// The parameters of the model are saved in `(out_dir)/episode_(num_episodes)`.
    /// Returns the accuracy in the last epoch.
    pub fn train(
        &mut self,
        env: &mut ClassicEnv,
        num_episodes: usize,
        num_epochs: Option<usize>,
        render: bool,
    ) -> Result<f32> {
        let num_epochs = num_epochs.unwrap_or(self.model.n_epochs());
        let mut acc = 0f32;
        for i in 0..num_episodes {
            let episode = self.run_expert(env, render)?;
            let history = self.model.fit_episode(&episode, num_epochs)?;
            acc = history.acc.last().copied().unwrap_or(acc);
            info!("Episode: {}, Accuracy: {}", i + 1, acc);
        }

        let path = self.out_dir.join(format!("episode_{}", num_episodes));
        self.model.save_params(&path)?;
        Ok(acc)
    }

    /// Returns the standard deviation and the mean of the returns of the cloned model.
    pub fn test(&mut self, env: &mut ClassicEnv, num_episodes: usize) -> Result<(f32, f32)> {
        let n_actions = self.n_actions();
        evaluate(&mut self.model, env, n_actions, num_episodes)
    }

    /// Returns the standard deviation and the mean of the returns of the expert.
    pub fn test_expert(&mut self, env: &mut ClassicEnv, num_episodes: usize) -> Result<(f32, f32)> {
        let n_actions = self.n_actions();
        evaluate(&mut self.expert, env, n_actions, num_episodes)
    }
}

/// Entry point of the imitation program.
///
/// Fits the model, evaluates it on 50 episodes (and the expert on 100 with
/// `--test-expert`) and appends the result to the accuracy log.
pub fn run(args: &ImitationArgs) -> Result<()> {
    let opts = ImitationOpts::default()
        .out_dir(&args.out_dir)
        .seed(args.seed);
    let mut imitation = Imitation::new(&args.model_config_path, &args.expert_weights_path, opts)?;

    let env_config = ClassicEnvConfig::default().name(args.env.clone());
    let mut env = ClassicEnv::build(&env_config, args.seed as i64)?;
    check_model_dims(imitation.model_config(), env.observation_dim(), env.n_actions())?;

    let render = args.render && !args.no_render;
    let acc = imitation.train(&mut env, args.episodes, args.epochs, render)?;
    let (std, mean) = imitation.test(&mut env, 50)?;
    info!("Cloned model: mean = {}, std = {}", mean, std);

    if args.test_expert {
        let (std, mean) = imitation.test_expert(&mut env, 100)?;
        info!("Expert: mean = {}, std = {}", mean, std);
    }

    append_accuracy_log(imitation.accuracy_log_path(), args.episodes, acc, std, mean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = ImitationArgs::parse_from(["imitation"]);
        assert_eq!(args.env, "CartPole-v1");
        assert_eq!(args.episodes, 10);
        assert_eq!(args.epochs, None);
        assert_eq!(ImitationArgs::parse_from(["imitation", "--epochs", "5"]).epochs, Some(5));
        assert!(!args.render);
        assert!(ImitationArgs::try_parse_from(["imitation", "--render", "--no-render"]).is_err());
    }

    #[test]
    fn test_model_dot() {
        let dot = model_dot("model", &MlpConfig::new(4, vec![8], 2));
        assert!(dot.starts_with("digraph model {"));
        assert!(dot.contains("input -> ln0;"));
        assert!(dot.contains("ln0 -> ln1;"));
        assert!(dot.contains("dense 8 to 2, Linear"));
    }

    #[test]
    fn test_make_one_hot() {
        assert_eq!(Imitation::make_one_hot(3, 1).unwrap(), vec![0.0, 1.0, 0.0]);
        assert!(Imitation::make_one_hot(3, 3).is_err());
    }
}
