use anyhow::Result;
use dojo_candle_agent::{
    dqn::{Dqn, DqnConfig, EpsilonGreedy},
    mlp::{Mlp, MlpConfig},
};
use dojo_classic_env::{ClassicEnv, ClassicObs, DiscreteAct};
use dojo_core::{record::Record, Agent, Configurable, Policy, Transition};
use tempdir::TempDir;

type DqnAgent = Dqn<ClassicEnv, Mlp>;

fn config() -> DqnConfig<Mlp> {
    DqnConfig::default()
        .q_config(MlpConfig::new(4, vec![], 2))
        .discount_factor(0.9)
}

fn obs(v: [f32; 4]) -> ClassicObs {
    ClassicObs::from(v.to_vec())
}

fn transition(reward: f32, is_terminated: bool) -> Transition<ClassicEnv> {
    Transition {
        obs: obs([0.01, -0.02, 0.03, 0.04]),
        act: DiscreteAct(1),
        reward,
        next_obs: obs([0.02, 0.1, -0.05, 0.3]),
        is_terminated,
        is_truncated: false,
    }
}

fn max_abs_diff(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f32::max)
}

#[test]
fn test_terminal_target_is_reward() -> Result<()> {
    let mut agent = DqnAgent::build(config())?;
    agent.train();
    let (_, record) = agent.opt(&transition(1.0, true))?;
    assert_eq!(record.get_scalar("q_target")?, 1.0);
    assert!(record.get_scalar("loss")? >= 0.0);
    Ok(())
}

#[test]
fn test_non_terminal_target_bootstraps() -> Result<()> {
    let greedy = EpsilonGreedy::new().eps_start(0.0).eps_min(0.0);
    let mut agent = DqnAgent::build(config().explorer(greedy))?;
    agent.train();
    let t = transition(1.0, false);

    let q_next = agent.target_q_values(&t.next_obs)?;
    let best = if q_next[0] >= q_next[1] { 0 } else { 1 };
    let (next_act, record): (DiscreteAct, Record) = agent.opt(&t)?;

    assert_eq!(next_act, DiscreteAct(best));
    let expected = 1.0 + 0.9 * q_next[best];
    assert!((record.get_scalar("q_target")? - expected).abs() < 1e-5);
    Ok(())
}

#[test]
fn test_target_network_is_a_copy() -> Result<()> {
    let mut agent = DqnAgent::build(config().target_update_interval(2))?;
    agent.train();
    let o = obs([0.1, 0.2, -0.1, 0.0]);

    // Starts in sync
    assert_eq!(agent.q_values(&o)?, agent.target_q_values(&o)?);
    let tgt_before = agent.target_q_values(&o)?;

    // An update of the online network does not touch the target network
    agent.opt(&transition(1.0, false))?;
    assert_ne!(agent.q_values(&o)?, tgt_before);
    assert_eq!(agent.target_q_values(&o)?, tgt_before);

    // Synchronized at the second optimization step
    agent.opt(&transition(1.0, false))?;
    assert_eq!(agent.q_values(&o)?, agent.target_q_values(&o)?);

    // Later updates of the online network leave the copy unchanged
    let tgt = agent.target_q_values(&o)?;
    agent.opt(&transition(1.0, true))?;
    assert_eq!(agent.target_q_values(&o)?, tgt);
    Ok(())
}

#[test]
fn test_epsilon_decays_with_opt_steps() -> Result<()> {
    let explorer = EpsilonGreedy::new().decay_interval(2);
    let mut agent = DqnAgent::build(config().explorer(explorer))?;
    agent.train();
    assert_eq!(agent.epsilon(), 0.5);

    let (_, record) = agent.opt(&transition(1.0, false))?;
    assert_eq!(record.get_scalar("epsilon")?, 0.5);
    let (_, record) = agent.opt(&transition(1.0, false))?;
    assert!((record.get_scalar("epsilon")? - 0.495).abs() < 1e-6);
    assert_eq!(agent.n_opts(), 2);
    Ok(())
}

#[test]
fn test_terminal_transition_keeps_counters() -> Result<()> {
    let explorer = EpsilonGreedy::new().decay_interval(1);
    let mut agent = DqnAgent::build(config().explorer(explorer).target_update_interval(1))?;
    agent.train();
    let o = obs([0.1, 0.2, -0.1, 0.0]);
    let tgt_before = agent.target_q_values(&o)?;

    // The online network learns, the rest stays
    let (_, record) = agent.opt(&transition(1.0, true))?;
    assert_eq!(agent.n_opts(), 0);
    assert_eq!(record.get_scalar("epsilon")?, 0.5);
    assert_ne!(agent.q_values(&o)?, tgt_before);
    assert_eq!(agent.target_q_values(&o)?, tgt_before);

    agent.opt(&transition(1.0, false))?;
    assert_eq!(agent.n_opts(), 1);
    assert!((agent.epsilon() - 0.495).abs() < 1e-6);
    assert_eq!(agent.q_values(&o)?, agent.target_q_values(&o)?);
    Ok(())
}

#[test]
fn test_greedy_policy_in_eval_mode() -> Result<()> {
    let mut agent = DqnAgent::build(config())?;
    agent.eval();
    let o = obs([0.0, 0.5, 0.1, -0.5]);
    let q = agent.q_values(&o)?;
    let best = if q[0] >= q[1] { 0 } else { 1 };
    for _ in 0..10 {
        assert_eq!(agent.sample(&o)?, DiscreteAct(best));
    }
    Ok(())
}

#[test]
fn test_save_and_load_params() -> Result<()> {
    let dir = TempDir::new("dqn")?;
    let mut agent = DqnAgent::build(config())?;
    agent.train();
    agent.opt(&transition(1.0, false))?;
    agent.save_params(dir.path())?;
    assert!(dir.path().join("qnet.safetensors").exists());
    assert!(dir.path().join("qnet_tgt.safetensors").exists());
    assert_eq!(
        MlpConfig::load(dir.path().join("qnet.json"))?,
        MlpConfig::new(4, vec![], 2)
    );

    let o = obs([0.3, -0.2, 0.1, 0.0]);
    let mut agent2 = DqnAgent::build(config())?;
    agent2.load_params(dir.path())?;
    assert!(max_abs_diff(&agent.q_values(&o)?, &agent2.q_values(&o)?) < 1e-6);
    assert!(max_abs_diff(&agent.target_q_values(&o)?, &agent2.target_q_values(&o)?) < 1e-6);

    // A single weight file is loaded into both networks
    let path = dir.path().join("weights.safetensors");
    agent.save_model_weights(&path)?;
    let mut agent3 = DqnAgent::build(config())?;
    agent3.load_model(&path)?;
    assert!(max_abs_diff(&agent.q_values(&o)?, &agent3.q_values(&o)?) < 1e-6);
    assert!(max_abs_diff(&agent.q_values(&o)?, &agent3.target_q_values(&o)?) < 1e-6);
    Ok(())
}

#[test]
fn test_load_config_yaml() -> Result<()> {
    let dir = TempDir::new("dqn_config")?;
    let path = dir.path().join("dqn.yaml");
    let config = config().target_update_interval(10).tau(0.5);
    config.save(&path)?;

    let config_ = DqnConfig::<Mlp>::load(&path)?;
    assert_eq!(config_.target_update_interval, 10);
    assert_eq!(config_.tau, 0.5);
    assert_eq!(config_.discount_factor, 0.9);
    assert_eq!(config_.explorer, EpsilonGreedy::default());
    Ok(())
}
