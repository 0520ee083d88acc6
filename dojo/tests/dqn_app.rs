use anyhow::Result;
use clap::Parser;
use dojo::dqn_app::{test, train, DqnArgs};
use dojo_candle_agent::{dqn::DqnConfig, mlp::Mlp};
use dojo_core::TrainerConfig;
use tempdir::TempDir;

fn args(model_dir: &str, extra: &[&str]) -> DqnArgs {
    let mut argv = vec!["dqn", "--model-dir", model_dir];
    argv.extend_from_slice(extra);
    DqnArgs::parse_from(argv)
}

#[test]
fn test_train_and_test_cartpole() -> Result<()> {
    let tmp_dir = TempDir::new("dqn_cartpole")?;
    let model_dir = tmp_dir.path().join("model");
    let model_dir = model_dir.to_str().unwrap();

    let stats = train(&args(model_dir, &["--episodes", "3"]))?;
    assert_eq!(stats.n_episodes, 3);
    assert!(stats.env_steps >= 3);
    assert!(stats.max_return >= 1.0);

    let model_dir_ = tmp_dir.path().join("model");
    assert!(model_dir_.join("final").join("qnet.safetensors").exists());
    assert!(model_dir_.join("final").join("qnet.json").exists());
    let agent_config = DqnConfig::<Mlp>::load(model_dir_.join("agent.yaml"))?;
    assert_eq!(agent_config.discount_factor, 1.0);
    let trainer_config = TrainerConfig::load(model_dir_.join("trainer.yaml"))?;
    assert_eq!(trainer_config.n_episodes, 3);

    let weights = model_dir_.join("final").join("qnet.safetensors");
    let (mean, std) = test(&args(
        model_dir,
        &["--train", "0", "--model", weights.to_str().unwrap()],
    ))?;
    assert!(mean >= 1.0);
    assert!(std >= 0.0);

    // A parameter directory is also accepted
    let params = model_dir_.join("final");
    test(&args(
        model_dir,
        &["--train", "0", "--model", params.to_str().unwrap()],
    ))?;
    Ok(())
}

#[test]
fn test_train_mountain_car_with_tensorboard() -> Result<()> {
    let tmp_dir = TempDir::new("dqn_mountain_car")?;
    let model_dir = tmp_dir.path().join("model");
    let logdir = tmp_dir.path().join("log");

    let stats = train(&args(
        model_dir.to_str().unwrap(),
        &[
            "--env",
            "MountainCar-v0",
            "--episodes",
            "1",
            "--max-env-steps",
            "300",
            "--logdir",
            logdir.to_str().unwrap(),
        ],
    ))?;
    // No time limit of 200 steps in training, only the bound of environment steps
    assert_eq!(stats.n_episodes, 1);
    assert!(stats.env_steps > 200);
    assert!(stats.env_steps <= 300);
    assert_eq!(stats.max_return, -(stats.env_steps as f32));
    assert!(logdir.exists());
    Ok(())
}

#[test]
fn test_mismatched_config_is_rejected() -> Result<()> {
    let tmp_dir = TempDir::new("dqn_config")?;
    let config_path = tmp_dir.path().join("agent.yaml");
    // The network of CartPole does not fit MountainCar
    DqnConfig::<Mlp>::default()
        .q_config(dojo_candle_agent::mlp::MlpConfig::new(4, vec![], 2))
        .save(&config_path)?;

    let model_dir = tmp_dir.path().join("model");
    let args = args(
        model_dir.to_str().unwrap(),
        &[
            "--env",
            "MountainCar-v0",
            "--config",
            config_path.to_str().unwrap(),
        ],
    );
    assert!(train(&args).is_err());
    Ok(())
}

#[test]
fn test_unknown_env() {
    let args = DqnArgs::parse_from(["dqn", "--env", "Pendulum-v1", "--train", "0"]);
    assert!(test(&args).is_err());
}
