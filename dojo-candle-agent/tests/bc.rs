use anyhow::Result;
use candle_core::{Device, Tensor};
use dojo_candle_agent::{
    bc::{Bc, BcConfig, BcModelConfig},
    mlp::{Activation, Mlp, MlpConfig},
    opt::OptimizerConfig,
};
use dojo_classic_env::{ClassicEnv, ClassicEnvConfig, ClassicObs, DiscreteAct};
use dojo_core::{util::generate_episode, Configurable, Env, Policy};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use tempdir::TempDir;

type BcAgent = Bc<ClassicEnv, Mlp>;

fn config(mlp_config: MlpConfig, lr: f64) -> BcConfig<Mlp> {
    let model_config = BcModelConfig::default()
        .policy_model_config(mlp_config)
        .opt_config(OptimizerConfig::Adam { lr });
    BcConfig::default().policy_model_config(model_config)
}

/// Pushes the cart toward the side the pole is falling to.
struct Expert;

impl Policy<ClassicEnv> for Expert {
    fn sample(&mut self, obs: &ClassicObs) -> Result<DiscreteAct> {
        let v = obs.0[2] + 0.5 * obs.0[3];
        Ok(DiscreteAct(if v > 0.0 { 1 } else { 0 }))
    }
}

#[test]
fn test_fit_separable_data() -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(0);
    let n = 200;
    let mut xs: Vec<f32> = vec![];
    let mut ys: Vec<f32> = vec![];
    for _ in 0..n {
        let x0: f32 = rng.gen_range(-1.0..1.0);
        let x1: f32 = rng.gen_range(-1.0..1.0);
        xs.extend([x0, x1]);
        ys.extend(if x0 > 0.0 { [0.0, 1.0] } else { [1.0, 0.0] });
    }
    let xs = Tensor::from_vec(xs, (n, 2), &Device::Cpu)?;
    let ys = Tensor::from_vec(ys, (n, 2), &Device::Cpu)?;

    let mut agent = BcAgent::build(config(MlpConfig::new(2, vec![16], 2), 1e-2))?;
    let history = agent.fit(&xs, &ys, 50)?;
    assert_eq!(history.loss.len(), 50);
    assert!(history.loss[49] < history.loss[0]);
    assert!(history.acc[49] > 0.95);
    Ok(())
}

#[test]
fn test_fit_with_softmax_output() -> Result<()> {
    let xs = Tensor::new(&[[1f32, 0.0], [-1.0, 0.0], [0.5, 0.5], [-0.5, -0.5]], &Device::Cpu)?;
    let ys = Tensor::new(&[[0f32, 1.0], [1.0, 0.0], [0.0, 1.0], [1.0, 0.0]], &Device::Cpu)?;
    let mlp_config = MlpConfig::new(2, vec![], 2).activation_out(Activation::Softmax);

    let mut agent = BcAgent::build(config(mlp_config, 5e-2).batch_size(2))?;
    let history = agent.fit(&xs, &ys, 100)?;
    assert!(history.loss.iter().all(|l| l.is_finite()));
    assert_eq!(history.acc[99], 1.0);
    Ok(())
}

#[test]
fn test_fit_rejects_bad_batches() -> Result<()> {
    let mut agent = BcAgent::build(config(MlpConfig::new(2, vec![], 2), 1e-3))?;
    let xs = Tensor::zeros((0, 2), candle_core::DType::F32, &Device::Cpu)?;
    let ys = Tensor::zeros((0, 2), candle_core::DType::F32, &Device::Cpu)?;
    assert!(agent.fit(&xs, &ys, 1).is_err());

    let xs = Tensor::zeros((3, 2), candle_core::DType::F32, &Device::Cpu)?;
    let ys = Tensor::zeros((3, 3), candle_core::DType::F32, &Device::Cpu)?;
    assert!(agent.fit(&xs, &ys, 1).is_err());
    Ok(())
}

#[test]
fn test_clone_expert_on_cartpole() -> Result<()> {
    let env_config = ClassicEnvConfig::default().name("CartPole-v1");
    let mut env = ClassicEnv::build(&env_config, 0)?;
    let mut agent = BcAgent::build(config(MlpConfig::new(4, vec![], 2), 1e-2))?;
    let mut expert = Expert;

    let mut episodes = vec![];
    for _ in 0..2 {
        let episode = generate_episode(&mut env, &mut expert, 2, false)?;
        agent.fit_episode(&episode, 100)?;
        episodes.push(episode);
    }

    let mut n_match = 0;
    let mut n_total = 0;
    for episode in episodes.iter() {
        for (obs, act) in episode.obs.iter().zip(episode.acts.iter()) {
            if agent.sample(obs)? == *act {
                n_match += 1;
            }
            n_total += 1;
        }
    }
    assert!(n_match as f32 / n_total as f32 > 0.9);
    Ok(())
}

#[test]
fn test_save_and_load_weights() -> Result<()> {
    let dir = TempDir::new("bc")?;
    let mlp_config = MlpConfig::new(4, vec![8], 2);
    let agent = BcAgent::build(config(mlp_config.clone(), 1e-3))?;
    agent.save_params(dir.path())?;

    let mut agent2 = BcAgent::build(config(mlp_config, 1e-3))?;
    agent2.load_weights(dir.path().join("policy_model.safetensors"))?;

    let xs = Tensor::new(&[[0.1f32, 0.2, 0.3, 0.4]], &Device::Cpu)?;
    let y1 = agent.policy_model().forward(&xs)?.flatten_all()?.to_vec1::<f32>()?;
    let y2 = agent2.policy_model().forward(&xs)?.flatten_all()?.to_vec1::<f32>()?;
    assert_eq!(y1, y2);
    Ok(())
}
