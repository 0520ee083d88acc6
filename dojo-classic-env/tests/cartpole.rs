use anyhow::Result;
use dojo_classic_env::{ClassicEnv, ClassicEnvConfig, DiscreteAct};
use dojo_core::Env;
use tempdir::TempDir;

#[test]
fn test_cartpole_episode_with_constant_action() -> Result<()> {
    let config = ClassicEnvConfig::default().name("CartPole-v0");
    let mut env = ClassicEnv::build(&config, 42)?;
    env.reset()?;

    // Pushing to one side makes the pole fall long before the time limit
    let mut n_steps = 0;
    let mut r_total = 0.0;
    loop {
        let (step, _) = env.step(&DiscreteAct(1))?;
        n_steps += 1;
        r_total += step.reward;
        if step.is_done() {
            assert!(step.is_terminated);
            assert!(!step.is_truncated);
            let theta = step.obs.0[2];
            let x = step.obs.0[0];
            assert!(theta.abs() > 0.2094 || x.abs() > 2.4);
            break;
        }
    }
    assert!(n_steps < 200);
    assert_eq!(r_total, n_steps as f32);
    Ok(())
}

#[test]
fn test_alternating_actions_survive_longer() -> Result<()> {
    let config = ClassicEnvConfig::default().name("CartPole-v1");
    let mut env = ClassicEnv::build(&config, 0)?;

    let run = |env: &mut ClassicEnv, f: &dyn Fn(&[f32]) -> usize| -> Result<usize> {
        let mut obs = env.reset_with_index(0)?;
        let mut n = 0;
        loop {
            let (step, _) = env.step(&DiscreteAct(f(obs.0.as_slice().unwrap_or(&[]))))?;
            n += 1;
            if step.is_done() {
                return Ok(n);
            }
            obs = step.obs;
        }
    };

    let constant = run(&mut env, &|_| 0)?;
    // Push toward the side the pole is falling to
    let feedback = run(&mut env, &|o| if o[2] + 0.5 * o[3] > 0.0 { 1 } else { 0 })?;
    assert!(feedback > constant);
    Ok(())
}

#[test]
fn test_serde_config() -> Result<()> {
    let config = ClassicEnvConfig::default()
        .name("MountainCar-v0")
        .max_steps(Some(1000))
        .render_wait_millis(0);
    let dir = TempDir::new("classic_env_config")?;
    let path = dir.path().join("env.yaml");
    config.save(&path)?;
    assert_eq!(ClassicEnvConfig::load(&path)?, config);
    Ok(())
}
