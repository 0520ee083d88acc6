use anyhow::Result;
use clap::Parser;
use dojo::dqn_app::{run, DqnArgs};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = DqnArgs::parse();
    run(&args)
}
