use anyhow::Result;
use clap::Parser;
use dojo::imitation::{run, ImitationArgs};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = ImitationArgs::parse();
    run(&args)
}
