use std::path::PathBuf;

use clap::{Parser, Subcommand};
use flapevo_evaluator::config::EpisodeConfig;

use crate::util::Output;

use self::{evaluate::EvaluateArg, train::TrainArg};

mod evaluate;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve a flapping controller with a genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Fly a saved controller through one episode
    Evaluate(#[clap(flatten)] EvaluateArg),
    /// Print the default episode configuration
    Config,
}

/// Options shared by every command that runs episodes.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct WorldArg {
    /// Episode configuration JSON file (defaults are used if omitted)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for obstacle layouts (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
}

impl WorldArg {
    fn seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Evaluate(arg) => evaluate::run(&arg)?,
        Mode::Config => Output::save_json(&EpisodeConfig::default(), None)?,
    }
    Ok(())
}
