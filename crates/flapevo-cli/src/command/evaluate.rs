use std::path::PathBuf;

use anyhow::Context as _;
use flapevo_engine::WorldSeed;
use flapevo_evaluator::{
    episode::{EpisodeEvaluator, EpisodeOutcome},
    population::Removal,
};
use serde::Serialize;

use crate::{
    command::WorldArg,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    #[clap(flatten)]
    world: WorldArg,
    /// Trained model file
    #[arg(long)]
    model: PathBuf,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct EvaluationSummary {
    model: String,
    seed: WorldSeed,
    outcome: EpisodeOutcome,
    ticks: u64,
    score: u32,
    fitness: f32,
    removal: Option<Removal>,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let EvaluateArg {
        world,
        model,
        output,
    } = arg;

    let config = util::load_episode_config(world.config.as_deref())?;
    let model = util::read_network_model_file(model)?;
    let network = model.to_network()?;
    let seed = WorldSeed::from(world.seed());

    let result = EpisodeEvaluator::new(config, seed, [network])?.run();
    let agent = *result
        .agents()
        .first()
        .context("Episode reported no agents")?;

    let summary = EvaluationSummary {
        model: model.name,
        seed,
        outcome: result.outcome(),
        ticks: result.ticks(),
        score: result.score(),
        fitness: agent.fitness,
        removal: agent.removal,
    };
    Output::save_json(&summary, output.clone())?;
    Ok(())
}
