use std::path::PathBuf;

use anyhow::Context as _;
use chrono::Utc;
use flapevo_engine::WorldSeed;
use flapevo_training::genetic::{Individual, Population, PopulationEvolver};
use rand::{Rng as _, SeedableRng as _, rngs::StdRng};

use crate::{
    command::WorldArg,
    model::network_model::NetworkModel,
    util::{self, Output},
};

const ELITE_COUNT: usize = 2;
const TOURNAMENT_SIZE: usize = 3;
const MAX_WEIGHT: f32 = 5.0;
const MUTATION_RATE: f32 = 0.2;
const BLX_ALPHA: f32 = 0.5;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
enum EvolutionPhase {
    #[default]
    Exploration,
    Transition,
    Convergence,
}

impl EvolutionPhase {
    fn from_generation(generation: u64) -> Self {
        match generation {
            0..15 => Self::Exploration,
            15..35 => Self::Transition,
            _ => Self::Convergence,
        }
    }
}

const fn mutation_sigma_by_phase(phase: EvolutionPhase) -> f32 {
    match phase {
        EvolutionPhase::Exploration => 1.0,
        EvolutionPhase::Transition => 0.5,
        EvolutionPhase::Convergence => 0.2,
    }
}

const fn evolver_by_phase(phase: EvolutionPhase) -> PopulationEvolver {
    PopulationEvolver {
        elite_count: ELITE_COUNT,
        max_weight: MAX_WEIGHT,
        tournament_size: TOURNAMENT_SIZE,
        mutation_sigma: mutation_sigma_by_phase(phase),
        blx_alpha: BLX_ALPHA,
        mutation_rate: MUTATION_RATE,
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    #[clap(flatten)]
    world: WorldArg,
    /// Maximum number of generations
    #[arg(long, default_value_t = 50)]
    generations: u64,
    /// Individuals per generation
    #[arg(long, default_value_t = 50)]
    population: usize,
    /// Hidden units per network (0 connects the inputs straight to the output)
    #[arg(long, default_value_t = 0)]
    hidden: usize,
    /// Shared episodes flown per generation
    #[arg(long, default_value_t = 1)]
    episodes: usize,
    /// Name stored in the model file
    #[arg(long, default_value = "flapevo")]
    name: String,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        world,
        generations,
        population: population_size,
        hidden,
        episodes,
        name,
        output,
    } = arg;
    anyhow::ensure!(*generations > 0, "At least one generation is required");
    anyhow::ensure!(*population_size > 0, "Population must not be empty");
    anyhow::ensure!(*episodes > 0, "At least one episode per generation is required");

    let config = util::load_episode_config(world.config.as_deref())?;
    let seed = world.seed();
    tracing::info!(
        seed,
        population = population_size,
        hidden,
        generations,
        "training started"
    );

    let mut rng = StdRng::seed_from_u64(seed);
    let mut population = Population::random(*population_size, *hidden, &mut rng, MAX_WEIGHT);
    let report = loop {
        let phase = EvolutionPhase::from_generation(population.generation());
        let seeds: Vec<WorldSeed> = (0..*episodes).map(|_| rng.random()).collect();
        let report = population.evaluate_fitness(&config, &seeds)?;

        if let Some(stats) = &report.fitness {
            tracing::info!(
                generation = report.generation,
                ?phase,
                best = stats.max,
                mean = stats.mean,
                std_dev = stats.std_dev,
                score = report.best_score,
                "generation evaluated"
            );
        }
        if report.succeeded() || population.generation() + 1 >= *generations {
            break report;
        }
        population = evolver_by_phase(phase).evolve(&population, &mut rng);
    };

    eprintln!("Best Individuals:");
    for (i, ind) in population.individuals().iter().take(5).enumerate() {
        eprintln!(
            "  {i:2}: {:.3?} => {:.3}",
            ind.network().weights(),
            ind.fitness()
        );
    }

    let best = population
        .best_individual()
        .context("Population is empty")?;
    let (network, fitness) = match &report.winner {
        Some(winner) => {
            let fitness = population
                .individuals()
                .iter()
                .find(|ind| ind.network() == winner)
                .map_or(best.fitness(), Individual::fitness);
            (winner.clone(), fitness)
        }
        None => (best.network().clone(), best.fitness()),
    };
    if report.succeeded() {
        tracing::info!(generation = report.generation, "episode succeeded");
    } else {
        tracing::warn!(
            generations,
            "no episode succeeded; saving the best individual instead"
        );
    }

    let model = NetworkModel {
        name: name.clone(),
        trained_at: Utc::now(),
        generation: report.generation,
        fitness,
        score: report.best_score,
        succeeded: report.succeeded(),
        hidden: network.hidden(),
        weights: network.into_weights(),
    };
    Output::save_json(&model, output.clone())?;

    tracing::info!(
        name = %model.name,
        trained_at = %model.trained_at,
        fitness = model.fitness,
        path = ?output,
        "model saved"
    );
    Ok(())
}
