//! Genetic algorithm over network weights.
//!
//! # Algorithm Overview
//!
//! 1. **Evaluate Fitness** - All individuals fly together in shared episodes
//! 2. **Elite Selection** - Top performers are preserved unchanged in the next generation
//! 3. **Tournament Selection** - Select parents using tournament selection
//! 4. **Crossover (BLX-α)** - Combine two parents' weights to create offspring
//! 5. **Mutation** - Apply Gaussian noise to weights
//!
//! # Shared Episodes
//!
//! Individuals are not scored in isolation. Every episode puts the whole population into the
//! same world, so all agents face the same obstacles and the pass bonus depends on how long
//! the best flyer survives. Running several episodes (one per seed) and averaging smooths out
//! lucky obstacle layouts.
//!
//! # Current Limitations
//!
//! - **Fixed topology**: only weights evolve, the network shape is chosen up front
//! - **No speciation**: only elitism and tournament selection maintain diversity
//! - **No automatic parameter adaptation**: callers must build a different
//!   [`PopulationEvolver`] per generation to anneal mutation

use flapevo_engine::WorldSeed;
use flapevo_evaluator::{
    config::{ConfigError, EpisodeConfig},
    episode::{EpisodeEvaluator, EpisodeOutcome},
};
use rand::{Rng, seq::IndexedRandom as _};
use serde::Serialize;

use crate::{network::Network, stats::FitnessStats, weights};

/// A candidate controller and its fitness.
#[derive(Debug, Clone)]
pub struct Individual {
    network: Network,
    fitness: f32,
}

impl Individual {
    /// Creates an individual with uniformly random weights in `[-max_weight, max_weight]`.
    pub fn random<R>(rng: &mut R, hidden: usize, max_weight: f32) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::unevaluated(random_network(rng, hidden, max_weight))
    }

    fn unevaluated(network: Network) -> Self {
        Self {
            network,
            fitness: f32::MIN,
        }
    }

    #[must_use]
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Returns the average episode fitness from the last evaluation.
    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }
}

fn random_network<R>(rng: &mut R, hidden: usize, max_weight: f32) -> Network
where
    R: Rng + ?Sized,
{
    let weights = weights::random(rng, max_weight, Network::weight_count(hidden));
    Network::new(hidden, weights).expect("weight count matches topology")
}

/// What happened while evaluating one generation.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub generation: u64,
    /// `None` for an empty population
    pub fitness: Option<FitnessStats>,
    /// Highest score reached in any episode
    pub best_score: u32,
    pub outcomes: Vec<EpisodeOutcome>,
    /// Controller of the first successful episode's winner
    #[serde(skip)]
    pub winner: Option<Network>,
}

impl GenerationReport {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.winner.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Population {
    hidden: usize,
    generation: u64,
    individuals: Vec<Individual>,
}

impl Population {
    /// Creates generation zero with `count` random individuals.
    #[must_use]
    pub fn random<R>(count: usize, hidden: usize, rng: &mut R, max_weight: f32) -> Self
    where
        R: Rng + ?Sized,
    {
        let individuals = (0..count)
            .map(|_| Individual::random(rng, hidden, max_weight))
            .collect();
        Self {
            hidden,
            generation: 0,
            individuals,
        }
    }

    /// Returns the individuals, best first after [`Self::evaluate_fitness`].
    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn hidden(&self) -> usize {
        self.hidden
    }

    #[must_use]
    pub fn best_individual(&self) -> Option<&Individual> {
        self.individuals.first()
    }

    /// Runs one shared episode per seed and sets each individual's fitness to its average.
    ///
    /// After evaluation, individuals are sorted by fitness in descending order.
    pub fn evaluate_fitness(
        &mut self,
        config: &EpisodeConfig,
        seeds: &[WorldSeed],
    ) -> Result<GenerationReport, ConfigError> {
        let mut totals = vec![0.0_f32; self.individuals.len()];
        let mut best_score = 0;
        let mut outcomes = Vec::with_capacity(seeds.len());
        let mut winner = None;

        for &seed in seeds {
            let providers = self.individuals.iter().map(Individual::network);
            let result = EpisodeEvaluator::new(config.clone(), seed, providers)?
                .with_generation(self.generation)
                .run();

            for (total, agent) in totals.iter_mut().zip(result.agents()) {
                *total += agent.fitness;
            }
            best_score = best_score.max(result.score());
            outcomes.push(result.outcome());
            if winner.is_none() {
                winner = result.into_winner().cloned();
            }
        }

        #[expect(clippy::cast_precision_loss)]
        let episodes = seeds.len().max(1) as f32;
        for (individual, total) in self.individuals.iter_mut().zip(totals) {
            individual.fitness = total / episodes;
        }
        self.individuals
            .sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

        let report = GenerationReport {
            generation: self.generation,
            fitness: self.fitness_stats(),
            best_score,
            outcomes,
            winner,
        };
        tracing::debug!(
            generation = report.generation,
            best_score,
            succeeded = report.succeeded(),
            "generation evaluated"
        );
        Ok(report)
    }

    #[must_use]
    pub fn fitness_stats(&self) -> Option<FitnessStats> {
        FitnessStats::new(self.individuals.iter().map(Individual::fitness))
    }
}

/// Controls how one generation becomes the next.
#[derive(Debug, Clone)]
pub struct PopulationEvolver {
    /// Number of top individuals preserved unchanged (elitism)
    pub elite_count: usize,
    /// Weights are clamped to `[-max_weight, max_weight]`
    pub max_weight: f32,
    /// Tournament size for selection (larger = stronger selection pressure)
    pub tournament_size: usize,
    /// Standard deviation for Gaussian mutation noise
    pub mutation_sigma: f32,
    /// BLX-α crossover parameter (controls exploration beyond parent range)
    pub blx_alpha: f32,
    /// Probability of mutating each weight
    pub mutation_rate: f32,
}

impl Default for PopulationEvolver {
    fn default() -> Self {
        Self {
            elite_count: 2,
            max_weight: 5.0,
            tournament_size: 3,
            mutation_sigma: 0.5,
            blx_alpha: 0.5,
            mutation_rate: 0.2,
        }
    }
}

impl PopulationEvolver {
    /// Creates the next generation.
    ///
    /// `population` must already be evaluated (sorted by fitness, best first). The result has
    /// the same size, starts with the elites and has not been evaluated yet.
    #[must_use]
    pub fn evolve<R>(&self, population: &Population, rng: &mut R) -> Population
    where
        R: Rng + ?Sized,
    {
        assert!(
            population
                .individuals
                .is_sorted_by(|a, b| a.fitness >= b.fitness)
        );

        let count = population.individuals.len();
        let elites = self.elite_count.min(count);
        let mut next = Vec::with_capacity(count);
        next.extend(population.individuals[..elites].iter().cloned());

        while next.len() < count {
            let p1 = tournament_select(&population.individuals, self.tournament_size, rng);
            let p2 = tournament_select(&population.individuals, self.tournament_size, rng);

            let mut child = weights::blx_alpha(
                p1.network.weights(),
                p2.network.weights(),
                self.blx_alpha,
                self.max_weight,
                rng,
            );
            weights::mutate(
                &mut child,
                self.mutation_sigma,
                self.max_weight,
                self.mutation_rate,
                rng,
            );
            let network = Network::new(population.hidden, child)
                .expect("children keep the parents' topology");
            next.push(Individual::unevaluated(network));
        }

        Population {
            hidden: population.hidden,
            generation: population.generation + 1,
            individuals: next,
        }
    }
}

/// Picks `tournament_size` distinct individuals at random and returns the fittest.
fn tournament_select<'a, R>(
    population: &'a [Individual],
    tournament_size: usize,
    rng: &mut R,
) -> &'a Individual
where
    R: Rng + ?Sized,
{
    assert!(tournament_size > 0);
    population
        .choose_multiple(rng, tournament_size)
        .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
        .expect("population is not empty")
}
