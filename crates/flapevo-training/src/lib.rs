//! Neuro-evolution of flapping controllers.
//!
//! This crate is the external optimizer the episode evaluator is scored against. It evolves
//! the weights of small fixed-topology neural networks so that agents driven by them fly
//! through as many obstacles as possible.
//!
//! # How Training Works
//!
//! 1. **Population** - Create a population of individuals, each a randomly weighted [`Network`](network::Network)
//! 2. **Evaluation** - All individuals fly together in the same episodes
//! 3. **Fitness** - Each individual's fitness is its average episode fitness
//! 4. **Selection** - Select top performers based on fitness
//! 5. **Reproduction** - Create the next generation through crossover and mutation
//! 6. **Repeat** - Continue until an episode succeeds or the generation budget runs out
//!
//! # Architecture
//!
//! ```text
//! Genetic Algorithm (genetic)
//!     ↓ evolves
//! Network weights (individuals)
//!     ↓ used as
//! DecisionProvider (flapevo-evaluator)
//!     ↓ scored by
//! EpisodeEvaluator
//!     ↓ produces
//! Fitness
//!     ↓ guides
//! Selection & Reproduction
//! ```
//!
//! # Example
//!
//! ```
//! use flapevo_engine::WorldSeed;
//! use flapevo_evaluator::config::EpisodeConfig;
//! use flapevo_training::genetic::{Population, PopulationEvolver};
//!
//! let mut rng = rand::rng();
//! let config = EpisodeConfig { tick_budget: 200, ..EpisodeConfig::default() };
//! let evolver = PopulationEvolver::default();
//!
//! let mut population = Population::random(10, 0, &mut rng, evolver.max_weight);
//! let report = population.evaluate_fitness(&config, &[WorldSeed::from(1)]).unwrap();
//! assert_eq!(report.generation, 0);
//!
//! let population = evolver.evolve(&population, &mut rng);
//! assert_eq!(population.generation(), 1);
//! assert_eq!(population.individuals().len(), 10);
//! ```

pub mod genetic;
pub mod network;
pub mod stats;
pub mod weights;
