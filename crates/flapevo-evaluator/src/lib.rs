//! Episode evaluation: scoring a population of decision providers in one shared world.
//!
//! This crate turns the world primitives of `flapevo-engine` into a fitness signal for an
//! external optimizer:
//!
//! 1. **Decision** ([`decision`]) - The contract between an agent's controller and the world:
//!    an [`Observation`](decision::Observation) in, a [`Decision`](decision::Decision) out.
//!
//! 2. **Gathering** ([`gather`]) - Fans decision queries out across worker threads and joins
//!    them before anything in the world changes.
//!
//! 3. **Population** ([`population`]) - Arena of agents keyed by a stable
//!    [`AgentId`](population::AgentId), each bundling provider, physics and fitness.
//!
//! 4. **Episode** ([`episode`]) - The tick loop: targeting, decisions, physics, collisions,
//!    scoring, culling and termination.
//!
//! # Architecture
//!
//! ```text
//! EpisodeEvaluator (coordinating thread, owns the world)
//!     ↓ per tick, read-only snapshot
//! DecisionGatherer (fan-out → barrier → fan-in)
//!     ↓ one query per live agent
//! DecisionProvider (external controller)
//! ```
//!
//! # Fitness
//!
//! | Event                       | Fitness change |
//! |-----------------------------|----------------|
//! | Each tick alive             | `+0.1`         |
//! | Lead agent passes obstacle  | `+5` (all live agents) |
//! | Collision with obstacle     | `-1`, agent removed |
//! | Leaving the vertical bounds | none, agent removed |
//!
//! # Example
//!
//! ```
//! use flapevo_engine::WorldSeed;
//! use flapevo_evaluator::{
//!     config::EpisodeConfig,
//!     decision::{self, Decision},
//!     episode::EpisodeEvaluator,
//! };
//!
//! let providers = vec![decision::from_fn(|obs| Decision::from(obs.y > 400.0))];
//! let evaluator =
//!     EpisodeEvaluator::new(EpisodeConfig::default(), WorldSeed::from(1), providers).unwrap();
//! let result = evaluator.run();
//! assert_eq!(result.agents().len(), 1);
//! ```

pub mod config;
pub mod decision;
pub mod episode;
pub mod gather;
pub mod population;
