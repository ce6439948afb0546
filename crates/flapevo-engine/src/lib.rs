//! Simulation primitives for the side-scrolling flight world.
//!
//! This crate provides the world objects the episode evaluator drives one tick at a time:
//!
//! - [`Agent`] - A single bird: position, vertical velocity, tilt, impulse/advance physics
//! - [`Obstacle`] - A scrolling barrier with a passable vertical gap
//! - [`ObstacleSpawner`] - Seeded source of obstacles with random gap heights
//! - [`Scroller`] - Cosmetic ground tracker with wraparound
//! - [`WorldConfig`] - Geometry, speeds and boundaries shared by all of the above
//! - [`WorldSeed`] - Seed for deterministic obstacle generation
//!
//! # Physics Model
//!
//! The integrator is a deliberately simplified discrete-time approximation. Each tick an
//! agent moves by `d = v·t + ½·a·t²` where `t` counts ticks since the last impulse, clamped
//! to a terminal displacement, with an extra boost while rising. See [`Agent::advance`].
//!
//! # Example
//!
//! ```
//! use flapevo_engine::{Agent, ObstacleSpawner, WorldConfig, WorldSeed};
//!
//! let config = WorldConfig::default();
//! let mut spawner = ObstacleSpawner::new(&config, WorldSeed::from(42));
//! let mut obstacle = spawner.spawn(config.first_obstacle_x);
//! let mut agent = Agent::new(&config);
//!
//! agent.apply_impulse();
//! agent.advance();
//! obstacle.advance();
//!
//! assert!(!obstacle.overlaps(&agent));
//! ```

pub use self::{agent::*, config::*, obstacle::*, scroller::*, seed::*};

mod agent;
mod config;
mod obstacle;
mod scroller;
mod seed;
