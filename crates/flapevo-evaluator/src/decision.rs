//! The contract between an agent's controller and the world.
//!
//! Every tick, each live agent is shown an [`Observation`] of itself relative to the
//! current target obstacle, and its [`DecisionProvider`] answers with a [`Decision`].
//!
//! Providers are owned by the external optimizer; the evaluator holds one per agent for the
//! whole episode and only ever calls [`DecisionProvider::decide`] through a shared
//! reference, possibly from several threads at once.

use std::fmt;

use flapevo_engine::{Agent, Obstacle};
use serde::{Deserialize, Serialize};

/// What an agent sees before deciding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Vertical position of the agent
    pub y: f32,
    /// `|y - gap_top|` of the target obstacle
    pub gap_top_distance: f32,
    /// `|y - gap_bottom|` of the target obstacle
    pub gap_bottom_distance: f32,
}

impl Observation {
    #[must_use]
    pub fn new(agent: &Agent, target: &Obstacle) -> Self {
        let y = agent.y();
        Self {
            y,
            gap_top_distance: (y - target.gap_top()).abs(),
            gap_bottom_distance: (y - target.gap_bottom()).abs(),
        }
    }

    /// Returns the observation as a network input vector.
    #[must_use]
    pub fn to_array(&self) -> [f32; 3] {
        [self.y, self.gap_top_distance, self.gap_bottom_distance]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Decision {
    Jump,
    Stay,
}

impl From<bool> for Decision {
    fn from(jump: bool) -> Self {
        if jump { Self::Jump } else { Self::Stay }
    }
}

/// A decision query that could not be answered.
///
/// The evaluator never aborts on these; the agent simply does not jump this tick.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum DecisionError {
    #[display("decision output {output} is not a finite number")]
    NonFiniteOutput { output: f32 },
    #[display("decision provider failed: {reason}")]
    Failed { reason: String },
}

/// Maps an observation to a jump / no-jump decision.
///
/// Implementations should be pure, non-blocking and deterministic given their input.
pub trait DecisionProvider: Send + Sync {
    fn decide(&self, observation: &Observation) -> Result<Decision, DecisionError>;
}

impl<T> DecisionProvider for &T
where
    T: DecisionProvider + ?Sized,
{
    fn decide(&self, observation: &Observation) -> Result<Decision, DecisionError> {
        (**self).decide(observation)
    }
}

impl<T> DecisionProvider for Box<T>
where
    T: DecisionProvider + ?Sized,
{
    fn decide(&self, observation: &Observation) -> Result<Decision, DecisionError> {
        (**self).decide(observation)
    }
}

/// Provider backed by a closure, created by [`from_fn`].
#[derive(Clone)]
pub struct FnProvider<F>(F);

impl<F> fmt::Debug for FnProvider<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProvider").finish_non_exhaustive()
    }
}

impl<F> DecisionProvider for FnProvider<F>
where
    F: Fn(&Observation) -> Decision + Send + Sync,
{
    fn decide(&self, observation: &Observation) -> Result<Decision, DecisionError> {
        Ok((self.0)(observation))
    }
}

/// Creates an infallible provider from a closure.
///
/// ```
/// use flapevo_evaluator::decision::{self, Decision, DecisionProvider as _, Observation};
///
/// let provider = decision::from_fn(|obs| Decision::from(obs.y > 300.0));
/// let obs = Observation { y: 310.0, gap_top_distance: 160.0, gap_bottom_distance: 40.0 };
/// assert_eq!(provider.decide(&obs), Ok(Decision::Jump));
/// ```
pub fn from_fn<F>(f: F) -> FnProvider<F>
where
    F: Fn(&Observation) -> Decision + Send + Sync,
{
    FnProvider(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_distances() {
        let agent = Agent::at(230.0, 400.0, 34.0, 24.0);
        let obstacle = Obstacle::new(500.0, 100.0, 200.0, 52.0, 8.0);
        let obs = Observation::new(&agent, &obstacle);
        assert_eq!(obs.to_array(), [400.0, 300.0, 100.0]);
    }

    #[test]
    fn test_decision_from_bool() {
        assert!(Decision::from(true).is_jump());
        assert!(Decision::from(false).is_stay());
    }

    #[test]
    fn test_boxed_and_borrowed_providers() {
        let provider = from_fn(|_| Decision::Jump);
        let obs = Observation {
            y: 0.0,
            gap_top_distance: 0.0,
            gap_bottom_distance: 0.0,
        };
        let borrowed: &dyn DecisionProvider = &provider;
        let boxed: Box<dyn DecisionProvider> = Box::new(from_fn(|_| Decision::Stay));
        assert_eq!(borrowed.decide(&obs), Ok(Decision::Jump));
        assert_eq!(boxed.decide(&obs), Ok(Decision::Stay));
    }
}
