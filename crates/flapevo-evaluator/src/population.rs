//! Population bookkeeping for a single episode.
//!
//! The population is an arena of [`Member`]s. Each member bundles everything the episode
//! knows about one logical agent (its decision provider, its physical [`Agent`], its
//! fitness and how it left the episode) so that removing an agent can never leave a
//! provider, a body or a score behind.
//!
//! Members are never moved or dropped during an episode. Removal is two-phase:
//!
//! 1. [`Population::remove`] marks the member as removed (it immediately stops being
//!    "live" for the rest of the tick's sweep)
//! 2. [`Population::compact`] drops removed ids from the live list once the sweep is done
//!
//! [`AgentId`]s are the positions of the providers in the order they were handed to the
//! episode, which lets the caller map results back to its own genomes.

use flapevo_engine::{Agent, WorldConfig};
use serde::{Deserialize, Serialize};

/// Stable identifier of an agent within an episode.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("#{_0}")]
pub struct AgentId(usize);

impl AgentId {
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the position of this agent's provider in the episode's input order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum RemovalCause {
    #[display("collision")]
    Collision,
    #[display("out of bounds")]
    OutOfBounds,
}

/// When and why an agent left the episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Removal {
    pub tick: u64,
    pub cause: RemovalCause,
}

/// One logical agent: provider, body, fitness and removal record.
#[derive(Debug, Clone)]
pub struct Member<P> {
    id: AgentId,
    provider: P,
    agent: Agent,
    fitness: f32,
    removal: Option<Removal>,
}

impl<P> Member<P> {
    #[must_use]
    pub fn id(&self) -> AgentId {
        self.id
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    #[must_use]
    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub(crate) fn agent_mut(&mut self) -> &mut Agent {
        &mut self.agent
    }

    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    #[must_use]
    pub fn removal(&self) -> Option<Removal> {
        self.removal
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.removal.is_none()
    }

    pub(crate) fn into_provider(self) -> P {
        self.provider
    }
}

#[derive(Debug, Clone)]
pub struct Population<P> {
    members: Vec<Member<P>>,
    live: Vec<AgentId>,
}

impl<P> Population<P> {
    /// Creates one member per provider, each with a fresh agent at the start position.
    pub fn new<I>(providers: I, config: &WorldConfig) -> Self
    where
        I: IntoIterator<Item = P>,
    {
        let members: Vec<_> = providers
            .into_iter()
            .enumerate()
            .map(|(index, provider)| Member {
                id: AgentId(index),
                provider,
                agent: Agent::new(config),
                fitness: 0.0,
                removal: None,
            })
            .collect();
        let live = members.iter().map(|m| m.id).collect();
        Self { members, live }
    }

    /// Returns the number of agents still in the episode.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live_members().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_members().next().is_none()
    }

    /// Returns every member that ever took part, live or removed, in id order.
    #[must_use]
    pub fn members(&self) -> &[Member<P>] {
        &self.members
    }

    /// Returns the member with `id`, or `None` if no such agent took part in this episode.
    #[must_use]
    pub fn member(&self, id: AgentId) -> Option<&Member<P>> {
        self.members.get(id.0)
    }

    pub(crate) fn member_mut(&mut self, id: AgentId) -> &mut Member<P> {
        &mut self.members[id.0]
    }

    /// Iterates over live members in their original order.
    pub fn live_members(&self) -> impl Iterator<Item = &Member<P>> + '_ {
        self.live
            .iter()
            .map(|id| &self.members[id.0])
            .filter(|m| m.is_live())
    }

    /// Returns the first live member, whose position drives targeting and scoring.
    #[must_use]
    pub fn lead(&self) -> Option<&Member<P>> {
        self.live_members().next()
    }

    /// Adds `amount` to the fitness of every live member.
    pub(crate) fn reward_live(&mut self, amount: f32) {
        for id in &self.live {
            let member = &mut self.members[id.0];
            if member.is_live() {
                member.fitness += amount;
            }
        }
    }

    /// Applies `adjustment` to the member's fitness and marks it removed.
    ///
    /// Returns `false` without touching the member if it was already removed, so a single
    /// agent can never be penalized twice.
    pub(crate) fn remove(&mut self, id: AgentId, adjustment: f32, removal: Removal) -> bool {
        let member = &mut self.members[id.0];
        if !member.is_live() {
            return false;
        }
        member.fitness += adjustment;
        member.removal = Some(removal);
        true
    }

    /// Drops removed members from the live list.
    pub(crate) fn compact(&mut self) {
        let members = &self.members;
        self.live.retain(|id| members[id.0].is_live());
    }

    pub(crate) fn into_members(self) -> Vec<Member<P>> {
        self.members
    }
}

#[cfg(test)]
#[expect(clippy::float_cmp)]
mod tests {
    use super::*;

    fn population(count: usize) -> Population<()> {
        Population::new(std::iter::repeat_n((), count), &WorldConfig::default())
    }

    #[test]
    fn test_ids_follow_input_order() {
        let population = population(3);
        let ids: Vec<_> = population.live_members().map(Member::id).collect();
        assert_eq!(ids, [AgentId::new(0), AgentId::new(1), AgentId::new(2)]);
        assert_eq!(population.len(), 3);
    }

    #[test]
    fn test_removed_member_stops_being_live_before_compaction() {
        let mut population = population(3);
        let removal = Removal {
            tick: 4,
            cause: RemovalCause::Collision,
        };
        assert!(population.remove(AgentId::new(0), -1.0, removal));
        assert_eq!(population.len(), 2);
        assert_eq!(population.lead().map(Member::id), Some(AgentId::new(1)));

        population.compact();
        assert_eq!(population.len(), 2);
        assert_eq!(population.members().len(), 3);
        assert_eq!(population.member(AgentId::new(0)).unwrap().removal(), Some(removal));
    }

    #[test]
    fn test_double_removal_is_ignored() {
        let mut population = population(1);
        let removal = Removal {
            tick: 1,
            cause: RemovalCause::Collision,
        };
        assert!(population.remove(AgentId::new(0), -1.0, removal));
        assert!(!population.remove(AgentId::new(0), -1.0, removal));
        assert_eq!(population.member(AgentId::new(0)).unwrap().fitness(), -1.0);
        assert!(population.is_empty());
    }

    #[test]
    fn test_reward_skips_removed_members() {
        let mut population = population(2);
        population.remove(
            AgentId::new(1),
            0.0,
            Removal {
                tick: 1,
                cause: RemovalCause::OutOfBounds,
            },
        );
        population.reward_live(5.0);
        assert_eq!(population.member(AgentId::new(0)).unwrap().fitness(), 5.0);
        assert_eq!(population.member(AgentId::new(1)).unwrap().fitness(), 0.0);
    }

    #[test]
    fn test_unknown_id_has_no_member() {
        let population = population(2);
        assert!(population.member(AgentId::new(1)).is_some());
        assert!(population.member(AgentId::new(2)).is_none());
    }
}
