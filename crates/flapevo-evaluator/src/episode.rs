//! The episode tick loop.
//!
//! An [`EpisodeEvaluator`] owns one world (obstacles, ground and population) and advances
//! it one tick at a time until the episode reaches a terminal [`EpisodeOutcome`].
//!
//! # Tick
//!
//! 1. **Targeting** - The first obstacle, or the second once the lead agent has moved
//!    beyond the first. All agents observe the same target.
//! 2. **Decisions** - Every live agent earns the survival bonus, then all decisions are
//!    gathered concurrently (see [`gather`](crate::gather)).
//! 3. **Motion** - Decisions are applied in agent order: optional impulse, then advance.
//! 4. **Obstacles** - Each obstacle scrolls; agents touching its solid part are penalized
//!    and removed. The ground scrolls.
//! 5. **Scoring** - Obstacles the lead agent has flown past are marked passed. If any was,
//!    the score increases, every live agent earns the pass bonus and a new obstacle spawns.
//!    Obstacles that left the world are dropped.
//! 6. **Culling** - Agents above the ceiling or at the floor are removed without penalty.
//! 7. **Termination** - See [`EpisodeOutcome`].
//!
//! The world is only ever mutated by the thread calling [`EpisodeEvaluator::step`]. An
//! episode can be stopped between ticks with [`EpisodeEvaluator::finish`].

use flapevo_engine::{Obstacle, ObstacleSpawner, Scroller, WorldSeed};
use serde::{Deserialize, Serialize};

use crate::{
    config::{ConfigError, EpisodeConfig},
    decision::{Decision, DecisionProvider, Observation},
    gather::{DecisionGatherer, DecisionQuery},
    population::{AgentId, Member, Population, Removal, RemovalCause},
};

/// Fitness earned by every live agent on every tick.
pub const SURVIVAL_BONUS: f32 = 0.1;
/// Fitness earned by every live agent whenever the lead agent passes an obstacle.
pub const PASS_BONUS: f32 = 5.0;
/// Fitness change applied once, when an agent hits an obstacle.
pub const COLLISION_PENALTY: f32 = -1.0;

/// How an episode ended.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant,
)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EpisodeOutcome {
    /// The score exceeded the success threshold while at least one agent was alive
    Succeeded { winner: AgentId },
    /// Every agent was removed
    Extinct,
    /// The tick budget ran out first
    TickBudgetExhausted,
    /// The episode was stopped from outside between ticks
    Aborted,
}

/// What happened during a single tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub score: u32,
    pub live_agents: usize,
    pub collided: usize,
    pub culled: usize,
    pub passed_obstacle: bool,
    pub outcome: Option<EpisodeOutcome>,
}

/// Final record of one agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentOutcome {
    pub id: AgentId,
    pub fitness: f32,
    /// `None` if the agent was still alive when the episode ended
    pub removal: Option<Removal>,
}

/// Result of a finished episode.
///
/// Reports every agent that took part, in provider order, and hands the providers back
/// to the caller.
#[derive(Debug)]
pub struct EpisodeResult<P> {
    outcome: EpisodeOutcome,
    ticks: u64,
    score: u32,
    agents: Vec<AgentOutcome>,
    providers: Vec<P>,
}

impl<P> EpisodeResult<P> {
    #[must_use]
    pub fn outcome(&self) -> EpisodeOutcome {
        self.outcome
    }

    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn agents(&self) -> &[AgentOutcome] {
        &self.agents
    }

    #[must_use]
    pub fn fitness(&self, id: AgentId) -> Option<f32> {
        self.agents.get(id.index()).map(|a| a.fitness)
    }

    #[must_use]
    pub fn winner(&self) -> Option<AgentId> {
        match self.outcome {
            EpisodeOutcome::Succeeded { winner } => Some(winner),
            _ => None,
        }
    }

    /// Returns the winning provider, if the episode succeeded.
    #[must_use]
    pub fn into_winner(self) -> Option<P> {
        let winner = self.winner()?;
        self.providers.into_iter().nth(winner.index())
    }

    #[must_use]
    pub fn into_providers(self) -> Vec<P> {
        self.providers
    }
}

/// Runs one episode over a population of decision providers.
#[derive(Debug)]
pub struct EpisodeEvaluator<P> {
    config: EpisodeConfig,
    generation: u64,
    tick: u64,
    score: u32,
    obstacles: Vec<Obstacle>,
    spawner: ObstacleSpawner,
    ground: Scroller,
    population: Population<P>,
    gatherer: DecisionGatherer,
    outcome: Option<EpisodeOutcome>,
}

impl<P> EpisodeEvaluator<P>
where
    P: DecisionProvider,
{
    /// Creates an episode with one agent per provider.
    ///
    /// The configuration is validated here; an invalid one never starts an episode.
    /// An empty population is accepted and is immediately [`EpisodeOutcome::Extinct`].
    pub fn new<I>(config: EpisodeConfig, seed: WorldSeed, providers: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = P>,
    {
        config.validate()?;

        let world = &config.world;
        let mut spawner = ObstacleSpawner::new(world, seed);
        let obstacles = vec![spawner.spawn(world.first_obstacle_x)];
        let ground = Scroller::ground(world);
        let population = Population::new(providers, world);
        let gatherer = DecisionGatherer::new(config.worker_count(), config.decision_timeout());
        let outcome = population.is_empty().then_some(EpisodeOutcome::Extinct);

        Ok(Self {
            config,
            generation: 0,
            tick: 0,
            score: 0,
            obstacles,
            spawner,
            ground,
            population,
            gatherer,
            outcome,
        })
    }

    /// Tags the episode's log output with the optimizer's generation number.
    #[must_use]
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    #[must_use]
    pub fn config(&self) -> &EpisodeConfig {
        &self.config
    }

    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Live obstacles, ordered by ascending horizontal position.
    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    #[must_use]
    pub fn ground(&self) -> &Scroller {
        &self.ground
    }

    #[must_use]
    pub fn population(&self) -> &Population<P> {
        &self.population
    }

    #[must_use]
    pub fn outcome(&self) -> Option<EpisodeOutcome> {
        self.outcome
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Returns the obstacle every agent observes this tick.
    #[must_use]
    pub fn target(&self) -> Option<&Obstacle> {
        let lead_x = self.population.lead()?.agent().x();
        match self.obstacles.as_slice() {
            [first, second, ..] if lead_x > first.x() => Some(second),
            [first, ..] => Some(first),
            [] => None,
        }
    }

    /// Advances the world by one tick.
    ///
    /// Returns `None` without doing anything once the episode has finished.
    pub fn step(&mut self) -> Option<TickReport> {
        if self.outcome.is_some() {
            return None;
        }
        self.tick += 1;
        let tick = self.tick;

        if self.obstacles.is_empty() {
            let spawn_x = self.config.world.spawn_x;
            self.obstacles.push(self.spawner.spawn(spawn_x));
        }

        self.population.reward_live(SURVIVAL_BONUS);
        let decisions = self.gather_decisions()?;
        for (id, decision) in decisions {
            let agent = self.population.member_mut(id).agent_mut();
            if decision.is_jump() {
                agent.apply_impulse();
            }
            agent.advance();
        }

        let collided = self.remove_colliding(tick);
        self.ground.advance();
        let passed_obstacle = self.pass_obstacles(tick);
        let culled = self.remove_out_of_bounds(tick);
        self.population.compact();
        self.outcome = self.terminal_outcome(tick);

        let report = TickReport {
            tick,
            score: self.score,
            live_agents: self.population.len(),
            collided,
            culled,
            passed_obstacle,
            outcome: self.outcome,
        };
        tracing::debug!(
            tick,
            score = report.score,
            live = report.live_agents,
            collided,
            culled,
            "tick done"
        );
        Some(report)
    }

    /// Asks every live agent for its decision on the current target, in agent order.
    fn gather_decisions(&self) -> Option<Vec<(AgentId, Decision)>> {
        let target = self.target()?;
        let queries = self
            .population
            .live_members()
            .map(|member| DecisionQuery {
                id: member.id(),
                provider: member.provider(),
                observation: Observation::new(member.agent(), target),
            })
            .collect::<Vec<_>>();
        let decisions = self.gatherer.gather(&queries);
        Some(queries.iter().map(|q| q.id).zip(decisions).collect())
    }

    /// Scrolls every obstacle and removes the agents touching it.
    fn remove_colliding(&mut self, tick: u64) -> usize {
        let mut collided = 0;
        for obstacle in &mut self.obstacles {
            obstacle.advance();
            let hits = self
                .population
                .live_members()
                .filter(|member| obstacle.overlaps(member.agent()))
                .map(Member::id)
                .collect::<Vec<_>>();
            for id in hits {
                let removal = Removal {
                    tick,
                    cause: RemovalCause::Collision,
                };
                if self.population.remove(id, COLLISION_PENALTY, removal) {
                    tracing::debug!(tick, agent = %id, "agent hit an obstacle");
                    collided += 1;
                }
            }
        }
        collided
    }

    /// Marks obstacles behind the lead agent as passed and drops those that left the world.
    ///
    /// Returns whether the score increased.
    fn pass_obstacles(&mut self, tick: u64) -> bool {
        let mut passed_obstacle = false;
        if let Some(lead_x) = self.population.lead().map(|lead| lead.agent().x()) {
            for obstacle in &mut self.obstacles {
                if !obstacle.is_passed() && obstacle.x() < lead_x {
                    obstacle.mark_passed();
                    passed_obstacle = true;
                }
            }
        }
        if passed_obstacle {
            self.score += 1;
            self.population.reward_live(PASS_BONUS);
            let spawn_x = self.config.world.spawn_x;
            self.obstacles.push(self.spawner.spawn(spawn_x));
            tracing::debug!(tick, score = self.score, "obstacle passed");
        }
        self.obstacles.retain(|obstacle| !obstacle.is_offscreen());
        passed_obstacle
    }

    /// Removes agents above the ceiling or at the floor, without penalty.
    fn remove_out_of_bounds(&mut self, tick: u64) -> usize {
        let world = &self.config.world;
        let out_of_bounds = self
            .population
            .live_members()
            .filter(|member| {
                let y = member.agent().y();
                y - world.floor_margin >= world.floor || y < world.ceiling
            })
            .map(Member::id)
            .collect::<Vec<_>>();
        let mut culled = 0;
        for id in out_of_bounds {
            let removal = Removal {
                tick,
                cause: RemovalCause::OutOfBounds,
            };
            if self.population.remove(id, 0.0, removal) {
                tracing::debug!(tick, agent = %id, "agent left the world");
                culled += 1;
            }
        }
        culled
    }

    fn terminal_outcome(&self, tick: u64) -> Option<EpisodeOutcome> {
        let Some(lead) = self.population.lead() else {
            return Some(EpisodeOutcome::Extinct);
        };
        if self.score > self.config.success_score {
            Some(EpisodeOutcome::Succeeded { winner: lead.id() })
        } else if tick >= self.config.tick_budget {
            Some(EpisodeOutcome::TickBudgetExhausted)
        } else {
            None
        }
    }

    /// Steps until the episode finishes and returns its result.
    pub fn run(mut self) -> EpisodeResult<P> {
        let span = tracing::info_span!("episode", generation = self.generation);
        let _enter = span.enter();

        while self.step().is_some() {}

        let result = self.finish();
        tracing::info!(
            outcome = ?result.outcome,
            ticks = result.ticks,
            score = result.score,
            "episode finished"
        );
        result
    }

    /// Ends the episode and returns its result.
    ///
    /// An episode that has not reached a terminal state yet is reported as
    /// [`EpisodeOutcome::Aborted`].
    pub fn finish(self) -> EpisodeResult<P> {
        let outcome = self.outcome.unwrap_or(EpisodeOutcome::Aborted);
        let (agents, providers) = self
            .population
            .into_members()
            .into_iter()
            .map(|member| {
                let agent = AgentOutcome {
                    id: member.id(),
                    fitness: member.fitness(),
                    removal: member.removal(),
                };
                (agent, member.into_provider())
            })
            .unzip();

        EpisodeResult {
            outcome,
            ticks: self.tick,
            score: self.score,
            agents,
            providers,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _, rngs::StdRng};

    use super::*;
    use crate::decision::{self, DecisionError};

    const EPS: f32 = 1e-3;

    fn stay(_: &Observation) -> Decision {
        Decision::Stay
    }

    /// Pins every obstacle gap to `[150, 350]`.
    fn pinned_gap() -> EpisodeConfig {
        let mut config = EpisodeConfig::default();
        config.world.gap_top_min = 150.0;
        config.world.gap_top_max = 150.0;
        config
    }

    fn evaluator<P>(config: EpisodeConfig, providers: Vec<P>) -> EpisodeEvaluator<P>
    where
        P: DecisionProvider,
    {
        EpisodeEvaluator::new(config, WorldSeed::from(7), providers).unwrap()
    }

    #[test]
    fn test_never_jumping_agent_falls_out() {
        let result = evaluator(EpisodeConfig::default(), vec![decision::from_fn(stay)]).run();

        assert!(result.outcome().is_extinct());
        assert_eq!(result.ticks(), 27);
        assert_eq!(result.score(), 0);
        let agent = result.agents()[0];
        assert!((agent.fitness - 2.7).abs() < EPS);
        assert_eq!(
            agent.removal,
            Some(Removal {
                tick: 27,
                cause: RemovalCause::OutOfBounds
            })
        );
    }

    #[test]
    fn test_agent_jumping_below_gap_passes_obstacle() {
        let provider = decision::from_fn(|obs: &Observation| Decision::from(obs.y > 350.0));
        let mut evaluator = evaluator(pinned_gap(), vec![provider]);

        for _ in 0..58 {
            let report = evaluator.step().unwrap();
            assert_eq!(report.score, 0);
            assert_eq!(report.live_agents, 1);
        }
        let report = evaluator.step().unwrap();
        assert_eq!(report.tick, 59);
        assert!(report.passed_obstacle);
        assert_eq!(report.score, 1);
        assert_eq!(report.live_agents, 1);

        let lead = evaluator.population().lead().unwrap();
        assert!((lead.fitness() - (0.1 * 59.0 + 5.0)).abs() < EPS);
        assert_eq!(evaluator.obstacles().len(), 2);
    }

    #[test]
    fn test_removed_agent_fitness_is_frozen() {
        let mut config = pinned_gap();
        config.world.first_obstacle_x = 343.0;
        let providers: Vec<Box<dyn DecisionProvider>> = vec![
            Box::new(decision::from_fn(stay)),
            Box::new(decision::from_fn(|obs: &Observation| {
                Decision::from(obs.y > 330.0)
            })),
        ];
        let mut evaluator = evaluator(config, providers);

        let mut live = 2;
        let mut survivor_fitness = 0.0;
        for tick in 1..=50 {
            let report = evaluator.step().unwrap();
            assert!(report.live_agents <= live);
            live = report.live_agents;

            let expected = if tick < 10 { 2 } else { 1 };
            assert_eq!(report.live_agents, expected, "tick {tick}");
            assert_eq!(report.collided, usize::from(tick == 10), "tick {tick}");

            let survivor = evaluator
                .population()
                .member(AgentId::new(1))
                .unwrap()
                .fitness();
            assert!(survivor >= survivor_fitness);
            survivor_fitness = survivor;

            if tick >= 10 {
                let removed = evaluator.population().member(AgentId::new(0)).unwrap();
                assert!(removed.fitness().abs() < EPS);
                assert_eq!(
                    removed.removal(),
                    Some(Removal {
                        tick: 10,
                        cause: RemovalCause::Collision
                    })
                );
            }
        }
        assert_eq!(evaluator.score(), 1);
        assert!(evaluator.outcome().is_none());

        let result = evaluator.finish();
        assert!(result.outcome().is_aborted());
        assert_eq!(result.agents().len(), 2);
        assert!(result.fitness(AgentId::new(0)).unwrap().abs() < EPS);
        assert!(result.agents()[1].removal.is_none());
    }

    #[test]
    fn test_faulty_providers_behave_like_staying() {
        struct Failing;

        impl DecisionProvider for Failing {
            fn decide(&self, _observation: &Observation) -> Result<Decision, DecisionError> {
                Err(DecisionError::NonFiniteOutput { output: f32::NAN })
            }
        }

        struct Panicking;

        impl DecisionProvider for Panicking {
            fn decide(&self, _observation: &Observation) -> Result<Decision, DecisionError> {
                panic!("broken controller");
            }
        }

        let config = EpisodeConfig {
            workers: Some(2),
            ..EpisodeConfig::default()
        };
        let providers: Vec<Box<dyn DecisionProvider>> = vec![
            Box::new(Failing),
            Box::new(Panicking),
            Box::new(decision::from_fn(stay)),
        ];
        let result = evaluator(config, providers).run();

        assert!(result.outcome().is_extinct());
        assert_eq!(result.ticks(), 27);
        let fitness: Vec<_> = result.agents().iter().map(|a| a.fitness).collect();
        assert!(fitness.iter().all(|f| (f - fitness[2]).abs() < EPS));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = EpisodeConfig::default();
        config.world.floor = -100.0;
        let result = EpisodeEvaluator::new(config, WorldSeed::from(0), vec![decision::from_fn(stay)]);
        assert!(matches!(result, Err(ConfigError::World(_))));
    }

    #[test]
    fn test_non_finite_gap_range_is_rejected() {
        let mut config = EpisodeConfig::default();
        config.world.gap_top_max = f32::INFINITY;
        let result = EpisodeEvaluator::new(config, WorldSeed::from(0), vec![decision::from_fn(stay)]);
        assert!(matches!(result, Err(ConfigError::World(_))));
    }

    #[test]
    fn test_empty_population_is_extinct() {
        let providers: Vec<Box<dyn DecisionProvider>> = vec![];
        let mut evaluator = evaluator(EpisodeConfig::default(), providers);
        assert!(evaluator.step().is_none());
        let result = evaluator.run();
        assert!(result.outcome().is_extinct());
        assert_eq!(result.ticks(), 0);
        assert!(result.agents().is_empty());
    }

    #[test]
    fn test_success_names_winner() {
        let config = EpisodeConfig {
            success_score: 0,
            ..pinned_gap()
        };
        let provider = decision::from_fn(|obs: &Observation| Decision::from(obs.y > 350.0));
        let result = evaluator(config, vec![provider]).run();

        assert_eq!(
            result.outcome(),
            EpisodeOutcome::Succeeded {
                winner: AgentId::new(0)
            }
        );
        assert_eq!(result.ticks(), 59);
        assert_eq!(result.winner(), Some(AgentId::new(0)));
        assert!(result.into_winner().is_some());
    }

    #[test]
    fn test_tick_budget_stops_episode() {
        let config = EpisodeConfig {
            tick_budget: 5,
            ..EpisodeConfig::default()
        };
        let mut evaluator = evaluator(config, vec![decision::from_fn(stay)]);
        let reports: Vec<_> = std::iter::from_fn(|| evaluator.step()).collect();

        assert_eq!(reports.len(), 5);
        assert_eq!(
            reports.last().unwrap().outcome,
            Some(EpisodeOutcome::TickBudgetExhausted)
        );
        assert!(evaluator.step().is_none());
        assert_eq!(evaluator.tick(), 5);
    }

    #[test]
    fn test_result_does_not_depend_on_worker_count() {
        let mut rng = StdRng::seed_from_u64(42);
        let seed = WorldSeed::from(rng.random::<u64>());
        let thresholds: Vec<f32> = (0..8).map(|_| rng.random_range(250.0..500.0)).collect();

        let run = |workers| {
            let config = EpisodeConfig {
                workers: Some(workers),
                tick_budget: 2_000,
                ..EpisodeConfig::default()
            };
            let providers = thresholds
                .iter()
                .map(|&threshold| {
                    decision::from_fn(move |obs: &Observation| Decision::from(obs.y > threshold))
                })
                .collect::<Vec<_>>();
            EpisodeEvaluator::new(config, seed, providers).unwrap().run()
        };

        let sequential = run(1);
        let parallel = run(4);
        assert_eq!(sequential.outcome(), parallel.outcome());
        assert_eq!(sequential.ticks(), parallel.ticks());
        assert_eq!(sequential.score(), parallel.score());
        assert_eq!(sequential.agents(), parallel.agents());
    }

    #[test]
    fn test_target_switches_after_lead_passes_first_obstacle() {
        let mut config = pinned_gap();
        config.world.first_obstacle_x = 343.0;
        let provider = decision::from_fn(|obs: &Observation| Decision::from(obs.y > 330.0));
        let mut evaluator = evaluator(config, vec![provider]);

        for _ in 0..15 {
            evaluator.step();
        }
        let obstacles = evaluator.obstacles();
        assert_eq!(obstacles.len(), 2);
        assert!(obstacles[0].is_passed());
        assert_eq!(evaluator.target(), Some(&obstacles[1]));
    }
}
