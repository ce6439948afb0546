//! Concurrent decision gathering.
//!
//! Decision gathering is the only phase of a tick that runs in parallel. The live agents'
//! queries are split into contiguous chunks, one chunk per scoped worker thread. Each
//! worker only reads its queries (provider reference plus an owned [`Observation`]) and
//! returns decisions; nothing in the world is mutated. Leaving [`thread::scope`] is the
//! barrier: the coordinating thread sees every answer before it touches any agent.
//!
//! ```text
//! queries ─┬─ worker 0: q0 q1 q2 ─┐
//!          ├─ worker 1: q3 q4 q5 ─┼─ join (barrier) ─→ decisions, in query order
//!          └─ worker 2: q6 q7     ─┘
//! ```
//!
//! # Faults
//!
//! A query that returns an error, panics, or takes longer than the configured timeout is
//! answered with [`Decision::Stay`] and logged. One faulty provider never stops the episode.
//!
//! Timeouts are checked after the fact: a slow provider still occupies its worker until it
//! returns, but its late answer is discarded.

use std::{
    num::NonZeroUsize,
    panic::{self, AssertUnwindSafe},
    thread,
    time::{Duration, Instant},
};

use crate::{
    decision::{Decision, DecisionProvider, Observation},
    population::AgentId,
};

/// A single pending decision.
#[derive(Debug)]
pub struct DecisionQuery<'a, P: ?Sized> {
    pub id: AgentId,
    pub provider: &'a P,
    pub observation: Observation,
}

/// Fan-out / barrier / fan-in over decision queries.
#[derive(Debug, Clone, Copy)]
pub struct DecisionGatherer {
    workers: NonZeroUsize,
    timeout: Option<Duration>,
}

impl DecisionGatherer {
    #[must_use]
    pub fn new(workers: NonZeroUsize, timeout: Option<Duration>) -> Self {
        Self { workers, timeout }
    }

    /// Answers every query and returns the decisions in query order.
    ///
    /// Runs inline on the calling thread when only one worker would be used.
    pub fn gather<P>(&self, queries: &[DecisionQuery<'_, P>]) -> Vec<Decision>
    where
        P: DecisionProvider + ?Sized,
    {
        let workers = self.workers.get().min(queries.len());
        if workers <= 1 {
            return queries.iter().map(|q| self.query(q)).collect();
        }

        let chunk_size = queries.len().div_ceil(workers);
        thread::scope(|s| {
            let handles = queries
                .chunks(chunk_size)
                .map(|chunk| {
                    let handle =
                        s.spawn(move || chunk.iter().map(|q| self.query(q)).collect::<Vec<_>>());
                    (chunk, handle)
                })
                .collect::<Vec<_>>();

            let mut decisions = Vec::with_capacity(queries.len());
            for (chunk, handle) in handles {
                match handle.join() {
                    Ok(answers) => decisions.extend(answers),
                    Err(_) => {
                        tracing::warn!(
                            agents = chunk.len(),
                            "decision worker died; treating its agents as not jumping"
                        );
                        decisions.extend(chunk.iter().map(|_| Decision::Stay));
                    }
                }
            }
            decisions
        })
    }

    fn query<P>(&self, query: &DecisionQuery<'_, P>) -> Decision
    where
        P: DecisionProvider + ?Sized,
    {
        let started = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            query.provider.decide(&query.observation)
        }));
        let elapsed = started.elapsed();

        match result {
            Ok(Ok(_)) if self.timeout.is_some_and(|timeout| elapsed > timeout) => {
                tracing::warn!(
                    agent = %query.id,
                    ?elapsed,
                    "decision provider timed out; treating as no jump"
                );
                Decision::Stay
            }
            Ok(Ok(decision)) => decision,
            Ok(Err(error)) => {
                tracing::warn!(
                    agent = %query.id,
                    %error,
                    "decision provider failed; treating as no jump"
                );
                Decision::Stay
            }
            Err(_) => {
                tracing::warn!(
                    agent = %query.id,
                    "decision provider panicked; treating as no jump"
                );
                Decision::Stay
            }
        }
    }
}
