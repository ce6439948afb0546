use anyhow::Context;
use chrono::{DateTime, Utc};
use flapevo_training::network::Network;
use serde::{Deserialize, Serialize};

/// A trained controller as saved to disk.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    /// Generation the network was taken from
    pub generation: u64,
    pub fitness: f32,
    /// Best score reached in that generation's episodes
    pub score: u32,
    /// Whether the network won an episode
    pub succeeded: bool,
    pub hidden: usize,
    pub weights: Vec<f32>,
}

impl NetworkModel {
    pub(crate) fn to_network(&self) -> anyhow::Result<Network> {
        Network::new(self.hidden, self.weights.clone())
            .with_context(|| format!("Model {} does not describe a valid network", self.name))
    }
}
