//! Fixed-topology feed-forward controller.
//!
//! ```text
//! inputs (y, |y - gap_top|, |y - gap_bottom|)
//!     ↓ tanh, `hidden` units (skipped when `hidden == 0`)
//! output
//!     ↓ tanh
//! jump if output > 0.5
//! ```
//!
//! Weights are stored flat. Every neuron owns one weight per input followed by its bias:
//! hidden neurons first, the output neuron last.

use flapevo_evaluator::decision::{Decision, DecisionError, DecisionProvider, Observation};

/// Number of network inputs, one per observation component.
pub const INPUT_COUNT: usize = 3;
/// Outputs above this value mean "jump".
pub const JUMP_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum NetworkError {
    #[display("network with {hidden} hidden units needs {expected} weights, got {actual}")]
    WeightCount {
        hidden: usize,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    hidden: usize,
    weights: Vec<f32>,
}

impl Network {
    /// Returns the number of weights a network with `hidden` hidden units needs.
    ///
    /// ```
    /// use flapevo_training::network::Network;
    ///
    /// assert_eq!(Network::weight_count(0), 4);
    /// assert_eq!(Network::weight_count(2), 11);
    /// ```
    #[must_use]
    pub const fn weight_count(hidden: usize) -> usize {
        if hidden == 0 {
            INPUT_COUNT + 1
        } else {
            hidden * (INPUT_COUNT + 1) + hidden + 1
        }
    }

    pub fn new(hidden: usize, weights: Vec<f32>) -> Result<Self, NetworkError> {
        let expected = Self::weight_count(hidden);
        if weights.len() != expected {
            return Err(NetworkError::WeightCount {
                hidden,
                expected,
                actual: weights.len(),
            });
        }
        Ok(Self { hidden, weights })
    }

    #[must_use]
    pub fn hidden(&self) -> usize {
        self.hidden
    }

    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    #[must_use]
    pub fn into_weights(self) -> Vec<f32> {
        self.weights
    }

    /// Computes the network output for one input vector.
    #[must_use]
    pub fn activate(&self, inputs: [f32; INPUT_COUNT]) -> f32 {
        if self.hidden == 0 {
            return neuron(&self.weights, &inputs);
        }

        let (hidden_weights, output_weights) =
            self.weights.split_at(self.hidden * (INPUT_COUNT + 1));
        let hidden = hidden_weights
            .chunks_exact(INPUT_COUNT + 1)
            .map(|w| neuron(w, &inputs))
            .collect::<Vec<_>>();
        neuron(output_weights, &hidden)
    }
}

/// `tanh(bias + Σ wᵢ·xᵢ)` where the bias is the last weight.
fn neuron(weights: &[f32], inputs: &[f32]) -> f32 {
    let (bias, weights) = weights
        .split_last()
        .map_or((0.0, weights), |(&bias, rest)| (bias, rest));
    let sum: f32 = weights.iter().zip(inputs).map(|(w, x)| w * x).sum();
    (bias + sum).tanh()
}

impl DecisionProvider for Network {
    fn decide(&self, observation: &Observation) -> Result<Decision, DecisionError> {
        let output = self.activate(observation.to_array());
        if !output.is_finite() {
            return Err(DecisionError::NonFiniteOutput { output });
        }
        Ok(Decision::from(output > JUMP_THRESHOLD))
    }
}
