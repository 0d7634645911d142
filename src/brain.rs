//! Feed-forward neural controller
//!
//! A fixed-topology perceptron stack with hard-threshold activation: each
//! output fires 1 when the weighted input sum exceeds its bias, else 0.
//! There is no training - weights start uniform in [-1, 1] and the only
//! mutation mechanism nudges them toward fresh random values by a blend
//! factor. The sim feeds it sensor "closeness" readings and reads four
//! binary controls back.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::RaceError;
use crate::geom::lerp;

/// One dense layer: `input_count` inputs fanned into `output_count`
/// step-function neurons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub input_count: usize,
    pub output_count: usize,
    /// Dense weight matrix, indexed `weights[input][output]`
    pub weights: Vec<Vec<f32>>,
    pub biases: Vec<f32>,
}

impl Level {
    fn new(input_count: usize, output_count: usize, rng: &mut Pcg32) -> Self {
        let weights = (0..input_count)
            .map(|_| (0..output_count).map(|_| uniform(rng)).collect())
            .collect();
        let biases = (0..output_count).map(|_| uniform(rng)).collect();
        Self {
            input_count,
            output_count,
            weights,
            biases,
        }
    }

    fn feed_forward(&self, inputs: &[f32]) -> Vec<f32> {
        (0..self.output_count)
            .map(|o| {
                let sum: f32 = inputs
                    .iter()
                    .zip(&self.weights)
                    .map(|(input, row)| input * row[o])
                    .sum();
                if sum > self.biases[o] { 1.0 } else { 0.0 }
            })
            .collect()
    }

    fn mutate(&mut self, amount: f32, rng: &mut Pcg32) {
        for bias in &mut self.biases {
            *bias = lerp(*bias, uniform(rng), amount);
        }
        for row in &mut self.weights {
            for weight in row {
                *weight = lerp(*weight, uniform(rng), amount);
            }
        }
    }
}

/// Ordered stack of levels; the output of level k feeds level k+1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeuralNetwork {
    pub levels: Vec<Level>,
}

impl NeuralNetwork {
    /// Build a network from layer sizes, e.g. `[5, 6, 4]` for five sensor
    /// inputs, six hidden neurons and four control outputs.
    pub fn new(neuron_counts: &[usize], rng: &mut Pcg32) -> Result<Self, RaceError> {
        if neuron_counts.len() < 2 {
            return Err(RaceError::LayerCount(neuron_counts.len()));
        }
        let levels = neuron_counts
            .windows(2)
            .map(|w| Level::new(w[0], w[1], rng))
            .collect();
        Ok(Self { levels })
    }

    pub fn input_count(&self) -> usize {
        self.levels.first().map_or(0, |l| l.input_count)
    }

    pub fn output_count(&self) -> usize {
        self.levels.last().map_or(0, |l| l.output_count)
    }

    /// Single forward pass. Rejects input vectors that do not match the
    /// first level's width; every output element is 0.0 or 1.0.
    pub fn feed_forward(&self, inputs: &[f32]) -> Result<Vec<f32>, RaceError> {
        let expected = self.input_count();
        if inputs.len() != expected {
            return Err(RaceError::InputWidth {
                expected,
                got: inputs.len(),
            });
        }
        let mut outputs = inputs.to_vec();
        for level in &self.levels {
            outputs = level.feed_forward(&outputs);
        }
        Ok(outputs)
    }

    /// Nudge every weight and bias toward a new uniform value. `amount` of
    /// 0 leaves the network unchanged; 1 fully replaces it.
    pub fn mutate(&mut self, amount: f32, rng: &mut Pcg32) {
        for level in &mut self.levels {
            level.mutate(amount, rng);
        }
    }
}

#[inline]
fn uniform(rng: &mut Pcg32) -> f32 {
    rng.random::<f32>() * 2.0 - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn net(seed: u64) -> NeuralNetwork {
        let mut rng = Pcg32::seed_from_u64(seed);
        NeuralNetwork::new(&[5, 6, 4], &mut rng).unwrap()
    }

    #[test]
    fn test_output_shape_and_binary_range() {
        let net = net(1);
        let out = net.feed_forward(&[0.2, 0.9, 0.0, 0.5, 1.0]).unwrap();
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(|&v| v == 0.0 || v == 1.0));
    }

    #[test]
    fn test_wrong_input_width_rejected() {
        let net = net(1);
        let err = net.feed_forward(&[0.1, 0.2, 0.3]).unwrap_err();
        assert_eq!(
            err,
            RaceError::InputWidth {
                expected: 5,
                got: 3
            }
        );
    }

    #[test]
    fn test_fewer_than_two_layers_rejected() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert!(NeuralNetwork::new(&[5], &mut rng).is_err());
        assert!(NeuralNetwork::new(&[], &mut rng).is_err());
    }

    #[test]
    fn test_construction_is_deterministic_for_a_seed() {
        let a = net(9);
        let b = net(9);
        assert_eq!(a.levels[0].biases, b.levels[0].biases);
        assert_eq!(a.levels[1].weights, b.levels[1].weights);
    }

    #[test]
    fn test_weights_start_in_unit_range() {
        let net = net(3);
        for level in &net.levels {
            for row in &level.weights {
                assert!(row.iter().all(|w| (-1.0..=1.0).contains(w)));
            }
            assert!(level.biases.iter().all(|b| (-1.0..=1.0).contains(b)));
        }
    }

    #[test]
    fn test_mutate_zero_is_identity() {
        let mut net = net(5);
        let before = net.clone();
        let mut rng = Pcg32::seed_from_u64(99);
        net.mutate(0.0, &mut rng);
        assert_eq!(net.levels[0].weights, before.levels[0].weights);
        assert_eq!(net.levels[1].biases, before.levels[1].biases);
    }

    #[test]
    fn test_mutate_full_stays_in_unit_range() {
        let mut net = net(5);
        let mut rng = Pcg32::seed_from_u64(99);
        net.mutate(1.0, &mut rng);
        for level in &net.levels {
            for row in &level.weights {
                assert!(row.iter().all(|w| (-1.0..=1.0).contains(w)));
            }
        }
    }
}
