//! A fully connected [feedforward neural network]
//! (https://en.wikipedia.org/wiki/Feedforward_neural_network) trained one
//! sample at a time.
//!
//! # Example
//!
//! Let's teach a single-input network to output 0.5:
//!
//! ```
//! # use unitnet::network::Network;
//! let mut network = Network::with_seed(&[1, 1], 0.1, 42).unwrap();
//! network.set_current_input(&[1.0]).unwrap();
//! network.set_current_target(&[0.5]).unwrap();
//!
//! for _ in 0..50 {
//!     network.feed_forward();
//!     network.back_propagate();
//! }
//!
//! let history = network.historical_errors();
//! assert_eq!(history.len(), 50);
//! assert!(history[49] < history[0]);
//! ```

use crate::error::{Error, Result};
use crate::layer::Layer;
use crate::matrix::Mat;
use crate::utils::{Back, Front};

use itertools::multizip;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A feedforward neural network.
///
/// Weight matrix `i` maps layer `i` onto layer `i + 1` and has shape
/// `topology[i + 1] x topology[i]`. Bias matrix `i` is added when computing
/// layer `i`; bias 0 is kept for symmetry but never read or updated.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "Snapshot", into = "Snapshot")]
pub struct Network {
    topology: Vec<usize>,
    layers: Vec<Layer>,
    weights: Vec<Mat>,
    biases: Vec<Mat>,
    input: Vec<f64>,
    target: Vec<f64>,
    errors: Vec<f64>,
    error: f64,
    historical_errors: Vec<f64>,
    learning_rate: f64,
}

/// The trained state of a network: everything but unit values and the
/// training history.
#[derive(Serialize, Deserialize)]
struct Snapshot {
    topology: Vec<usize>,
    weights: Vec<Mat>,
    biases: Vec<Mat>,
    learning_rate: f64,
}

impl From<Network> for Snapshot {
    fn from(network: Network) -> Self {
        Snapshot {
            topology: network.topology,
            weights: network.weights,
            biases: network.biases,
            learning_rate: network.learning_rate,
        }
    }
}

impl TryFrom<Snapshot> for Network {
    type Error = Error;

    fn try_from(snapshot: Snapshot) -> Result<Self> {
        Network::from_parts(
            snapshot.topology,
            snapshot.weights,
            snapshot.biases,
            snapshot.learning_rate,
        )
    }
}

pub(crate) fn validate_topology(topology: &[usize]) -> Result<()> {
    if topology.len() < 2 {
        return Err(Error::InvalidTopology(format!(
            "need at least 2 layers, got {}",
            topology.len()
        )));
    }
    if let Some(i) = topology.iter().position(|&size| size == 0) {
        return Err(Error::InvalidTopology(format!("layer {} has no units", i)));
    }
    Ok(())
}

impl Network {
    /// Creates a new, untrained network with weights drawn from an
    /// OS-seeded generator.
    ///
    /// Arguments:
    ///  * `topology` - the number of units in each layer, input first.
    ///  * `learning_rate` - the gradient descent step size.
    pub fn new(topology: &[usize], learning_rate: f64) -> Result<Self> {
        Network::with_rng(topology, learning_rate, &mut StdRng::from_os_rng())
    }

    /// Like `new`, but initialization is reproducible for a given `seed`.
    pub fn with_seed(topology: &[usize], learning_rate: f64, seed: u64) -> Result<Self> {
        Network::with_rng(topology, learning_rate, &mut StdRng::seed_from_u64(seed))
    }

    /// Creates a new network, drawing every weight from `rng`. Weights are
    /// uniform in `[0, 1)`, biases and unit values start at zero.
    pub fn with_rng<R>(topology: &[usize], learning_rate: f64, rng: &mut R) -> Result<Self>
    where
        R: Rng,
    {
        validate_topology(topology)?;
        if !learning_rate.is_finite() || learning_rate <= 0.0 {
            return Err(Error::InvalidLearningRate(learning_rate));
        }

        let weights = topology
            .windows(2)
            .map(|pair| Mat::random(pair[1], pair[0], &mut *rng))
            .collect();
        let biases = topology.iter().map(|&size| Mat::zeros(size, 1)).collect();
        debug!(
            "created network with topology {:?}, learning rate {}",
            topology, learning_rate
        );
        Ok(Network::assemble(topology.to_vec(), weights, biases, learning_rate))
    }

    /// Rebuilds a network from trained parameters, checking every shape
    /// against `topology`. Unit values start at zero.
    pub fn from_parts(
        topology: Vec<usize>,
        weights: Vec<Mat>,
        biases: Vec<Mat>,
        learning_rate: f64,
    ) -> Result<Self> {
        validate_topology(&topology)?;
        if weights.len() != topology.len() - 1 {
            return Err(Error::InvalidTopology(format!(
                "{} layers need {} weight matrices, got {}",
                topology.len(),
                topology.len() - 1,
                weights.len()
            )));
        }
        if biases.len() != topology.len() {
            return Err(Error::InvalidTopology(format!(
                "{} layers need {} bias matrices, got {}",
                topology.len(),
                topology.len(),
                biases.len()
            )));
        }
        for (i, w) in weights.iter().enumerate() {
            check_shape("weight", w, (topology[i + 1], topology[i]))?;
        }
        for (b, &size) in biases.iter().zip(&topology) {
            check_shape("bias", b, (size, 1))?;
        }
        if !learning_rate.is_finite() {
            return Err(Error::InvalidLearningRate(learning_rate));
        }
        Ok(Network::assemble(topology, weights, biases, learning_rate))
    }

    fn assemble(topology: Vec<usize>, weights: Vec<Mat>, biases: Vec<Mat>, learning_rate: f64) -> Self {
        let layers = topology.iter().map(|&size| Layer::new(size)).collect();
        Network {
            topology,
            layers,
            weights,
            biases,
            input: Vec::new(),
            target: Vec::new(),
            errors: Vec::new(),
            error: 0.0,
            historical_errors: Vec::new(),
            learning_rate,
        }
    }

    /// Returns the size of the input layer.
    pub fn input_len(&self) -> usize {
        *self.topology.front()
    }

    /// Returns the size of the output layer.
    pub fn output_len(&self) -> usize {
        *self.topology.back()
    }

    /// Loads `input` into the input layer.
    pub fn set_current_input(&mut self, input: &[f64]) -> Result<()> {
        if input.len() != self.input_len() {
            return Err(Error::InputSize {
                expected: self.input_len(),
                actual: input.len(),
            });
        }
        self.input = input.to_vec();
        self.layers.mut_front().set_values(input);
        Ok(())
    }

    /// Sets the expected output for the next backward pass.
    pub fn set_current_target(&mut self, target: &[f64]) -> Result<()> {
        if target.len() != self.output_len() {
            return Err(Error::TargetSize {
                expected: self.output_len(),
                actual: target.len(),
            });
        }
        self.target = target.to_vec();
        Ok(())
    }

    /// The values layer `i` passes on to the next layer. The input layer
    /// passes its raw values.
    fn layer_output(&self, i: usize) -> Mat {
        if i == 0 {
            self.layers[i].to_raw_matrix()
        } else {
            self.layers[i].to_activated_matrix()
        }
    }

    /// Feeds the current input through the network, updating every unit.
    pub fn feed_forward(&mut self) {
        for i in 0..self.layers.len() - 1 {
            let a = self.layer_output(i);
            let z = &(&self.weights[i] * &a) + &self.biases[i + 1];
            self.layers[i + 1].set_values(z.as_slice());
        }
    }

    fn check_target(&self) -> Result<()> {
        if self.target.is_empty() {
            return Err(Error::TargetNotSet);
        }
        if self.target.len() != self.output_len() {
            return Err(Error::TargetSize {
                expected: self.output_len(),
                actual: self.target.len(),
            });
        }
        Ok(())
    }

    /// Computes the halved squared error of each output unit against the
    /// target and records their sum in the error history.
    ///
    /// Panics if no target has been set.
    pub fn set_errors(&mut self) {
        if let Err(e) = self.check_target() {
            panic!("{}", e);
        }
        let output = self.layers.back();
        self.errors = multizip((output.units(), &self.target))
            .map(|(unit, t)| 0.5 * (unit.activated() - t).powi(2))
            .collect();
        self.error = self.errors.iter().sum();
        self.historical_errors.push(self.error);
    }

    /// Runs one step of gradient descent against the current target.
    ///
    /// Panics if no target has been set; see `try_back_propagate`.
    pub fn back_propagate(&mut self) {
        if let Err(e) = self.try_back_propagate() {
            panic!("{}", e);
        }
    }

    /// Runs one step of gradient descent against the current target,
    /// assuming `feed_forward` has run for the current input.
    pub fn try_back_propagate(&mut self) -> Result<()> {
        self.check_target()?;
        self.set_errors();

        let output = self.layers.back();
        let target = Mat::column(&self.target);
        let mut delta = (&output.to_activated_matrix() - &target)
            .elementwise_mul(&output.to_derivative_matrix());

        for i in (0..self.weights.len()).rev() {
            let vals = self.layer_output(i);
            let gradient = &delta * &vals.transpose();

            // The bias step must use the delta of layer i + 1, before it is
            // propagated back to layer i.
            let mut bias_step = delta.clone();
            bias_step.scalar_mul(self.learning_rate);
            let biases = &self.biases[i + 1] - &bias_step;

            let next_delta = (&self.weights[i].transpose() * &delta)
                .elementwise_mul(&self.layers[i].to_derivative_matrix());

            let mut weight_step = gradient;
            weight_step.scalar_mul(self.learning_rate);
            let weights = &self.weights[i] - &weight_step;

            self.weights[i] = weights;
            self.biases[i + 1] = biases;
            delta = next_delta;
        }
        trace!(
            "step {}: error {}",
            self.historical_errors.len(),
            self.error
        );
        Ok(())
    }

    /// Feeds `input` through the network and returns the raw values of the
    /// output layer. The target and error state are left untouched.
    pub fn predict(&mut self, input: &[f64]) -> Result<Mat> {
        self.set_current_input(input)?;
        self.feed_forward();
        Ok(self.layers.back().to_raw_matrix())
    }

    /// Returns the activated values of the output layer.
    pub fn output(&self) -> Mat {
        self.layers.back().to_activated_matrix()
    }

    /// Returns the raw values of layer `layer` as a column vector.
    pub fn raw_matrix(&self, layer: usize) -> Mat {
        self.layers[layer].to_raw_matrix()
    }

    /// Returns the activated values of layer `layer` as a column vector.
    pub fn activated_matrix(&self, layer: usize) -> Mat {
        self.layers[layer].to_activated_matrix()
    }

    /// Returns the unit derivatives of layer `layer` as a column vector.
    pub fn derivative_matrix(&self, layer: usize) -> Mat {
        self.layers[layer].to_derivative_matrix()
    }

    /// Returns the weights mapping layer `index` onto layer `index + 1`.
    pub fn weight_matrix(&self, index: usize) -> &Mat {
        &self.weights[index]
    }

    /// Returns the bias column of layer `index`. Layer 0 never applies its biases.
    pub fn bias_matrix(&self, index: usize) -> &Mat {
        &self.biases[index]
    }

    /// Returns every weight matrix, input side first.
    pub fn weights(&self) -> &[Mat] {
        &self.weights
    }

    /// Returns every bias matrix, one per layer.
    pub fn biases(&self) -> &[Mat] {
        &self.biases
    }

    /// Replaces weight matrix `index`, which must keep its shape.
    pub fn set_weight_matrix(&mut self, index: usize, weights: Mat) -> Result<()> {
        check_shape("weight", &weights, self.weights[index].shape())?;
        self.weights[index] = weights;
        Ok(())
    }

    /// Replaces bias matrix `index`, which must keep its shape.
    pub fn set_bias_matrix(&mut self, index: usize, biases: Mat) -> Result<()> {
        check_shape("bias", &biases, self.biases[index].shape())?;
        self.biases[index] = biases;
        Ok(())
    }

    /// Returns the layers, input layer first.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Returns layer `index`. Panics when out of range.
    pub fn layer(&self, index: usize) -> &Layer {
        &self.layers[index]
    }

    /// Returns the number of units in each layer.
    pub fn topology(&self) -> &[usize] {
        &self.topology
    }

    /// Returns the gradient descent step size.
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Returns the input last loaded with `set_current_input`.
    pub fn input(&self) -> &[f64] {
        &self.input
    }

    /// Returns the target last set with `set_current_target`.
    pub fn target(&self) -> &[f64] {
        &self.target
    }

    /// Per-output-unit errors from the last backward pass.
    pub fn errors(&self) -> &[f64] {
        &self.errors
    }

    /// Aggregate error from the last backward pass.
    pub fn error(&self) -> f64 {
        self.error
    }

    /// Aggregate error of every backward pass so far, oldest first.
    pub fn historical_errors(&self) -> &[f64] {
        &self.historical_errors
    }
}

fn check_shape(op: &'static str, m: &Mat, expected: (usize, usize)) -> Result<()> {
    if m.shape() != expected {
        return Err(Error::DimensionMismatch {
            op,
            left: expected,
            right: m.shape(),
        });
    }
    Ok(())
}
