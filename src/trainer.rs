//! Utilities for training networks on a single sample.

use crate::error::Result;
use crate::network::Network;

use std::time::{Duration, Instant};

/// A builder for training a network with online gradient descent.
#[derive(Debug)]
pub struct Trainer {
    network: Network,
    logging: Logging,
    stop_condition: StopCondition,
}

impl Trainer {
    /// Creates a new Trainer instance.
    ///
    /// The trainer is initialized with some default values. These defaults are:
    ///
    /// * Stops after 1000 training iterations.
    /// * Logs on training completion.
    ///
    /// The learning rate is the one `network` was built with.
    pub fn new(network: Network) -> Self {
        Trainer {
            network,
            logging: Logging::Completion,
            stop_condition: StopCondition::Iterations(1000),
        }
    }

    /// Sets the type of logging to be emitted during training.
    pub fn logging(mut self, logging: Logging) -> Self {
        self.logging = logging;
        self
    }

    /// Sets the condition to finish training.
    pub fn stop_condition<C>(mut self, condition: C) -> Self
    where
        C: Into<StopCondition>,
    {
        self.stop_condition = condition.into();
        self
    }

    /// Repeatedly feeds `input` forward and backpropagates against `target`
    /// until the stop condition holds.
    ///
    /// Returns:
    ///   The trained network, or an error if `input` or `target` do not
    ///   match the network's topology.
    pub fn train(mut self, input: &[f64], target: &[f64]) -> Result<Network> {
        self.network.set_current_input(input)?;
        self.network.set_current_target(target)?;

        let start_time = Instant::now();
        let mut iteration = 0;
        loop {
            self.network.feed_forward();
            self.network.try_back_propagate()?;
            iteration += 1;

            let training_error = self.network.error();
            self.logging.iteration(iteration, training_error);
            if self
                .stop_condition
                .should_stop(iteration, training_error, start_time)
            {
                break;
            }
        }
        self.logging
            .completion(iteration, self.network.error(), start_time);
        Ok(self.network)
    }
}

/// Logging frequency to use during training
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Logging {
    /// No logs will be emitted
    Silent,
    /// A summary will be logged at completion
    Completion,
    /// A summary will be logged after every `n` training iterations
    Iterations(usize),
}

impl Logging {
    /// Performs logging at the current `iteration` of training.
    fn iteration(&self, iteration: usize, training_error: f64) {
        if let Logging::Iterations(freq) = *self {
            if freq > 0 && iteration % freq == 0 {
                info!("iteration {}: error={}", iteration, training_error);
            }
        }
    }

    /// Performs logging at the end of training.
    fn completion(&self, iterations: usize, training_error: f64, start_time: Instant) {
        if let Logging::Silent = *self {
            return;
        }
        info!(
            "ran {} iterations in {:.3} seconds, final error: {}",
            iterations,
            start_time.elapsed().as_secs_f64(),
            training_error
        );
    }
}

/// When to stop training
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StopCondition {
    /// Stops after the provided number of training iterations
    Iterations(usize),
    /// Stops when the aggregate error drops below the provided threshold
    ErrorThreshold(f64),
    /// Stops after the provided duration
    Duration(Duration),
}

impl From<Duration> for StopCondition {
    fn from(duration: Duration) -> StopCondition {
        StopCondition::Duration(duration)
    }
}

impl StopCondition {
    /// Returns true if training is complete.
    fn should_stop(&self, iteration: usize, training_error: f64, start_time: Instant) -> bool {
        match *self {
            StopCondition::Iterations(iterations) => iteration >= iterations,
            StopCondition::ErrorThreshold(threshold) => training_error < threshold,
            StopCondition::Duration(duration) => start_time.elapsed() > duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn network() -> Network {
        Network::with_seed(&[1, 1], 0.1, 5).unwrap()
    }

    #[test]
    fn wrong_input_size() {
        let result = Trainer::new(network()).train(&[0.0, 0.0], &[0.0]);
        assert!(matches!(result, Err(Error::InputSize { .. })));
    }

    #[test]
    fn wrong_target_size() {
        let result = Trainer::new(network()).train(&[0.0], &[0.0, 0.0]);
        assert!(matches!(result, Err(Error::TargetSize { .. })));
    }

    #[test]
    fn always_takes_one_step() {
        let network = Trainer::new(network())
            .stop_condition(StopCondition::Iterations(0))
            .train(&[1.0], &[0.5])
            .unwrap();
        assert_eq!(network.historical_errors().len(), 1);
    }

    #[test]
    fn stops_after_iterations() {
        let network = Trainer::new(network())
            .logging(Logging::Silent)
            .stop_condition(StopCondition::Iterations(50))
            .train(&[1.0], &[0.5])
            .unwrap();
        let history = network.historical_errors();
        assert_eq!(history.len(), 50);
        assert!(history[49] < history[0]);
    }

    #[test]
    fn stops_below_threshold() {
        let network = Trainer::new(network())
            .logging(Logging::Iterations(10))
            .stop_condition(StopCondition::ErrorThreshold(f64::INFINITY))
            .train(&[1.0], &[0.5])
            .unwrap();
        assert_eq!(network.historical_errors().len(), 1);
    }

    #[test]
    fn stops_after_duration() {
        let network = Trainer::new(network())
            .stop_condition(Duration::from_millis(0))
            .train(&[1.0], &[0.5])
            .unwrap();
        assert!(!network.historical_errors().is_empty());
    }
}
