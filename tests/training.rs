use unitnet::trainer::{Logging, StopCondition, Trainer};
use unitnet::Network;

#[test]
fn error_decreases_on_learnable_target() -> anyhow::Result<()> {
    let mut network = Network::with_seed(&[1, 1], 0.1, 21)?;
    network.set_current_input(&[1.0])?;
    network.set_current_target(&[0.5])?;
    for _ in 0..50 {
        network.feed_forward();
        network.back_propagate();
    }

    let history = network.historical_errors();
    assert_eq!(history.len(), 50);
    assert!(history.iter().all(|&e| e >= 0.0));
    assert!(history[49] < history[0]);
    Ok(())
}

#[test]
fn trainer_stops_at_error_threshold() -> anyhow::Result<()> {
    let network = Network::with_seed(&[1, 1], 0.5, 8)?;
    let start = {
        let mut fresh = network.clone();
        fresh.set_current_input(&[1.0])?;
        fresh.set_current_target(&[0.25])?;
        fresh.feed_forward();
        fresh.set_errors();
        fresh.error()
    };

    let trained = Trainer::new(network)
        .logging(Logging::Silent)
        .stop_condition(StopCondition::ErrorThreshold(1e-3))
        .train(&[1.0], &[0.25])?;
    assert!(trained.error() < start);
    assert!(trained.error() < 1e-3);
    // Every earlier step was still above the threshold.
    let history = trained.historical_errors();
    assert!(history[..history.len() - 1].iter().all(|&e| e >= 1e-3));
    Ok(())
}

#[test]
fn deep_network_error_is_non_negative() -> anyhow::Result<()> {
    let network = Network::with_seed(&[5, 8, 6, 3], 0.01, 3)?;
    let trained = Trainer::new(network)
        .logging(Logging::Silent)
        .stop_condition(StopCondition::Iterations(20))
        .train(&[1.0, 2.0, 3.0, 4.0, 5.0], &[0.3, -0.2, 0.1])?;
    assert_eq!(trained.historical_errors().len(), 20);
    assert!(trained.historical_errors().iter().all(|&e| e >= 0.0));
    Ok(())
}
