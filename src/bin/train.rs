use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::{error, info};

use unitnet::trainer::{Logging, StopCondition, Trainer};
use unitnet::Network;

/// Trains a network on a single input/target pair and saves the model.
#[derive(Parser, Debug)]
struct Cli {
    /// level of logging details (into stderr), overridden by RUST_LOG
    #[arg(short, long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// units per layer, input layer first
    #[arg(long, value_delimiter = ',', default_values_t = vec![5, 128, 256, 10])]
    topology: Vec<usize>,

    /// learning rate
    #[arg(long, default_value_t = 0.01)]
    learning_rate: f64,

    /// number of training steps
    #[arg(long, default_value_t = 600)]
    epochs: usize,

    /// log progress every this many steps, 0 to only log on completion
    #[arg(long, default_value_t = 100)]
    log_every: usize,

    /// seed for weight initialization, random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// start from a saved model instead of a fresh network
    #[arg(long)]
    load: Option<PathBuf>,

    /// input vector, comma separated
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true,
          default_values_t = vec![1.0, 2.0, 3.0, 4.0, 5.0])]
    input: Vec<f64>,

    /// target vector, comma separated
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true,
          default_values_t = vec![10.0, 4.0, 3.0, 2.0, 1.0, 0.0, 9.0, 8.0, 7.0, 6.0])]
    target: Vec<f64>,

    /// where to write the trained model
    #[arg(short, long, default_value = "trained_model.nn")]
    output: PathBuf,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
    Off,
}

impl LogLevel {
    fn filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
            LogLevel::Off => "off",
        }
    }
}

fn run(cli: &Cli) -> unitnet::Result<()> {
    let network = match (&cli.load, cli.seed) {
        (Some(path), _) => Network::load_model(path)?,
        (None, Some(seed)) => Network::with_seed(&cli.topology, cli.learning_rate, seed)?,
        (None, None) => Network::new(&cli.topology, cli.learning_rate)?,
    };
    info!(
        "training {:?} network for {} steps",
        network.topology(),
        cli.epochs
    );

    let logging = match cli.log_every {
        0 => Logging::Completion,
        n => Logging::Iterations(n),
    };
    let network = Trainer::new(network)
        .logging(logging)
        .stop_condition(StopCondition::Iterations(cli.epochs))
        .train(&cli.input, &cli.target)?;

    println!("Final output:");
    for (value, target) in network.output().as_slice().iter().zip(network.target()) {
        println!("{:>12.6}\t(target {})", value, target);
    }

    network.save_model(&cli.output)?;
    info!("model saved to {}", cli.output.display());
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(cli.log_level.filter())).init();

    if let Err(e) = run(&cli) {
        error!("{}", e);
        process::exit(1);
    }
}
