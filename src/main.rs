use anyhow::Result;
use burn::tensor::backend::{AutodiffBackend, Backend};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use polarity::checkpoint;
use polarity::config::{ClassifierConfig, TrainConfig};
use polarity::data::{get_test, get_train, BatchLoader};
use polarity::device::{default_device, TrainBackend};
use polarity::history;
use polarity::model::SequenceClassifier;
use polarity::training::Trainer;

type EvalBackend = <TrainBackend as AutodiffBackend>::InnerBackend;

const DATA_DIR: &str = "data";

#[derive(Debug, Parser)]
#[command(author, version, about = "Train a transformer sentiment classifier")]
struct Cli {
    /// Output checkpoint path
    out: PathBuf,
    /// Batch size
    #[arg(long = "B", default_value_t = 16)]
    batch_size: usize,
    /// Number of epochs
    #[arg(long, default_value_t = 2)]
    epochs: usize,
    /// Learning rate
    #[arg(long, default_value_t = 1e-6)]
    lr: f64,
    /// Epoch index at which the learning rate decays
    #[arg(long, default_value_t = 10)]
    sch: usize,
    /// Random seed
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = TrainConfig {
        out_path: cli.out,
        batch_size: cli.batch_size,
        epochs: cli.epochs,
        learning_rate: cli.lr,
        sch_milestone: cli.sch,
        seed: cli.seed,
        print_freq: 25,
        model: ClassifierConfig::default(),
    };
    config.validate();

    // Record the invocation before the run touches anything else.
    let invocation: Vec<String> = std::env::args().collect();
    history::append_invocation(history::DEFAULT_HISTORY_FILE, &invocation)?;

    // One seed governs backend initialization and the shuffle permutations.
    let device = default_device();
    <TrainBackend as Backend>::seed(&device, config.seed);

    let train_corpus = get_train(DATA_DIR)?;
    let test_corpus = get_test(DATA_DIR)?;
    train_corpus.check_max_seq_len(config.model.max_seq_len)?;
    test_corpus.check_max_seq_len(config.model.max_seq_len)?;
    info!(
        "Loaded {} train / {} test examples (seq len {})",
        train_corpus.len(),
        test_corpus.len(),
        train_corpus.seq_len()
    );

    let mut train_loader = BatchLoader::<TrainBackend>::new(
        train_corpus,
        config.batch_size,
        true,
        config.seed,
        device.clone(),
    );
    let mut val_loader = BatchLoader::<EvalBackend>::new(
        test_corpus,
        config.batch_size,
        false,
        config.seed,
        device.clone(),
    );

    info!("Initializing classifier...");
    let model = SequenceClassifier::<TrainBackend>::new(config.model.clone(), &device);

    let mut trainer = Trainer::new(model, config.clone(), device);
    trainer.fit(&mut train_loader, &mut val_loader)?;

    checkpoint::save_model(trainer.into_model(), &config.out_path)?;
    info!("Training completed!");

    Ok(())
}
