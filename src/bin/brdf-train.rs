//! End-to-end BRDF training driver.
//!
//! Usage: `brdf-train [DATA_FILE] [WEIGHTS_FILE]`
//!
//! Loads a whitespace-delimited sample table (4 features + 1 reflectance
//! target per row), normalizes, splits, trains with early stopping, and
//! writes the final weight report. Set `RUST_LOG=info` for per-epoch
//! progress.

use std::env;
use std::process::ExitCode;

use brdf_mlp::{save_weights, train_test_split, Dataset, Network, NormParams, TrainConfig};

const INPUT_DIM: usize = 4;
const TARGET_DIM: usize = 1;
const HIDDEN_SIZE: usize = 64;
const LEARNING_RATE: f32 = 0.01;
const EPOCHS: usize = 200;
const BATCH_SIZE: usize = 64;
const PATIENCE: usize = 10;
const TRAIN_RATIO: f32 = 0.5;
const SPLIT_SEED: u64 = 42;

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err((stage, err)) => {
            eprintln!("{stage} failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), (&'static str, brdf_mlp::Error)> {
    let data_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "black_obsidian_data.txt".to_owned());
    let weights_path = env::args()
        .nth(2)
        .unwrap_or_else(|| "final_weights.txt".to_owned());

    let raw = Dataset::from_table_file(&data_path, INPUT_DIM, TARGET_DIM)
        .map_err(|e| ("load", e))?;
    println!("loaded {} samples from {data_path}", raw.len());

    let norm = NormParams::fit(&raw).map_err(|e| ("normalize", e))?;
    let data = norm.transform(&raw).map_err(|e| ("normalize", e))?;

    let (train, test) =
        train_test_split(&data, TRAIN_RATIO, SPLIT_SEED).map_err(|e| ("split", e))?;
    println!("train: {} samples, test: {} samples", train.len(), test.len());

    let mut network = Network::new_with_rng(INPUT_DIM, HIDDEN_SIZE, TARGET_DIM, &mut rand::rng())
        .map_err(|e| ("train", e))?;
    println!("architecture: {INPUT_DIM} -> {HIDDEN_SIZE} (ReLU) -> {TARGET_DIM} (linear)");

    let cfg = TrainConfig {
        epochs: EPOCHS,
        batch_size: BATCH_SIZE,
        learning_rate: LEARNING_RATE,
        patience: PATIENCE,
    };
    let report = network.fit(&train, &test, cfg).map_err(|e| ("train", e))?;

    if let (Some(train_loss), Some(test_loss)) =
        (report.train_losses.last(), report.test_losses.last())
    {
        println!("final train loss: {train_loss:.6}");
        println!("final test loss: {test_loss:.6}");
    }
    if report.stopped_early {
        println!(
            "stopped early after {} epochs (best epoch: {})",
            report.train_losses.len(),
            report.best_epoch + 1
        );
    }

    save_weights(&network, &weights_path).map_err(|e| ("save", e))?;
    println!("weights saved to {weights_path}");

    Ok(())
}
