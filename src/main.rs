//! Clinic Cyber Recovery - Training Entry Point
//!
//! Generates a synthetic dataset, trains every candidate model, saves the
//! best one and logs a summary. Settings come from `CLINIC_*` environment
//! variables (a `.env` file is honored).

use anyhow::Context;

use clinic_recovery::config::Config;
use clinic_recovery::constants::{APP_NAME, APP_VERSION};
use clinic_recovery::logic::pipeline;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting {} v{}", APP_NAME, APP_VERSION);

    let config = Config::from_env();
    config.validate().context("invalid configuration")?;

    log::info!(
        "   Samples: {} (seed {}), test ratio {}, {}-fold CV",
        config.sample_count,
        config.seed,
        config.test_ratio,
        config.cv_folds
    );

    let outcome = pipeline::run(&config).context("training pipeline failed")?;

    log::info!(
        "Model '{}' saved to {} (checksum {})",
        outcome.artifact.model_name,
        outcome.model_path.display(),
        &outcome.artifact.checksum[..12.min(outcome.artifact.checksum.len())]
    );

    Ok(())
}
