//! Training Pipeline
//!
//! generate → derive → train → package → save → report, all driven by one
//! seeded generator so a given configuration always yields the same model.

use std::path::PathBuf;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::Config;
use crate::error::RecoveryResult;
use crate::logic::features::TrainingSet;
use crate::logic::report::TrainingReport;
use crate::logic::scenario::ScenarioGenerator;
use crate::logic::store::{save_artifact, ModelArtifact};
use crate::logic::training::{Trainer, TrainerConfig};

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub artifact: ModelArtifact,
    pub report: TrainingReport,
    pub model_path: PathBuf,
}

/// Train on a freshly generated dataset without touching the disk
pub fn train(config: &Config) -> RecoveryResult<(ModelArtifact, TrainingReport)> {
    config.validate()?;

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let scenarios = ScenarioGenerator::new()?.generate(config.sample_count, &mut rng);
    let set = TrainingSet::from_scenarios(&scenarios)?;
    log::debug!("Derived {} feature rows", set.len());

    let outcome = Trainer::new(TrainerConfig::from(config)).train(&set, &mut rng)?;
    let artifact = ModelArtifact::from_outcome(&outcome, &set.encoders, set.len(), config.seed)?;
    let report = TrainingReport::build(&outcome, scenarios.len(), &mut rng);

    Ok((artifact, report))
}

/// Full run: train, persist the artifact and log the report
pub fn run(config: &Config) -> RecoveryResult<PipelineOutcome> {
    let (artifact, report) = train(config)?;
    save_artifact(&artifact, &config.model_path)?;
    report.log();

    Ok(PipelineOutcome {
        artifact,
        report,
        model_path: config.model_path.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::predictor::{Predictor, ScenarioInput};
    use tempfile::TempDir;

    fn quick_config(dir: &TempDir) -> Config {
        Config {
            sample_count: 80,
            seed: 42,
            model_path: dir.path().join("model.json"),
            forest_trees: 10,
            boosting_rounds: 30,
            ..Config::default()
        }
    }

    #[test]
    fn test_run_persists_loadable_model() {
        let temp = TempDir::new().unwrap();
        let config = quick_config(&temp);
        let outcome = run(&config).unwrap();

        assert!(config.model_path.exists());
        assert_eq!(outcome.report.sample_count, 80);
        assert_eq!(outcome.report.comparisons.len(), 3);

        let predictor = Predictor::load(&config.model_path).unwrap();
        let scenario = ScenarioGenerator::new().unwrap().generate_seeded(1, 7).remove(0);
        let estimate = predictor.predict(&ScenarioInput::from(&scenario)).unwrap();
        assert!((1.0..=12.0).contains(&estimate.weeks));
        assert_eq!(estimate.model_name, outcome.artifact.model_name);
    }

    #[test]
    fn test_same_seed_same_model() {
        let temp = TempDir::new().unwrap();
        let config = quick_config(&temp);
        let (a, _) = train(&config).unwrap();
        let (b, _) = train(&config).unwrap();

        assert_eq!(a.model_name, b.model_name);
        assert_eq!(a.checksum, b.checksum);
        assert_eq!(a.metrics, b.metrics);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let temp = TempDir::new().unwrap();
        let config = Config {
            test_ratio: 1.5,
            ..quick_config(&temp)
        };
        assert!(train(&config).is_err());
    }
}
