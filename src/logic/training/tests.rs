//! Training Module Tests

#[cfg(test)]
mod integration_tests {
    use crate::error::RecoveryError;
    use crate::logic::features::TrainingSet;
    use crate::logic::model::Regressor;
    use crate::logic::scenario::ScenarioGenerator;
    use crate::logic::training::{Trainer, TrainerConfig};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn small_config() -> TrainerConfig {
        TrainerConfig {
            forest_trees: 10,
            boosting_rounds: 30,
            ..TrainerConfig::default()
        }
    }

    fn training_set(count: usize, seed: u64) -> TrainingSet {
        let scenarios = ScenarioGenerator::new().unwrap().generate_seeded(count, seed);
        TrainingSet::from_scenarios(&scenarios).unwrap()
    }

    #[test]
    fn test_default_pipeline_beats_constant_baseline() {
        let set = training_set(150, 42);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let outcome = Trainer::default().train(&set, &mut rng).unwrap();

        assert_eq!(outcome.candidates.len(), 4);
        assert_eq!(outcome.test_rows.len(), 30);
        assert_eq!(outcome.train_size, 120);

        let best = outcome.best();
        assert!(best.metrics.is_finite());
        assert!(best.metrics.mae >= 0.0);
        assert!(best.metrics.mae < 11.0);

        for c in &outcome.candidates {
            assert!(c.metrics.is_finite(), "{} metrics not finite", c.name);
            assert!(c.estimator.is_fitted());
            assert!(best.metrics.cv_mae <= c.metrics.cv_mae);
        }
    }

    #[test]
    fn test_best_beats_baseline_across_seeds() {
        let seeds = [42u64, 7, 2024, 99];
        let (mut best_total, mut baseline_total) = (0.0, 0.0);

        for &seed in &seeds {
            let set = training_set(150, seed);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let outcome = Trainer::new(small_config()).train(&set, &mut rng).unwrap();
            best_total += outcome.best().metrics.mae;
            baseline_total += outcome.baseline_mae;
        }

        let n = seeds.len() as f64;
        assert!(
            best_total / n < baseline_total / n,
            "mean best MAE {:.3} vs mean baseline {:.3}",
            best_total / n,
            baseline_total / n
        );
    }

    #[test]
    fn test_predictions_stay_in_range() {
        let set = training_set(80, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let outcome = Trainer::new(small_config()).train(&set, &mut rng).unwrap();

        for row in &set.rows {
            let weeks = outcome.predict_best(row);
            assert!((1.0..=12.0).contains(&weeks));
        }
    }

    #[test]
    fn test_training_is_reproducible() {
        let set = training_set(60, 9);
        let a = Trainer::new(small_config())
            .train(&set, &mut ChaCha8Rng::seed_from_u64(9))
            .unwrap();
        let b = Trainer::new(small_config())
            .train(&set, &mut ChaCha8Rng::seed_from_u64(9))
            .unwrap();

        assert_eq!(a.best_index, b.best_index);
        for (x, y) in a.candidates.iter().zip(&b.candidates) {
            assert_eq!(x.metrics, y.metrics);
        }
    }

    #[test]
    fn test_only_ensembles_report_importances() {
        let set = training_set(60, 5);
        let outcome = Trainer::new(small_config())
            .train(&set, &mut ChaCha8Rng::seed_from_u64(5))
            .unwrap();

        let with_importance: Vec<&str> = outcome
            .candidates
            .iter()
            .filter(|c| c.feature_importance.is_some())
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(with_importance, vec!["Random Forest", "Gradient Boosting"]);
    }

    #[test]
    fn test_zero_variance_target_is_rejected() {
        let mut set = training_set(40, 1);
        set.targets.iter_mut().for_each(|y| *y = 4.0);
        let err = Trainer::new(small_config())
            .train(&set, &mut ChaCha8Rng::seed_from_u64(1))
            .unwrap_err();
        assert!(matches!(err, RecoveryError::EmptyDataset(_)));
    }

    #[test]
    fn test_empty_dataset_is_rejected() {
        let mut set = training_set(10, 1);
        set.rows.clear();
        set.targets.clear();
        let err = Trainer::default()
            .train(&set, &mut ChaCha8Rng::seed_from_u64(1))
            .unwrap_err();
        assert!(matches!(err, RecoveryError::EmptyDataset(_)));
    }

    #[test]
    fn test_too_few_rows_for_folds() {
        let set = training_set(5, 2);
        let err = Trainer::new(small_config())
            .train(&set, &mut ChaCha8Rng::seed_from_u64(2))
            .unwrap_err();
        assert!(matches!(err, RecoveryError::EmptyDataset(_)));
    }
}
