//! Predictor
//!
//! Turns one consumer-supplied scenario into a recovery-time estimate using
//! a loaded artifact. Derived attributes are always recomputed from the raw
//! inputs, so a prediction sees exactly the features training saw.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_RECOVERY_WEEKS, MIN_RECOVERY_WEEKS};
use crate::error::{RecoveryError, RecoveryResult};
use crate::logic::features::derive_row;
use crate::logic::scenario::{AttackType, ClinicType, Scenario, SecurityPosture};
use crate::logic::store::{load_artifact, ModelArtifact};

// ============================================================================
// INPUT
// ============================================================================

/// Scenario attributes as supplied by a consumer
///
/// Every field is optional here so that a missing attribute can be reported
/// by name instead of as a generic parse failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioInput {
    pub clinic_type: Option<String>,
    pub attack_type: Option<String>,
    pub monthly_revenue: Option<f64>,
    pub monthly_expenses: Option<f64>,
    pub cash_reserves: Option<f64>,
    pub staff_count: Option<u32>,
    pub it_budget_pct: Option<f64>,
    pub attack_severity: Option<f64>,
    /// Either this or `financial_loss_ratio` is required
    pub financial_loss: Option<f64>,
    pub financial_loss_ratio: Option<f64>,
    pub has_backup: Option<bool>,
    pub has_incident_plan: Option<bool>,
    #[serde(alias = "has_insurance")]
    pub has_cyber_insurance: Option<bool>,
    pub security_training: Option<bool>,
}

fn required<T: Copy>(value: Option<T>, field: &str) -> RecoveryResult<T> {
    value.ok_or_else(|| RecoveryError::missing(field))
}

fn finite(value: Option<f64>, field: &str) -> RecoveryResult<f64> {
    let v = required(value, field)?;
    if !v.is_finite() {
        return Err(RecoveryError::input(field, format!("must be a finite number, got {}", v)));
    }
    Ok(v)
}

fn positive(value: Option<f64>, field: &str) -> RecoveryResult<f64> {
    let v = finite(value, field)?;
    if v <= 0.0 {
        return Err(RecoveryError::input(field, format!("must be positive, got {}", v)));
    }
    Ok(v)
}

fn non_negative(value: Option<f64>, field: &str) -> RecoveryResult<f64> {
    let v = finite(value, field)?;
    if v < 0.0 {
        return Err(RecoveryError::input(field, format!("must not be negative, got {}", v)));
    }
    Ok(v)
}

impl ScenarioInput {
    /// Validate and complete into a `Scenario`
    ///
    /// Margin, runway and (when only the absolute loss is given) the loss
    /// ratio are derived here. The target is unknown and left at 0.0.
    pub fn to_scenario(&self) -> RecoveryResult<Scenario> {
        let clinic_type: ClinicType = self
            .clinic_type
            .as_deref()
            .ok_or_else(|| RecoveryError::missing("clinic_type"))?
            .parse()?;
        let attack_type: AttackType = self
            .attack_type
            .as_deref()
            .ok_or_else(|| RecoveryError::missing("attack_type"))?
            .parse()?;

        let monthly_revenue = positive(self.monthly_revenue, "monthly_revenue")?;
        let monthly_expenses = positive(self.monthly_expenses, "monthly_expenses")?;
        let cash_reserves = non_negative(self.cash_reserves, "cash_reserves")?;
        let staff_count = required(self.staff_count, "staff_count")?;
        if staff_count == 0 {
            return Err(RecoveryError::input("staff_count", "must be positive, got 0"));
        }

        let it_budget_pct = non_negative(self.it_budget_pct, "it_budget_pct")?;
        if it_budget_pct > 1.0 {
            return Err(RecoveryError::input(
                "it_budget_pct",
                format!("must be a fraction of revenue, got {}", it_budget_pct),
            ));
        }
        let attack_severity = non_negative(self.attack_severity, "attack_severity")?;

        let (financial_loss, financial_loss_ratio) = match (self.financial_loss, self.financial_loss_ratio) {
            (_, Some(_)) => {
                let ratio = non_negative(self.financial_loss_ratio, "financial_loss_ratio")?;
                let loss = match self.financial_loss {
                    Some(_) => non_negative(self.financial_loss, "financial_loss")?,
                    None => ratio * monthly_revenue,
                };
                (loss, ratio)
            }
            (Some(_), None) => {
                let loss = non_negative(self.financial_loss, "financial_loss")?;
                (loss, loss / monthly_revenue)
            }
            (None, None) => return Err(RecoveryError::missing("financial_loss")),
        };

        let posture = SecurityPosture {
            has_backup: required(self.has_backup, "has_backup")?,
            has_incident_plan: required(self.has_incident_plan, "has_incident_plan")?,
            has_cyber_insurance: required(self.has_cyber_insurance, "has_cyber_insurance")?,
            security_training: required(self.security_training, "security_training")?,
        };

        Ok(Scenario {
            clinic_type,
            monthly_revenue,
            monthly_expenses,
            cash_reserves,
            profit_margin: Scenario::margin(monthly_revenue, monthly_expenses),
            operating_runway: Scenario::runway(cash_reserves, monthly_expenses),
            staff_count,
            it_budget_pct,
            attack_type,
            attack_severity,
            financial_loss,
            financial_loss_ratio,
            posture,
            recovery_weeks: 0.0,
        })
    }
}

impl From<&Scenario> for ScenarioInput {
    fn from(s: &Scenario) -> Self {
        Self {
            clinic_type: Some(s.clinic_type.as_str().to_string()),
            attack_type: Some(s.attack_type.as_str().to_string()),
            monthly_revenue: Some(s.monthly_revenue),
            monthly_expenses: Some(s.monthly_expenses),
            cash_reserves: Some(s.cash_reserves),
            staff_count: Some(s.staff_count),
            it_budget_pct: Some(s.it_budget_pct),
            attack_severity: Some(s.attack_severity),
            financial_loss: Some(s.financial_loss),
            financial_loss_ratio: Some(s.financial_loss_ratio),
            has_backup: Some(s.posture.has_backup),
            has_incident_plan: Some(s.posture.has_incident_plan),
            has_cyber_insurance: Some(s.posture.has_cyber_insurance),
            security_training: Some(s.posture.security_training),
        }
    }
}

// ============================================================================
// ESTIMATE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryEstimate {
    /// Weeks, clamped to [1, 12]
    pub weeks: f64,
    /// Model output before clamping
    pub raw_weeks: f64,
    pub clamped: bool,
    pub model_name: String,
}

// ============================================================================
// PREDICTOR
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Predictor {
    artifact: Option<ModelArtifact>,
}

impl Predictor {
    /// Predictor with no model; every prediction fails with `UntrainedModel`
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> RecoveryResult<Self> {
        Ok(Self::from_artifact(load_artifact(path)?))
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Self {
        Self {
            artifact: Some(artifact),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.artifact.is_some()
    }

    pub fn artifact(&self) -> Option<&ModelArtifact> {
        self.artifact.as_ref()
    }

    pub fn predict(&self, input: &ScenarioInput) -> RecoveryResult<RecoveryEstimate> {
        let artifact = self.artifact.as_ref().ok_or(RecoveryError::UntrainedModel)?;
        self.estimate(artifact, &input.to_scenario()?)
    }

    /// Predict for an already-complete scenario (its target is ignored)
    pub fn predict_scenario(&self, scenario: &Scenario) -> RecoveryResult<RecoveryEstimate> {
        let artifact = self.artifact.as_ref().ok_or(RecoveryError::UntrainedModel)?;
        self.estimate(artifact, scenario)
    }

    fn estimate(&self, artifact: &ModelArtifact, scenario: &Scenario) -> RecoveryResult<RecoveryEstimate> {
        let row = derive_row(scenario, &artifact.encoders)?;
        let (raw_weeks, weeks) = artifact.predict_row(&row);

        if !raw_weeks.is_finite() {
            return Err(RecoveryError::input(
                "scenario",
                format!("{} produced a non-finite estimate", artifact.model_name),
            ));
        }

        let clamped = !(MIN_RECOVERY_WEEKS..=MAX_RECOVERY_WEEKS).contains(&raw_weeks);
        if clamped {
            log::debug!("Clamped {:.2} weeks to {:.2}", raw_weeks, weeks);
        }

        Ok(RecoveryEstimate {
            weeks,
            raw_weeks,
            clamped,
            model_name: artifact.model_name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::{EncodingTables, StandardScaler};
    use crate::logic::model::LinearEstimator;
    use crate::logic::scenario::ScenarioGenerator;
    use crate::logic::store::save_artifact;
    use tempfile::TempDir;

    fn scenarios() -> Vec<Scenario> {
        ScenarioGenerator::new().unwrap().generate_seeded(60, 42)
    }

    /// Artifact whose model always outputs `intercept`
    fn constant_artifact(intercept: f64) -> ModelArtifact {
        let encoders = EncodingTables::fit(&scenarios()).unwrap();
        let mut linear = LinearEstimator::new();
        linear.intercept = intercept;
        linear.fitted = true;
        ModelArtifact::new(
            linear.into(),
            StandardScaler::identity(),
            encoders,
            Default::default(),
            Vec::new(),
            None,
            60,
            42,
        )
        .unwrap()
    }

    fn sample_input() -> ScenarioInput {
        ScenarioInput::from(&scenarios()[0])
    }

    #[test]
    fn test_unloaded_predictor_is_untrained() {
        let err = Predictor::new().predict(&sample_input()).unwrap_err();
        assert!(matches!(err, RecoveryError::UntrainedModel));
    }

    #[test]
    fn test_unknown_attack_type_is_input_error() {
        let predictor = Predictor::from_artifact(constant_artifact(5.0));
        let input = ScenarioInput {
            attack_type: Some("unknown_type".into()),
            ..sample_input()
        };
        let err = predictor.predict(&input).unwrap_err();
        assert!(matches!(err, RecoveryError::Input { ref field, .. } if field == "attack_type"));
    }

    #[test]
    fn test_missing_field_is_named() {
        let predictor = Predictor::from_artifact(constant_artifact(5.0));
        let input = ScenarioInput {
            monthly_revenue: None,
            ..sample_input()
        };
        let err = predictor.predict(&input).unwrap_err();
        assert!(matches!(err, RecoveryError::Input { ref field, .. } if field == "monthly_revenue"));
    }

    #[test]
    fn test_zero_staff_is_input_error() {
        let predictor = Predictor::from_artifact(constant_artifact(5.0));
        let input = ScenarioInput {
            staff_count: Some(0),
            ..sample_input()
        };
        let err = predictor.predict(&input).unwrap_err();
        assert!(matches!(err, RecoveryError::Input { ref field, .. } if field == "staff_count"));
    }

    #[test]
    fn test_loss_ratio_derived_from_absolute_loss() {
        let input = ScenarioInput {
            monthly_revenue: Some(40_000.0),
            financial_loss: Some(10_000.0),
            financial_loss_ratio: None,
            ..sample_input()
        };
        let scenario = input.to_scenario().unwrap();
        assert_eq!(scenario.financial_loss_ratio, 0.25);

        let neither = ScenarioInput {
            financial_loss: None,
            financial_loss_ratio: None,
            ..sample_input()
        };
        let err = neither.to_scenario().unwrap_err();
        assert!(matches!(err, RecoveryError::Input { ref field, .. } if field == "financial_loss"));
    }

    #[test]
    fn test_derived_fields_are_recomputed() {
        let input = ScenarioInput {
            monthly_revenue: Some(50_000.0),
            monthly_expenses: Some(40_000.0),
            cash_reserves: Some(80_000.0),
            ..sample_input()
        };
        let scenario = input.to_scenario().unwrap();
        assert!((scenario.profit_margin - 0.2).abs() < 1e-12);
        assert!((scenario.operating_runway - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_has_insurance_alias() {
        let json = r#"{"has_insurance": true}"#;
        let input: ScenarioInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.has_cyber_insurance, Some(true));
    }

    #[test]
    fn test_clamping_is_observable() {
        let high = Predictor::from_artifact(constant_artifact(40.0))
            .predict(&sample_input())
            .unwrap();
        assert_eq!(high.weeks, MAX_RECOVERY_WEEKS);
        assert_eq!(high.raw_weeks, 40.0);
        assert!(high.clamped);

        let low = Predictor::from_artifact(constant_artifact(-3.0))
            .predict(&sample_input())
            .unwrap();
        assert_eq!(low.weeks, MIN_RECOVERY_WEEKS);
        assert!(low.clamped);

        let inside = Predictor::from_artifact(constant_artifact(6.5))
            .predict(&sample_input())
            .unwrap();
        assert_eq!(inside.weeks, 6.5);
        assert!(!inside.clamped);
        assert_eq!(inside.model_name, "Linear Regression");
    }

    #[test]
    fn test_load_from_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("model.json");
        save_artifact(&constant_artifact(3.0), &path).unwrap();

        let predictor = Predictor::load(&path).unwrap();
        assert!(predictor.is_loaded());
        assert_eq!(predictor.predict(&sample_input()).unwrap().weeks, 3.0);
    }
}
