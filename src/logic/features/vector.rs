//! Feature Derivation
//!
//! Maps a `Scenario` onto the fixed `FEATURE_LAYOUT` order. Training and
//! prediction both go through `derive_row`, so the two can never disagree
//! on ordering or encoding.

use super::encoding::EncodingTables;
use super::layout::FEATURE_COUNT;
use crate::error::{RecoveryError, RecoveryResult};
use crate::logic::scenario::Scenario;

/// One feature vector, ordered by `FEATURE_LAYOUT`
pub type FeatureRow = [f64; FEATURE_COUNT];

fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

/// Derive the feature row of `scenario` with the given encoding tables
pub fn derive_row(scenario: &Scenario, encoders: &EncodingTables) -> RecoveryResult<FeatureRow> {
    let posture = &scenario.posture;

    Ok([
        scenario.monthly_revenue,
        scenario.monthly_expenses,
        scenario.profit_margin,
        scenario.cash_reserves,
        scenario.operating_runway,
        scenario.staff_count as f64,
        scenario.it_budget_pct,
        scenario.attack_severity,
        scenario.financial_loss_ratio,
        flag(posture.has_backup),
        flag(posture.has_incident_plan),
        flag(posture.has_cyber_insurance),
        flag(posture.security_training),
        encoders.clinic_type.encode(scenario.clinic_type.as_str())?,
        encoders.attack_type.encode(scenario.attack_type.as_str())?,
    ])
}

// ============================================================================
// TRAINING SET
// ============================================================================

/// Feature matrix + targets + the encoding used to build them
#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub rows: Vec<FeatureRow>,
    pub targets: Vec<f64>,
    pub encoders: EncodingTables,
}

impl TrainingSet {
    /// Fit the encoders on `scenarios` and derive every row
    pub fn from_scenarios(scenarios: &[Scenario]) -> RecoveryResult<Self> {
        if scenarios.is_empty() {
            return Err(RecoveryError::EmptyDataset("no scenarios supplied".into()));
        }

        let encoders = EncodingTables::fit(scenarios)?;
        let rows = scenarios
            .iter()
            .map(|s| derive_row(s, &encoders))
            .collect::<RecoveryResult<Vec<_>>>()?;
        let targets = scenarios.iter().map(|s| s.recovery_weeks).collect();

        Ok(Self { rows, targets, encoders })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
