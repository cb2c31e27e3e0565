//! Scenario Generator
//!
//! Synthesizes clinic + attack scenarios with consistent financials and a
//! recovery-time target derived from them.
//!
//! ## Draw order (per scenario, from one stream)
//! 1. clinic type  2. revenue  3. expense fraction  4. staff count
//! 5. IT budget  6. cash multiple  7. attack type  8. severity
//! 9. loss factor  10-13. backup, incident plan, insurance, training
//! 14. base recovery  15. jitter
//!
//! Changing this order changes every generated dataset.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use super::types::{AttackType, ClinicType, Scenario, SecurityPosture};
use crate::constants::clamp_weeks;
use crate::error::{RecoveryError, RecoveryResult};

// ============================================================================
// GENERATION CONSTANTS
// ============================================================================

/// Revenue never drops below this floor
pub const REVENUE_FLOOR: f64 = 15_000.0;
/// Expenses never drop below this share of revenue
pub const MIN_EXPENSE_FRACTION: f64 = 0.7;
/// Cash reserves as a multiple of monthly revenue
pub const CASH_MULTIPLE: (f64, f64) = (1.2, 3.5);
/// Share of revenue x severity lost to the attack
pub const LOSS_FACTOR: (f64, f64) = (0.1, 0.8);
/// Multiplicative noise applied to every recovery time
pub const JITTER: (f64, f64) = (0.8, 1.2);

/// Bernoulli success probabilities for posture flags
pub const BACKUP_PROBABILITY: f64 = 0.7;
pub const INCIDENT_PLAN_PROBABILITY: f64 = 0.4;
pub const INSURANCE_PROBABILITY: f64 = 0.3;
pub const TRAINING_PROBABILITY: f64 = 0.5;

// Recovery multipliers (< 1 shortens recovery)
pub const BACKUP_FACTOR: f64 = 0.6;
pub const INCIDENT_PLAN_FACTOR: f64 = 0.7;
pub const INSURANCE_FACTOR: f64 = 0.8;
pub const TRAINING_FACTOR: f64 = 0.9;
pub const HEALTHY_MARGIN_FACTOR: f64 = 0.8;
pub const LONG_RUNWAY_FACTOR: f64 = 0.7;
pub const IT_INVESTMENT_FACTOR: f64 = 0.75;
pub const LARGE_STAFF_FACTOR: f64 = 1.2;

// Thresholds for the financial/size adjustments
pub const HEALTHY_MARGIN: f64 = 0.15;
/// Months of runway (about 60 days)
pub const LONG_RUNWAY_MONTHS: f64 = 2.0;
pub const HIGH_IT_BUDGET: f64 = 0.08;
pub const LARGE_STAFF: u32 = 20;

// ============================================================================
// RECOVERY MODEL
// ============================================================================

/// Inputs of the recovery-time formula
#[derive(Debug, Clone, Copy)]
pub struct RecoveryDrivers {
    /// Attack-specific starting duration (weeks)
    pub base_weeks: f64,
    pub posture: SecurityPosture,
    pub profit_margin: f64,
    pub operating_runway: f64,
    pub it_budget_pct: f64,
    pub staff_count: u32,
    /// Noise multiplier, drawn from `JITTER`
    pub jitter: f64,
}

/// Raw and bounded recovery time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecoveryOutcome {
    pub raw_weeks: f64,
    pub weeks: f64,
}

impl RecoveryOutcome {
    pub fn was_clamped(&self) -> bool {
        self.raw_weeks != self.weeks
    }
}

/// Deterministic recovery-time formula (the only randomness is in `drivers`)
pub fn compute_recovery_weeks(drivers: &RecoveryDrivers) -> RecoveryOutcome {
    let mut weeks = drivers.base_weeks;

    let posture = &drivers.posture;
    if posture.has_backup {
        weeks *= BACKUP_FACTOR;
    }
    if posture.has_incident_plan {
        weeks *= INCIDENT_PLAN_FACTOR;
    }
    if posture.has_cyber_insurance {
        weeks *= INSURANCE_FACTOR;
    }
    if posture.security_training {
        weeks *= TRAINING_FACTOR;
    }

    if drivers.profit_margin > HEALTHY_MARGIN {
        weeks *= HEALTHY_MARGIN_FACTOR;
    }
    if drivers.operating_runway > LONG_RUNWAY_MONTHS {
        weeks *= LONG_RUNWAY_FACTOR;
    }
    if drivers.it_budget_pct > HIGH_IT_BUDGET {
        weeks *= IT_INVESTMENT_FACTOR;
    }

    if drivers.staff_count > LARGE_STAFF {
        weeks *= LARGE_STAFF_FACTOR;
    }

    weeks *= drivers.jitter;

    RecoveryOutcome {
        raw_weeks: weeks,
        weeks: clamp_weeks(weeks),
    }
}

// ============================================================================
// GENERATOR
// ============================================================================

/// Seeded scenario generator
///
/// Holds only the per-clinic revenue distributions; all state that changes
/// between draws lives in the caller's random stream.
#[derive(Debug, Clone)]
pub struct ScenarioGenerator {
    revenue: [Normal<f64>; 3],
}

impl ScenarioGenerator {
    pub fn new() -> RecoveryResult<Self> {
        let build = |clinic: ClinicType| {
            let profile = clinic.profile();
            Normal::new(profile.revenue_mean, profile.revenue_std)
                .map_err(|e| RecoveryError::Config(format!("revenue distribution for {}: {}", clinic, e)))
        };

        Ok(Self {
            revenue: [
                build(ClinicType::SoloPractice)?,
                build(ClinicType::SmallGroup)?,
                build(ClinicType::MediumGroup)?,
            ],
        })
    }

    /// Generate `count` scenarios from the given stream
    pub fn generate(&self, count: usize, rng: &mut ChaCha8Rng) -> Vec<Scenario> {
        (0..count).map(|_| self.sample(rng)).collect()
    }

    /// Convenience: fresh stream from `seed`
    pub fn generate_seeded(&self, count: usize, seed: u64) -> Vec<Scenario> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.generate(count, &mut rng)
    }

    /// Draw one scenario (see module docs for the draw order)
    pub fn sample(&self, rng: &mut ChaCha8Rng) -> Scenario {
        let clinic_index = rng.gen_range(0..ClinicType::ALL.len());
        let clinic_type = ClinicType::ALL[clinic_index];
        let profile = clinic_type.profile();

        let monthly_revenue = self.revenue[clinic_index].sample(rng).max(REVENUE_FLOOR);
        let expense_fraction = rng.gen_range(profile.expense_fraction.0..profile.expense_fraction.1);
        let monthly_expenses = (monthly_revenue * expense_fraction)
            .max(monthly_revenue * MIN_EXPENSE_FRACTION);
        let staff_count = rng.gen_range(profile.staff.0..profile.staff.1);
        let it_budget_pct = rng.gen_range(profile.it_budget_pct.0..profile.it_budget_pct.1);

        let profit_margin = Scenario::margin(monthly_revenue, monthly_expenses);
        let cash_reserves = monthly_revenue * rng.gen_range(CASH_MULTIPLE.0..CASH_MULTIPLE.1);
        let operating_runway = Scenario::runway(cash_reserves, monthly_expenses);

        let attack_type = AttackType::ALL[rng.gen_range(0..AttackType::ALL.len())];
        let (sev_lo, sev_hi) = attack_type.severity_range();
        let attack_severity = rng.gen_range(sev_lo..sev_hi);
        let financial_loss =
            monthly_revenue * attack_severity * rng.gen_range(LOSS_FACTOR.0..LOSS_FACTOR.1);

        let posture = SecurityPosture {
            has_backup: rng.gen_bool(BACKUP_PROBABILITY),
            has_incident_plan: rng.gen_bool(INCIDENT_PLAN_PROBABILITY),
            has_cyber_insurance: rng.gen_bool(INSURANCE_PROBABILITY),
            security_training: rng.gen_bool(TRAINING_PROBABILITY),
        };

        let (base_lo, base_hi) = attack_type.base_recovery_range();
        let drivers = RecoveryDrivers {
            base_weeks: rng.gen_range(base_lo..base_hi),
            posture,
            profit_margin,
            operating_runway,
            it_budget_pct,
            staff_count,
            jitter: rng.gen_range(JITTER.0..JITTER.1),
        };
        let outcome = compute_recovery_weeks(&drivers);

        Scenario {
            clinic_type,
            monthly_revenue,
            monthly_expenses,
            cash_reserves,
            profit_margin,
            operating_runway,
            staff_count,
            it_budget_pct,
            attack_type,
            attack_severity,
            financial_loss,
            financial_loss_ratio: financial_loss / monthly_revenue,
            posture,
            recovery_weeks: outcome.weeks,
        }
    }
}
