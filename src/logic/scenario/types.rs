//! Scenario Types
//!
//! Core types for simulated clinic/attack events.
//! No sampling logic here - only data structures and their fixed parameters.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::RecoveryError;

// ============================================================================
// CLINIC TYPE
// ============================================================================

/// Clinic size category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClinicType {
    SoloPractice,
    SmallGroup,
    MediumGroup,
}

impl ClinicType {
    pub const ALL: [ClinicType; 3] = [
        ClinicType::SoloPractice,
        ClinicType::SmallGroup,
        ClinicType::MediumGroup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClinicType::SoloPractice => "solo_practice",
            ClinicType::SmallGroup => "small_group",
            ClinicType::MediumGroup => "medium_group",
        }
    }

    /// Sampling parameters for this clinic size
    pub fn profile(&self) -> ClinicProfile {
        match self {
            ClinicType::SoloPractice => ClinicProfile {
                revenue_mean: 25_000.0,
                revenue_std: 5_000.0,
                expense_fraction: (0.85, 0.95),
                staff: (2, 6),
                it_budget_pct: (0.02, 0.05),
            },
            ClinicType::SmallGroup => ClinicProfile {
                revenue_mean: 65_000.0,
                revenue_std: 15_000.0,
                expense_fraction: (0.80, 0.90),
                staff: (6, 15),
                it_budget_pct: (0.03, 0.08),
            },
            ClinicType::MediumGroup => ClinicProfile {
                revenue_mean: 120_000.0,
                revenue_std: 25_000.0,
                expense_fraction: (0.75, 0.85),
                staff: (15, 30),
                it_budget_pct: (0.05, 0.12),
            },
        }
    }
}

impl std::fmt::Display for ClinicType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ClinicType {
    type Err = RecoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| RecoveryError::input("clinic_type", format!("unknown clinic type '{}'", s)))
    }
}

/// Per-size sampling parameters (ranges are half-open `[lo, hi)`)
#[derive(Debug, Clone, Copy)]
pub struct ClinicProfile {
    pub revenue_mean: f64,
    pub revenue_std: f64,
    pub expense_fraction: (f64, f64),
    pub staff: (u32, u32),
    pub it_budget_pct: (f64, f64),
}

// ============================================================================
// ATTACK TYPE
// ============================================================================

/// Attack category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackType {
    Phishing,
    Ransomware,
    DataBreach,
    Malware,
    InsiderThreat,
}

impl AttackType {
    pub const ALL: [AttackType; 5] = [
        AttackType::Phishing,
        AttackType::Ransomware,
        AttackType::DataBreach,
        AttackType::Malware,
        AttackType::InsiderThreat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttackType::Phishing => "phishing",
            AttackType::Ransomware => "ransomware",
            AttackType::DataBreach => "data_breach",
            AttackType::Malware => "malware",
            AttackType::InsiderThreat => "insider_threat",
        }
    }

    /// Severity multiplier range
    pub fn severity_range(&self) -> (f64, f64) {
        match self {
            AttackType::Phishing => (0.5, 1.5),
            AttackType::Ransomware => (2.0, 4.0),
            AttackType::DataBreach => (1.5, 3.0),
            AttackType::Malware => (1.0, 2.5),
            AttackType::InsiderThreat => (1.2, 2.8),
        }
    }

    /// Base recovery duration range (weeks), before posture/financial factors
    pub fn base_recovery_range(&self) -> (f64, f64) {
        match self {
            AttackType::Phishing => (1.0, 3.0),
            AttackType::Ransomware => (3.0, 8.0),
            AttackType::DataBreach => (2.0, 6.0),
            AttackType::Malware => (2.0, 5.0),
            AttackType::InsiderThreat => (2.0, 7.0),
        }
    }
}

impl std::fmt::Display for AttackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AttackType {
    type Err = RecoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| RecoveryError::input("attack_type", format!("unknown attack type '{}'", s)))
    }
}

// ============================================================================
// SECURITY POSTURE
// ============================================================================

/// Preparedness controls present at the clinic
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityPosture {
    pub has_backup: bool,
    pub has_incident_plan: bool,
    pub has_cyber_insurance: bool,
    pub security_training: bool,
}

// ============================================================================
// SCENARIO
// ============================================================================

/// One simulated clinic-attack event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub clinic_type: ClinicType,

    // Financials (monthly, currency units)
    pub monthly_revenue: f64,
    pub monthly_expenses: f64,
    pub cash_reserves: f64,
    /// (revenue - expenses) / revenue
    pub profit_margin: f64,
    /// Months of expenses covered by reserves
    pub operating_runway: f64,

    pub staff_count: u32,
    /// IT spend as a share of revenue (0.0 - 1.0)
    pub it_budget_pct: f64,

    // Attack
    pub attack_type: AttackType,
    pub attack_severity: f64,
    pub financial_loss: f64,
    /// financial_loss / monthly_revenue
    pub financial_loss_ratio: f64,

    #[serde(flatten)]
    pub posture: SecurityPosture,

    /// Target; generated scenarios keep it within [1, 12]
    pub recovery_weeks: f64,
}

impl Scenario {
    /// Derived profit margin for the given financials
    pub fn margin(revenue: f64, expenses: f64) -> f64 {
        (revenue - expenses) / revenue
    }

    /// Derived runway (months) for the given financials
    pub fn runway(cash_reserves: f64, expenses: f64) -> f64 {
        cash_reserves / expenses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip_through_from_str() {
        for clinic in ClinicType::ALL {
            assert_eq!(clinic.as_str().parse::<ClinicType>().unwrap(), clinic);
        }
        for attack in AttackType::ALL {
            assert_eq!(attack.as_str().parse::<AttackType>().unwrap(), attack);
        }
    }

    #[test]
    fn test_unknown_label_is_input_error() {
        let err = "unknown_type".parse::<AttackType>().unwrap_err();
        assert!(matches!(err, RecoveryError::Input { ref field, .. } if field == "attack_type"));
    }

    #[test]
    fn test_ransomware_has_longest_base_recovery() {
        let (_, ransomware_hi) = AttackType::Ransomware.base_recovery_range();
        for attack in AttackType::ALL {
            assert!(attack.base_recovery_range().1 <= ransomware_hi);
        }
        assert_eq!(AttackType::Phishing.base_recovery_range(), (1.0, 3.0));
    }

    #[test]
    fn test_serde_uses_snake_case_labels() {
        let json = serde_json::to_string(&AttackType::InsiderThreat).unwrap();
        assert_eq!(json, "\"insider_threat\"");
    }
}
