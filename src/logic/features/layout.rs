//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the feature schema**
//!
//! ## Rules:
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! Stored artifacts carry the version and layout hash; a build with a
//! different layout refuses to load them.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::error::{RecoveryError, RecoveryResult};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the vector
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Financials (0-4) ===
    "monthly_revenue",       // 0
    "monthly_expenses",      // 1
    "profit_margin",         // 2: (revenue - expenses) / revenue
    "cash_reserves",         // 3
    "operating_runway",      // 4: reserves / expenses (months)

    // === Organization (5-6) ===
    "staff_count",           // 5
    "it_budget_pct",         // 6

    // === Attack (7-8) ===
    "attack_severity",       // 7
    "financial_loss_ratio",  // 8: loss / revenue

    // === Posture flags (9-12), 0.0 or 1.0 ===
    "has_backup",            // 9
    "has_incident_plan",     // 10
    "has_cyber_insurance",   // 11
    "security_training",     // 12

    // === Encoded categoricals (13-14) ===
    "clinic_type_encoded",   // 13
    "attack_type_encoded",   // 14
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 15;

/// Positions used by code that reads single features
pub mod idx {
    pub const PROFIT_MARGIN: usize = 2;
    pub const IT_BUDGET_PCT: usize = 6;
    pub const FINANCIAL_LOSS_RATIO: usize = 8;
    pub const HAS_BACKUP: usize = 9;
    pub const HAS_INCIDENT_PLAN: usize = 10;
    pub const HAS_CYBER_INSURANCE: usize = 11;
    pub const SECURITY_TRAINING: usize = 12;
    pub const CLINIC_TYPE: usize = 13;
    pub const ATTACK_TYPE: usize = 14;
}

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of the feature layout
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

pub fn layout_hash() -> u32 {
    compute_layout_hash()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Layout fingerprint stored with every artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Check this fingerprint against the running build
    pub fn validate(&self) -> RecoveryResult<()> {
        validate_layout(self.version, self.hash)
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Validate that incoming data matches current layout
pub fn validate_layout(incoming_version: u8, incoming_hash: u32) -> RecoveryResult<()> {
    let current_hash = layout_hash();

    if incoming_version != FEATURE_VERSION || incoming_hash != current_hash {
        return Err(RecoveryError::LayoutMismatch {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}
