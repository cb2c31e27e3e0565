//! Categorical Encoding
//!
//! Label → integer code tables built once from the training scenarios and
//! persisted with the model. Codes follow sorted label order, so the same
//! observed label set always yields the same table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{RecoveryError, RecoveryResult};
use crate::logic::scenario::Scenario;

/// Encoding table for one categorical attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEncoder {
    /// Attribute name, used in error messages
    pub field: String,
    /// Sorted labels; a label's code is its position
    pub labels: Vec<String>,
}

impl CategoryEncoder {
    /// Build from the labels observed in training
    pub fn fit<'a, I>(field: &str, observed: I) -> RecoveryResult<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let labels: BTreeSet<&str> = observed.into_iter().collect();
        if labels.is_empty() {
            return Err(RecoveryError::EmptyDataset(format!(
                "no `{}` labels observed",
                field
            )));
        }

        Ok(Self {
            field: field.to_string(),
            labels: labels.into_iter().map(String::from).collect(),
        })
    }

    /// Code for `label`; labels unseen in training are rejected
    pub fn encode(&self, label: &str) -> RecoveryResult<f64> {
        self.labels
            .binary_search_by(|l| l.as_str().cmp(label))
            .map(|code| code as f64)
            .map_err(|_| {
                RecoveryError::input(
                    &self.field,
                    format!("label '{}' was not seen during training", label),
                )
            })
    }

    pub fn decode(&self, code: usize) -> Option<&str> {
        self.labels.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// All categorical tables of the feature layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingTables {
    pub clinic_type: CategoryEncoder,
    pub attack_type: CategoryEncoder,
}

impl EncodingTables {
    pub fn fit(scenarios: &[Scenario]) -> RecoveryResult<Self> {
        Ok(Self {
            clinic_type: CategoryEncoder::fit(
                "clinic_type",
                scenarios.iter().map(|s| s.clinic_type.as_str()),
            )?,
            attack_type: CategoryEncoder::fit(
                "attack_type",
                scenarios.iter().map(|s| s.attack_type.as_str()),
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_sorted_order() {
        let enc = CategoryEncoder::fit(
            "attack_type",
            ["ransomware", "phishing", "malware", "phishing"],
        )
        .unwrap();
        assert_eq!(enc.labels, vec!["malware", "phishing", "ransomware"]);
        assert_eq!(enc.encode("malware").unwrap(), 0.0);
        assert_eq!(enc.encode("ransomware").unwrap(), 2.0);
        assert_eq!(enc.decode(1), Some("phishing"));
    }

    #[test]
    fn test_unseen_label_is_rejected() {
        let enc = CategoryEncoder::fit("attack_type", ["phishing"]).unwrap();
        let err = enc.encode("unknown_type").unwrap_err();
        assert!(matches!(err, RecoveryError::Input { ref field, .. } if field == "attack_type"));
    }

    #[test]
    fn test_empty_fit_fails() {
        let err = CategoryEncoder::fit("clinic_type", std::iter::empty()).unwrap_err();
        assert!(matches!(err, RecoveryError::EmptyDataset(_)));
    }
}
