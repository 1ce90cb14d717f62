//! Runtime configuration.
//!
//! Resolved once at startup and passed into the engine and the FFI object.
//! Nothing in the library reads environment variables or other ambient
//! state while serving a request.

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{BloodPressure, VitalSigns};
use crate::triage::{ClassificationThresholds, InsightThresholds};

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Chart dates, oldest first.
pub const DEFAULT_HISTORY_DATES: [&str; 8] = [
    "2025-03-10",
    "2025-03-17",
    "2025-03-24",
    "2025-03-31",
    "2025-04-01",
    "2025-04-03",
    "2025-04-05",
    "2025-04-07",
];

/// Villages served by the field teams.
pub const DEFAULT_VILLAGES: [&str; 10] = [
    "Ranchi",
    "Hazaribagh",
    "Dhanbad",
    "Bokaro",
    "Jamshedpur",
    "Dumka",
    "Giridih",
    "Deoghar",
    "Ramgarh",
    "Chatra",
];

/// Triage configuration. Every field falls back to its default, so partial
/// JSON files are accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TriageConfig {
    /// Chart dates for synthesized history, strictly ascending
    pub history_dates: Vec<NaiveDate>,
    /// Known villages
    pub villages: Vec<String>,
    /// Chart anchor for patients without readings
    pub default_reading: VitalSigns,
    pub classification: ClassificationThresholds,
    pub insight: InsightThresholds,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            history_dates: DEFAULT_HISTORY_DATES
                .iter()
                .filter_map(|d| NaiveDate::from_str(d).ok())
                .collect(),
            villages: DEFAULT_VILLAGES.iter().map(|v| v.to_string()).collect(),
            default_reading: VitalSigns::default(),
            classification: ClassificationThresholds::default(),
            insight: InsightThresholds::default(),
        }
    }
}

impl TriageConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check the invariants the engine relies on.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.history_dates.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::Invalid(
                "history_dates must be strictly ascending".into(),
            ));
        }

        if self.villages.is_empty() {
            return Err(ConfigError::Invalid("villages cannot be empty".into()));
        }

        let mut seen = HashSet::new();
        for village in &self.villages {
            if village.trim().is_empty() {
                return Err(ConfigError::Invalid("village names cannot be blank".into()));
            }
            if !seen.insert(village.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate village: {}", village)));
            }
        }

        BloodPressure::from_str(&self.default_reading.blood_pressure).map_err(|e| {
            ConfigError::Invalid(format!("default_reading: {}", e))
        })?;

        if let Some(kind) = self.classification.first_unnested() {
            return Err(ConfigError::Invalid(format!(
                "classification: {} warning bounds must sit inside emergency bounds",
                kind
            )));
        }

        Ok(())
    }

    pub fn is_known_village(&self, village: &str) -> bool {
        self.villages.iter().any(|v| v == village)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VitalKind;
    use crate::triage::{Tier, VitalValue};

    #[test]
    fn test_default_config_valid() {
        let config = TriageConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.history_dates.len(), 8);
        assert_eq!(config.villages.len(), 10);
        assert!(config.is_known_village("Dumka"));
        assert!(!config.is_known_village("Patna"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = TriageConfig::from_json_str(r#"{"villages": ["Ranchi", "Dumka"]}"#).unwrap();
        assert_eq!(config.villages, vec!["Ranchi", "Dumka"]);
        assert_eq!(config.history_dates.len(), 8);
        assert_eq!(config.classification, ClassificationThresholds::STANDARD);
    }

    #[test]
    fn test_threshold_override() {
        let json = r#"{"insight": {"blood_sugar_above": 160.0}}"#;
        let config = TriageConfig::from_json_str(json).unwrap();
        assert_eq!(config.insight.blood_sugar_above, 160.0);
        assert_eq!(config.insight.oxygen_below, 95.0);
    }

    #[test]
    fn test_nested_partial_classification_override() {
        let json = r#"{"classification": {"heart_rate": {"emergency_above": 110.0}}}"#;
        let config = TriageConfig::from_json_str(json).unwrap();
        let thresholds = &config.classification;

        assert_eq!(thresholds.heart_rate.emergency_below, Some(50.0));
        assert_eq!(
            thresholds.classify(VitalKind::HeartRate, VitalValue::Number(45.0)),
            Tier::Emergency
        );
        assert_eq!(
            thresholds.classify(VitalKind::HeartRate, VitalValue::Number(95.0)),
            Tier::Warning
        );
        assert_eq!(thresholds.oxygen_saturation, ClassificationThresholds::STANDARD.oxygen_saturation);
    }

    #[test]
    fn test_rejects_warning_outside_emergency() {
        let json = r#"{"classification": {"heart_rate": {"warning_above": 120.0}}}"#;
        assert!(matches!(
            TriageConfig::from_json_str(json),
            Err(ConfigError::Invalid(_))
        ));

        let json = r#"{"classification": {"blood_pressure": {"emergency_systolic": 130.0}}}"#;
        assert!(matches!(
            TriageConfig::from_json_str(json),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_unordered_dates() {
        let json = r#"{"history_dates": ["2025-04-07", "2025-03-10"]}"#;
        assert!(matches!(
            TriageConfig::from_json_str(json),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate_villages() {
        let json = r#"{"villages": ["Ranchi", "Ranchi"]}"#;
        assert!(matches!(
            TriageConfig::from_json_str(json),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_bad_default_reading() {
        let json = r#"{"default_reading": {"bloodPressure": "120", "heartRate": 75,
            "bloodSugar": 110, "temperature": 98.6, "oxygenSaturation": 97}}"#;
        assert!(matches!(
            TriageConfig::from_json_str(json),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triage.json");
        std::fs::write(&path, r#"{"villages": ["Chatra"]}"#).unwrap();

        let config = TriageConfig::load(&path).unwrap();
        assert_eq!(config.villages, vec!["Chatra"]);

        assert!(matches!(
            TriageConfig::load(dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
