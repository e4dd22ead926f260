//! Static configuration read once at startup.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dwell::DwellConfig;
use crate::error::ConfigError;
use crate::tracker::TrackerConfig;

/// Full configuration of a visitor counting pipeline.
///
/// Every field has a default, so a config file only needs the values it
/// overrides:
///
/// ```json
/// { "tracker": { "max_distance": 60 }, "dwell": { "required_dwell_secs": 5 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    /// Detector category that is fed into tracking.
    pub target_label: String,
    pub tracker: TrackerConfig,
    pub dwell: DwellConfig,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            target_label: "person".to_string(),
            tracker: TrackerConfig::default(),
            dwell: DwellConfig::default(),
        }
    }
}

impl CounterConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_label.trim().is_empty() {
            return Err(invalid("target_label", "must not be empty"));
        }
        non_negative("tracker.max_distance", self.tracker.max_distance)?;
        non_negative("dwell.required_dwell_secs", self.dwell.required_dwell_secs)?;
        non_negative("dwell.match_radius", self.dwell.match_radius)?;
        if !(0.0..=1.0).contains(&self.dwell.min_area_ratio) {
            return Err(invalid(
                "dwell.min_area_ratio",
                format!("{} is outside [0, 1]", self.dwell.min_area_ratio),
            ));
        }
        Ok(())
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} must be a finite non-negative number")))
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::AssociationKind;

    #[test]
    fn test_defaults() {
        let config = CounterConfig::default();
        assert_eq!(config.target_label, "person");
        assert_eq!(config.tracker.max_disappeared, 30);
        assert_eq!(config.tracker.max_distance, 80.0);
        assert_eq!(config.dwell.min_area_ratio, 0.15);
        assert_eq!(config.dwell.required_dwell_secs, 10.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = CounterConfig::from_json_str(
            r#"{ "tracker": { "max_distance": 60, "association": "min_cost" },
                 "dwell": { "required_dwell_secs": 5 } }"#,
        )
        .unwrap();
        assert_eq!(config.tracker.max_distance, 60.0);
        assert_eq!(config.tracker.max_disappeared, 30);
        assert_eq!(config.tracker.association, AssociationKind::MinCost);
        assert_eq!(config.dwell.required_dwell_secs, 5.0);
        assert_eq!(config.dwell.min_area_ratio, 0.15);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let err = CounterConfig::from_json_str(r#"{ "dwell": { "min_area_ratio": 1.5 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "dwell.min_area_ratio", .. }));

        let err = CounterConfig::from_json_str(r#"{ "tracker": { "max_distance": -1 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "tracker.max_distance", .. }));

        let err = CounterConfig::from_json_str(r#"{ "target_label": " " }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "target_label", .. }));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = CounterConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = CounterConfig::from_path("/nonexistent/dwellcount.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
