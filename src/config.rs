//! Aggregator and engine configuration

use serde::{Deserialize, Serialize};

use crate::types::{ReconciliationError, ReconciliationResult};

/// Tunables shared by the aggregator and the reconciliation engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconciliationConfig {
    /// Decimal places used when rounding at the display boundary
    pub display_scale: i64,
    /// Whether search terms also match journal entry references
    pub search_references: bool,
    /// Suggestions below this confidence are ignored
    pub suggestion_floor: u8,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            display_scale: 2,
            search_references: true,
            suggestion_floor: 0,
        }
    }
}

impl ReconciliationConfig {
    /// Parse a config from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> ReconciliationResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ReconciliationError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ReconciliationResult<()> {
        if !(0..=10).contains(&self.display_scale) {
            return Err(ReconciliationError::Config(format!(
                "display_scale must be between 0 and 10, got {}",
                self.display_scale
            )));
        }

        if self.suggestion_floor > 100 {
            return Err(ReconciliationError::Config(format!(
                "suggestion_floor must be at most 100, got {}",
                self.suggestion_floor
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = ReconciliationConfig::from_json(r#"{ "suggestion_floor": 80 }"#).unwrap();
        assert_eq!(config.display_scale, 2);
        assert!(config.search_references);
        assert_eq!(config.suggestion_floor, 80);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        assert!(matches!(
            ReconciliationConfig::from_json(r#"{ "display_scale": 42 }"#),
            Err(ReconciliationError::Config(_))
        ));
        assert!(matches!(
            ReconciliationConfig::from_json(r#"{ "suggestion_floor": 150 }"#),
            Err(ReconciliationError::Config(_))
        ));
        assert!(matches!(
            ReconciliationConfig::from_json("not json"),
            Err(ReconciliationError::Config(_))
        ));
    }
}
