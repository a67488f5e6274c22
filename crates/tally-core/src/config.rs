//! # Engine Configuration
//!
//! Knobs of the reconciliation engine. Every field has a default, so an
//! empty TOML table (or no table at all) yields a working engine.
//!
//! ## Configuration File Format
//! ```toml
//! [engine]
//! utc_offset_minutes = -300          # store time, UTC-05:00
//! order_surplus = "use_line_sum"     # use_line_sum | keep_recorded_total
//! include_trace = false
//! enforce_eligibility = true
//!
//! [engine.labels]
//! unnamed_product = "Unnamed product"
//! no_brand = "No brand"
//! no_category = "No category"
//! no_tone = "No tone"
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, ReportResult};
use crate::validation::{validate_label, validate_utc_offset};
use crate::DEFAULT_UTC_OFFSET_MINUTES;

// =============================================================================
// Order Surplus Policy
// =============================================================================

/// Target rule for an order whose recorded total is positive but not below
/// the sum of its individually-discounted lines.
///
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  recorded = 100, individual sum = 99                                   │
/// │                                                                         │
/// │  USE_LINE_SUM (default)          │  KEEP_RECORDED_TOTAL                 │
/// │  ──────────────────────          │  ────────────────────                │
/// │  target = 99                     │  target = 100                        │
/// │  lines keep their prices         │  lines keep their prices, the last  │
/// │                                  │  line absorbs the +1 difference      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSurplusPolicy {
    /// Reconcile to the individually-discounted sum.
    #[default]
    UseLineSum,

    /// Reconcile to the recorded total whenever it is positive.
    ///
    /// This is how the legacy sales report resolved order targets; choose it
    /// to reproduce that system's figures.
    KeepRecordedTotal,
}

impl std::fmt::Display for OrderSurplusPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSurplusPolicy::UseLineSum => write!(f, "use_line_sum"),
            OrderSurplusPolicy::KeepRecordedTotal => write!(f, "keep_recorded_total"),
        }
    }
}

impl std::str::FromStr for OrderSurplusPolicy {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "use_line_sum" | "line_sum" => Ok(OrderSurplusPolicy::UseLineSum),
            "keep_recorded_total" | "recorded_total" => Ok(OrderSurplusPolicy::KeepRecordedTotal),
            other => Err(ReportError::InvalidConfig(format!(
                "Unknown order surplus policy: '{}'. Valid options: use_line_sum, keep_recorded_total",
                other
            ))),
        }
    }
}

// =============================================================================
// Display Labels
// =============================================================================

/// Fallback texts for missing product data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    #[serde(default = "default_unnamed_product")]
    pub unnamed_product: String,

    #[serde(default = "default_no_brand")]
    pub no_brand: String,

    #[serde(default = "default_no_category")]
    pub no_category: String,

    #[serde(default = "default_no_tone")]
    pub no_tone: String,
}

fn default_unnamed_product() -> String {
    "Unnamed product".to_string()
}

fn default_no_brand() -> String {
    "No brand".to_string()
}

fn default_no_category() -> String {
    "No category".to_string()
}

fn default_no_tone() -> String {
    "No tone".to_string()
}

impl Default for Labels {
    fn default() -> Self {
        Labels {
            unnamed_product: default_unnamed_product(),
            no_brand: default_no_brand(),
            no_category: default_no_category(),
            no_tone: default_no_tone(),
        }
    }
}

// =============================================================================
// Engine Configuration
// =============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Store offset from UTC, used to read `YYYY-MM-DD` bounds as local days.
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,

    #[serde(default)]
    pub order_surplus: OrderSurplusPolicy,

    /// Attach a [`crate::pricing::PricingTrace`] to every line.
    #[serde(default)]
    pub include_trace: bool,

    /// Skip transactions whose status says they are not sales.
    #[serde(default = "default_true")]
    pub enforce_eligibility: bool,

    #[serde(default)]
    pub labels: Labels,
}

fn default_utc_offset() -> i32 {
    DEFAULT_UTC_OFFSET_MINUTES
}

fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            utc_offset_minutes: default_utc_offset(),
            order_surplus: OrderSurplusPolicy::default(),
            include_trace: false,
            enforce_eligibility: true,
            labels: Labels::default(),
        }
    }
}

impl EngineConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> ReportResult<()> {
        validate_utc_offset(self.utc_offset_minutes)
            .map_err(|e| ReportError::InvalidConfig(e.to_string()))?;

        let labels = [
            ("labels.unnamed_product", &self.labels.unnamed_product),
            ("labels.no_brand", &self.labels.no_brand),
            ("labels.no_category", &self.labels.no_category),
            ("labels.no_tone", &self.labels.no_tone),
        ];
        for (field, label) in labels {
            validate_label(field, label).map_err(|e| ReportError::InvalidConfig(e.to_string()))?;
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.utc_offset_minutes, -300);
        assert_eq!(config.order_surplus, OrderSurplusPolicy::UseLineSum);
        assert!(!config.include_trace);
        assert!(config.enforce_eligibility);
        assert_eq!(config.labels.no_brand, "No brand");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(
            "use_line_sum".parse::<OrderSurplusPolicy>().unwrap(),
            OrderSurplusPolicy::UseLineSum
        );
        assert_eq!(
            "KEEP_RECORDED_TOTAL".parse::<OrderSurplusPolicy>().unwrap(),
            OrderSurplusPolicy::KeepRecordedTotal
        );
        assert!("whatever".parse::<OrderSurplusPolicy>().is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();
        config.utc_offset_minutes = 15 * 60;
        assert!(matches!(config.validate(), Err(ReportError::InvalidConfig(_))));

        let mut config = EngineConfig::default();
        config.labels.no_tone = " ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("labels.no_tone"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "order_surplus": "keep_recorded_total" }"#).unwrap();
        assert_eq!(config.order_surplus, OrderSurplusPolicy::KeepRecordedTotal);
        assert_eq!(config.utc_offset_minutes, -300);
        assert_eq!(config.labels, Labels::default());
    }
}
