//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  Caller-visible (this file)                                            │
//! │  ├── ReportError      - aborts before computation starts               │
//! │  └── ValidationError  - malformed input or configuration               │
//! │                                                                         │
//! │  Non-fatal (audit.rs)                                                  │
//! │  └── AuditFinding     - DataIntegrity, FloorClamped,                   │
//! │                         ReconciliationMismatch, ...                    │
//! │                         returned inside ReportTotals, never raised     │
//! │                                                                         │
//! │  Flow: ValidationError → ReportError → caller (HTTP 400, CLI exit 2)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, value, reason)
//! 3. Only a bad date range or bad configuration stops a report;
//!    everything else degrades to a documented fallback plus an audit finding

use thiserror::Error;

// =============================================================================
// Report Error
// =============================================================================

/// Errors that abort a report run.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Date bounds are missing, malformed, or reversed.
    ///
    /// ## When This Occurs
    /// - `date_init` or `date_end` not sent
    /// - A bound is not `YYYY-MM-DD`
    /// - `date_init` is after `date_end`
    #[error("Invalid report range: {reason}")]
    InvalidRange { reason: String },

    /// Engine configuration cannot be used.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl ReportError {
    /// Builds an `InvalidRange` error.
    pub fn invalid_range(reason: impl Into<String>) -> Self {
        ReportError::InvalidRange {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative, got {value}")]
    Negative { field: String, value: String },

    /// Invalid format (e.g., invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with ReportError.
pub type ReportResult<T> = Result<T, ReportError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ReportError::invalid_range("date_end is required");
        assert_eq!(err.to_string(), "Invalid report range: date_end is required");

        let err = ReportError::InvalidConfig("utc_offset_minutes out of range".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: utc_offset_minutes out of range"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "date_init".to_string(),
        };
        assert_eq!(err.to_string(), "date_init is required");

        let err = ValidationError::Negative {
            field: "quantity".to_string(),
            value: "-2".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must not be negative, got -2");
    }

    #[test]
    fn test_validation_converts_to_report_error() {
        let validation_err = ValidationError::Required {
            field: "date_init".to_string(),
        };
        let report_err: ReportError = validation_err.into();
        assert!(matches!(report_err, ReportError::Validation(_)));
    }
}
