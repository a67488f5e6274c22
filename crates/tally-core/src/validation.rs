//! # Validation Module
//!
//! Input checks shared by the period parser, the engine configuration and
//! the line sanitizer.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Outcomes                                │
//! │                                                                         │
//! │  Date bounds, configuration                                            │
//! │  └── ValidationError ──► ReportError  (report is not produced)         │
//! │                                                                         │
//! │  Line quantity, prices, cost                                           │
//! │  └── ValidationError ──► clamp to 0 + DataIntegrity audit finding      │
//! │                          (report is still produced)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rust_decimal::Decimal;
//! use tally_core::validation::{validate_amount, validate_quantity};
//!
//! assert_eq!(validate_quantity(3).unwrap(), 3);
//! assert!(validate_quantity(-1).is_err());
//! assert!(validate_amount("cost", Decimal::from(-10)).is_err());
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::MAX_UTC_OFFSET_MINUTES;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Date format of report bounds.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Date Validators
// =============================================================================

/// Validates a `YYYY-MM-DD` report bound.
///
/// ## Rules
/// - Must be present and not blank
/// - Must parse as a calendar date
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_date;
///
/// assert!(validate_date("date_init", Some("2025-03-01")).is_ok());
/// assert!(validate_date("date_init", Some("2025-02-30")).is_err());
/// assert!(validate_date("date_init", None).is_err());
/// ```
pub fn validate_date(field: &str, value: Option<&str>) -> ValidationResult<NaiveDate> {
    let value = value.map(str::trim).unwrap_or_default();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: format!("expected YYYY-MM-DD ({})", e),
    })
}

// =============================================================================
// Line Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must not be negative
/// - Zero is allowed (the line still takes part in reconciliation)
pub fn validate_quantity(qty: i64) -> ValidationResult<i64> {
    if qty < 0 {
        return Err(ValidationError::Negative {
            field: "quantity".to_string(),
            value: qty.to_string(),
        });
    }

    Ok(qty)
}

/// Validates a monetary amount that must not be negative (price, cost).
pub fn validate_amount(field: &str, value: Decimal) -> ValidationResult<Decimal> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
            value: value.to_string(),
        });
    }

    Ok(value)
}

// =============================================================================
// Configuration Validators
// =============================================================================

/// Validates a store UTC offset in minutes.
///
/// ## Rules
/// - Between -14:00 and +14:00, the range real time zones use
pub fn validate_utc_offset(minutes: i32) -> ValidationResult<()> {
    if minutes.abs() > MAX_UTC_OFFSET_MINUTES {
        return Err(ValidationError::OutOfRange {
            field: "utc_offset_minutes".to_string(),
            min: -i64::from(MAX_UTC_OFFSET_MINUTES),
            max: i64::from(MAX_UTC_OFFSET_MINUTES),
        });
    }

    Ok(())
}

/// Validates a display label.
pub fn validate_label(field: &str, label: &str) -> ValidationResult<()> {
    if label.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
