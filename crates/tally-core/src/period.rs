//! # Report Period
//!
//! Turns the `date_init` / `date_end` bounds of a report request into a
//! closed interval of UTC instants.
//!
//! ## Bounds
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  date_init = 2025-03-01   date_end = 2025-03-31   offset = -05:00      │
//! │                                                                         │
//! │  start = 2025-03-01 00:00:00.000 -05:00  =  2025-03-01T05:00:00Z       │
//! │  end   = 2025-03-31 23:59:59.999 -05:00  =  2025-04-01T04:59:59.999Z   │
//! │                                                                         │
//! │  A transaction belongs to the period when start <= created_at <= end.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, ReportResult};
use crate::validation::{validate_date, validate_utc_offset};

/// A closed reporting interval in store-local days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// First instant of `start_date`, store-local.
    pub start: DateTime<Utc>,
    /// Last millisecond of `end_date`, store-local.
    pub end: DateTime<Utc>,
    pub utc_offset_minutes: i32,
}

impl ReportPeriod {
    /// Parses request bounds into a period.
    ///
    /// ## Errors
    /// `ReportError::InvalidRange` when a bound is missing, is not
    /// `YYYY-MM-DD`, or `date_init` comes after `date_end`.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::period::ReportPeriod;
    ///
    /// let period = ReportPeriod::parse(Some("2025-03-01"), Some("2025-03-31"), -300).unwrap();
    /// assert_eq!(period.start.to_rfc3339(), "2025-03-01T05:00:00+00:00");
    ///
    /// assert!(ReportPeriod::parse(Some("2025-03-31"), Some("2025-03-01"), -300).is_err());
    /// assert!(ReportPeriod::parse(None, Some("2025-03-01"), -300).is_err());
    /// ```
    pub fn parse(
        date_init: Option<&str>,
        date_end: Option<&str>,
        utc_offset_minutes: i32,
    ) -> ReportResult<Self> {
        let start_date = validate_date("date_init", date_init)
            .map_err(|e| ReportError::invalid_range(e.to_string()))?;
        let end_date = validate_date("date_end", date_end)
            .map_err(|e| ReportError::invalid_range(e.to_string()))?;

        Self::from_dates(start_date, end_date, utc_offset_minutes)
    }

    /// Builds a period from already-parsed dates.
    pub fn from_dates(
        start_date: NaiveDate,
        end_date: NaiveDate,
        utc_offset_minutes: i32,
    ) -> ReportResult<Self> {
        if start_date > end_date {
            return Err(ReportError::invalid_range(format!(
                "date_init {} is after date_end {}",
                start_date, end_date
            )));
        }

        validate_utc_offset(utc_offset_minutes)?;
        let offset = FixedOffset::east_opt(utc_offset_minutes * 60).ok_or_else(|| {
            ReportError::InvalidConfig(format!("invalid UTC offset {}", utc_offset_minutes))
        })?;

        let start = to_utc(&offset, start_date.and_hms_opt(0, 0, 0))?;
        let end = to_utc(&offset, end_date.and_hms_milli_opt(23, 59, 59, 999))?;

        Ok(ReportPeriod {
            start_date,
            end_date,
            start,
            end,
            utc_offset_minutes,
        })
    }

    /// Returns true when `instant` falls inside the period (both ends inclusive).
    #[inline]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

fn to_utc(offset: &FixedOffset, local: Option<NaiveDateTime>) -> ReportResult<DateTime<Utc>> {
    local
        .and_then(|naive| offset.from_local_datetime(&naive).single())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| ReportError::invalid_range("date is out of the supported range"))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_applies_store_offset() {
        let period = ReportPeriod::parse(Some("2025-03-01"), Some("2025-03-31"), -300).unwrap();
        assert_eq!(period.start, utc("2025-03-01T05:00:00Z"));
        assert_eq!(period.end, utc("2025-04-01T04:59:59.999Z"));
    }

    #[test]
    fn test_single_day_period() {
        let period = ReportPeriod::parse(Some("2025-03-01"), Some("2025-03-01"), 0).unwrap();
        assert!(period.contains(utc("2025-03-01T00:00:00Z")));
        assert!(period.contains(utc("2025-03-01T23:59:59.999Z")));
        assert!(!period.contains(utc("2025-03-02T00:00:00Z")));
        assert!(!period.contains(utc("2025-02-28T23:59:59Z")));
    }

    #[test]
    fn test_missing_or_malformed_bounds_are_invalid_range() {
        let err = ReportPeriod::parse(None, Some("2025-03-01"), -300).unwrap_err();
        assert!(matches!(err, ReportError::InvalidRange { .. }));
        assert!(err.to_string().contains("date_init is required"));

        let err = ReportPeriod::parse(Some("2025-03-01"), Some("March"), -300).unwrap_err();
        assert!(matches!(err, ReportError::InvalidRange { .. }));
    }

    #[test]
    fn test_reversed_bounds_are_invalid_range() {
        let err = ReportPeriod::parse(Some("2025-04-01"), Some("2025-03-01"), -300).unwrap_err();
        assert!(matches!(err, ReportError::InvalidRange { .. }));
    }

    #[test]
    fn test_out_of_range_offset_is_rejected() {
        let err = ReportPeriod::parse(Some("2025-03-01"), Some("2025-03-02"), 900).unwrap_err();
        assert!(matches!(err, ReportError::Validation(_)));
    }
}
