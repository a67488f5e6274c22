//! # Audit Findings
//!
//! Non-fatal anomalies met while building a report. Findings are collected
//! and returned with the report totals; they never abort a run.
//!
//! ## Finding Kinds
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  KIND                      SEVERITY   RAISED BY                         │
//! │  ─────────────────────────────────────────────────────────────────────  │
//! │  DataIntegrity             Warning    engine (unresolved product,      │
//! │                                       negative quantity/price/cost)    │
//! │  FloorClamped              Warning    rounding reconciler              │
//! │  ReconciliationMismatch    Error      aggregator re-verification       │
//! │  RecordedTotalIgnored      Info       discount detector                │
//! │  OutsidePeriod             Info       engine period filter             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every finding is also emitted as a `tracing` warning at the moment it is
//! recorded. The returned list, not the log, is the record of truth.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;
use ts_rs::TS;

use crate::money::Money;
use crate::types::TransactionKind;

// =============================================================================
// Kinds & Severity
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    DataIntegrity,
    FloorClamped,
    ReconciliationMismatch,
    RecordedTotalIgnored,
    OutsidePeriod,
}

impl AuditKind {
    pub fn severity(&self) -> Severity {
        match self {
            AuditKind::DataIntegrity | AuditKind::FloorClamped => Severity::Warning,
            AuditKind::ReconciliationMismatch => Severity::Error,
            AuditKind::RecordedTotalIgnored | AuditKind::OutsidePeriod => Severity::Info,
        }
    }
}

impl std::fmt::Display for AuditKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditKind::DataIntegrity => write!(f, "data_integrity"),
            AuditKind::FloorClamped => write!(f, "floor_clamped"),
            AuditKind::ReconciliationMismatch => write!(f, "reconciliation_mismatch"),
            AuditKind::RecordedTotalIgnored => write!(f, "recorded_total_ignored"),
            AuditKind::OutsidePeriod => write!(f, "outside_period"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

// =============================================================================
// Audit Finding
// =============================================================================

/// One non-fatal discrepancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AuditFinding {
    pub kind: AuditKind,
    pub severity: Severity,
    pub transaction_kind: Option<TransactionKind>,
    pub transaction_id: Option<String>,
    pub message: String,
    /// Amount the lines should have reached.
    pub expected: Option<Money>,
    /// Amount they actually reached.
    pub actual: Option<Money>,
    /// `expected − actual`.
    pub delta: Option<Money>,
}

impl AuditFinding {
    fn new(kind: AuditKind, tx: Option<(TransactionKind, &str)>, message: String) -> Self {
        AuditFinding {
            kind,
            severity: kind.severity(),
            transaction_kind: tx.map(|(k, _)| k),
            transaction_id: tx.map(|(_, id)| id.to_string()),
            message,
            expected: None,
            actual: None,
            delta: None,
        }
    }

    fn with_amounts(mut self, expected: Money, actual: Money) -> Self {
        self.expected = Some(expected);
        self.actual = Some(actual);
        self.delta = Some(expected - actual);
        self
    }

    /// A line or value the engine could not use as given.
    pub fn data_integrity(kind: TransactionKind, id: &str, message: impl Into<String>) -> Self {
        Self::new(AuditKind::DataIntegrity, Some((kind, id)), message.into())
    }

    /// The reconciler's floor at zero kept the lines from the target.
    pub fn floor_clamped(kind: TransactionKind, id: &str, target: Money, reached: Money) -> Self {
        Self::new(
            AuditKind::FloorClamped,
            Some((kind, id)),
            format!(
                "last line clamped at 0; lines reach {} instead of {}",
                reached, target
            ),
        )
        .with_amounts(target, reached)
    }

    /// Re-verification found lines that do not sum to the target.
    pub fn mismatch(kind: TransactionKind, id: &str, expected: Money, actual: Money) -> Self {
        Self::new(
            AuditKind::ReconciliationMismatch,
            Some((kind, id)),
            format!("resolved lines sum to {}, target is {}", actual, expected),
        )
        .with_amounts(expected, actual)
    }

    /// A positive recorded total above the line sum was not used as target.
    pub fn recorded_total_ignored(
        kind: TransactionKind,
        id: &str,
        recorded: Decimal,
        individual_sum: Decimal,
    ) -> Self {
        Self::new(
            AuditKind::RecordedTotalIgnored,
            Some((kind, id)),
            format!(
                "recorded total {} exceeds line sum {}; line sum used as target",
                recorded, individual_sum
            ),
        )
        .with_amounts(Money::from_decimal(recorded), Money::from_decimal(individual_sum))
    }

    /// A transaction dated outside the requested period was skipped.
    pub fn outside_period(kind: TransactionKind, id: &str, message: impl Into<String>) -> Self {
        Self::new(AuditKind::OutsidePeriod, Some((kind, id)), message.into())
    }
}

// =============================================================================
// Collector
// =============================================================================

/// Ordered collector of findings for one report run.
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    findings: Vec<AuditFinding>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a finding and logs it.
    pub fn record(&mut self, finding: AuditFinding) {
        warn!(
            kind = %finding.kind,
            severity = ?finding.severity,
            transaction_id = finding.transaction_id.as_deref().unwrap_or("-"),
            "{}",
            finding.message
        );
        self.findings.push(finding);
    }

    pub fn extend(&mut self, findings: impl IntoIterator<Item = AuditFinding>) {
        for finding in findings {
            self.record(finding);
        }
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn count(&self, kind: AuditKind) -> usize {
        self.findings.iter().filter(|f| f.kind == kind).count()
    }

    pub fn into_findings(self) -> Vec<AuditFinding> {
        self.findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_by_kind() {
        assert_eq!(AuditKind::ReconciliationMismatch.severity(), Severity::Error);
        assert_eq!(AuditKind::FloorClamped.severity(), Severity::Warning);
        assert_eq!(AuditKind::RecordedTotalIgnored.severity(), Severity::Info);
        assert!(Severity::Error > Severity::Warning);
    }

    #[test]
    fn test_mismatch_carries_amounts() {
        let f = AuditFinding::mismatch(
            TransactionKind::Order,
            "o-1",
            Money::from_units(67),
            Money::from_units(66),
        );
        assert_eq!(f.transaction_id.as_deref(), Some("o-1"));
        assert_eq!(f.delta, Some(Money::from_units(1)));
        assert_eq!(f.message, "resolved lines sum to $66, target is $67");
    }

    #[test]
    fn test_recorded_total_ignored_rounds_amounts() {
        let f = AuditFinding::recorded_total_ignored(
            TransactionKind::ManualPayment,
            "p-1",
            Decimal::from(500),
            Decimal::new(39950, 2),
        );
        assert_eq!(f.kind, AuditKind::RecordedTotalIgnored);
        assert_eq!(f.expected, Some(Money::from_units(500)));
        assert_eq!(f.actual, Some(Money::from_units(400)));
    }

    #[test]
    fn test_log_keeps_insertion_order() {
        let mut log = AuditLog::new();
        log.record(AuditFinding::data_integrity(TransactionKind::Order, "b", "first"));
        log.record(AuditFinding::outside_period(TransactionKind::Order, "a", "second"));
        assert_eq!(log.len(), 2);
        assert_eq!(log.count(AuditKind::DataIntegrity), 1);

        let findings = log.into_findings();
        assert_eq!(findings[0].message, "first");
        assert_eq!(findings[1].message, "second");
    }

    #[test]
    fn test_finding_serializes_snake_case() {
        let f = AuditFinding::data_integrity(TransactionKind::ManualPayment, "p-9", "missing product");
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["kind"], "data_integrity");
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["transaction_kind"], "manual_payment");
        assert!(json["expected"].is_null());
    }
}
