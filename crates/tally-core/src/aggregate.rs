//! # Aggregator / Auditor
//!
//! Collects reconciled transactions, re-verifies each one independently,
//! sums the report and orders the detail lines.
//!
//! ## Finishing a Report
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  push(target T1, lines T1) ─┐                                           │
//! │  push(target T2, lines T2) ─┼──► finish()                              │
//! │  skip()                    ─┘       │                                   │
//! │                                     ├── re-verify Σ line_total per     │
//! │                                     │   (kind, id) vs round(target)    │
//! │                                     ├── grand total = Σ target         │
//! │                                     ├── cost, profit, margin, counts   │
//! │                                     ├── brand / category summaries     │
//! │                                     └── stable sort, newest first      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use ts_rs::TS;

use crate::audit::{AuditFinding, AuditLog};
use crate::money::Money;
use crate::period::ReportPeriod;
use crate::profit::margin_percent;
use crate::types::{ResolvedLine, TransactionKind};

// =============================================================================
// Report Types
// =============================================================================

/// Summary of the whole report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportTotals {
    /// Σ target over all transactions, unrounded.
    #[ts(as = "String")]
    pub grand_total: Decimal,
    /// Σ line total over all lines.
    pub detail_total: Money,
    #[ts(as = "String")]
    pub total_cost: Decimal,
    #[ts(as = "String")]
    pub total_profit: Decimal,
    /// Total profit over total cost, two decimals; 0 when cost is 0.
    #[ts(as = "String")]
    pub margin_percent: Decimal,
    pub transaction_count: usize,
    pub skipped_transactions: usize,
    pub line_count: usize,
    pub audit: Vec<AuditFinding>,
}

/// Per-brand or per-category rollup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GroupSummary {
    pub name: String,
    pub line_count: usize,
    pub quantity: i64,
    pub revenue: Money,
    #[ts(as = "String")]
    pub cost: Decimal,
    #[ts(as = "String")]
    pub profit: Decimal,
    #[ts(as = "String")]
    pub margin_percent: Decimal,
}

/// Everything a rendering collaborator needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesReport {
    pub period: ReportPeriod,
    /// Detail lines, newest transaction first.
    pub lines: Vec<ResolvedLine>,
    pub totals: ReportTotals,
    pub brands: Vec<GroupSummary>,
    pub categories: Vec<GroupSummary>,
}

/// The amount one transaction was reconciled to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionTarget {
    pub kind: TransactionKind,
    pub id: String,
    pub target: Decimal,
}

// =============================================================================
// Aggregator
// =============================================================================

#[derive(Debug, Default)]
pub struct Aggregator {
    targets: Vec<TransactionTarget>,
    lines: Vec<ResolvedLine>,
    skipped: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one reconciled transaction; lines keep their emission order.
    pub fn push(&mut self, target: TransactionTarget, lines: Vec<ResolvedLine>) {
        self.targets.push(target);
        self.lines.extend(lines);
    }

    /// Counts a transaction left out of the report.
    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    /// Re-verifies, totals and sorts.
    pub fn finish(self, period: ReportPeriod, mut audit: AuditLog) -> SalesReport {
        let Aggregator {
            targets,
            mut lines,
            skipped,
        } = self;

        audit.extend(verify(&targets, &lines));

        let grand_total: Decimal = targets.iter().map(|t| t.target).sum();
        let detail_total: Money = lines.iter().map(|l| l.line_total).sum();
        let total_cost: Decimal = lines.iter().map(line_cost).sum();
        let total_profit: Decimal = lines.iter().map(|l| l.profit_total).sum();

        let brands = summarize(&lines, |l| l.brand.as_str());
        let categories = summarize(&lines, |l| l.category.as_str());

        // Stable: equal timestamps keep emission order.
        lines.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let totals = ReportTotals {
            grand_total,
            detail_total,
            total_cost,
            total_profit,
            margin_percent: margin_percent(total_profit, total_cost),
            transaction_count: targets.len(),
            skipped_transactions: skipped,
            line_count: lines.len(),
            audit: audit.into_findings(),
        };

        SalesReport {
            period,
            lines,
            totals,
            brands,
            categories,
        }
    }
}

fn line_cost(line: &ResolvedLine) -> Decimal {
    line.cost * Decimal::from(line.quantity)
}

/// Compares each transaction's line sum against its rounded target.
///
/// Lines are matched on (kind, id), since an order and a manual payment may
/// share an id. Findings follow the order of `targets`.
pub fn verify(targets: &[TransactionTarget], lines: &[ResolvedLine]) -> Vec<AuditFinding> {
    let mut sums: HashMap<(TransactionKind, &str), Money> = HashMap::new();
    for line in lines {
        *sums
            .entry((line.transaction_kind, line.transaction_id.as_str()))
            .or_default() += line.line_total;
    }

    targets
        .iter()
        .filter_map(|t| {
            let expected = Money::from_decimal(t.target);
            let actual = sums.get(&(t.kind, t.id.as_str())).copied().unwrap_or_default();
            (expected != actual).then(|| AuditFinding::mismatch(t.kind, &t.id, expected, actual))
        })
        .collect()
}

/// Groups lines by a key, alphabetically.
pub fn summarize<F>(lines: &[ResolvedLine], key: F) -> Vec<GroupSummary>
where
    F: Fn(&ResolvedLine) -> &str,
{
    let mut groups: BTreeMap<&str, GroupSummary> = BTreeMap::new();
    for line in lines {
        let name = key(line);
        let group = groups.entry(name).or_insert_with(|| GroupSummary {
            name: name.to_string(),
            line_count: 0,
            quantity: 0,
            revenue: Money::zero(),
            cost: Decimal::ZERO,
            profit: Decimal::ZERO,
            margin_percent: Decimal::ZERO,
        });
        group.line_count += 1;
        group.quantity += line.quantity;
        group.revenue += line.line_total;
        group.cost += line_cost(line);
        group.profit += line.profit_total;
    }

    groups
        .into_values()
        .map(|mut g| {
            g.margin_percent = margin_percent(g.profit, g.cost);
            g
        })
        .collect()
}
