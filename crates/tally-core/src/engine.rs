//! # Reconciliation Engine
//!
//! Runs the full pipeline over a snapshot of transactions.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Report Run                                      │
//! │                                                                         │
//! │  for each transaction (input order):                                   │
//! │     period filter ──► eligibility ──► normalize                        │
//! │        │                                                                │
//! │        ▼                                                                │
//! │     price every line        (pricing: real + individual price)         │
//! │        │                                                                │
//! │        ▼                                                                │
//! │     detect order discount   (discount: factor + target)                │
//! │        │                                                                │
//! │        ▼                                                                │
//! │     apply factor, round     (money)                                    │
//! │        │                                                                │
//! │        ▼                                                                │
//! │     adjust last line        (rounding)                                 │
//! │        │                                                                │
//! │        ▼                                                                │
//! │     profit                  (profit)                                   │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  aggregate: verify, total, summarize, sort ──► SalesReport             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine is a pure function of its configuration and input: it holds no
//! mutable state, performs no I/O and can be shared freely across threads.

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::aggregate::{Aggregator, SalesReport, TransactionTarget};
use crate::audit::{AuditFinding, AuditLog};
use crate::config::EngineConfig;
use crate::discount::{discount_percent, individual_sum, OrderDiscount};
use crate::error::ReportResult;
use crate::money::{round_to, Money};
use crate::normalize::{check_eligibility, normalize, CanonicalLine, NormalizedTransaction};
use crate::period::ReportPeriod;
use crate::pricing::{resolve_line_pricing, resolve_product, LinePricing, ResolvedProduct};
use crate::profit::with_profit;
use crate::rounding::reconcile;
use crate::types::{DiscountKind, ResolvedLine, Transaction};
use crate::validation::{validate_amount, validate_quantity, ValidationResult};
use crate::FACTOR_DECIMALS;

/// A line after individual pricing, before the order factor.
struct PricedLine<'a> {
    line: CanonicalLine<'a>,
    product: ResolvedProduct<'a>,
    quantity: i64,
    cost: Decimal,
    pricing: LinePricing,
}

/// The sales reconciliation engine.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationEngine {
    config: EngineConfig,
}

impl ReconciliationEngine {
    /// Creates an engine after validating its configuration.
    pub fn new(config: EngineConfig) -> ReportResult<Self> {
        config.validate()?;
        Ok(ReconciliationEngine { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parses request bounds with the configured store offset.
    pub fn period(&self, date_init: Option<&str>, date_end: Option<&str>) -> ReportResult<ReportPeriod> {
        ReportPeriod::parse(date_init, date_end, self.config.utc_offset_minutes)
    }

    /// Parses the bounds and runs the report.
    ///
    /// ## Errors
    /// Only `InvalidRange` (bad bounds). Everything else lands in the audit list.
    pub fn report(
        &self,
        date_init: Option<&str>,
        date_end: Option<&str>,
        transactions: &[Transaction],
    ) -> ReportResult<SalesReport> {
        let period = self.period(date_init, date_end)?;
        Ok(self.run(&period, transactions))
    }

    /// Builds the report for an already-validated period.
    pub fn run(&self, period: &ReportPeriod, transactions: &[Transaction]) -> SalesReport {
        let mut audit = AuditLog::new();
        let mut aggregator = Aggregator::new();

        for tx in transactions {
            if !period.contains(tx.timestamp()) {
                audit.record(AuditFinding::outside_period(
                    tx.kind(),
                    tx.id(),
                    format!(
                        "created at {} is outside {} .. {}",
                        tx.timestamp().to_rfc3339(),
                        period.start_date,
                        period.end_date
                    ),
                ));
                aggregator.skip();
                continue;
            }

            if self.config.enforce_eligibility {
                if let Err(reason) = check_eligibility(tx) {
                    debug!(kind = %tx.kind(), id = tx.id(), %reason, "Transaction skipped");
                    aggregator.skip();
                    continue;
                }
            }

            let normalized = normalize(tx);
            let (target, lines) = self.reconcile_transaction(&normalized, &mut audit);
            aggregator.push(target, lines);
        }

        let report = aggregator.finish(*period, audit);
        info!(
            transactions = report.totals.transaction_count,
            skipped = report.totals.skipped_transactions,
            lines = report.totals.line_count,
            grand_total = %report.totals.grand_total,
            findings = report.totals.audit.len(),
            "Sales report built"
        );
        report
    }

    /// Prices, allocates and reconciles one transaction.
    fn reconcile_transaction(
        &self,
        tx: &NormalizedTransaction<'_>,
        audit: &mut AuditLog,
    ) -> (TransactionTarget, Vec<ResolvedLine>) {
        let header = &tx.header;
        let priced: Vec<PricedLine<'_>> = tx
            .lines()
            .filter_map(|line| self.price_line(line, audit))
            .collect();

        let sum = individual_sum(priced.iter().map(|p| (p.pricing.individual_price, p.quantity)));
        let discount = OrderDiscount::detect(
            header.kind,
            header.recorded_total,
            sum,
            self.config.order_surplus,
        );
        if discount.recorded_total_ignored() {
            if let Some(recorded) = discount.recorded_total {
                audit.record(AuditFinding::recorded_total_ignored(
                    header.kind,
                    header.id,
                    recorded,
                    sum,
                ));
            }
        }

        let lines: Vec<ResolvedLine> = priced
            .iter()
            .map(|p| self.allocate(p, &discount))
            .collect();
        let (lines, outcome) = reconcile(lines, discount.target);

        if outcome.clamped {
            audit.record(AuditFinding::floor_clamped(
                header.kind,
                header.id,
                outcome.target_rounded,
                outcome.final_sum,
            ));
        }

        debug!(
            kind = %header.kind,
            id = header.id,
            lines = lines.len(),
            individual_sum = %sum,
            factor = %discount.factor,
            target = %outcome.target_rounded,
            delta = %outcome.delta,
            "Transaction reconciled"
        );

        let target = TransactionTarget {
            kind: header.kind,
            id: header.id.to_string(),
            target: discount.target,
        };
        (target, lines)
    }

    /// Resolves a line's product and individual price; `None` skips the line.
    fn price_line<'a>(&self, line: CanonicalLine<'a>, audit: &mut AuditLog) -> Option<PricedLine<'a>> {
        let header = line.header;
        let item = line.item;

        let Some(record) = item.product.as_ref() else {
            audit.record(AuditFinding::data_integrity(
                header.kind,
                header.id,
                format!(
                    "line {}: product '{}' could not be resolved; line skipped",
                    line.position + 1,
                    item.product_ref
                ),
            ));
            return None;
        };
        let product = resolve_product(record);

        let quantity = clamp_invalid(validate_quantity(item.quantity), 0, &line, audit);
        let real_price = clamp_invalid(
            validate_amount("price", product.real_price),
            Decimal::ZERO,
            &line,
            audit,
        );
        let cost = clamp_invalid(validate_amount("cost", product.cost), Decimal::ZERO, &line, audit);
        let line_price = item
            .price
            .map(|p| clamp_invalid(validate_amount("line price", p), Decimal::ZERO, &line, audit));

        let pricing = resolve_line_pricing(real_price, product.discount_value, line_price);

        Some(PricedLine {
            line,
            product,
            quantity,
            cost,
            pricing,
        })
    }

    /// Applies the order factor and builds the unreconciled output line.
    fn allocate(&self, priced: &PricedLine<'_>, discount: &OrderDiscount) -> ResolvedLine {
        let labels = &self.config.labels;
        let header = priced.line.header;
        let pricing = &priced.pricing;

        let final_unit_price = discount.apply(pricing.individual_price);
        let discount_kind = DiscountKind::classify(
            pricing.has_individual_discount(),
            discount.has_order_discount,
        );

        with_profit(ResolvedLine {
            product_name: text_or(priced.product.name, &labels.unnamed_product),
            brand: text_or(priced.product.brand, &labels.no_brand),
            category: text_or(priced.product.category, &labels.no_category),
            tone: text_or(priced.product.tone, &labels.no_tone),
            quantity: priced.quantity,
            real_price: pricing.real_price,
            individual_price: pricing.individual_price,
            sold_price: Money::from_decimal(final_unit_price),
            line_total: Money::from_decimal(final_unit_price * Decimal::from(priced.quantity)),
            discount_kind,
            discount_percent: discount_percent(final_unit_price, pricing.real_price, discount_kind),
            has_order_discount: discount.has_order_discount,
            order_factor: round_to(discount.factor, FACTOR_DECIMALS),
            cost: priced.cost,
            profit_per_unit: Decimal::ZERO,
            profit_total: Decimal::ZERO,
            margin_percent: Decimal::ZERO,
            transaction_id: header.id.to_string(),
            transaction_kind: header.kind,
            timestamp: header.timestamp,
            user_name: header.user_name.clone(),
            trace: self
                .config
                .include_trace
                .then(|| pricing.trace(discount.factor)),
        })
    }
}

/// Unwraps a validated value, or records a finding and uses `fallback`.
fn clamp_invalid<T>(
    result: ValidationResult<T>,
    fallback: T,
    line: &CanonicalLine<'_>,
    audit: &mut AuditLog,
) -> T {
    result.unwrap_or_else(|e| {
        audit.record(AuditFinding::data_integrity(
            line.header.kind,
            line.header.id,
            format!("line {}: {}; clamped to 0", line.position + 1, e),
        ));
        fallback
    })
}

fn text_or(value: Option<&str>, fallback: &str) -> String {
    value.unwrap_or(fallback).to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
