//! # Rounding Reconciler
//!
//! Makes a transaction's rounded line totals add up to its rounded target.
//!
//! ## Adjustment Pass
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  target = 66.66 ──► round ──► 67                                       │
//! │                                                                         │
//! │  line 1   33.33 ──► 33                                                 │
//! │  line 2   33.33 ──► 33        Σ = 66      delta = 67 − 66 = +1         │
//! │                                                                         │
//! │  last line: new total = max(0, 33 + 1) = 34                            │
//! │             sold price = round(34 / quantity)                          │
//! │             profit recomputed from the new sold price                  │
//! │                                                                         │
//! │  When the floor at 0 bites, the lines cannot reach the target. The     │
//! │  outcome reports it; the caller records an audit finding.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lines are consumed and a new vector is returned. Only the last line
//! is ever replaced, and it is replaced by a freshly built value.

use rust_decimal::Decimal;

use crate::money::Money;
use crate::profit::with_profit;
use crate::types::ResolvedLine;

/// What the reconciler did to one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundingOutcome {
    pub target_rounded: Money,
    /// Σ line totals before adjustment.
    pub unadjusted_sum: Money,
    /// `target_rounded − unadjusted_sum`.
    pub delta: Money,
    /// Σ line totals after adjustment.
    pub final_sum: Money,
    /// The floor at zero prevented the full delta from being applied.
    pub clamped: bool,
}

impl RoundingOutcome {
    /// True when the final lines sum exactly to the rounded target.
    #[inline]
    pub fn balanced(&self) -> bool {
        self.final_sum == self.target_rounded
    }
}

/// Reconciles a transaction's lines against its target.
///
/// ## Example
/// ```text
/// lines:  33 + 33 = 66      target 66.66 -> 67      delta = +1
/// result: 33 + 34 = 67      only the last line moves
/// ```
pub fn reconcile(lines: Vec<ResolvedLine>, target: Decimal) -> (Vec<ResolvedLine>, RoundingOutcome) {
    let target_rounded = Money::from_decimal(target);
    let unadjusted_sum: Money = lines.iter().map(|line| line.line_total).sum();
    let delta = target_rounded - unadjusted_sum;

    let mut lines = lines;
    let mut clamped = false;
    if !delta.is_zero() {
        if let Some(last) = lines.pop() {
            let (adjusted, was_clamped) = adjust_line(last, delta);
            clamped = was_clamped;
            lines.push(adjusted);
        }
    }

    let final_sum: Money = lines.iter().map(|line| line.line_total).sum();
    let outcome = RoundingOutcome {
        target_rounded,
        unadjusted_sum,
        delta,
        final_sum,
        clamped,
    };

    (lines, outcome)
}

/// Builds the corrected version of a line after absorbing `delta`.
///
/// Returns the new line and whether the floor at zero was hit.
pub fn adjust_line(line: ResolvedLine, delta: Money) -> (ResolvedLine, bool) {
    let raw_total = line.line_total + delta;
    let line_total = raw_total.floor_zero();
    let sold_price = line_total.per_unit(line.quantity);

    let adjusted = with_profit(ResolvedLine {
        line_total,
        sold_price,
        ..line
    });

    (adjusted, raw_total.is_negative())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::resolved_line;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_no_adjustment_when_balanced() {
        let lines = vec![
            resolved_line("o-1", 47368, 1, Decimal::ZERO),
            resolved_line("o-1", 42632, 1, Decimal::ZERO),
        ];
        let (out, outcome) = reconcile(lines.clone(), dec("90000"));
        assert_eq!(out, lines);
        assert!(outcome.delta.is_zero());
        assert!(outcome.balanced());
        assert!(!outcome.clamped);
    }

    #[test]
    fn test_positive_delta_goes_to_last_line() {
        let lines = vec![
            resolved_line("o-3", 33, 1, Decimal::from(20)),
            resolved_line("o-3", 33, 1, Decimal::from(20)),
        ];
        let (out, outcome) = reconcile(lines, dec("66.66"));
        assert_eq!(outcome.target_rounded, Money::from_units(67));
        assert_eq!(outcome.unadjusted_sum, Money::from_units(66));
        assert_eq!(outcome.delta, Money::from_units(1));
        assert!(outcome.balanced());

        assert_eq!(out[0].line_total, Money::from_units(33));
        assert_eq!(out[1].line_total, Money::from_units(34));
        assert_eq!(out[1].sold_price, Money::from_units(34));
        // Profit follows the new sold price.
        assert_eq!(out[1].profit_per_unit, Decimal::from(14));
        assert_eq!(out[1].margin_percent, Decimal::from(70));
    }

    #[test]
    fn test_negative_delta_with_quantity() {
        let lines = vec![resolved_line("o-4", 101, 2, Decimal::ZERO)];
        let (out, outcome) = reconcile(lines, dec("200"));
        assert_eq!(outcome.delta, Money::from_units(-2));
        assert_eq!(out[0].line_total, Money::from_units(200));
        assert_eq!(out[0].sold_price, Money::from_units(100));
        assert_eq!(out[0].profit_total, Decimal::from(200));
    }

    #[test]
    fn test_floor_clamp_is_reported() {
        let lines = vec![
            resolved_line("o-5", 100, 1, Decimal::ZERO),
            resolved_line("o-5", 5, 1, Decimal::ZERO),
        ];
        let (out, outcome) = reconcile(lines, dec("50"));
        assert_eq!(outcome.delta, Money::from_units(-55));
        assert!(outcome.clamped);
        assert!(!outcome.balanced());
        assert_eq!(out[1].line_total, Money::zero());
        assert_eq!(out[1].sold_price, Money::zero());
        assert_eq!(outcome.final_sum, Money::from_units(100));
    }

    #[test]
    fn test_zero_quantity_last_line_divides_by_one() {
        let lines = vec![
            resolved_line("o-6", 10, 1, Decimal::ZERO),
            resolved_line("o-6", 0, 0, Decimal::ZERO),
        ];
        let (out, outcome) = reconcile(lines, dec("13"));
        assert_eq!(out[1].line_total, Money::from_units(3));
        assert_eq!(out[1].sold_price, Money::from_units(3));
        assert!(outcome.balanced());
    }

    #[test]
    fn test_empty_transaction() {
        let (out, outcome) = reconcile(Vec::new(), dec("10"));
        assert!(out.is_empty());
        assert_eq!(outcome.delta, Money::from_units(10));
        assert!(!outcome.balanced());
        assert!(!outcome.clamped);
    }
}
