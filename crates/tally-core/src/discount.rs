//! # Order-Level Discount Detector & Allocator
//!
//! Infers a proportional order discount by comparing a transaction's recorded
//! total against the sum of its individually-discounted lines, and picks the
//! amount the lines must reconcile to (the "target").
//!
//! ## Detection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  individual_sum = Σ individual_price × quantity                        │
//! │                                                                         │
//! │  has_order_discount = recorded > 0                                     │
//! │                       AND individual_sum > 0                           │
//! │                       AND recorded < individual_sum                    │
//! │                                                                         │
//! │  factor = has_order_discount ? recorded / individual_sum : 1           │
//! │                                                                         │
//! │  Example: recorded 90000, lines 50000 + 45000 = 95000                  │
//! │           factor = 0.947368...  every line price × factor              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Target Policy
//! | kind           | discount detected | otherwise                              |
//! |----------------|-------------------|----------------------------------------|
//! | Order          | recorded total    | individual sum, or the recorded total  |
//! |                |                   | when `KeepRecordedTotal` and it is > 0 |
//! | ManualPayment  | recorded total    | individual sum                         |

use rust_decimal::Decimal;

use crate::config::OrderSurplusPolicy;
use crate::money::{ratio_or_zero, round2};
use crate::types::{DiscountKind, TransactionKind};

/// Sums `individual_price × quantity` over a transaction's lines.
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use tally_core::discount::individual_sum;
///
/// let lines = [(Decimal::from(50000), 1), (Decimal::from(45000), 1)];
/// assert_eq!(individual_sum(lines), Decimal::from(95000));
/// ```
pub fn individual_sum<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (Decimal, i64)>,
{
    lines
        .into_iter()
        .map(|(price, quantity)| price * Decimal::from(quantity))
        .sum()
}

// =============================================================================
// Target Policy
// =============================================================================

impl TransactionKind {
    /// Amount a transaction's lines must sum to.
    ///
    /// `recorded` is the transaction's recorded total when it is positive.
    pub fn select_target(
        &self,
        recorded: Option<Decimal>,
        individual_sum: Decimal,
        has_order_discount: bool,
        policy: OrderSurplusPolicy,
    ) -> Decimal {
        match (self, recorded) {
            (_, Some(total)) if has_order_discount => total,
            (TransactionKind::Order, Some(total))
                if policy == OrderSurplusPolicy::KeepRecordedTotal =>
            {
                total
            }
            _ => individual_sum,
        }
    }
}

// =============================================================================
// Order Discount
// =============================================================================

/// Outcome of order-level discount detection for one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderDiscount {
    /// Recorded total, when present and positive.
    pub recorded_total: Option<Decimal>,
    pub individual_sum: Decimal,
    pub has_order_discount: bool,
    /// Proportional factor in `(0, 1]`.
    pub factor: Decimal,
    pub target: Decimal,
}

impl OrderDiscount {
    /// Detects the order discount and selects the target for a transaction.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use tally_core::config::OrderSurplusPolicy;
    /// use tally_core::discount::OrderDiscount;
    /// use tally_core::types::TransactionKind;
    ///
    /// let d = OrderDiscount::detect(
    ///     TransactionKind::Order,
    ///     Some(Decimal::from(90000)),
    ///     Decimal::from(95000),
    ///     OrderSurplusPolicy::UseLineSum,
    /// );
    /// assert!(d.has_order_discount);
    /// assert_eq!(d.target, Decimal::from(90000));
    /// ```
    pub fn detect(
        kind: TransactionKind,
        recorded_total: Option<Decimal>,
        individual_sum: Decimal,
        policy: OrderSurplusPolicy,
    ) -> Self {
        let recorded_total = recorded_total.filter(|t| *t > Decimal::ZERO);
        let has_order_discount = match recorded_total {
            Some(total) => individual_sum > Decimal::ZERO && total < individual_sum,
            None => false,
        };

        let factor = match recorded_total {
            Some(total) if has_order_discount => ratio_or_zero(total, individual_sum),
            _ => Decimal::ONE,
        };

        let target = kind.select_target(recorded_total, individual_sum, has_order_discount, policy);

        OrderDiscount {
            recorded_total,
            individual_sum,
            has_order_discount,
            factor,
            target,
        }
    }

    /// True when a positive recorded total above the line sum lost to it.
    pub fn recorded_total_ignored(&self) -> bool {
        match self.recorded_total {
            Some(total) => total > self.individual_sum && self.target != total,
            None => false,
        }
    }

    /// Unit price after the order factor.
    #[inline]
    pub fn apply(&self, individual_price: Decimal) -> Decimal {
        individual_price * self.factor
    }
}

/// Effective discount against the catalog price, in percent.
///
/// `round2((1 − final / real) × 100)`, clamped to `[0, 100]`. Lines without
/// any discount, and lines with a zero catalog price, report 0.
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use tally_core::discount::discount_percent;
/// use tally_core::types::DiscountKind;
///
/// let pct = discount_percent(Decimal::from(45000), Decimal::from(50000), DiscountKind::Individual);
/// assert_eq!(pct, Decimal::from(10));
/// ```
pub fn discount_percent(final_unit_price: Decimal, real_price: Decimal, kind: DiscountKind) -> Decimal {
    if kind == DiscountKind::None || real_price.is_zero() {
        return Decimal::ZERO;
    }

    let ratio = ratio_or_zero(final_unit_price, real_price);
    round2((Decimal::ONE - ratio) * Decimal::ONE_HUNDRED).clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn detect(kind: TransactionKind, recorded: &str, sum: &str) -> OrderDiscount {
        OrderDiscount::detect(kind, Some(dec(recorded)), dec(sum), OrderSurplusPolicy::UseLineSum)
    }

    #[test]
    fn test_detects_order_discount() {
        let d = detect(TransactionKind::Order, "90000", "95000");
        assert!(d.has_order_discount);
        assert_eq!(d.factor, dec("90000") / dec("95000"));
        assert_eq!(d.target, dec("90000"));
        assert!(!d.recorded_total_ignored());
    }

    #[test]
    fn test_order_surplus_uses_line_sum_by_default() {
        let d = detect(TransactionKind::Order, "100", "99");
        assert!(!d.has_order_discount);
        assert_eq!(d.factor, Decimal::ONE);
        assert_eq!(d.target, dec("99"));
        assert!(d.recorded_total_ignored());
    }

    #[test]
    fn test_order_surplus_keep_recorded_total() {
        let d = OrderDiscount::detect(
            TransactionKind::Order,
            Some(dec("100")),
            dec("99"),
            OrderSurplusPolicy::KeepRecordedTotal,
        );
        assert!(!d.has_order_discount);
        assert_eq!(d.target, dec("100"));
        assert!(!d.recorded_total_ignored());
    }

    #[test]
    fn test_manual_payment_discards_surplus_under_any_policy() {
        for policy in [OrderSurplusPolicy::UseLineSum, OrderSurplusPolicy::KeepRecordedTotal] {
            let d = OrderDiscount::detect(
                TransactionKind::ManualPayment,
                Some(dec("500")),
                dec("400"),
                policy,
            );
            assert_eq!(d.target, dec("400"));
            assert!(d.recorded_total_ignored());
        }
    }

    #[test]
    fn test_missing_or_non_positive_recorded_total() {
        for recorded in [None, Some(Decimal::ZERO), Some(dec("-50"))] {
            let d = OrderDiscount::detect(
                TransactionKind::Order,
                recorded,
                dec("66.66"),
                OrderSurplusPolicy::KeepRecordedTotal,
            );
            assert_eq!(d.recorded_total, None);
            assert!(!d.has_order_discount);
            assert_eq!(d.target, dec("66.66"));
            assert!(!d.recorded_total_ignored());
        }
    }

    #[test]
    fn test_equal_totals_are_not_a_discount() {
        let d = detect(TransactionKind::ManualPayment, "400", "400");
        assert!(!d.has_order_discount);
        assert_eq!(d.target, dec("400"));
        assert!(!d.recorded_total_ignored());
    }

    #[test]
    fn test_zero_individual_sum_never_discounts() {
        let d = detect(TransactionKind::Order, "100", "0");
        assert!(!d.has_order_discount);
        assert_eq!(d.factor, Decimal::ONE);
        assert_eq!(d.target, Decimal::ZERO);
    }

    #[test]
    fn test_discount_percent() {
        assert_eq!(
            discount_percent(dec("47368.42"), dec("50000"), DiscountKind::Order),
            dec("5.26")
        );
        assert_eq!(
            discount_percent(dec("10"), Decimal::ZERO, DiscountKind::Order),
            Decimal::ZERO
        );
        assert_eq!(
            discount_percent(dec("1200"), dec("1000"), DiscountKind::None),
            Decimal::ZERO
        );
        assert_eq!(
            discount_percent(Decimal::ZERO, dec("1000"), DiscountKind::Individual),
            dec("100")
        );
    }

    #[test]
    fn test_individual_sum_with_quantities() {
        let sum = individual_sum([(dec("33.33"), 1), (dec("33.33"), 1), (dec("10"), 0)]);
        assert_eq!(sum, dec("66.66"));
    }
}
