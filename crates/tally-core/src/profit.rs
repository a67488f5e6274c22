//! # Profit Calculator
//!
//! Per-line profit and margin from the rounded sold price and the unit cost.
//!
//! ```text
//! profit_per_unit = sold_price − cost
//! profit_total    = profit_per_unit × quantity
//! margin_percent  = cost > 0 ? round2(profit_per_unit / cost × 100) : 0
//! ```
//!
//! Always recomputed after the reconciler touches a line's sold price.

use rust_decimal::Decimal;

use crate::money::{ratio_or_zero, round2, Money};
use crate::types::ResolvedLine;

/// Profit figures of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineProfit {
    pub per_unit: Decimal,
    pub total: Decimal,
    pub margin_percent: Decimal,
}

impl LineProfit {
    /// Computes profit for a line.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use tally_core::money::Money;
    /// use tally_core::profit::LineProfit;
    ///
    /// let p = LineProfit::compute(Money::from_units(50), Decimal::ZERO, 3);
    /// assert_eq!(p.per_unit, Decimal::from(50));
    /// assert_eq!(p.total, Decimal::from(150));
    /// assert_eq!(p.margin_percent, Decimal::ZERO); // cost 0: no margin
    /// ```
    pub fn compute(sold_price: Money, cost: Decimal, quantity: i64) -> Self {
        let per_unit = sold_price.to_decimal() - cost;
        let margin_percent = if cost > Decimal::ZERO {
            round2(ratio_or_zero(per_unit, cost) * Decimal::ONE_HUNDRED)
        } else {
            Decimal::ZERO
        };

        LineProfit {
            per_unit,
            total: per_unit * Decimal::from(quantity),
            margin_percent,
        }
    }
}

/// Returns the line with its profit fields recomputed from its sold price.
pub fn with_profit(line: ResolvedLine) -> ResolvedLine {
    let profit = LineProfit::compute(line.sold_price, line.cost, line.quantity);
    ResolvedLine {
        profit_per_unit: profit.per_unit,
        profit_total: profit.total,
        margin_percent: profit.margin_percent,
        ..line
    }
}

/// Global margin over a cost base; 0 when there is no cost.
pub fn margin_percent(profit: Decimal, cost: Decimal) -> Decimal {
    if cost > Decimal::ZERO {
        round2(ratio_or_zero(profit, cost) * Decimal::ONE_HUNDRED)
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profit_with_cost() {
        let p = LineProfit::compute(Money::from_units(45000), Decimal::from(30000), 2);
        assert_eq!(p.per_unit, Decimal::from(15000));
        assert_eq!(p.total, Decimal::from(30000));
        assert_eq!(p.margin_percent, Decimal::from(50));
    }

    #[test]
    fn test_negative_profit_keeps_sign() {
        let p = LineProfit::compute(Money::from_units(90), Decimal::from(120), 1);
        assert_eq!(p.per_unit, Decimal::from(-30));
        assert_eq!(p.margin_percent, Decimal::from(-25));
    }

    #[test]
    fn test_zero_cost_margin_is_zero_regardless_of_sign() {
        let p = LineProfit::compute(Money::from_units(50), Decimal::ZERO, 4);
        assert_eq!(p.total, Decimal::from(200));
        assert_eq!(p.margin_percent, Decimal::ZERO);

        let p = LineProfit::compute(Money::zero(), Decimal::ZERO, 4);
        assert_eq!(p.margin_percent, Decimal::ZERO);
    }

    #[test]
    fn test_margin_is_rounded_to_two_places() {
        // 100 / 300 = 33.333...%
        let p = LineProfit::compute(Money::from_units(400), Decimal::from(300), 1);
        assert_eq!(p.margin_percent, Decimal::new(3333, 2));
    }

    #[test]
    fn test_global_margin() {
        assert_eq!(margin_percent(Decimal::from(50), Decimal::from(200)), Decimal::from(25));
        assert_eq!(margin_percent(Decimal::from(50), Decimal::ZERO), Decimal::ZERO);
    }
}
