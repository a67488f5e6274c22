//! # Line Pricing Resolver
//!
//! Works out, for one line item, the catalog ("real") price and the price
//! after the individual discount. The order-level discount is applied later
//! by [`crate::discount`], on top of the price computed here.
//!
//! ## Resolution Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  LineItem ──► product ──► master?                                      │
//! │                                                                         │
//! │  name, real price, brand, category   master if present, else product   │
//! │  discount value                      master, else product, else 0      │
//! │  cost                                master, else product, else 0      │
//! │  tone                                product color, else product tone  │
//! │                                                                         │
//! │  discount value ──► factor ──► derived = round(real × (1 − factor))    │
//! │                                                                         │
//! │  line price > 0 ? override : none                                      │
//! │                                                                         │
//! │  factor > 0:  min(override, derived)  or derived                       │
//! │  factor = 0:  override                or real                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::round_half_up;
use crate::types::ProductRecord;

// =============================================================================
// Product Field Resolution
// =============================================================================

/// Product fields after following the master pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProduct<'a> {
    pub name: Option<&'a str>,
    pub real_price: Decimal,
    pub discount_value: Decimal,
    pub cost: Decimal,
    pub brand: Option<&'a str>,
    pub category: Option<&'a str>,
    pub tone: Option<&'a str>,
}

/// Resolves the fields a report line needs from a product snapshot.
///
/// ## Precedence
/// 1. `name`, `real_price`, `brand`, `category`: the master product when the
///    instance redirects to one, otherwise the instance. A master without a
///    price prices the line at 0.
/// 2. `discount_value` and `cost`: the master's value, else the instance's,
///    else 0.
/// 3. `tone`: always the instance (its color name, else its tone name),
///    because a tone variant points at a master that has no tone.
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use tally_core::pricing::resolve_product;
/// use tally_core::types::ProductRecord;
///
/// let variant = ProductRecord {
///     id: "lipstick-rose".into(),
///     color: Some("Rose".into()),
///     discount: Some(Decimal::from(10)),
///     master: Some(Box::new(ProductRecord {
///         id: "lipstick".into(),
///         price: Some(Decimal::from(50000)),
///         ..Default::default()
///     })),
///     ..Default::default()
/// };
///
/// let resolved = resolve_product(&variant);
/// assert_eq!(resolved.real_price, Decimal::from(50000));
/// assert_eq!(resolved.discount_value, Decimal::from(10)); // master has none
/// assert_eq!(resolved.tone, Some("Rose"));
/// ```
pub fn resolve_product(product: &ProductRecord) -> ResolvedProduct<'_> {
    let main = product.master.as_deref().unwrap_or(product);
    let fallback = |pick: fn(&ProductRecord) -> Option<Decimal>| {
        product
            .master
            .as_deref()
            .and_then(pick)
            .or_else(|| pick(product))
            .unwrap_or(Decimal::ZERO)
    };

    ResolvedProduct {
        name: non_blank(main.name.as_deref()),
        real_price: main.price.unwrap_or(Decimal::ZERO),
        discount_value: fallback(|p| p.discount),
        cost: fallback(|p| p.cost),
        brand: non_blank(main.brand.as_deref()),
        category: non_blank(main.category.as_deref()),
        tone: non_blank(product.color.as_deref()).or_else(|| non_blank(product.tone.as_deref())),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

// =============================================================================
// Discount Normalization
// =============================================================================

/// Normalizes a stored discount value into a fraction in `[0, 1]`.
///
/// | stored value      | factor          |
/// |-------------------|-----------------|
/// | `<= 0`            | 0               |
/// | `0 < v <= 1`      | `v` (fraction)  |
/// | `1 < v <= 100`    | `v / 100`       |
/// | `> 100`           | 1               |
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use tally_core::pricing::discount_factor;
///
/// assert_eq!(discount_factor(Decimal::new(25, 2)), Decimal::new(25, 2));
/// assert_eq!(discount_factor(Decimal::from(10)), Decimal::new(1, 1));
/// assert_eq!(discount_factor(Decimal::from(250)), Decimal::ONE);
/// ```
pub fn discount_factor(value: Decimal) -> Decimal {
    if value <= Decimal::ZERO {
        Decimal::ZERO
    } else if value <= Decimal::ONE {
        value
    } else if value <= Decimal::ONE_HUNDRED {
        value / Decimal::ONE_HUNDRED
    } else {
        Decimal::ONE
    }
}

// =============================================================================
// Line Pricing
// =============================================================================

/// Where a line's individual discount came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountSource {
    /// The product's stored discount value.
    Product,
    /// The literal price recorded on the line.
    Line,
    /// No individual discount.
    None,
}

/// Pricing of a single line before any order-level discount.
#[derive(Debug, Clone, PartialEq)]
pub struct LinePricing {
    pub real_price: Decimal,
    pub discount_value: Decimal,
    pub discount_factor: Decimal,
    /// `round(real_price × (1 − discount_factor))`.
    pub derived_price: Decimal,
    /// The line's literal price when positive.
    pub line_override: Option<Decimal>,
    pub individual_price: Decimal,
    pub source: DiscountSource,
}

impl LinePricing {
    /// True when the individual price undercuts the catalog price.
    #[inline]
    pub fn has_individual_discount(&self) -> bool {
        self.individual_price < self.real_price
    }

    /// Snapshot of the pricing decisions for the optional line trace.
    pub fn trace(&self, applied_factor: Decimal) -> PricingTrace {
        PricingTrace {
            line_override: self.line_override,
            discount_value: self.discount_value,
            derived_discounted_price: self.derived_price,
            chosen_base: self.individual_price,
            individual_discount_source: self.source,
            applied_factor,
        }
    }
}

/// Resolves real and individually-discounted prices for a line.
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use tally_core::pricing::{resolve_line_pricing, DiscountSource};
///
/// // 10% product discount, line recorded at full price: the derived price wins.
/// let pricing = resolve_line_pricing(
///     Decimal::from(50000),
///     Decimal::from(10),
///     Some(Decimal::from(50000)),
/// );
/// assert_eq!(pricing.individual_price, Decimal::from(45000));
/// assert_eq!(pricing.source, DiscountSource::Product);
/// assert!(pricing.has_individual_discount());
/// ```
pub fn resolve_line_pricing(
    real_price: Decimal,
    discount_value: Decimal,
    line_price: Option<Decimal>,
) -> LinePricing {
    let factor = discount_factor(discount_value);
    let derived_price = round_half_up(real_price * (Decimal::ONE - factor));
    let line_override = line_price.filter(|p| *p > Decimal::ZERO);

    let (individual_price, chosen_derived) = if factor > Decimal::ZERO {
        match line_override {
            Some(line) if line < derived_price => (line, false),
            _ => (derived_price, true),
        }
    } else {
        match line_override {
            Some(line) => (line, false),
            None => (real_price, false),
        }
    };

    let source = if individual_price >= real_price {
        DiscountSource::None
    } else if chosen_derived {
        DiscountSource::Product
    } else {
        DiscountSource::Line
    };

    LinePricing {
        real_price,
        discount_value,
        discount_factor: factor,
        derived_price,
        line_override,
        individual_price,
        source,
    }
}

// =============================================================================
// Pricing Trace
// =============================================================================

/// Audit trail of how a line was priced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingTrace {
    #[ts(as = "Option<String>")]
    pub line_override: Option<Decimal>,
    #[ts(as = "String")]
    pub discount_value: Decimal,
    #[ts(as = "String")]
    pub derived_discounted_price: Decimal,
    #[ts(as = "String")]
    pub chosen_base: Decimal,
    pub individual_discount_source: DiscountSource,
    /// Order-level factor applied to the base (1 when none).
    #[ts(as = "String")]
    pub applied_factor: Decimal,
}

// =============================================================================
// Unit Tests
// =============================================================================
