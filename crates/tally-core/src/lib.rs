//! # tally-core: Sales Reconciliation Engine
//!
//! This crate turns raw transaction snapshots (online orders and manual
//! payments) into an audit-grade, line-level sales report whose line totals
//! add up exactly to each transaction's authoritative total.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Data access (outside this workspace)                 │   │
//! │  │   orders + manual payments, joined with products and costs     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON snapshot                          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 tally-report (apps/report-cli)                  │   │
//! │  │        config, logging, file I/O, report envelope              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ normalize │  │  pricing  │  │ discount  │  │ rounding  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                 │   │
//! │  │   │  profit   │  │ aggregate │  │   audit   │                 │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK • NO SHARED STATE • PURE FUNCTIONS         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │                                ▼                                        │
//! │            Rendering (PDF / spreadsheet), outside this workspace       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Transactions, line items, products, resolved lines
//! - [`money`] - Rounded `Money` amounts and the shared rounding helpers
//! - [`error`] - Caller-visible error types
//! - [`validation`] - Date, amount and configuration checks
//! - [`period`] - Report date range in store-local days
//! - [`config`] - Engine configuration
//! - [`pricing`] - Line Pricing Resolver
//! - [`discount`] - Order-level discount detection and target policy
//! - [`rounding`] - Rounding Reconciler
//! - [`profit`] - Profit Calculator
//! - [`normalize`] - Transaction Normalizer and eligibility
//! - [`audit`] - Non-fatal audit findings
//! - [`aggregate`] - Totals, re-verification, summaries, ordering
//! - [`engine`] - The pipeline
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: same input, byte-identical output
//! 2. **Exact Arithmetic**: `Decimal` for inputs, whole-unit `Money` for rounded output
//! 3. **Best Effort**: only a bad date range stops a report; every other
//!    anomaly becomes an audit finding
//!
//! ## Example Usage
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use tally_core::{EngineConfig, ReconciliationEngine, Transaction};
//!
//! let json = r#"[{
//!     "kind": "order",
//!     "id": "o-1",
//!     "created_at": "2025-03-10T15:00:00Z",
//!     "total": 90000,
//!     "products": [
//!         { "product_ref": "a", "quantity": 1, "product": { "id": "a", "price": 50000 } },
//!         { "product_ref": "b", "quantity": 1, "product": { "id": "b", "price": 50000, "discount": 10 } }
//!     ]
//! }]"#;
//! let transactions: Vec<Transaction> = serde_json::from_str(json).unwrap();
//!
//! let engine = ReconciliationEngine::new(EngineConfig::default()).unwrap();
//! let report = engine
//!     .report(Some("2025-03-01"), Some("2025-03-31"), &transactions)
//!     .unwrap();
//!
//! assert_eq!(report.totals.grand_total, Decimal::from(90000));
//! assert_eq!(report.totals.detail_total.units(), 90000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aggregate;
pub mod audit;
pub mod config;
pub mod discount;
pub mod engine;
pub mod error;
pub mod money;
pub mod normalize;
pub mod period;
pub mod pricing;
pub mod profit;
pub mod rounding;
pub mod types;
pub mod validation;

#[cfg(test)]
mod fixtures;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use aggregate::{GroupSummary, ReportTotals, SalesReport};
pub use audit::{AuditFinding, AuditKind, Severity};
pub use config::{EngineConfig, Labels, OrderSurplusPolicy};
pub use engine::ReconciliationEngine;
pub use error::{ReportError, ReportResult, ValidationError};
pub use money::Money;
pub use period::ReportPeriod;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default store offset from UTC, in minutes (UTC-05:00).
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = -300;

/// Largest offset any real time zone uses (±14:00).
pub const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Decimal places of every reported percentage.
pub const PERCENT_DECIMALS: u32 = 2;

/// Decimal places of the reported order factor (display only).
pub const FACTOR_DECIMALS: u32 = 4;
