//! Snapshot input and report output.
//!
//! The input is a JSON array of tagged transactions, exactly as the
//! data-access collaborator exported them. The output wraps the engine's
//! report in an envelope that identifies the run.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tally_core::{OrderSurplusPolicy, SalesReport, Transaction};
use uuid::Uuid;

/// Path value meaning standard input / standard output.
pub const STDIO: &str = "-";

/// Report plus run metadata.
#[derive(Debug, Serialize)]
pub struct ReportEnvelope<'a> {
    pub report_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub generator: String,
    pub order_surplus: OrderSurplusPolicy,
    #[serde(flatten)]
    pub report: &'a SalesReport,
}

impl<'a> ReportEnvelope<'a> {
    pub fn new(report: &'a SalesReport, order_surplus: OrderSurplusPolicy) -> Self {
        ReportEnvelope {
            report_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            generator: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            order_surplus,
            report,
        }
    }

    pub fn to_json(&self, pretty: bool) -> anyhow::Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        json.context("serializing report")
    }
}

/// Reads a transaction snapshot from a file, or stdin for `-`.
pub fn read_transactions(path: &Path) -> anyhow::Result<Vec<Transaction>> {
    let contents = if path.as_os_str() == STDIO {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading transactions from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("reading transactions from {}", path.display()))?
    };

    parse_transactions(&contents)
        .with_context(|| format!("parsing transactions from {}", path.display()))
}

pub fn parse_transactions(json: &str) -> anyhow::Result<Vec<Transaction>> {
    Ok(serde_json::from_str(json)?)
}

/// Writes the report to a file, or stdout when no path (or `-`) is given.
pub fn write_report(path: Option<&Path>, json: &str) -> anyhow::Result<()> {
    match path {
        Some(path) if path.as_os_str() != STDIO => std::fs::write(path, json)
            .with_context(|| format!("writing report to {}", path.display())),
        _ => {
            println!("{}", json);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::{EngineConfig, ReconciliationEngine};

    const SNAPSHOT: &str = r#"[
        {
            "kind": "manual_payment",
            "id": "p-1",
            "created_at": "2025-03-05T16:00:00Z",
            "total": "500",
            "status": "approved",
            "is_store": true,
            "last_admin_edit": { "full_name": "Admin Ruiz" },
            "store": [
                { "product_ref": "a", "quantity": 2, "price": 200,
                  "product": { "id": "a", "name": "Serum", "price": 250, "brand": "Glow" } }
            ]
        }
    ]"#;

    #[test]
    fn test_parse_transactions() {
        let txs = parse_transactions(SNAPSHOT).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].id(), "p-1");
        assert!(parse_transactions("{ not json").is_err());
    }

    #[test]
    fn test_envelope_flattens_report() {
        let txs = parse_transactions(SNAPSHOT).unwrap();
        let engine = ReconciliationEngine::new(EngineConfig::default()).unwrap();
        let report = engine
            .report(Some("2025-03-01"), Some("2025-03-31"), &txs)
            .unwrap();

        let envelope = ReportEnvelope::new(&report, OrderSurplusPolicy::UseLineSum);
        let value: serde_json::Value = serde_json::from_str(&envelope.to_json(false).unwrap()).unwrap();

        assert_eq!(value["order_surplus"], "use_line_sum");
        assert!(value["report_id"].is_string());
        assert_eq!(value["lines"][0]["line_total"], 400);
        assert_eq!(value["lines"][0]["brand"], "Glow");
        assert_eq!(value["totals"]["line_count"], 1);
        assert_eq!(value["totals"]["audit"][0]["kind"], "recorded_total_ignored");
        assert_eq!(value["brands"][0]["name"], "Glow");
    }

    #[test]
    fn test_write_report_to_file() {
        let path = std::env::temp_dir().join(format!("tally-report-{}.json", Uuid::new_v4()));
        write_report(Some(&path), "{}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
        std::fs::remove_file(&path).unwrap();
    }
}
