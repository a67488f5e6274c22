//! # Tally Report
//!
//! Builds a detailed sales report from a transaction snapshot.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        tally-report                                     │
//! │                                                                         │
//! │  args ──► config (file < env < flags) ──► tracing                      │
//! │                                             │                           │
//! │  --input ──► Vec<Transaction> ──► engine.report(--from, --to)          │
//! │                                             │                           │
//! │                                             ▼                           │
//! │                         envelope + report ──► --output (or stdout)     │
//! │                                                                         │
//! │  Exit codes: 0 ok, 1 I/O or parse failure, 2 bad range or config       │
//! │  (an unparsable TALLY_* variable is a config error)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tally_core::{OrderSurplusPolicy, ReconciliationEngine, ReportError};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::config::ReportConfig;
use crate::output::{read_transactions, write_report, ReportEnvelope};

/// Detailed sales report with per-transaction reconciliation.
///
/// Reads a JSON array of orders and manual payments, reconciles every
/// transaction's lines against its recorded total, and writes the report
/// as JSON for the rendering step.
#[derive(Parser, Debug)]
#[command(name = "tally-report", version, about)]
struct Cli {
    /// First day of the report, YYYY-MM-DD (store local time).
    #[arg(long)]
    from: Option<String>,

    /// Last day of the report, YYYY-MM-DD (inclusive).
    #[arg(long)]
    to: Option<String>,

    /// Transaction snapshot (JSON array), `-` for stdin.
    #[arg(short, long)]
    input: PathBuf,

    /// Report destination, stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file (default: platform config dir, report.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Store offset from UTC in minutes, e.g. -300.
    #[arg(long, allow_hyphen_values = true)]
    utc_offset: Option<i32>,

    /// Target rule for orders paid above their line sum.
    #[arg(long)]
    order_surplus: Option<OrderSurplusPolicy>,

    /// Attach a pricing trace to every line.
    #[arg(long)]
    trace: bool,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

impl Cli {
    /// Flags win over file and environment.
    fn apply_to(&self, config: &mut ReportConfig) {
        if let Some(minutes) = self.utc_offset {
            config.engine.utc_offset_minutes = minutes;
        }
        if let Some(policy) = self.order_surplus {
            config.engine.order_surplus = policy;
        }
        if self.trace {
            config.engine.include_trace = true;
        }
        if self.pretty {
            config.output.pretty = true;
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {:#}", e);
            match e.downcast_ref::<ReportError>() {
                Some(_) => ExitCode::from(2),
                None => ExitCode::FAILURE,
            }
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ReportConfig::load(cli.config.clone())?;
    cli.apply_to(&mut config);

    init_tracing(&config.logging.level);
    debug!(
        utc_offset_minutes = config.engine.utc_offset_minutes,
        order_surplus = %config.engine.order_surplus,
        include_trace = config.engine.include_trace,
        "Configuration loaded"
    );
    config.validate()?;

    let engine = ReconciliationEngine::new(config.engine.clone())?;
    let transactions = read_transactions(&cli.input)?;
    info!(count = transactions.len(), input = %cli.input.display(), "Transactions loaded");

    let report = engine.report(cli.from.as_deref(), cli.to.as_deref(), &transactions)?;

    let envelope = ReportEnvelope::new(&report, config.engine.order_surplus);
    let json = envelope.to_json(config.output.pretty)?;
    write_report(cli.output.as_deref(), &json).context("emitting report")?;

    info!(
        report_id = %envelope.report_id,
        lines = report.totals.line_count,
        findings = report.totals.audit.len(),
        "Report written"
    );
    Ok(())
}

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` overrides the configured level. Logs go to stderr so the
/// report can be piped from stdout.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
