//! `tubedesk-report` -- print approval dashboard figures for a snapshot.
//!
//! Reads approvals exported from the data store, validates the requested
//! filter, and prints header stats plus the ids matching the filter as JSON.
//!
//! # Environment variables
//!
//! | Variable             | Required | Default          | Description                            |
//! |----------------------|----------|------------------|----------------------------------------|
//! | `APPROVALS_SNAPSHOT` | yes      | --               | Path to a JSON array of approvals      |
//! | `APPROVAL_FILTER`    | no       | all / all / `""` | Filter object `{status, type, search}` |
//! | `RUST_LOG`           | no       | see below        | Log filter                             |
//!
//! `RUST_LOG` defaults to `tubedesk_report=info,tubedesk_core=info`.

use tubedesk_report::config::ReportConfig;
use tubedesk_report::report;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tubedesk_report=info,tubedesk_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run() {
        tracing::error!(error = %format!("{e:#}"), "Report failed");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let config = ReportConfig::from_env()?;

    tracing::info!(
        snapshot = %config.snapshot_path.display(),
        filter = %config.filter,
        "Building approval report",
    );

    let snapshot = report::load_snapshot(&config.snapshot_path)?;
    let report = report::build_report(&snapshot, &config.filter, chrono::Utc::now())?;

    tracing::info!(
        summary = %report.stats.summary(),
        matching = report.matching.len(),
        "Approval report ready",
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
