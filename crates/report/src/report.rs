//! Snapshot loading and report assembly.

use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use tubedesk_core::approval::Approval;
use tubedesk_core::approval_filter::{filter_approvals, parse_filters, ApprovalFilter};
use tubedesk_core::approval_stats::{compute_stats, ApprovalStats};
use tubedesk_core::error::CoreError;
use tubedesk_core::types::{ApprovalId, Timestamp};

/// Output document printed by the binary.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalReport {
    pub generated_at: Timestamp,
    pub filter: ApprovalFilter,
    /// Header counts over the whole snapshot, independent of the filter.
    pub stats: ApprovalStats,
    /// Ids of approvals matching the filter, in snapshot order.
    pub matching: Vec<ApprovalId>,
}

/// Read an approval snapshot (JSON array) from disk.
pub fn load_snapshot(path: &Path) -> anyhow::Result<Vec<Approval>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let approvals: Vec<Approval> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
    tracing::debug!(count = approvals.len(), path = %path.display(), "Loaded approval snapshot");
    Ok(approvals)
}

/// Validate `raw_filter` and derive the report for `snapshot` at `now`.
pub fn build_report(
    snapshot: &[Approval],
    raw_filter: &serde_json::Value,
    now: Timestamp,
) -> anyhow::Result<ApprovalReport> {
    let filter = parse_filters(raw_filter)
        .map_err(CoreError::from)
        .context("Invalid approval filter")?;

    let stats = compute_stats(snapshot, now);
    let matching = filter_approvals(snapshot, &filter)
        .into_iter()
        .map(|a| a.id)
        .collect();

    Ok(ApprovalReport {
        generated_at: now,
        filter,
        stats,
        matching,
    })
}
