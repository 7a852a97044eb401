//! Dashboard statistics over an approval snapshot.
//!
//! [`compute_stats`] is a pure function of the snapshot and an explicit
//! evaluation instant. [`StatsCache`] memoizes it per snapshot revision so a
//! view that re-renders with an unchanged list does not recount.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::approval::{Approval, ApprovalStatus};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// A pending approval touching more videos than this is urgent.
pub const URGENT_AFFECTED_VIDEOS_THRESHOLD: u32 = 50;

/// A pending approval older than this (in milliseconds) is stale.
pub const STALE_PENDING_AGE_MS: i64 = 86_400_000;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Aggregate counts shown in the approvals dashboard header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalStats {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub total: usize,
    /// Pending approvals above [`URGENT_AFFECTED_VIDEOS_THRESHOLD`].
    pub urgent_count: usize,
    /// Pending approvals older than [`STALE_PENDING_AGE_MS`].
    pub old_count: usize,
}

impl ApprovalStats {
    /// Human-readable one-liner.
    ///
    /// Example: `"5 total (1 approved, 1 rejected, 3 pending; 1 urgent, 1 stale)"`.
    pub fn summary(&self) -> String {
        format!(
            "{} total ({} approved, {} rejected, {} pending; {} urgent, {} stale)",
            self.total,
            self.approved,
            self.rejected,
            self.pending,
            self.urgent_count,
            self.old_count
        )
    }
}

/// Whether a pending approval is large enough to be flagged urgent.
///
/// Strictly greater than the threshold; exactly 50 videos is not urgent.
pub fn is_urgent(approval: &Approval) -> bool {
    approval.is_pending() && approval.affected_videos_count > URGENT_AFFECTED_VIDEOS_THRESHOLD
}

/// Whether a pending approval was created strictly before `now - 24h`.
///
/// A malformed `created_at` counts as not stale.
pub fn is_stale(approval: &Approval, now: Timestamp) -> bool {
    approval.is_pending() && created_before(approval, stale_cutoff(now))
}

fn stale_cutoff(now: Timestamp) -> Timestamp {
    now - Duration::milliseconds(STALE_PENDING_AGE_MS)
}

fn created_before(approval: &Approval, cutoff: Timestamp) -> bool {
    match approval.created_instant() {
        Some(created) => created < cutoff,
        None => {
            tracing::debug!(
                approval_id = %approval.id,
                created_at = %approval.created_at,
                "Unparseable created_at, not counting approval as stale",
            );
            false
        }
    }
}

/// Derive dashboard counts from a snapshot, evaluated at `now`.
///
/// `now` is used for every record so one pass never straddles a boundary.
pub fn compute_stats(approvals: &[Approval], now: Timestamp) -> ApprovalStats {
    let cutoff = stale_cutoff(now);
    let mut stats = ApprovalStats {
        total: approvals.len(),
        ..ApprovalStats::default()
    };

    for approval in approvals {
        match approval.status {
            ApprovalStatus::Pending => {
                stats.pending += 1;
                if approval.affected_videos_count > URGENT_AFFECTED_VIDEOS_THRESHOLD {
                    stats.urgent_count += 1;
                }
                if created_before(approval, cutoff) {
                    stats.old_count += 1;
                }
            }
            ApprovalStatus::Approved => stats.approved += 1,
            ApprovalStatus::Rejected => stats.rejected += 1,
        }
    }

    stats
}

/// [`compute_stats`] evaluated at the current wall-clock time.
pub fn compute_stats_now(approvals: &[Approval]) -> ApprovalStats {
    compute_stats(approvals, chrono::Utc::now())
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Earliest instant after which a currently fresh pending approval becomes
/// stale, i.e. the next time `old_count` can change without the snapshot
/// changing. `None` when no pending approval is waiting to cross the cutoff.
pub fn next_stale_transition(approvals: &[Approval], now: Timestamp) -> Option<Timestamp> {
    let cutoff = stale_cutoff(now);
    approvals
        .iter()
        .filter(|a| a.is_pending())
        .filter_map(Approval::created_instant)
        .filter(|created| *created >= cutoff)
        .map(|created| created + Duration::milliseconds(STALE_PENDING_AGE_MS))
        .min()
}

#[derive(Debug, Clone, Copy)]
struct CachedStats {
    revision: u64,
    stats: ApprovalStats,
    valid_until: Option<Timestamp>,
}

/// Memoizes [`compute_stats`] for the most recent snapshot revision.
///
/// The caller owns the revision counter and bumps it whenever it replaces
/// or edits its approval list. Cached figures are also dropped once `now`
/// moves past [`next_stale_transition`], so `old_count` never lags.
#[derive(Debug, Clone, Default)]
pub struct StatsCache {
    entry: Option<CachedStats>,
}

impl StatsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return cached stats for `revision`, recomputing over `approvals` at
    /// `now` when the revision differs or a pending approval has since
    /// turned stale.
    pub fn get_or_compute(
        &mut self,
        revision: u64,
        approvals: &[Approval],
        now: Timestamp,
    ) -> ApprovalStats {
        if let Some(entry) = &self.entry {
            let expired = entry.valid_until.is_some_and(|until| now > until);
            if entry.revision == revision && !expired {
                return entry.stats;
            }
        }

        let stats = compute_stats(approvals, now);
        let valid_until = next_stale_transition(approvals, now);
        tracing::debug!(
            revision,
            total = stats.total,
            pending = stats.pending,
            "Recomputed approval stats",
        );
        self.entry = Some(CachedStats {
            revision,
            stats,
            valid_until,
        });
        stats
    }

    /// Stats from the last computation, if any.
    pub fn cached(&self) -> Option<ApprovalStats> {
        self.entry.as_ref().map(|e| e.stats)
    }

    /// Drop the cached figures; the next call recomputes.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::ApprovalType;
    use chrono::{TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn approval(status: ApprovalStatus, affected: u32, created_at: Timestamp) -> Approval {
        Approval {
            id: uuid::Uuid::new_v4(),
            status,
            approval_type: ApprovalType::BlockChange,
            affected_videos_count: affected,
            created_at: created_at.to_rfc3339(),
            title: String::new(),
            description: None,
        }
    }

    fn pending_aged(ms: i64) -> Approval {
        approval(ApprovalStatus::Pending, 1, now() - Duration::milliseconds(ms))
    }

    #[test]
    fn empty_snapshot_yields_zeroes() {
        assert_eq!(compute_stats(&[], now()), ApprovalStats::default());
    }

    #[test]
    fn counts_by_status_sum_to_total() {
        let items = vec![
            approval(ApprovalStatus::Pending, 1, now()),
            approval(ApprovalStatus::Approved, 1, now()),
            approval(ApprovalStatus::Approved, 1, now()),
            approval(ApprovalStatus::Rejected, 1, now()),
        ];
        let stats = compute_stats(&items, now());
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.approved, 2);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.pending + stats.approved + stats.rejected, stats.total);
    }

    #[test]
    fn exactly_fifty_videos_is_not_urgent() {
        let items = vec![
            approval(ApprovalStatus::Pending, 50, now()),
            approval(ApprovalStatus::Pending, 51, now()),
        ];
        assert_eq!(compute_stats(&items, now()).urgent_count, 1);
        assert!(!is_urgent(&items[0]));
        assert!(is_urgent(&items[1]));
    }

    #[test]
    fn decided_approvals_are_never_urgent_or_old() {
        let long_ago = now() - Duration::days(30);
        let items = vec![
            approval(ApprovalStatus::Approved, 500, long_ago),
            approval(ApprovalStatus::Rejected, 500, long_ago),
        ];
        let stats = compute_stats(&items, now());
        assert_eq!(stats.urgent_count, 0);
        assert_eq!(stats.old_count, 0);
        assert!(!is_stale(&items[0], now()));
    }

    #[test]
    fn exactly_twenty_four_hours_is_not_old() {
        let items = vec![pending_aged(STALE_PENDING_AGE_MS)];
        assert_eq!(compute_stats(&items, now()).old_count, 0);
    }

    #[test]
    fn one_millisecond_past_cutoff_is_old() {
        let items = vec![pending_aged(STALE_PENDING_AGE_MS + 1)];
        assert_eq!(compute_stats(&items, now()).old_count, 1);
        assert!(is_stale(&items[0], now()));
    }

    #[test]
    fn malformed_created_at_is_not_old() {
        let mut item = pending_aged(STALE_PENDING_AGE_MS * 10);
        item.created_at = "yesterday-ish".to_string();
        let stats = compute_stats(&[item], now());
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.old_count, 0);
    }

    #[test]
    fn order_does_not_matter() {
        let mut items = vec![
            approval(ApprovalStatus::Pending, 120, now()),
            pending_aged(30 * 3_600_000),
            approval(ApprovalStatus::Approved, 3, now()),
            approval(ApprovalStatus::Rejected, 90, now()),
        ];
        let forward = compute_stats(&items, now());
        items.reverse();
        assert_eq!(compute_stats(&items, now()), forward);
    }

    #[test]
    fn summary_formats_all_counts() {
        let stats = ApprovalStats {
            pending: 3,
            approved: 1,
            rejected: 1,
            total: 5,
            urgent_count: 1,
            old_count: 1,
        };
        assert_eq!(
            stats.summary(),
            "5 total (1 approved, 1 rejected, 3 pending; 1 urgent, 1 stale)"
        );
    }

    #[test]
    fn postgres_timestamptz_counts_as_old() {
        let mut item = approval(ApprovalStatus::Pending, 1, now());
        item.created_at = "2026-10-14 08:00:00+00".to_string();
        assert_eq!(compute_stats(&[item], now()).old_count, 1);
    }

    #[test]
    fn next_stale_transition_picks_earliest_fresh_pending() {
        let items = vec![
            pending_aged(3_600_000),
            pending_aged(7_200_000),
            pending_aged(STALE_PENDING_AGE_MS * 2),
            approval(ApprovalStatus::Approved, 1, now()),
        ];
        assert_eq!(
            next_stale_transition(&items, now()),
            Some(now() + Duration::hours(22))
        );
    }

    #[test]
    fn next_stale_transition_is_none_without_fresh_pending() {
        let items = vec![
            pending_aged(STALE_PENDING_AGE_MS * 2),
            approval(ApprovalStatus::Rejected, 1, now()),
        ];
        assert_eq!(next_stale_transition(&items, now()), None);
        assert_eq!(next_stale_transition(&[], now()), None);
    }

    #[test]
    fn cache_reuses_figures_for_same_revision() {
        let mut items = vec![approval(ApprovalStatus::Pending, 1, now())];
        let mut cache = StatsCache::new();
        let first = cache.get_or_compute(1, &items, now());
        assert_eq!(first.pending, 1);

        // Revision unchanged: the list is not looked at again.
        items[0].status = ApprovalStatus::Approved;
        assert_eq!(cache.get_or_compute(1, &items, now()), first);
        assert_eq!(cache.cached(), Some(first));
    }

    #[test]
    fn cache_recomputes_when_revision_changes() {
        let mut items = vec![approval(ApprovalStatus::Pending, 1, now())];
        let mut cache = StatsCache::new();
        assert_eq!(cache.get_or_compute(1, &items, now()).pending, 1);

        items[0].status = ApprovalStatus::Approved;
        let stats = cache.get_or_compute(2, &items, now());
        assert_eq!(stats.pending, 0);
        assert_eq!(stats.approved, 1);
    }

    #[test]
    fn cache_expires_when_pending_approval_turns_stale() {
        let items = vec![pending_aged(STALE_PENDING_AGE_MS - 1_000)];
        let mut cache = StatsCache::new();
        assert_eq!(cache.get_or_compute(1, &items, now()).old_count, 0);

        // Exactly at the boundary the approval is still fresh.
        let boundary = now() + Duration::seconds(1);
        assert_eq!(cache.get_or_compute(1, &items, boundary).old_count, 0);

        let later = now() + Duration::hours(1);
        assert_eq!(cache.get_or_compute(1, &items, later).old_count, 1);
    }

    #[test]
    fn cache_without_fresh_pending_never_expires() {
        let mut items = vec![pending_aged(STALE_PENDING_AGE_MS * 2)];
        let mut cache = StatsCache::new();
        let first = cache.get_or_compute(7, &items, now());
        assert_eq!(first.old_count, 1);

        items.clear();
        let much_later = now() + Duration::days(10);
        assert_eq!(cache.get_or_compute(7, &items, much_later), first);
    }

    #[test]
    fn invalidate_forces_recompute() {
        let mut items = vec![approval(ApprovalStatus::Pending, 1, now())];
        let mut cache = StatsCache::new();
        cache.get_or_compute(1, &items, now());

        cache.invalidate();
        assert!(cache.cached().is_none());

        items.push(approval(ApprovalStatus::Rejected, 1, now()));
        assert_eq!(cache.get_or_compute(1, &items, now()).total, 2);
    }
}
