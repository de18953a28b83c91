//! Per-process scheduler statistics (`§4.5`: "per-process, not persisted").

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct SchedulerStats {
    cycles: AtomicU64,
    characters_processed: AtomicU64,
    actions_attempted: AtomicU64,
    actions_succeeded: AtomicU64,
    actions_failed: AtomicU64,
    total_cycle_duration_ms: AtomicU64,
}

/// Snapshot exposed via the `scheduler_stats` introspection point.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SchedulerStatsSnapshot {
    pub cycles: u64,
    pub characters_processed: u64,
    pub actions_attempted: u64,
    pub actions_succeeded: u64,
    pub actions_failed: u64,
    pub average_cycle_duration_ms: u64,
}

impl SchedulerStats {
    pub fn record_cycle(&self, characters_processed: u64, duration_ms: u64) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        self.characters_processed
            .fetch_add(characters_processed, Ordering::Relaxed);
        self.total_cycle_duration_ms
            .fetch_add(duration_ms, Ordering::Relaxed);
    }

    pub fn record_action(&self, succeeded: bool) {
        self.actions_attempted.fetch_add(1, Ordering::Relaxed);
        if succeeded {
            self.actions_succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.actions_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> SchedulerStatsSnapshot {
        let cycles = self.cycles.load(Ordering::Relaxed);
        let total_duration = self.total_cycle_duration_ms.load(Ordering::Relaxed);
        SchedulerStatsSnapshot {
            cycles,
            characters_processed: self.characters_processed.load(Ordering::Relaxed),
            actions_attempted: self.actions_attempted.load(Ordering::Relaxed),
            actions_succeeded: self.actions_succeeded.load(Ordering::Relaxed),
            actions_failed: self.actions_failed.load(Ordering::Relaxed),
            average_cycle_duration_ms: if cycles == 0 { 0 } else { total_duration / cycles },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_averages_cycle_duration() {
        let stats = SchedulerStats::default();
        stats.record_cycle(3, 100);
        stats.record_cycle(2, 300);
        let snap = stats.snapshot();
        assert_eq!(snap.cycles, 2);
        assert_eq!(snap.characters_processed, 5);
        assert_eq!(snap.average_cycle_duration_ms, 200);
    }

    #[test]
    fn snapshot_counts_action_outcomes() {
        let stats = SchedulerStats::default();
        stats.record_action(true);
        stats.record_action(true);
        stats.record_action(false);
        let snap = stats.snapshot();
        assert_eq!(snap.actions_attempted, 3);
        assert_eq!(snap.actions_succeeded, 2);
        assert_eq!(snap.actions_failed, 1);
    }
}
