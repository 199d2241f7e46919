//! Scheduled recompute: a viewer's future snapshots from one store read.
//!
//! Viewer processes can't keep a clock ticking between refreshes. Instead,
//! each activation reads the store once and lays out a finite sequence of
//! future instants; the snapshot for each instant is computed on demand
//! against that same captured state. A new activation re-reads the store
//! and yields a fresh sequence; stale sequences are simply discarded,
//! never mutated.

use jiff::{SignedDuration, Timestamp};

use crate::earnings;
use crate::model::{ShiftState, ShiftStatus, Snapshot};
use crate::store::StateStore;

/// How many entries an activation lays out, and how far apart.
#[derive(Debug, Clone, Copy)]
pub struct TimelinePolicy {
    pub cadence: SignedDuration,
    pub entries: usize,
}

impl Default for TimelinePolicy {
    /// Half an hour of minute-by-minute entries.
    fn default() -> Self {
        Self {
            cadence: SignedDuration::from_mins(1),
            entries: 30,
        }
    }
}

/// Where a viewer's schedule stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelinePhase {
    /// Never activated.
    Idle,

    /// The last activation produced a sequence of future entries.
    Scheduled,

    /// The last activation found no active shift; nothing to recompute
    /// until the next activation.
    Expired,
}

/// Per-viewer scheduler.
///
/// Restartable: every activation starts over from a fresh store read.
pub struct TimelineScheduler {
    policy: TimelinePolicy,
    phase: TimelinePhase,
}

impl TimelineScheduler {
    pub fn new(policy: TimelinePolicy) -> Self {
        Self {
            policy,
            phase: TimelinePhase::Idle,
        }
    }

    pub fn phase(&self) -> TimelinePhase {
        self.phase
    }

    /// Reads the store once and lays out the sequence.
    ///
    /// With no active shift this yields a single terminal entry and the
    /// scheduler expires. Otherwise it yields `policy.entries` instants
    /// spaced `policy.cadence` apart starting at `now`, each computed
    /// against the state captured here — the store is not re-read per
    /// entry.
    pub fn activate(&mut self, store: &StateStore, now: Timestamp) -> Timeline {
        let state = store.read();
        let remaining = if state.status() == ShiftStatus::NotStarted {
            self.phase = TimelinePhase::Expired;
            1
        } else {
            self.phase = TimelinePhase::Scheduled;
            self.policy.entries
        };
        Timeline {
            state,
            next: Some(now),
            cadence: self.policy.cadence,
            remaining,
        }
    }
}

/// One future instant and the snapshot a surface should display from it.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    pub at: Timestamp,
    pub snapshot: Snapshot,
}

/// Lazy, finite sequence of entries against one captured state.
pub struct Timeline {
    state: ShiftState,
    next: Option<Timestamp>,
    cadence: SignedDuration,
    remaining: usize,
}

impl Iterator for Timeline {
    type Item = TimelineEntry;

    fn next(&mut self) -> Option<TimelineEntry> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let at = self.next?;
        self.next = at.checked_add(self.cadence).ok();
        Some(TimelineEntry {
            at,
            snapshot: earnings::compute(&self.state, at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    use crate::model::{PayRates, ShiftState};

    fn ts(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    fn test_store() -> (TempDir, StateStore) {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("punch")).unwrap();
        (dir, store)
    }

    fn start_shift(store: &StateStore, at: &str, hourly_rate: f64) {
        let mut state = ShiftState::default();
        let rates = PayRates {
            hourly_rate,
            ..PayRates::default()
        };
        state.start(ts(at), rates).unwrap();
        store.write(&state).unwrap();
    }

    #[test]
    fn no_active_shift_yields_one_terminal_entry_and_expires() {
        let (_dir, store) = test_store();
        let mut scheduler = TimelineScheduler::new(TimelinePolicy::default());
        assert_eq!(scheduler.phase(), TimelinePhase::Idle);

        let entries: Vec<_> = scheduler.activate(&store, ts("2026-08-04T09:00:00Z")).collect();

        assert_eq!(scheduler.phase(), TimelinePhase::Expired);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].snapshot.worked, SignedDuration::ZERO);
    }

    #[test]
    fn active_shift_lays_out_entries_at_the_cadence() {
        let (_dir, store) = test_store();
        start_shift(&store, "2026-08-04T09:00:00Z", 15.0);

        let policy = TimelinePolicy {
            cadence: SignedDuration::from_mins(5),
            entries: 4,
        };
        let mut scheduler = TimelineScheduler::new(policy);
        let entries: Vec<_> = scheduler.activate(&store, ts("2026-08-04T10:00:00Z")).collect();

        assert_eq!(scheduler.phase(), TimelinePhase::Scheduled);
        assert_eq!(entries.len(), 4);
        for (i, entry) in entries.iter().enumerate() {
            let expected = ts("2026-08-04T10:00:00Z") + SignedDuration::from_mins(5 * i as i64);
            assert_eq!(entry.at, expected);
        }
        // Entries advance exactly as a direct calculator call would.
        assert_eq!(entries[0].snapshot.worked, SignedDuration::from_hours(1));
        assert_eq!(entries[3].snapshot.worked, SignedDuration::from_mins(75));
    }

    #[test]
    fn entries_match_direct_calculator_calls() {
        let (_dir, store) = test_store();
        start_shift(&store, "2026-08-04T09:00:00Z", 17.5);

        let mut scheduler = TimelineScheduler::new(TimelinePolicy::default());
        let state = store.read();
        for entry in scheduler.activate(&store, ts("2026-08-04T11:00:00Z")) {
            assert_eq!(entry.snapshot, earnings::compute(&state, entry.at));
        }
    }

    #[test]
    fn sequence_uses_the_state_captured_at_activation() {
        let (_dir, store) = test_store();
        start_shift(&store, "2026-08-04T09:00:00Z", 15.0);

        let mut scheduler = TimelineScheduler::new(TimelinePolicy::default());
        let timeline = scheduler.activate(&store, ts("2026-08-04T10:00:00Z"));

        // The store moves on; the already-activated sequence must not.
        store.write(&ShiftState::default()).unwrap();

        let entries: Vec<_> = timeline.collect();
        assert_eq!(entries.len(), TimelinePolicy::default().entries);
        assert_eq!(entries[0].snapshot.worked, SignedDuration::from_hours(1));
    }

    #[test]
    fn reactivation_rereads_the_store() {
        let (_dir, store) = test_store();
        start_shift(&store, "2026-08-04T09:00:00Z", 15.0);

        let mut scheduler = TimelineScheduler::new(TimelinePolicy::default());
        let first: Vec<_> = scheduler.activate(&store, ts("2026-08-04T10:00:00Z")).collect();
        assert_eq!(first.len(), TimelinePolicy::default().entries);

        store.write(&ShiftState::default()).unwrap();

        let second: Vec<_> = scheduler.activate(&store, ts("2026-08-04T11:00:00Z")).collect();
        assert_eq!(scheduler.phase(), TimelinePhase::Expired);
        assert_eq!(second.len(), 1);
    }
}
