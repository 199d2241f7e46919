//! Break intervals and the ledger that orders them.
//!
//! The ledger is the authority on break state: at most one interval is open
//! at any time, intervals never overlap, and they stay ordered by start.
//! Violations are rejected at this boundary and never silently applied —
//! a failed call leaves the ledger unchanged.

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

/// Errors for operations that would violate the ledger's invariants.
///
/// Only the primary process mutates the ledger, so only it ever sees these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("a break is already open")]
    AlreadyOnBreak,

    #[error("no open break")]
    NoOpenBreak,

    #[error("timestamp precedes the previous break boundary")]
    InvalidOrdering,
}

/// A single break within a shift. Open until `ended_at` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakInterval {
    #[serde(rename = "start")]
    pub started_at: Timestamp,

    #[serde(rename = "end", default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<Timestamp>,

    pub paid: bool,
}

impl BreakInterval {
    /// How long this break lasted, counting an open break up to `as_of`.
    ///
    /// Clamped to zero so an `as_of` before the break start (clock skew)
    /// never yields a negative duration.
    pub fn duration(&self, as_of: Timestamp) -> SignedDuration {
        let end = self.ended_at.unwrap_or(as_of);
        non_negative(end.duration_since(self.started_at))
    }

    fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}

/// Ordered, non-overlapping break intervals for the current shift.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BreakLedger {
    intervals: Vec<BreakInterval>,
}

impl BreakLedger {
    /// Rebuilds a ledger from untrusted intervals (a decoded shared record).
    ///
    /// Intervals are re-sorted by start; closed intervals that end before
    /// they start are dropped, and an open interval survives only in the
    /// last position.
    pub fn from_intervals(intervals: Vec<BreakInterval>) -> Self {
        let mut intervals: Vec<BreakInterval> = intervals
            .into_iter()
            .filter(|b| b.ended_at.is_none_or(|end| end >= b.started_at))
            .collect();
        intervals.sort_by_key(|b| b.started_at);

        let last = intervals.len().saturating_sub(1);
        let mut index = 0;
        intervals.retain(|b| {
            let keep = !b.is_open() || index == last;
            index += 1;
            keep
        });

        Self { intervals }
    }

    /// Opens a new break at `at`.
    pub fn start_break(&mut self, at: Timestamp, paid: bool) -> Result<(), LedgerError> {
        if self.open_break().is_some() {
            return Err(LedgerError::AlreadyOnBreak);
        }
        if let Some(previous) = self.intervals.last()
            && previous.ended_at.is_some_and(|end| at < end)
        {
            return Err(LedgerError::InvalidOrdering);
        }
        self.intervals.push(BreakInterval {
            started_at: at,
            ended_at: None,
            paid,
        });
        Ok(())
    }

    /// Closes the open break at `at`, returning the closed interval.
    pub fn end_break(&mut self, at: Timestamp) -> Result<BreakInterval, LedgerError> {
        // The open interval, if any, is always last.
        let Some(open) = self.intervals.last_mut().filter(|b| b.is_open()) else {
            return Err(LedgerError::NoOpenBreak);
        };
        if at < open.started_at {
            return Err(LedgerError::InvalidOrdering);
        }
        open.ended_at = Some(at);
        Ok(open.clone())
    }

    pub fn open_break(&self) -> Option<&BreakInterval> {
        self.intervals.last().filter(|b| b.is_open())
    }

    /// Total unpaid break time as of `as_of`: closed unpaid intervals in
    /// full, plus the open interval up to `as_of` if it is unpaid.
    pub fn unpaid_duration(&self, as_of: Timestamp) -> SignedDuration {
        self.intervals
            .iter()
            .filter(|b| !b.paid)
            .map(|b| b.duration(as_of))
            .fold(SignedDuration::ZERO, |total, d| total + d)
    }

    /// Total break time as of `as_of`, paid and unpaid together.
    ///
    /// Paid breaks never reduce worked time, but they do count toward the
    /// break time shown to the user.
    pub fn total_duration(&self, as_of: Timestamp) -> SignedDuration {
        self.intervals
            .iter()
            .map(|b| b.duration(as_of))
            .fold(SignedDuration::ZERO, |total, d| total + d)
    }

    /// Cumulative duration of *closed* unpaid intervals.
    pub fn closed_unpaid(&self) -> SignedDuration {
        self.intervals
            .iter()
            .filter(|b| !b.paid)
            .filter_map(|b| {
                b.ended_at
                    .map(|end| non_negative(end.duration_since(b.started_at)))
            })
            .fold(SignedDuration::ZERO, |total, d| total + d)
    }

    pub fn intervals(&self) -> &[BreakInterval] {
        &self.intervals
    }
}

fn non_negative(duration: SignedDuration) -> SignedDuration {
    if duration.is_negative() {
        SignedDuration::ZERO
    } else {
        duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    #[test]
    fn start_and_end_break() {
        let mut ledger = BreakLedger::default();
        ledger.start_break(ts("2026-08-04T12:00:00Z"), false).unwrap();
        assert!(ledger.open_break().is_some());

        let closed = ledger.end_break(ts("2026-08-04T12:15:00Z")).unwrap();
        assert_eq!(closed.ended_at, Some(ts("2026-08-04T12:15:00Z")));
        assert!(ledger.open_break().is_none());
    }

    #[test]
    fn second_start_fails_while_open() {
        let mut ledger = BreakLedger::default();
        ledger.start_break(ts("2026-08-04T12:00:00Z"), false).unwrap();

        let err = ledger
            .start_break(ts("2026-08-04T12:05:00Z"), false)
            .unwrap_err();
        assert_eq!(err, LedgerError::AlreadyOnBreak);
    }

    #[test]
    fn end_without_open_break_fails_and_leaves_ledger_unchanged() {
        let mut ledger = BreakLedger::default();
        ledger.start_break(ts("2026-08-04T12:00:00Z"), false).unwrap();
        ledger.end_break(ts("2026-08-04T12:15:00Z")).unwrap();

        let before = ledger.clone();
        let err = ledger.end_break(ts("2026-08-04T12:20:00Z")).unwrap_err();
        assert_eq!(err, LedgerError::NoOpenBreak);
        assert_eq!(ledger, before);
    }

    #[test]
    fn end_before_start_fails() {
        let mut ledger = BreakLedger::default();
        ledger.start_break(ts("2026-08-04T12:00:00Z"), false).unwrap();

        let err = ledger.end_break(ts("2026-08-04T11:59:00Z")).unwrap_err();
        assert_eq!(err, LedgerError::InvalidOrdering);
        assert!(ledger.open_break().is_some());
    }

    #[test]
    fn start_before_previous_end_fails() {
        let mut ledger = BreakLedger::default();
        ledger.start_break(ts("2026-08-04T12:00:00Z"), false).unwrap();
        ledger.end_break(ts("2026-08-04T12:30:00Z")).unwrap();

        let err = ledger
            .start_break(ts("2026-08-04T12:15:00Z"), false)
            .unwrap_err();
        assert_eq!(err, LedgerError::InvalidOrdering);
        assert_eq!(ledger.intervals().len(), 1);
    }

    #[test]
    fn unpaid_duration_sums_closed_and_open() {
        let mut ledger = BreakLedger::default();
        ledger.start_break(ts("2026-08-04T10:00:00Z"), false).unwrap();
        ledger.end_break(ts("2026-08-04T10:15:00Z")).unwrap();
        ledger.start_break(ts("2026-08-04T12:00:00Z"), false).unwrap();

        // 15m closed + 10m of the still-open break.
        let unpaid = ledger.unpaid_duration(ts("2026-08-04T12:10:00Z"));
        assert_eq!(unpaid, SignedDuration::from_mins(25));
    }

    #[test]
    fn paid_breaks_count_toward_total_but_not_unpaid() {
        let mut ledger = BreakLedger::default();
        ledger.start_break(ts("2026-08-04T10:00:00Z"), true).unwrap();
        ledger.end_break(ts("2026-08-04T10:15:00Z")).unwrap();

        let as_of = ts("2026-08-04T11:00:00Z");
        assert_eq!(ledger.unpaid_duration(as_of), SignedDuration::ZERO);
        assert_eq!(ledger.total_duration(as_of), SignedDuration::from_mins(15));
    }

    #[test]
    fn open_break_before_as_of_clamps_to_zero() {
        let mut ledger = BreakLedger::default();
        ledger.start_break(ts("2026-08-04T12:00:00Z"), false).unwrap();

        // Clock skew: asking for a time before the break opened.
        let unpaid = ledger.unpaid_duration(ts("2026-08-04T11:00:00Z"));
        assert_eq!(unpaid, SignedDuration::ZERO);
    }

    #[test]
    fn closed_unpaid_ignores_open_and_paid_intervals() {
        let mut ledger = BreakLedger::default();
        ledger.start_break(ts("2026-08-04T10:00:00Z"), false).unwrap();
        ledger.end_break(ts("2026-08-04T10:10:00Z")).unwrap();
        ledger.start_break(ts("2026-08-04T11:00:00Z"), true).unwrap();
        ledger.end_break(ts("2026-08-04T11:20:00Z")).unwrap();
        ledger.start_break(ts("2026-08-04T12:00:00Z"), false).unwrap();

        assert_eq!(ledger.closed_unpaid(), SignedDuration::from_mins(10));
    }

    #[test]
    fn serde_round_trip_preserves_open_and_closed_state() {
        let mut ledger = BreakLedger::default();
        ledger.start_break(ts("2026-08-04T10:00:00Z"), true).unwrap();
        ledger.end_break(ts("2026-08-04T10:15:00Z")).unwrap();
        ledger.start_break(ts("2026-08-04T12:00:00Z"), false).unwrap();

        let json = serde_json::to_string(&ledger).unwrap();
        let restored: BreakLedger = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, ledger);
        assert!(restored.open_break().is_some());
        assert_eq!(restored.intervals()[0].ended_at, Some(ts("2026-08-04T10:15:00Z")));
    }

    #[test]
    fn wire_names_match_shared_record_contract() {
        let interval = BreakInterval {
            started_at: ts("2026-08-04T10:00:00Z"),
            ended_at: None,
            paid: false,
        };
        let json = serde_json::to_value(&interval).unwrap();
        assert!(json.get("start").is_some());
        assert!(json.get("end").is_none());
        assert!(json.get("paid").is_some());
    }

    #[test]
    fn from_intervals_repairs_corrupt_data() {
        let intervals = vec![
            // Open interval not in last position: dropped.
            BreakInterval {
                started_at: ts("2026-08-04T10:00:00Z"),
                ended_at: None,
                paid: false,
            },
            // Closed interval ending before it starts: dropped.
            BreakInterval {
                started_at: ts("2026-08-04T11:00:00Z"),
                ended_at: Some(ts("2026-08-04T10:30:00Z")),
                paid: false,
            },
            BreakInterval {
                started_at: ts("2026-08-04T12:00:00Z"),
                ended_at: None,
                paid: false,
            },
        ];

        let ledger = BreakLedger::from_intervals(intervals);
        assert_eq!(ledger.intervals().len(), 1);
        assert!(ledger.open_break().is_some());
        assert_eq!(
            ledger.open_break().unwrap().started_at,
            ts("2026-08-04T12:00:00Z")
        );
    }
}
