//! Shift state: the authoritative record of a work session.
//!
//! The phase is a sum type so invalid combinations are unrepresentable:
//! a shift cannot have breaks without a start time, and "on break" is
//! derived from the ledger's open interval rather than tracked as a
//! separate flag that could disagree with it.

use jiff::{SignedDuration, Timestamp};

use super::breaks::{BreakInterval, BreakLedger, LedgerError};

/// Errors for shift transitions. Surfaced only to the primary process —
/// the single writer — since nothing else mutates state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShiftError {
    #[error("a shift is already in progress")]
    AlreadyStarted,

    #[error("no shift in progress")]
    NotStarted,

    #[error(transparent)]
    Break(#[from] LedgerError),
}

/// Overtime configuration: an absolute worked-duration cutoff per shift.
#[derive(Debug, Clone, PartialEq)]
pub struct OvertimePolicy {
    pub enabled: bool,
    pub threshold: SignedDuration,
    /// Rate multiplier for hours past the threshold, at least 1.0.
    pub multiplier: f64,
}

impl Default for OvertimePolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: SignedDuration::ZERO,
            multiplier: 1.0,
        }
    }
}

/// Pay configuration for a shift.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayRates {
    pub hourly_rate: f64,
    pub overtime: OvertimePolicy,
    /// Percentage withheld from gross pay, 0–100.
    pub tax_percentage: f64,
}

/// Where the shift stands. `Active` owns the break ledger.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ShiftPhase {
    #[default]
    NotStarted,

    Active {
        started_at: Timestamp,
        breaks: BreakLedger,
    },
}

/// Coarse status for display and for the shared record's `isOnBreak` mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftStatus {
    NotStarted,
    InProgress,
    OnBreak,
}

/// The authoritative shift state.
///
/// Mutated only by the primary process; viewer processes read it from the
/// shared store and derive snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftState {
    pub phase: ShiftPhase,
    pub rates: PayRates,

    /// Cached cumulative closed unpaid-break duration. Maintained as breaks
    /// close; always re-derivable via [`BreakLedger::closed_unpaid`].
    pub last_known_break_elapsed: SignedDuration,
}

impl Default for ShiftState {
    fn default() -> Self {
        Self {
            phase: ShiftPhase::NotStarted,
            rates: PayRates::default(),
            last_known_break_elapsed: SignedDuration::ZERO,
        }
    }
}

impl ShiftState {
    pub fn status(&self) -> ShiftStatus {
        match &self.phase {
            ShiftPhase::NotStarted => ShiftStatus::NotStarted,
            ShiftPhase::Active { breaks, .. } => {
                if breaks.open_break().is_some() {
                    ShiftStatus::OnBreak
                } else {
                    ShiftStatus::InProgress
                }
            }
        }
    }

    pub fn started_at(&self) -> Option<Timestamp> {
        match &self.phase {
            ShiftPhase::NotStarted => None,
            ShiftPhase::Active { started_at, .. } => Some(*started_at),
        }
    }

    pub fn breaks(&self) -> Option<&BreakLedger> {
        match &self.phase {
            ShiftPhase::NotStarted => None,
            ShiftPhase::Active { breaks, .. } => Some(breaks),
        }
    }

    /// Starts a shift at `at` with the given pay configuration.
    pub fn start(&mut self, at: Timestamp, rates: PayRates) -> Result<(), ShiftError> {
        if !matches!(self.phase, ShiftPhase::NotStarted) {
            return Err(ShiftError::AlreadyStarted);
        }
        self.phase = ShiftPhase::Active {
            started_at: at,
            breaks: BreakLedger::default(),
        };
        self.rates = rates;
        self.last_known_break_elapsed = SignedDuration::ZERO;
        Ok(())
    }

    /// Opens a break in the running shift.
    pub fn start_break(&mut self, at: Timestamp, paid: bool) -> Result<(), ShiftError> {
        let ShiftPhase::Active { breaks, .. } = &mut self.phase else {
            return Err(ShiftError::NotStarted);
        };
        breaks.start_break(at, paid)?;
        Ok(())
    }

    /// Closes the open break, returning the closed interval.
    pub fn end_break(&mut self, at: Timestamp) -> Result<BreakInterval, ShiftError> {
        let ShiftPhase::Active { breaks, .. } = &mut self.phase else {
            return Err(ShiftError::NotStarted);
        };
        let closed = breaks.end_break(at)?;
        if !closed.paid {
            self.last_known_break_elapsed = self.last_known_break_elapsed + closed.duration(at);
        }
        Ok(closed)
    }

    /// Ends the shift, clearing the phase back to `NotStarted`.
    ///
    /// Final figures are derived *before* calling this — an open break is
    /// simply counted up to the end instant by the calculator.
    pub fn end(&mut self) -> Result<(), ShiftError> {
        if matches!(self.phase, ShiftPhase::NotStarted) {
            return Err(ShiftError::NotStarted);
        }
        self.phase = ShiftPhase::NotStarted;
        self.last_known_break_elapsed = SignedDuration::ZERO;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    #[test]
    fn start_twice_fails() {
        let mut state = ShiftState::default();
        state.start(ts("2026-08-04T09:00:00Z"), PayRates::default()).unwrap();

        let err = state
            .start(ts("2026-08-04T10:00:00Z"), PayRates::default())
            .unwrap_err();
        assert_eq!(err, ShiftError::AlreadyStarted);
    }

    #[test]
    fn status_is_derived_from_phase_and_ledger() {
        let mut state = ShiftState::default();
        assert_eq!(state.status(), ShiftStatus::NotStarted);

        state.start(ts("2026-08-04T09:00:00Z"), PayRates::default()).unwrap();
        assert_eq!(state.status(), ShiftStatus::InProgress);

        state.start_break(ts("2026-08-04T12:00:00Z"), false).unwrap();
        assert_eq!(state.status(), ShiftStatus::OnBreak);

        state.end_break(ts("2026-08-04T12:15:00Z")).unwrap();
        assert_eq!(state.status(), ShiftStatus::InProgress);
    }

    #[test]
    fn break_operations_require_a_shift() {
        let mut state = ShiftState::default();

        let err = state.start_break(ts("2026-08-04T12:00:00Z"), false).unwrap_err();
        assert_eq!(err, ShiftError::NotStarted);

        let err = state.end_break(ts("2026-08-04T12:15:00Z")).unwrap_err();
        assert_eq!(err, ShiftError::NotStarted);
    }

    #[test]
    fn ledger_errors_pass_through() {
        let mut state = ShiftState::default();
        state.start(ts("2026-08-04T09:00:00Z"), PayRates::default()).unwrap();

        let err = state.end_break(ts("2026-08-04T12:00:00Z")).unwrap_err();
        assert_eq!(err, ShiftError::Break(LedgerError::NoOpenBreak));
    }

    #[test]
    fn cached_break_elapsed_tracks_closed_unpaid_breaks() {
        let mut state = ShiftState::default();
        state.start(ts("2026-08-04T09:00:00Z"), PayRates::default()).unwrap();

        state.start_break(ts("2026-08-04T10:00:00Z"), false).unwrap();
        state.end_break(ts("2026-08-04T10:15:00Z")).unwrap();
        state.start_break(ts("2026-08-04T12:00:00Z"), true).unwrap();
        state.end_break(ts("2026-08-04T12:30:00Z")).unwrap();

        assert_eq!(state.last_known_break_elapsed, SignedDuration::from_mins(15));
        // Always re-derivable from the ledger.
        assert_eq!(
            state.last_known_break_elapsed,
            state.breaks().unwrap().closed_unpaid()
        );
    }

    #[test]
    fn end_clears_back_to_not_started() {
        let mut state = ShiftState::default();
        state.start(ts("2026-08-04T09:00:00Z"), PayRates::default()).unwrap();
        state.end().unwrap();

        assert_eq!(state.status(), ShiftStatus::NotStarted);
        assert_eq!(state.end().unwrap_err(), ShiftError::NotStarted);
    }
}
