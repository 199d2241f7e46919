//! The earnings calculator: pure functions from shift state and an instant
//! to a snapshot.
//!
//! Referentially transparent — identical inputs produce identical snapshots
//! in every process, which is what lets loosely-coupled viewers agree
//! without talking to each other. No rounding happens here, so repeated
//! calls stay exact and composable; rounding is presentation-only.

use jiff::{SignedDuration, Timestamp};
use serde::Serialize;

use crate::model::{PayRates, ShiftPhase, ShiftState, Snapshot};

/// Computes the snapshot for `state` as of one instant.
///
/// Negative elapsed time (clock skew, end-before-start data) clamps to
/// zero rather than producing negative pay — a clock anomaly is never an
/// error.
pub fn compute(state: &ShiftState, as_of: Timestamp) -> Snapshot {
    let ShiftPhase::Active { started_at, breaks } = &state.phase else {
        return Snapshot {
            wall_clock_time: as_of,
            worked: SignedDuration::ZERO,
            gross_pay: 0.0,
            taxed_pay: 0.0,
            on_break: false,
            total_break: SignedDuration::ZERO,
        };
    };

    let elapsed = as_of.duration_since(*started_at);
    let worked = non_negative(elapsed - breaks.unpaid_duration(as_of));
    let gross_pay = gross(worked, &state.rates);
    let taxed_pay = gross_pay - gross_pay * state.rates.tax_percentage / 100.0;

    Snapshot {
        wall_clock_time: as_of,
        worked,
        gross_pay,
        taxed_pay,
        on_break: breaks.open_break().is_some(),
        total_break: breaks.total_duration(as_of),
    }
}

/// Summary of a completed shift, handed to the caller when the shift ends.
///
/// Archival of historical records is the caller's concern, not this core's.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftRecord {
    pub started_at: Timestamp,
    pub ended_at: Timestamp,
    pub worked: SignedDuration,
    pub total_break: SignedDuration,
    pub gross_pay: f64,
    pub taxed_pay: f64,
}

/// Closes out the running shift as of `ended_at`.
///
/// Returns `None` when no shift is in progress. An open break is counted
/// up to `ended_at`, exactly as if it had been ended there.
pub fn close_out(state: &ShiftState, ended_at: Timestamp) -> Option<ShiftRecord> {
    let started_at = state.started_at()?;
    let snapshot = compute(state, ended_at);
    Some(ShiftRecord {
        started_at,
        ended_at,
        worked: snapshot.worked,
        total_break: snapshot.total_break,
        gross_pay: snapshot.gross_pay,
        taxed_pay: snapshot.taxed_pay,
    })
}

/// Gross pay for a worked duration: straight time up to the overtime
/// threshold, multiplied time past it.
fn gross(worked: SignedDuration, rates: &PayRates) -> f64 {
    let worked_hours = hours(worked);
    let overtime = &rates.overtime;
    if !overtime.enabled || worked <= overtime.threshold {
        return worked_hours * rates.hourly_rate;
    }
    let threshold_hours = hours(overtime.threshold);
    let overtime_hours = worked_hours - threshold_hours;
    threshold_hours * rates.hourly_rate + overtime_hours * rates.hourly_rate * overtime.multiplier
}

fn hours(duration: SignedDuration) -> f64 {
    duration.as_secs_f64() / 3600.0
}

fn non_negative(duration: SignedDuration) -> SignedDuration {
    if duration.is_negative() {
        SignedDuration::ZERO
    } else {
        duration
    }
}
