//! Snapshot: a point-in-time derived view of a shift.

use jiff::{SignedDuration, Timestamp};
use serde::Serialize;

/// What a viewer surface displays: worked time and pay as of one instant.
///
/// Constructed on demand from the shared shift state and discarded — never
/// persisted as a source of truth, never mutated in place. Amounts are
/// exact; rounding happens at presentation time only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// The instant this snapshot was computed for.
    pub wall_clock_time: Timestamp,

    /// Elapsed time since the shift started, minus unpaid break time.
    pub worked: SignedDuration,

    pub gross_pay: f64,
    pub taxed_pay: f64,

    pub on_break: bool,

    /// Paid and unpaid breaks together. Paid breaks never reduce `worked`
    /// but still count toward break time shown to the user.
    pub total_break: SignedDuration,
}
