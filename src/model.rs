//! Core data model for punch.
//!
//! Shift state and its invariants live here. Everything a viewer displays
//! is derived from these types by the earnings calculator; nothing here
//! touches the clock, the filesystem, or the companion channel.

mod breaks;
mod job;
mod shift;
mod snapshot;

pub use breaks::{BreakInterval, BreakLedger, LedgerError};
pub use job::JobDescriptor;
pub use shift::{OvertimePolicy, PayRates, ShiftError, ShiftPhase, ShiftState, ShiftStatus};
pub use snapshot::Snapshot;
