//! Output formatting for CLI display.
//!
//! Rounding happens here and only here — the calculator keeps amounts
//! exact so repeated computations stay composable.

use jiff::SignedDuration;

/// Formats a duration as `2h 05m`.
pub(super) fn duration(d: SignedDuration) -> String {
    let total_minutes = d.as_secs().max(0) / 60;
    format!("{}h {:02}m", total_minutes / 60, total_minutes % 60)
}

/// Formats a money amount as `$12.34`, rounded to cents.
pub(super) fn money(amount: f64) -> String {
    format!("${amount:.2}")
}
