//! The shared shift-state store: one atomic JSON record read by every
//! process.
//!
//! The record lives at `<root>/shift.json`. A write serializes the whole
//! record to a temp file in the same directory and renames it over the old
//! one, so a concurrent reader sees either the previous record or the new
//! one — never a torn mix. Exactly one process (the primary) writes; any
//! number of processes read at any time without blocking.
//!
//! Reads never fail. An absent or unreadable record decodes to defaults
//! (no shift, zero rates), and a partially-corrupt record degrades only
//! the unreadable fields.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use jiff::{SignedDuration, Timestamp};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::model::{
    BreakInterval, BreakLedger, OvertimePolicy, PayRates, ShiftPhase, ShiftState, ShiftStatus,
};

/// Errors that can occur while writing the shared record.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, StoreError>;

const STATE_FILE: &str = "shift.json";

/// The on-disk record: one flat key map shared by all processes.
///
/// `isOnBreak` mirrors the ledger's open interval and
/// `lastKnownBreakElapsed` caches closed unpaid break time — both are
/// conveniences for readers that don't want to walk the interval list, and
/// both are re-derived from `breakIntervals` when this process reads the
/// record back.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Record {
    #[serde(skip_serializing_if = "Option::is_none")]
    shift_start: Option<Timestamp>,
    hourly_rate: f64,
    overtime_enabled: bool,
    /// Seconds.
    overtime_threshold: i64,
    overtime_multiplier: f64,
    tax_percentage: f64,
    is_on_break: bool,
    break_intervals: Vec<BreakInterval>,
    /// Seconds.
    last_known_break_elapsed: i64,
}

/// Shared store for the authoritative shift state.
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Creates a store rooted at the given directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            path: root.join(STATE_FILE),
        })
    }

    /// Returns the default store root: `$PUNCH_HOME`, or `~/.punch`.
    pub fn default_root() -> Option<PathBuf> {
        if let Ok(home) = env::var("PUNCH_HOME")
            && !home.is_empty()
        {
            return Some(PathBuf::from(home));
        }
        dirs::home_dir().map(|h| h.join(".punch"))
    }

    /// The directory holding the record (and the companion spool).
    pub fn root(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }

    /// Reads the current shift state.
    ///
    /// Safe to call concurrently from any process at any time; never blocks
    /// on the writer and never surfaces an error — missing or unreadable
    /// data decodes to defaults, field by field.
    pub fn read(&self) -> ShiftState {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return ShiftState::default(),
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => decode(&map),
            _ => {
                tracing::warn!(path = %self.path.display(), "shift record unreadable, using defaults");
                ShiftState::default()
            }
        }
    }

    /// Replaces the record with `state`. Primary process only.
    ///
    /// The replace is atomic: readers observe the old record until the
    /// rename lands, then the new one.
    pub fn write(&self, state: &ShiftState) -> Result<()> {
        let record = Record {
            shift_start: state.started_at(),
            hourly_rate: state.rates.hourly_rate,
            overtime_enabled: state.rates.overtime.enabled,
            overtime_threshold: state.rates.overtime.threshold.as_secs(),
            overtime_multiplier: state.rates.overtime.multiplier,
            tax_percentage: state.rates.tax_percentage,
            is_on_break: state.status() == ShiftStatus::OnBreak,
            break_intervals: state
                .breaks()
                .map(|b| b.intervals().to_vec())
                .unwrap_or_default(),
            last_known_break_elapsed: state.last_known_break_elapsed.as_secs(),
        };

        let json = serde_json::to_string_pretty(&record)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Assembles a state from the decoded record, one field at a time.
fn decode(map: &Map<String, Value>) -> ShiftState {
    let rates = PayRates {
        hourly_rate: field::<f64>(map, "hourlyRate").unwrap_or(0.0).max(0.0),
        overtime: OvertimePolicy {
            enabled: field(map, "overtimeEnabled").unwrap_or(false),
            threshold: SignedDuration::from_secs(
                field::<i64>(map, "overtimeThreshold").unwrap_or(0).max(0),
            ),
            multiplier: field::<f64>(map, "overtimeMultiplier").unwrap_or(1.0).max(1.0),
        },
        tax_percentage: field::<f64>(map, "taxPercentage")
            .unwrap_or(0.0)
            .clamp(0.0, 100.0),
    };

    let Some(started_at) = field::<Option<Timestamp>>(map, "shiftStart").flatten() else {
        return ShiftState {
            rates,
            ..ShiftState::default()
        };
    };

    let breaks = BreakLedger::from_intervals(
        field::<Vec<BreakInterval>>(map, "breakIntervals").unwrap_or_default(),
    );
    // Re-derived rather than trusted: the cache can never disagree with
    // the intervals it summarizes.
    let last_known_break_elapsed = breaks.closed_unpaid();

    ShiftState {
        phase: ShiftPhase::Active { started_at, breaks },
        rates,
        last_known_break_elapsed,
    }
}

fn field<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Option<T> {
    let value = map.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(decoded) => Some(decoded),
        Err(_) => {
            tracing::warn!(key, "unreadable field in shift record, using default");
            None
        }
    }
}
