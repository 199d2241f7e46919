//! A spool-file channel: the companion "device" is a paired directory.
//!
//! Deliveries append to `companion.jsonl` inside the paired directory as
//! one self-describing line each; a missing directory models an
//! unreachable companion. The companion's view is reconstructed by
//! replaying the spool in order.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

// Traits must be in scope for `.lines()` on `BufReader` and `.write_all()` on `File`.
use io::{BufRead, Write};

use super::{CompanionChannel, CompanionMessage, CompanionState, DeliveryError};

const SPOOL_FILE: &str = "companion.jsonl";

/// Channel that appends deliveries to the paired directory's spool file.
pub struct SpoolChannel {
    dir: PathBuf,
}

impl SpoolChannel {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates the paired directory, making the companion reachable.
    pub fn pair(&self) -> Result<(), DeliveryError> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }
}

impl CompanionChannel for SpoolChannel {
    fn deliver(&mut self, message: &CompanionMessage) -> Result<(), DeliveryError> {
        if !self.dir.exists() {
            return Err(DeliveryError::Unreachable(self.dir.display().to_string()));
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(SPOOL_FILE))?;
        let mut line = serde_json::to_string(message)?;
        line.push('\n');
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

impl CompanionState {
    /// Reconstructs the companion's view by replaying the spool in order.
    ///
    /// A missing spool is an empty view — nothing ever synced. Unreadable
    /// lines are skipped with a warning rather than failing the whole view;
    /// the companion is a reader and readers never raise on bad data.
    pub fn replay(dir: &Path) -> Result<Self, DeliveryError> {
        let path = dir.join(SPOOL_FILE);
        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };

        let mut state = Self::default();
        for line in io::BufReader::new(file).lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<CompanionMessage>(&line) {
                Ok(message) => state.apply(&message),
                Err(_) => tracing::warn!("skipping unreadable spool line"),
            }
        }
        Ok(state)
    }
}
