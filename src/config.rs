//! Punch configuration.
//!
//! Loaded from `<root>/config.toml`. A missing file means defaults — the
//! primary process sees an error only when the file exists and is invalid.
//!
//! ```text
//! hourly-rate = 18.0
//! tax-percentage = 12.0
//!
//! [overtime]
//! enabled = true
//! threshold-hours = 8.0
//! multiplier = 1.5
//!
//! [[jobs]]
//! name = "cafe"
//! title = "Barista"
//! hourly-rate = 17.5
//! color = "#ff8800"
//! ```

use std::fs;
use std::path::Path;

use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::model::{JobDescriptor, OvertimePolicy, PayRates};

/// Punch configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Hourly rate for shifts started without a job.
    pub hourly_rate: f64,

    /// Percentage withheld from gross pay, 0–100.
    pub tax_percentage: f64,

    pub overtime: OvertimeConfig,

    /// Tracked jobs, mirrored to the companion device.
    pub jobs: Vec<JobConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OvertimeConfig {
    pub enabled: bool,
    pub threshold_hours: f64,
    pub multiplier: f64,
}

impl Default for OvertimeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold_hours: 8.0,
            multiplier: 1.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JobConfig {
    pub name: String,
    pub title: Option<String>,

    /// Overrides the top-level hourly rate for shifts on this job.
    pub hourly_rate: Option<f64>,

    pub color: Option<String>,
}

const DEFAULT_COLOR: &str = "#808080";

impl Config {
    /// Load config from `<root>/config.toml`.
    pub fn load(root: &Path) -> Result<Self, String> {
        let path = root.join("config.toml");
        let contents = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };
        toml::from_str(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// Pay configuration for a shift, optionally on a named job.
    pub fn rates(&self, job: Option<&JobConfig>) -> PayRates {
        PayRates {
            hourly_rate: job
                .and_then(|j| j.hourly_rate)
                .unwrap_or(self.hourly_rate)
                .max(0.0),
            overtime: OvertimePolicy {
                enabled: self.overtime.enabled,
                threshold: hours_to_duration(self.overtime.threshold_hours),
                multiplier: self.overtime.multiplier.max(1.0),
            },
            tax_percentage: self.tax_percentage.clamp(0.0, 100.0),
        }
    }

    pub fn job(&self, name: &str) -> Option<&JobConfig> {
        self.jobs.iter().find(|j| j.name == name)
    }

    /// The job list as pushed to the companion device.
    pub fn job_descriptors(&self) -> Vec<JobDescriptor> {
        self.jobs
            .iter()
            .map(|j| JobDescriptor {
                id: JobDescriptor::stable_id(&j.name),
                name: j.name.clone(),
                title: j.title.clone(),
                hourly_rate: j.hourly_rate.unwrap_or(self.hourly_rate),
                color: j.color.clone().unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            })
            .collect()
    }
}

fn hours_to_duration(hours: f64) -> SignedDuration {
    SignedDuration::from_secs((hours.max(0.0) * 3600.0).round() as i64)
}
