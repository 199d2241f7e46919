//! Companion sync: one-directional push of tracked jobs to the wearable.
//!
//! The channel is unreliable and intermittently reachable. Delivery failure
//! is explicit in the API and logged, but nothing is queued or retried here
//! — the primary publishes again on the next state-changing event, which is
//! retry enough. Deletion is its own message, not a diff of the job list,
//! so the companion can apply it idempotently even when a full list never
//! arrived.

mod spool;

pub use spool::SpoolChannel;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::JobDescriptor;

/// A message pushed to the companion, self-describing on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum CompanionMessage {
    /// The full list of tracked jobs; the companion replaces its view.
    Jobs { jobs: Vec<JobDescriptor> },

    /// Remove one job if present.
    Delete { id: Uuid },
}

/// Why a delivery failed.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("companion unreachable: {0}")]
    Unreachable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A best-effort delivery channel to the companion.
///
/// No queue, no acknowledgment: a failed delivery is simply dropped and the
/// companion keeps showing the last state that made it across.
pub trait CompanionChannel {
    fn deliver(&mut self, message: &CompanionMessage) -> Result<(), DeliveryError>;
}

/// Pushes the full job list, replacing whatever the companion holds.
///
/// Failure is logged and returned so the caller can decide whether to
/// re-publish on the next state change; it must never block or fail the
/// state mutation that triggered it.
pub fn publish_jobs(
    channel: &mut dyn CompanionChannel,
    jobs: &[JobDescriptor],
) -> Result<(), DeliveryError> {
    publish(channel, &CompanionMessage::Jobs { jobs: jobs.to_vec() })
}

/// Pushes a deletion for one job.
pub fn publish_delete(channel: &mut dyn CompanionChannel, id: Uuid) -> Result<(), DeliveryError> {
    publish(channel, &CompanionMessage::Delete { id })
}

fn publish(
    channel: &mut dyn CompanionChannel,
    message: &CompanionMessage,
) -> Result<(), DeliveryError> {
    match channel.deliver(message) {
        Ok(()) => Ok(()),
        Err(error) => {
            tracing::warn!(%error, "companion delivery failed, will re-sync on the next change");
            Err(error)
        }
    }
}

/// The companion's replicated view: the last job list that arrived, minus
/// any deletions applied since.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanionState {
    jobs: Vec<JobDescriptor>,
}

impl CompanionState {
    /// Applies one delivered message.
    ///
    /// `Jobs` replaces the whole view; `Delete` removes the job if present
    /// and is a no-op otherwise, so re-delivery is harmless. A deleted job
    /// only ever reappears via a later full `Jobs` push — never from this
    /// cache.
    pub fn apply(&mut self, message: &CompanionMessage) {
        match message {
            CompanionMessage::Jobs { jobs } => self.jobs = jobs.clone(),
            CompanionMessage::Delete { id } => self.jobs.retain(|job| job.id != *id),
        }
    }

    pub fn jobs(&self) -> &[JobDescriptor] {
        &self.jobs
    }
}
