//! Tracked jobs: what the companion device mirrors.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tracked job as pushed to the companion device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescriptor {
    pub id: Uuid,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub hourly_rate: f64,
    pub color: String,
}

impl JobDescriptor {
    /// Deterministic id for a job name.
    ///
    /// Derived (UUIDv5) rather than random so every process — and the
    /// companion across deliveries — agrees on a job's identity without
    /// coordination.
    pub fn stable_id(name: &str) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
    }
}
