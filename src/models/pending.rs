use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

use super::Collection;

/// Kind of local mutation recorded in the sync queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Create,
    Update,
    Delete,
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncAction::Create => write!(f, "create"),
            SyncAction::Update => write!(f, "update"),
            SyncAction::Delete => write!(f, "delete"),
        }
    }
}

impl FromStr for SyncAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(SyncAction::Create),
            "update" => Ok(SyncAction::Update),
            "delete" => Ok(SyncAction::Delete),
            _ => Err(format!(
                "Invalid sync action '{}'. Valid options: create, update, delete",
                s
            )),
        }
    }
}

/// A pending local mutation not yet confirmed as durable on the server.
///
/// Entries are appended alongside every local write and drained only after
/// a fully successful sync cycle. The id lives in its own namespace,
/// distinct from record UUIDs: a millisecond timestamp plus a random hex
/// suffix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingChange {
    pub id: String,
    pub action: SyncAction,
    pub collection: Collection,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

impl PendingChange {
    pub fn new(action: SyncAction, collection: Collection, payload: Value) -> Self {
        let now = Utc::now();
        let suffix: u32 = rand::rng().random_range(0..0x1_0000);
        Self {
            id: format!("{}-{:04x}", now.timestamp_millis(), suffix),
            action,
            collection,
            payload,
            created_at: now,
        }
    }

    /// Entry for a deletion; the payload carries just the record id.
    pub fn delete(collection: Collection, record_id: &str) -> Self {
        Self::new(SyncAction::Delete, collection, json!({ "id": record_id }))
    }
}
