//! HTTP client for the remote sync endpoint.
//!
//! Push sends the full local state of every collection in one request; pull
//! fetches server-side changes since the last persisted cursor. Records are
//! opaque JSON here: the client never looks inside them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::config::SyncConfig;
use crate::models::Collection;

/// Timeout applied to every sync request; a timed-out request is an
/// ordinary failure that aborts the current cycle.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One record array per tracked collection, as carried on the wire.
///
/// Missing keys deserialize to empty arrays, so a pull response may omit
/// collections that have no changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionSet {
    #[serde(default)]
    pub alcohol_logs: Vec<Value>,
    #[serde(default)]
    pub sleep_logs: Vec<Value>,
    #[serde(default)]
    pub nutrition_logs: Vec<Value>,
    #[serde(default)]
    pub spending_logs: Vec<Value>,
    #[serde(default)]
    pub exercise_logs: Vec<Value>,
}

impl CollectionSet {
    pub fn records(&self, collection: Collection) -> &[Value] {
        match collection {
            Collection::AlcoholLogs => &self.alcohol_logs,
            Collection::SleepLogs => &self.sleep_logs,
            Collection::NutritionLogs => &self.nutrition_logs,
            Collection::SpendingLogs => &self.spending_logs,
            Collection::ExerciseLogs => &self.exercise_logs,
        }
    }

    pub fn records_mut(&mut self, collection: Collection) -> &mut Vec<Value> {
        match collection {
            Collection::AlcoholLogs => &mut self.alcohol_logs,
            Collection::SleepLogs => &mut self.sleep_logs,
            Collection::NutritionLogs => &mut self.nutrition_logs,
            Collection::SpendingLogs => &mut self.spending_logs,
            Collection::ExerciseLogs => &mut self.exercise_logs,
        }
    }

    /// Total record count across all five collections.
    pub fn total(&self) -> usize {
        Collection::ALL
            .iter()
            .map(|c| self.records(*c).len())
            .sum()
    }
}

/// Body of a successful pull: changed records plus the new sync cursor.
#[derive(Debug, Clone, Deserialize)]
pub struct PullResponse {
    #[serde(flatten)]
    pub collections: CollectionSet,
    /// Server timestamp marking this pull's completion; persisted as the
    /// next cycle's `since` boundary.
    pub timestamp: String,
}

/// Errors from talking to the remote sync endpoint.
#[derive(Debug)]
pub enum RemoteError {
    /// Sync is not configured
    NotConfigured,
    /// Request could not be sent or the connection failed mid-flight
    Request(reqwest::Error),
    /// Server answered with a non-2xx status
    Status(reqwest::StatusCode),
    /// Response body did not parse
    Decode(String),
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteError::NotConfigured => {
                write!(f, "Sync not configured. Add sync.server_url to config.")
            }
            RemoteError::Request(e) => write!(f, "Sync request failed: {}", e),
            RemoteError::Status(status) => write!(f, "Sync server returned status {}", status),
            RemoteError::Decode(e) => write!(f, "Sync response did not parse: {}", e),
        }
    }
}

impl std::error::Error for RemoteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RemoteError::Request(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        RemoteError::Request(e)
    }
}

/// Client for the remote sync endpoint.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    server_url: String,
    api_key: Option<String>,
}

impl RemoteClient {
    pub fn new(server_url: impl Into<String>, api_key: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            server_url: server_url.into(),
            api_key,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Result<Self, RemoteError> {
        let server_url = config
            .server_url
            .as_ref()
            .ok_or(RemoteError::NotConfigured)?;
        Ok(Self::new(server_url.clone(), config.api_key.clone()))
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Push the full snapshot of all collections. Any 2xx answer counts as
    /// success; the body is ignored.
    pub async fn push(&self, snapshot: &CollectionSet) -> Result<(), RemoteError> {
        let url = self.endpoint("/sync/push");
        let response = self.authorized(self.http.post(&url)).json(snapshot).send().await?;

        if !response.status().is_success() {
            return Err(RemoteError::Status(response.status()));
        }
        Ok(())
    }

    /// Pull changes since the given cursor; `None` requests the full
    /// server-side dataset (first-ever sync).
    pub async fn pull(&self, since: Option<&str>) -> Result<PullResponse, RemoteError> {
        let url = self.endpoint("/sync/pull");
        let mut request = self.authorized(self.http.get(&url));
        if let Some(cursor) = since {
            request = request.query(&[("since", cursor)]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(RemoteError::Status(response.status()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| RemoteError::Decode(e.to_string()))
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("Authorization", format!("Bearer {}", key)),
            None => request,
        }
    }

    /// Builds an HTTP URL for a given path.
    fn endpoint(&self, path: &str) -> String {
        let base_url = if !self.server_url.starts_with("http://")
            && !self.server_url.starts_with("https://")
        {
            format!("http://{}", self.server_url)
        } else {
            self.server_url.clone()
        };

        format!("{}{}", base_url.trim_end_matches('/'), path)
    }
}
