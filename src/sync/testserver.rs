//! In-process mock of the remote sync endpoint, used by sync tests.
//!
//! Records every push body and pull query it receives and answers with
//! scriptable statuses and pull bodies, so tests can drive both the happy
//! path and mid-cycle failures.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use super::remote::CollectionSet;

pub struct ServerState {
    /// Push bodies in arrival order.
    pub pushes: Vec<CollectionSet>,
    /// `since` query values in arrival order (None when omitted).
    pub pulls: Vec<Option<String>>,
    pub push_status: u16,
    pub pull_status: u16,
    pub pull_body: Value,
    /// Delay before answering a push, to hold a cycle in flight.
    pub push_delay: Duration,
}

impl Default for ServerState {
    fn default() -> Self {
        Self {
            pushes: Vec::new(),
            pulls: Vec::new(),
            push_status: 200,
            pull_status: 200,
            pull_body: json!({ "timestamp": "2025-01-01T00:00:00Z" }),
            push_delay: Duration::ZERO,
        }
    }
}

type Shared = Arc<Mutex<ServerState>>;

pub struct TestServer {
    pub url: String,
    pub state: Shared,
    task: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(ServerState::default()));

        let app = Router::new()
            .route("/sync/push", post(handle_push))
            .route("/sync/pull", get(handle_pull))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            state,
            task,
        }
    }

    pub fn push_count(&self) -> usize {
        self.state.lock().unwrap().pushes.len()
    }

    pub fn pull_count(&self) -> usize {
        self.state.lock().unwrap().pulls.len()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn handle_push(State(state): State<Shared>, Json(body): Json<CollectionSet>) -> StatusCode {
    let (status, delay) = {
        let mut s = state.lock().unwrap();
        s.pushes.push(body);
        (s.push_status, s.push_delay)
    };
    if delay > Duration::ZERO {
        tokio::time::sleep(delay).await;
    }
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

async fn handle_pull(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let (status, body) = {
        let mut s = state.lock().unwrap();
        s.pulls.push(params.get("since").cloned());
        (s.pull_status, s.pull_body.clone())
    };
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(body),
    )
}
