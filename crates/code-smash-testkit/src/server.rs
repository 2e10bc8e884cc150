//! In-process stand-in for the review API.
//!
//! Serves the two endpoints the CLI talks to, checks the `Token` header and
//! records every diff it receives so tests can assert on the wire payload.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use code_smash_core::feedback::DiffFeedbackResponse;
use code_smash_core::DiffSubmission;
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct StubApi {
    token: String,
    subtasks: HashSet<u64>,
    feedback: Value,
    diff_failure: Option<(StatusCode, String)>,
    received: Arc<Mutex<Vec<DiffSubmission>>>,
}

impl StubApi {
    /// A stub that accepts `token` and knows no subtasks yet.
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            subtasks: HashSet::new(),
            feedback: Value::Null,
            diff_failure: None,
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_subtask(mut self, id: u64) -> Self {
        self.subtasks.insert(id);
        self
    }

    /// Value returned in the `feedback` field of diff responses. Defaults to `null`.
    pub fn with_feedback(mut self, feedback: Value) -> Self {
        self.feedback = feedback;
        self
    }

    /// Convenience for a reviewed diff with the three standard sections.
    pub fn with_review(
        self,
        issue_solved: bool,
        implementation: &str,
        code_quality: &str,
        best_practices: &str,
    ) -> Self {
        let payload = json!({
            "implementation": implementation,
            "code_quality": code_quality,
            "best_practices": best_practices,
        });
        self.with_feedback(json!({
            "issue_solved": issue_solved,
            "feedback": payload.to_string(),
        }))
    }

    /// Make `POST /api/smash/diff` answer with `status` and a plain-text body.
    pub fn with_diff_failure(mut self, status: StatusCode, body: &str) -> Self {
        self.diff_failure = Some((status, body.to_string()));
        self
    }

    pub fn router(self) -> Router {
        Router::new()
            .route("/api/smash/groups/user/substask/{id}", get(get_subtask))
            .route("/api/smash/diff", post(post_diff))
            .with_state(self)
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let expected = format!("Token {}", self.token);
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == expected)
    }

    /// Spawn on a random port inside the current tokio runtime.
    pub async fn spawn(self) -> TestServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let received = self.received.clone();
        let app = self.router();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        TestServer {
            base_url: format!("http://{addr}"),
            received,
            _handle: Some(handle),
        }
    }

    /// Spawn on a dedicated thread with its own runtime, for blocking clients
    /// that would otherwise nest runtimes. The server lives until the process exits.
    pub fn spawn_on_thread(self) -> TestServer {
        let received = self.received.clone();
        let (tx, rx) = std::sync::mpsc::sync_channel(1);
        std::thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let server = self.spawn().await;
                tx.send(server.base_url.clone()).unwrap();
                std::future::pending::<()>().await;
            });
        });
        TestServer {
            base_url: rx.recv().unwrap(),
            received,
            _handle: None,
        }
    }
}

/// A running stub server.
pub struct TestServer {
    pub base_url: String,
    received: Arc<Mutex<Vec<DiffSubmission>>>,
    _handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    /// Diffs accepted so far, in arrival order.
    pub fn received(&self) -> Vec<DiffSubmission> {
        self.received.lock().unwrap().clone()
    }
}

fn detail(status: StatusCode, msg: &str) -> Response {
    (status, Json(json!({ "detail": msg }))).into_response()
}

async fn get_subtask(
    State(stub): State<StubApi>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response {
    if !stub.authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Invalid token.");
    }
    if !stub.subtasks.contains(&id) {
        return detail(StatusCode::NOT_FOUND, "No Subtask matches the given query.");
    }
    Json(json!({ "id": id, "title": format!("Subtask {id}") })).into_response()
}

async fn post_diff(
    State(stub): State<StubApi>,
    headers: HeaderMap,
    Json(body): Json<DiffSubmission>,
) -> Response {
    if !stub.authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Invalid token.");
    }
    if let Some((status, text)) = &stub.diff_failure {
        return (*status, text.clone()).into_response();
    }
    if !stub.subtasks.contains(&body.subtask.get()) {
        return detail(StatusCode::NOT_FOUND, "No Subtask matches the given query.");
    }

    let resp = DiffFeedbackResponse {
        hash: body.hash.clone(),
        subtask: body.subtask,
        feedback: Some(stub.feedback.clone()),
    };
    stub.received.lock().unwrap().push(body);
    Json(resp).into_response()
}
