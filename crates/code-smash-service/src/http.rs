use code_smash_core::feedback::DiffFeedbackResponse;
use code_smash_core::{DiffFeedback, DiffSubmission, SubtaskId};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use tracing::debug;

use crate::{ApiConfig, ServiceError};

const DIFF_PATH: &str = "/api/smash/diff";

/// Async HTTP client for the review API.
/// Every request carries `Authorization: Token <token>`.
pub struct HttpService {
    base_url: String,
    token: String,
    client: Client,
}

impl HttpService {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url().to_string(),
            token: config.token().to_string(),
            client: Client::new(),
        }
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(AUTHORIZATION, format!("Token {}", self.token))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        debug!("GET {path}");
        let builder = self.client.get(format!("{}{path}", self.base_url));
        let resp = self
            .with_auth(builder)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        handle_response(path, resp).await
    }

    async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        debug!("POST {path}");
        let builder = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body);
        let resp = self
            .with_auth(builder)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        handle_response(path, resp).await
    }

    /// Fetch a subtask visible to the token's user.
    /// Callers use this as an existence and permission check.
    pub async fn fetch_subtask(&self, id: SubtaskId) -> Result<serde_json::Value, ServiceError> {
        self.get_json(&format!("/api/smash/groups/user/substask/{id}"))
            .await
    }

    /// Submit a diff and decode whatever feedback the server has for it.
    pub async fn submit_diff(
        &self,
        submission: &DiffSubmission,
    ) -> Result<DiffFeedback, ServiceError> {
        let resp: DiffFeedbackResponse = self.post_json(DIFF_PATH, submission).await?;
        Ok(DiffFeedback::from_response(resp)?)
    }
}

async fn handle_response<T: serde::de::DeserializeOwned>(
    path: &str,
    resp: reqwest::Response,
) -> Result<T, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        resp.json::<T>()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))
    } else {
        let body = resp.text().await.unwrap_or_default();
        Err(ServiceError::Api {
            path: path.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}
