use code_smash_core::{DiffFeedback, DiffSubmission, FeedbackError, SubtaskId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Failed to make request to {path} ({status}) with: {body}")]
    Api {
        path: String,
        status: u16,
        body: String,
    },

    #[error("connection failed: {0}")]
    Transport(String),

    #[error("json decode: {0}")]
    Decode(String),

    #[error(transparent)]
    Feedback(#[from] FeedbackError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Synchronous view of the review API, as driven by the CLI workflow.
///
/// `BlockingHttpService` is the production implementation; tests substitute
/// in-memory fakes.
pub trait FeedbackApi {
    /// Look up a subtask. Only success or failure matters to callers.
    fn fetch_subtask(&self, id: SubtaskId) -> Result<serde_json::Value, ServiceError>;

    /// Submit a diff for review and decode the returned feedback.
    fn submit_diff(&self, submission: &DiffSubmission) -> Result<DiffFeedback, ServiceError>;
}
