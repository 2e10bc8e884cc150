use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BranchError {
    #[error("Branch name {0} is not valid.")]
    InvalidName(String),

    #[error("subtask id out of range in branch {0}")]
    OutOfRange(String),
}

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("malformed feedback object: {0}")]
    MalformedEnvelope(String),

    #[error("malformed feedback payload: {0}")]
    MalformedPayload(String),
}
