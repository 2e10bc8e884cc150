use code_smash_core::{DiffFeedback, DiffSubmission, SubtaskId};
use tokio::runtime::{Builder, Runtime};

use crate::{ApiConfig, FeedbackApi, HttpService, ServiceError};

/// Blocking wrapper around the async `HttpService`.
///
/// Owns a current-thread tokio runtime and uses `block_on()` for each call.
/// Must not be used from inside another tokio runtime.
pub struct BlockingHttpService {
    inner: HttpService,
    rt: Runtime,
}

impl BlockingHttpService {
    pub fn new(config: &ApiConfig) -> Result<Self, ServiceError> {
        let rt = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ServiceError::Transport(format!("failed to create tokio runtime: {e}")))?;
        Ok(Self {
            inner: HttpService::new(config),
            rt,
        })
    }
}

impl FeedbackApi for BlockingHttpService {
    fn fetch_subtask(&self, id: SubtaskId) -> Result<serde_json::Value, ServiceError> {
        self.rt.block_on(self.inner.fetch_subtask(id))
    }

    fn submit_diff(&self, submission: &DiffSubmission) -> Result<DiffFeedback, ServiceError> {
        self.rt.block_on(self.inner.submit_diff(submission))
    }
}
