pub mod branch;
pub mod error;
pub mod feedback;

pub use branch::SubtaskId;
pub use error::{BranchError, FeedbackError};
pub use feedback::{DiffFeedback, DiffSubmission, Feedback, FeedbackSections};
