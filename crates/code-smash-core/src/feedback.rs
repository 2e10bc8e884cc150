use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::branch::SubtaskId;
use crate::error::FeedbackError;

/// Body of `POST /api/smash/diff`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSubmission {
    pub hash: String,
    pub diff: String,
    pub subtask: SubtaskId,
}

/// Raw response body of `POST /api/smash/diff`.
///
/// `feedback` is kept as an untyped value until [`DiffFeedback::from_response`]
/// decides whether a review is available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffFeedbackResponse {
    pub hash: String,
    pub subtask: SubtaskId,
    #[serde(default)]
    pub feedback: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct FeedbackEnvelope {
    issue_solved: bool,
    feedback: String,
}

/// The three review sections, decoded from the JSON string the server nests
/// inside the feedback object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FeedbackSections {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub implementation: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub code_quality: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub best_practices: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

impl FeedbackSections {
    pub fn parse(payload: &str) -> Result<Self, FeedbackError> {
        serde_json::from_str(payload).map_err(|e| FeedbackError::MalformedPayload(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    /// The server has not reviewed this diff yet.
    Pending,
    Available {
        issue_solved: bool,
        sections: FeedbackSections,
    },
}

impl Feedback {
    /// Decode the optional `feedback` field of a diff response.
    ///
    /// Absent, `null` or non-object values mean no review yet. An object must
    /// carry `issue_solved` and a `feedback` string holding a JSON object.
    pub fn from_wire(value: Option<serde_json::Value>) -> Result<Self, FeedbackError> {
        let value = match value {
            Some(v @ serde_json::Value::Object(_)) => v,
            _ => return Ok(Feedback::Pending),
        };
        let envelope: FeedbackEnvelope = serde_json::from_value(value)
            .map_err(|e| FeedbackError::MalformedEnvelope(e.to_string()))?;
        Ok(Feedback::Available {
            issue_solved: envelope.issue_solved,
            sections: FeedbackSections::parse(&envelope.feedback)?,
        })
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feedback::Pending => f.write_str("No feedback available."),
            Feedback::Available {
                issue_solved,
                sections,
            } => {
                let verdict = if *issue_solved {
                    "Yes. Code can be merged."
                } else {
                    "No."
                };
                write!(
                    f,
                    "Implementation:\n{}\n\n---\n\
                     Code Quality:\n{}\n\n---\n\
                     Best Practices:\n{}\n\n---\n\
                     Task is Fulfilled: {verdict}",
                    sections.implementation, sections.code_quality, sections.best_practices
                )
            }
        }
    }
}

/// Feedback result for one submitted diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffFeedback {
    pub hash: String,
    pub subtask: SubtaskId,
    pub feedback: Feedback,
}

impl DiffFeedback {
    pub fn from_response(resp: DiffFeedbackResponse) -> Result<Self, FeedbackError> {
        Ok(Self {
            hash: resp.hash,
            subtask: resp.subtask,
            feedback: Feedback::from_wire(resp.feedback)?,
        })
    }

    /// Human-readable report printed by the CLI.
    pub fn report(&self) -> String {
        self.feedback.to_string()
    }
}
