use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::BranchError;

/// Branches bound to a subtask are named `feat/code-smash/<id>`.
pub const BRANCH_PREFIX: &str = "feat/code-smash/";

/// Identifier of a subtask on the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubtaskId(u64);

impl SubtaskId {
    pub fn new(id: u64) -> Option<Self> {
        (id > 0).then_some(Self(id))
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// Parse the subtask id out of a branch name.
    ///
    /// The whole name must match: the exact prefix followed by a non-empty
    /// run of ASCII digits. Zero is not a valid id.
    pub fn from_branch(branch: &str) -> Result<Self, BranchError> {
        let digits = branch
            .strip_prefix(BRANCH_PREFIX)
            .filter(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()))
            .ok_or_else(|| BranchError::InvalidName(branch.to_string()))?;

        let id: u64 = digits
            .parse()
            .map_err(|_| BranchError::OutOfRange(branch.to_string()))?;
        Self::new(id).ok_or_else(|| BranchError::InvalidName(branch.to_string()))
    }

    /// The branch name this subtask is expected to live on.
    pub fn branch_name(self) -> String {
        format!("{BRANCH_PREFIX}{}", self.0)
    }
}

impl fmt::Display for SubtaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
