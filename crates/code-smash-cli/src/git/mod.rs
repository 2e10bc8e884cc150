pub mod cli;
pub mod mock;

use thiserror::Error;

pub use cli::GitCli;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to run `{command}`: {reason}")]
    Spawn { command: String, reason: String },

    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },
}

/// The git queries the workflow needs, scoped to one working copy.
pub trait VersionControl {
    /// Raw `git branch` lines. The checked-out branch carries a `*` marker.
    fn list_branches(&self) -> Result<Vec<String>, GitError>;

    fn current_branch(&self) -> Result<String, GitError>;

    /// Full hash of `HEAD`.
    fn current_commit_hash(&self) -> Result<String, GitError>;

    /// Unified diff between two refs. Empty when they do not differ.
    fn diff(&self, ref_a: &str, ref_b: &str) -> Result<String, GitError>;
}

/// Whether `name` appears in a `git branch` listing, ignoring the
/// current-branch marker and surrounding whitespace.
pub fn branch_listed<S: AsRef<str>>(lines: &[S], name: &str) -> bool {
    lines
        .iter()
        .map(|line| line.as_ref().trim().trim_start_matches('*').trim())
        .filter(|b| !b.is_empty())
        .any(|b| b == name)
}
