use std::cell::RefCell;

use super::{GitError, VersionControl};

/// A scripted `VersionControl` for tests. Records every call it receives.
pub struct MockGit {
    branches: Vec<String>,
    current_branch: String,
    hash: String,
    diff: String,
    fail_diff: bool,
    calls: RefCell<Vec<String>>,
}

impl Default for MockGit {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGit {
    /// A repo with `main` checked out at a fixed hash and no changes.
    pub fn new() -> Self {
        Self {
            branches: vec!["* main".into()],
            current_branch: "main".into(),
            hash: "0123456789abcdef0123456789abcdef01234567".into(),
            diff: String::new(),
            fail_diff: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_branches(mut self, lines: &[&str]) -> Self {
        self.branches = lines.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn with_current_branch(mut self, name: &str) -> Self {
        self.current_branch = name.into();
        self
    }

    pub fn with_hash(mut self, hash: &str) -> Self {
        self.hash = hash.into();
        self
    }

    pub fn with_diff(mut self, diff: &str) -> Self {
        self.diff = diff.into();
        self
    }

    pub fn with_diff_fail(mut self) -> Self {
        self.fail_diff = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl VersionControl for MockGit {
    fn list_branches(&self) -> Result<Vec<String>, GitError> {
        self.record("branch".into());
        Ok(self.branches.clone())
    }

    fn current_branch(&self) -> Result<String, GitError> {
        self.record("branch --show-current".into());
        Ok(self.current_branch.clone())
    }

    fn current_commit_hash(&self) -> Result<String, GitError> {
        self.record("rev-parse HEAD".into());
        Ok(self.hash.clone())
    }

    fn diff(&self, ref_a: &str, ref_b: &str) -> Result<String, GitError> {
        self.record(format!("diff {ref_a} {ref_b}"));
        if self.fail_diff {
            return Err(GitError::CommandFailed {
                command: format!("git diff {ref_a} {ref_b}"),
                status: "exit status: 128".into(),
                stderr: "mock diff failure".into(),
            });
        }
        Ok(self.diff.clone())
    }
}
