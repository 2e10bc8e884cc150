use std::path::{Path, PathBuf};

use code_smash_core::{BranchError, DiffSubmission, SubtaskId};
use code_smash_service::{FeedbackApi, ServiceError};
use thiserror::Error;
use tracing::{error, info};

use crate::git::{branch_listed, GitError, VersionControl};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Given Path {0} does not exist.")]
    PathMissing(String),

    #[error("Given Path {0} is not a directory.")]
    NotADirectory(String),

    #[error("Given Path {0} is not a git repository.")]
    NotARepository(String),

    #[error("Main branch {0} does not exist.")]
    MainBranchMissing(String),

    #[error(transparent)]
    InvalidBranch(#[from] BranchError),

    #[error("Instance has not been validated which is required for this operation.")]
    NotValidated,

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Api(#[from] ServiceError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Unvalidated,
    Validated,
    Succeeded,
    Failed,
}

/// Checks a working copy, submits its diff for the branch's subtask and
/// renders the returned feedback.
///
/// `validate` must succeed before `execute` does anything. Both log their
/// failures and degrade to "no result" instead of returning errors; the
/// `try_` variants expose the typed error.
pub struct Workflow<G, A> {
    path: PathBuf,
    main_branch: String,
    git: G,
    api: A,
    state: WorkflowState,
}

impl<G: VersionControl, A: FeedbackApi> Workflow<G, A> {
    pub fn new(path: impl Into<PathBuf>, main_branch: impl Into<String>, git: G, api: A) -> Self {
        Self {
            path: path.into(),
            main_branch: main_branch.into(),
            git,
            api,
            state: WorkflowState::Unvalidated,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn git(&self) -> &G {
        &self.git
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn try_validate(&mut self) -> Result<(), WorkflowError> {
        check_project_path(&self.path)?;

        let branches = self.git.list_branches()?;
        if !branch_listed(&branches, &self.main_branch) {
            return Err(WorkflowError::MainBranchMissing(self.main_branch.clone()));
        }

        self.state = WorkflowState::Validated;
        Ok(())
    }

    /// Returns whether validation passed. The failure reason is logged.
    pub fn validate(&mut self) -> bool {
        match self.try_validate() {
            Ok(()) => true,
            Err(e) => {
                error!("{e}");
                false
            }
        }
    }

    pub fn try_execute(&mut self) -> Result<String, WorkflowError> {
        if self.state == WorkflowState::Unvalidated {
            return Err(WorkflowError::NotValidated);
        }

        let result = self.submit_current_branch();
        self.state = match result {
            Ok(_) => WorkflowState::Succeeded,
            Err(_) => WorkflowState::Failed,
        };
        result
    }

    /// Run the review round-trip. `None` means the run aborted; the cause is logged.
    pub fn execute(&mut self) -> Option<String> {
        match self.try_execute() {
            Ok(report) => Some(report),
            Err(e) => {
                error!("{e}");
                None
            }
        }
    }

    fn submit_current_branch(&self) -> Result<String, WorkflowError> {
        let branch = self.git.current_branch()?;
        let subtask = SubtaskId::from_branch(&branch)?;

        // existence/permission check only
        self.api.fetch_subtask(subtask)?;
        info!("subtask {subtask} confirmed for branch {branch}");

        let hash = self.git.current_commit_hash()?;
        let diff = self.git.diff(&self.main_branch, &hash)?;
        info!("submitting {} bytes of diff at {hash}", diff.len());

        let feedback = self.api.submit_diff(&DiffSubmission {
            hash,
            diff,
            subtask,
        })?;
        Ok(feedback.report())
    }
}

fn check_project_path(path: &Path) -> Result<(), WorkflowError> {
    let shown = path.display().to_string();
    if !path.exists() {
        return Err(WorkflowError::PathMissing(shown));
    }
    if !path.is_dir() {
        return Err(WorkflowError::NotADirectory(shown));
    }
    if !path.join(".git").exists() {
        return Err(WorkflowError::NotARepository(shown));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use code_smash_core::{DiffFeedback, Feedback, FeedbackSections};
    use tempfile::TempDir;

    use super::*;
    use crate::git::mock::MockGit;

    const HASH: &str = "0123456789abcdef0123456789abcdef01234567";

    /// Scripted API: knows a set of subtasks and answers every diff with
    /// the same feedback, or with a configured HTTP failure.
    struct MockApi {
        known: Vec<u64>,
        feedback: Feedback,
        submit_fail: Option<(u16, String)>,
        fetched: RefCell<Vec<SubtaskId>>,
        submitted: RefCell<Vec<DiffSubmission>>,
    }

    impl MockApi {
        fn new() -> Self {
            Self {
                known: Vec::new(),
                feedback: Feedback::Pending,
                submit_fail: None,
                fetched: RefCell::new(Vec::new()),
                submitted: RefCell::new(Vec::new()),
            }
        }

        fn with_subtask(mut self, id: u64) -> Self {
            self.known.push(id);
            self
        }

        fn with_review(mut self, issue_solved: bool) -> Self {
            self.feedback = Feedback::Available {
                issue_solved,
                sections: FeedbackSections {
                    implementation: "I1".into(),
                    code_quality: "Q1".into(),
                    best_practices: "B1".into(),
                },
            };
            self
        }

        fn with_submit_fail(mut self, status: u16, body: &str) -> Self {
            self.submit_fail = Some((status, body.into()));
            self
        }
    }

    impl FeedbackApi for MockApi {
        fn fetch_subtask(&self, id: SubtaskId) -> Result<serde_json::Value, ServiceError> {
            self.fetched.borrow_mut().push(id);
            if self.known.contains(&id.get()) {
                Ok(serde_json::json!({ "id": id.get() }))
            } else {
                Err(ServiceError::Api {
                    path: format!("/api/smash/groups/user/substask/{id}"),
                    status: 404,
                    body: r#"{"detail":"Not found."}"#.into(),
                })
            }
        }

        fn submit_diff(&self, submission: &DiffSubmission) -> Result<DiffFeedback, ServiceError> {
            self.submitted.borrow_mut().push(submission.clone());
            if let Some((status, body)) = &self.submit_fail {
                return Err(ServiceError::Api {
                    path: "/api/smash/diff".into(),
                    status: *status,
                    body: body.clone(),
                });
            }
            Ok(DiffFeedback {
                hash: submission.hash.clone(),
                subtask: submission.subtask,
                feedback: self.feedback.clone(),
            })
        }
    }

    /// A temp dir that passes the path checks (it has a `.git` subdirectory).
    fn fake_repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        dir
    }

    fn subtask_git(branch: &str) -> MockGit {
        let current = format!("* {branch}");
        MockGit::new()
            .with_branches(&["  main", current.as_str()])
            .with_current_branch(branch)
            .with_hash(HASH)
            .with_diff("+added line")
    }

    #[test]
    fn missing_path_stays_unvalidated() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let mut wf = Workflow::new(&missing, "main", MockGit::new(), MockApi::new());

        let err = wf.try_validate().unwrap_err();
        assert!(matches!(err, WorkflowError::PathMissing(_)), "got {err:?}");
        assert_eq!(wf.state(), WorkflowState::Unvalidated);
        assert_eq!(wf.execute(), None);
        assert!(wf.git().calls().is_empty());
        assert!(wf.api().fetched.borrow().is_empty());
    }

    #[test]
    fn file_path_is_not_a_directory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();
        let mut wf = Workflow::new(&file, "main", MockGit::new(), MockApi::new());

        let err = wf.try_validate().unwrap_err();
        assert!(matches!(err, WorkflowError::NotADirectory(_)), "got {err:?}");
        assert!(!wf.validate());
        assert_eq!(wf.execute(), None);
    }

    #[test]
    fn directory_without_git_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut wf = Workflow::new(dir.path(), "main", MockGit::new(), MockApi::new());

        let err = wf.try_validate().unwrap_err();
        assert!(matches!(err, WorkflowError::NotARepository(_)), "got {err:?}");
        assert_eq!(wf.state(), WorkflowState::Unvalidated);
        assert_eq!(wf.execute(), None);
        assert!(wf.git().calls().is_empty());
    }

    #[test]
    fn missing_main_branch_is_rejected() {
        let repo = fake_repo();
        let git = MockGit::new().with_branches(&["* develop", "  mainline"]);
        let mut wf = Workflow::new(repo.path(), "main", git, MockApi::new());

        let err = wf.try_validate().unwrap_err();
        assert!(
            matches!(&err, WorkflowError::MainBranchMissing(name) if name == "main"),
            "got {err:?}"
        );
        assert_eq!(err.to_string(), "Main branch main does not exist.");
        assert_eq!(wf.execute(), None);
        assert_eq!(wf.git().calls(), vec!["branch"]);
    }

    #[test]
    fn marked_main_branch_validates() {
        let repo = fake_repo();
        let git = MockGit::new().with_branches(&["* main "]);
        let mut wf = Workflow::new(repo.path(), "main", git, MockApi::new());

        assert!(wf.validate());
        assert_eq!(wf.state(), WorkflowState::Validated);
    }

    #[test]
    fn execute_before_validate_is_refused() {
        let repo = fake_repo();
        let mut wf = Workflow::new(
            repo.path(),
            "main",
            subtask_git("feat/code-smash/7"),
            MockApi::new().with_subtask(7),
        );

        let err = wf.try_execute().unwrap_err();
        assert!(matches!(err, WorkflowError::NotValidated), "got {err:?}");
        assert_eq!(wf.state(), WorkflowState::Unvalidated);
        assert!(wf.git().calls().is_empty());
        assert!(wf.api().fetched.borrow().is_empty());
    }

    #[test]
    fn end_to_end_solved_review() {
        let repo = fake_repo();
        let mut wf = Workflow::new(
            repo.path(),
            "main",
            subtask_git("feat/code-smash/7"),
            MockApi::new().with_subtask(7).with_review(true),
        );

        assert!(wf.validate());
        let report = wf.execute().unwrap();
        assert_eq!(
            report,
            "Implementation:\nI1\n\n---\nCode Quality:\nQ1\n\n---\nBest Practices:\nB1\n\n---\n\
             Task is Fulfilled: Yes. Code can be merged."
        );
        assert_eq!(wf.state(), WorkflowState::Succeeded);

        assert_eq!(
            wf.git().calls(),
            vec![
                "branch".to_string(),
                "branch --show-current".to_string(),
                "rev-parse HEAD".to_string(),
                format!("diff main {HASH}"),
            ]
        );
        assert_eq!(
            *wf.api().submitted.borrow(),
            vec![DiffSubmission {
                hash: HASH.into(),
                diff: "+added line".into(),
                subtask: SubtaskId::new(7).unwrap(),
            }]
        );
    }

    #[test]
    fn unsolved_review_says_no() {
        let repo = fake_repo();
        let mut wf = Workflow::new(
            repo.path(),
            "main",
            subtask_git("feat/code-smash/42"),
            MockApi::new().with_subtask(42).with_review(false),
        );

        assert!(wf.validate());
        let report = wf.execute().unwrap();
        assert!(report.ends_with("Task is Fulfilled: No."), "got {report}");
    }

    #[test]
    fn pending_review_reports_no_feedback() {
        let repo = fake_repo();
        let mut wf = Workflow::new(
            repo.path(),
            "main",
            subtask_git("feat/code-smash/42"),
            MockApi::new().with_subtask(42),
        );

        assert!(wf.validate());
        assert_eq!(wf.execute().as_deref(), Some("No feedback available."));
    }

    #[test]
    fn unconventional_branch_aborts_before_network() {
        for branch in ["feature/code-smash/42", "feat/code-smash/abc", "feat/codesmash/42", "main"] {
            let repo = fake_repo();
            let mut wf = Workflow::new(
                repo.path(),
                "main",
                subtask_git(branch),
                MockApi::new().with_subtask(42),
            );
            assert!(wf.validate());

            let err = wf.try_execute().unwrap_err();
            assert!(matches!(err, WorkflowError::InvalidBranch(_)), "{branch}: got {err:?}");
            assert_eq!(wf.state(), WorkflowState::Failed);
            assert!(wf.api().fetched.borrow().is_empty());
        }
    }

    #[test]
    fn unknown_subtask_aborts_before_submission() {
        let repo = fake_repo();
        let mut wf = Workflow::new(
            repo.path(),
            "main",
            subtask_git("feat/code-smash/9"),
            MockApi::new().with_subtask(42),
        );
        assert!(wf.validate());

        let err = wf.try_execute().unwrap_err();
        assert!(
            matches!(err, WorkflowError::Api(ServiceError::Api { status: 404, .. })),
            "got {err:?}"
        );
        assert!(wf.api().submitted.borrow().is_empty());
        assert!(!wf.git().calls().iter().any(|c| c.starts_with("diff")));
    }

    #[test]
    fn submit_failure_yields_no_result() {
        let repo = fake_repo();
        let mut wf = Workflow::new(
            repo.path(),
            "main",
            subtask_git("feat/code-smash/7"),
            MockApi::new()
                .with_subtask(7)
                .with_submit_fail(500, "review backend down"),
        );
        assert!(wf.validate());

        assert_eq!(wf.execute(), None);
        assert_eq!(wf.state(), WorkflowState::Failed);
        assert_eq!(wf.api().submitted.borrow().len(), 1);
    }

    #[test]
    fn git_diff_failure_is_not_an_empty_diff() {
        let repo = fake_repo();
        let git = subtask_git("feat/code-smash/7").with_diff_fail();
        let mut wf = Workflow::new(repo.path(), "main", git, MockApi::new().with_subtask(7));
        assert!(wf.validate());

        let err = wf.try_execute().unwrap_err();
        assert!(
            matches!(err, WorkflowError::Git(GitError::CommandFailed { .. })),
            "got {err:?}"
        );
        assert!(wf.api().submitted.borrow().is_empty());
    }
}
