use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use super::{GitError, VersionControl};

/// `VersionControl` backed by the `git` executable, run as `git -C <path> ...`.
#[derive(Debug, Clone)]
pub struct GitCli {
    path: PathBuf,
}

impl GitCli {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn command_line(&self, args: &[&str]) -> String {
        format!("git -C {} {}", self.path.display(), args.join(" "))
    }

    /// Run git and return stdout, failing on a non-zero exit.
    fn run(&self, args: &[&str]) -> Result<String, GitError> {
        let command = self.command_line(args);
        debug!("running {command}");
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.path)
            .args(args)
            .output()
            .map_err(|e| GitError::Spawn {
                command: command.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitError::CommandFailed {
                command,
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl VersionControl for GitCli {
    fn list_branches(&self) -> Result<Vec<String>, GitError> {
        let out = self.run(&["branch"])?;
        Ok(out.lines().map(String::from).collect())
    }

    fn current_branch(&self) -> Result<String, GitError> {
        Ok(self.run(&["branch", "--show-current"])?.trim().to_string())
    }

    fn current_commit_hash(&self) -> Result<String, GitError> {
        Ok(self.run(&["rev-parse", "HEAD"])?.trim().to_string())
    }

    fn diff(&self, ref_a: &str, ref_b: &str) -> Result<String, GitError> {
        let args = ["diff", ref_a, ref_b];
        info!("cmd {}", self.command_line(&args));
        self.run(&args)
    }
}
