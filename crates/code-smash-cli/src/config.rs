use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use code_smash_service::{ApiConfig, ServiceError, DEFAULT_BASE_URL};

#[derive(Debug, Parser)]
#[command(name = "code-smash", about = "Submit subtask branches for code review", version)]
pub struct Cli {
    /// API token for the review service
    #[arg(long, env = "CODE_SMASH_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Base URL of the review service
    #[arg(long, env = "CODE_SMASH_BASE_API_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Work with subtasks
    #[command(subcommand)]
    Task(TaskCommand),
}

#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    /// Submit the checked-out subtask branch for review and print the feedback
    Apply(ApplyArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ApplyArgs {
    /// Local path to project base directory.
    #[arg(long)]
    pub local_path: PathBuf,

    /// Name of main branch which is used (i.e. master, main).
    #[arg(long)]
    pub main_branch_name: String,
}

impl Cli {
    pub fn api_config(&self) -> Result<ApiConfig, ServiceError> {
        ApiConfig::new(&self.base_url, self.token.as_str())
    }
}
