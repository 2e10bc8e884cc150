use anyhow::Result;
use code_smash_service::{ApiConfig, BlockingHttpService};
use tracing::info;

use crate::config::ApplyArgs;
use crate::git::GitCli;
use crate::workflow::Workflow;

/// `code-smash task apply`: validate the working copy, submit its diff and
/// return the rendered feedback. `Ok(None)` means the workflow aborted and
/// the reason has been logged.
pub fn apply(config: &ApiConfig, args: &ApplyArgs) -> Result<Option<String>> {
    info!("applying feedback check for {}", args.local_path.display());
    let api = BlockingHttpService::new(config)?;
    let git = GitCli::new(&args.local_path);
    let mut workflow = Workflow::new(&args.local_path, &args.main_branch_name, git, api);

    workflow.validate();
    Ok(workflow.execute())
}
