//! Main workflow orchestration logic
//!
//! Wires configuration, backend selection and the runner together so the
//! binary only has to parse arguments and report.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{self, Config};
use crate::error::Result;
use crate::git::{Git2Repository, GitCli, VersionControl};
use crate::workflow::{RunReport, Workflow, WorkflowRunner};

/// Which implementation performs the git operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Backend {
    /// Spawn the installed `git` binary
    #[default]
    Git,
    /// Use libgit2 in-process
    Libgit2,
}

/// Arguments for the promote workflow
///
/// Mirrors the CLI Args without depending on how they were parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct PromoteWorkflowArgs {
    /// Path to custom config file
    pub config_path: Option<String>,

    /// Repository to operate on
    pub repo: PathBuf,

    pub backend: Backend,
}

impl Default for PromoteWorkflowArgs {
    fn default() -> Self {
        PromoteWorkflowArgs {
            config_path: None,
            repo: PathBuf::from("."),
            backend: Backend::default(),
        }
    }
}

/// Open the selected backend on a repository path
pub fn open_backend(backend: Backend, repo: &Path) -> Result<Box<dyn VersionControl>> {
    match backend {
        Backend::Git => Ok(Box::new(GitCli::new(repo))),
        Backend::Libgit2 => Ok(Box::new(Git2Repository::open(repo)?)),
    }
}

/// Run the workflow described by `config` against an already opened backend
pub fn run_with_backend<V: VersionControl + ?Sized>(config: &Config, vcs: &mut V) -> RunReport {
    let workflow = Workflow::from_config(config);
    debug!(steps = workflow.len(), "Built promote workflow");
    WorkflowRunner::new(workflow).run(vcs)
}

/// Main promote workflow
///
/// 1. Load configuration (file or defaults)
/// 2. Open the selected backend
/// 3. Run every step, recording outcomes
///
/// Errors are only returned for setup problems; step failures are part of
/// the report.
pub fn run_promote_workflow(args: &PromoteWorkflowArgs) -> Result<RunReport> {
    let config = config::load_config(args.config_path.as_deref(), &args.repo)?;
    let mut vcs = open_backend(args.backend, &args.repo)?;
    Ok(run_with_backend(&config, &mut vcs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;

    #[test]
    fn test_default_args() {
        let args = PromoteWorkflowArgs::default();
        assert_eq!(args.backend, Backend::Git);
        assert_eq!(args.repo, PathBuf::from("."));
        assert!(args.config_path.is_none());
    }

    #[test]
    fn test_run_with_backend_uses_config() {
        let config = config::parse_config(
            r#"
[[remotes]]
name = "origin"
branches = ["master"]
"#,
        )
        .unwrap();

        let mut repo = MockRepository::new();
        let report = run_with_backend(&config, &mut repo);
        assert_eq!(report.outcomes.len(), 4);
    }

    #[test]
    fn test_libgit2_backend_requires_repository() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(open_backend(Backend::Libgit2, &missing).is_err());
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let args = PromoteWorkflowArgs {
            config_path: Some("/nonexistent/gitpromote.toml".to_string()),
            ..PromoteWorkflowArgs::default()
        };
        assert!(run_promote_workflow(&args).is_err());
    }
}
