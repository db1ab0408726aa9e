use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::{GitPromoteError, Result};
use crate::git::VersionControl;

/// Drives the installed `git` binary.
///
/// Each operation runs one `git` process in the repository directory with
/// inherited stdin/stdout/stderr, so the user sees git's own output.
pub struct GitCli {
    program: PathBuf,
    working_dir: PathBuf,
}

impl GitCli {
    /// Create a runner for the repository at `working_dir`
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        GitCli {
            program: PathBuf::from("git"),
            working_dir: working_dir.into(),
        }
    }

    /// Use a different executable in place of `git`
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    fn command_line(&self, args: &[&str]) -> String {
        let mut line = self.program.display().to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args).current_dir(&self.working_dir);
        cmd
    }

    /// Run git with inherited stdio and map a non-zero exit to an error
    fn run(&self, args: &[&str]) -> Result<()> {
        let command = self.command_line(args);
        debug!(command = %command, dir = %self.working_dir.display(), "Running git command");

        let status = self
            .command(args)
            .status()
            .map_err(|source| GitPromoteError::Spawn {
                command: command.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(GitPromoteError::CommandFailed {
                command,
                code: status.code(),
            })
        }
    }
}

impl VersionControl for GitCli {
    fn checkout(&mut self, branch: &str) -> Result<()> {
        self.run(&["checkout", branch])
    }

    fn merge(&mut self, branch: &str) -> Result<()> {
        self.run(&["merge", branch])
    }

    fn push(&mut self, remote: &str, branches: &[String]) -> Result<()> {
        let mut args = vec!["push", remote];
        args.extend(branches.iter().map(String::as_str));
        self.run(&args)
    }

    fn current_branch(&self) -> Result<Option<String>> {
        let args = ["symbolic-ref", "--quiet", "--short", "HEAD"];
        let command = self.command_line(&args);
        let output = self
            .command(&args)
            .output()
            .map_err(|source| GitPromoteError::Spawn {
                command: command.clone(),
                source,
            })?;

        // symbolic-ref exits 1 with --quiet when HEAD is detached
        match output.status.code() {
            Some(0) => {
                let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
                Ok(Some(name))
            }
            Some(1) => Ok(None),
            code => Err(GitPromoteError::CommandFailed { command, code }),
        }
    }
}
