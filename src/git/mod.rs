//! Version-control operations abstraction layer
//!
//! This module provides a trait-based abstraction over the three git
//! operations the promote workflow needs, allowing the runner to drive the
//! installed `git` binary, libgit2, or an in-memory mock interchangeably.
//!
//! # Overview
//!
//! - [cli::GitCli]: spawns `git`, inheriting its standard streams
//! - [repository::Git2Repository]: in-process implementation using the `git2` crate
//! - [mock::MockRepository]: records invocations and simulates branch state for tests
//!
//! ```rust
//! # use git_promote::git::VersionControl;
//! # fn example<V: VersionControl>(vcs: &mut V) -> git_promote::Result<()> {
//! vcs.checkout("master")?;
//! vcs.merge("develop")?;
//! vcs.push("origin", &["master".to_string()])?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod mock;
pub mod repository;

pub use cli::GitCli;
pub use mock::{CommitId, Invocation, MockRepository};
pub use repository::Git2Repository;

use crate::domain::Step;
use crate::error::Result;

/// Common version-control trait for abstraction
///
/// Implementations perform exactly the operation named, with no validation
/// beyond what the underlying tool does itself.
pub trait VersionControl {
    /// Switch the working copy to a local branch
    ///
    /// # Returns
    /// * `Ok(())` - HEAD now points at `refs/heads/<branch>`
    /// * `Err` - If the branch is missing or the checkout would clobber local changes
    fn checkout(&mut self, branch: &str) -> Result<()>;

    /// Merge a local branch into the currently checked-out branch
    ///
    /// Fast-forwards when possible, otherwise creates a merge commit. A
    /// conflicting merge is reported as an error and left unresolved.
    fn merge(&mut self, branch: &str) -> Result<()>;

    /// Push local branches to the same-named branches on a remote
    ///
    /// Never forces; a non-fast-forward update is rejected by the remote.
    fn push(&mut self, remote: &str, branches: &[String]) -> Result<()>;

    /// Name of the checked-out branch, or `None` when HEAD is detached
    fn current_branch(&self) -> Result<Option<String>>;

    /// Execute a single workflow step against this backend
    fn apply(&mut self, step: &Step) -> Result<()> {
        match step {
            Step::Checkout { branch } => self.checkout(branch),
            Step::Merge { branch } => self.merge(branch),
            Step::Push { remote, branches } => self.push(remote, branches),
        }
    }
}

impl<V: VersionControl + ?Sized> VersionControl for Box<V> {
    fn checkout(&mut self, branch: &str) -> Result<()> {
        (**self).checkout(branch)
    }

    fn merge(&mut self, branch: &str) -> Result<()> {
        (**self).merge(branch)
    }

    fn push(&mut self, remote: &str, branches: &[String]) -> Result<()> {
        (**self).push(remote, branches)
    }

    fn current_branch(&self) -> Result<Option<String>> {
        (**self).current_branch()
    }
}
