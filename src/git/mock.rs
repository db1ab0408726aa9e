use std::collections::{HashMap, HashSet};

use crate::domain::Step;
use crate::error::{GitPromoteError, Result};
use crate::git::VersionControl;

/// Identifier of a commit in a [MockRepository]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommitId(u32);

/// A recorded call against the mock, in the same shape as a workflow step
pub type Invocation = Step;

/// Mock repository for testing without actual git operations
///
/// Simulates local branch pointers, a commit graph for fast-forward checks,
/// and remotes holding their own branch pointers. Every call is recorded,
/// including calls that fail.
pub struct MockRepository {
    parents: HashMap<CommitId, Vec<CommitId>>,
    next_commit: u32,
    branches: HashMap<String, CommitId>,
    head: Option<String>,
    remotes: HashMap<String, HashMap<String, CommitId>>,
    conflicting: HashSet<String>,
    unresolved_merge: bool,
    failures: HashMap<usize, i32>,
    invocations: Vec<Invocation>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            parents: HashMap::new(),
            next_commit: 0,
            branches: HashMap::new(),
            head: None,
            remotes: HashMap::new(),
            conflicting: HashSet::new(),
            unresolved_merge: false,
            failures: HashMap::new(),
            invocations: Vec::new(),
        }
    }

    /// Add a commit with the given parents
    pub fn add_commit(&mut self, parents: &[CommitId]) -> CommitId {
        let id = CommitId(self.next_commit);
        self.next_commit += 1;
        self.parents.insert(id, parents.to_vec());
        id
    }

    /// Create or move a local branch
    pub fn set_branch(&mut self, branch: impl Into<String>, commit: CommitId) {
        self.branches.insert(branch.into(), commit);
    }

    /// Point HEAD at a branch without recording an invocation
    pub fn set_head(&mut self, branch: impl Into<String>) {
        self.head = Some(branch.into());
    }

    /// Configure a remote with no branches
    pub fn add_remote(&mut self, name: impl Into<String>) {
        self.remotes.entry(name.into()).or_default();
    }

    /// Set a branch pointer on a configured remote
    pub fn set_remote_branch(&mut self, remote: &str, branch: impl Into<String>, commit: CommitId) {
        self.remotes
            .entry(remote.to_string())
            .or_default()
            .insert(branch.into(), commit);
    }

    /// Make a three-way merge of `branch` stop with a conflict
    pub fn mark_conflicting(&mut self, branch: impl Into<String>) {
        self.conflicting.insert(branch.into());
    }

    /// Make the zero-based `index`-th invocation fail with `exit_code`
    pub fn fail_invocation(&mut self, index: usize, exit_code: i32) {
        self.failures.insert(index, exit_code);
    }

    /// Whether a conflicting merge is waiting to be resolved
    pub fn has_unresolved_merge(&self) -> bool {
        self.unresolved_merge
    }

    /// Clear a pending conflict, as committing or aborting the merge would
    pub fn resolve_merge(&mut self) {
        self.unresolved_merge = false;
    }

    pub fn branch(&self, branch: &str) -> Option<CommitId> {
        self.branches.get(branch).copied()
    }

    pub fn remote_branch(&self, remote: &str, branch: &str) -> Option<CommitId> {
        self.remotes.get(remote)?.get(branch).copied()
    }

    /// Branch names present on a remote, sorted
    pub fn remote_branches(&self, remote: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .remotes
            .get(remote)
            .map(|branches| branches.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    pub fn parents(&self, commit: CommitId) -> &[CommitId] {
        self.parents.get(&commit).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every call made so far, in order
    pub fn invocations(&self) -> &[Invocation] {
        &self.invocations
    }

    /// Whether `ancestor` is reachable from `descendant` (inclusive)
    pub fn is_ancestor(&self, ancestor: CommitId, descendant: CommitId) -> bool {
        let mut stack = vec![descendant];
        let mut seen = HashSet::new();
        while let Some(commit) = stack.pop() {
            if commit == ancestor {
                return true;
            }
            if seen.insert(commit) {
                stack.extend(self.parents(commit).iter().copied());
            }
        }
        false
    }

    /// Record the call and return the injected failure for it, if any
    fn record(&mut self, invocation: Invocation) -> Result<()> {
        let index = self.invocations.len();
        let command = invocation.to_string();
        self.invocations.push(invocation);

        match self.failures.get(&index) {
            Some(code) => Err(GitPromoteError::CommandFailed {
                command,
                code: Some(*code),
            }),
            None => Ok(()),
        }
    }

    fn failed(step: &Step) -> GitPromoteError {
        GitPromoteError::CommandFailed {
            command: step.to_string(),
            code: Some(1),
        }
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionControl for MockRepository {
    fn checkout(&mut self, branch: &str) -> Result<()> {
        let step = Step::checkout(branch);
        self.record(step.clone())?;

        // git refuses to switch branches with a conflicted index
        if self.unresolved_merge || !self.branches.contains_key(branch) {
            return Err(Self::failed(&step));
        }
        self.head = Some(branch.to_string());
        Ok(())
    }

    fn merge(&mut self, branch: &str) -> Result<()> {
        let step = Step::merge(branch);
        self.record(step.clone())?;

        let current = self.head.clone().ok_or_else(|| Self::failed(&step))?;
        let ours = self.branch(&current).ok_or_else(|| Self::failed(&step))?;
        let theirs = self.branch(branch).ok_or_else(|| Self::failed(&step))?;

        if self.is_ancestor(theirs, ours) {
            return Ok(());
        }
        if self.is_ancestor(ours, theirs) {
            self.set_branch(current, theirs);
            return Ok(());
        }
        if self.conflicting.contains(branch) {
            self.unresolved_merge = true;
            return Err(GitPromoteError::merge_conflict(format!(
                "merging '{}' into '{}'",
                branch, current
            )));
        }

        let merged = self.add_commit(&[ours, theirs]);
        self.set_branch(current, merged);
        Ok(())
    }

    fn push(&mut self, remote: &str, branches: &[String]) -> Result<()> {
        let step = Step::push(remote, branches.iter().cloned());
        self.record(step.clone())?;

        if !self.remotes.contains_key(remote) {
            return Err(Self::failed(&step));
        }

        // Like git, accepted refs are updated even when another is rejected
        let mut rejected = None;
        for branch in branches {
            let Some(local) = self.branch(branch) else {
                rejected.get_or_insert_with(|| {
                    (branch.clone(), "src refspec does not match any".to_string())
                });
                continue;
            };
            let fast_forward = match self.remote_branch(remote, branch) {
                Some(existing) => self.is_ancestor(existing, local),
                None => true,
            };
            if fast_forward {
                self.set_remote_branch(remote, branch.clone(), local);
            } else {
                rejected.get_or_insert_with(|| (branch.clone(), "non-fast-forward".to_string()));
            }
        }

        match rejected {
            Some((branch, reason)) => Err(GitPromoteError::PushRejected {
                remote: remote.to_string(),
                reference: format!("refs/heads/{}", branch),
                reason,
            }),
            None => Ok(()),
        }
    }

    fn current_branch(&self) -> Result<Option<String>> {
        Ok(self.head.clone())
    }
}
