use std::cell::{Cell, RefCell};
use std::path::Path;

use git2::build::CheckoutBuilder;
use git2::{Cred, CredentialType, ObjectType, PushOptions, RemoteCallbacks, Repository as Git2Repo};
use tracing::debug;

use crate::error::{GitPromoteError, Result};
use crate::git::VersionControl;

/// Credential callbacks are retried by libgit2 until one succeeds
const MAX_CREDENTIAL_ATTEMPTS: usize = 4;

/// In-process implementation on top of libgit2
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    fn branch_ref_name(branch: &str) -> String {
        format!("refs/heads/{}", branch)
    }

    fn find_branch_ref(&self, branch: &str) -> Result<git2::Reference<'_>> {
        self.repo
            .find_reference(&Self::branch_ref_name(branch))
            .map_err(|e| GitPromoteError::branch(format!("Cannot find branch '{}': {}", branch, e)))
    }

    fn fast_forward(&self, branch: &str, target: git2::Oid) -> Result<()> {
        let object = self.repo.find_object(target, None)?;
        let mut checkout = CheckoutBuilder::new();
        checkout.safe();
        self.repo.checkout_tree(&object, Some(&mut checkout))?;

        let mut head = self.repo.head()?;
        head.set_target(target, &format!("merge {}: Fast-forward", branch))?;
        Ok(())
    }

    fn merge_commit(&self, branch: &str, their: &git2::AnnotatedCommit<'_>) -> Result<()> {
        self.repo.merge(&[their], None, None)?;

        let mut index = self.repo.index()?;
        if index.has_conflicts() {
            return Err(GitPromoteError::merge_conflict(format!(
                "merging '{}' left conflicts in the working tree",
                branch
            )));
        }

        let tree_oid = index.write_tree()?;
        let tree = self.repo.find_tree(tree_oid)?;
        let signature = self.repo.signature()?;
        let head_commit = self.repo.head()?.peel_to_commit()?;
        let their_commit = self.repo.find_commit(their.id())?;

        self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            &format!("Merge branch '{}'", branch),
            &tree,
            &[&head_commit, &their_commit],
        )?;
        self.repo.cleanup_state()?;
        Ok(())
    }
}

impl VersionControl for Git2Repository {
    fn checkout(&mut self, branch: &str) -> Result<()> {
        let reference = self.find_branch_ref(branch)?;
        let target = reference.peel(ObjectType::Commit)?;

        let mut checkout = CheckoutBuilder::new();
        checkout.safe();
        self.repo.checkout_tree(&target, Some(&mut checkout))?;
        self.repo.set_head(&Self::branch_ref_name(branch))?;

        debug!(branch, "Checked out branch");
        Ok(())
    }

    fn merge(&mut self, branch: &str) -> Result<()> {
        let reference = self.find_branch_ref(branch)?;
        let their = self.repo.reference_to_annotated_commit(&reference)?;
        let (analysis, _) = self.repo.merge_analysis(&[&their])?;

        if analysis.is_up_to_date() {
            debug!(branch, "Already up to date");
            Ok(())
        } else if analysis.is_fast_forward() {
            debug!(branch, "Fast-forward merge");
            self.fast_forward(branch, their.id())
        } else if analysis.is_normal() {
            debug!(branch, "Three-way merge");
            self.merge_commit(branch, &their)
        } else {
            Err(GitPromoteError::branch(format!(
                "Cannot merge '{}' into the current HEAD",
                branch
            )))
        }
    }

    fn push(&mut self, remote: &str, branches: &[String]) -> Result<()> {
        let mut remote_handle = self
            .repo
            .find_remote(remote)
            .map_err(|e| GitPromoteError::remote(format!("Cannot find remote '{}': {}", remote, e)))?;

        let refspecs: Vec<String> = branches
            .iter()
            .map(|branch| format!("refs/heads/{0}:refs/heads/{0}", branch))
            .collect();
        let refspec_strs: Vec<&str> = refspecs.iter().map(|s| s.as_str()).collect();

        let config = self.repo.config()?;
        let attempts = Cell::new(0usize);
        let rejected: RefCell<Vec<(String, String)>> = RefCell::new(Vec::new());

        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(|url, username_from_url, allowed_types| {
            attempts.set(attempts.get() + 1);
            if attempts.get() > MAX_CREDENTIAL_ATTEMPTS {
                return Err(git2::Error::from_str("no usable credentials"));
            }
            find_credentials(&config, url, username_from_url, allowed_types)
        });
        callbacks.push_update_reference(|refname, status| {
            if let Some(reason) = status {
                rejected
                    .borrow_mut()
                    .push((refname.to_string(), reason.to_string()));
            }
            Ok(())
        });

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(callbacks);

        remote_handle
            .push(&refspec_strs, Some(&mut push_options))
            .map_err(|e| {
                // libgit2 refuses non-fast-forward updates before contacting the remote
                if e.code() == git2::ErrorCode::NotFastForward {
                    GitPromoteError::PushRejected {
                        remote: remote.to_string(),
                        reference: refspec_targets(branches),
                        reason: "non-fast-forward".to_string(),
                    }
                } else if e.class() == git2::ErrorClass::Net {
                    GitPromoteError::remote(format!("Network error pushing to '{}': {}", remote, e))
                } else {
                    GitPromoteError::remote(format!("Push to '{}' failed: {}", remote, e))
                }
            })?;

        if let Some((reference, reason)) = rejected.borrow().first() {
            return Err(GitPromoteError::PushRejected {
                remote: remote.to_string(),
                reference: reference.clone(),
                reason: reason.clone(),
            });
        }

        debug!(remote, ?branches, "Pushed branches");
        Ok(())
    }

    fn current_branch(&self) -> Result<Option<String>> {
        let head = self.repo.find_reference("HEAD")?;
        Ok(head
            .symbolic_target()
            .and_then(|target| target.strip_prefix("refs/heads/"))
            .map(str::to_string))
    }
}

/// Destination refs of a push, as reported in rejection errors
fn refspec_targets(branches: &[String]) -> String {
    branches
        .iter()
        .map(|branch| format!("refs/heads/{}", branch))
        .collect::<Vec<_>>()
        .join(", ")
}

/// SSH keys from ~/.ssh, then the SSH agent, then git's credential helpers
fn find_credentials(
    config: &git2::Config,
    url: &str,
    username_from_url: Option<&str>,
    allowed_types: CredentialType,
) -> std::result::Result<Cred, git2::Error> {
    let username = username_from_url.unwrap_or("git");

    if allowed_types.contains(CredentialType::SSH_KEY) {
        if let Some(home) = dirs::home_dir() {
            for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                let path = home.join(".ssh").join(key);
                if path.exists() {
                    if let Ok(cred) = Cred::ssh_key(username, None, &path, None) {
                        return Ok(cred);
                    }
                }
            }
        }

        if let Ok(cred) = Cred::ssh_key_from_agent(username) {
            return Ok(cred);
        }
    }

    if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
        if let Ok(cred) = Cred::credential_helper(config, url, username_from_url) {
            return Ok(cred);
        }
    }

    Cred::default()
}
