use std::fmt;

/// One invocation of the version-control tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Switch the working copy to a local branch
    Checkout { branch: String },
    /// Merge a branch into whatever is currently checked out
    Merge { branch: String },
    /// Push local branches to the same-named branches on a remote
    Push {
        remote: String,
        branches: Vec<String>,
    },
}

impl Step {
    pub fn checkout(branch: impl Into<String>) -> Self {
        Step::Checkout {
            branch: branch.into(),
        }
    }

    pub fn merge(branch: impl Into<String>) -> Self {
        Step::Merge {
            branch: branch.into(),
        }
    }

    pub fn push<I, S>(remote: impl Into<String>, branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Step::Push {
            remote: remote.into(),
            branches: branches.into_iter().map(Into::into).collect(),
        }
    }

    /// Short operation name, as used in log fields
    pub fn name(&self) -> &'static str {
        match self {
            Step::Checkout { .. } => "checkout",
            Step::Merge { .. } => "merge",
            Step::Push { .. } => "push",
        }
    }

    /// Arguments passed to `git`, subcommand first.
    ///
    /// Only the subcommand and the branch/remote names ever appear here.
    pub fn git_args(&self) -> Vec<String> {
        match self {
            Step::Checkout { branch } => vec!["checkout".to_string(), branch.clone()],
            Step::Merge { branch } => vec!["merge".to_string(), branch.clone()],
            Step::Push { remote, branches } => {
                let mut args = Vec::with_capacity(branches.len() + 2);
                args.push("push".to_string());
                args.push(remote.clone());
                args.extend(branches.iter().cloned());
                args
            }
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "git {}", self.git_args().join(" "))
    }
}
