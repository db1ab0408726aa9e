use thiserror::Error;

/// Unified error type for git-promote operations
#[derive(Error, Debug)]
pub enum GitPromoteError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command '{command}' exited with {}", exit_description(*.code))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("Merge conflict: {0}")]
    MergeConflict(String),

    #[error("Push to '{remote}' rejected for {reference}: {reason}")]
    PushRejected {
        remote: String,
        reference: String,
        reason: String,
    },

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("Branch error: {0}")]
    Branch(String),
}

fn exit_description(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Convenience type alias for Results in git-promote
pub type Result<T> = std::result::Result<T, GitPromoteError>;

impl GitPromoteError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        GitPromoteError::Config(msg.into())
    }

    /// Create a merge conflict error with context
    pub fn merge_conflict(msg: impl Into<String>) -> Self {
        GitPromoteError::MergeConflict(msg.into())
    }

    /// Create a remote error with context
    pub fn remote(msg: impl Into<String>) -> Self {
        GitPromoteError::Remote(msg.into())
    }

    /// Create a branch error with context
    pub fn branch(msg: impl Into<String>) -> Self {
        GitPromoteError::Branch(msg.into())
    }

    /// Exit code reported by the external tool, when one is known
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            GitPromoteError::CommandFailed { code, .. } => *code,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GitPromoteError::config("test config issue");
        assert_eq!(err.to_string(), "Configuration error: test config issue");
    }

    #[test]
    fn test_command_failed_display() {
        let err = GitPromoteError::CommandFailed {
            command: "git merge develop".to_string(),
            code: Some(1),
        };
        assert_eq!(
            err.to_string(),
            "Command 'git merge develop' exited with status 1"
        );
        assert_eq!(err.exit_code(), Some(1));
    }

    #[test]
    fn test_command_failed_without_code() {
        let err = GitPromoteError::CommandFailed {
            command: "git push origin master".to_string(),
            code: None,
        };
        assert!(err.to_string().contains("terminated by signal"));
        assert_eq!(err.exit_code(), None);
    }

    #[test]
    fn test_push_rejected_display() {
        let err = GitPromoteError::PushRejected {
            remote: "github".to_string(),
            reference: "refs/heads/master".to_string(),
            reason: "non-fast-forward".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Push to 'github' rejected for refs/heads/master: non-fast-forward"
        );
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (GitPromoteError::config("x"), "Configuration error"),
            (GitPromoteError::merge_conflict("x"), "Merge conflict"),
            (GitPromoteError::remote("x"), "Remote operation failed"),
            (GitPromoteError::branch("x"), "Branch error"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
            assert_eq!(err.exit_code(), None);
        }
    }

    #[test]
    fn test_spawn_error_keeps_source() {
        let err = GitPromoteError::Spawn {
            command: "git checkout master".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        };
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("No such file"));
    }
}
