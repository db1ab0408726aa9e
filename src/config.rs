use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{GitPromoteError, Result};

/// File name looked up in the repository directory
pub const LOCAL_CONFIG_FILE: &str = "gitpromote.toml";

/// File name looked up in the user config directory
pub const USER_CONFIG_FILE: &str = ".gitpromote.toml";

/// Complete configuration for git-promote.
///
/// Names the two branches involved in the promotion and the remotes each
/// branch is pushed to. The defaults describe the master/develop workflow.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub branches: BranchesConfig,

    /// Remotes in push order. Empty means the default three remotes.
    #[serde(default)]
    pub remotes: Vec<RemoteConfig>,
}

/// The branch that receives the merge and the branch that is merged into it.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BranchesConfig {
    #[serde(default = "default_target")]
    pub target: String,

    #[serde(default = "default_source")]
    pub source: String,
}

fn default_target() -> String {
    "master".to_string()
}

fn default_source() -> String {
    "develop".to_string()
}

impl Default for BranchesConfig {
    fn default() -> Self {
        BranchesConfig {
            target: default_target(),
            source: default_source(),
        }
    }
}

/// A remote and the local branches pushed to it.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RemoteConfig {
    pub name: String,
    pub branches: Vec<String>,
}

impl RemoteConfig {
    pub fn new<I, S>(name: impl Into<String>, branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RemoteConfig {
            name: name.into(),
            branches: branches.into_iter().map(Into::into).collect(),
        }
    }
}

impl Config {
    /// Remotes to push to, falling back to origin, bitbucket and github.
    ///
    /// The fallback pushes both branches to origin and bitbucket and only the
    /// target branch to github.
    pub fn resolved_remotes(&self) -> Vec<RemoteConfig> {
        if !self.remotes.is_empty() {
            return self.remotes.clone();
        }

        let target = self.branches.target.as_str();
        let source = self.branches.source.as_str();
        vec![
            RemoteConfig::new("origin", [target, source]),
            RemoteConfig::new("bitbucket", [target, source]),
            RemoteConfig::new("github", [target]),
        ]
    }

    /// Rejects names that git would read as options, and empty push lists.
    pub fn validate(&self) -> Result<()> {
        check_name("branches.target", &self.branches.target)?;
        check_name("branches.source", &self.branches.source)?;

        for remote in &self.remotes {
            check_name("remote name", &remote.name)?;
            if remote.branches.is_empty() {
                return Err(GitPromoteError::config(format!(
                    "remote '{}' has no branches to push",
                    remote.name
                )));
            }
            for branch in &remote.branches {
                check_name(&format!("branch for remote '{}'", remote.name), branch)?;
            }
        }

        Ok(())
    }
}

fn check_name(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(GitPromoteError::config(format!("{} must not be empty", field)));
    }
    if value.starts_with('-') {
        return Err(GitPromoteError::config(format!(
            "{} '{}' must not start with '-'",
            field, value
        )));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(GitPromoteError::config(format!(
            "{} '{}' must not contain whitespace",
            field, value
        )));
    }
    Ok(())
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `gitpromote.toml` in the repository directory `repo_dir`
/// 3. `.gitpromote.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded and validated, or default configuration
/// * `Err` - If a file exists but cannot be read, parsed, or validated
pub fn load_config(config_path: Option<&str>, repo_dir: &Path) -> Result<Config> {
    let local_path = repo_dir.join(LOCAL_CONFIG_FILE);
    let config_str = if let Some(path) = config_path {
        read_config_file(Path::new(path))?
    } else if local_path.exists() {
        read_config_file(&local_path)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(USER_CONFIG_FILE);
        if config_path.exists() {
            read_config_file(&config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    parse_config(&config_str)
}

/// Parses and validates a TOML configuration document.
pub fn parse_config(config_str: &str) -> Result<Config> {
    let config: Config = toml::from_str(config_str)
        .map_err(|e| GitPromoteError::config(format!("invalid TOML: {}", e)))?;
    config.validate()?;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<String> {
    tracing::debug!(path = %path.display(), "Reading configuration");
    fs::read_to_string(path).map_err(|e| {
        GitPromoteError::config(format!("cannot read {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_branches() {
        let config = Config::default();
        assert_eq!(config.branches.target, "master");
        assert_eq!(config.branches.source, "develop");
        assert!(config.remotes.is_empty());
    }

    #[test]
    fn test_default_remotes() {
        let remotes = Config::default().resolved_remotes();
        assert_eq!(
            remotes,
            vec![
                RemoteConfig::new("origin", ["master", "develop"]),
                RemoteConfig::new("bitbucket", ["master", "develop"]),
                RemoteConfig::new("github", ["master"]),
            ]
        );
    }

    #[test]
    fn test_default_remotes_follow_renamed_branches() {
        let config = parse_config(
            r#"
[branches]
target = "main"
source = "next"
"#,
        )
        .unwrap();

        let remotes = config.resolved_remotes();
        assert_eq!(remotes[0].branches, vec!["main", "next"]);
        assert_eq!(remotes[2].branches, vec!["main"]);
    }

    #[test]
    fn test_explicit_remotes_replace_defaults() {
        let config = parse_config(
            r#"
[[remotes]]
name = "upstream"
branches = ["master"]
"#,
        )
        .unwrap();

        assert_eq!(
            config.resolved_remotes(),
            vec![RemoteConfig::new("upstream", ["master"])]
        );
        assert_eq!(config.branches, BranchesConfig::default());
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(parse_config("").unwrap(), Config::default());
    }

    #[test]
    fn test_rejects_flag_like_branch() {
        let err = parse_config(
            r#"
[branches]
target = "--force"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("must not start with '-'"));
    }

    #[test]
    fn test_rejects_remote_without_branches() {
        let err = parse_config(
            r#"
[[remotes]]
name = "origin"
branches = []
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("no branches to push"));
    }

    #[test]
    fn test_rejects_empty_remote_name() {
        let err = parse_config(
            r#"
[[remotes]]
name = ""
branches = ["master"]
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_rejects_whitespace_in_branch() {
        let err = parse_config(
            r#"
[branches]
source = "dev elop"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("whitespace"));
    }

    #[test]
    fn test_invalid_toml() {
        let err = parse_config("branches = [").unwrap_err();
        assert!(matches!(err, GitPromoteError::Config(_)));
    }
}
