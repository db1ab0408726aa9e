//! Scratch repositories for integration tests: a work tree with master and
//! develop, plus bare repositories registered as origin, bitbucket and github.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

pub const REMOTES: [&str; 3] = ["origin", "bitbucket", "github"];

pub struct Fixture {
    dir: TempDir,
    pub work: PathBuf,
}

/// Run git with a fixed identity and no editor
pub fn git_output(dir: &Path, args: &[&str]) -> Output {
    Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "Test Author")
        .env("GIT_AUTHOR_EMAIL", "author@example.com")
        .env("GIT_COMMITTER_NAME", "Test Author")
        .env("GIT_COMMITTER_EMAIL", "author@example.com")
        .env("GIT_MERGE_AUTOEDIT", "no")
        .output()
        .expect("failed to run git")
}

/// Run git and return trimmed stdout, panicking on failure
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = git_output(dir, args);
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

impl Fixture {
    /// master at commit A, develop at B (child of A), develop checked out
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let work = dir.path().join("work");
        fs::create_dir(&work).expect("create work dir");

        git(&work, &["init", "-q"]);
        git(&work, &["symbolic-ref", "HEAD", "refs/heads/master"]);
        git(&work, &["config", "user.name", "Test Author"]);
        git(&work, &["config", "user.email", "author@example.com"]);

        let fixture = Fixture { dir, work };
        fixture.commit_file("a.txt", "A\n", "A");
        git(&fixture.work, &["checkout", "-q", "-b", "develop"]);
        fixture.commit_file("b.txt", "B\n", "B");

        for name in REMOTES {
            let bare = fixture.remote_path(name);
            git(fixture.dir.path(), &["init", "-q", "--bare", bare.to_str().unwrap()]);
            git(&fixture.work, &["remote", "add", name, bare.to_str().unwrap()]);
        }

        fixture
    }

    pub fn remote_path(&self, name: &str) -> PathBuf {
        self.dir.path().join(format!("{}.git", name))
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file on the current branch and commit it
    pub fn commit_file(&self, file: &str, contents: &str, message: &str) {
        fs::write(self.work.join(file), contents).expect("write file");
        git(&self.work, &["add", file]);
        git(&self.work, &["commit", "-q", "-m", message]);
    }

    /// Commit id of a local rev, if it resolves
    pub fn rev(&self, rev: &str) -> Option<String> {
        rev_in(&self.work, rev)
    }

    /// Commit id of a branch on one of the bare remotes
    pub fn remote_rev(&self, remote: &str, branch: &str) -> Option<String> {
        rev_in(&self.remote_path(remote), &format!("refs/heads/{}", branch))
    }

    pub fn current_branch(&self) -> String {
        git(&self.work, &["rev-parse", "--abbrev-ref", "HEAD"])
    }
}

fn rev_in(dir: &Path, rev: &str) -> Option<String> {
    let output = git_output(dir, &["rev-parse", "--verify", "--quiet", rev]);
    if output.status.success() {
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        None
    }
}
