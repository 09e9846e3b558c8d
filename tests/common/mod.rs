//! Shared test utilities for the CLI end-to-end tests.
//!
//! This module provides a workspace fixture and helper functions to reduce
//! duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_checkout("lib/a");
//!     fixture.command().arg("list").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::git_available;
    pub use super::TestFixture;
}

/// Whether a usable `git` binary is on the `PATH`.
///
/// Tests that need real repositories return early when it is not.
#[allow(dead_code)]
pub fn git_available() -> bool {
    StdCommand::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) {
    let status = StdCommand::new("git")
        .args(["-c", "user.name=forall", "-c", "user.email=forall@example.com"])
        .args(["-c", "init.defaultBranch=master"])
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        status.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&status.stderr)
    );
}

/// A temporary working directory with checkouts below it.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new()
///     .with_checkout("lib/a")
///     .with_file("lib/a/README", "hello");
///
/// fixture.command().args(["run", "ls"]).assert().success();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a directory that looks like a checkout (an empty `.git` directory).
    ///
    /// Enough for discovery and `run`; git itself will not accept it.
    pub fn with_checkout(self, rel: &str) -> Self {
        self.temp_dir
            .child(rel)
            .child(".git")
            .create_dir_all()
            .expect("Failed to create checkout");
        self
    }

    /// Add a real git repository with one commit on `branch` and `origin`
    /// pointing at `remote`.
    #[allow(dead_code)]
    pub fn with_git_checkout(self, rel: &str, remote: &str, branch: &str) -> Self {
        let dir = self.temp_dir.child(rel);
        dir.create_dir_all().expect("Failed to create checkout");
        init_repository(dir.path(), branch);
        git(dir.path(), &["remote", "add", "origin", remote]);
        self
    }

    /// Add the manifest file with the given content.
    #[allow(dead_code)]
    pub fn with_manifest(self, content: &str) -> Self {
        self.with_file(".sbr", content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the manifest file.
    #[allow(dead_code)]
    pub fn manifest_path(&self) -> PathBuf {
        self.temp_dir.path().join(".sbr")
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command running in this fixture's directory, isolated from
    /// any `FORALL_*` variables of the calling environment.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("forall");
        cmd.current_dir(self.path())
            .env_remove("FORALL_WORKING_DIR")
            .env_remove("FORALL_MANIFEST")
            .env_remove("FORALL_TIMEOUT")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Initialise a repository in `dir` with one empty commit on `branch`.
#[allow(dead_code)]
pub fn init_repository(dir: &Path, branch: &str) {
    git(dir, &["init", "-q"]);
    git(dir, &["symbolic-ref", "HEAD", &format!("refs/heads/{branch}")]);
    git(dir, &["commit", "-q", "--allow-empty", "-m", "init"]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_checkout() {
        let fixture = TestFixture::new().with_checkout("lib/a");
        assert!(fixture.path().join("lib/a/.git").is_dir());
    }

    #[test]
    fn test_fixture_with_manifest() {
        let fixture = TestFixture::new().with_manifest("\"lib/a\" \"git@host:a.git\"\n");
        assert!(fixture.manifest_path().exists());
    }
}
