//! # Version-Control Seam
//!
//! The workspace never talks to `git` directly. It goes through the
//! `GitOperations` trait, which covers the handful of one-shot queries and
//! actions it needs: reading a checkout's branch and remote, and cloning a missing
//! checkout.
//!
//! `DefaultGitOperations` forwards to the wrappers in [`crate::git`]. Tests
//! substitute their own implementation to simulate checkouts without a real
//! `git` binary or network access.

use std::path::Path;

use crate::error::Result;

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Branch currently checked out in `dir`.
    fn current_branch(&self, dir: &Path) -> Result<String>;

    /// URL of the `origin` remote of `dir`.
    fn remote_origin(&self, dir: &Path) -> Result<String>;

    /// Clone `remote` at `branch` into `working_dir/rel`.
    fn clone_into(&self, working_dir: &Path, rel: &str, remote: &str, branch: &str)
        -> Result<String>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn current_branch(&self, dir: &Path) -> Result<String> {
        crate::git::current_branch(dir)
    }

    fn remote_origin(&self, dir: &Path) -> Result<String> {
        crate::git::remote_origin(dir)
    }

    fn clone_into(
        &self,
        working_dir: &Path,
        rel: &str,
        remote: &str,
        branch: &str,
    ) -> Result<String> {
        crate::git::clone(working_dir, rel, remote, branch)
    }
}
