//! Thin wrappers around the system `git` binary.
//!
//! Each function runs one `git` invocation in captured mode and returns its
//! trimmed output. This uses the system git command, so SSH keys, credential
//! helpers and everything in `~/.gitconfig` apply as usual.

use std::path::Path;

use crate::error::{Error, Result};
use crate::runner::Runner;

fn git(dir: &Path, operation: &str, args: &[&str]) -> Result<String> {
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    Runner::new()
        .captured(dir, "git", &args)
        .map_err(|e| Error::Vcs {
            dir: dir.to_path_buf(),
            operation: operation.to_string(),
            message: e.to_string(),
        })
}

/// Name of the branch checked out in `dir` (`HEAD` when detached).
pub fn current_branch(dir: &Path) -> Result<String> {
    git(dir, "read branch", &["rev-parse", "--abbrev-ref", "HEAD"])
}

/// URL of the `origin` remote. Fails when the checkout has no `origin`.
pub fn remote_origin(dir: &Path) -> Result<String> {
    git(dir, "read remote", &["config", "--get", "remote.origin.url"])
}

/// Clone `remote` at `branch` into `working_dir/rel`.
///
/// `remote` and `rel` follow `--`, so git never reads them as options.
pub fn clone(working_dir: &Path, rel: &str, remote: &str, branch: &str) -> Result<String> {
    git(
        working_dir,
        "clone",
        &["clone", "-b", branch, "--", remote, rel],
    )
}
