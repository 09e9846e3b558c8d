//! # Workspace
//!
//! A [`Workspace`] is one working directory seen through the rest of the
//! crate. It discovers the checkouts below it, reads the manifest, reconciles
//! the two, and runs commands across the checkouts.
//!
//! ## Lazy state
//!
//! Every derived value is computed on first access and cached for the life of
//! the instance (one process invocation). Nothing invalidates the caches.
//!
//! | Value             | Computed by          | Needs                         |
//! |-------------------|----------------------|-------------------------------|
//! | checkout paths    | `checkout_paths()`   | filesystem walk               |
//! | declared set      | `declared()`         | manifest file                 |
//! | actual set        | `actual()`           | checkout paths + git queries  |
//! | patches           | `patches()`          | declared + actual             |
//!
//! Running commands only needs the checkout paths, never the manifest.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::{debug, warn};
use serde::Serialize;

use crate::defaults::{DEFAULT_MANIFEST_FILENAME, MARKER_DIR};
use crate::engine::{run_concurrently, Checkout, ExecutionStream};
use crate::error::{Error, Result};
use crate::manifest;
use crate::output::OutputConfig;
use crate::repository::{DefaultGitOperations, GitOperations};
use crate::runner::{command_line, Runner};
use crate::scanner::{Discovery, Scanner};
use crate::subrepository::{Subrepositories, Subrepository};

/// How far a workspace has progressed through its lazy computations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceState {
    Uninitialized,
    DeclaredLoaded,
    ActualLoaded,
    Reconciled,
}

/// Changes needed to make the working directory match the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Patches {
    /// Declared but missing from disk.
    pub insertions: Subrepositories,
    /// On disk but not declared.
    pub deletions: Subrepositories,
}

impl Patches {
    pub fn is_empty(&self) -> bool {
        self.insertions.is_empty() && self.deletions.is_empty()
    }
}

/// Outcome of a sequential run.
#[derive(Debug, Default)]
pub struct SequentialReport {
    /// Checkouts the command was run in.
    pub processed: usize,
    /// Per-checkout failures, in run order.
    pub failures: Vec<Error>,
}

/// Outcome of applying patches.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub cloned: Vec<String>,
    /// Insertions whose directory already existed.
    pub skipped: Vec<String>,
    pub pruned: Vec<String>,
    pub failures: Vec<(String, Error)>,
}

/// A working directory and the checkouts below it.
pub struct Workspace {
    working_dir: PathBuf,
    manifest_path: PathBuf,
    marker: String,
    runner: Runner,
    git_ops: Box<dyn GitOperations>,
    checkouts: OnceLock<Vec<PathBuf>>,
    declared: OnceLock<Subrepositories>,
    actual: OnceLock<Subrepositories>,
    patches: OnceLock<Patches>,
}

impl Workspace {
    /// Create a workspace rooted at `working_dir` with the default manifest
    /// name, marker and system git.
    pub fn new<P: AsRef<Path>>(working_dir: P) -> Self {
        let working_dir = working_dir.as_ref().to_path_buf();
        Self {
            manifest_path: working_dir.join(DEFAULT_MANIFEST_FILENAME),
            working_dir,
            marker: MARKER_DIR.to_string(),
            runner: Runner::new(),
            git_ops: Box::new(DefaultGitOperations),
            checkouts: OnceLock::new(),
            declared: OnceLock::new(),
            actual: OnceLock::new(),
            patches: OnceLock::new(),
        }
    }

    /// Use a different manifest file. Relative paths resolve against the
    /// working directory.
    pub fn with_manifest<P: AsRef<Path>>(mut self, manifest: P) -> Self {
        self.manifest_path = self.working_dir.join(manifest);
        self
    }

    pub fn with_marker(mut self, marker: &str) -> Self {
        self.marker = marker.to_string();
        self
    }

    pub fn with_runner(mut self, runner: Runner) -> Self {
        self.runner = runner;
        self
    }

    /// Replace the git implementation, mainly for tests.
    pub fn with_git_operations(mut self, git_ops: Box<dyn GitOperations>) -> Self {
        self.git_ops = git_ops;
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    pub fn state(&self) -> WorkspaceState {
        if self.patches.get().is_some() {
            WorkspaceState::Reconciled
        } else if self.actual.get().is_some() {
            WorkspaceState::ActualLoaded
        } else if self.declared.get().is_some() {
            WorkspaceState::DeclaredLoaded
        } else {
            WorkspaceState::Uninitialized
        }
    }

    /// Absolute paths of every checkout below the working directory, in walk
    /// order. Discovery errors are fatal.
    pub fn checkout_paths(&self) -> Result<&[PathBuf]> {
        if let Some(paths) = self.checkouts.get() {
            return Ok(paths);
        }
        let paths = self.scanner().collect()?;
        debug!("discovered {} checkouts", paths.len());
        Ok(self.checkouts.get_or_init(|| paths))
    }

    /// Stream checkouts below the working directory as the walk finds them.
    ///
    /// Bypasses the cache; every call re-walks the tree.
    pub fn discover(&self) -> Discovery {
        self.scanner().discover()
    }

    fn scanner(&self) -> Scanner {
        Scanner::new(&self.working_dir).with_marker(&self.marker)
    }

    /// `path` relative to the working directory, `.` for the directory itself.
    /// Paths outside it are returned unchanged.
    pub fn relative(&self, path: &Path) -> String {
        match path.strip_prefix(&self.working_dir) {
            Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
            Ok(rel) => rel.to_string_lossy().into_owned(),
            Err(_) => path.to_string_lossy().into_owned(),
        }
    }

    /// Checkouts paired with their display names.
    pub fn checkouts(&self) -> Result<Vec<Checkout>> {
        Ok(self
            .checkout_paths()?
            .iter()
            .map(|path| Checkout::new(&self.relative(path), path.clone()))
            .collect())
    }

    /// The set declared in the manifest.
    ///
    /// A missing or malformed manifest is logged and treated as empty.
    pub fn declared(&self) -> &Subrepositories {
        self.declared.get_or_init(|| {
            match manifest::from_file(&self.manifest_path) {
                Ok(mut subs) => {
                    subs.sort();
                    subs
                }
                Err(Error::Io(e)) if e.kind() == ErrorKind::NotFound => {
                    warn!(
                        "manifest {} does not exist. Skipping",
                        self.manifest_path.display()
                    );
                    Subrepositories::new()
                }
                Err(e) => {
                    warn!(
                        "invalid manifest {}: {}. Skipping",
                        self.manifest_path.display(),
                        e
                    );
                    Subrepositories::new()
                }
            }
        })
    }

    /// The set found on disk, with branch and remote read from each checkout.
    ///
    /// The working directory itself is never part of the set. A checkout
    /// whose branch or `origin` cannot be read makes the whole call fail.
    pub fn actual(&self) -> Result<&Subrepositories> {
        if let Some(subs) = self.actual.get() {
            return Ok(subs);
        }

        let mut subs = Subrepositories::new();
        for path in self.checkout_paths()? {
            let rel = self.relative(path);
            if rel == "." {
                continue;
            }
            let branch = self.git_ops.current_branch(path)?;
            let remote = self.git_ops.remote_origin(path)?;
            subs.push(Subrepository::new(&rel, &remote, &branch));
        }
        subs.sort();

        Ok(self.actual.get_or_init(|| subs))
    }

    /// Insertions and deletions that turn the actual set into the declared
    /// one. Paths present in both are never reported, even if their remote or
    /// branch differ.
    pub fn patches(&self) -> Result<&Patches> {
        if let Some(patches) = self.patches.get() {
            return Ok(patches);
        }

        let target = self.declared();
        let current = self.actual()?;
        let (mut insertions, mut deletions) = current.diff(target);
        insertions.sort();
        deletions.sort();

        Ok(self.patches.get_or_init(|| Patches {
            insertions,
            deletions,
        }))
    }

    /// Run `command args...` in every checkout, one at a time, with the
    /// terminal attached.
    ///
    /// A header naming the checkout is written to `out` before each run and
    /// failures are reported there without stopping the loop.
    pub fn exec_sequentially<W: Write>(
        &self,
        command: &str,
        args: &[String],
        out: &mut W,
        config: &OutputConfig,
    ) -> Result<SequentialReport> {
        let mut report = SequentialReport::default();
        let line = command_line(command, args);

        for checkout in self.checkouts()? {
            report.processed += 1;
            writeln!(out, "{}$ {}", config.checkout(&checkout.name), line)?;
            out.flush()?;

            if let Err(e) = self.runner.interactive(&checkout.dir, command, args) {
                writeln!(out, "Error running '{}':\n    {}", line, e)?;
                report.failures.push(e);
            }
        }
        Ok(report)
    }

    /// Run `command args...` in every checkout concurrently, without a
    /// terminal. The returned stream must be drained by the caller.
    pub fn exec_concurrently(&self, command: &str, args: &[String]) -> Result<ExecutionStream> {
        let checkouts = self.checkouts()?;
        Ok(run_concurrently(&self.runner, checkouts, command, args))
    }

    /// Clone every missing checkout and, with `prune`, delete every checkout
    /// that is not declared. Failures are collected per checkout.
    pub fn apply_patches(&self, prune: bool) -> Result<SyncReport> {
        let patches = self.patches()?;
        let mut report = SyncReport::default();

        for sub in &patches.insertions {
            if self.working_dir.join(sub.rel()).exists() {
                report.skipped.push(sub.rel().to_string());
                continue;
            }
            match self.git_ops.clone_into(
                &self.working_dir,
                sub.rel(),
                sub.remote(),
                sub.branch(),
            ) {
                Ok(_) => report.cloned.push(sub.rel().to_string()),
                Err(e) => report.failures.push((sub.rel().to_string(), e)),
            }
        }

        if prune {
            for sub in &patches.deletions {
                let path = self.working_dir.join(sub.rel());
                match fs::remove_dir_all(&path) {
                    Ok(()) => report.pruned.push(sub.rel().to_string()),
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => report.failures.push((sub.rel().to_string(), e.into())),
                }
            }
        }

        Ok(report)
    }

    /// Write `subs` to the manifest file in normalized form.
    pub fn write_manifest(&self, subs: &Subrepositories) -> Result<()> {
        manifest::to_file(&self.manifest_path, subs)
    }
}
