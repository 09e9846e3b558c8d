//! # forall
//!
//! This library manages a tree of independent git checkouts nested inside one
//! working directory. It is designed to be used by the `forall` command-line
//! tool but can also be embedded in other applications.
//!
//! ## Quick Example
//!
//! ```
//! use forall::subrepository::{Subrepositories, Subrepository};
//!
//! let current: Subrepositories = vec![
//!     Subrepository::new("lib/a", "git@example.com:a.git", "master"),
//! ]
//! .into();
//! let target: Subrepositories = vec![
//!     Subrepository::new("lib/b", "git@example.com:b.git", "master"),
//! ]
//! .into();
//!
//! let (insertions, deletions) = current.diff(&target);
//! assert_eq!(insertions.iter().next().unwrap().rel(), "lib/b");
//! assert_eq!(deletions.iter().next().unwrap().rel(), "lib/a");
//! ```
//!
//! ## Core Concepts
//!
//! - **Discovery (`scanner`)**: walks the working directory and reports every
//!   directory holding a `.git` directory, without descending into the `.git`
//!   directory itself.
//! - **Subrepository sets (`subrepository`, `manifest`)**: the declared
//!   `(path, remote, branch)` records, their canonical order, and the
//!   reconciliation between what is declared and what is on disk.
//! - **Execution (`runner`, `engine`, `postprocess`)**: run one command in every
//!   checkout, either one after the other with the terminal attached, or all at
//!   once with the outputs collected and reduced (printed, concatenated,
//!   summed, counted or digested).
//! - **Workspace (`workspace`)**: ties the above together for one working
//!   directory, computing each derived value lazily and once.

pub mod defaults;
pub mod engine;
pub mod error;
pub mod git;
pub mod manifest;
pub mod output;
pub mod postprocess;
pub mod repository;
pub mod runner;
pub mod scanner;
pub mod subrepository;
pub mod suggestions;
pub mod workspace;

#[cfg(test)]
mod subrepository_proptest;
