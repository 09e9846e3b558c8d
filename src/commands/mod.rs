//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the `forall`
//! command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` plus the shared
//!   [`Context`](crate::cli::Context) and performs the command's logic by
//!   calling into the `forall` library.

pub mod completions;
pub mod diff;
pub mod format;
pub mod list;
pub mod pull;
pub mod run;
pub mod snapshot;
pub mod sync;
