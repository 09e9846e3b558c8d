//! # Error Handling
//!
//! This module defines the centralized error type for the `forall` library.
//! It uses `thiserror` to build one `Error` enum covering every failure mode,
//! grouped the way the rest of the crate reports them:
//!
//! - **Discovery errors**: the filesystem walk failed. These are fatal to the
//!   whole discovery operation.
//! - **Per-checkout command errors**: one external command failed to launch,
//!   exited non-zero or ran past its deadline. They only concern that checkout.
//! - **Aggregation errors**: a post-processor could not interpret one output.
//! - **Manifest errors**: the manifest file is malformed. Callers degrade these
//!   to an empty declared set.
//! - **Version-control errors**: reading a checkout's branch or remote, or
//!   cloning a missing one, failed.
//!
//! The `Result` alias is used throughout the library.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for forall operations
#[derive(Error, Debug)]
pub enum Error {
    /// Walking the working directory failed.
    #[error("Discovery error under {}: {message}", root.display())]
    Discovery { root: PathBuf, message: String },

    /// An external command failed to launch or exited with a failure status.
    #[error("Command failed in {}: {command} - {message}", dir.display())]
    Command {
        dir: PathBuf,
        command: String,
        message: String,
    },

    /// An external command was killed after running past its deadline.
    #[error("Command timed out in {} after {timeout:?}: {command}", dir.display())]
    CommandTimeout {
        dir: PathBuf,
        command: String,
        timeout: Duration,
    },

    /// A post-processor expected a number but got something else.
    #[error("Output of {checkout} is not a number: {output:?}")]
    NotANumber { checkout: String, output: String },

    /// The manifest file could not be parsed.
    #[error("Manifest parsing error at line {line}: {message}")]
    ManifestParse { line: usize, message: String },

    /// A version-control query or operation failed for one checkout.
    #[error("Version control error in {}: {operation} - {message}", dir.display())]
    Vcs {
        dir: PathBuf,
        operation: String,
        message: String,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_discovery() {
        let error = Error::Discovery {
            root: PathBuf::from("/w"),
            message: "Permission denied".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Discovery error"));
        assert!(display.contains("/w"));
        assert!(display.contains("Permission denied"));
    }

    #[test]
    fn test_error_display_command() {
        let error = Error::Command {
            dir: PathBuf::from("/w/repo"),
            command: "git status -s".to_string(),
            message: "exit status: 128".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Command failed"));
        assert!(display.contains("/w/repo"));
        assert!(display.contains("git status -s"));
        assert!(display.contains("128"));
    }

    #[test]
    fn test_error_display_timeout() {
        let error = Error::CommandTimeout {
            dir: PathBuf::from("/w/repo"),
            command: "sleep 10".to_string(),
            timeout: Duration::from_secs(2),
        };
        let display = format!("{}", error);
        assert!(display.contains("timed out"));
        assert!(display.contains("2s"));
    }

    #[test]
    fn test_error_display_not_a_number() {
        let error = Error::NotANumber {
            checkout: "lib/a".to_string(),
            output: "x".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("lib/a"));
        assert!(display.contains("\"x\""));
    }

    #[test]
    fn test_error_display_manifest_parse() {
        let error = Error::ManifestParse {
            line: 3,
            message: "expected 1 to 4 fields, found 5".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("line 3"));
        assert!(display.contains("found 5"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }
}
