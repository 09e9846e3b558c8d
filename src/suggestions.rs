//! # Error Suggestions
//!
//! This module provides helper functions for generating helpful error
//! messages with hints and suggestions. Errors should tell users what went
//! wrong AND how to fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use forall::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("Manifest not found: {}", path.display());
//!
//! // Use:
//! return Err(suggestions::manifest_not_found(path));
//! ```

use std::path::Path;

use crate::error::Error;

/// Generate an error for when the manifest file does not exist.
///
/// Includes hints about:
/// - Creating one from the working tree with `snapshot`
/// - Using the --manifest flag
/// - Using the FORALL_MANIFEST environment variable
pub fn manifest_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Manifest not found: {path}\n\n\
         hint: Run 'forall snapshot' to record the checkouts found on disk\n\
         hint: Use --manifest to specify a different file\n\
         hint: Set FORALL_MANIFEST environment variable",
        path = path.display()
    )
}

/// Generate an error for a manifest that cannot be parsed.
///
/// Points at the offending line when the parser reported one.
pub fn manifest_invalid(path: &Path, error: &Error) -> anyhow::Error {
    let hint = match error {
        Error::ManifestParse { message, .. } if message.contains("quote") => {
            "hint: Check for an unclosed quote on that line"
        }
        Error::ManifestParse { .. } => {
            "hint: Each record is `path remote` under a `branch` header line"
        }
        _ => "hint: Check that the file is readable",
    };
    anyhow::anyhow!(
        "Invalid manifest {path}: {error}\n\n{hint}",
        path = path.display()
    )
}

/// Generate an error for when a command that needs checkouts finds none.
///
/// Includes hints about choosing a different working directory.
pub fn no_checkouts(dir: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "No git checkouts found below {dir}\n\n\
         hint: Use --working-dir to point at the workspace root\n\
         hint: Set FORALL_WORKING_DIR environment variable",
        dir = dir.display()
    )
}
