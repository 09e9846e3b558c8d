//! Default values for forall configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

/// Name of the directory whose presence marks a checkout root.
pub const MARKER_DIR: &str = ".git";

/// Default manifest file name, resolved relative to the working directory.
///
/// Can be overridden by the `--manifest` CLI flag or the `FORALL_MANIFEST`
/// environment variable.
pub const DEFAULT_MANIFEST_FILENAME: &str = ".sbr";

/// Branch assumed for manifest records before any branch header is seen.
pub const DEFAULT_BRANCH: &str = "master";

/// Characters trimmed from both ends of captured command output.
pub const TRIM_CHARS: &[char] = &['\n', ' ', '\t', '\r'];
