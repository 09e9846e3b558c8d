//! # Format Command Implementation
//!
//! This module implements the `format` subcommand, which rewrites the manifest
//! in normalized form: records sorted by branch then path, one branch header
//! per group, and no legacy 3- or 4-field records.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::Result;
use clap::Args;

use forall::error::Error;
use forall::manifest;
use forall::suggestions;

use crate::cli::Context;

/// Rewrite the manifest in normalized form
#[derive(Args, Debug)]
pub struct FormatArgs {
    /// Only check whether the manifest is normalized. Exits with an error if not.
    #[arg(long)]
    pub check: bool,
}

/// Execute the `format` command.
pub fn execute(args: FormatArgs, ctx: &Context) -> Result<()> {
    let path = ctx.workspace().manifest_path().to_path_buf();
    let changed = format_file(&path, args.check)?;

    match (args.check, changed) {
        (true, true) => anyhow::bail!("{} is not normalized", path.display()),
        (true, false) | (false, false) => println!("{} is already normalized", path.display()),
        (false, true) => println!("Formatted {}", path.display()),
    }
    Ok(())
}

/// Normalize the manifest at `path`, returning whether its content changed.
/// With `check_only`, nothing is written.
fn format_file(path: &Path, check_only: bool) -> Result<bool> {
    let original = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(suggestions::manifest_not_found(path))
        }
        Err(e) => return Err(Error::from(e).into()),
    };

    let subs = manifest::parse(&original).map_err(|e| suggestions::manifest_invalid(path, &e))?;
    let normalized = manifest::to_string(&subs);
    if normalized == original {
        return Ok(false);
    }

    if !check_only {
        manifest::to_file(path, &subs)?;
    }
    Ok(true)
}
