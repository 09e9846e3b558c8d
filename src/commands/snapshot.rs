//! # Snapshot Command Implementation
//!
//! This module implements the `snapshot` subcommand, which records the
//! checkouts found on disk (path, `origin` remote and current branch) in the
//! manifest, replacing its previous content.

use anyhow::{Context as _, Result};
use clap::Args;

use forall::suggestions;

use crate::cli::Context;

/// Write the checkouts found on disk to the manifest
#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Print the manifest instead of writing it.
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute the `snapshot` command.
pub fn execute(args: SnapshotArgs, ctx: &Context) -> Result<()> {
    let workspace = ctx.workspace();
    let actual = workspace.actual()?;

    if actual.is_empty() {
        return Err(suggestions::no_checkouts(workspace.working_dir()));
    }

    if args.dry_run {
        print!("{}", forall::manifest::to_string(actual));
        return Ok(());
    }

    workspace.write_manifest(actual).with_context(|| {
        format!(
            "Failed to write manifest {}",
            workspace.manifest_path().display()
        )
    })?;
    println!(
        "Wrote {} checkouts to {}",
        ctx.output.number(actual.len()),
        workspace.manifest_path().display()
    );
    Ok(())
}
