//! # Diff Command Implementation
//!
//! This module implements the `diff` subcommand, which compares the checkouts
//! found on disk with the ones declared in the manifest.
//!
//! Lines starting with `+` are declared but missing from disk (`sync` would
//! clone them). Lines starting with `-` are on disk but not declared
//! (`sync --prune` would remove them). A checkout present in both is never
//! reported, even if its remote or branch changed.
//!
//! This command is read-only and exits successfully whether or not there are
//! differences.

use std::io::{self, Write};

use anyhow::Result;
use clap::Args;

use forall::output::OutputConfig;
use forall::workspace::Patches;

use crate::cli::Context;

/// Show checkouts to clone or remove to match the manifest
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Print the differences as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the `diff` command.
pub fn execute(args: DiffArgs, ctx: &Context) -> Result<()> {
    let workspace = ctx.workspace();
    let patches = workspace.patches()?;
    render(patches, args.json, &ctx.output, &mut io::stdout())
}

fn render<W: Write>(patches: &Patches, json: bool, config: &OutputConfig, out: &mut W) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, patches)?;
        writeln!(out)?;
        return Ok(());
    }

    if patches.is_empty() {
        writeln!(out, "No differences")?;
        return Ok(());
    }

    for sub in &patches.insertions {
        writeln!(out, "{}", config.added(&format!("+ {sub}")))?;
    }
    for sub in &patches.deletions {
        writeln!(out, "{}", config.removed(&format!("- {sub}")))?;
    }
    Ok(())
}
