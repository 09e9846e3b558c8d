//! # Sync Command Implementation
//!
//! This module implements the `sync` subcommand, which makes the working
//! directory match the manifest: every declared checkout missing from disk is
//! cloned, and with `--prune` every undeclared checkout is deleted.
//!
//! Checkouts that fail to clone are reported and do not stop the others.

use std::io::{self, Write};

use anyhow::Result;
use clap::Args;

use forall::output::OutputConfig;
use forall::workspace::SyncReport;

use crate::cli::Context;

/// Clone checkouts missing from disk, optionally removing undeclared ones
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Also delete checkouts that are not in the manifest.
    #[arg(long)]
    pub prune: bool,
}

/// Execute the `sync` command.
pub fn execute(args: SyncArgs, ctx: &Context) -> Result<()> {
    let workspace = ctx.workspace();
    let report = workspace.apply_patches(args.prune)?;
    render(&report, &ctx.output, &mut io::stdout())?;

    if !report.failures.is_empty() {
        anyhow::bail!("{} checkouts could not be synchronized", report.failures.len());
    }
    Ok(())
}

fn render<W: Write>(report: &SyncReport, config: &OutputConfig, out: &mut W) -> Result<()> {
    for rel in &report.cloned {
        writeln!(out, "{} {}", config.added("cloned"), config.checkout(rel))?;
    }
    for rel in &report.skipped {
        writeln!(out, "skipped {} (directory exists)", config.checkout(rel))?;
    }
    for rel in &report.pruned {
        writeln!(out, "{} {}", config.removed("pruned"), config.checkout(rel))?;
    }
    for (rel, error) in &report.failures {
        writeln!(out, "{} {}: {}", config.removed("failed"), config.checkout(rel), error)?;
    }
    writeln!(
        out,
        "Done ({} cloned, {} pruned)",
        config.number(report.cloned.len()),
        config.number(report.pruned.len())
    )?;
    Ok(())
}
