//! # List Command Implementation
//!
//! This module implements the `list` subcommand, a dry run that prints every
//! checkout `run` would visit without running anything.

use std::io::{self, Write};

use anyhow::Result;
use clap::Args;

use forall::output::OutputConfig;
use forall::workspace::Workspace;

use crate::cli::Context;

/// List checkouts without running anything
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print absolute paths instead of paths relative to the working directory.
    #[arg(long)]
    pub absolute: bool,

    /// Show only the number of checkouts.
    #[arg(long, conflicts_with = "absolute")]
    pub count: bool,
}

/// Execute the `list` command.
pub fn execute(args: ListArgs, ctx: &Context) -> Result<()> {
    let workspace = ctx.workspace();
    list(&args, &workspace, &ctx.output, &mut io::stdout())
}

fn list<W: Write>(
    args: &ListArgs,
    workspace: &Workspace,
    config: &OutputConfig,
    out: &mut W,
) -> Result<()> {
    let mut total = 0;

    // Paths are printed as the walk finds them.
    for path in workspace.discover() {
        let path = path?;
        total += 1;
        if args.count {
            continue;
        }
        let name = if args.absolute {
            path.display().to_string()
        } else {
            workspace.relative(&path)
        };
        writeln!(out, "{}", config.checkout(&name))?;
    }

    if args.count {
        writeln!(out, "{}", total)?;
    } else {
        writeln!(out, "Done ({} repositories)", config.number(total))?;
    }
    Ok(())
}
