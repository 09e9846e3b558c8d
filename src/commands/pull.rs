//! # Pull Command Implementation
//!
//! This module implements the `pull` subcommand, which fast-forwards every
//! checkout concurrently with `git pull --ff-only` and prints each result as
//! it arrives. A checkout that cannot be fast-forwarded is reported and left
//! untouched.

use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::Args;

use forall::postprocess;
use forall::runner::Runner;

use crate::cli::Context;

const PULL_ARGS: [&str; 2] = ["pull", "--ff-only"];

/// Fast-forward every checkout
#[derive(Args, Debug)]
pub struct PullArgs {
    /// Kill pulls still running after this many seconds.
    #[arg(long, value_name = "SECS", env = "FORALL_TIMEOUT")]
    pub timeout: Option<u64>,
}

/// Execute the `pull` command.
pub fn execute(args: PullArgs, ctx: &Context) -> Result<()> {
    let runner = Runner::new().with_timeout(args.timeout.map(Duration::from_secs));
    let workspace = ctx.workspace().with_runner(runner);
    let pull_args: Vec<String> = PULL_ARGS.iter().map(|s| s.to_string()).collect();

    let mut stream = workspace.exec_concurrently("git", &pull_args)?;
    let launched = stream.launched();
    let updated = postprocess::print(stream.by_ref(), &mut io::stdout(), &ctx.output)?;

    let failures = stream.finish();
    for failure in &failures {
        eprintln!(
            "{} Error running '{}' in {}:\n    {}",
            ctx.output.removed("!"),
            failure.command_line(),
            ctx.output.checkout(&failure.checkout),
            failure.message
        );
    }

    println!(
        "Done ({} repositories, {} pulled, {} failed)",
        ctx.output.number(launched),
        updated,
        failures.len()
    );
    Ok(())
}
