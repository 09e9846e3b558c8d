//! # Run Command Implementation
//!
//! This module implements the `run` subcommand, which runs one command in
//! every checkout of the workspace.
//!
//! ## Execution modes
//!
//! - **Sequential** (default): one checkout at a time, with stdin, stdout and
//!   stderr passed through. Commands can prompt, page and use colors.
//! - **Concurrent** (`-a`, or any aggregating output flag): every checkout at
//!   once, without a terminal. Outputs are collected and either printed as they
//!   arrive or reduced by `--cat`, `--sum`, `--count` or `--digest`.
//!
//! A failing checkout is reported and never stops the others.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use forall::engine::Execution;
use forall::postprocess::{self, OutputMode};
use forall::runner::Runner;
use forall::workspace::Workspace;

use crate::cli::Context;

/// Run a command in every checkout
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Run concurrently, without access to the terminal.
    #[arg(short = 'a', long = "async")]
    pub concurrent: bool,

    /// Concatenate all outputs and print them once.
    #[arg(long, group = "reduce")]
    pub cat: bool,

    /// Parse each output as a number and print the total.
    #[arg(long, group = "reduce")]
    pub sum: bool,

    /// Count identical outputs and print the histogram.
    #[arg(long, group = "reduce")]
    pub count: bool,

    /// Print the SHA-1 of every output and of all of them together.
    #[arg(long, group = "reduce")]
    pub digest: bool,

    /// Print the reduced result as JSON.
    #[arg(long, requires = "reduce")]
    pub json: bool,

    /// Kill commands still running after this many seconds (concurrent mode).
    #[arg(long, value_name = "SECS", env = "FORALL_TIMEOUT")]
    pub timeout: Option<u64>,

    /// The command to run, followed by its arguments.
    #[arg(
        value_name = "COMMAND",
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,
}

impl RunArgs {
    fn output_mode(&self) -> OutputMode {
        if self.cat {
            OutputMode::Concatenate
        } else if self.sum {
            OutputMode::Sum
        } else if self.count {
            OutputMode::Count
        } else if self.digest {
            OutputMode::Digest
        } else {
            OutputMode::Print
        }
    }
}

/// Execute the `run` command.
pub fn execute(args: RunArgs, ctx: &Context) -> Result<()> {
    let (command, command_args) = args
        .command
        .split_first()
        .ok_or_else(|| anyhow::anyhow!("No command given"))?;

    let runner = Runner::new().with_timeout(args.timeout.map(Duration::from_secs));
    let workspace = ctx.workspace().with_runner(runner);
    let mode = args.output_mode();

    if args.concurrent || mode.aggregates() {
        run_concurrent(&workspace, ctx, mode, args.json, command, command_args)
    } else {
        let mut stdout = io::stdout();
        let report = workspace.exec_sequentially(command, command_args, &mut stdout, &ctx.output)?;
        writeln!(
            stdout,
            "Done ({} repositories)",
            ctx.output.number(report.processed)
        )?;
        Ok(())
    }
}

fn run_concurrent(
    workspace: &Workspace,
    ctx: &Context,
    mode: OutputMode,
    json: bool,
    command: &str,
    args: &[String],
) -> Result<()> {
    let mut stream = workspace.exec_concurrently(command, args)?;
    let launched = stream.launched();
    let mut stdout = io::stdout();

    let processed = if mode.aggregates() {
        let progress = ProgressBar::new(launched as u64);
        progress.set_style(
            ProgressStyle::with_template("{spinner} {pos}/{len} {msg}")?
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "),
        );
        progress.set_message(format!("{} ...", forall::runner::command_line(command, args)));
        progress.enable_steady_tick(Duration::from_millis(100));

        let results: Vec<Execution> = stream.by_ref().inspect(|_| progress.inc(1)).collect();
        progress.finish_and_clear();

        postprocess::process(mode, results, &mut stdout, &ctx.output, json)?
    } else {
        postprocess::process(mode, stream.by_ref(), &mut stdout, &ctx.output, json)?
    };

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
    for error in &processed.item_errors {
        eprintln!("{} {}", ctx.output.removed("!"), error);
    }

    eprintln!(
        "Done ({} repositories, {} failed)",
        ctx.output.number(launched),
        failures.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: RunArgs,
    }

    fn parse(argv: &[&str]) -> RunArgs {
        let mut full = vec!["forall"];
        full.extend_from_slice(argv);
        Harness::try_parse_from(full).unwrap().args
    }

    #[test]
    fn test_trailing_arguments_belong_to_command() {
        let args = parse(&["git", "status", "-s", "--porcelain"]);
        assert_eq!(args.command, vec!["git", "status", "-s", "--porcelain"]);
        assert!(!args.concurrent);
        assert_eq!(args.output_mode(), OutputMode::Print);
    }

    #[test]
    fn test_output_flags_select_mode() {
        assert_eq!(parse(&["--cat", "ls"]).output_mode(), OutputMode::Concatenate);
        assert_eq!(parse(&["--sum", "wc"]).output_mode(), OutputMode::Sum);
        assert_eq!(parse(&["--count", "git"]).output_mode(), OutputMode::Count);
        assert_eq!(parse(&["--digest", "git"]).output_mode(), OutputMode::Digest);
    }

    #[test]
    fn test_output_flags_are_exclusive() {
        let result = Harness::try_parse_from(["forall", "--sum", "--count", "ls"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_json_requires_reduction() {
        let result = Harness::try_parse_from(["forall", "--json", "ls"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_command_is_required() {
        let result = Harness::try_parse_from(["forall", "-a"]);
        assert!(result.is_err());
    }
}
