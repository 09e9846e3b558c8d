//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;

use forall::defaults::DEFAULT_MANIFEST_FILENAME;
use forall::output::OutputConfig;
use forall::workspace::Workspace;

use crate::commands;

/// forall - Run a command in every git checkout of a workspace
#[derive(Parser, Debug)]
#[command(name = "forall")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// The workspace root. Defaults to the current directory.
    #[arg(long, global = true, value_name = "DIR", env = "FORALL_WORKING_DIR")]
    working_dir: Option<PathBuf>,

    /// Manifest file, relative to the workspace root.
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        env = "FORALL_MANIFEST",
        default_value = DEFAULT_MANIFEST_FILENAME
    )]
    manifest: PathBuf,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a command in every checkout
    Run(commands::run::RunArgs),

    /// List checkouts without running anything
    #[command(alias = "ls")]
    List(commands::list::ListArgs),

    /// Show checkouts to clone or remove to match the manifest
    Diff(commands::diff::DiffArgs),

    /// Clone checkouts missing from disk, optionally removing undeclared ones
    Sync(commands::sync::SyncArgs),

    /// Fast-forward every checkout with `git pull --ff-only`
    Pull(commands::pull::PullArgs),

    /// Write the checkouts found on disk to the manifest
    Snapshot(commands::snapshot::SnapshotArgs),

    /// Rewrite the manifest in normalized form
    Format(commands::format::FormatArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

/// Settings shared by every subcommand.
pub struct Context {
    pub working_dir: PathBuf,
    pub manifest: PathBuf,
    pub output: OutputConfig,
}

impl Context {
    /// Build the workspace for this invocation.
    pub fn workspace(&self) -> Workspace {
        Workspace::new(&self.working_dir).with_manifest(&self.manifest)
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        let working_dir = match self.working_dir {
            Some(dir) => dir,
            None => std::env::current_dir().context("Cannot determine the current directory")?,
        };
        let working_dir = working_dir
            .canonicalize()
            .with_context(|| format!("Cannot open working directory {}", working_dir.display()))?;

        let ctx = Context {
            working_dir,
            manifest: self.manifest,
            output: OutputConfig::from_env_and_flag(&self.color),
        };

        match self.command {
            Commands::Run(args) => commands::run::execute(args, &ctx),
            Commands::List(args) => commands::list::execute(args, &ctx),
            Commands::Diff(args) => commands::diff::execute(args, &ctx),
            Commands::Sync(args) => commands::sync::execute(args, &ctx),
            Commands::Pull(args) => commands::pull::execute(args, &ctx),
            Commands::Snapshot(args) => commands::snapshot::execute(args, &ctx),
            Commands::Format(args) => commands::format::execute(args, &ctx),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// Configure `env_logger` from `--log-level`. `RUST_LOG` still wins when set.
fn init_logging(level: &str) {
    let filter = level.parse::<LevelFilter>().unwrap_or(LevelFilter::Warn);
    let _ = env_logger::Builder::new()
        .filter_level(filter)
        .parse_default_env()
        .format_timestamp(None)
        .try_init();
}
