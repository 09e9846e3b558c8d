//! # Concurrent Execution Engine
//!
//! Fans one command out across many checkouts and merges the results onto a
//! single stream.
//!
//! ## Design
//!
//! - One worker thread per checkout, no pool bound. The number of checkouts a
//!   person manages is small enough for that.
//! - Each worker runs the command in captured mode. On success it sends one
//!   [`Execution`] over a rendezvous channel, so a worker only finishes once
//!   the consumer has taken its result. On failure it sends nothing.
//! - A coordinator thread joins every worker, collects the failures and then
//!   drops the last sender, which ends the stream.
//!
//! The stream is unordered (completion order) and yields at most one item per
//! checkout. Failures never reach it: they are logged when they happen and
//! handed back by [`ExecutionStream::finish`].
//!
//! The stream must be consumed while the workers run. Dropping it, or calling
//! `finish` early, disconnects the channel and lets blocked workers exit.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use log::{debug, info};
use serde::Serialize;

use crate::runner::{command_line, Runner};

/// A checkout to run a command in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    /// Identifier shown to the user, usually the path relative to the
    /// working directory.
    pub name: String,
    /// Absolute directory the command runs in.
    pub dir: PathBuf,
}

impl Checkout {
    pub fn new(name: &str, dir: PathBuf) -> Self {
        Self {
            name: name.to_string(),
            dir,
        }
    }
}

/// The successful result of one command in one checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Execution {
    pub checkout: String,
    pub command: String,
    pub args: Vec<String>,
    pub output: String,
}

/// A command that failed to launch, exited non-zero or timed out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskFailure {
    pub checkout: String,
    pub dir: PathBuf,
    pub command: String,
    pub args: Vec<String>,
    pub message: String,
}

impl TaskFailure {
    /// The command as the user would re-run it.
    pub fn command_line(&self) -> String {
        command_line(&self.command, &self.args)
    }
}

enum TaskOutcome {
    Succeeded,
    Failed(TaskFailure),
}

/// Run `command args...` in every checkout concurrently.
pub fn run_concurrently<I>(
    runner: &Runner,
    checkouts: I,
    command: &str,
    args: &[String],
) -> ExecutionStream
where
    I: IntoIterator<Item = Checkout>,
{
    let (sender, receiver) = mpsc::sync_channel::<Execution>(0);
    let mut workers = Vec::new();

    for checkout in checkouts {
        let sender = sender.clone();
        let runner = runner.clone();
        let command = command.to_string();
        let args = args.to_vec();
        let name = checkout.name.clone();

        debug!("launching '{}' in {}", command_line(&command, &args), name);
        let worker = thread::spawn(move || {
            match runner.captured(&checkout.dir, &command, &args) {
                Ok(output) => {
                    let execution = Execution {
                        checkout: checkout.name,
                        command,
                        args,
                        output,
                    };
                    if sender.send(execution).is_err() {
                        debug!("result stream closed before delivery");
                    }
                    TaskOutcome::Succeeded
                }
                Err(e) => {
                    info!(
                        "{}$ {}: {}",
                        checkout.name,
                        command_line(&command, &args),
                        e
                    );
                    TaskOutcome::Failed(TaskFailure {
                        checkout: checkout.name,
                        dir: checkout.dir,
                        command,
                        args,
                        message: e.to_string(),
                    })
                }
            }
        });
        workers.push((name, worker));
    }

    let launched = workers.len();
    let failed_command = command.to_string();
    let failed_args = args.to_vec();

    let coordinator = thread::spawn(move || {
        let mut failures = Vec::new();
        for (name, worker) in workers {
            match worker.join() {
                Ok(TaskOutcome::Succeeded) => {}
                Ok(TaskOutcome::Failed(failure)) => failures.push(failure),
                Err(_) => failures.push(TaskFailure {
                    checkout: name,
                    dir: PathBuf::new(),
                    command: failed_command.clone(),
                    args: failed_args.clone(),
                    message: "worker panicked".to_string(),
                }),
            }
        }
        // Every worker is done: dropping the last sender closes the stream.
        drop(sender);
        failures
    });

    ExecutionStream {
        receiver: Some(receiver),
        coordinator: Some(coordinator),
        launched,
    }
}

/// Results of a concurrent run, in completion order.
pub struct ExecutionStream {
    receiver: Option<Receiver<Execution>>,
    coordinator: Option<JoinHandle<Vec<TaskFailure>>>,
    launched: usize,
}

impl ExecutionStream {
    /// Number of commands launched, successful or not.
    pub fn launched(&self) -> usize {
        self.launched
    }

    /// Close the stream, wait for every worker and return the failures.
    ///
    /// Results not consumed yet are dropped.
    pub fn finish(mut self) -> Vec<TaskFailure> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Vec<TaskFailure> {
        self.receiver.take();
        match self.coordinator.take() {
            Some(coordinator) => coordinator.join().unwrap_or_default(),
            None => Vec::new(),
        }
    }
}

impl Iterator for ExecutionStream {
    type Item = Execution;

    fn next(&mut self) -> Option<Self::Item> {
        self.receiver.as_ref()?.recv().ok()
    }
}

impl Drop for ExecutionStream {
    fn drop(&mut self) {
        self.shutdown();
    }
}
