//! # Command Runner
//!
//! Runs one external command in one checkout directory, in one of two modes:
//!
//! - **Interactive**: the child inherits this process's stdin, stdout and
//!   stderr, so it can prompt, page or use terminal escape codes. The call
//!   blocks until the child exits.
//! - **Captured**: stdin is closed, stdout and stderr share a single pipe and
//!   are buffered in memory. The buffered text is returned trimmed. A non-zero
//!   exit discards the output and returns an error instead.
//!
//! Captured mode accepts an optional deadline. A command still running when it
//! expires is killed and reported as [`Error::CommandTimeout`].

use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::debug;

use crate::defaults::TRIM_CHARS;
use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Render `command args...` the way a user would type it.
pub fn command_line(command: &str, args: &[String]) -> String {
    if args.is_empty() {
        command.to_string()
    } else {
        format!("{} {}", command, args.join(" "))
    }
}

/// Runs external commands inside checkout directories.
#[derive(Debug, Clone, Default)]
pub struct Runner {
    timeout: Option<Duration>,
}

impl Runner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the deadline applied to captured commands. `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run with the terminal attached and wait for the command to exit.
    pub fn interactive(&self, dir: &Path, command: &str, args: &[String]) -> Result<()> {
        let status = Command::new(command)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| command_error(dir, command, args, e.to_string()))?;

        check_status(dir, command, args, status)
    }

    /// Run without a terminal and return the merged, trimmed output.
    pub fn captured(&self, dir: &Path, command: &str, args: &[String]) -> Result<String> {
        let (mut reader, writer) = io::pipe()?;

        let mut child = {
            let mut cmd = Command::new(command);
            cmd.args(args)
                .current_dir(dir)
                .stdin(Stdio::null())
                .stdout(writer.try_clone()?)
                .stderr(writer);
            cmd.spawn()
                .map_err(|e| command_error(dir, command, args, e.to_string()))?
            // `cmd` drops here, closing our copies of the write end so the
            // reader sees EOF once the child exits.
        };

        let collector = thread::spawn(move || -> io::Result<Vec<u8>> {
            let mut buffer = Vec::new();
            reader.read_to_end(&mut buffer)?;
            Ok(buffer)
        });

        let status = match self.timeout {
            None => child.wait()?,
            Some(limit) => match wait_with_deadline(&mut child, limit)? {
                Some(status) => status,
                None => {
                    // Leave the collector detached: a surviving grandchild may
                    // still hold the pipe open.
                    return Err(Error::CommandTimeout {
                        dir: dir.to_path_buf(),
                        command: command_line(command, args),
                        timeout: limit,
                    });
                }
            },
        };

        let buffer = collector.join().map_err(|_| Error::Command {
            dir: dir.to_path_buf(),
            command: command_line(command, args),
            message: "output collector panicked".to_string(),
        })??;
        let output = String::from_utf8_lossy(&buffer);

        if !status.success() {
            debug!(
                "discarding {} bytes of output from failed '{}' in {}",
                buffer.len(),
                command_line(command, args),
                dir.display()
            );
        }
        check_status(dir, command, args, status)?;

        Ok(output.trim_matches(TRIM_CHARS).to_string())
    }
}

/// Wait for `child` for at most `limit`. Kills it and returns `None` on expiry.
fn wait_with_deadline(child: &mut Child, limit: Duration) -> io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            child.kill()?;
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn check_status(dir: &Path, command: &str, args: &[String], status: ExitStatus) -> Result<()> {
    if status.success() {
        Ok(())
    } else {
        Err(command_error(dir, command, args, status.to_string()))
    }
}

fn command_error(dir: &Path, command: &str, args: &[String], message: String) -> Error {
    Error::Command {
        dir: dir.to_path_buf(),
        command: command_line(command, args),
        message,
    }
}
