//! # Output Post-Processors
//!
//! Consumers for an [`ExecutionStream`](crate::engine::ExecutionStream). Each
//! one drains the whole stream before reporting and none of them depends on
//! arrival order or on knowing the result count in advance. An empty stream is
//! valid input for all of them.
//!
//! | Mode          | Result                                                      |
//! |---------------|-------------------------------------------------------------|
//! | `Print`       | each output as it arrives, under a `checkout$ command` line |
//! | `Concatenate` | all outputs in one block, once the stream closes            |
//! | `Sum`         | numeric total; non-numeric outputs reported and skipped     |
//! | `Count`       | histogram of identical outputs                              |
//! | `Digest`      | SHA-1 per checkout plus a combined, order-independent SHA-1 |

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

use log::debug;
use serde::Serialize;
use sha1::{Digest, Sha1};

use crate::engine::Execution;
use crate::error::{Error, Result};
use crate::output::OutputConfig;
use crate::runner::command_line;

/// How results of a concurrent run are reduced and shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Print,
    Concatenate,
    Sum,
    Count,
    Digest,
}

impl OutputMode {
    /// Whether the mode needs every output collected before printing.
    pub fn aggregates(self) -> bool {
        !matches!(self, OutputMode::Print)
    }
}

/// What draining a stream produced besides the printed report.
#[derive(Debug, Default)]
pub struct Processed {
    /// Number of results consumed.
    pub results: usize,
    /// Per-result errors that did not stop the reduction.
    pub item_errors: Vec<Error>,
}

/// Drain `executions` with the processor selected by `mode`, writing the
/// report to `out`. Reports of aggregating modes are written as JSON when
/// `json` is set.
pub fn process<I, W>(
    mode: OutputMode,
    executions: I,
    out: &mut W,
    config: &OutputConfig,
    json: bool,
) -> Result<Processed>
where
    I: IntoIterator<Item = Execution>,
    W: Write,
{
    let mut processed = Processed::default();
    let counted = executions.into_iter().inspect(|_| processed.results += 1);

    match mode {
        OutputMode::Print => {
            print(counted, out, config)?;
        }
        OutputMode::Concatenate => {
            let text = concatenate(counted);
            if json {
                serde_json::to_writer_pretty(&mut *out, &text)?;
                writeln!(out)?;
            } else if !text.is_empty() {
                writeln!(out, "{}", text)?;
            }
        }
        OutputMode::Sum => {
            let report = sum(counted);
            emit(out, &report, json)?;
            processed.item_errors = report.errors;
        }
        OutputMode::Count => emit(out, &count(counted), json)?,
        OutputMode::Digest => emit(out, &digest(counted), json)?,
    }

    Ok(processed)
}

fn emit<W, T>(out: &mut W, report: &T, json: bool) -> Result<()>
where
    W: Write,
    T: Serialize + fmt::Display,
{
    if json {
        serde_json::to_writer_pretty(&mut *out, report)?;
        writeln!(out)?;
    } else {
        write!(out, "{}", report)?;
    }
    Ok(())
}

/// Write each result as it arrives. Returns the number of results.
pub fn print<I, W>(executions: I, out: &mut W, config: &OutputConfig) -> Result<usize>
where
    I: IntoIterator<Item = Execution>,
    W: Write,
{
    let mut count = 0;
    for execution in executions {
        count += 1;
        writeln!(
            out,
            "{}$ {}",
            config.checkout(&execution.checkout),
            command_line(&execution.command, &execution.args)
        )?;
        if !execution.output.is_empty() {
            writeln!(out, "{}", execution.output)?;
        }
        out.flush()?;
    }
    Ok(count)
}

/// Join every non-empty output, one per line.
pub fn concatenate<I>(executions: I) -> String
where
    I: IntoIterator<Item = Execution>,
{
    executions
        .into_iter()
        .map(|e| e.output)
        .filter(|output| !output.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Total of all numeric outputs.
#[derive(Debug, Default, Serialize)]
pub struct SumReport {
    pub total: f64,
    /// Outputs that contributed to the total.
    pub counted: usize,
    #[serde(skip)]
    pub errors: Vec<Error>,
}

impl fmt::Display for SumReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.total)
    }
}

/// Parse each output as a number and add them up.
pub fn sum<I>(executions: I) -> SumReport
where
    I: IntoIterator<Item = Execution>,
{
    let mut report = SumReport::default();
    for execution in executions {
        match execution.output.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => {
                report.total += value;
                report.counted += 1;
            }
            _ => {
                let error = Error::NotANumber {
                    checkout: execution.checkout,
                    output: execution.output,
                };
                debug!("{}", error);
                report.errors.push(error);
            }
        }
    }
    report
}

/// Occurrences of each distinct output.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Histogram {
    counts: BTreeMap<String, usize>,
}

impl Histogram {
    /// Occurrences of `output`, zero when never seen.
    pub fn get(&self, output: &str) -> usize {
        self.counts.get(output).copied().unwrap_or(0)
    }

    /// Number of distinct outputs.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Entries by descending count, then by text.
    pub fn entries(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self
            .counts
            .iter()
            .map(|(text, count)| (text.as_str(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (text, count) in self.entries() {
            writeln!(f, "{:>6} {}", count, text)?;
        }
        Ok(())
    }
}

/// Bucket results by their exact output.
pub fn count<I>(executions: I) -> Histogram
where
    I: IntoIterator<Item = Execution>,
{
    let mut histogram = Histogram::default();
    for execution in executions {
        *histogram.counts.entry(execution.output).or_insert(0) += 1;
    }
    histogram
}

/// Digest of one checkout's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigestEntry {
    pub checkout: String,
    pub digest: String,
}

/// Per-checkout digests, sorted by checkout, and their combined digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigestReport {
    pub entries: Vec<DigestEntry>,
    pub combined: String,
}

impl fmt::Display for DigestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{} {}", entry.digest, entry.checkout)?;
        }
        writeln!(f, "{} (all)", self.combined)
    }
}

fn sha1_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha1::digest(bytes))
}

/// SHA-1 of every output, plus one SHA-1 over all `(checkout, digest)` pairs.
pub fn digest<I>(executions: I) -> DigestReport
where
    I: IntoIterator<Item = Execution>,
{
    let mut entries: Vec<DigestEntry> = executions
        .into_iter()
        .map(|e| DigestEntry {
            digest: sha1_hex(e.output.as_bytes()),
            checkout: e.checkout,
        })
        .collect();
    entries.sort_by(|a, b| a.checkout.cmp(&b.checkout));

    let mut hasher = Sha1::new();
    for entry in &entries {
        hasher.update(entry.checkout.as_bytes());
        hasher.update(b"\0");
        hasher.update(entry.digest.as_bytes());
        hasher.update(b"\n");
    }
    let combined = format!("{:x}", hasher.finalize());

    DigestReport { entries, combined }
}
