//! # Manifest Files
//!
//! The manifest (`.sbr` by default) declares which checkouts should exist in
//! the working directory, where they come from and which branch they track.
//!
//! ## Format
//!
//! One record per line, fields separated by whitespace, optionally quoted:
//!
//! ```text
//! # comment
//! "lib/core" "git@example.com:core.git"
//! "develop"
//! "tools/cli" "git@example.com:cli.git"
//! ```
//!
//! - 1 field: branch header, applies to the records that follow.
//! - 2 fields: `path remote`, under the current branch.
//! - 3 fields: `path remote branch`, accepted but not normalized.
//! - 4 fields: legacy `name path remote branch`, the first field is ignored.
//!
//! Records before any branch header use [`DEFAULT_BRANCH`]. The writer always
//! produces the normalized 1/2-field form, sorted by branch then path.

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use log::warn;

use crate::defaults::DEFAULT_BRANCH;
use crate::error::{Error, Result};
use crate::subrepository::{Subrepositories, Subrepository};

/// Parse manifest text.
pub fn parse(content: &str) -> Result<Subrepositories> {
    read(content.as_bytes())
}

/// Parse a manifest from any buffered reader.
pub fn read<R: BufRead>(reader: R) -> Result<Subrepositories> {
    let mut subs = Subrepositories::new();
    let mut branch = DEFAULT_BRANCH.to_string();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let number = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields = shlex::split(trimmed).ok_or_else(|| Error::ManifestParse {
            line: number,
            message: "unbalanced quotes".to_string(),
        })?;

        // Paths, remotes and branches reach git's argv.
        if let Some(field) = fields.iter().find(|f| f.starts_with('-')) {
            return Err(Error::ManifestParse {
                line: number,
                message: format!("field {:?} must not start with '-'", field),
            });
        }

        match fields.as_slice() {
            [header] => branch = header.clone(),
            [rel, remote] => subs.push(Subrepository::new(rel, remote, &branch)),
            [rel, remote, explicit] => {
                warn!(
                    "Subrepository {:?} format is not normalized. Use 'forall format' to fix it.",
                    rel
                );
                subs.push(Subrepository::new(rel, remote, explicit));
            }
            [_, rel, remote, explicit] => {
                warn!(
                    "Subrepository {:?} uses legacy format. Use 'forall format' to fix it.",
                    rel
                );
                subs.push(Subrepository::new(rel, remote, explicit));
            }
            _ => {
                return Err(Error::ManifestParse {
                    line: number,
                    message: format!("expected 1 to 4 fields, found {}", fields.len()),
                })
            }
        }
    }

    Ok(subs)
}

/// Read and parse a manifest file.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Subrepositories> {
    let file = fs::File::open(path.as_ref())?;
    read(BufReader::new(file))
}

/// Write `subs` in normalized form.
///
/// Records are sorted first; a branch header is emitted whenever the branch
/// differs from the previous record's (the first comparison is against the
/// default branch).
pub fn write<W: Write>(writer: &mut W, subs: &Subrepositories) -> Result<()> {
    let mut previous = DEFAULT_BRANCH;
    let sorted = subs.sorted();

    for sub in &sorted {
        if sub.branch() != previous {
            writeln!(writer, "{}", quote(sub.branch()))?;
        }
        writeln!(writer, "{} {}", quote(sub.rel()), quote(sub.remote()))?;
        previous = sub.branch();
    }
    Ok(())
}

/// Render `subs` as manifest text.
pub fn to_string(subs: &Subrepositories) -> String {
    let mut buffer = Vec::new();
    // Writing to a Vec cannot fail.
    let _ = write(&mut buffer, subs);
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Write `subs` to a manifest file, replacing it.
pub fn to_file<P: AsRef<Path>>(path: P, subs: &Subrepositories) -> Result<()> {
    let mut file = fs::File::create(path.as_ref())?;
    write(&mut file, subs)?;
    file.flush()?;
    Ok(())
}

/// Double-quote a field so the reader splits it back unchanged.
fn quote(field: &str) -> String {
    let mut quoted = String::with_capacity(field.len() + 2);
    quoted.push('"');
    for ch in field.chars() {
        if matches!(ch, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}
