//! # Subrepository Sets
//!
//! A [`Subrepository`] is the declared or observed description of one
//! checkout: its path relative to the working directory, its remote and its
//! branch. The relative path is the identity key for every set operation.
//!
//! [`Subrepositories`] is an ordered collection of them. Its canonical order
//! sorts by branch first and relative path second, which is also the order the
//! manifest is written in.
//!
//! ## Reconciliation
//!
//! [`Subrepositories::diff`] computes what has to be inserted into and deleted
//! from a current set so that it matches a target set. A path present in both
//! sets is left alone even when its remote or branch differ; updates are not
//! detected.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One checkout as described by the manifest or read from disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subrepository {
    rel: String,
    remote: String,
    branch: String,
}

impl Subrepository {
    pub fn new(rel: &str, remote: &str, branch: &str) -> Self {
        Self {
            rel: rel.to_string(),
            remote: remote.to_string(),
            branch: branch.to_string(),
        }
    }

    /// Path of the checkout relative to the working directory.
    pub fn rel(&self) -> &str {
        &self.rel
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }
}

impl fmt::Display for Subrepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.rel, self.remote, self.branch)
    }
}

impl PartialOrd for Subrepository {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Branch first, relative path second. Remote only breaks remaining ties so
/// the order stays total.
impl Ord for Subrepository {
    fn cmp(&self, other: &Self) -> Ordering {
        self.branch
            .cmp(&other.branch)
            .then_with(|| self.rel.cmp(&other.rel))
            .then_with(|| self.remote.cmp(&other.remote))
    }
}

/// An ordered collection of subrepositories, keyed by relative path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subrepositories(Vec<Subrepository>);

impl Subrepositories {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Subrepository> {
        self.0.iter()
    }

    pub fn push(&mut self, sub: Subrepository) {
        self.0.push(sub);
    }

    /// Sort into canonical order (branch, then relative path).
    pub fn sort(&mut self) {
        self.0.sort();
    }

    /// Return a sorted copy.
    pub fn sorted(&self) -> Self {
        let mut copy = self.clone();
        copy.sort();
        copy
    }

    /// Append every element of `additions`.
    ///
    /// No deduplication happens here: the caller must make sure keys do not
    /// collide. Returns whether anything was added.
    pub fn add_all(&mut self, additions: &Subrepositories) -> bool {
        self.0.extend(additions.iter().cloned());
        !additions.is_empty()
    }

    /// Remove every element whose relative path appears in `removals`.
    ///
    /// Retained elements keep their relative order. Returns whether anything
    /// was removed.
    pub fn remove_all(&mut self, removals: &Subrepositories) -> bool {
        let removed = removals.index();
        let before = self.0.len();
        self.0.retain(|sub| !removed.contains_key(sub.rel()));
        self.0.len() != before
    }

    /// Compute the changes that turn `self` (current) into `target`.
    ///
    /// Returns `(insertions, deletions)`: target records whose key is missing
    /// from `self`, and records of `self` whose key is missing from `target`.
    /// Records sharing a key are reported in neither list, whatever their
    /// remote or branch. Ordering of the returned lists is unspecified.
    pub fn diff(&self, target: &Subrepositories) -> (Subrepositories, Subrepositories) {
        let currents = self.index();
        let targets = target.index();

        let insertions = targets
            .iter()
            .filter(|(rel, _)| !currents.contains_key(*rel))
            .map(|(_, sub)| (*sub).clone())
            .collect();
        let deletions = currents
            .iter()
            .filter(|(rel, _)| !targets.contains_key(*rel))
            .map(|(_, sub)| (*sub).clone())
            .collect();

        (insertions, deletions)
    }

    /// Key index by relative path. A duplicated key keeps its last record.
    fn index(&self) -> HashMap<&str, &Subrepository> {
        self.0.iter().map(|sub| (sub.rel(), sub)).collect()
    }
}

impl FromIterator<Subrepository> for Subrepositories {
    fn from_iter<I: IntoIterator<Item = Subrepository>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Subrepositories {
    type Item = Subrepository;
    type IntoIter = std::vec::IntoIter<Subrepository>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Subrepositories {
    type Item = &'a Subrepository;
    type IntoIter = std::slice::Iter<'a, Subrepository>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<Subrepository>> for Subrepositories {
    fn from(subs: Vec<Subrepository>) -> Self {
        Self(subs)
    }
}
