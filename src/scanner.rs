//! # Checkout Discovery
//!
//! Walks a directory tree depth-first and reports every checkout root it
//! finds. A directory is a checkout root when it directly contains the marker
//! directory (`.git` by default). The walk never descends into a marker
//! directory, so checkouts nested inside another checkout's metadata (for
//! example `repo/.git/modules/x/.git`) are not reported.
//!
//! Discovery runs on a producer thread that hands paths over a rendezvous
//! channel while the caller iterates. Dropping the [`Discovery`] iterator
//! cancels the walk. The first traversal error ends the walk and is yielded as
//! the last item; paths already yielded stay valid.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use log::debug;
use walkdir::{DirEntry, WalkDir};

use crate::defaults::MARKER_DIR;
use crate::error::{Error, Result};

/// What the walk should do after visiting one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visit {
    /// Keep walking into this entry.
    Descend,
    /// The entry is a marker directory: report `checkout` and do not descend.
    Prune { checkout: PathBuf },
}

/// Decide how the walk treats one entry.
pub fn visit(entry: &DirEntry, marker: &str) -> Visit {
    if entry.file_type().is_dir() && entry.file_name() == marker {
        if let Some(parent) = entry.path().parent() {
            return Visit::Prune {
                checkout: parent.to_path_buf(),
            };
        }
    }
    Visit::Descend
}

/// Filesystem scanner for checkouts below a root directory.
#[derive(Debug, Clone)]
pub struct Scanner {
    root: PathBuf,
    marker: String,
}

impl Scanner {
    /// Create a scanner for `root` using the default `.git` marker.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            marker: MARKER_DIR.to_string(),
        }
    }

    /// Use a different marker directory name.
    pub fn with_marker(mut self, marker: &str) -> Self {
        self.marker = marker.to_string();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the tree on the calling thread.
    ///
    /// `emit` is called once per checkout, in walk order. Returning `false`
    /// from `emit` stops the walk early without an error.
    pub fn walk<F>(&self, mut emit: F) -> Result<()>
    where
        F: FnMut(PathBuf) -> bool,
    {
        let mut entries = WalkDir::new(&self.root).sort_by_file_name().into_iter();

        while let Some(next) = entries.next() {
            let entry = next.map_err(|e| Error::Discovery {
                root: self.root.clone(),
                message: e.to_string(),
            })?;

            match visit(&entry, &self.marker) {
                Visit::Descend => {}
                Visit::Prune { checkout } => {
                    entries.skip_current_dir();
                    debug!("found checkout {}", checkout.display());
                    if !emit(checkout) {
                        return Ok(());
                    }
                }
            }
        }
        Ok(())
    }

    /// Start a background walk and return the lazy sequence of checkouts.
    ///
    /// Each call re-walks the filesystem.
    pub fn discover(&self) -> Discovery {
        let (tx, rx) = mpsc::sync_channel::<Result<PathBuf>>(0);
        let scanner = self.clone();

        let producer = thread::spawn(move || {
            let outcome = scanner.walk(|checkout| tx.send(Ok(checkout)).is_ok());
            if let Err(e) = outcome {
                // Nobody listening means the caller already gave up.
                let _ = tx.send(Err(e));
            }
        });

        Discovery {
            receiver: Some(rx),
            producer: Some(producer),
        }
    }

    /// Walk the whole tree and collect every checkout.
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        self.walk(|checkout| {
            found.push(checkout);
            true
        })?;
        Ok(found)
    }
}

/// Single-pass, cancelable sequence of discovered checkouts.
///
/// Yields `Ok(path)` per checkout and at most one trailing `Err`.
pub struct Discovery {
    receiver: Option<Receiver<Result<PathBuf>>>,
    producer: Option<JoinHandle<()>>,
}

impl Iterator for Discovery {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        self.receiver.as_ref()?.recv().ok()
    }
}

impl Drop for Discovery {
    fn drop(&mut self) {
        // Closing the receiver makes the producer's next send fail.
        self.receiver.take();
        if let Some(producer) = self.producer.take() {
            let _ = producer.join();
        }
    }
}

/// Convenience wrapper: discover checkouts below `root` with the default marker.
pub fn discover<P: AsRef<Path>>(root: P) -> Discovery {
    Scanner::new(root).discover()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_checkout(root: &Path, rel: &str) {
        fs::create_dir_all(root.join(rel).join(".git")).unwrap();
    }

    #[test]
    fn test_discover_finds_checkouts() {
        let temp = TempDir::new().unwrap();
        make_checkout(temp.path(), "a");
        make_checkout(temp.path(), "group/b");
        fs::create_dir_all(temp.path().join("plain/dir")).unwrap();

        let found: Vec<PathBuf> = discover(temp.path()).collect::<Result<_>>().unwrap();

        assert_eq!(
            found,
            vec![temp.path().join("a"), temp.path().join("group/b")]
        );
    }

    #[test]
    fn test_discover_does_not_recurse_past_marker() {
        let temp = TempDir::new().unwrap();
        make_checkout(temp.path(), "repoA/.git/modules/x");

        let found = Scanner::new(temp.path()).collect().unwrap();

        assert_eq!(found, vec![temp.path().join("repoA")]);
    }

    #[test]
    fn test_root_itself_can_be_a_checkout() {
        let temp = TempDir::new().unwrap();
        make_checkout(temp.path(), ".");
        make_checkout(temp.path(), "sub");

        let found = Scanner::new(temp.path()).collect().unwrap();

        assert_eq!(found.len(), 2);
        assert!(found.contains(&temp.path().to_path_buf()));
        assert!(found.contains(&temp.path().join("sub")));
    }

    #[test]
    fn test_marker_file_is_not_a_checkout() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("worktree")).unwrap();
        fs::write(temp.path().join("worktree/.git"), "gitdir: elsewhere").unwrap();

        let found = Scanner::new(temp.path()).collect().unwrap();

        assert!(found.is_empty());
    }

    #[test]
    fn test_custom_marker() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a/.hg")).unwrap();
        make_checkout(temp.path(), "b");

        let found = Scanner::new(temp.path())
            .with_marker(".hg")
            .collect()
            .unwrap();

        assert_eq!(found, vec![temp.path().join("a")]);
    }

    #[test]
    fn test_missing_root_is_a_discovery_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");

        let items: Vec<Result<PathBuf>> = discover(&missing).collect();

        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(Error::Discovery { .. })));
    }

    #[test]
    fn test_dropping_discovery_cancels_walk() {
        let temp = TempDir::new().unwrap();
        for i in 0..10 {
            make_checkout(temp.path(), &format!("r{}", i));
        }

        let mut discovery = discover(temp.path());
        let first = discovery.next().unwrap().unwrap();
        assert_eq!(first, temp.path().join("r0"));
        // Must not hang waiting on the producer.
        drop(discovery);
    }

    #[test]
    fn test_walk_stops_when_emit_returns_false() {
        let temp = TempDir::new().unwrap();
        make_checkout(temp.path(), "a");
        make_checkout(temp.path(), "b");

        let mut seen = Vec::new();
        Scanner::new(temp.path())
            .walk(|checkout| {
                seen.push(checkout);
                false
            })
            .unwrap();

        assert_eq!(seen.len(), 1);
    }
}
