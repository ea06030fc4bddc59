//! Multi-file symbol base: one buffer and one index per tracked file.
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use crate::buffer::SourceBuffer;
use crate::error::Error;
use crate::hasher;
use crate::index::SymbolIndex;

/// Parse state of one tracked file.
#[derive(Debug, Default)]
struct Entry {
    /// Fingerprint of the bytes the index was built from.
    fingerprint: Option<String>,
    /// Classification of `source`; empty until parsed.
    index: SymbolIndex,
    /// Loaded content; absent until parsed or after a failed read.
    source: Option<SourceBuffer>,
}

impl Entry {
    /// Forget everything parsed, keeping the file tracked.
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Files tracked together. Each file is parsed on its own; a failure in one
/// never affects another.
#[derive(Debug, Default)]
pub struct Workspace {
    /// Tracked files, ordered by path.
    entries: BTreeMap<PathBuf, Entry>,
    /// Files whose last parse failed to read.
    failed: BTreeSet<PathBuf>,
    /// Macro names applied to every file.
    known_macros: HashSet<String>,
}

impl Workspace {
    /// Track `path`. Returns `false` for an empty path or one already tracked.
    pub fn add_file(&mut self, path: &Path) -> bool {
        if path.as_os_str().is_empty() || self.entries.contains_key(path) {
            return false;
        }
        self.entries.insert(path.to_path_buf(), Entry::default());
        return true;
    }

    /// Parse every tracked file. Returns how many succeeded; failures are
    /// logged and listed by [`Self::failed`].
    pub fn build(&mut self) -> usize {
        let paths: Vec<PathBuf> = self.entries.keys().cloned().collect();
        let mut parsed = 0_usize;
        for path in paths {
            match self.reparse_file(&path) {
                Ok(()) => parsed = parsed.saturating_add(1),
                Err(e) => tracing::warn!("{e}"),
            }
        }
        tracing::debug!(parsed, failed = self.failed.len(), "workspace built");
        return parsed;
    }

    /// Drop every parse result while keeping the files tracked.
    pub fn clean(&mut self) {
        for entry in self.entries.values_mut() {
            entry.reset();
        }
        self.failed.clear();
    }

    /// Files whose most recent parse could not read them.
    pub fn failed(&self) -> impl Iterator<Item = &Path> {
        return self.failed.iter().map(PathBuf::as_path);
    }

    /// Tracked paths, ordered.
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        return self.entries.keys().map(PathBuf::as_path);
    }

    /// Index of a tracked file that parsed successfully.
    pub fn find_index(&self, path: &Path) -> Option<&SymbolIndex> {
        return self.entries.get(path).filter(|e| return e.source.is_some()).map(|e| return &e.index);
    }

    /// Loaded content of a tracked file that parsed successfully.
    pub fn find_source(&self, path: &Path) -> Option<&SourceBuffer> {
        return self.entries.get(path).and_then(|e| return e.source.as_ref());
    }

    /// True when no file is tracked.
    pub fn is_empty(&self) -> bool {
        return self.entries.is_empty();
    }

    /// Number of tracked files.
    pub fn len(&self) -> usize {
        return self.entries.len();
    }

    /// Empty workspace whose files all treat `known_macros` as macro names.
    pub fn new(known_macros: HashSet<String>) -> Self {
        return Self { known_macros, ..Self::default() };
    }

    /// Read a tracked file's bytes, clearing its entry if the read fails.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotTracked` or `Error::FileRead`.
    fn read_tracked(&mut self, path: &Path) -> Result<Vec<u8>, Error> {
        let Some(entry) = self.entries.get_mut(path) else {
            return Err(Error::NotTracked { path: path.to_path_buf() });
        };
        match std::fs::read(path) {
            Ok(bytes) => return Ok(bytes),
            Err(source) => {
                entry.reset();
                self.failed.insert(path.to_path_buf());
                return Err(Error::FileRead { path: path.to_path_buf(), source });
            },
        }
    }

    /// Reparse only the files whose content changed since their last parse.
    /// Returns the paths that were reparsed; unreadable files are logged
    /// and listed by [`Self::failed`].
    pub fn refresh(&mut self) -> Vec<PathBuf> {
        let paths: Vec<PathBuf> = self.entries.keys().cloned().collect();
        let mut changed = Vec::new();
        for path in paths {
            let bytes = match self.read_tracked(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!("{e}");
                    continue;
                },
            };
            let fingerprint = hasher::fingerprint(&bytes);
            let unchanged = self
                .entries
                .get(&path)
                .is_some_and(|entry| return entry.fingerprint.as_deref() == Some(fingerprint.as_str()));
            if unchanged {
                continue;
            }
            self.store(&path, &bytes);
            changed.push(path);
        }
        return changed;
    }

    /// Stop tracking every file.
    pub fn remove_all(&mut self) {
        self.entries.clear();
        self.failed.clear();
    }

    /// Stop tracking `path`. Returns `false` if it was not tracked.
    pub fn remove_file(&mut self, path: &Path) -> bool {
        self.failed.remove(path);
        return self.entries.remove(path).is_some();
    }

    /// Reload and reparse one tracked file.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotTracked` if `path` was never added, or
    /// `Error::FileRead` if it cannot be read. A failed read also clears
    /// whatever was parsed for the file before.
    pub fn reparse_file(&mut self, path: &Path) -> Result<(), Error> {
        let bytes = self.read_tracked(path)?;
        self.store(path, &bytes);
        return Ok(());
    }

    /// Parse `bytes` as the new content of the tracked file `path`.
    fn store(&mut self, path: &Path, bytes: &[u8]) {
        let Some(entry) = self.entries.get_mut(path) else {
            return;
        };
        let source = SourceBuffer::from_bytes(bytes);
        entry.index.parse(&source, &self.known_macros);
        entry.fingerprint = Some(hasher::fingerprint(bytes));
        entry.source = Some(source);
        self.failed.remove(path);
    }
}
