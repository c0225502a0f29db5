//! Set difference between two listings of the same directory.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::entry::DirectoryEntry;

/// Entries that appeared, changed or disappeared between two listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    pub added: Vec<DirectoryEntry>,
    pub modified: Vec<DirectoryEntry>,
    pub removed: Vec<DirectoryEntry>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }

    /// Human-readable counts, e.g. "2 file(s) added, 1 file(s) removed".
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.added.is_empty() {
            parts.push(format!("{} file(s) added", self.added.len()));
        }
        if !self.modified.is_empty() {
            parts.push(format!("{} file(s) modified", self.modified.len()));
        }
        if !self.removed.is_empty() {
            parts.push(format!("{} file(s) removed", self.removed.len()));
        }
        parts.join(", ")
    }
}

/// Compare two listings keyed by uri.
///
/// A uri only in `new` is added, only in `old` is removed. A file present in
/// both is modified when its size or timestamp differs; folders are never
/// modified. Output follows the first-occurrence order of each input, and a
/// duplicated uri takes its last entry.
pub fn diff(old: &[DirectoryEntry], new: &[DirectoryEntry]) -> ChangeSet {
    let old_map = by_uri(old);
    let new_map = by_uri(new);
    let mut changes = ChangeSet::default();

    for uri in unique_uris(new) {
        let current = new_map[uri];
        match old_map.get(uri) {
            None => changes.added.push(current.clone()),
            Some(previous) => {
                if !current.is_folder
                    && (current.size != previous.size
                        || current.last_modified != previous.last_modified)
                {
                    changes.modified.push(current.clone());
                }
            }
        }
    }

    for uri in unique_uris(old) {
        if !new_map.contains_key(uri) {
            changes.removed.push(old_map[uri].clone());
        }
    }

    changes
}

fn by_uri(entries: &[DirectoryEntry]) -> HashMap<&str, &DirectoryEntry> {
    entries.iter().map(|e| (e.uri.as_str(), e)).collect()
}

fn unique_uris(entries: &[DirectoryEntry]) -> impl Iterator<Item = &str> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .map(|e| e.uri.as_str())
        .filter(move |uri| seen.insert(*uri))
}
