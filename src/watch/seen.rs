//! The set of filenames already handled in this process lifetime.

use std::collections::HashSet;

/// Filenames the watcher has emitted (or tried to emit) a task for.
///
/// Membership only grows: there is no way to remove a name. The set is
/// never persisted; a restarted watcher rebuilds it from the inbox.
#[derive(Debug, Default)]
pub struct SeenSet {
    names: HashSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a filename. Returns `false` if it was already present.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.names.contains(name) {
            return false;
        }
        self.names.insert(name.to_string())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
