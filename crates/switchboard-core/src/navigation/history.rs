//! History backends.

use super::NavigationState;

/// A session history the navigation controller keeps in sync.
///
/// Browser hosts implement this over `history.pushState` and
/// `history.replaceState`; [`MemoryHistory`] is the in-process backend.
pub trait History {
    /// Path of the current entry.
    fn current_path(&self) -> String;

    /// Adds an entry after the current one, dropping any forward entries.
    fn push(&mut self, path: &str, snapshot: &NavigationState);

    /// Rewrites the current entry in place.
    fn replace(&mut self, path: &str, snapshot: &NavigationState);
}

/// Delivered when the user moves through history (back/forward).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopEvent {
    pub path: String,
    /// Snapshot stored with the entry, if it was written by the controller.
    pub state: Option<NavigationState>,
}

#[derive(Debug, Clone)]
struct Entry {
    path: String,
    state: Option<NavigationState>,
}

/// In-memory history stack.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<Entry>,
    index: usize,
}

impl MemoryHistory {
    /// Starts with one entry that carries no snapshot.
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self {
            entries: vec![Entry {
                path: initial_path.into(),
                state: None,
            }],
            index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of the current entry.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn back(&mut self) -> Option<PopEvent> {
        let target = self.index.checked_sub(1)?;
        Some(self.go(target))
    }

    pub fn forward(&mut self) -> Option<PopEvent> {
        let target = self.index + 1;
        (target < self.entries.len()).then(|| self.go(target))
    }

    fn go(&mut self, target: usize) -> PopEvent {
        self.index = target;
        let entry = &self.entries[target];
        PopEvent {
            path: entry.path.clone(),
            state: entry.state.clone(),
        }
    }
}

impl History for MemoryHistory {
    fn current_path(&self) -> String {
        self.entries[self.index].path.clone()
    }

    fn push(&mut self, path: &str, snapshot: &NavigationState) {
        self.entries.truncate(self.index + 1);
        self.entries.push(Entry {
            path: path.to_string(),
            state: Some(snapshot.clone()),
        });
        self.index = self.entries.len() - 1;
    }

    fn replace(&mut self, path: &str, snapshot: &NavigationState) {
        self.entries[self.index] = Entry {
            path: path.to_string(),
            state: Some(snapshot.clone()),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::Module;

    fn snapshot(module: Module) -> NavigationState {
        NavigationState {
            module,
            ..NavigationState::default()
        }
    }

    #[test]
    fn test_initial_entry_has_no_snapshot() {
        let mut history = MemoryHistory::new("/sedi");
        assert_eq!(history.current_path(), "/sedi");
        assert!(history.back().is_none());
        assert!(history.forward().is_none());
    }

    #[test]
    fn test_push_drops_forward_entries() {
        let mut history = MemoryHistory::new("/");
        history.push("/sedi", &snapshot(Module::Sedi));
        history.push("/liste", &snapshot(Module::Liste));
        history.back();
        history.push("/agenti", &snapshot(Module::Agenti));

        assert_eq!(history.len(), 3);
        assert!(history.forward().is_none());
        let event = history.back().unwrap();
        assert_eq!(event.path, "/sedi");
        assert_eq!(event.state.unwrap().module, Module::Sedi);
    }

    #[test]
    fn test_replace_rewrites_current_entry() {
        let mut history = MemoryHistory::new("/");
        history.replace("/liste", &snapshot(Module::Liste));
        assert_eq!(history.len(), 1);
        assert_eq!(history.current_path(), "/liste");
    }
}
