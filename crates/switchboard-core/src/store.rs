//! Observable state cells.
//!
//! `Store<T>` holds one value and notifies subscribers on every write. All
//! process state (auth, slots, navigation) lives in stores owned by their
//! controllers, which in turn are owned by [`crate::app::AppState`].
//!
//! Writes are replace-on-write: `set` swaps the whole value, `update` applies
//! a closure under a single notification so multi-field changes are observed
//! together.

use tokio::sync::watch;

/// A value with explicit change notification.
#[derive(Debug)]
pub struct Store<T> {
    tx: watch::Sender<T>,
}

impl<T> Store<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Reads the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Replaces the value and notifies subscribers.
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Mutates the value in place; subscribers see one change.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_modify(f);
    }

    /// Returns a receiver that observes every subsequent write.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

impl<T: Clone> Store<T> {
    /// Returns a snapshot of the current value.
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }
}

impl<T: Default> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_value() {
        let store = Store::new(1);
        store.set(2);
        assert_eq!(store.get(), 2);
    }

    #[test]
    fn test_subscriber_sees_update() {
        let store = Store::new(vec![1]);
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        store.update(|v| v.push(2));

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), vec![1, 2]);
    }

    #[test]
    fn test_writes_without_subscribers_are_kept() {
        let store: Store<Option<String>> = Store::default();
        store.set(Some("x".into()));
        assert_eq!(store.with(|v| v.clone()), Some("x".to_string()));
    }
}
