//! Navigation controller.
//!
//! Transitions:
//! - init: state derived from the history's current path
//! - `navigate`: state replaced, history pushed when the path changes
//!   (otherwise the current entry's snapshot is rewritten)
//! - `on_pop` with a snapshot: snapshot restored verbatim
//! - `on_pop` without a snapshot: state re-derived from the event path
//!
//! The visible path and the state agree after every transition.

use tokio::sync::watch;
use tracing::debug;

use super::{History, MemoryHistory, Module, NavigationState, Params, PopEvent};
use crate::store::Store;

#[derive(Debug)]
pub struct NavigationController<H> {
    history: H,
    state: Store<NavigationState>,
}

impl<H: History> NavigationController<H> {
    pub fn new(history: H) -> Self {
        let initial = NavigationState::from_path(&history.current_path());
        debug!(module = %initial.module, sub_path = %initial.sub_path, "initial navigation state");
        Self {
            history,
            state: Store::new(initial),
        }
    }

    pub fn state(&self) -> NavigationState {
        self.state.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<NavigationState> {
        self.state.subscribe()
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn navigate(&mut self, module: Module, sub_path: &str, params: Params) {
        let next = NavigationState::new(module, sub_path, params);
        let path = next.path();

        if path == self.history.current_path() {
            self.history.replace(&path, &next);
        } else {
            self.history.push(&path, &next);
        }
        debug!(%path, "navigated");
        self.state.set(next);
    }

    /// Navigates to a module root with no sub-path or params.
    pub fn navigate_module(&mut self, module: Module) {
        self.navigate(module, "", Params::new());
    }

    /// Navigates to a location path, applying the whitelist.
    pub fn navigate_path(&mut self, path: &str) {
        let parsed = NavigationState::from_path(path);
        self.navigate(parsed.module, &parsed.sub_path, Params::new());
    }

    /// Applies a back/forward move reported by the history backend.
    pub fn on_pop(&mut self, event: PopEvent) {
        let next = match event.state {
            Some(snapshot) => snapshot,
            None => {
                debug!(path = %event.path, "pop without snapshot, deriving from path");
                NavigationState::from_path(&event.path)
            }
        };
        self.state.set(next);
    }
}

impl NavigationController<MemoryHistory> {
    /// Moves back one entry. Returns false at the start of history.
    pub fn back(&mut self) -> bool {
        match self.history.back() {
            Some(event) => {
                self.on_pop(event);
                true
            }
            None => false,
        }
    }

    /// Moves forward one entry. Returns false at the end of history.
    pub fn forward(&mut self) -> bool {
        match self.history.forward() {
            Some(event) => {
                self.on_pop(event);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_initial_state_from_url() {
        let nav = NavigationController::new(MemoryHistory::new("/operatori/42"));
        let state = nav.state();
        assert_eq!(state.module, Module::Operatori);
        assert_eq!(state.sub_path, "42");
        assert!(state.params.is_empty());
    }

    #[test]
    fn test_unknown_initial_module_is_status() {
        let nav = NavigationController::new(MemoryHistory::new("/unknownmodule"));
        assert_eq!(nav.state().module, Module::Status);
    }

    #[test]
    fn test_back_to_initial_empty_path_restores_status() {
        let mut nav = NavigationController::new(MemoryHistory::new("/"));
        nav.navigate_path("/campagne/123");
        assert_eq!(nav.state().module, Module::Campagne);
        assert_eq!(nav.history().current_path(), "/campagne/123");

        assert!(nav.back());
        let state = nav.state();
        assert_eq!(state.module, Module::Status);
        assert_eq!(state.sub_path, "");
    }

    #[test]
    fn test_back_restores_snapshot_exactly() {
        let mut nav = NavigationController::new(MemoryHistory::new("/"));
        nav.navigate(Module::Agenti, "team1", params(&[("x", "1")]));
        let agenti = nav.state();
        nav.navigate_module(Module::Status);

        assert!(nav.back());
        assert_eq!(nav.state(), agenti);
        assert_eq!(nav.state().params.get("x").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_same_path_does_not_push() {
        let mut nav = NavigationController::new(MemoryHistory::new("/"));
        nav.navigate(Module::Sedi, "roma", Params::new());
        nav.navigate(Module::Sedi, "roma", params(&[("tab", "staff")]));

        assert_eq!(nav.history().len(), 2);
        assert_eq!(nav.state().params.len(), 1);
    }

    #[test]
    fn test_replaced_snapshot_survives_back_and_forward() {
        let mut nav = NavigationController::new(MemoryHistory::new("/"));
        nav.navigate(Module::Sedi, "roma", Params::new());
        nav.navigate(Module::Sedi, "roma", params(&[("tab", "staff")]));
        nav.navigate_module(Module::Liste);

        assert!(nav.back());
        assert_eq!(nav.state().params.get("tab").map(String::as_str), Some("staff"));
        assert!(nav.forward());
        assert_eq!(nav.state().module, Module::Liste);
    }

    #[test]
    fn test_pop_without_snapshot_derives_from_path() {
        let mut nav = NavigationController::new(MemoryHistory::new("/"));
        nav.on_pop(PopEvent {
            path: "/chiamate/oggi".into(),
            state: None,
        });
        let state = nav.state();
        assert_eq!(state.module, Module::Chiamate);
        assert_eq!(state.sub_path, "oggi");
    }

    #[test]
    fn test_back_at_start_is_noop() {
        let mut nav = NavigationController::new(MemoryHistory::new("/liste"));
        assert!(!nav.back());
        assert_eq!(nav.state().module, Module::Liste);
    }

    #[test]
    fn test_subscribers_see_navigation() {
        let mut nav = NavigationController::new(MemoryHistory::new("/"));
        let mut rx = nav.subscribe();
        nav.navigate_module(Module::Operatori);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().module, Module::Operatori);
    }
}
