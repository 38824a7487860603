//! Application state composition.
//!
//! ```text
//! AppState
//! ├── auth: AuthController              (session, loading, error)
//! ├── navigation: NavigationController  (module, sub-path, params)
//! ├── header: SlotRegistry              (header fragment + props + title)
//! └── sidebar: SlotRegistry             (sidebar fragment + props)
//! ```
//!
//! The host owns one `AppState` and hands references to its views. Auth and
//! navigation are independent; views subscribe to the pieces they render.

use std::sync::Arc;

use anyhow::Result;

use crate::auth::{AuthClient, AuthController};
use crate::config::Config;
use crate::navigation::{History, NavigationController};
use crate::slots::SlotRegistry;
use crate::storage::{FileStore, SessionCache};

pub struct AppState<C, H> {
    pub auth: AuthController,
    pub navigation: NavigationController<H>,
    pub header: SlotRegistry<C>,
    pub sidebar: SlotRegistry<C>,
}

impl<C: Clone, H: History> AppState<C, H> {
    pub fn new(auth: AuthController, history: H) -> Self {
        Self {
            auth,
            navigation: NavigationController::new(history),
            header: SlotRegistry::new("header"),
            sidebar: SlotRegistry::new("sidebar"),
        }
    }

    /// Wires the auth client and file-backed session cache from `config`.
    ///
    /// # Errors
    /// Returns an error if the backend URL is invalid or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &Config, history: H) -> Result<Self> {
        let client = AuthClient::from_config(config)?;
        let cache = SessionCache::new(Arc::new(FileStore::new(config.storage_path())));
        Ok(Self::new(AuthController::new(client, cache), history))
    }

    /// Empties both slots, e.g. when the active module unmounts.
    pub fn clear_slots(&self) {
        self.header.clear();
        self.sidebar.clear();
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::navigation::{MemoryHistory, Module};
    use crate::session::{Role, User};
    use crate::slots::Props;

    fn config_in(dir: &std::path::Path) -> Config {
        Config {
            api_base_url: "http://127.0.0.1:9".into(),
            storage_file: Some(dir.join("storage.json").to_string_lossy().into_owned()),
            ..Config::default()
        }
    }

    #[test]
    fn test_from_config_restores_file_session() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        SessionCache::new(Arc::new(FileStore::new(config.storage_path())))
            .save(
                "tok",
                &User {
                    id: 1,
                    username: "u".into(),
                    role: Role::Operator,
                },
            )
            .unwrap();

        let app: AppState<&str, _> =
            AppState::from_config(&config, MemoryHistory::new("/agenti")).unwrap();

        assert!(app.auth.is_authenticated());
        assert_eq!(app.navigation.state().module, Module::Agenti);
    }

    #[test]
    fn test_slots_are_independent() {
        let dir = tempdir().unwrap();
        let app: AppState<&str, _> =
            AppState::from_config(&config_in(dir.path()), MemoryHistory::new("/")).unwrap();

        app.header.set_titled("StatusHeader", Props::new(), "Status");
        app.sidebar.set("StatusMenu", Props::new());
        app.sidebar.clear();

        assert_eq!(app.header.content().component, Some("StatusHeader"));
        assert!(app.sidebar.content().is_empty());

        app.clear_slots();
        assert!(app.header.content().is_empty());
    }
}
