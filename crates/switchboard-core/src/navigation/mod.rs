//! Navigation state: which console module is shown and where inside it.
//!
//! Locations have the form `/{module}/{subPath...}`. The first segment picks
//! a module from a fixed whitelist (unknown values fall back to
//! [`Module::Status`]); the remaining segments form the sub-path. Query
//! strings and fragments are not part of the navigation state.

mod controller;
mod history;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub use controller::NavigationController;
pub use history::{History, MemoryHistory, PopEvent};
use serde::{Deserialize, Serialize};

/// Query-like parameters carried by a navigation state.
pub type Params = BTreeMap<String, String>;

/// Console modules reachable by navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Module {
    #[default]
    Status,
    Chiamate,
    Campagne,
    Operatori,
    Agenti,
    Sedi,
    Liste,
}

impl Module {
    pub const ALL: [Module; 7] = [
        Module::Status,
        Module::Chiamate,
        Module::Campagne,
        Module::Operatori,
        Module::Agenti,
        Module::Sedi,
        Module::Liste,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Module::Status => "status",
            Module::Chiamate => "chiamate",
            Module::Campagne => "campagne",
            Module::Operatori => "operatori",
            Module::Agenti => "agenti",
            Module::Sedi => "sedi",
            Module::Liste => "liste",
        }
    }

    /// Parses a module name, falling back to the default module.
    pub fn parse_or_default(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

/// Error for a module name outside the whitelist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownModule(pub String);

impl fmt::Display for UnknownModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown module '{}'", self.0)
    }
}

impl std::error::Error for UnknownModule {}

impl FromStr for Module {
    type Err = UnknownModule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Module::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownModule(s.to_string()))
    }
}

impl From<String> for Module {
    fn from(value: String) -> Self {
        Module::parse_or_default(&value)
    }
}

impl From<Module> for String {
    fn from(module: Module) -> Self {
        module.as_str().to_string()
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decomposed location; also the snapshot attached to history entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NavigationState {
    pub module: Module,
    pub sub_path: String,
    pub params: Params,
}

impl NavigationState {
    pub fn new(module: Module, sub_path: &str, params: Params) -> Self {
        Self {
            module,
            sub_path: normalize_sub_path(sub_path),
            params,
        }
    }

    /// Derives state from a location path. Params are always empty.
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let mut segments = path.split('/').filter(|s| !s.is_empty());

        let module = segments
            .next()
            .map(Module::parse_or_default)
            .unwrap_or_default();
        let sub_path = segments.collect::<Vec<_>>().join("/");

        Self {
            module,
            sub_path,
            params: Params::new(),
        }
    }

    /// Location path for this state: `/{module}` or `/{module}/{subPath}`.
    pub fn path(&self) -> String {
        if self.sub_path.is_empty() {
            format!("/{}", self.module)
        } else {
            format!("/{}/{}", self.module, self.sub_path)
        }
    }
}

fn normalize_sub_path(sub_path: &str) -> String {
    sub_path
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_splits_module_and_sub_path() {
        let state = NavigationState::from_path("/campagne/123/edit");
        assert_eq!(state.module, Module::Campagne);
        assert_eq!(state.sub_path, "123/edit");
        assert!(state.params.is_empty());
    }

    #[test]
    fn test_empty_path_is_status() {
        assert_eq!(NavigationState::from_path("").module, Module::Status);
        assert_eq!(NavigationState::from_path("/").module, Module::Status);
    }

    #[test]
    fn test_unknown_module_falls_back_to_status() {
        let state = NavigationState::from_path("/unknownmodule");
        assert_eq!(state.module, Module::Status);
        assert_eq!(state.sub_path, "");
    }

    #[test]
    fn test_query_and_fragment_are_ignored() {
        let state = NavigationState::from_path("/agenti/team1?x=1#top");
        assert_eq!(state.module, Module::Agenti);
        assert_eq!(state.sub_path, "team1");
        assert!(state.params.is_empty());
    }

    #[test]
    fn test_module_names_are_case_sensitive() {
        assert!("Status".parse::<Module>().is_err());
        assert_eq!("sedi".parse::<Module>(), Ok(Module::Sedi));
    }

    #[test]
    fn test_path_round_trips_through_from_path() {
        let state = NavigationState::new(Module::Liste, "/a//b/", Params::new());
        assert_eq!(state.path(), "/liste/a/b");
        assert_eq!(NavigationState::from_path(&state.path()), state);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let state = NavigationState::new(
            Module::Agenti,
            "team1",
            Params::from([("x".to_string(), "1".to_string())]),
        );
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["module"], "agenti");
        assert_eq!(json["subPath"], "team1");
        assert_eq!(json["params"]["x"], "1");
    }

    #[test]
    fn test_snapshot_with_unknown_module_decodes_to_default() {
        let state: NavigationState =
            serde_json::from_str(r#"{"module":"gone","subPath":"x"}"#).unwrap();
        assert_eq!(state.module, Module::Status);
        assert_eq!(state.sub_path, "x");
    }
}
