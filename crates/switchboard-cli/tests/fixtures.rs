//! Shared helpers for CLI integration tests.

use std::fs;
use std::path::Path;

/// Writes a stored session the way the binary persists it.
pub fn write_session(home: &Path, token: &str, user_json: &str) {
    let storage = serde_json::json!({
        "auth_token": token,
        "auth_user": user_json,
    });
    fs::write(
        home.join("storage.json"),
        serde_json::to_string_pretty(&storage).unwrap(),
    )
    .unwrap();
}

pub fn read_storage(home: &Path) -> String {
    fs::read_to_string(home.join("storage.json")).unwrap_or_default()
}
