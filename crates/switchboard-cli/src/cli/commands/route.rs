//! Route command handler.

use anyhow::{Context, Result};
use switchboard_core::navigation::{MemoryHistory, NavigationController};

pub fn run(path: &str) -> Result<()> {
    let nav = NavigationController::new(MemoryHistory::new(path));
    let json = serde_json::to_string_pretty(&nav.state()).context("serialize navigation state")?;
    println!("{json}");
    Ok(())
}
