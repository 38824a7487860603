//! Auth command handlers.

use std::io::{self, BufRead};

use anyhow::{Context, Result, bail};
use switchboard_core::app::AppState;
use switchboard_core::auth::AuthController;
use switchboard_core::config::Config;
use switchboard_core::navigation::MemoryHistory;

/// App state for one CLI invocation. The CLI renders no fragments, so slots
/// carry `()`.
pub type CliApp = AppState<(), MemoryHistory>;

/// Builds the app over the configured backend and storage file.
pub fn app(config: &Config) -> Result<CliApp> {
    AppState::from_config(config, MemoryHistory::new("/")).context("configure auth client")
}

pub async fn login(auth: &AuthController, username: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => read_password()?,
    };

    let response = auth
        .login(username, &password)
        .await
        .context("Login failed")?;
    println!("Logged in as {} ({})", response.username, response.ruolo);
    Ok(())
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read password from stdin")?;

    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("Password is empty");
    }
    Ok(password)
}

pub async fn logout(auth: &AuthController) {
    let was_logged_in = auth.is_authenticated();
    // Runs either way so partial leftovers in storage are removed too.
    auth.logout().await;

    if was_logged_in {
        println!("Logged out");
    } else {
        println!("Not logged in");
    }
}

pub async fn session(auth: &AuthController) {
    if auth.check_session().await {
        let username = auth
            .session()
            .user()
            .map(|u| u.username.clone())
            .unwrap_or_default();
        println!("Session valid for {username}");
    } else {
        println!("Not authenticated");
    }
}

pub fn whoami(auth: &AuthController) {
    match auth.session().user() {
        Some(user) => println!("{} ({}, id {})", user.username, user.role, user.id),
        None => println!("Not logged in"),
    }
}

pub async fn sessions(auth: &AuthController) -> Result<()> {
    let sessions = auth
        .active_sessions()
        .await
        .context("list active sessions")?;

    if sessions.is_empty() {
        println!("No active sessions.");
        return Ok(());
    }

    for s in sessions {
        println!(
            "{}\t{}\t{}\t{}",
            s.user_id.map(|id| id.to_string()).unwrap_or_default(),
            s.username.unwrap_or_default(),
            s.ruolo.map(String::from).unwrap_or_default(),
            s.created_at.unwrap_or_default(),
        );
    }
    Ok(())
}

pub async fn invalidate(auth: &AuthController, user_id: i64) -> Result<()> {
    auth.invalidate_user(user_id)
        .await
        .with_context(|| format!("invalidate sessions of user {user_id}"))?;
    println!("Invalidated sessions of user {user_id}");
    Ok(())
}
