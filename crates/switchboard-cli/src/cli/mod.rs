//! CLI entry and dispatch.

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use switchboard_core::config;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod commands;

/// Environment variable holding the log filter (e.g. `debug`, `switchboard_core=trace`).
const LOG_ENV: &str = "SWITCHBOARD_LOG";

#[derive(Parser)]
#[command(name = "switchboard")]
#[command(version)]
#[command(about = "Session and navigation client for the operations console")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        /// Account name
        #[arg(short, long)]
        username: String,
        /// Password (read from stdin when omitted)
        #[arg(short, long, env = "SWITCHBOARD_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Log out and clear the stored session
    Logout,

    /// Validate the stored session with the server
    Session,

    /// Show the stored user
    Whoami,

    /// List active sessions (admin)
    Sessions,

    /// End every session of a user (admin)
    Invalidate {
        /// Numeric user id
        #[arg(value_name = "USER_ID")]
        user_id: i64,
    },

    /// Print the navigation state for a location path
    Route {
        /// Location path such as /campagne/123
        #[arg(value_name = "PATH")]
        path: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing();

    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
    {
        debug!("keeping existing tracing subscriber: {e}");
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    // Commands that must work without a (valid) config.
    match &cli.command {
        Commands::Config { command } => {
            return match command {
                ConfigCommands::Path => {
                    commands::config::path();
                    Ok(())
                }
                ConfigCommands::Init => commands::config::init(),
            };
        }
        Commands::Route { path } => return commands::route::run(path),
        _ => {}
    }

    let config = config::Config::load().context("load config")?;
    debug!(storage = %config.storage_path().display(), "loaded config");
    let app = commands::auth::app(&config)?;
    let auth = &app.auth;

    match cli.command {
        Commands::Login { username, password } => {
            commands::auth::login(auth, &username, password).await
        }
        Commands::Logout => {
            commands::auth::logout(auth).await;
            Ok(())
        }
        Commands::Session => {
            commands::auth::session(auth).await;
            Ok(())
        }
        Commands::Whoami => {
            commands::auth::whoami(auth);
            Ok(())
        }
        Commands::Sessions => commands::auth::sessions(auth).await,
        Commands::Invalidate { user_id } => commands::auth::invalidate(auth, user_id).await,
        Commands::Config { .. } | Commands::Route { .. } => Ok(()),
    }
}
