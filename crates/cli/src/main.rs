//! Fairweather CLI - Database migrations and operator tools.
//!
//! # Usage
//!
//! ```bash
//! # Create or upgrade the schema (including the session table)
//! fw-cli migrate
//!
//! # Delete an account and all of its favorites
//! fw-cli user delete --username alice
//!
//! # Remove expired sessions
//! fw-cli sessions prune
//! ```
//!
//! All commands read the same environment as the server
//! (`FAIRWEATHER_DATABASE_URL`, `.env`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "fw-cli")]
#[command(author, version, about = "Fairweather operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage stored sessions
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Delete a user and all of their favorites
    Delete {
        /// Exact username of the account
        #[arg(short, long)]
        username: String,
    },
}

#[derive(Subcommand)]
enum SessionsAction {
    /// Delete expired sessions
    Prune,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Delete { username } => commands::user::delete(&username).await?,
        },
        Commands::Sessions { action } => match action {
            SessionsAction::Prune => commands::sessions::prune().await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_user_delete() {
        let cli = Cli::try_parse_from(["fw-cli", "user", "delete", "--username", "alice"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::User {
                action: UserAction::Delete { ref username }
            }) if username == "alice"
        ));
    }

    #[test]
    fn test_user_delete_requires_username() {
        assert!(Cli::try_parse_from(["fw-cli", "user", "delete"]).is_err());
    }
}
