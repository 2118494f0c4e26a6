//! JuiceQu CLI - Session table setup and operator tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the session table used by the storefront
//! jq-cli migrate sessions
//!
//! # See which voice rule a phrase hits
//! jq-cli voice classify "tambah dua jus mangga"
//!
//! # Check the REST backend is reachable
//! jq-cli backend check
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "jq-cli")]
#[command(author, version, about = "JuiceQu CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Voice command tools
    Voice {
        #[command(subcommand)]
        action: VoiceAction,
    },
    /// Backend API tools
    Backend {
        #[command(subcommand)]
        action: BackendAction,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Create the session store table
    Sessions,
}

#[derive(Subcommand)]
enum VoiceAction {
    /// Classify a transcript with the local rules
    Classify {
        /// Spoken text, as the browser would send it
        transcript: String,
    },
}

#[derive(Subcommand)]
enum BackendAction {
    /// Call the backend health endpoint
    Check,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
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
        Commands::Migrate { target } => match target {
            MigrateTarget::Sessions => commands::migrate::sessions().await?,
        },
        Commands::Voice { action } => match action {
            VoiceAction::Classify { transcript } => commands::voice::classify(&transcript),
        },
        Commands::Backend { action } => match action {
            BackendAction::Check => commands::backend::check().await?,
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
    fn test_parses_voice_classify() {
        let cli = Cli::try_parse_from(["jq-cli", "voice", "classify", "kosongkan keranjang"])
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(
            cli.command,
            Commands::Voice {
                action: VoiceAction::Classify { ref transcript }
            } if transcript == "kosongkan keranjang"
        ));
    }
}
