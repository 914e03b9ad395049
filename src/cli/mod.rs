pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::database::{DatabaseManager, PgStore};

#[derive(Parser)]
#[command(name = "churchctl")]
#[command(about = "Church console CLI - exports, dashboard counts and development tokens")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Print a department's group board with spouses paired")]
    Export {
        #[arg(help = "Department ID")]
        department: Uuid,
    },

    #[command(about = "Show dashboard counts")]
    Stats {
        #[arg(long, help = "Limit counts to one church")]
        church: Option<Uuid>,
    },

    #[command(about = "Mint a bearer token for a profile (development)")]
    Token {
        #[arg(help = "Profile/user ID")]
        user: Uuid,

        #[arg(long, help = "Email claim")]
        email: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Operator commands read through the same store as the server, unscoped
pub(crate) fn open_store(config: &AppConfig) -> PgStore {
    PgStore::new(DatabaseManager::new(config.database.clone()))
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = AppConfig::from_env();

    match cli.command {
        Commands::Export { department } => {
            commands::export::handle(&config, department, output_format).await
        }
        Commands::Stats { church } => commands::stats::handle(&config, church, output_format).await,
        Commands::Token { user, email } => {
            commands::token::handle(&config, user, email, output_format)
        }
    }
}
