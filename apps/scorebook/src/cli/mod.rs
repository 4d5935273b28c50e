//! # Scorebook CLI Module
//!
//! This module implements the CLI interface for Scorebook.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `status` - Show record counts
//! - `init` - Initialize a new database
//! - `seed` - Load the demo session, class and roster
//! - `create-admin` - Create an admin account
//! - `results` - Print the leaderboard of a class

mod commands;

use crate::config::ServerConfig;
use clap::{Parser, Subcommand};
use scorebook_core::ScorebookError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Scorebook - school results server
///
/// Keeps sessions, classes, students, subjects and marks, and serves them
/// over a JSON API.
#[derive(Parser, Debug)]
#[command(name = "scorebook")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the database (overrides config and SCOREBOOK_DATABASE)
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show record counts
    Status,

    /// Initialize a new empty database
    Init {
        /// Replace an existing database file
        #[arg(short, long)]
        force: bool,
    },

    /// Load the demo session, class, subject and students
    Seed,

    /// Create an admin account
    CreateAdmin {
        #[arg(long)]
        email: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        password: String,

        /// Mark the account as super admin
        #[arg(long)]
        super_admin: bool,
    },

    /// Print the ranked results of a class
    Results {
        /// Class id
        #[arg(long = "class")]
        class_id: u64,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Resolve the effective configuration: file, environment, then flags.
pub fn resolve_config(cli: &Cli) -> Result<ServerConfig, ScorebookError> {
    let mut config = ServerConfig::load(cli.config.as_deref())?;
    if let Some(database) = &cli.database {
        config.database.clone_from(database);
    }
    Ok(config)
}

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), ScorebookError> {
    let mut config = resolve_config(&cli)?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            cmd_server(config).await
        }
        Some(Commands::Init { force }) => cmd_init(&config, force),
        Some(Commands::Seed) => cmd_seed(&config, json_mode),
        Some(Commands::CreateAdmin {
            email,
            name,
            password,
            super_admin,
        }) => cmd_create_admin(&config, json_mode, &email, &name, &password, super_admin),
        Some(Commands::Results { class_id }) => cmd_results(&config, json_mode, class_id),
        Some(Commands::Status) | None => cmd_status(&config, json_mode),
    }
}
