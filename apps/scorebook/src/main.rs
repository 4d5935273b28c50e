//! # Scorebook - School Results Server
//!
//! The main binary for Scorebook.
//!
//! This application provides:
//! - HTTP JSON API server (axum-based)
//! - CLI interface for setup, seeding and reports
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │           apps/scorebook (THE BINARY)         │
//! │                                               │
//! │   ┌─────────────┐        ┌─────────────┐      │
//! │   │    CLI      │        │  HTTP API   │      │
//! │   │   (clap)    │        │   (axum)    │      │
//! │   └──────┬──────┘        └──────┬──────┘      │
//! │          └───────────┬──────────┘             │
//! │                      ▼                        │
//! │             ┌────────────────┐                │
//! │             │ scorebook-core │                │
//! │             │  (redb store)  │                │
//! │             └────────────────┘                │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! scorebook server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! scorebook create-admin --email head@school.test --name Head --password secret
//! scorebook seed
//! scorebook results --class 2
//! ```

use clap::Parser;
use scorebook::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // SCOREBOOK_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("SCOREBOOK_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let default_filter = if cli.verbose {
        "scorebook=debug,scorebook_core=debug,tower_http=debug"
    } else {
        "scorebook=info,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Scorebook startup banner.
fn print_banner() {
    println!(
        r#"
  ┌─┐┌─┐┌─┐┬─┐┌─┐┌┐ ┌─┐┌─┐┬┌─
  └─┐│  │ │├┬┘├┤ ├┴┐│ ││ │├┴┐
  └─┘└─┘└─┘┴└─└─┘└─┘└─┘└─┘┴ ┴

  School Results Server v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
