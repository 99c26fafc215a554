//! # Cigar API CLI (`cigar-api`)
//!
//! ## Usage
//!
//! ```bash
//! cigar-api --config ./config/cigar-api.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `cigar-api serve` | Start the HTTP API |
//! | `cigar-api import <file>` | Upsert the cigar lines in a JSON array file |
//!
//! ## Examples
//!
//! ```bash
//! # Serve with the connection string from the environment
//! CIGAR_API_DB_URL=sqlite://data/cigars.sqlite cigar-api serve
//!
//! # Load a catalog file, JSON logs on stderr
//! cigar-api --json-logs import ./catalog.json
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use cigar_api::{config, import, logging, server};

/// Cigar API: read and batch-upsert cigar product lines over HTTP.
#[derive(Parser)]
#[command(name = "cigar-api", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Optional; when the file does not exist, defaults are used. The
    /// `CIGAR_API_DB_URL` environment variable (or a `.env` file in the
    /// working directory) overrides `[db].url`.
    #[arg(long, global = true, default_value = "./config/cigar-api.toml")]
    config: PathBuf,

    /// Emit logs as JSON lines instead of compact text.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Binds to `[server].bind`. If the database cannot be opened the server
    /// still starts; store-backed requests then fail with 500.
    Serve,

    /// Upsert cigar lines from a JSON file.
    ///
    /// The file must hold a JSON array of cigar-line objects. Per-item
    /// results are printed to stdout as JSON.
    Import {
        /// Path to the JSON file.
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Variables already set in the environment win over `.env`.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init_logger(cli.json_logs);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Import { file } => {
            import::run_import(&cfg, &file).await?;
        }
    }

    Ok(())
}
