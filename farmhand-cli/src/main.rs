//! farmhand CLI - farm record-keeping backend
//!
//! Entry point for the `farmhand` binary:
//! - `serve` runs the HTTP API server
//! - `check-db` verifies database connectivity and exits

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "farmhand",
    author,
    version,
    about = "Farm record-keeping backend: table lifecycle API over PostgreSQL"
)]
struct Cli {
    /// Enable debug logging (sets RUST_LOG=debug if not already set)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Check database connectivity and exit
    CheckDb(commands::check_db::CheckDbArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; environment always wins
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug })?;

    match cli.command {
        Commands::Serve(args) => commands::serve::run_serve(args).await,
        Commands::CheckDb(args) => commands::check_db::run_check_db(args).await,
    }
}
