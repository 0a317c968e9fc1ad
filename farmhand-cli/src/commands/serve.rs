//! HTTP server command
//!
//! Creates the connection pool and runs the farmhand API server until a
//! shutdown signal arrives.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use farmhand_server::db::{connect, Db, PoolConfig};
use farmhand_server::http::{run_server, ServerConfig};

use crate::config;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: 127.0.0.1:3030)
    #[arg(long, short = 'b', default_value = "127.0.0.1:3030")]
    pub bind: SocketAddr,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides FARMHAND_DB_* composition)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Connections kept open even when idle
    #[arg(long, env = "FARMHAND_POOL_MIN", default_value_t = 1)]
    pub pool_min: u32,

    /// Upper bound on concurrent live connections
    #[arg(long, env = "FARMHAND_POOL_MAX", default_value_t = 3)]
    pub pool_max: u32,

    /// Seconds a caller may queue for a pool lease
    #[arg(long, env = "FARMHAND_POOL_ACQUIRE_TIMEOUT_SECS", default_value_t = 60)]
    pub pool_acquire_timeout_secs: u64,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let database_url = config::resolve_database_url(args.database_url)
        .context("no database configuration available")?;

    let pool_config = PoolConfig {
        min_connections: args.pool_min,
        max_connections: args.pool_max,
        acquire_timeout: Duration::from_secs(args.pool_acquire_timeout_secs),
    };

    tracing::info!("Starting farmhand server on {}", args.bind);

    // Pool init failure is the one fatal error
    let pool = connect(&database_url, &pool_config)
        .await
        .context("Failed to create database pool")?;
    tracing::info!(
        max_connections = pool_config.max_connections,
        "Connection pool started"
    );

    let config = ServerConfig {
        bind_addr: args.bind,
        cors_permissive: args.cors_permissive,
    };

    // Blocks until shutdown; drains requests and closes the pool
    run_server(Db::new(pool), config)
        .await
        .context("Server error")?;

    Ok(())
}
