//! Database connectivity check
//!
//! Builds a minimal pool, round-trips one query, and reports the result.
//! Exits non-zero when the database is unreachable.

use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;

use farmhand_server::db::{connect, Db, PoolConfig};

use crate::config;

/// Arguments for the check-db command
#[derive(Parser, Debug)]
pub struct CheckDbArgs {
    /// Database URL (overrides FARMHAND_DB_* composition)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Seconds to wait for the connection attempt
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,
}

/// Check connectivity and exit
pub async fn run_check_db(args: CheckDbArgs) -> Result<()> {
    let database_url = config::resolve_database_url(args.database_url)?;

    let pool_config = PoolConfig {
        min_connections: 0,
        max_connections: 1,
        acquire_timeout: Duration::from_secs(args.timeout_secs),
    };

    let connected = match connect(&database_url, &pool_config).await {
        Ok(pool) => Db::new(pool).ping().await,
        Err(err) => {
            tracing::debug!(error = %err, "pool creation failed");
            false
        }
    };

    if connected {
        println!("connected");
        Ok(())
    } else {
        println!("unable to connect");
        bail!("database unreachable")
    }
}
