//! Connection pool lifecycle
//!
//! The pool is created once at startup and closed with a bounded grace
//! period on shutdown. Pool sizing mirrors the deployment knobs: min/max
//! connections and how long a caller may queue for a lease.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// How long in-flight leases get to finish before shutdown stops waiting.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Pool sizing configuration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Connections kept open even when idle.
    pub min_connections: u32,
    /// Upper bound on concurrent live connections.
    pub max_connections: u32,
    /// How long a caller queues for a lease before timing out.
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_connections: 1,
            max_connections: 3,
            acquire_timeout: Duration::from_secs(60),
        }
    }
}

/// Create the PostgreSQL connection pool.
///
/// # Errors
///
/// Returns an error if the initial connection fails; callers treat this
/// as fatal at startup.
pub async fn connect(database_url: &str, config: &PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(database_url)
        .await
}

/// Close the pool, waiting up to `grace` for in-flight leases to finish.
pub async fn close_with_grace(pool: &PgPool, grace: Duration) {
    if tokio::time::timeout(grace, pool.close()).await.is_err() {
        tracing::warn!(
            grace_secs = grace.as_secs(),
            "pool close grace period elapsed with leases still outstanding"
        );
    } else {
        tracing::info!("connection pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sizing() {
        let config = PoolConfig::default();
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.max_connections, 3);
        assert_eq!(config.acquire_timeout, Duration::from_secs(60));
    }

    // Integration tests require a real database
    // Run with: DATABASE_URL=postgres://... cargo test -p farmhand-server -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn pool_acquires_connection() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = connect(&url, &PoolConfig::default())
            .await
            .expect("pool creation failed");

        let result: (i32,) = sqlx::query_as("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("query failed");

        assert_eq!(result.0, 1);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn concurrent_pool_access() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = connect(&url, &PoolConfig::default())
            .await
            .expect("pool creation failed");

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let pool = pool.clone();
                tokio::spawn(async move {
                    let result: (i32,) = sqlx::query_as("SELECT $1::int")
                        .bind(i)
                        .fetch_one(&pool)
                        .await
                        .expect("concurrent query failed");
                    result.0
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let result = handle.await.expect("task panicked");
            assert_eq!(result, i as i32);
        }
    }
}
