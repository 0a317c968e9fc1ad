//! Database access layer
//!
//! [`Db`] owns the connection pool and exposes the one shared contract:
//! run a unit of work with a leased connection, return the connection on
//! every exit path, log and propagate the error. The façade and report
//! modules layer the sentinel error policy on top of it.

pub mod facade;
pub mod pool;
pub mod reports;
pub mod value;

pub use facade::TableFacade;
pub use pool::{close_with_grace, connect, PoolConfig};
pub use value::SqlValue;

use futures::future::BoxFuture;
use sqlx::{PgConnection, PgPool};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("unknown table: {0}")]
    UnknownTable(String),

    #[error("bad value for column {column}: {reason}")]
    BadValue { column: String, reason: String },
}

/// Handle to the connection pool, shared across request handlers.
#[derive(Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Lease one pooled connection, run `work` with it, and return the
    /// connection to the pool when the future settles (the lease is
    /// released on drop, success or error). Errors are logged here and
    /// propagated to the caller.
    pub async fn with_connection<T, F>(&self, work: F) -> DbResult<T>
    where
        F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, DbResult<T>>,
    {
        let mut conn = self.pool.acquire().await.map_err(DbError::from)?;
        let result = work(&mut conn).await;
        if let Err(err) = &result {
            tracing::error!(error = %err, "database unit of work failed");
        }
        result
    }

    /// Liveness probe: can we lease a connection and round-trip a query?
    pub async fn ping(&self) -> bool {
        self.with_connection(|conn| {
            Box::pin(async move {
                sqlx::query("SELECT 1").execute(&mut *conn).await?;
                Ok(())
            })
        })
        .await
        .is_ok()
    }
}
