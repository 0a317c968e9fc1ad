//! farmhand-server: farm record-keeping HTTP backend
//!
//! A registry of declared table schemas drives a generic CRUD façade over
//! a pooled PostgreSQL connection; a small set of fixed report queries
//! (joins, aggregates, a relational division) sits beside it. Everything
//! is exposed over an axum JSON API.

pub mod db;
pub mod http;
pub mod schema;

pub use db::{connect, Db, PoolConfig, TableFacade};
pub use http::{run_server, ServerConfig};
