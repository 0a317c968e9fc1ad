//! HTTP server layer
//!
//! Axum server with:
//! - CORS (localhost only by default)
//! - Request tracing
//! - Graceful shutdown with pool drain
//! - Sentinel-mirroring JSON envelopes

pub mod routes;
pub mod server;

pub use server::{run_server, AppState, ServerConfig};
