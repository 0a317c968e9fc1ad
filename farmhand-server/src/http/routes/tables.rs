//! Generic table endpoints
//!
//! One set of routes serves every registered table; the path parameter
//! selects the schema and the façade does the rest.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::common;
use crate::db::TableFacade;
use crate::http::server::AppState;

/// Update request: assignments plus an equality predicate.
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub set: Map<String, Value>,
    #[serde(default, rename = "where")]
    pub predicate: Map<String, Value>,
}

/// Delete request: equality predicate.
#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    #[serde(default, rename = "where")]
    pub predicate: Map<String, Value>,
}

/// Projection request: column names to keep, in order.
#[derive(Debug, Deserialize)]
pub struct ProjectRequest {
    pub columns: Vec<String>,
}

/// POST /tables/{table}/initiate - drop dependents, drop, recreate
async fn initiate(State(state): State<Arc<AppState>>, Path(table): Path<String>) -> Response {
    match TableFacade::for_name(&state.db, &table) {
        Some(facade) => common::write_result(facade.initiate().await).into_response(),
        None => common::unknown_table_write(&table).into_response(),
    }
}

/// GET /tables/{table}/rows - select all rows in schema column order
async fn fetch_all(State(state): State<Arc<AppState>>, Path(table): Path<String>) -> Response {
    match TableFacade::for_name(&state.db, &table) {
        Some(facade) => common::read_result(facade.fetch_all().await).into_response(),
        None => common::unknown_table_read(&table).into_response(),
    }
}

/// POST /tables/{table}/rows - insert one row; body fields map to columns
async fn insert(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
    Json(fields): Json<Map<String, Value>>,
) -> Response {
    match TableFacade::for_name(&state.db, &table) {
        Some(facade) => common::write_result(facade.insert(&fields).await).into_response(),
        None => common::unknown_table_write(&table).into_response(),
    }
}

/// POST /tables/{table}/update
async fn update(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
    Json(req): Json<UpdateRequest>,
) -> Response {
    match TableFacade::for_name(&state.db, &table) {
        Some(facade) => {
            common::write_result(facade.update(&req.set, &req.predicate).await).into_response()
        }
        None => common::unknown_table_write(&table).into_response(),
    }
}

/// POST /tables/{table}/delete
async fn delete(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
    Json(req): Json<DeleteRequest>,
) -> Response {
    match TableFacade::for_name(&state.db, &table) {
        Some(facade) => common::write_result(facade.delete(&req.predicate).await).into_response(),
        None => common::unknown_table_write(&table).into_response(),
    }
}

/// POST /tables/{table}/project - select only the requested columns
async fn project(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
    Json(req): Json<ProjectRequest>,
) -> Response {
    match TableFacade::for_name(&state.db, &table) {
        Some(facade) => common::read_result(facade.project(&req.columns).await).into_response(),
        None => common::unknown_table_read(&table).into_response(),
    }
}

/// GET /tables/{table}/count
async fn count(State(state): State<Arc<AppState>>, Path(table): Path<String>) -> Response {
    match TableFacade::for_name(&state.db, &table) {
        Some(facade) => common::count_result(facade.count().await).into_response(),
        None => common::unknown_table_write(&table).into_response(),
    }
}

/// Table routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tables/{table}/initiate", post(initiate))
        .route("/tables/{table}/rows", get(fetch_all).post(insert))
        .route("/tables/{table}/update", post(update))
        .route("/tables/{table}/delete", post(delete))
        .route("/tables/{table}/project", post(project))
        .route("/tables/{table}/count", get(count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_accepts_where_keyword() {
        let req: UpdateRequest = serde_json::from_value(serde_json::json!({
            "set": { "fName": "Ada" },
            "where": { "FarmerID": 3 }
        }))
        .unwrap();
        assert_eq!(req.set.len(), 1);
        assert_eq!(req.predicate.len(), 1);
    }

    #[test]
    fn delete_request_predicate_defaults_empty() {
        let req: DeleteRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(req.predicate.is_empty());
    }
}
