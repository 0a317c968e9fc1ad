//! Report endpoints
//!
//! Fixed joins, aggregates, and the structured animal search. Reads are
//! GET unless the request carries a body.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::common::{self, CountResponse, DataResponse};
use crate::db::reports::{Reports, SearchCondition};
use crate::http::server::AppState;

/// Cows under this weight count as underweight unless the caller says
/// otherwise.
const DEFAULT_UNDERWEIGHT_BOUND: i64 = 400;

#[derive(Debug, Deserialize)]
pub struct ShiftRosterRequest {
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct TransactionTotalsParams {
    pub min_total: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct UnderweightParams {
    pub max_weight: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct AnimalSearchRequest {
    #[serde(default)]
    pub conditions: Vec<SearchCondition>,
}

/// POST /reports/shift-roster - farmers on shift on a date
async fn shift_roster(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ShiftRosterRequest>,
) -> Json<DataResponse> {
    common::read_result(Reports::new(&state.db).shift_roster(&req.date).await)
}

/// GET /reports/machinery-by-condition
async fn machinery_by_condition(State(state): State<Arc<AppState>>) -> Json<DataResponse> {
    common::read_result(Reports::new(&state.db).machinery_by_condition().await)
}

/// GET /reports/transaction-totals?min_total=N
async fn transaction_totals(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TransactionTotalsParams>,
) -> Json<DataResponse> {
    let min_total = params.min_total.unwrap_or_default();
    common::read_result(Reports::new(&state.db).transaction_totals(min_total).await)
}

/// GET /reports/underweight-cows?max_weight=N
async fn underweight_cows(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UnderweightParams>,
) -> (axum::http::StatusCode, Json<CountResponse>) {
    let bound = params
        .max_weight
        .unwrap_or_else(|| Decimal::from(DEFAULT_UNDERWEIGHT_BOUND));
    common::count_result(Reports::new(&state.db).underweight_cows(bound).await)
}

/// GET /reports/super-farmers - farmers on shift every worked date
async fn super_farmers(State(state): State<Arc<AppState>>) -> Json<DataResponse> {
    common::read_result(Reports::new(&state.db).super_farmers().await)
}

/// POST /reports/animal-search - structured condition list
async fn animal_search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnimalSearchRequest>,
) -> Json<DataResponse> {
    common::read_result(Reports::new(&state.db).animal_search(&req.conditions).await)
}

/// GET /reports/egg-products
async fn egg_products(State(state): State<Arc<AppState>>) -> Json<DataResponse> {
    common::read_result(Reports::new(&state.db).egg_products().await)
}

/// GET /reports/dairy-products
async fn dairy_products(State(state): State<Arc<AppState>>) -> Json<DataResponse> {
    common::read_result(Reports::new(&state.db).dairy_products().await)
}

/// GET /reports/crop-products
async fn crop_products(State(state): State<Arc<AppState>>) -> Json<DataResponse> {
    common::read_result(Reports::new(&state.db).crop_products().await)
}

/// GET /reports/purchased-products
async fn purchased_products(State(state): State<Arc<AppState>>) -> Json<DataResponse> {
    common::read_result(Reports::new(&state.db).purchased_products().await)
}

/// Report routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reports/shift-roster", post(shift_roster))
        .route("/reports/machinery-by-condition", get(machinery_by_condition))
        .route("/reports/transaction-totals", get(transaction_totals))
        .route("/reports/underweight-cows", get(underweight_cows))
        .route("/reports/super-farmers", get(super_farmers))
        .route("/reports/animal-search", post(animal_search))
        .route("/reports/egg-products", get(egg_products))
        .route("/reports/dairy-products", get(dairy_products))
        .route("/reports/crop-products", get(crop_products))
        .route("/reports/purchased-products", get(purchased_products))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_params_accept_number_or_absent() {
        let p: TransactionTotalsParams = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(p.min_total.is_none());

        let p: TransactionTotalsParams =
            serde_json::from_value(serde_json::json!({ "min_total": 25.5 })).unwrap();
        assert_eq!(p.min_total.unwrap(), Decimal::new(255, 1));
    }

    #[test]
    fn search_request_conditions_default_empty() {
        let req: AnimalSearchRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(req.conditions.is_empty());
    }
}
