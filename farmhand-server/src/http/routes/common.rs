//! Response envelopes shared across routes
//!
//! Reads answer `{"data": rows}` with 200 even when a query degraded to
//! its empty sentinel; writes answer `{"success": bool}`, mirrored with
//! status 500 on failure. Only an unregistered table name surfaces as 404.

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::db::SqlValue;

/// Envelope for table reads: rows as ordered value arrays.
#[derive(Debug, Serialize)]
pub struct DataResponse {
    pub data: Vec<Vec<SqlValue>>,
}

/// Envelope for writes.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Envelope for count reads; `count` is `-1` when the query failed.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub success: bool,
    pub count: i64,
}

/// Status-mirrored write envelope.
pub fn write_result(success: bool) -> (StatusCode, Json<SuccessResponse>) {
    let status = if success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(SuccessResponse { success }))
}

/// Read envelope; always 200, failures already degraded to `[]`.
pub fn read_result(data: Vec<Vec<SqlValue>>) -> Json<DataResponse> {
    Json(DataResponse { data })
}

/// Count envelope; `-1` marks failure and mirrors to 500.
pub fn count_result(count: i64) -> (StatusCode, Json<CountResponse>) {
    let status = if count >= 0 {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (
        status,
        Json(CountResponse {
            success: count >= 0,
            count,
        }),
    )
}

/// 404 for writes against an unregistered table.
pub fn unknown_table_write(name: &str) -> (StatusCode, Json<SuccessResponse>) {
    tracing::warn!(table = name, "request for unregistered table");
    (StatusCode::NOT_FOUND, Json(SuccessResponse { success: false }))
}

/// 404 for reads against an unregistered table.
pub fn unknown_table_read(name: &str) -> (StatusCode, Json<DataResponse>) {
    tracing::warn!(table = name, "request for unregistered table");
    (StatusCode::NOT_FOUND, Json(DataResponse { data: Vec::new() }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_result_mirrors_status() {
        let (status, Json(body)) = write_result(true);
        assert_eq!(status, StatusCode::OK);
        assert!(body.success);

        let (status, Json(body)) = write_result(false);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.success);
    }

    #[test]
    fn count_result_uses_sentinel() {
        let (status, Json(body)) = count_result(-1);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.success);
        assert_eq!(body.count, -1);

        let (status, Json(body)) = count_result(0);
        assert_eq!(status, StatusCode::OK);
        assert!(body.success);
    }

    #[test]
    fn envelopes_serialize_expected_shape() {
        let body = serde_json::to_value(DataResponse {
            data: vec![vec![SqlValue::Integer(1)]],
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "data": [[1]] }));
    }
}
