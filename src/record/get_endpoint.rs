//! Defines the endpoint for fetching a single record by ID.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{AppState, Error, database_id::RecordId, record::db::get_record, response::ApiResponse};

/// A route handler for fetching one record by its ID.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_record_endpoint(
    State(state): State<AppState>,
    Path(record_id): Path<RecordId>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match get_record(record_id, &connection) {
        Ok(record) => ApiResponse::ok(record).into_response(StatusCode::OK),
        Err(Error::NotFound) => {
            ApiResponse::message_only("Record not found").into_response(StatusCode::NOT_FOUND)
        }
        Err(error) => error.into_response(),
    }
}
