//! Defines the endpoint for updating an existing record.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    database_id::RecordId,
    record::{db::update_record, form::RecordPayload},
    response::ApiResponse,
};

/// A route handler for partially or fully updating a record.
///
/// Only the fields present in the body are changed; they are validated with
/// the same rules as creation, collecting every violation.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn update_record_endpoint(
    State(state): State<AppState>,
    Path(record_id): Path<RecordId>,
    Json(payload): Json<RecordPayload>,
) -> Response {
    let changes = match payload.validate_update() {
        Ok(changes) => changes,
        Err(error) => return error.into_response(),
    };

    let connection = state.db_connection.lock().unwrap();

    match update_record(record_id, changes, &connection) {
        Ok(record) => ApiResponse::ok_with_message(record, "Record updated successfully")
            .into_response(StatusCode::OK),
        Err(error) => error.into_response(),
    }
}
