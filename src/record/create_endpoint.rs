//! Defines the endpoint for creating a new record.

use axum::{Json, extract::State, http::StatusCode, response::{IntoResponse, Response}};

use crate::{
    AppState,
    record::{db::insert_record, form::RecordPayload},
    response::ApiResponse,
};

/// A route handler for creating a new record.
///
/// The body is validated before any write is attempted; a validation failure
/// returns the complete list of field errors and leaves the store untouched.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_record_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<RecordPayload>,
) -> Response {
    let draft = match payload.validate_create() {
        Ok(draft) => draft,
        Err(error) => return error.into_response(),
    };

    let connection = state.db_connection.lock().unwrap();

    match insert_record(draft, &connection) {
        Ok(record) => ApiResponse::ok_with_message(record, "Record created successfully")
            .into_response(StatusCode::CREATED),
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use axum::{Json, extract::State};

    use crate::{
        AppState,
        pagination::PaginationConfig,
        record::{db::get_record, form::RecordPayload},
    };

    use super::create_record_endpoint;

    fn get_test_state() -> AppState {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        AppState::new(conn, PaginationConfig::default()).unwrap()
    }

    fn valid_payload() -> RecordPayload {
        RecordPayload {
            concept: Some("Depósito".to_owned()),
            amount: Some(281.0),
            expense_type: Some("Fijo".to_owned()),
            payment_method: Some("BBVA Oro".to_owned()),
            month: Some("Agosto".to_owned()),
            year: Some(2025),
            charge_date: Some("2025-08-01".to_owned()),
            pay_date: Some("2025-08-15".to_owned()),
            category: Some("E".to_owned()),
            ..RecordPayload::default()
        }
    }

    #[tokio::test]
    async fn creates_a_record_and_returns_201() {
        let state = get_test_state();

        let response = create_record_endpoint(State(state.clone()), Json(valid_payload())).await;

        assert_eq!(response.status(), axum::http::StatusCode::CREATED);

        // The first record gets ID 1.
        let connection = state.db_connection.lock().unwrap();
        let record = get_record(1, &connection).unwrap();
        assert_eq!(record.concept, "Depósito");
        assert_eq!(record.amount, 281.0);
    }

    #[tokio::test]
    async fn validation_failure_writes_nothing() {
        let state = get_test_state();

        let response =
            create_record_endpoint(State(state.clone()), Json(RecordPayload::default())).await;

        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);

        let connection = state.db_connection.lock().unwrap();
        let count: i64 = connection
            .query_row("SELECT COUNT(id) FROM record", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
