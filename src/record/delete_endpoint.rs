//! Defines the endpoint for deleting a record.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    AppState, database_id::RecordId, record::db::delete_record, response::ApiResponse,
};

/// A route handler for permanently deleting a record.
///
/// Deleting an unknown ID reports not-found, never a silent success.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_record_endpoint(
    State(state): State<AppState>,
    Path(record_id): Path<RecordId>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match delete_record(record_id, &connection) {
        Ok(()) => ApiResponse::confirmation("Record deleted successfully")
            .into_response(StatusCode::OK),
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use axum::extract::{Path, State};

    use crate::{
        AppState,
        pagination::PaginationConfig,
        record::{
            db::insert_record,
            models::{Category, Month},
            test_utils::record_draft,
        },
    };

    use super::delete_record_endpoint;

    fn get_test_state() -> AppState {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        AppState::new(conn, PaginationConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn deleting_twice_reports_not_found_the_second_time() {
        let state = get_test_state();
        let inserted = {
            let connection = state.db_connection.lock().unwrap();
            insert_record(
                record_draft("Cine", 120.0, Category::Expense, Month::July, 2025),
                &connection,
            )
            .unwrap()
        };

        let response = delete_record_endpoint(State(state.clone()), Path(inserted.id)).await;
        assert_eq!(response.status(), axum::http::StatusCode::OK);

        let response = delete_record_endpoint(State(state), Path(inserted.id)).await;
        assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
    }
}
