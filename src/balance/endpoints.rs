//! Route handlers for balance item CRUD.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    balance::{
        core::{delete_balance_item, insert_balance_item, list_balance_items, update_balance_item},
        form::BalanceItemPayload,
    },
    database_id::BalanceItemId,
    response::ApiResponse,
};

/// A route handler for listing every balance item, newest first.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn list_balance_items_endpoint(State(state): State<AppState>) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match list_balance_items(&connection) {
        Ok(items) => ApiResponse::ok(items).into_response(StatusCode::OK),
        Err(error) => error.into_response(),
    }
}

/// A route handler for creating a new balance item.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_balance_item_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<BalanceItemPayload>,
) -> Response {
    let draft = match payload.validate_create() {
        Ok(draft) => draft,
        Err(error) => return error.into_response(),
    };

    let connection = state.db_connection.lock().unwrap();

    match insert_balance_item(draft, &connection) {
        Ok(item) => ApiResponse::ok_with_message(item, "Balance item created successfully")
            .into_response(StatusCode::CREATED),
        Err(error) => error.into_response(),
    }
}

/// A route handler for partially or fully updating a balance item.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn update_balance_item_endpoint(
    State(state): State<AppState>,
    Path(balance_id): Path<BalanceItemId>,
    Json(payload): Json<BalanceItemPayload>,
) -> Response {
    let changes = match payload.validate_update() {
        Ok(changes) => changes,
        Err(error) => return error.into_response(),
    };

    let connection = state.db_connection.lock().unwrap();

    match update_balance_item(balance_id, changes, &connection) {
        Ok(item) => ApiResponse::ok_with_message(item, "Balance item updated successfully")
            .into_response(StatusCode::OK),
        Err(error) => error.into_response(),
    }
}

/// A route handler for permanently deleting a balance item.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_balance_item_endpoint(
    State(state): State<AppState>,
    Path(balance_id): Path<BalanceItemId>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match delete_balance_item(balance_id, &connection) {
        Ok(()) => ApiResponse::confirmation("Balance item deleted successfully")
            .into_response(StatusCode::OK),
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Json,
        extract::{Path, State},
    };

    use crate::{AppState, pagination::PaginationConfig};

    use super::{
        BalanceItemPayload, create_balance_item_endpoint, update_balance_item_endpoint,
    };

    fn get_test_state() -> AppState {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        AppState::new(conn, PaginationConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn creates_a_balance_item_and_returns_201() {
        let state = get_test_state();

        let payload = BalanceItemPayload {
            balance_type: Some("D".to_owned()),
            concept: Some("Nu débito".to_owned()),
            amount: Some(1500.0),
            expected_amount: Some(1450.0),
            ..BalanceItemPayload::default()
        };
        let response = create_balance_item_endpoint(State(state), Json(payload)).await;

        assert_eq!(response.status(), axum::http::StatusCode::CREATED);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["data"]["balance_type"], serde_json::json!("D"));
        assert_eq!(json["data"]["expected_amount"], serde_json::json!(1450.0));
    }

    #[tokio::test]
    async fn updating_an_unknown_balance_item_returns_404() {
        let state = get_test_state();

        let payload = BalanceItemPayload {
            amount: Some(10.0),
            ..BalanceItemPayload::default()
        };
        let response = update_balance_item_endpoint(State(state), Path(42), Json(payload)).await;

        assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
    }
}
