//! Route handlers for debt CRUD.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    database_id::DebtId,
    debt::{
        core::{delete_debt, insert_debt, list_debts, update_debt},
        form::DebtPayload,
    },
    response::ApiResponse,
};

/// A route handler for listing every debt, newest date first.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn list_debts_endpoint(State(state): State<AppState>) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match list_debts(&connection) {
        Ok(debts) => ApiResponse::ok(debts).into_response(StatusCode::OK),
        Err(error) => error.into_response(),
    }
}

/// A route handler for creating a new debt.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_debt_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<DebtPayload>,
) -> Response {
    let draft = match payload.validate_create() {
        Ok(draft) => draft,
        Err(error) => return error.into_response(),
    };

    let connection = state.db_connection.lock().unwrap();

    match insert_debt(draft, &connection) {
        Ok(debt) => ApiResponse::ok_with_message(debt, "Debt created successfully")
            .into_response(StatusCode::CREATED),
        Err(error) => error.into_response(),
    }
}

/// A route handler for partially or fully updating a debt.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn update_debt_endpoint(
    State(state): State<AppState>,
    Path(debt_id): Path<DebtId>,
    Json(payload): Json<DebtPayload>,
) -> Response {
    let changes = match payload.validate_update() {
        Ok(changes) => changes,
        Err(error) => return error.into_response(),
    };

    let connection = state.db_connection.lock().unwrap();

    match update_debt(debt_id, changes, &connection) {
        Ok(debt) => ApiResponse::ok_with_message(debt, "Debt updated successfully")
            .into_response(StatusCode::OK),
        Err(error) => error.into_response(),
    }
}

/// A route handler for permanently deleting a debt.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_debt_endpoint(
    State(state): State<AppState>,
    Path(debt_id): Path<DebtId>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match delete_debt(debt_id, &connection) {
        Ok(()) => {
            ApiResponse::confirmation("Debt deleted successfully").into_response(StatusCode::OK)
        }
        Err(error) => error.into_response(),
    }
}
