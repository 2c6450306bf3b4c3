//! Defines the endpoints for listing records.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;

use crate::{
    AppState,
    record::{filter::RawRecordQuery, query::{list_installment_records, list_records}},
    response::{ApiResponse, PageInfo},
};

/// A route handler for listing records with filters and pagination.
///
/// Multi-valued filters take repeated query keys, e.g.
/// `?month=Agosto&month=Julio&category=E`. Invalid filter values fail the
/// whole request with the complete list of field errors.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn list_records_endpoint(
    State(state): State<AppState>,
    Query(raw_query): Query<RawRecordQuery>,
) -> Response {
    let (filter, page_request) = match raw_query.validate(&state.pagination_config) {
        Ok(validated) => validated,
        Err(error) => return error.into_response(),
    };

    let connection = state.db_connection.lock().unwrap();

    match list_records(&filter, page_request, &connection) {
        Ok(page) => ApiResponse::page(
            page.records,
            PageInfo {
                page: page.page,
                limit: page.limit,
                total: page.total,
                pages: page.pages,
            },
        )
        .into_response(StatusCode::OK),
        Err(error) => error.into_response(),
    }
}

/// A route handler for listing the records that belong to an installment
/// plan (expense types MSI and MCI), newest charge first.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn installment_records_endpoint(State(state): State<AppState>) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match list_installment_records(&connection) {
        Ok(records) => ApiResponse::ok(records).into_response(StatusCode::OK),
        Err(error) => error.into_response(),
    }
}
