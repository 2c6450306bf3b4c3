//! Application router configuration.

use axum::{
    Router,
    http::StatusCode,
    response::Response,
    routing::{get, put},
};

use crate::{
    AppState,
    balance::{
        create_balance_item_endpoint, delete_balance_item_endpoint, list_balance_items_endpoint,
        update_balance_item_endpoint,
    },
    catalog::{
        categories_endpoint, expense_types_endpoint, months_endpoint, payment_methods_endpoint,
    },
    dashboard::dashboard_endpoint,
    debt::{
        create_debt_endpoint, delete_debt_endpoint, list_debts_endpoint, update_debt_endpoint,
    },
    endpoints,
    record::{
        create_record_endpoint, delete_record_endpoint, get_record_endpoint,
        installment_records_endpoint, list_records_endpoint, update_record_endpoint,
    },
    response::ApiResponse,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::RECORDS,
            get(list_records_endpoint).post(create_record_endpoint),
        )
        .route(
            endpoints::RECORD_INSTALLMENTS,
            get(installment_records_endpoint),
        )
        .route(
            endpoints::RECORD,
            get(get_record_endpoint)
                .put(update_record_endpoint)
                .delete(delete_record_endpoint),
        )
        .route(endpoints::DASHBOARD, get(dashboard_endpoint))
        .route(
            endpoints::DEBTS,
            get(list_debts_endpoint).post(create_debt_endpoint),
        )
        .route(
            endpoints::DEBT,
            put(update_debt_endpoint).delete(delete_debt_endpoint),
        )
        .route(
            endpoints::BALANCE,
            get(list_balance_items_endpoint).post(create_balance_item_endpoint),
        )
        .route(
            endpoints::BALANCE_ITEM,
            put(update_balance_item_endpoint).delete(delete_balance_item_endpoint),
        )
        .route(endpoints::CATALOG_EXPENSE_TYPES, get(expense_types_endpoint))
        .route(endpoints::CATALOG_CATEGORIES, get(categories_endpoint))
        .route(
            endpoints::CATALOG_PAYMENT_METHODS,
            get(payment_methods_endpoint),
        )
        .route(endpoints::CATALOG_MONTHS, get(months_endpoint))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The JSON fallback for unknown routes.
async fn get_404_not_found() -> Response {
    ApiResponse::message_only("Resource not found").into_response(StatusCode::NOT_FOUND)
}
