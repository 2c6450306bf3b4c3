//! Static catalog endpoints.
//!
//! The catalogs are fixed enumerations compiled into the binary; they carry
//! no state and no query logic.

use axum::{http::StatusCode, response::Response};
use serde::Serialize;

use crate::{
    record::{Category, ExpenseType, Month},
    response::ApiResponse,
};

/// The known payment methods, offered to clients as suggestions. The
/// `payment_method` field of a record is free text and is not restricted to
/// this list.
pub const PAYMENT_METHODS: [&str; 6] = [
    "BBVA Oro",
    "Klar Platino",
    "Mercado Pago",
    "Nu débito",
    "Efectivo",
    "TDC Free",
];

/// One entry of a coded catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// The wire code clients send in requests.
    pub code: &'static str,
    /// A human readable name for the entry.
    pub name: &'static str,
}

/// A route handler for the expense type catalog.
pub async fn expense_types_endpoint() -> Response {
    let entries: Vec<CatalogEntry> = ExpenseType::ALL
        .iter()
        .map(|expense_type| CatalogEntry {
            code: expense_type.as_str(),
            name: expense_type.description(),
        })
        .collect();

    ApiResponse::ok(entries).into_response(StatusCode::OK)
}

/// A route handler for the category catalog.
pub async fn categories_endpoint() -> Response {
    let entries: Vec<CatalogEntry> = Category::ALL
        .iter()
        .map(|category| CatalogEntry {
            code: category.as_str(),
            name: category.description(),
        })
        .collect();

    ApiResponse::ok(entries).into_response(StatusCode::OK)
}

/// A route handler for the payment method catalog.
pub async fn payment_methods_endpoint() -> Response {
    ApiResponse::ok(PAYMENT_METHODS.to_vec()).into_response(StatusCode::OK)
}

/// A route handler for the month catalog, in calendar order.
pub async fn months_endpoint() -> Response {
    let months: Vec<&'static str> = Month::ALL.iter().map(|month| month.name()).collect();

    ApiResponse::ok(months).into_response(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::months_endpoint;

    #[tokio::test]
    async fn months_are_served_in_calendar_order() {
        let response = months_endpoint().await;

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        let months = json["data"].as_array().unwrap();
        assert_eq!(months.len(), 12);
        assert_eq!(months[0], "Enero");
        assert_eq!(months[7], "Agosto");
        assert_eq!(months[11], "Diciembre");
    }
}
