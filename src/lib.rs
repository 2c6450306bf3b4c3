//! Money Monitor is a REST API for tracking personal expenses and income,
//! standing debts, and account reconciliation entries.
//!
//! The API serves JSON using a uniform response envelope and is backed by a
//! SQLite database.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod app_state;
mod balance;
mod catalog;
mod dashboard;
mod database_id;
mod db;
mod debt;
mod endpoints;
mod pagination;
mod record;
mod response;
mod routing;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use pagination::PaginationConfig;
pub use response::FieldError;
pub use routing::build_router;

use crate::response::ApiResponse;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A create or update request body failed validation.
    ///
    /// Carries one entry per offending field. All violations are collected
    /// before the error is returned, never just the first one.
    #[error("the request body failed validation")]
    InvalidInput(Vec<FieldError>),

    /// A query string (filters, pagination, dashboard scope) failed
    /// validation. Carries one entry per offending field.
    #[error("the request query failed validation")]
    InvalidFilters(Vec<FieldError>),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a record that does not exist
    #[error("tried to update a record that is not in the database")]
    UpdateMissingRecord,

    /// Tried to delete a record that does not exist
    #[error("tried to delete a record that is not in the database")]
    DeleteMissingRecord,

    /// Tried to update a debt that does not exist
    #[error("tried to update a debt that is not in the database")]
    UpdateMissingDebt,

    /// Tried to delete a debt that does not exist
    #[error("tried to delete a debt that is not in the database")]
    DeleteMissingDebt,

    /// Tried to update a balance item that does not exist
    #[error("tried to update a balance item that is not in the database")]
    UpdateMissingBalanceItem,

    /// Tried to delete a balance item that does not exist
    #[error("tried to delete a balance item that is not in the database")]
    DeleteMissingBalanceItem,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// A dashboard query task was cancelled or panicked before completing.
    #[error("a dashboard query task failed to run to completion")]
    TaskJoin,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::InvalidInput(errors) => {
                ApiResponse::failure("Invalid input data", errors).into_response(StatusCode::BAD_REQUEST)
            }
            Error::InvalidFilters(errors) => {
                ApiResponse::failure("Invalid filters", errors).into_response(StatusCode::BAD_REQUEST)
            }
            Error::NotFound => ApiResponse::message_only("Resource not found")
                .into_response(StatusCode::NOT_FOUND),
            Error::UpdateMissingRecord | Error::DeleteMissingRecord => {
                ApiResponse::message_only("Record not found").into_response(StatusCode::NOT_FOUND)
            }
            Error::UpdateMissingDebt | Error::DeleteMissingDebt => {
                ApiResponse::message_only("Debt not found").into_response(StatusCode::NOT_FOUND)
            }
            Error::UpdateMissingBalanceItem | Error::DeleteMissingBalanceItem => {
                ApiResponse::message_only("Balance item not found")
                    .into_response(StatusCode::NOT_FOUND)
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                ApiResponse::message_only("An internal error occurred")
                    .into_response(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}
