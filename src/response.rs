//! The JSON response envelope shared by every endpoint.
//!
//! Every response has the shape
//! `{"success": bool, "data"?: T, "message"?: string, "errors"?: [...]}`.
//! List endpoints additionally carry a `"pagination"` object.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// The name of the offending request field.
    pub field: String,
    /// What was wrong with the supplied value.
    pub message: String,
}

impl FieldError {
    /// Create a field error for `field` with `message`.
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_owned(),
            message: message.into(),
        }
    }
}

/// Pagination metadata reported alongside paginated list data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    /// The 1-based page number that was served.
    pub page: u64,
    /// The maximum number of items per page.
    pub limit: u64,
    /// The number of items matching the query, ignoring pagination.
    pub total: u64,
    /// The number of pages needed to serve all matching items.
    pub pages: u64,
}

/// The response envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was served successfully.
    pub success: bool,
    /// The response payload, omitted on errors and bare confirmations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// A human readable status message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Field-level validation errors, present only on validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    /// Pagination metadata, present only on paginated list responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageInfo>,
}

impl<T: Serialize> ApiResponse<T> {
    /// A successful response carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            pagination: None,
        }
    }

    /// A successful response carrying `data` and a status message.
    pub fn ok_with_message(data: T, message: &str) -> Self {
        Self {
            message: Some(message.to_owned()),
            ..Self::ok(data)
        }
    }

    /// A successful paginated list response.
    pub fn page(data: T, pagination: PageInfo) -> Self {
        Self {
            pagination: Some(pagination),
            ..Self::ok(data)
        }
    }

    /// Convert the envelope into an HTTP response with the given status code.
    pub fn into_response(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

impl ApiResponse<()> {
    /// A response carrying only a status message, e.g. after a delete or for
    /// a not-found error. `success` is true only for 2xx status codes, which
    /// is decided by the caller via [ApiResponse::into_response].
    pub fn message_only(message: &str) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.to_owned()),
            errors: None,
            pagination: None,
        }
    }

    /// A successful bare confirmation, e.g. after a delete.
    pub fn confirmation(message: &str) -> Self {
        Self {
            success: true,
            ..Self::message_only(message)
        }
    }

    /// A failed validation response with the complete list of field errors.
    pub fn failure(message: &str, errors: Vec<FieldError>) -> Self {
        Self {
            errors: Some(errors),
            ..Self::message_only(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::{ApiResponse, FieldError, PageInfo};

    #[test]
    fn ok_envelope_omits_error_fields() {
        let envelope = ApiResponse::ok(vec![1, 2, 3]);

        let got = serde_json::to_value(&envelope).unwrap();

        assert_eq!(
            got,
            serde_json::json!({"success": true, "data": [1, 2, 3]})
        );
    }

    #[test]
    fn failure_envelope_lists_every_field_error() {
        let envelope = ApiResponse::failure(
            "Invalid input data",
            vec![
                FieldError::new("concept", "Concept is required"),
                FieldError::new("amount", "Amount is required"),
            ],
        );

        let got = serde_json::to_value(&envelope).unwrap();

        assert_eq!(got["success"], serde_json::json!(false));
        assert_eq!(got["errors"].as_array().unwrap().len(), 2);
        assert_eq!(got["errors"][1]["field"], "amount");
    }

    #[test]
    fn page_envelope_carries_pagination_metadata() {
        let envelope = ApiResponse::page(
            vec!["a", "b"],
            PageInfo {
                page: 2,
                limit: 2,
                total: 5,
                pages: 3,
            },
        );

        let got = serde_json::to_value(&envelope).unwrap();

        assert_eq!(got["pagination"]["total"], serde_json::json!(5));
        assert_eq!(got["pagination"]["pages"], serde_json::json!(3));
    }

    #[test]
    fn into_response_uses_the_given_status() {
        let response = ApiResponse::message_only("Record not found")
            .into_response(StatusCode::NOT_FOUND);

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
