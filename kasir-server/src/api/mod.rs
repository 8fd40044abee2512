//! HTTP API.
//!
//! # Endpoints
//!
//! - `GET  /api/products`: catalog
//! - `POST /api/orders`: create an order for a product
//! - `GET  /api/orders/{invoice_id}`: order with its projected status
//! - `POST /api/payment/create`: open a hosted payment page
//! - `POST /api/payment/notifications`: gateway payment notifications
//! - `GET  /api/payment/{invoice_id}/status`: latest status record
//! - `GET  /api/payment/{invoice_id}/ws`: WebSocket status stream
//!
//! Invoice ids in paths may be canonical or decorated.

use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use kasir_core::entities::StoreError;
use kasir_sdk::invoice::InvoiceId;

use crate::state::AppState;

pub mod extractors;
mod payment;
mod shop;
mod status;

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(shop::list_products))
        .route("/api/orders", post(shop::create_order))
        .route("/api/orders/{invoice_id}", get(shop::get_order))
        .route("/api/payment/create", post(payment::create_payment))
        .route(
            "/api/payment/notifications",
            post(payment::payment_notification),
        )
        .route(
            "/api/payment/{invoice_id}/status",
            get(status::get_payment_status),
        )
        .route("/api/payment/{invoice_id}/ws", get(status::payment_status_ws))
}

/// Resolve a path segment to a canonical invoice id.
fn resolve_invoice_id(raw: &str) -> Result<InvoiceId, ApiError> {
    InvoiceId::from_decorated(raw).map_err(|_| ApiError::InvalidInvoiceId)
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors shared by the storefront and status handlers.
#[derive(Debug)]
enum ApiError {
    /// A store operation failed.
    Store(StoreError),
    /// The path did not contain a canonical invoice id.
    InvalidInvoiceId,
    /// The request body was not readable JSON of the expected shape.
    InvalidBody(JsonRejection),
    /// The request body failed validation.
    InvalidPayload(&'static str),
    NotFound(&'static str),
}

#[derive(serde::Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Store(e) => {
                tracing::error!(error = %e, "API store error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Error")
            }
            ApiError::InvalidInvoiceId => (StatusCode::BAD_REQUEST, "invalid invoice id"),
            ApiError::InvalidBody(rejection) => {
                tracing::debug!(reason = %rejection.body_text(), "unreadable request body");
                (rejection.status(), "invalid request body")
            }
            ApiError::InvalidPayload(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}
