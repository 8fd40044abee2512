//! Payment creation and gateway notifications.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use kanau::processor::Processor;
use kasir_core::entities::StoreError;
use kasir_core::entities::order_records::GetOrderRecordById;
use kasir_core::processors::{
    CreatePayment, NotificationError, NotificationHandler, PaymentComposer, PaymentError,
};
use kasir_sdk::invoice::InvoiceId;
use kasir_sdk::objects::{
    CreatePaymentRequest, CreatePaymentResponse, NotificationAck, PaymentFailure,
};

use crate::api::extractors::NotificationBody;
use crate::state::AppState;

/// Errors of `POST /api/payment/create`. Every body has the
/// `{"success": false, "message": ..}` shape.
#[derive(Debug)]
pub(super) enum CreatePaymentError {
    /// The body was not a readable `CreatePaymentRequest`.
    InvalidBody(JsonRejection),
    InvalidInvoiceId,
    OrderNotFound,
    MissingOrigin,
    Store(StoreError),
    Payment(PaymentError),
}

impl IntoResponse for CreatePaymentError {
    fn into_response(self) -> Response {
        let (status, failure) = match self {
            CreatePaymentError::InvalidBody(rejection) => (
                rejection.status(),
                PaymentFailure::new(
                    "Invalid request body",
                    Some(serde_json::Value::String(rejection.body_text())),
                ),
            ),
            CreatePaymentError::InvalidInvoiceId => (
                StatusCode::BAD_REQUEST,
                PaymentFailure::new("Invalid invoice id", None),
            ),
            CreatePaymentError::OrderNotFound => (
                StatusCode::NOT_FOUND,
                PaymentFailure::new("Invoice not found", None),
            ),
            CreatePaymentError::MissingOrigin => (
                StatusCode::BAD_REQUEST,
                PaymentFailure::new("Missing origin", None),
            ),
            CreatePaymentError::Store(e) => {
                tracing::error!(error = %e, "payment creation store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    PaymentFailure::new("Internal Server Error", None),
                )
            }
            CreatePaymentError::Payment(PaymentError::Upstream {
                status,
                message,
                details,
            }) => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                PaymentFailure::new(message, Some(details)),
            ),
            CreatePaymentError::Payment(e) => {
                tracing::error!(error = %e, "payment creation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    PaymentFailure::new("Internal Server Error", None),
                )
            }
        };
        (status, Json(failure)).into_response()
    }
}

/// `POST /api/payment/create`: open a hosted payment page for an order.
///
/// The origin for callback URLs comes from the request, falling back to
/// `server.public_origin`.
pub(super) async fn create_payment(
    state: State<AppState>,
    payload: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, CreatePaymentError> {
    let Json(payload) = payload.map_err(CreatePaymentError::InvalidBody)?;
    let invoice_id = InvoiceId::from_decorated(&payload.invoice_id)
        .map_err(|_| CreatePaymentError::InvalidInvoiceId)?;

    let origin = match payload.origin {
        Some(origin) => origin,
        None => state
            .config
            .server
            .read()
            .await
            .public_origin
            .clone()
            .ok_or(CreatePaymentError::MissingOrigin)?,
    };

    let order = state
        .store()
        .process(GetOrderRecordById { invoice_id })
        .await
        .map_err(CreatePaymentError::Store)?
        .ok_or(CreatePaymentError::OrderNotFound)?;

    let composer = {
        let gateway = state.config.gateway.read().await;
        PaymentComposer::new(&gateway, state.http.clone())
    };

    let created = composer
        .process(CreatePayment {
            order,
            origin,
            customer_id: payload.customer_id,
            customer_phone: payload.customer_phone,
            customer_address: payload.customer_address,
        })
        .await
        .map_err(CreatePaymentError::Payment)?;

    Ok(Json(CreatePaymentResponse {
        success: true,
        payment_url: created.payment_url,
        invoice_number: created.invoice_number,
        request_id: created.request_id,
    }))
}

/// `POST /api/payment/notifications`: apply a gateway payment notification.
///
/// Answers 200 once the status is stored so the gateway stops retrying,
/// 400 when the invoice id or status cannot be read, 500 when the store
/// fails.
pub(super) async fn payment_notification(
    state: State<AppState>,
    NotificationBody(body): NotificationBody,
) -> impl IntoResponse {
    let store = state.store();
    let handler = NotificationHandler::new(&store, &state.status_hub);

    match handler.handle(&body).await {
        Ok(_) => (StatusCode::OK, Json(NotificationAck::new(NotificationAck::OK))),
        Err(NotificationError::InvalidPayload(reason)) => {
            tracing::warn!(%reason, "rejected payment notification payload");
            (
                StatusCode::BAD_REQUEST,
                Json(NotificationAck::new(NotificationAck::INVALID_PAYLOAD)),
            )
        }
        Err(NotificationError::Store(e)) => {
            tracing::error!(error = %e, "failed to store payment notification");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(NotificationAck::new(NotificationAck::INTERNAL_ERROR)),
            )
        }
    }
}
