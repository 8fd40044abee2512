//! Custom Axum extractors for request authentication.
//!
//! Provides `NotificationBody`, which reads the raw webhook body and, when
//! `gateway.verify_notifications` is enabled, checks the gateway's
//! `Signature` header over it. All cryptographic operations are delegated
//! to [`kasir_sdk::signature`].

use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use kasir_core::processors::payment_composer::NOTIFICATION_PATH;
use kasir_sdk::objects::NotificationAck;
use kasir_sdk::request_meta::RequestMeta;
use kasir_sdk::signature::{
    self, CLIENT_ID_HEADER, REQUEST_ID_HEADER, REQUEST_TIMESTAMP_HEADER, SIGNATURE_HEADER,
    SignatureError,
};

use crate::state::AppState;

/// Largest webhook body accepted.
const MAX_NOTIFICATION_BYTES: usize = 64 * 1024;

/// Raw bytes of an inbound payment notification, authenticated when the
/// server is configured to verify notifications.
///
/// # Header format
///
/// ```text
/// Client-Id:         MCH-0001
/// Request-Id:        <gateway request id>
/// Request-Timestamp: 2026-02-08T10:00:00Z
/// Signature:         HMACSHA256=<base64>
/// ```
///
/// The signature covers the canonical component string with
/// `Request-Target: /api/payment/notifications` and the digest of the raw
/// body.
pub struct NotificationBody(pub Bytes);

/// Errors returned by the [`NotificationBody`] extractor.
#[derive(Debug, thiserror::Error)]
pub enum NotificationBodyError {
    #[error("failed to read request body")]
    BodyReadError,
    #[error("signature verification failed: {0}")]
    InvalidSignature(#[from] SignatureError),
}

impl IntoResponse for NotificationBodyError {
    fn into_response(self) -> Response {
        match self {
            NotificationBodyError::BodyReadError => (
                StatusCode::BAD_REQUEST,
                Json(NotificationAck::new(NotificationAck::INVALID_PAYLOAD)),
            )
                .into_response(),
            NotificationBodyError::InvalidSignature(e) => {
                tracing::warn!(error = %e, "rejected payment notification");
                (
                    StatusCode::UNAUTHORIZED,
                    Json(NotificationAck::new(NotificationAck::INVALID_SIGNATURE)),
                )
                    .into_response()
            }
        }
    }
}

fn header(headers: &HeaderMap, name: &'static str) -> Result<String, SignatureError> {
    headers
        .get(name)
        .ok_or(SignatureError::MissingHeader(name))?
        .to_str()
        .map(str::to_owned)
        .map_err(|_| SignatureError::InvalidFormat)
}

/// Check the gateway signature on a notification.
fn verify_notification(
    headers: &HeaderMap,
    body: &[u8],
    client_id: &str,
    secret: &[u8],
) -> Result<(), SignatureError> {
    let meta = RequestMeta {
        client_id: header(headers, CLIENT_ID_HEADER)?,
        request_id: header(headers, REQUEST_ID_HEADER)?,
        request_timestamp: header(headers, REQUEST_TIMESTAMP_HEADER)?,
        request_target: NOTIFICATION_PATH.to_string(),
    };
    if meta.client_id != client_id {
        return Err(SignatureError::SignatureMismatch);
    }
    let signature_header = header(headers, SIGNATURE_HEADER)?;
    let body = std::str::from_utf8(body).map_err(|_| SignatureError::SignatureMismatch)?;
    signature::verify(&meta, secret, Some(body), &signature_header)
}

impl FromRequest<AppState> for NotificationBody {
    type Rejection = NotificationBodyError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();
        let bytes = axum::body::to_bytes(body, MAX_NOTIFICATION_BYTES)
            .await
            .map_err(|_| NotificationBodyError::BodyReadError)?;

        let gateway = state.config.gateway.read().await;
        if gateway.verify_notifications {
            verify_notification(
                &parts.headers,
                &bytes,
                &gateway.client_id,
                gateway.secret_bytes(),
            )?;
        }
        drop(gateway);

        Ok(NotificationBody(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn signed_headers(body: &str, secret: &[u8]) -> HeaderMap {
        let meta = RequestMeta {
            client_id: "MCH-0001".to_string(),
            request_id: "b1d2c3e4-0000-4000-8000-000000000001".to_string(),
            request_timestamp: "2026-02-08T10:00:00Z".to_string(),
            request_target: NOTIFICATION_PATH.to_string(),
        };
        let mut headers = HeaderMap::new();
        headers.insert(CLIENT_ID_HEADER, HeaderValue::from_str(&meta.client_id).unwrap());
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(&meta.request_id).unwrap());
        headers.insert(
            REQUEST_TIMESTAMP_HEADER,
            HeaderValue::from_str(&meta.request_timestamp).unwrap(),
        );
        headers.insert(
            SIGNATURE_HEADER,
            HeaderValue::from_str(&signature::sign(&meta, secret, Some(body))).unwrap(),
        );
        headers
    }

    #[test]
    fn test_valid_signature_accepted() {
        let body = r#"{"order":{"invoice_number":"INV-260208-A1B2-1"}}"#;
        let headers = signed_headers(body, b"secret");
        assert!(verify_notification(&headers, body.as_bytes(), "MCH-0001", b"secret").is_ok());
    }

    #[test]
    fn test_tampered_body_rejected() {
        let headers = signed_headers(r#"{"transaction":{"status":"FAILED"}}"#, b"secret");
        let err = verify_notification(
            &headers,
            br#"{"transaction":{"status":"SUCCESS"}}"#,
            "MCH-0001",
            b"secret",
        )
        .unwrap_err();
        assert!(matches!(err, SignatureError::SignatureMismatch));
    }

    #[test]
    fn test_foreign_client_id_rejected() {
        let body = "{}";
        let headers = signed_headers(body, b"secret");
        assert!(verify_notification(&headers, body.as_bytes(), "MCH-9999", b"secret").is_err());
    }

    #[test]
    fn test_missing_header_reported() {
        let body = "{}";
        let mut headers = signed_headers(body, b"secret");
        headers.remove(REQUEST_TIMESTAMP_HEADER);
        assert!(matches!(
            verify_notification(&headers, body.as_bytes(), "MCH-0001", b"secret"),
            Err(SignatureError::MissingHeader(REQUEST_TIMESTAMP_HEADER))
        ));
    }
}
