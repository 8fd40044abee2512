//! HTTP client for the payment gateway.
//!
//! Gated behind the `client` cargo feature so crates that only need the
//! signing primitives and wire types do not pull in `reqwest`.

mod gateway;

pub use gateway::{CheckoutCreated, GatewayClient};

use reqwest::StatusCode;

/// Errors produced by [`GatewayClient`].
///
/// None of the variants carry request headers, so formatting an error never
/// exposes the signature or the secret.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, timeout, connection reset, ...).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a non-2xx status.
    #[error("api error: status {status}, body: {body}")]
    Api { status: StatusCode, body: String },

    /// A body could not be serialized or the response was not valid JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The base URL could not be combined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}
