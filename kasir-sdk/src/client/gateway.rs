//! Signed client for the gateway's hosted checkout API.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use super::ClientError;
use crate::objects::checkout::{CheckoutRequest, CheckoutResponse};
use crate::request_meta::RequestMeta;
use crate::signature::SignedRequest;

/// Outcome of a successful checkout call.
#[derive(Debug, Clone)]
pub struct CheckoutCreated {
    /// The `Request-Id` that was sent.
    pub request_id: String,
    pub response: CheckoutResponse,
}

/// Typed HTTP client for the gateway.
///
/// Every request is signed with the merchant client id and secret; see
/// [`crate::signature`].
#[derive(Clone)]
pub struct GatewayClient {
    http: Client,
    base_url: Url,
    client_id: String,
    secret: Vec<u8>,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("base_url", &self.base_url.as_str())
            .field("client_id", &self.client_id)
            .field("secret", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GatewayClient {
    /// Path of the hosted checkout endpoint, also the signed `Request-Target`.
    pub const CHECKOUT_TARGET: &'static str = "/checkout/v1/payment";

    /// * `base_url` is the gateway root (e.g. `https://api-sandbox.doku.com`).
    /// * `client_id` is the merchant client id, sent as `Client-Id`.
    /// * `secret` is the HMAC secret shared with the gateway.
    pub fn new(base_url: Url, client_id: impl Into<String>, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            client_id: client_id.into(),
            secret: secret.into(),
            timeout: None,
        }
    }

    /// Replace the default `reqwest::Client`, e.g. to share a connection pool.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Bound every call to `timeout`; expiry surfaces as [`ClientError::Http`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn endpoint(&self, target: &str) -> Result<Url, ClientError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{target}"))?)
    }

    /// `POST /checkout/v1/payment`: open a hosted payment page.
    pub async fn create_checkout(
        &self,
        body: &CheckoutRequest,
    ) -> Result<CheckoutCreated, ClientError> {
        let meta = RequestMeta::now(self.client_id.clone(), Self::CHECKOUT_TARGET);
        let signed = SignedRequest::new(meta, Some(body), &self.secret)?;
        let url = self.endpoint(Self::CHECKOUT_TARGET)?;

        let mut request = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        for (name, value) in signed.headers() {
            request = request.header(name, value);
        }

        tracing::debug!(request_id = %signed.meta.request_id, "sending checkout request");
        let resp = request.body(signed.json.unwrap_or_default()).send().await?;

        let response = parse_response(resp).await?;
        Ok(CheckoutCreated {
            request_id: signed.meta.request_id,
            response,
        })
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}
