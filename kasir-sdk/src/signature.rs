//! Request signing for the payment gateway.
//!
//! Every signed call carries a `Signature` header computed over a canonical,
//! newline-joined component string:
//!
//! ```text
//! Client-Id:{client_id}
//! Request-Id:{request_id}
//! Request-Timestamp:{request_timestamp}
//! Request-Target:{request_target}
//! Digest:{base64(sha256(json_body))}
//! ```
//!
//! The `Digest` line is present only when a body is sent. The header value
//! is `HMACSHA256={base64(hmac_sha256(components, secret))}`.
//!
//! The same scheme signs the notifications the gateway delivers back, so
//! [`verify`] checks an inbound `Signature` header against a raw body.

use crate::request_meta::RequestMeta;
use fast32::base64::RFC4648;
use ring::{digest, hmac};

/// Header carrying the merchant client id.
pub const CLIENT_ID_HEADER: &str = "Client-Id";

/// Header carrying the per-call request id.
pub const REQUEST_ID_HEADER: &str = "Request-Id";

/// Header carrying the request timestamp.
pub const REQUEST_TIMESTAMP_HEADER: &str = "Request-Timestamp";

/// Header carrying the HMAC signature.
pub const SIGNATURE_HEADER: &str = "Signature";

/// Algorithm tag prepended to every signature.
pub const SIGNATURE_PREFIX: &str = "HMACSHA256=";

/// Errors produced when checking an inbound signature.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("missing {0} header")]
    MissingHeader(&'static str),
    #[error("invalid signature header format")]
    InvalidFormat,
    #[error("invalid base64 encoding")]
    InvalidBase64,
    #[error("invalid signature")]
    SignatureMismatch,
}

impl From<ring::error::Unspecified> for SignatureError {
    fn from(_: ring::error::Unspecified) -> Self {
        Self::SignatureMismatch
    }
}

/// Base64 SHA-256 of the exact JSON body bytes.
pub fn digest(json_body: &str) -> String {
    let hash = digest::digest(&digest::SHA256, json_body.as_bytes());
    RFC4648.encode(hash.as_ref())
}

/// Build the canonical component string for `meta`.
///
/// `body_digest` is the output of [`digest`]; pass `None` for bodiless calls.
pub fn canonical_string(meta: &RequestMeta, body_digest: Option<&str>) -> String {
    let mut components = format!(
        "Client-Id:{}\nRequest-Id:{}\nRequest-Timestamp:{}\nRequest-Target:{}",
        meta.client_id, meta.request_id, meta.request_timestamp, meta.request_target
    );
    if let Some(body_digest) = body_digest {
        components.push_str("\nDigest:");
        components.push_str(body_digest);
    }
    components
}

fn raw_signature(meta: &RequestMeta, secret: &[u8], json_body: Option<&str>) -> hmac::Tag {
    let body_digest = json_body.map(digest);
    let components = canonical_string(meta, body_digest.as_deref());
    hmac::sign(
        &hmac::Key::new(hmac::HMAC_SHA256, secret),
        components.as_bytes(),
    )
}

/// Sign a request.
///
/// `json_body` must be the exact string that goes on the wire; key order and
/// whitespace change the digest. An empty `secret` still yields a signature,
/// which the gateway will reject.
pub fn sign(meta: &RequestMeta, secret: &[u8], json_body: Option<&str>) -> String {
    let tag = raw_signature(meta, secret, json_body);
    format!("{SIGNATURE_PREFIX}{}", RFC4648.encode(tag.as_ref()))
}

/// Verify a `Signature` header value against the request it claims to sign.
///
/// The comparison is constant-time.
pub fn verify(
    meta: &RequestMeta,
    secret: &[u8],
    json_body: Option<&str>,
    signature_header: &str,
) -> Result<(), SignatureError> {
    let encoded = signature_header
        .trim()
        .strip_prefix(SIGNATURE_PREFIX)
        .ok_or(SignatureError::InvalidFormat)?;
    let provided = RFC4648
        .decode_str(encoded)
        .map_err(|_| SignatureError::InvalidBase64)?;

    let body_digest = json_body.map(digest);
    let components = canonical_string(meta, body_digest.as_deref());
    hmac::verify(
        &hmac::Key::new(hmac::HMAC_SHA256, secret),
        components.as_bytes(),
        &provided,
    )?;
    Ok(())
}

/// A serialized body together with the headers that authenticate it.
///
/// The `json` field is exactly what was digested and must be sent verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub meta: RequestMeta,
    pub json: Option<String>,
    pub signature: String,
}

impl SignedRequest {
    /// Serialize `body` and sign it under `meta`.
    pub fn new<T: serde::Serialize>(
        meta: RequestMeta,
        body: Option<&T>,
        secret: &[u8],
    ) -> Result<Self, serde_json::Error> {
        let json = body.map(serde_json::to_string).transpose()?;
        let signature = sign(&meta, secret, json.as_deref());
        Ok(Self {
            meta,
            json,
            signature,
        })
    }

    /// Header name/value pairs to attach to the outbound request.
    pub fn headers(&self) -> [(&'static str, &str); 4] {
        [
            (CLIENT_ID_HEADER, self.meta.client_id.as_str()),
            (REQUEST_ID_HEADER, self.meta.request_id.as_str()),
            (REQUEST_TIMESTAMP_HEADER, self.meta.request_timestamp.as_str()),
            (SIGNATURE_HEADER, self.signature.as_str()),
        ]
    }
}
