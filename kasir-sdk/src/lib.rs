//! Wire-level building blocks for the Kasir checkout server.
//!
//! - [`request_meta`]: per-call request id and second-precision timestamp.
//! - [`signature`]: the canonical `HMACSHA256=` request signature.
//! - [`invoice`]: canonical invoice ids and their recovery from decorated
//!   invoice numbers.
//! - [`objects`]: JSON shapes exchanged with the gateway and the storefront.
//! - `client` (feature `client`): a signed HTTP client for the gateway.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]
#![forbid(unsafe_code)]

#[cfg(feature = "client")]
pub mod client;
pub mod invoice;
pub mod objects;
pub mod request_meta;
pub mod signature;
