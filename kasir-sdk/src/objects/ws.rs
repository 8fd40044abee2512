//! WebSocket message types for the invoice status stream.
//!
//! `GET /api/payment/{invoice_id}/ws` upgrades to a WebSocket and pushes
//! [`WsServerMessage`] JSON frames.
//!
//! # Protocol
//!
//! 1. If a status is already recorded, it is sent immediately.
//! 2. Every later write for the invoice is pushed as it happens, including
//!    repeats of the same value and writes that arrive out of order.
//! 3. The stream runs until the client closes it, or until the server shuts
//!    down, which closes it with [`WsCloseCode::GOING_AWAY`].

use serde::{Deserialize, Serialize};

use super::status::StatusResponse;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsServerMessage {
    StatusUpdate { status: StatusResponse },
    Error { code: u16, reason: String },
}

/// Close codes used by the status stream.
pub struct WsCloseCode;

impl WsCloseCode {
    pub const NORMAL: u16 = 1000;
    /// The server is shutting down.
    pub const GOING_AWAY: u16 = 1001;
    pub const INTERNAL_ERROR: u16 = 1011;
    /// The path did not contain a canonical invoice id.
    pub const INVALID_INVOICE: u16 = 4000;
}
