//! Payment status vocabulary and the status record as served to clients.

use crate::invoice::InvoiceId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Application-side payment status.
///
/// The gateway's `SUCCESS` becomes [`PaymentStatus::Paid`]; every other
/// gateway value is kept verbatim. The wire form is the uppercase string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Failed,
    Expired,
    Other(String),
}

impl PaymentStatus {
    /// The gateway value that means the payment went through.
    pub const GATEWAY_SUCCESS: &'static str = "SUCCESS";

    /// Map a gateway `transaction.status` onto the application vocabulary.
    pub fn from_gateway(raw: &str) -> Self {
        if raw == Self::GATEWAY_SUCCESS {
            Self::Paid
        } else {
            Self::from(raw.to_owned())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Paid => "PAID",
            Self::Pending => "PENDING",
            Self::Failed => "FAILED",
            Self::Expired => "EXPIRED",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for PaymentStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "PAID" => Self::Paid,
            "PENDING" => Self::Pending,
            "FAILED" => Self::Failed,
            "EXPIRED" => Self::Expired,
            _ => Self::Other(value),
        }
    }
}

impl From<PaymentStatus> for String {
    fn from(value: PaymentStatus) -> Self {
        match value {
            PaymentStatus::Other(other) => other,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest known status of an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub invoice_id: InvoiceId,
    pub status: PaymentStatus,
    /// The gateway's own status string, untouched.
    pub raw_status: String,
    /// Unix time in milliseconds.
    pub updated_at: i64,
}
