//! Payment notification delivered by the gateway to the webhook endpoint.
//!
//! Every nested field is optional so a partial payload deserializes and the
//! handler can report a validation failure instead of a parse error.
//!
//! Only `order.invoice_number` and `transaction.status` are typed. Everything
//! else is kept as raw JSON, so a field the gateway sends with an unexpected
//! type never causes a resolvable notification to be rejected.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentNotification {
    #[serde(default)]
    pub order: Option<NotificationOrder>,
    #[serde(default)]
    pub transaction: Option<NotificationTransaction>,
    #[serde(default)]
    pub service: Option<Value>,
    #[serde(default)]
    pub acquirer: Option<Value>,
    #[serde(default)]
    pub channel: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationOrder {
    #[serde(default)]
    pub invoice_number: Option<String>,
    /// The gateway sends amounts as numbers or strings depending on channel.
    #[serde(default)]
    pub amount: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationTransaction {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub date: Option<Value>,
    #[serde(default)]
    pub original_request_id: Option<Value>,
}

impl PaymentNotification {
    /// `order.invoice_number`, when present.
    pub fn invoice_number(&self) -> Option<&str> {
        self.order.as_ref()?.invoice_number.as_deref()
    }

    /// `transaction.status`, when present.
    pub fn transaction_status(&self) -> Option<&str> {
        self.transaction.as_ref()?.status.as_deref()
    }

    /// `channel.id`, when present as a string. Logged only.
    pub fn channel_id(&self) -> Option<&str> {
        self.channel.as_ref()?.get("id")?.as_str()
    }
}

/// Body of every webhook response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAck {
    pub message: String,
}

impl NotificationAck {
    pub const OK: &'static str = "OK";
    pub const INVALID_PAYLOAD: &'static str = "Invalid payload";
    pub const INVALID_SIGNATURE: &'static str = "Invalid signature";
    pub const INTERNAL_ERROR: &'static str = "Internal Error";

    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_owned(),
        }
    }
}
