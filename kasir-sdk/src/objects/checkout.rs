//! Request and response bodies of the gateway's hosted checkout endpoint
//! (`POST /checkout/v1/payment`).
//!
//! Field order is the serialization order, and the serialized string is
//! what gets digested, so do not reorder fields casually.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub order: CheckoutOrder,
    pub payment: CheckoutPayment,
    pub customer: CheckoutCustomer,
    pub additional_info: AdditionalInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutOrder {
    pub amount: u64,
    /// Decorated invoice number, unique per submission.
    pub invoice_number: String,
    pub currency: String,
    pub callback_url: String,
    pub callback_url_cancel: String,
    pub callback_url_result: String,
    pub auto_redirect: bool,
    pub line_items: Vec<LineItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: u32,
    pub price: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutPayment {
    /// Minutes until the hosted page expires.
    pub payment_due_date: u32,
    pub payment_method_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutCustomer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalInfo {
    pub allow_tenor: Vec<u32>,
    pub override_notification_url: String,
}

/// Successful checkout response. Only the fields the server reads are
/// modelled; everything else is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutResponse {
    #[serde(default)]
    pub response: Option<CheckoutResponseBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutResponseBody {
    #[serde(default)]
    pub payment: Option<CheckoutPaymentInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutPaymentInfo {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default)]
    pub expired_date: Option<String>,
}

impl CheckoutResponse {
    /// The hosted payment page the payer should be redirected to.
    pub fn payment_url(&self) -> Option<&str> {
        self.response
            .as_ref()?
            .payment
            .as_ref()?
            .url
            .as_deref()
            .filter(|url| !url.is_empty())
    }
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayErrorBody {
    #[serde(default)]
    pub error_messages: Vec<String>,
}

impl GatewayErrorBody {
    /// First error message from an arbitrary JSON error body, if any.
    pub fn first_message(raw: &serde_json::Value) -> Option<String> {
        serde_json::from_value::<GatewayErrorBody>(raw.clone())
            .ok()?
            .error_messages
            .into_iter()
            .next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_url_extraction() {
        let body = r#"{
            "message": ["SUCCESS"],
            "response": {
                "order": {"amount": "8500000", "invoice_number": "INV-260208-A1B2-1"},
                "payment": {
                    "payment_method_types": ["CREDIT_CARD"],
                    "payment_due_date": 60,
                    "token_id": "tok",
                    "url": "https://sandbox.doku.com/checkout-link-v2/tok",
                    "expired_date": "20260208120000"
                }
            }
        }"#;
        let parsed: CheckoutResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.payment_url(),
            Some("https://sandbox.doku.com/checkout-link-v2/tok")
        );
    }

    #[test]
    fn test_payment_url_missing() {
        let parsed: CheckoutResponse = serde_json::from_str(r#"{"response":{}}"#).unwrap();
        assert_eq!(parsed.payment_url(), None);
        let parsed: CheckoutResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.payment_url(), None);
    }

    #[test]
    fn test_first_error_message() {
        let raw = serde_json::json!({"error_messages": ["Invalid Header Signature", "second"]});
        assert_eq!(
            GatewayErrorBody::first_message(&raw).as_deref(),
            Some("Invalid Header Signature")
        );
        assert_eq!(GatewayErrorBody::first_message(&serde_json::json!({})), None);
        assert_eq!(GatewayErrorBody::first_message(&serde_json::json!("nope")), None);
    }
}
