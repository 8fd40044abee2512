//! Storefront API types: catalog, orders and payment creation.

use crate::invoice::InvoiceId;
use serde::{Deserialize, Serialize};
use url::Url;

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Whole rupiah; IDR has no minor unit.
    pub price: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Order lifecycle as recorded on the invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Success,
    Failed,
    Expired,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Success => write!(f, "SUCCESS"),
            OrderStatus::Failed => write!(f, "FAILED"),
            OrderStatus::Expired => write!(f, "EXPIRED"),
        }
    }
}

/// `POST /api/orders` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub product_id: String,
    pub customer: Customer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResponse {
    pub invoice_id: InvoiceId,
    pub product_id: String,
    pub product_name: String,
    pub amount: u64,
    pub customer: Customer,
    pub status: OrderStatus,
    /// Unix timestamp (seconds).
    pub created_at: i64,
}

/// `POST /api/payment/create` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    /// Canonical or decorated invoice id.
    pub invoice_id: String,
    /// Storefront origin used for callback and notification URLs.
    #[serde(default)]
    pub origin: Option<Url>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentResponse {
    pub success: bool,
    pub payment_url: String,
    pub invoice_number: String,
    pub request_id: String,
}

/// Failure body of `POST /api/payment/create`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentFailure {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl PaymentFailure {
    pub fn new(message: impl Into<String>, details: Option<serde_json::Value>) -> Self {
        Self {
            success: false,
            message: message.into(),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_payment_request_camel_case() {
        let req: CreatePaymentRequest = serde_json::from_str(
            r#"{"invoiceId":"INV-260208-A1B2","origin":"https://shop.example.com","customerPhone":"628123456789"}"#,
        )
        .unwrap();
        assert_eq!(req.invoice_id, "INV-260208-A1B2");
        assert_eq!(req.origin.unwrap().as_str(), "https://shop.example.com/");
        assert_eq!(req.customer_phone.as_deref(), Some("628123456789"));
        assert!(req.customer_id.is_none());
    }

    #[test]
    fn test_order_status_wire_form() {
        assert_eq!(serde_json::to_string(&OrderStatus::Pending).unwrap(), r#""PENDING""#);
        assert_eq!(OrderStatus::Expired.to_string(), "EXPIRED");
    }

    #[test]
    fn test_failure_omits_missing_details() {
        let body = serde_json::to_value(PaymentFailure::new("Internal Server Error", None)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"success": false, "message": "Internal Server Error"})
        );
    }
}
