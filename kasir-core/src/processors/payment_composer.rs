//! Payment request composer.
//!
//! Turns a stored order into a signed hosted-checkout request, sends it and
//! reports either the payment page URL or a structured failure.
//!
//! The invoice number sent to the gateway is the canonical id decorated
//! with the current epoch millis, so resubmitting the same order opens a
//! new payment page instead of colliding with the previous attempt. The
//! notification handler strips the suffix again.

use kanau::processor::Processor;
use kasir_sdk::client::{ClientError, GatewayClient};
use kasir_sdk::objects::{
    AdditionalInfo, CheckoutCustomer, CheckoutOrder, CheckoutPayment, CheckoutRequest,
    GatewayErrorBody, LineItem,
};
use time::OffsetDateTime;
use url::Url;

use crate::config::GatewayConfig;
use crate::entities::order_records::OrderRecord;

/// Path on the storefront that receives gateway notifications.
pub const NOTIFICATION_PATH: &str = "/api/payment/notifications";

/// Message used when the gateway's error body carries no message.
pub const DEFAULT_UPSTREAM_MESSAGE: &str = "Payment gateway error";

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// The gateway answered with a non-2xx status.
    #[error("gateway rejected the request with status {status}: {message}")]
    Upstream {
        status: u16,
        /// First entry of the gateway's `error_messages`, if any.
        message: String,
        /// The raw response body, parsed as JSON when possible.
        details: serde_json::Value,
    },
    /// Network failure, timeout, or an unreadable response.
    #[error("gateway request failed: {0}")]
    Transport(#[source] ClientError),
    #[error("gateway response has no payment url")]
    MissingPaymentUrl,
}

impl From<ClientError> for PaymentError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Api { status, body } => {
                let details = serde_json::from_str(&body)
                    .unwrap_or(serde_json::Value::String(body));
                let message = GatewayErrorBody::first_message(&details)
                    .unwrap_or_else(|| DEFAULT_UPSTREAM_MESSAGE.to_string());
                PaymentError::Upstream {
                    status: status.as_u16(),
                    message,
                    details,
                }
            }
            other => PaymentError::Transport(other),
        }
    }
}

/// Open a payment page for `order`.
#[derive(Debug, Clone)]
pub struct CreatePayment {
    pub order: OrderRecord,
    /// Storefront origin; callback and notification URLs hang off it.
    pub origin: Url,
    /// Gateway-side customer id. A `CUST-{millis}` id is generated when absent.
    pub customer_id: Option<String>,
    /// Overrides the phone stored on the order.
    pub customer_phone: Option<String>,
    /// Overrides the address stored on the order.
    pub customer_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentCreated {
    pub payment_url: String,
    /// Decorated invoice number as submitted.
    pub invoice_number: String,
    /// `Request-Id` of the checkout call.
    pub request_id: String,
}

/// Composes and sends checkout requests.
///
/// Holds its own copy of the gateway settings, so build a fresh one from the
/// current config for each request after a reload.
#[derive(Debug, Clone)]
pub struct PaymentComposer {
    client: GatewayClient,
    currency: String,
    payment_due_date: u32,
    payment_method_types: Vec<String>,
    customer_country: String,
}

impl PaymentComposer {
    pub fn new(config: &GatewayConfig, http: reqwest::Client) -> Self {
        let client = GatewayClient::new(
            config.base_url.clone(),
            config.client_id.clone(),
            config.secret_bytes().to_vec(),
        )
        .with_http_client(http)
        .with_timeout(config.timeout);
        Self {
            client,
            currency: config.currency.clone(),
            payment_due_date: config.payment_due_date,
            payment_method_types: config.payment_method_types.clone(),
            customer_country: config.customer_country.clone(),
        }
    }

    /// Build the checkout body for `payment` as of `now`.
    pub fn compose(&self, payment: &CreatePayment, now: OffsetDateTime) -> CheckoutRequest {
        let millis = now.unix_timestamp_nanos() / 1_000_000;
        let order = &payment.order;
        let origin = payment.origin.as_str().trim_end_matches('/');
        let status_page = format!("{origin}/payment/{}", order.invoice_id);

        CheckoutRequest {
            order: CheckoutOrder {
                amount: order.amount,
                invoice_number: order.invoice_id.decorate(millis),
                currency: self.currency.clone(),
                callback_url: status_page.clone(),
                callback_url_cancel: status_page.clone(),
                callback_url_result: status_page,
                auto_redirect: true,
                line_items: vec![LineItem {
                    name: order.product_name.clone(),
                    quantity: 1,
                    price: order.amount,
                }],
            },
            payment: CheckoutPayment {
                payment_due_date: self.payment_due_date,
                payment_method_types: self.payment_method_types.clone(),
            },
            customer: CheckoutCustomer {
                id: payment
                    .customer_id
                    .clone()
                    .unwrap_or_else(|| format!("CUST-{millis}")),
                name: order.customer.name.clone(),
                email: order.customer.email.clone(),
                phone: payment
                    .customer_phone
                    .clone()
                    .or_else(|| order.customer.phone.clone())
                    .unwrap_or_default(),
                address: payment
                    .customer_address
                    .clone()
                    .or_else(|| order.customer.address.clone())
                    .unwrap_or_default(),
                country: self.customer_country.clone(),
            },
            additional_info: AdditionalInfo {
                allow_tenor: vec![0],
                override_notification_url: format!("{origin}{NOTIFICATION_PATH}"),
            },
        }
    }
}

impl Processor<CreatePayment> for PaymentComposer {
    type Output = PaymentCreated;
    type Error = PaymentError;
    #[tracing::instrument(skip_all, err, fields(invoice_id = %payment.order.invoice_id))]
    async fn process(&self, payment: CreatePayment) -> Result<PaymentCreated, PaymentError> {
        let body = self.compose(&payment, OffsetDateTime::now_utc());
        let invoice_number = body.order.invoice_number.clone();

        let created = self.client.create_checkout(&body).await.map_err(|err| {
            let err = PaymentError::from(err);
            if let PaymentError::Upstream {
                status, message, ..
            } = &err
            {
                tracing::warn!(http_status = *status, %message, "gateway rejected checkout");
            }
            err
        })?;
        let payment_url = created
            .response
            .payment_url()
            .ok_or(PaymentError::MissingPaymentUrl)?
            .to_string();

        tracing::info!(
            request_id = %created.request_id,
            %invoice_number,
            "payment page created"
        );
        Ok(PaymentCreated {
            payment_url,
            invoice_number,
            request_id: created.request_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::OrderStatus;
    use kasir_sdk::invoice::{InvoiceId, normalize};
    use kasir_sdk::objects::Customer;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SECRET: &str = "SK-very-secret-value";

    fn config(base_url: &str) -> GatewayConfig {
        GatewayConfig {
            client_id: "MCH-0001".to_string(),
            secret: SECRET.as_bytes().into(),
            base_url: Url::parse(base_url).unwrap(),
            currency: "IDR".to_string(),
            payment_due_date: 60,
            payment_method_types: vec!["CREDIT_CARD".to_string()],
            customer_country: "ID".to_string(),
            timeout: Duration::from_secs(5),
            verify_notifications: false,
        }
    }

    fn order() -> OrderRecord {
        OrderRecord {
            invoice_id: InvoiceId::parse("INV-260208-A1B2").unwrap(),
            product_id: "prod-01".to_string(),
            product_name: "Smartphone X Pro".to_string(),
            amount: 8_500_000,
            customer: Customer {
                name: "Sabda".to_string(),
                email: "sabda@example.com".to_string(),
                phone: Some("628111111111".to_string()),
                address: None,
            },
            status: OrderStatus::Pending,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn request() -> CreatePayment {
        CreatePayment {
            order: order(),
            origin: Url::parse("https://shop.example.com").unwrap(),
            customer_id: None,
            customer_phone: None,
            customer_address: Some("Jl. Somba Opu 10, Makassar".to_string()),
        }
    }

    #[test]
    fn test_compose_body() {
        let composer = PaymentComposer::new(&config("https://gw.example.com"), reqwest::Client::new());
        let now = OffsetDateTime::from_unix_timestamp(1_733_820_000).unwrap();
        let body = composer.compose(&request(), now);

        assert_eq!(body.order.invoice_number, "INV-260208-A1B2-1733820000000");
        assert_eq!(normalize(&body.order.invoice_number), "INV-260208-A1B2");
        assert_eq!(body.order.amount, 8_500_000);
        assert_eq!(body.order.currency, "IDR");
        for url in [
            &body.order.callback_url,
            &body.order.callback_url_cancel,
            &body.order.callback_url_result,
        ] {
            assert_eq!(url, "https://shop.example.com/payment/INV-260208-A1B2");
        }
        assert_eq!(
            body.order.line_items,
            vec![LineItem {
                name: "Smartphone X Pro".to_string(),
                quantity: 1,
                price: 8_500_000,
            }]
        );
        assert_eq!(body.customer.id, "CUST-1733820000000");
        assert_eq!(body.customer.phone, "628111111111");
        assert_eq!(body.customer.address, "Jl. Somba Opu 10, Makassar");
        assert_eq!(body.customer.country, "ID");
        assert_eq!(
            body.additional_info.override_notification_url,
            "https://shop.example.com/api/payment/notifications"
        );
        assert_eq!(body.payment.payment_method_types, vec!["CREDIT_CARD"]);
    }

    #[test]
    fn test_compose_keeps_supplied_customer_id() {
        let composer = PaymentComposer::new(&config("https://gw.example.com"), reqwest::Client::new());
        let mut payment = request();
        payment.customer_id = Some("CUST-42".to_string());
        let body = composer.compose(&payment, OffsetDateTime::now_utc());
        assert_eq!(body.customer.id, "CUST-42");
    }

    #[tokio::test]
    async fn test_success_returns_payment_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/checkout/v1/payment"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": ["SUCCESS"],
                "response": {"payment": {"url": "https://pay.example.com/p/abc", "token_id": "abc"}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let composer = PaymentComposer::new(&config(&server.uri()), reqwest::Client::new());
        let created = composer.process(request()).await.unwrap();
        assert_eq!(created.payment_url, "https://pay.example.com/p/abc");
        assert!(created.invoice_number.starts_with("INV-260208-A1B2-"));
        assert!(!created.request_id.is_empty());

        let sent = &server.received_requests().await.unwrap()[0];
        let body: serde_json::Value = serde_json::from_slice(&sent.body).unwrap();
        assert_eq!(body["order"]["invoice_number"], created.invoice_number.as_str());
    }

    #[tokio::test]
    async fn test_upstream_error_carries_first_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error_messages": ["Invalid Header Signature", "second"]
            })))
            .mount(&server)
            .await;

        let composer = PaymentComposer::new(&config(&server.uri()), reqwest::Client::new());
        match composer.process(request()).await {
            Err(PaymentError::Upstream {
                status,
                message,
                details,
            }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid Header Signature");
                assert_eq!(details["error_messages"][1], "second");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_upstream_error_without_messages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let composer = PaymentComposer::new(&config(&server.uri()), reqwest::Client::new());
        match composer.process(request()).await {
            Err(PaymentError::Upstream {
                status,
                message,
                details,
            }) => {
                assert_eq!(status, 502);
                assert_eq!(message, DEFAULT_UPSTREAM_MESSAGE);
                assert_eq!(details, serde_json::Value::String("Bad Gateway".to_string()));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_response_is_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let composer = PaymentComposer::new(&config(&server.uri()), reqwest::Client::new());
        let err = composer.process(request()).await.unwrap_err();
        assert!(matches!(err, PaymentError::Transport(ClientError::Json(_))));
        let rendered = format!("{err} {err:?}");
        assert!(!rendered.contains(SECRET));
        assert!(!rendered.contains("HMACSHA256="));
    }

    #[tokio::test]
    async fn test_timeout_is_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let mut cfg = config(&server.uri());
        cfg.timeout = Duration::from_millis(100);
        let composer = PaymentComposer::new(&cfg, reqwest::Client::new());
        let err = composer.process(request()).await.unwrap_err();
        assert!(matches!(err, PaymentError::Transport(ClientError::Http(_))));
    }

    #[tokio::test]
    async fn test_missing_payment_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": {"payment": {"url": ""}}
            })))
            .mount(&server)
            .await;

        let composer = PaymentComposer::new(&config(&server.uri()), reqwest::Client::new());
        assert!(matches!(
            composer.process(request()).await,
            Err(PaymentError::MissingPaymentUrl)
        ));
    }
}
