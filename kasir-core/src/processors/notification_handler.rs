//! Webhook normalizer.
//!
//! Parses a gateway payment notification, recovers the canonical invoice id
//! from the decorated invoice number, maps the gateway status onto the
//! application vocabulary and overwrites the invoice's status record.
//!
//! Writes are blind overwrites. Two deliveries for the same invoice are not
//! ordered against each other, so a late `EXPIRED` can replace `PAID`.
//! Different invoices never share state.

use kanau::processor::Processor;
use kasir_sdk::invoice::{InvoiceId, normalize};
use kasir_sdk::objects::{PaymentNotification, PaymentStatus};
use time::OffsetDateTime;

use crate::entities::StoreError;
use crate::entities::invoice_status::{StatusRecord, WriteInvoiceStatus};
use crate::events::StatusHub;

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// The body is not a usable notification. Answered with 400 and never
    /// written.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Extract the status record a notification asks for, stamped `now`.
pub fn interpret(
    notification: &PaymentNotification,
    now: OffsetDateTime,
) -> Result<StatusRecord, NotificationError> {
    let invoice_number = notification
        .invoice_number()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| NotificationError::InvalidPayload("missing order.invoice_number".into()))?;
    let raw_status = notification
        .transaction_status()
        .ok_or_else(|| NotificationError::InvalidPayload("missing transaction.status".into()))?;

    let invoice_id = InvoiceId::parse(normalize(invoice_number))
        .map_err(|e| NotificationError::InvalidPayload(e.to_string()))?;

    Ok(StatusRecord {
        invoice_id,
        status: PaymentStatus::from_gateway(raw_status),
        raw_status: raw_status.to_owned(),
        updated_at: now,
    })
}

/// Applies notifications to a status store and fans them out to
/// subscribers.
pub struct NotificationHandler<'a, S> {
    store: &'a S,
    hub: &'a StatusHub,
}

impl<'a, S> NotificationHandler<'a, S>
where
    S: Processor<WriteInvoiceStatus, Output = (), Error = StoreError>,
{
    pub fn new(store: &'a S, hub: &'a StatusHub) -> Self {
        Self { store, hub }
    }

    /// Handle one delivery of the raw webhook body.
    ///
    /// Exactly one store write happens when this returns `Ok`; none happens
    /// on [`NotificationError::InvalidPayload`].
    pub async fn handle(&self, body: &[u8]) -> Result<StatusRecord, NotificationError> {
        let notification: PaymentNotification = serde_json::from_slice(body)
            .map_err(|e| NotificationError::InvalidPayload(e.to_string()))?;
        let record = interpret(&notification, OffsetDateTime::now_utc())?;

        self.store
            .process(WriteInvoiceStatus {
                record: record.clone(),
            })
            .await?;
        self.hub.publish(record.clone());

        tracing::info!(
            invoice_id = %record.invoice_id,
            status = %record.status,
            raw_status = %record.raw_status,
            channel = notification.channel_id().unwrap_or("-"),
            "payment notification applied"
        );
        Ok(record)
    }
}
