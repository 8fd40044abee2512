//! Broadcast hub for [`StatusRecord`] updates.
//!
//! Delivery is at-least-once from the subscriber's point of view: the same
//! status may arrive twice and writes for one invoice may arrive out of
//! chronological order. A subscriber that falls more than the channel
//! capacity behind skips the missed records and should re-read the store.

use kasir_sdk::invoice::InvoiceId;
use tokio::sync::broadcast;
use tokio_stream::{Stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use crate::entities::invoice_status::StatusRecord;

/// Buffered records per subscriber before it starts lagging.
pub const DEFAULT_HUB_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct StatusHub {
    tx: broadcast::Sender<StatusRecord>,
}

impl StatusHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish a record to every current subscriber. Having none is fine.
    pub fn publish(&self, record: StatusRecord) {
        let receivers = self.tx.send(record).unwrap_or(0);
        tracing::trace!(receivers, "published status record");
    }

    /// Records for `invoice_id`, from now on.
    ///
    /// The stream only ends when every clone of the hub is dropped. Dropping
    /// the stream unsubscribes.
    pub fn subscribe(
        &self,
        invoice_id: InvoiceId,
    ) -> impl Stream<Item = StatusRecord> + Send + Unpin + 'static {
        BroadcastStream::new(self.tx.subscribe()).filter_map(move |item| match item {
            Ok(record) if record.invoice_id == invoice_id => Some(record),
            Ok(_) => None,
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(%invoice_id, skipped, "status subscriber lagged");
                None
            }
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for StatusHub {
    fn default() -> Self {
        Self::new(DEFAULT_HUB_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kasir_sdk::objects::PaymentStatus;
    use time::OffsetDateTime;

    fn record(id: &str, status: PaymentStatus) -> StatusRecord {
        StatusRecord {
            invoice_id: InvoiceId::parse(id).unwrap(),
            raw_status: status.to_string(),
            status,
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn test_subscriber_sees_only_its_invoice() {
        let hub = StatusHub::default();
        let mut stream = hub.subscribe(InvoiceId::parse("INV-260208-A1B2").unwrap());

        hub.publish(record("INV-260208-Z9Z9", PaymentStatus::Paid));
        hub.publish(record("INV-260208-A1B2", PaymentStatus::Pending));
        hub.publish(record("INV-260208-A1B2", PaymentStatus::Paid));

        assert_eq!(stream.next().await.unwrap().status, PaymentStatus::Pending);
        assert_eq!(stream.next().await.unwrap().status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_repeated_values_are_delivered() {
        let hub = StatusHub::default();
        let mut stream = hub.subscribe(InvoiceId::parse("INV-260208-A1B2").unwrap());
        hub.publish(record("INV-260208-A1B2", PaymentStatus::Paid));
        hub.publish(record("INV-260208-A1B2", PaymentStatus::Paid));
        assert_eq!(stream.next().await.unwrap().status, PaymentStatus::Paid);
        assert_eq!(stream.next().await.unwrap().status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_lagged_subscriber_skips_and_continues() {
        let hub = StatusHub::new(2);
        let mut stream = hub.subscribe(InvoiceId::parse("INV-260208-A1B2").unwrap());
        for _ in 0..4 {
            hub.publish(record("INV-260208-A1B2", PaymentStatus::Pending));
        }
        hub.publish(record("INV-260208-A1B2", PaymentStatus::Expired));

        let mut last = None;
        while let Ok(Some(item)) =
            tokio::time::timeout(std::time::Duration::from_millis(50), stream.next()).await
        {
            last = Some(item.status);
        }
        assert_eq!(last, Some(PaymentStatus::Expired));
    }

    #[tokio::test]
    async fn test_dropping_stream_unsubscribes() {
        let hub = StatusHub::default();
        let stream = hub.subscribe(InvoiceId::parse("INV-260208-A1B2").unwrap());
        assert_eq!(hub.subscriber_count(), 1);
        drop(stream);
        assert_eq!(hub.subscriber_count(), 0);
    }
}
