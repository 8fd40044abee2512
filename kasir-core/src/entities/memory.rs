//! In-process store.
//!
//! Implements the same messages as [`DatabaseProcessor`](crate::framework::DatabaseProcessor)
//! over plain maps, for tests that should not need Postgres.

use std::collections::HashMap;

use kanau::processor::Processor;
use kasir_sdk::invoice::InvoiceId;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::entities::invoice_status::{GetInvoiceStatus, StatusRecord, WriteInvoiceStatus};
use crate::entities::order_records::{CreateOrderRecord, GetOrderRecordById, OrderRecord};
use crate::entities::{OrderStatus, StoreError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    orders: RwLock<HashMap<InvoiceId, OrderRecord>>,
    statuses: RwLock<HashMap<InvoiceId, StatusRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of status writes that are currently visible, one per invoice.
    pub async fn status_count(&self) -> usize {
        self.statuses.read().await.len()
    }
}

impl Processor<CreateOrderRecord> for MemoryStore {
    type Output = OrderRecord;
    type Error = StoreError;
    async fn process(&self, insert: CreateOrderRecord) -> Result<OrderRecord, StoreError> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&insert.invoice_id) {
            return Err(StoreError::Duplicate);
        }
        let record = OrderRecord {
            invoice_id: insert.invoice_id.clone(),
            product_id: insert.product_id,
            product_name: insert.product_name,
            amount: insert.amount,
            customer: insert.customer,
            status: OrderStatus::Pending,
            created_at: OffsetDateTime::now_utc(),
        };
        orders.insert(insert.invoice_id, record.clone());
        Ok(record)
    }
}

impl Processor<GetOrderRecordById> for MemoryStore {
    type Output = Option<OrderRecord>;
    type Error = StoreError;
    async fn process(&self, query: GetOrderRecordById) -> Result<Option<OrderRecord>, StoreError> {
        Ok(self.orders.read().await.get(&query.invoice_id).cloned())
    }
}

impl Processor<WriteInvoiceStatus> for MemoryStore {
    type Output = ();
    type Error = StoreError;
    async fn process(&self, write: WriteInvoiceStatus) -> Result<(), StoreError> {
        let record = write.record;
        self.statuses
            .write()
            .await
            .insert(record.invoice_id.clone(), record);
        Ok(())
    }
}

impl Processor<GetInvoiceStatus> for MemoryStore {
    type Output = Option<StatusRecord>;
    type Error = StoreError;
    async fn process(&self, query: GetInvoiceStatus) -> Result<Option<StatusRecord>, StoreError> {
        Ok(self.statuses.read().await.get(&query.invoice_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kasir_sdk::objects::{Customer, PaymentStatus};

    fn id() -> InvoiceId {
        InvoiceId::parse("INV-260208-A1B2").unwrap()
    }

    fn insert() -> CreateOrderRecord {
        CreateOrderRecord {
            invoice_id: id(),
            product_id: "prod-01".to_string(),
            product_name: "Smartphone X Pro".to_string(),
            amount: 8_500_000,
            customer: Customer {
                name: "Sabda".to_string(),
                email: "sabda@example.com".to_string(),
                phone: None,
                address: None,
            },
        }
    }

    #[tokio::test]
    async fn test_duplicate_invoice_id_rejected() {
        let store = MemoryStore::new();
        let created = store.process(insert()).await.unwrap();
        assert_eq!(created.status, OrderStatus::Pending);
        assert!(matches!(
            store.process(insert()).await,
            Err(StoreError::Duplicate)
        ));
        let loaded = store
            .process(GetOrderRecordById { invoice_id: id() })
            .await
            .unwrap();
        assert_eq!(loaded, Some(created));
    }

    #[tokio::test]
    async fn test_status_write_overwrites() {
        let store = MemoryStore::new();
        for (status, raw) in [(PaymentStatus::Paid, "SUCCESS"), (PaymentStatus::Failed, "FAILED")] {
            store
                .process(WriteInvoiceStatus {
                    record: StatusRecord {
                        invoice_id: id(),
                        status,
                        raw_status: raw.to_string(),
                        updated_at: OffsetDateTime::now_utc(),
                    },
                })
                .await
                .unwrap();
        }
        let latest = store
            .process(GetInvoiceStatus { invoice_id: id() })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.status, PaymentStatus::Failed);
        assert_eq!(store.status_count().await, 1);
    }
}
