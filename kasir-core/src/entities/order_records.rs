use crate::entities::{OrderStatus, StoreError};
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use kasir_sdk::invoice::InvoiceId;
use kasir_sdk::objects::{Customer, OrderResponse, PaymentStatus};
use sqlx::types::Json;
use time::OffsetDateTime;

/// An order as stored. Amount and product name are copied from the catalog
/// at creation and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub invoice_id: InvoiceId,
    pub product_id: String,
    pub product_name: String,
    /// Whole rupiah, always positive.
    pub amount: u64,
    pub customer: Customer,
    pub status: OrderStatus,
    pub created_at: OffsetDateTime,
}

impl OrderRecord {
    /// API view of the order, with the status taken from the latest payment
    /// status when one is known.
    pub fn to_response(&self, latest: Option<&PaymentStatus>) -> OrderResponse {
        let status = latest.and_then(order_status_for).unwrap_or(self.status);
        OrderResponse {
            invoice_id: self.invoice_id.clone(),
            product_id: self.product_id.clone(),
            product_name: self.product_name.clone(),
            amount: self.amount,
            customer: self.customer.clone(),
            status: status.into(),
            created_at: self.created_at.unix_timestamp(),
        }
    }
}

/// Order status implied by a payment status. Non-terminal values say
/// nothing about the order.
pub fn order_status_for(status: &PaymentStatus) -> Option<OrderStatus> {
    match status {
        PaymentStatus::Paid => Some(OrderStatus::Success),
        PaymentStatus::Failed => Some(OrderStatus::Failed),
        PaymentStatus::Expired => Some(OrderStatus::Expired),
        PaymentStatus::Pending | PaymentStatus::Other(_) => None,
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    invoice_id: String,
    product_id: String,
    product_name: String,
    amount: i64,
    customer: Json<Customer>,
    status: OrderStatus,
    created_at: OffsetDateTime,
}

impl TryFrom<OrderRow> for OrderRecord {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, StoreError> {
        let invoice_id =
            InvoiceId::parse(&row.invoice_id).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let amount = u64::try_from(row.amount)
            .map_err(|_| StoreError::Corrupt(format!("negative amount {}", row.amount)))?;
        Ok(OrderRecord {
            invoice_id,
            product_id: row.product_id,
            product_name: row.product_name,
            amount,
            customer: row.customer.0,
            status: row.status,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone)]
/// Insert a new order in `PENDING` state.
///
/// Fails with [`StoreError::Duplicate`] when the invoice id is taken.
pub struct CreateOrderRecord {
    pub invoice_id: InvoiceId,
    pub product_id: String,
    pub product_name: String,
    pub amount: u64,
    pub customer: Customer,
}

impl Processor<CreateOrderRecord> for DatabaseProcessor {
    type Output = OrderRecord;
    type Error = StoreError;
    #[tracing::instrument(skip_all, err, name = "SQL:CreateOrderRecord")]
    async fn process(&self, insert: CreateOrderRecord) -> Result<OrderRecord, StoreError> {
        let amount = i64::try_from(insert.amount)
            .map_err(|_| StoreError::Corrupt(format!("amount {} out of range", insert.amount)))?;
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            INSERT INTO invoices (invoice_id, product_id, product_name, amount, customer, status)
            VALUES ($1, $2, $3, $4, $5, 'PENDING')
            RETURNING invoice_id, product_id, product_name, amount, customer, status, created_at
            "#,
        )
        .bind(insert.invoice_id.as_str())
        .bind(&insert.product_id)
        .bind(&insert.product_name)
        .bind(amount)
        .bind(Json(&insert.customer))
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_insert)?;
        row.try_into()
    }
}

#[derive(Debug, Clone)]
pub struct GetOrderRecordById {
    pub invoice_id: InvoiceId,
}

impl Processor<GetOrderRecordById> for DatabaseProcessor {
    type Output = Option<OrderRecord>;
    type Error = StoreError;
    #[tracing::instrument(skip_all, err, name = "SQL:GetOrderRecordById")]
    async fn process(&self, query: GetOrderRecordById) -> Result<Option<OrderRecord>, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT invoice_id, product_id, product_name, amount, customer, status, created_at
            FROM invoices
            WHERE invoice_id = $1
            "#,
        )
        .bind(query.invoice_id.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(OrderRecord::try_from).transpose()
    }
}
