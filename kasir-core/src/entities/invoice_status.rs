use crate::entities::StoreError;
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use kasir_sdk::invoice::InvoiceId;
use kasir_sdk::objects::{PaymentStatus, StatusResponse};
use time::OffsetDateTime;

/// Latest known payment status of an invoice. One per invoice id; every
/// write replaces the previous record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRecord {
    pub invoice_id: InvoiceId,
    pub status: PaymentStatus,
    /// Gateway status string exactly as received.
    pub raw_status: String,
    pub updated_at: OffsetDateTime,
}

impl From<&StatusRecord> for StatusResponse {
    fn from(record: &StatusRecord) -> Self {
        StatusResponse {
            invoice_id: record.invoice_id.clone(),
            status: record.status.clone(),
            raw_status: record.raw_status.clone(),
            updated_at: (record.updated_at.unix_timestamp_nanos() / 1_000_000) as i64,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StatusRow {
    invoice_id: String,
    status: String,
    raw_status: String,
    updated_at: OffsetDateTime,
}

impl TryFrom<StatusRow> for StatusRecord {
    type Error = StoreError;

    fn try_from(row: StatusRow) -> Result<Self, StoreError> {
        Ok(StatusRecord {
            invoice_id: InvoiceId::parse(&row.invoice_id)
                .map_err(|e| StoreError::Corrupt(e.to_string()))?,
            status: PaymentStatus::from(row.status),
            raw_status: row.raw_status,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone)]
/// Blind overwrite of the status record keyed by the record's invoice id.
///
/// There is no ordering guard: a late `EXPIRED` replaces an earlier
/// `PAID`.
pub struct WriteInvoiceStatus {
    pub record: StatusRecord,
}

impl Processor<WriteInvoiceStatus> for DatabaseProcessor {
    type Output = ();
    type Error = StoreError;
    #[tracing::instrument(skip_all, err, name = "SQL:WriteInvoiceStatus")]
    async fn process(&self, write: WriteInvoiceStatus) -> Result<(), StoreError> {
        let record = write.record;
        sqlx::query(
            r#"
            INSERT INTO invoice_status (invoice_id, status, raw_status, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (invoice_id) DO UPDATE
            SET status = EXCLUDED.status,
                raw_status = EXCLUDED.raw_status,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(record.invoice_id.as_str())
        .bind(record.status.as_str())
        .bind(&record.raw_status)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct GetInvoiceStatus {
    pub invoice_id: InvoiceId,
}

impl Processor<GetInvoiceStatus> for DatabaseProcessor {
    type Output = Option<StatusRecord>;
    type Error = StoreError;
    #[tracing::instrument(skip_all, err, name = "SQL:GetInvoiceStatus")]
    async fn process(&self, query: GetInvoiceStatus) -> Result<Option<StatusRecord>, StoreError> {
        let row = sqlx::query_as::<_, StatusRow>(
            r#"
            SELECT invoice_id, status, raw_status, updated_at
            FROM invoice_status
            WHERE invoice_id = $1
            "#,
        )
        .bind(query.invoice_id.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(StatusRecord::try_from).transpose()
    }
}
