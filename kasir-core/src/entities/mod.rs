pub mod invoice_status;
pub mod memory;
pub mod order_records;

use kasir_sdk::objects::OrderStatus as SdkOrderStatus;

/// Errors surfaced by every store message.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    /// The key is already taken; for orders this means an invoice id
    /// collision and the caller should generate a new id.
    #[error("duplicate key")]
    Duplicate,
    /// A stored row no longer satisfies the domain types.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// Map a unique violation to [`StoreError::Duplicate`].
    pub(crate) fn from_insert(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate,
            _ => StoreError::Database(err),
        }
    }
}

/// Order status for database operations.
///
/// This is the sqlx::Type version. For API/DTO use, see `kasir_sdk::objects::OrderStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE", type_name = "order_status")]
pub enum OrderStatus {
    Pending,
    Success,
    Failed,
    Expired,
}

impl From<OrderStatus> for SdkOrderStatus {
    fn from(value: OrderStatus) -> Self {
        match value {
            OrderStatus::Pending => SdkOrderStatus::Pending,
            OrderStatus::Success => SdkOrderStatus::Success,
            OrderStatus::Failed => SdkOrderStatus::Failed,
            OrderStatus::Expired => SdkOrderStatus::Expired,
        }
    }
}

impl From<SdkOrderStatus> for OrderStatus {
    fn from(value: SdkOrderStatus) -> Self {
        match value {
            SdkOrderStatus::Pending => OrderStatus::Pending,
            SdkOrderStatus::Success => OrderStatus::Success,
            SdkOrderStatus::Failed => OrderStatus::Failed,
            SdkOrderStatus::Expired => OrderStatus::Expired,
        }
    }
}
