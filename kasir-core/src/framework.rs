use sqlx::PgPool;

/// Postgres-backed store. Every store message is a `kanau::processor::Processor`
/// impl on this type; see [`crate::entities`].
#[derive(Debug, Clone)]
pub struct DatabaseProcessor {
    pub pool: PgPool,
}

impl DatabaseProcessor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}
