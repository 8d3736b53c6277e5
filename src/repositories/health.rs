use async_trait::async_trait;
use sqlx::PgPool;

use crate::repositories::StoreError;

#[async_trait]
pub(crate) trait StoreHealth: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;
}

pub(crate) struct PgHealth {
    pool: PgPool,
}

impl PgHealth {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoreHealth for PgHealth {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
