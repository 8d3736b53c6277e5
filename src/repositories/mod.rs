pub(crate) mod clients;
pub(crate) mod draws;
pub(crate) mod health;
#[cfg(test)]
pub(crate) mod memory;
pub(crate) mod users;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::services::pagination::QueryOptions;

use self::clients::{ClientRepository, PgClients};
use self::draws::{DrawRepository, PgDraws};
use self::health::{PgHealth, StoreHealth};
use self::users::{PgUsers, UserRepository};

#[derive(Debug, Clone, Error)]
pub(crate) enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("unique constraint violated: {0}")]
    Conflict(String),
    #[error("store query failed: {0}")]
    QueryFailed(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::Unavailable(err.to_string())
            }
            sqlx::Error::Tls(_) => Self::Unavailable(err.to_string()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                Self::Conflict(db.constraint().unwrap_or("unique").to_string())
            }
            other => Self::QueryFailed(other.to_string()),
        }
    }
}

/// A filterable collection that can be counted and read one window at a time.
#[async_trait]
pub(crate) trait PagedSource: Send + Sync {
    type Item: Send;
    type Filter: Send + Sync;

    async fn count(&self, filter: &Self::Filter) -> Result<i64, StoreError>;

    async fn query(
        &self,
        filter: &Self::Filter,
        options: QueryOptions,
    ) -> Result<Vec<Self::Item>, StoreError>;
}

/// `ILIKE` pattern matching `raw` anywhere, with wildcards in `raw` escaped.
pub(crate) fn contains_pattern(raw: &str) -> String {
    let mut pattern = String::with_capacity(raw.len() + 2);
    pattern.push('%');
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[derive(Clone)]
pub(crate) struct Repositories {
    pub(crate) users: Arc<dyn UserRepository>,
    pub(crate) clients: Arc<dyn ClientRepository>,
    pub(crate) draws: Arc<dyn DrawRepository>,
    pub(crate) health: Arc<dyn StoreHealth>,
}

impl Repositories {
    pub(crate) fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUsers::new(pool.clone())),
            clients: Arc::new(PgClients::new(pool.clone())),
            draws: Arc::new(PgDraws::new(pool.clone())),
            health: Arc::new(PgHealth::new(pool)),
        }
    }
}
