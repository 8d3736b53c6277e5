use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::Client;
use crate::db::types::ClientKind;
use crate::repositories::{contains_pattern, PagedSource, StoreError};
use crate::services::pagination::QueryOptions;

const COLUMNS: &str = "\
    id, user_id, name, email, gender, phone, kind, document, enabled, \
    created_at, updated_at";

#[derive(Debug, Clone, Default)]
pub(crate) struct ClientFilter {
    /// Restricts the listing to one owner. Unset for administrators.
    pub(crate) user_id: Option<String>,
    /// Case-insensitive substring of the client name.
    pub(crate) name: Option<String>,
    pub(crate) enabled: Option<bool>,
}

#[cfg(test)]
impl ClientFilter {
    pub(crate) fn matches(&self, client: &Client) -> bool {
        self.user_id.as_deref().map_or(true, |owner| client.user_id == owner)
            && self.name.as_deref().map_or(true, |needle| {
                client.name.to_lowercase().contains(&needle.to_lowercase())
            })
            && self.enabled.map_or(true, |enabled| client.enabled == enabled)
    }
}

pub(crate) struct NewClient {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) gender: String,
    pub(crate) phone: String,
    pub(crate) kind: ClientKind,
    pub(crate) document: String,
    pub(crate) enabled: bool,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) struct ClientChanges {
    pub(crate) name: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) gender: Option<String>,
    pub(crate) phone: Option<String>,
    pub(crate) enabled: Option<bool>,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[async_trait]
pub(crate) trait ClientRepository: PagedSource<Item = Client, Filter = ClientFilter> {
    async fn find_by_id(&self, id: &str) -> Result<Option<Client>, StoreError>;

    /// `document` must already be reduced to its digits.
    async fn exists_by_document(&self, document: &str) -> Result<bool, StoreError>;

    async fn create(&self, client: NewClient) -> Result<Client, StoreError>;

    async fn update(&self, id: &str, changes: ClientChanges)
        -> Result<Option<Client>, StoreError>;
}

pub(crate) struct PgClients {
    pool: PgPool,
}

impl PgClients {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ClientFilter) {
    if let Some(user_id) = filter.user_id.clone() {
        builder.push(" AND user_id = ");
        builder.push_bind(user_id);
    }
    if let Some(name) = filter.name.as_deref() {
        builder.push(" AND name ILIKE ");
        builder.push_bind(contains_pattern(name));
    }
    if let Some(enabled) = filter.enabled {
        builder.push(" AND enabled = ");
        builder.push_bind(enabled);
    }
}

#[async_trait]
impl PagedSource for PgClients {
    type Item = Client;
    type Filter = ClientFilter;

    async fn count(&self, filter: &ClientFilter) -> Result<i64, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM clients WHERE TRUE");
        push_filter(&mut builder, filter);
        Ok(builder.build_query_scalar::<i64>().fetch_one(&self.pool).await?)
    }

    async fn query(
        &self,
        filter: &ClientFilter,
        options: QueryOptions,
    ) -> Result<Vec<Client>, StoreError> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM clients WHERE TRUE"));
        push_filter(&mut builder, filter);
        builder.push(format!(" ORDER BY {} OFFSET ", options.sort.order_by()));
        builder.push_bind(options.skip);
        builder.push(" LIMIT ");
        builder.push_bind(options.limit);

        Ok(builder.build_query_as::<Client>().fetch_all(&self.pool).await?)
    }
}

#[async_trait]
impl ClientRepository for PgClients {
    async fn find_by_id(&self, id: &str) -> Result<Option<Client>, StoreError> {
        Ok(sqlx::query_as::<_, Client>(&format!("SELECT {COLUMNS} FROM clients WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn exists_by_document(&self, document: &str) -> Result<bool, StoreError> {
        Ok(sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM clients WHERE document = $1)")
            .bind(document)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn create(&self, client: NewClient) -> Result<Client, StoreError> {
        Ok(sqlx::query_as::<_, Client>(&format!(
            "INSERT INTO clients (
                id, user_id, name, email, gender, phone, kind, document, enabled,
                created_at, updated_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$10)
            RETURNING {COLUMNS}",
        ))
        .bind(client.id)
        .bind(client.user_id)
        .bind(client.name)
        .bind(client.email)
        .bind(client.gender)
        .bind(client.phone)
        .bind(client.kind)
        .bind(client.document)
        .bind(client.enabled)
        .bind(client.created_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update(
        &self,
        id: &str,
        changes: ClientChanges,
    ) -> Result<Option<Client>, StoreError> {
        Ok(sqlx::query_as::<_, Client>(&format!(
            "UPDATE clients SET
                name = COALESCE($1, name),
                email = COALESCE($2, email),
                gender = COALESCE($3, gender),
                phone = COALESCE($4, phone),
                enabled = COALESCE($5, enabled),
                updated_at = $6
             WHERE id = $7
             RETURNING {COLUMNS}",
        ))
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.gender)
        .bind(changes.phone)
        .bind(changes.enabled)
        .bind(changes.updated_at)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }
}
