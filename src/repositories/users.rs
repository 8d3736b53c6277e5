use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories::{PagedSource, StoreError};
use crate::services::pagination::QueryOptions;

const COLUMNS: &str = "id, name, email, hashed_password, role, enabled, created_at, updated_at";

#[derive(Debug, Clone, Default)]
pub(crate) struct UserFilter {
    pub(crate) email: Option<String>,
    pub(crate) role: Option<UserRole>,
    pub(crate) enabled: Option<bool>,
}

#[cfg(test)]
impl UserFilter {
    pub(crate) fn matches(&self, user: &User) -> bool {
        self.email.as_deref().map_or(true, |email| user.email == email)
            && self.role.map_or(true, |role| user.role == role)
            && self.enabled.map_or(true, |enabled| user.enabled == enabled)
    }
}

pub(crate) struct NewUser {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) hashed_password: String,
    pub(crate) role: UserRole,
    pub(crate) enabled: bool,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) struct UserChanges {
    pub(crate) name: Option<String>,
    pub(crate) role: Option<UserRole>,
    pub(crate) enabled: Option<bool>,
    pub(crate) hashed_password: Option<String>,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[async_trait]
pub(crate) trait UserRepository: PagedSource<Item = User, Filter = UserFilter> {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    /// Returns `None` when no user has `id`.
    async fn update(&self, id: &str, changes: UserChanges) -> Result<Option<User>, StoreError>;
}

pub(crate) struct PgUsers {
    pool: PgPool,
}

impl PgUsers {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    if let Some(email) = filter.email.clone() {
        builder.push(" AND email = ");
        builder.push_bind(email);
    }
    if let Some(role) = filter.role {
        builder.push(" AND role = ");
        builder.push_bind(role);
    }
    if let Some(enabled) = filter.enabled {
        builder.push(" AND enabled = ");
        builder.push_bind(enabled);
    }
}

#[async_trait]
impl PagedSource for PgUsers {
    type Item = User;
    type Filter = UserFilter;

    async fn count(&self, filter: &UserFilter) -> Result<i64, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users WHERE TRUE");
        push_filter(&mut builder, filter);
        Ok(builder.build_query_scalar::<i64>().fetch_one(&self.pool).await?)
    }

    async fn query(
        &self,
        filter: &UserFilter,
        options: QueryOptions,
    ) -> Result<Vec<User>, StoreError> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM users WHERE TRUE"));
        push_filter(&mut builder, filter);
        builder.push(format!(" ORDER BY {} OFFSET ", options.sort.order_by()));
        builder.push_bind(options.skip);
        builder.push(" LIMIT ");
        builder.push_bind(options.limit);

        Ok(builder.build_query_as::<User>().fetch_all(&self.pool).await?)
    }
}

#[async_trait]
impl UserRepository for PgUsers {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        Ok(sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (
                id, name, email, hashed_password, role, enabled, created_at, updated_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$7)
            RETURNING {COLUMNS}",
        ))
        .bind(user.id)
        .bind(user.name)
        .bind(user.email)
        .bind(user.hashed_password)
        .bind(user.role)
        .bind(user.enabled)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update(&self, id: &str, changes: UserChanges) -> Result<Option<User>, StoreError> {
        Ok(sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET
                name = COALESCE($1, name),
                role = COALESCE($2, role),
                enabled = COALESCE($3, enabled),
                hashed_password = COALESCE($4, hashed_password),
                updated_at = $5
             WHERE id = $6
             RETURNING {COLUMNS}",
        ))
        .bind(changes.name)
        .bind(changes.role)
        .bind(changes.enabled)
        .bind(changes.hashed_password)
        .bind(changes.updated_at)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }
}
