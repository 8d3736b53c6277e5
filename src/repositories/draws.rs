use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::db::models::Draw;
use crate::db::types::DrawStatus;
use crate::repositories::{contains_pattern, PagedSource, StoreError};
use crate::services::pagination::QueryOptions;

const COLUMNS: &str = "\
    id, title, description, prize, draw_date, status, enabled, created_by, \
    created_at, updated_at";

#[derive(Debug, Clone, Default)]
pub(crate) struct DrawFilter {
    pub(crate) title: Option<String>,
    pub(crate) status: Option<DrawStatus>,
}

#[cfg(test)]
impl DrawFilter {
    pub(crate) fn matches(&self, draw: &Draw) -> bool {
        self.title.as_deref().map_or(true, |needle| {
            draw.title.to_lowercase().contains(&needle.to_lowercase())
        }) && self.status.map_or(true, |status| draw.status == status)
    }
}

pub(crate) struct NewDraw {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) prize: String,
    pub(crate) draw_date: OffsetDateTime,
    pub(crate) status: DrawStatus,
    pub(crate) enabled: bool,
    pub(crate) created_by: String,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) struct DrawChanges {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) prize: Option<String>,
    pub(crate) draw_date: Option<OffsetDateTime>,
    pub(crate) status: Option<DrawStatus>,
    pub(crate) enabled: Option<bool>,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[async_trait]
pub(crate) trait DrawRepository: PagedSource<Item = Draw, Filter = DrawFilter> {
    async fn find_by_id(&self, id: &str) -> Result<Option<Draw>, StoreError>;

    async fn create(&self, draw: NewDraw) -> Result<Draw, StoreError>;

    async fn update(&self, id: &str, changes: DrawChanges) -> Result<Option<Draw>, StoreError>;
}

pub(crate) struct PgDraws {
    pool: PgPool,
}

impl PgDraws {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &DrawFilter) {
    if let Some(title) = filter.title.as_deref() {
        builder.push(" AND title ILIKE ");
        builder.push_bind(contains_pattern(title));
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }
}

#[async_trait]
impl PagedSource for PgDraws {
    type Item = Draw;
    type Filter = DrawFilter;

    async fn count(&self, filter: &DrawFilter) -> Result<i64, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM draws WHERE TRUE");
        push_filter(&mut builder, filter);
        Ok(builder.build_query_scalar::<i64>().fetch_one(&self.pool).await?)
    }

    async fn query(
        &self,
        filter: &DrawFilter,
        options: QueryOptions,
    ) -> Result<Vec<Draw>, StoreError> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM draws WHERE TRUE"));
        push_filter(&mut builder, filter);
        builder.push(format!(" ORDER BY {} OFFSET ", options.sort.order_by()));
        builder.push_bind(options.skip);
        builder.push(" LIMIT ");
        builder.push_bind(options.limit);

        Ok(builder.build_query_as::<Draw>().fetch_all(&self.pool).await?)
    }
}

#[async_trait]
impl DrawRepository for PgDraws {
    async fn find_by_id(&self, id: &str) -> Result<Option<Draw>, StoreError> {
        Ok(sqlx::query_as::<_, Draw>(&format!("SELECT {COLUMNS} FROM draws WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create(&self, draw: NewDraw) -> Result<Draw, StoreError> {
        Ok(sqlx::query_as::<_, Draw>(&format!(
            "INSERT INTO draws (
                id, title, description, prize, draw_date, status, enabled, created_by,
                created_at, updated_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$9)
            RETURNING {COLUMNS}",
        ))
        .bind(draw.id)
        .bind(draw.title)
        .bind(draw.description)
        .bind(draw.prize)
        .bind(draw.draw_date)
        .bind(draw.status)
        .bind(draw.enabled)
        .bind(draw.created_by)
        .bind(draw.created_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update(&self, id: &str, changes: DrawChanges) -> Result<Option<Draw>, StoreError> {
        Ok(sqlx::query_as::<_, Draw>(&format!(
            "UPDATE draws SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                prize = COALESCE($3, prize),
                draw_date = COALESCE($4, draw_date),
                status = COALESCE($5, status),
                enabled = COALESCE($6, enabled),
                updated_at = $7
             WHERE id = $8
             RETURNING {COLUMNS}",
        ))
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.prize)
        .bind(changes.draw_date)
        .bind(changes.status)
        .bind(changes.enabled)
        .bind(changes.updated_at)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }
}
