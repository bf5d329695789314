//! PostgreSQL document store.

use async_trait::async_trait;
use homestead_query::{PagePlan, Predicate, SearchPlan};
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use uuid::Uuid;

use super::sql::{apply_binds, build_order_by, build_where, BindValue};
use super::traits::{PropertyStore, UploadStore};
use crate::{
    config::DatabaseConfig,
    models::{PropertyRecord, UploadCategory, UploadRecord},
    Error, Result,
};

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects the pool and, when configured, applies pending migrations.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(config.pool_min_size)
            .max_connections(config.pool_max_size)
            .acquire_timeout(Duration::from_secs(config.pool_timeout_seconds))
            .connect(&config.url)
            .await?;

        if config.run_migrations {
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Database migrations applied");
        }

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn decode<T: serde::de::DeserializeOwned>(doc: JsonValue) -> Result<T> {
    Ok(serde_json::from_value(doc)?)
}

fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl PropertyStore for PostgresStore {
    async fn find_properties(&self, plan: &SearchPlan) -> Result<Vec<PropertyRecord>> {
        let mut bind_params = Vec::new();
        let where_clause = build_where(&plan.filter, &mut bind_params);
        bind_params.push(BindValue::Int(to_i64(plan.page.limit())));
        let limit_idx = bind_params.len();
        bind_params.push(BindValue::Int(to_i64(plan.page.skip())));
        let offset_idx = bind_params.len();

        let sql = format!(
            "SELECT p.doc FROM properties p WHERE {} ORDER BY {} LIMIT ${} OFFSET ${}",
            where_clause,
            build_order_by(plan.sort),
            limit_idx,
            offset_idx
        );
        tracing::trace!(sql = %sql, "Property search query");

        let docs = apply_binds(sqlx::query_scalar::<_, JsonValue>(&sql), bind_params)
            .fetch_all(&self.pool)
            .await?;

        docs.into_iter().map(decode).collect()
    }

    async fn count_properties(&self, filter: &Predicate) -> Result<u64> {
        let mut bind_params = Vec::new();
        let where_clause = build_where(filter, &mut bind_params);
        let sql = format!("SELECT COUNT(*) FROM properties p WHERE {where_clause}");

        let total = apply_binds(sqlx::query_scalar::<_, i64>(&sql), bind_params)
            .fetch_one(&self.pool)
            .await?;

        Ok(count_to_u64(total))
    }

    async fn get_property(&self, id: Uuid) -> Result<Option<PropertyRecord>> {
        let doc = sqlx::query_scalar::<_, JsonValue>("SELECT doc FROM properties WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        doc.map(decode).transpose()
    }

    async fn insert_property(&self, record: &PropertyRecord) -> Result<()> {
        let doc = serde_json::to_value(record)?;
        sqlx::query(
            "INSERT INTO properties (id, doc, created_at, updated_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(record.id)
        .bind(doc)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::Conflict(format!("Property {} already exists", record.id))
            }
            _ => Error::Database(e),
        })?;
        Ok(())
    }

    async fn replace_property(&self, record: &PropertyRecord) -> Result<bool> {
        let doc = serde_json::to_value(record)?;
        let result = sqlx::query("UPDATE properties SET doc = $2, updated_at = $3 WHERE id = $1")
            .bind(record.id)
            .bind(doc)
            .bind(record.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_property(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UploadStore for PostgresStore {
    async fn insert_upload(&self, record: &UploadRecord) -> Result<()> {
        let doc = serde_json::to_value(record)?;
        sqlx::query("INSERT INTO uploads (id, doc, category, created_at) VALUES ($1, $2, $3, $4)")
            .bind(record.id)
            .bind(doc)
            .bind(record.category.as_str())
            .bind(record.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_upload(&self, id: Uuid) -> Result<Option<UploadRecord>> {
        let doc = sqlx::query_scalar::<_, JsonValue>("SELECT doc FROM uploads WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        doc.map(decode).transpose()
    }

    async fn load_uploads_batch(&self, ids: &[Uuid]) -> Result<Vec<UploadRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let docs =
            sqlx::query_scalar::<_, JsonValue>("SELECT doc FROM uploads WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?;

        docs.into_iter().map(decode).collect()
    }

    async fn list_uploads(
        &self,
        category: Option<UploadCategory>,
        page: PagePlan,
    ) -> Result<(Vec<UploadRecord>, u64)> {
        let category = category.map(|c| c.as_str());

        let docs = sqlx::query_scalar::<_, JsonValue>(
            "SELECT doc FROM uploads \
             WHERE ($1::text IS NULL OR category = $1) \
             ORDER BY created_at DESC, id ASC \
             LIMIT $2 OFFSET $3",
        )
        .bind(category)
        .bind(to_i64(page.limit()))
        .bind(to_i64(page.skip()))
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM uploads WHERE ($1::text IS NULL OR category = $1)",
        )
        .bind(category)
        .fetch_one(&self.pool)
        .await?;

        let records = docs
            .into_iter()
            .map(decode)
            .collect::<Result<Vec<UploadRecord>>>()?;
        Ok((records, count_to_u64(total)))
    }

    async fn delete_upload(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM uploads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
