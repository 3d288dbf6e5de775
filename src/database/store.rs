use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use std::time::{Duration, Instant};

use crate::config::DatabaseConfig;
use crate::database::models::Service;
use crate::database::query_builder::ServiceQuery;

/// Values the store assigns when a service is first persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inserted {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub version: i32,
}

/// One page of services plus the number of rows matching the search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServicePage {
    pub services: Vec<Service>,
    pub total_records: i64,
}

/// Persistence primitives behind the repository.
///
/// Each method is a single atomic statement. A miss on `fetch` and a failed
/// version match on `update_versioned` both report `sqlx::Error::RowNotFound`.
#[async_trait]
pub trait ServiceStore: Send + Sync {
    async fn insert(&self, title: &str, description: &str) -> Result<Inserted, sqlx::Error>;

    async fn fetch(&self, id: i64) -> Result<Service, sqlx::Error>;

    /// Compare-and-swap on `(id, version)`; returns the new version.
    async fn update_versioned(&self, service: &Service) -> Result<i32, sqlx::Error>;

    /// Returns the number of rows removed.
    async fn delete(&self, id: i64) -> Result<u64, sqlx::Error>;

    async fn list(&self, query: &ServiceQuery) -> Result<ServicePage, sqlx::Error>;

    async fn ping(&self) -> Result<(), sqlx::Error>;
}

pub struct PgServiceStore {
    pool: PgPool,
    slow_query_threshold: Option<Duration>,
}

impl PgServiceStore {
    pub fn from_config(pool: PgPool, config: &DatabaseConfig) -> Self {
        let slow_query_threshold = config
            .enable_slow_query_warning
            .then(|| Duration::from_millis(config.slow_query_threshold_ms));
        Self {
            pool,
            slow_query_threshold,
        }
    }

    fn observe(&self, statement: &'static str, started: Instant) {
        let elapsed = started.elapsed();
        match self.slow_query_threshold {
            Some(threshold) if elapsed > threshold => {
                tracing::warn!(statement, ?elapsed, "slow query");
            }
            _ => tracing::trace!(statement, ?elapsed, "query complete"),
        }
    }
}

#[async_trait]
impl ServiceStore for PgServiceStore {
    async fn insert(&self, title: &str, description: &str) -> Result<Inserted, sqlx::Error> {
        let started = Instant::now();
        let row = sqlx::query(
            "INSERT INTO services (title, description) \
             VALUES ($1, $2) \
             RETURNING id, created_at, version",
        )
        .bind(title)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;
        self.observe("insert", started);

        Ok(Inserted {
            id: row.try_get("id")?,
            created_at: row.try_get("created_at")?,
            version: row.try_get("version")?,
        })
    }

    async fn fetch(&self, id: i64) -> Result<Service, sqlx::Error> {
        let started = Instant::now();
        let service = sqlx::query_as::<_, Service>(
            "SELECT id, created_at, title, description, version \
             FROM services \
             WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        self.observe("fetch", started);
        Ok(service)
    }

    async fn update_versioned(&self, service: &Service) -> Result<i32, sqlx::Error> {
        let started = Instant::now();
        let row = sqlx::query(
            "UPDATE services \
             SET title = $1, description = $2, version = version + 1 \
             WHERE id = $3 AND version = $4 \
             RETURNING version",
        )
        .bind(&service.title)
        .bind(&service.description)
        .bind(service.id)
        .bind(service.version)
        .fetch_one(&self.pool)
        .await?;
        self.observe("update", started);
        row.try_get("version")
    }

    async fn delete(&self, id: i64) -> Result<u64, sqlx::Error> {
        let started = Instant::now();
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        self.observe("delete", started);
        Ok(result.rows_affected())
    }

    async fn list(&self, query: &ServiceQuery) -> Result<ServicePage, sqlx::Error> {
        let started = Instant::now();
        let sql = query.to_sql();
        let rows = query
            .bind(&sql)
            .fetch_all(&self.pool)
            .await?;
        self.observe("list", started);

        let mut page = ServicePage::default();
        for row in rows {
            page.total_records = row.try_get("total_records")?;
            page.services.push(Service {
                id: row.try_get("id")?,
                created_at: row.try_get("created_at")?,
                title: row.try_get("title")?,
                description: row.try_get("description")?,
                version: row.try_get("version")?,
            });
        }
        Ok(page)
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
