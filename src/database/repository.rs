use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::database::manager::DatabaseError;
use crate::database::models::Service;
use crate::database::query_builder::ServiceQuery;
use crate::database::store::ServiceStore;
use crate::filter::{calculate_metadata, Filters, Metadata, TitleSearch};

pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(3);

/// CRUD and listing over services with optimistic concurrency.
///
/// Holds no mutable state; every call is bounded by `timeout` and conflict
/// handling is left to the caller.
#[derive(Clone)]
pub struct ServiceRepository {
    store: Arc<dyn ServiceStore>,
    timeout: Duration,
}

impl ServiceRepository {
    pub fn new(store: Arc<dyn ServiceStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Persist `service`, filling in the id, timestamp and version the
    /// store assigned.
    pub async fn insert(&self, service: &mut Service) -> Result<(), DatabaseError> {
        let inserted = self
            .bounded(self.store.insert(&service.title, &service.description))
            .await?;
        service.id = inserted.id;
        service.created_at = inserted.created_at;
        service.version = inserted.version;
        Ok(())
    }

    pub async fn get(&self, id: i64) -> Result<Service, DatabaseError> {
        if id < 1 {
            return Err(DatabaseError::RecordNotFound);
        }
        match self.bounded(self.store.fetch(id)).await {
            Ok(service) => Ok(service),
            Err(DatabaseError::Sqlx(sqlx::Error::RowNotFound)) => Err(DatabaseError::RecordNotFound),
            Err(other) => Err(other),
        }
    }

    /// Write `service` only if its version still matches the stored one.
    ///
    /// A deleted record and a concurrent edit both surface as
    /// `EditConflict`; the statement cannot tell them apart.
    pub async fn update(&self, service: &mut Service) -> Result<(), DatabaseError> {
        match self.bounded(self.store.update_versioned(service)).await {
            Ok(version) => {
                service.version = version;
                Ok(())
            }
            Err(DatabaseError::Sqlx(sqlx::Error::RowNotFound)) => Err(DatabaseError::EditConflict),
            Err(other) => Err(other),
        }
    }

    pub async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        if id < 1 {
            return Err(DatabaseError::RecordNotFound);
        }
        match self.bounded(self.store.delete(id)).await? {
            0 => Err(DatabaseError::RecordNotFound),
            _ => Ok(()),
        }
    }

    pub async fn list(
        &self,
        title: TitleSearch,
        filters: &Filters,
    ) -> Result<(Vec<Service>, Metadata), DatabaseError> {
        let query = ServiceQuery::new(title, filters)?;
        let page = self.bounded(self.store.list(&query)).await?;
        let metadata = calculate_metadata(page.total_records, filters.page, filters.page_size);
        Ok((page.services, metadata))
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        self.bounded(self.store.ping()).await
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, DatabaseError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(DatabaseError::from),
            Err(_) => Err(DatabaseError::Timeout(self.timeout)),
        }
    }
}
