use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::database::models::Service;
use crate::database::query_builder::ServiceQuery;
use crate::database::store::{Inserted, ServicePage, ServiceStore};
use crate::filter::{SortColumn, SortDirection};

/// In-memory `ServiceStore` for tests and local runs without Postgres.
///
/// Mirrors the Postgres statements: version checks happen under one lock,
/// title search matches whole lowercase words like the `simple` text
/// search configuration, and the total count comes from the returned rows.
#[derive(Default)]
pub struct MemoryServiceStore {
    state: Mutex<State>,
    latency: Option<Duration>,
    failure: StdMutex<Option<fn() -> sqlx::Error>>,
    calls: AtomicUsize,
}

#[derive(Default)]
struct State {
    rows: BTreeMap<i64, Service>,
    next_id: i64,
}

impl MemoryServiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call, e.g. to exercise the repository timeout
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every subsequent call fail with the produced error
    pub fn fail_with(&self, failure: fn() -> sqlx::Error) {
        if let Ok(mut slot) = self.failure.lock() {
            *slot = Some(failure);
        }
    }

    /// Number of calls that reached the store
    pub fn calls(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    async fn enter(&self) -> Result<(), sqlx::Error> {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let failure = self.failure.lock().ok().and_then(|slot| *slot);
        match failure {
            Some(make_error) => Err(make_error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ServiceStore for MemoryServiceStore {
    async fn insert(&self, title: &str, description: &str) -> Result<Inserted, sqlx::Error> {
        self.enter().await?;
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let service = Service {
            id: state.next_id,
            created_at: Utc::now(),
            title: title.to_string(),
            description: description.to_string(),
            version: 1,
        };
        let inserted = Inserted {
            id: service.id,
            created_at: service.created_at,
            version: service.version,
        };
        state.rows.insert(service.id, service);
        Ok(inserted)
    }

    async fn fetch(&self, id: i64) -> Result<Service, sqlx::Error> {
        self.enter().await?;
        let state = self.state.lock().await;
        state.rows.get(&id).cloned().ok_or(sqlx::Error::RowNotFound)
    }

    async fn update_versioned(&self, service: &Service) -> Result<i32, sqlx::Error> {
        self.enter().await?;
        let mut state = self.state.lock().await;
        match state.rows.get_mut(&service.id) {
            Some(row) if row.version == service.version => {
                row.title = service.title.clone();
                row.description = service.description.clone();
                row.version += 1;
                Ok(row.version)
            }
            _ => Err(sqlx::Error::RowNotFound),
        }
    }

    async fn delete(&self, id: i64) -> Result<u64, sqlx::Error> {
        self.enter().await?;
        let mut state = self.state.lock().await;
        Ok(state.rows.remove(&id).map_or(0, |_| 1))
    }

    async fn list(&self, query: &ServiceQuery) -> Result<ServicePage, sqlx::Error> {
        self.enter().await?;
        let state = self.state.lock().await;

        let mut matched: Vec<&Service> = state
            .rows
            .values()
            .filter(|service| title_matches(query.title.query(), &service.title))
            .collect();
        matched.sort_by(|a, b| {
            let primary = match query.order.column {
                SortColumn::Id => a.id.cmp(&b.id),
                SortColumn::Title => a.title.cmp(&b.title),
            };
            let primary = match query.order.sort {
                SortDirection::Asc => primary,
                SortDirection::Desc => primary.reverse(),
            };
            match primary {
                Ordering::Equal => a.id.cmp(&b.id),
                other => other,
            }
        });

        let total = matched.len() as i64;
        let services: Vec<Service> = matched
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .cloned()
            .collect();

        // The window count rides on the returned rows, so a page past the
        // end reports no total.
        let total_records = if services.is_empty() { 0 } else { total };
        Ok(ServicePage {
            services,
            total_records,
        })
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        self.enter().await
    }
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn title_matches(query: Option<&str>, title: &str) -> bool {
    let Some(query) = query else {
        return true;
    };
    let wanted = words(query);
    if wanted.is_empty() {
        return false;
    }
    let have = words(title);
    wanted.iter().all(|w| have.contains(w))
}
