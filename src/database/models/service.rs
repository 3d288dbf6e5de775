use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::validator::Validator;

pub const MAX_TITLE_BYTES: usize = 200;
pub const MAX_DESCRIPTION_BYTES: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Service {
    pub id: i64,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub version: i32,
}

impl Service {
    /// A record not yet persisted; the store assigns id, timestamp and version.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: 0,
            created_at: DateTime::<Utc>::default(),
            title: title.into(),
            description: description.into(),
            version: 0,
        }
    }

    /// Apply a partial update; absent fields keep their current value.
    pub fn apply(&mut self, input: UpdateServiceInput) {
        if let Some(title) = input.title {
            self.title = title;
        }
        if let Some(description) = input.description {
            self.description = description;
        }
    }
}

/// Body of `POST /v1/services`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateServiceInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl From<CreateServiceInput> for Service {
    fn from(input: CreateServiceInput) -> Self {
        Service::new(input.title, input.description)
    }
}

/// Body of `PATCH /v1/services/:id`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateServiceInput {
    pub title: Option<String>,
    pub description: Option<String>,
}

pub fn validate_service(v: &mut Validator, service: &Service) {
    v.check(!service.title.is_empty(), "title", "must be provided");
    v.check(
        service.title.len() <= MAX_TITLE_BYTES,
        "title",
        "must not be more than 200 bytes long",
    );

    v.check(!service.description.is_empty(), "description", "must be provided");
    v.check(
        service.description.len() <= MAX_DESCRIPTION_BYTES,
        "description",
        "must not be more than 2000 bytes long",
    );
}
