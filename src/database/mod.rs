pub mod manager;
pub mod models;
pub mod query_builder;
pub mod repository;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use repository::{ServiceRepository, DEFAULT_QUERY_TIMEOUT};
pub use store::{PgServiceStore, ServiceStore};
