pub mod service;

pub use service::{validate_service, CreateServiceInput, Service, UpdateServiceInput};
