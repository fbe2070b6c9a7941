pub mod auth;
pub mod config;
pub mod domain_error;
pub mod error;
pub mod models;
pub mod openapi;
pub mod repo;
pub mod routes;
pub mod use_cases;

// Re-export commonly used items for tests / external users
pub use config::AppConfig;
pub use domain_error::{DomainError, DomainResult};
pub use routes::{config, AppState};
pub use use_cases::UseCases;
