//! Record storage via the Repository pattern.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Services (exoplanets, neo, insights)                   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │ Arc<dyn FullRepository>
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository traits (repository/mod.rs)                  │
//! └───────────────────┬─────────────────────────────────────┘
//!          ┌──────────┴───────────┐
//!   LocalRepository       PostgresRepository
//!    (in-memory)         (Diesel, postgres-repo)
//! ```
//!
//! - `repository`: trait definitions and error types
//! - `repositories::local`: in-memory implementation
//! - `repositories::postgres`: Postgres implementation with Diesel ORM
//! - `factory`: builds the configured backend

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

// Postgres config is colocated with the repository implementation.
#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::PostgresConfig;
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}

pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::{PostgresSettings, RepositoryConfig, RepositorySettings};
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    ErrorContext, ExoplanetRepository, FullRepository, InsightRepository, NeoRepository,
    RepositoryError, RepositoryResult,
};
