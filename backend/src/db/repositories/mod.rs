//! Repository implementations:
//! - `local`: in-memory store for development and tests
//! - `postgres`: PostgreSQL store with Diesel ORM
pub mod local;
#[cfg(feature = "postgres-repo")]
pub mod postgres;

pub use local::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use postgres::{PostgresConfig, PostgresRepository};
