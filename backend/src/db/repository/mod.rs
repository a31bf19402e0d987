//! Repository traits for the persisted record kinds.
//!
//! Each record kind is keyed by its natural identifier: exoplanets by name,
//! near-Earth objects by id, weather insights by sol. Upserts overwrite the
//! stored record for an existing key and never duplicate it.

pub mod error;

use async_trait::async_trait;

use crate::api::{Exoplanet, NearEarthObject, WeatherInsight};

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

#[async_trait]
pub trait ExoplanetRepository: Send + Sync {
    /// Insert or replace planets keyed by name. Returns the number written.
    async fn upsert_exoplanets(&self, records: &[Exoplanet]) -> RepositoryResult<usize>;

    /// All stored planets ordered by name.
    async fn list_exoplanets(&self) -> RepositoryResult<Vec<Exoplanet>>;

    async fn count_exoplanets(&self) -> RepositoryResult<usize>;
}

#[async_trait]
pub trait NeoRepository: Send + Sync {
    /// Insert or replace objects keyed by id. Returns the number written.
    async fn upsert_neos(&self, records: &[NearEarthObject]) -> RepositoryResult<usize>;

    /// All stored objects ordered by id.
    async fn list_neos(&self) -> RepositoryResult<Vec<NearEarthObject>>;

    async fn count_neos(&self) -> RepositoryResult<usize>;
}

#[async_trait]
pub trait InsightRepository: Send + Sync {
    /// Insert or replace readings keyed by sol. Returns the number written.
    async fn upsert_insights(&self, records: &[WeatherInsight]) -> RepositoryResult<usize>;

    /// All stored readings in ascending sol order.
    async fn list_insights(&self) -> RepositoryResult<Vec<WeatherInsight>>;

    async fn count_insights(&self) -> RepositoryResult<usize>;
}

/// Every record store plus connectivity checks.
#[async_trait]
pub trait FullRepository: ExoplanetRepository + NeoRepository + InsightRepository {
    /// `Ok(true)` when the backing store answers.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Short backend name reported by `/health`.
    fn backend_name(&self) -> &'static str;
}
