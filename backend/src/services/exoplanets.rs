use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::persistence::Persister;
use super::statistics::exoplanet_statistics;
use crate::api::ExoplanetResponse;
use crate::cache::ResponseCache;
use crate::db::repository::ExoplanetRepository;
use crate::error::{ServiceError, ServiceResult};
use crate::sources::{ExoplanetArchive, ExoplanetFilter};

/// Exoplanet listings backed by the Exoplanet Archive.
#[derive(Clone)]
pub struct ExoplanetService {
    archive: ExoplanetArchive,
    cache: Arc<dyn ResponseCache>,
    persister: Persister,
    ttl: Duration,
}

impl ExoplanetService {
    pub fn new(
        archive: ExoplanetArchive,
        cache: Arc<dyn ResponseCache>,
        persister: Persister,
        ttl: Duration,
    ) -> Self {
        Self {
            archive,
            cache,
            persister,
            ttl,
        }
    }

    /// Planets matching `filter` with their radius statistics.
    pub async fn list(&self, filter: &ExoplanetFilter) -> ServiceResult<Value> {
        let key = filter.cache_key();
        if let Some(hit) = self.cache.get(&key) {
            log::debug!("Cache hit for {}", key);
            return Ok(hit);
        }
        log::debug!("Cache miss for {}", key);

        let planets = self.archive.fetch(filter).await?;
        if planets.is_empty() {
            return Err(ServiceError::not_found("No exoplanet data available"));
        }

        let response = ExoplanetResponse {
            total: planets.len(),
            statistics: exoplanet_statistics(&planets),
            data: planets.clone(),
        };
        let body = serde_json::to_value(&response)
            .map_err(|e| ServiceError::internal(format!("Failed to encode exoplanets: {}", e)))?;
        self.cache.put(key, body.clone(), self.ttl);

        self.persister
            .persist("exoplanets", move |repo| async move {
                repo.upsert_exoplanets(&planets).await
            })
            .await?;

        Ok(body)
    }
}
