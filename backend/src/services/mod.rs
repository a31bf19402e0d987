//! Data services.
//!
//! Each service answers one endpoint: cache lookup, then on a miss an
//! upstream fetch, statistics, a cache store and the repository upsert.

pub mod exoplanets;
pub mod insights;
pub mod neo;
pub mod persistence;
pub mod statistics;


use std::sync::Arc;

use crate::cache::ResponseCache;
use crate::clock::Clock;
use crate::config::AppConfig;
use crate::db::repository::FullRepository;
use crate::sources::{ExoplanetArchive, HttpClient, InsightWeather, NeoFeed};

pub use exoplanets::ExoplanetService;
pub use insights::{InsightService, InsightsQuery};
pub use neo::{paginate, NeoQuery, NeoService};
pub use persistence::{PersistenceMode, Persister};

/// Collaborators shared by every service.
#[derive(Clone)]
pub struct ServiceDeps {
    pub http: Arc<dyn HttpClient>,
    pub cache: Arc<dyn ResponseCache>,
    pub repository: Arc<dyn FullRepository>,
    pub clock: Arc<dyn Clock>,
}

/// The three data services wired to one cache and one repository.
#[derive(Clone)]
pub struct Services {
    pub exoplanets: ExoplanetService,
    pub neos: NeoService,
    pub insights: InsightService,
    pub cache: Arc<dyn ResponseCache>,
    pub repository: Arc<dyn FullRepository>,
}

impl Services {
    pub fn new(config: &AppConfig, deps: ServiceDeps) -> Self {
        let persister = Persister::new(Arc::clone(&deps.repository), config.persistence.mode);
        let timeout = config.nasa.timeout();

        let archive = ExoplanetArchive::new(
            Arc::clone(&deps.http),
            config.nasa.exoplanet_archive_url.clone(),
        )
        .with_timeout(timeout);
        let neo_feed = NeoFeed::new(
            Arc::clone(&deps.http),
            config.nasa.api_base_url.clone(),
            config.nasa.api_key.clone(),
        )
        .with_timeout(timeout);
        let weather = InsightWeather::new(
            Arc::clone(&deps.http),
            config.nasa.api_base_url.clone(),
            config.nasa.api_key.clone(),
        )
        .with_timeout(timeout);

        Self {
            exoplanets: ExoplanetService::new(
                archive,
                Arc::clone(&deps.cache),
                persister.clone(),
                config.cache.exoplanet_ttl(),
            ),
            neos: NeoService::new(
                neo_feed,
                Arc::clone(&deps.cache),
                Arc::clone(&deps.clock),
                persister.clone(),
                config.cache.neo_ttl(),
            ),
            insights: InsightService::new(
                weather,
                Arc::clone(&deps.cache),
                persister,
                config.cache.insight_ttl(),
            ),
            cache: deps.cache,
            repository: deps.repository,
        }
    }
}
