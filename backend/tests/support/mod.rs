#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;

use cosmic_insights::api::{Exoplanet, NearEarthObject, WeatherInsight};
use cosmic_insights::cache::MemoryCache;
use cosmic_insights::clock::ManualClock;
use cosmic_insights::config::AppConfig;
use cosmic_insights::db::repository::{
    ExoplanetRepository, FullRepository, InsightRepository, NeoRepository, RepositoryError,
    RepositoryResult,
};
use cosmic_insights::services::{PersistenceMode, ServiceDeps, Services};
use cosmic_insights::sources::{HttpClient, HttpError, HttpRequest, HttpResponse};

pub const ARCHIVE_URL: &str = "http://archive.test/TAP/sync";
pub const NASA_URL: &str = "http://nasa.test";
pub const API_KEY: &str = "TEST_KEY";

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores variables on unwind and serializes access to process-global env
/// vars across parallel tests.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// =============================================================================
// Upstream stub
// =============================================================================

/// Canned upstream: the first route whose fragment occurs in the request URL
/// answers. Every request is recorded.
#[derive(Default)]
pub struct StubHttpClient {
    routes: Mutex<Vec<(String, Result<HttpResponse, String>)>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StubHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url_fragment: &str, status: u16, body: impl Into<String>) {
        self.routes.lock().unwrap().push((
            url_fragment.to_string(),
            Ok(HttpResponse {
                status,
                body: body.into(),
            }),
        ));
    }

    pub fn fail(&self, url_fragment: &str, message: &str) {
        self.routes
            .lock()
            .unwrap()
            .push((url_fragment.to_string(), Err(message.to_string())));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls_to(&self, url_fragment: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.contains(url_fragment))
            .count()
    }
}

#[async_trait]
impl HttpClient for StubHttpClient {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.requests.lock().unwrap().push(request.clone());
        let routes = self.routes.lock().unwrap();
        match routes.iter().find(|(fragment, _)| request.url.contains(fragment.as_str())) {
            Some((_, Ok(response))) => Ok(response.clone()),
            Some((_, Err(message))) => Err(HttpError::Transport {
                url: request.url.clone(),
                message: message.clone(),
            }),
            None => Ok(HttpResponse {
                status: 404,
                body: String::new(),
            }),
        }
    }
}

// =============================================================================
// Failing store
// =============================================================================

/// Store whose writes always fail and whose health check reports an error.
pub struct FailingRepository;

fn write_refused() -> RepositoryError {
    RepositoryError::connection("database is unreachable")
}

#[async_trait]
impl ExoplanetRepository for FailingRepository {
    async fn upsert_exoplanets(&self, _records: &[Exoplanet]) -> RepositoryResult<usize> {
        Err(write_refused())
    }

    async fn list_exoplanets(&self) -> RepositoryResult<Vec<Exoplanet>> {
        Ok(vec![])
    }

    async fn count_exoplanets(&self) -> RepositoryResult<usize> {
        Ok(0)
    }
}

#[async_trait]
impl NeoRepository for FailingRepository {
    async fn upsert_neos(&self, _records: &[NearEarthObject]) -> RepositoryResult<usize> {
        Err(write_refused())
    }

    async fn list_neos(&self) -> RepositoryResult<Vec<NearEarthObject>> {
        Ok(vec![])
    }

    async fn count_neos(&self) -> RepositoryResult<usize> {
        Ok(0)
    }
}

#[async_trait]
impl InsightRepository for FailingRepository {
    async fn upsert_insights(&self, _records: &[WeatherInsight]) -> RepositoryResult<usize> {
        Err(write_refused())
    }

    async fn list_insights(&self) -> RepositoryResult<Vec<WeatherInsight>> {
        Ok(vec![])
    }

    async fn count_insights(&self) -> RepositoryResult<usize> {
        Ok(0)
    }
}

#[async_trait]
impl FullRepository for FailingRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Err(write_refused())
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

pub fn test_config(mode: PersistenceMode) -> AppConfig {
    let mut config = AppConfig::default();
    config.nasa.exoplanet_archive_url = ARCHIVE_URL.to_string();
    config.nasa.api_base_url = NASA_URL.to_string();
    config.nasa.api_key = API_KEY.to_string();
    config.persistence.mode = mode;
    config.rate_limit.enabled = false;
    config
}

/// Everything a test needs to drive the services and inspect side effects.
pub struct Harness {
    pub http: Arc<StubHttpClient>,
    pub clock: Arc<ManualClock>,
    pub cache: Arc<MemoryCache>,
    pub repository: Arc<dyn FullRepository>,
    pub config: AppConfig,
}

impl Harness {
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self::with_config(repository, test_config(PersistenceMode::Blocking))
    }

    pub fn with_config(repository: Arc<dyn FullRepository>, config: AppConfig) -> Self {
        let clock = Arc::new(ManualClock::new(fixed_today()));
        Self {
            http: Arc::new(StubHttpClient::new()),
            cache: Arc::new(MemoryCache::new(clock.clone())),
            clock,
            repository,
            config,
        }
    }

    pub fn services(&self) -> Services {
        Services::new(
            &self.config,
            ServiceDeps {
                http: self.http.clone(),
                cache: self.cache.clone(),
                repository: Arc::clone(&self.repository),
                clock: self.clock.clone(),
            },
        )
    }
}

pub fn archive_rows() -> String {
    json!([
        {"pl_name": "Kepler-22 b", "pl_rade": 2.1, "pl_orbper": 289.86,
         "discoverymethod": "Transit", "st_spectype": "G5 V"},
        {"pl_name": "Kepler-452 b", "pl_rade": 1.5, "pl_orbper": 384.8,
         "discoverymethod": "Transit", "st_spectype": "G2 V"},
        {"pl_name": "HD 100546 b", "pl_rade": 13.3, "pl_orbper": null,
         "discoverymethod": "Imaging", "st_spectype": null},
        {"pl_name": "TOI-700 d", "pl_rade": 1.1, "pl_orbper": 37.4,
         "discoverymethod": "Transit", "st_spectype": "M2 V"}
    ])
    .to_string()
}

fn feed_object(id: &str, hazardous: bool, diameter: f64, velocity: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": format!("({})", id),
        "estimated_diameter": {"kilometers": {"estimated_diameter_max": diameter}},
        "close_approach_data": [{
            "close_approach_date": "2024-01-01",
            "relative_velocity": {"kilometers_per_hour": velocity}
        }],
        "is_potentially_hazardous_asteroid": hazardous
    })
}

/// Five objects on 2024-01-01, two of them hazardous.
pub fn neo_feed() -> String {
    json!({
        "element_count": 5,
        "near_earth_objects": {
            "2024-01-01": [
                feed_object("1001", false, 0.12, "45000.5"),
                feed_object("1002", true, 0.95, "72000.1"),
                feed_object("1003", false, 0.05, "30500.0"),
                feed_object("1004", true, 1.40, "91000.9"),
                feed_object("1005", false, 0.33, "51000.0")
            ]
        }
    })
    .to_string()
}

fn sol(temperature: f64, pressure: f64, wind: f64, season: &str, first_utc: &str) -> serde_json::Value {
    json!({
        "AT": {"av": temperature},
        "PRE": {"av": pressure},
        "HWS": {"av": wind},
        "WD": {"most_common": {"compass_degrees": 202.5}},
        "Season": season,
        "First_UTC": first_utc
    })
}

/// Three sols with a rising temperature.
pub fn insight_document() -> serde_json::Value {
    json!({
        "sol_keys": ["675", "676", "677"],
        "675": sol(-62.3, 750.6, 7.2, "fall", "2020-10-19T18:32:20Z"),
        "676": sol(-60.1, 749.1, 6.9, "fall", "2020-10-20T19:11:55Z"),
        "677": sol(-58.4, 748.0, 8.1, "fall", "2020-10-21T19:51:31Z"),
        "validity_checks": {}
    })
}
