//! Postgres repository implementation using Diesel.
//!
//! - Connection pooling with r2d2
//! - Retry with exponential backoff for transient failures
//! - Embedded migrations run on construction
//!
//! Upserts use `INSERT ... ON CONFLICT (key) DO UPDATE`, so each natural key
//! maps to exactly one row.

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel::upsert::excluded;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::task;

use crate::api::{Exoplanet, NearEarthObject, WeatherInsight};
use crate::db::repository::{
    ErrorContext, ExoplanetRepository, FullRepository, InsightRepository, NeoRepository,
    RepositoryError, RepositoryResult,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Rows per INSERT statement; keeps bind parameters well under the Postgres limit.
const UPSERT_CHUNK: usize = 500;

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl PostgresConfig {
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
                RepositoryError::InternalError {
                    message: format!("Migration failed: {}", e),
                    context: ErrorContext::new("run_migrations"),
                }
            })?;
        }

        log::info!(
            "Postgres repository ready (pool max_size={})",
            config.max_pool_size
        );
        Ok(Self { pool, config })
    }

    /// Run `f` on a pooled connection inside `spawn_blocking`, retrying
    /// retryable failures with exponential backoff.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new(operation)
                                .with_details(format!("attempt={}", attempt + 1)),
                        );
                        last_error = Some(err);
                        continue;
                    }
                };

                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        log::debug!("{} failed on attempt {}: {}", operation, attempt + 1, e);
                        last_error = Some(e);
                    }
                    Err(e) => return Err(e.with_operation(operation)),
                }
            }

            Err(last_error
                .unwrap_or_else(|| RepositoryError::internal("Max retries exceeded"))
                .with_operation(operation))
        })
        .await
        .map_err(|e| RepositoryError::InternalError {
            message: format!("Task join error: {}", e),
            context: ErrorContext::new(operation),
        })?
    }
}

fn to_count(n: i64) -> usize {
    usize::try_from(n).unwrap_or(0)
}

/// Keeps the last record per key. A single `ON CONFLICT DO UPDATE` statement
/// may not touch the same row twice.
fn last_per_key<T: Clone, K: Ord>(records: &[T], key: impl Fn(&T) -> K) -> Vec<T> {
    let mut latest = std::collections::BTreeMap::new();
    for record in records {
        latest.insert(key(record), record.clone());
    }
    latest.into_values().collect()
}

#[async_trait]
impl ExoplanetRepository for PostgresRepository {
    async fn upsert_exoplanets(&self, records: &[Exoplanet]) -> RepositoryResult<usize> {
        let records = last_per_key(records, |p| p.name.clone());
        self.with_conn("upsert_exoplanets", move |conn| {
            let mut written = 0;
            for chunk in records.chunks(UPSERT_CHUNK) {
                let rows: Vec<NewExoplanetRow> = chunk.iter().map(NewExoplanetRow::from).collect();
                written += diesel::insert_into(exoplanets::table)
                    .values(&rows)
                    .on_conflict(exoplanets::name)
                    .do_update()
                    .set((
                        exoplanets::radius.eq(excluded(exoplanets::radius)),
                        exoplanets::orbital_period.eq(excluded(exoplanets::orbital_period)),
                        exoplanets::discovery_method.eq(excluded(exoplanets::discovery_method)),
                        exoplanets::star_type.eq(excluded(exoplanets::star_type)),
                        exoplanets::updated_at.eq(diesel::dsl::now),
                    ))
                    .execute(conn)?;
            }
            Ok(written)
        })
        .await
    }

    async fn list_exoplanets(&self) -> RepositoryResult<Vec<Exoplanet>> {
        self.with_conn("list_exoplanets", |conn| {
            let rows = exoplanets::table
                .order(exoplanets::name.asc())
                .select(ExoplanetRow::as_select())
                .load(conn)?;
            Ok(rows.into_iter().map(Exoplanet::from).collect())
        })
        .await
    }

    async fn count_exoplanets(&self) -> RepositoryResult<usize> {
        self.with_conn("count_exoplanets", |conn| {
            let n: i64 = exoplanets::table.count().get_result(conn)?;
            Ok(to_count(n))
        })
        .await
    }
}

#[async_trait]
impl NeoRepository for PostgresRepository {
    async fn upsert_neos(&self, records: &[NearEarthObject]) -> RepositoryResult<usize> {
        let records = last_per_key(records, |o| o.id.clone());
        self.with_conn("upsert_neos", move |conn| {
            let mut written = 0;
            for chunk in records.chunks(UPSERT_CHUNK) {
                let rows: Vec<NewNeoRow> = chunk.iter().map(NewNeoRow::from).collect();
                written += diesel::insert_into(near_earth_objects::table)
                    .values(&rows)
                    .on_conflict(near_earth_objects::id)
                    .do_update()
                    .set((
                        near_earth_objects::name.eq(excluded(near_earth_objects::name)),
                        near_earth_objects::diameter.eq(excluded(near_earth_objects::diameter)),
                        near_earth_objects::velocity.eq(excluded(near_earth_objects::velocity)),
                        near_earth_objects::close_approach_date
                            .eq(excluded(near_earth_objects::close_approach_date)),
                        near_earth_objects::is_potentially_hazardous
                            .eq(excluded(near_earth_objects::is_potentially_hazardous)),
                        near_earth_objects::updated_at.eq(diesel::dsl::now),
                    ))
                    .execute(conn)?;
            }
            Ok(written)
        })
        .await
    }

    async fn list_neos(&self) -> RepositoryResult<Vec<NearEarthObject>> {
        self.with_conn("list_neos", |conn| {
            let rows = near_earth_objects::table
                .order(near_earth_objects::id.asc())
                .select(NeoRow::as_select())
                .load(conn)?;
            Ok(rows.into_iter().map(NearEarthObject::from).collect())
        })
        .await
    }

    async fn count_neos(&self) -> RepositoryResult<usize> {
        self.with_conn("count_neos", |conn| {
            let n: i64 = near_earth_objects::table.count().get_result(conn)?;
            Ok(to_count(n))
        })
        .await
    }
}

#[async_trait]
impl InsightRepository for PostgresRepository {
    async fn upsert_insights(&self, records: &[WeatherInsight]) -> RepositoryResult<usize> {
        let records = last_per_key(records, |i| i.sol);
        self.with_conn("upsert_insights", move |conn| {
            let mut written = 0;
            for chunk in records.chunks(UPSERT_CHUNK) {
                let rows: Vec<NewInsightRow> = chunk.iter().map(NewInsightRow::from).collect();
                written += diesel::insert_into(weather_insights::table)
                    .values(&rows)
                    .on_conflict(weather_insights::sol)
                    .do_update()
                    .set((
                        weather_insights::temperature.eq(excluded(weather_insights::temperature)),
                        weather_insights::pressure.eq(excluded(weather_insights::pressure)),
                        weather_insights::wind_speed.eq(excluded(weather_insights::wind_speed)),
                        weather_insights::wind_direction
                            .eq(excluded(weather_insights::wind_direction)),
                        weather_insights::season.eq(excluded(weather_insights::season)),
                        weather_insights::last_updated.eq(excluded(weather_insights::last_updated)),
                        weather_insights::updated_at.eq(diesel::dsl::now),
                    ))
                    .execute(conn)?;
            }
            Ok(written)
        })
        .await
    }

    async fn list_insights(&self) -> RepositoryResult<Vec<WeatherInsight>> {
        self.with_conn("list_insights", |conn| {
            let rows = weather_insights::table
                .order(weather_insights::sol.asc())
                .select(InsightRow::as_select())
                .load(conn)?;
            Ok(rows.into_iter().map(WeatherInsight::from).collect())
        })
        .await
    }

    async fn count_insights(&self) -> RepositoryResult<usize> {
        self.with_conn("count_insights", |conn| {
            let n: i64 = weather_insights::table.count().get_result(conn)?;
            Ok(to_count(n))
        })
        .await
    }
}

#[async_trait]
impl FullRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", |conn| {
            sql_query("SELECT 1").execute(conn)?;
            Ok(true)
        })
        .await
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
