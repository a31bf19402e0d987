//! In-memory repository for local development and tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::api::{Exoplanet, NearEarthObject, WeatherInsight};
use crate::db::repository::{
    ExoplanetRepository, FullRepository, InsightRepository, NeoRepository, RepositoryResult,
};

#[derive(Debug, Default)]
struct Tables {
    exoplanets: BTreeMap<String, Exoplanet>,
    neos: BTreeMap<String, NearEarthObject>,
    insights: BTreeMap<i64, WeatherInsight>,
}

/// Keeps every record kind in an ordered map keyed by its natural key.
#[derive(Debug, Default)]
pub struct LocalRepository {
    tables: RwLock<Tables>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every stored record.
    pub fn clear(&self) {
        *self.tables.write() = Tables::default();
    }
}

#[async_trait]
impl ExoplanetRepository for LocalRepository {
    async fn upsert_exoplanets(&self, records: &[Exoplanet]) -> RepositoryResult<usize> {
        let mut tables = self.tables.write();
        for record in records {
            tables
                .exoplanets
                .insert(record.name.clone(), record.clone());
        }
        Ok(records.len())
    }

    async fn list_exoplanets(&self) -> RepositoryResult<Vec<Exoplanet>> {
        Ok(self.tables.read().exoplanets.values().cloned().collect())
    }

    async fn count_exoplanets(&self) -> RepositoryResult<usize> {
        Ok(self.tables.read().exoplanets.len())
    }
}

#[async_trait]
impl NeoRepository for LocalRepository {
    async fn upsert_neos(&self, records: &[NearEarthObject]) -> RepositoryResult<usize> {
        let mut tables = self.tables.write();
        for record in records {
            tables.neos.insert(record.id.clone(), record.clone());
        }
        Ok(records.len())
    }

    async fn list_neos(&self) -> RepositoryResult<Vec<NearEarthObject>> {
        Ok(self.tables.read().neos.values().cloned().collect())
    }

    async fn count_neos(&self) -> RepositoryResult<usize> {
        Ok(self.tables.read().neos.len())
    }
}

#[async_trait]
impl InsightRepository for LocalRepository {
    async fn upsert_insights(&self, records: &[WeatherInsight]) -> RepositoryResult<usize> {
        let mut tables = self.tables.write();
        for record in records {
            tables.insights.insert(record.sol, record.clone());
        }
        Ok(records.len())
    }

    async fn list_insights(&self) -> RepositoryResult<Vec<WeatherInsight>> {
        Ok(self.tables.read().insights.values().cloned().collect())
    }

    async fn count_insights(&self) -> RepositoryResult<usize> {
        Ok(self.tables.read().insights.len())
    }
}

#[async_trait]
impl FullRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}
