//! Upsert of fetched batches into the configured repository.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::db::repository::{FullRepository, RepositoryResult};
use crate::error::{ServiceError, ServiceResult};

/// How a request waits on the upsert that follows a fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersistenceMode {
    /// The upsert is awaited; a failure fails the request.
    #[default]
    Blocking,
    /// The upsert runs as a background task; failures are only logged.
    WriteBehind,
}

impl FromStr for PersistenceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "blocking" => Ok(Self::Blocking),
            "write-behind" | "write_behind" | "writebehind" => Ok(Self::WriteBehind),
            _ => Err(format!("Unknown persistence mode: {}", s)),
        }
    }
}

impl fmt::Display for PersistenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blocking => f.write_str("blocking"),
            Self::WriteBehind => f.write_str("write-behind"),
        }
    }
}

/// Runs upserts against the repository in the configured mode.
#[derive(Clone)]
pub struct Persister {
    repository: Arc<dyn FullRepository>,
    mode: PersistenceMode,
}

impl Persister {
    pub fn new(repository: Arc<dyn FullRepository>, mode: PersistenceMode) -> Self {
        Self { repository, mode }
    }

    /// Runs `job` against the repository. `entity` names the record kind in
    /// logs and errors.
    pub async fn persist<F, Fut>(&self, entity: &'static str, job: F) -> ServiceResult<()>
    where
        F: FnOnce(Arc<dyn FullRepository>) -> Fut,
        Fut: Future<Output = RepositoryResult<usize>> + Send + 'static,
    {
        let upsert = job(Arc::clone(&self.repository));
        match self.mode {
            PersistenceMode::Blocking => {
                let written = upsert
                    .await
                    .map_err(|e| ServiceError::persistence(entity, e))?;
                log::debug!("Upserted {} {} records", written, entity);
                Ok(())
            }
            PersistenceMode::WriteBehind => {
                tokio::spawn(async move {
                    match upsert.await {
                        Ok(written) => log::debug!("Upserted {} {} records", written, entity),
                        Err(e) => log::error!("Background upsert of {} failed: {}", entity, e),
                    }
                });
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::WeatherInsight;
    use crate::db::repository::InsightRepository;
    use crate::db::LocalRepository;

    fn reading(sol: i64) -> WeatherInsight {
        WeatherInsight {
            sol,
            temperature: -60.0,
            pressure: 700.0,
            wind_speed: 5.0,
            wind_direction: 90.0,
            season: "winter".into(),
            last_updated: String::new(),
        }
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("blocking".parse::<PersistenceMode>(), Ok(PersistenceMode::Blocking));
        assert_eq!(
            "Write-Behind".parse::<PersistenceMode>(),
            Ok(PersistenceMode::WriteBehind)
        );
        assert!("eventually".parse::<PersistenceMode>().is_err());
        assert_eq!(PersistenceMode::WriteBehind.to_string(), "write-behind");
    }

    #[tokio::test]
    async fn test_blocking_upsert_is_visible_immediately() {
        let repo = Arc::new(LocalRepository::new());
        let persister = Persister::new(repo.clone(), PersistenceMode::Blocking);
        let batch = vec![reading(10), reading(11)];
        persister
            .persist("insights", move |r| async move { r.upsert_insights(&batch).await })
            .await
            .unwrap();
        assert_eq!(repo.count_insights().await.unwrap(), 2);
    }
}
