use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::persistence::Persister;
use super::statistics::insight_summary;
use crate::api::{InsightsPayload, InsightsResponse, WeatherInsight};
use crate::cache::{cache_key, key_part, ResponseCache};
use crate::db::repository::InsightRepository;
use crate::error::{ServiceError, ServiceResult};
use crate::sources::InsightWeather;

/// Validated Mars weather request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsightsQuery {
    /// Return the upstream document untouched.
    pub full: bool,
    pub sol: Option<i64>,
}

impl InsightsQuery {
    pub fn cache_key(&self) -> String {
        let prefix = if self.full { "insights_full" } else { "insights" };
        cache_key(prefix, &[key_part(self.sol)])
    }
}

/// Mars weather readings backed by the InSight feed.
#[derive(Clone)]
pub struct InsightService {
    feed: InsightWeather,
    cache: Arc<dyn ResponseCache>,
    persister: Persister,
    ttl: Duration,
}

impl InsightService {
    pub fn new(
        feed: InsightWeather,
        cache: Arc<dyn ResponseCache>,
        persister: Persister,
        ttl: Duration,
    ) -> Self {
        Self {
            feed,
            cache,
            persister,
            ttl,
        }
    }

    /// Weather readings, narrowed to one sol when requested.
    ///
    /// The summary is only computed for the unfiltered, normalized view. With
    /// `full` the upstream document is returned as-is, though a requested sol
    /// must still exist in it.
    pub async fn list(&self, query: &InsightsQuery) -> ServiceResult<Value> {
        let key = query.cache_key();
        if let Some(hit) = self.cache.get(&key) {
            log::debug!("Cache hit for {}", key);
            return Ok(hit);
        }
        log::debug!("Cache miss for {}", key);

        let feed = self.feed.fetch().await?;
        if feed.is_empty() {
            return Err(ServiceError::unavailable("No Mars weather data available"));
        }

        let selected: Vec<WeatherInsight> = match query.sol {
            Some(sol) => {
                let matching: Vec<WeatherInsight> =
                    feed.insights.iter().filter(|i| i.sol == sol).cloned().collect();
                if matching.is_empty() {
                    return Err(ServiceError::not_found(format!(
                        "No data found for sol {}",
                        sol
                    )));
                }
                matching
            }
            None => feed.insights.clone(),
        };

        let payload = if query.full {
            InsightsPayload::Raw(feed.raw)
        } else {
            let summary = query.sol.is_none().then(|| insight_summary(&selected));
            InsightsPayload::Summary(InsightsResponse {
                insights: selected,
                summary,
            })
        };
        let body = serde_json::to_value(&payload)
            .map_err(|e| ServiceError::internal(format!("Failed to encode insights: {}", e)))?;
        self.cache.put(key, body.clone(), self.ttl);

        let batch = feed.insights;
        self.persister
            .persist("insights", move |repo| async move {
                repo.upsert_insights(&batch).await
            })
            .await?;

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_keys() {
        assert_eq!(InsightsQuery::default().cache_key(), "insights_all");
        let query = InsightsQuery {
            full: true,
            sol: Some(675),
        };
        assert_eq!(query.cache_key(), "insights_full_675");
    }
}
