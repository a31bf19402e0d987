use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::Value;

use super::persistence::Persister;
use crate::api::{NearEarthObject, NeoPage};
use crate::cache::{cache_key, key_part, ResponseCache};
use crate::clock::Clock;
use crate::db::repository::NeoRepository;
use crate::error::{ServiceError, ServiceResult};
use crate::sources::NeoFeed;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// Validated NEO listing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeoQuery {
    pub hazardous: Option<bool>,
    pub date: Option<NaiveDate>,
    pub page: u32,
    pub limit: u32,
}

impl Default for NeoQuery {
    fn default() -> Self {
        Self {
            hazardous: None,
            date: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl NeoQuery {
    pub fn cache_key(&self) -> String {
        cache_key(
            "neos",
            &[
                key_part(self.hazardous),
                key_part(self.date.map(|d| d.format("%Y-%m-%d"))),
                Some(self.page.to_string()),
                Some(self.limit.to_string()),
            ],
        )
    }
}

/// Returns the `page`th window of `limit` items (1-based). Pages past the end
/// are empty.
pub fn paginate<T: Clone>(items: &[T], page: u32, limit: u32) -> Vec<T> {
    let limit = limit as usize;
    let start = (page.max(1) as usize - 1).saturating_mul(limit);
    items.iter().skip(start).take(limit).cloned().collect()
}

/// Near-Earth object listings backed by NeoWs.
#[derive(Clone)]
pub struct NeoService {
    feed: NeoFeed,
    cache: Arc<dyn ResponseCache>,
    clock: Arc<dyn Clock>,
    persister: Persister,
    ttl: Duration,
}

impl NeoService {
    pub fn new(
        feed: NeoFeed,
        cache: Arc<dyn ResponseCache>,
        clock: Arc<dyn Clock>,
        persister: Persister,
        ttl: Duration,
    ) -> Self {
        Self {
            feed,
            cache,
            clock,
            persister,
            ttl,
        }
    }

    /// One page of the objects approaching on the requested date (today, UTC,
    /// when unset), optionally restricted by hazard flag.
    pub async fn list(&self, query: &NeoQuery) -> ServiceResult<Value> {
        let key = query.cache_key();
        if let Some(hit) = self.cache.get(&key) {
            log::debug!("Cache hit for {}", key);
            return Ok(hit);
        }
        log::debug!("Cache miss for {}", key);

        let date = query.date.unwrap_or_else(|| self.clock.today());
        let objects = self.feed.fetch(date).await?;
        if objects.is_empty() {
            return Err(ServiceError::not_found("No NEO data available"));
        }

        let filtered: Vec<NearEarthObject> = match query.hazardous {
            Some(flag) => objects
                .iter()
                .filter(|o| o.is_potentially_hazardous == flag)
                .cloned()
                .collect(),
            None => objects.clone(),
        };

        let response = NeoPage {
            data: paginate(&filtered, query.page, query.limit),
            total: filtered.len(),
            page: query.page,
            limit: query.limit,
        };
        let body = serde_json::to_value(&response)
            .map_err(|e| ServiceError::internal(format!("Failed to encode NEO page: {}", e)))?;
        self.cache.put(key, body.clone(), self.ttl);

        self.persister
            .persist("neos", move |repo| async move { repo.upsert_neos(&objects).await })
            .await?;

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_cache_key_uses_sentinels() {
        assert_eq!(NeoQuery::default().cache_key(), "neos_all_all_1_10");
        let query = NeoQuery {
            hazardous: Some(true),
            date: NaiveDate::from_ymd_opt(2024, 3, 1),
            page: 2,
            limit: 5,
        };
        assert_eq!(query.cache_key(), "neos_true_2024-03-01_2_5");
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let items: Vec<u32> = (0..7).collect();
        assert_eq!(paginate(&items, 1, 5), vec![0, 1, 2, 3, 4]);
        assert_eq!(paginate(&items, 2, 5), vec![5, 6]);
        assert!(paginate(&items, 3, 5).is_empty());
        assert!(paginate(&items, u32::MAX, u32::MAX).is_empty());
    }

    proptest! {
        #[test]
        fn prop_pages_reconstruct_the_input(len in 0usize..200, limit in 1u32..50) {
            let items: Vec<usize> = (0..len).collect();
            let pages = (len as u32).div_ceil(limit).max(1);
            let mut rebuilt = Vec::new();
            for page in 1..=pages {
                let chunk = paginate(&items, page, limit);
                prop_assert!(chunk.len() <= limit as usize);
                rebuilt.extend(chunk);
            }
            prop_assert_eq!(rebuilt, items);
        }
    }
}
