//! NASA NeoWs feed client.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use super::{ensure_success, parse_body, HttpClient, HttpRequest, UPSTREAM_TIMEOUT};
use crate::api::NearEarthObject;
use crate::error::{ServiceError, ServiceResult};

const SOURCE: &str = "NEO feed";
const FEED_PATH: &str = "/neo/rest/v1/feed";

#[derive(Debug, Deserialize)]
struct FeedDocument {
    #[serde(default)]
    near_earth_objects: BTreeMap<String, Vec<FeedObject>>,
}

#[derive(Debug, Deserialize)]
struct FeedObject {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    estimated_diameter: Option<EstimatedDiameter>,
    #[serde(default)]
    close_approach_data: Vec<CloseApproach>,
    #[serde(default)]
    is_potentially_hazardous_asteroid: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct EstimatedDiameter {
    #[serde(default)]
    kilometers: Option<DiameterRange>,
}

#[derive(Debug, Deserialize)]
struct DiameterRange {
    #[serde(default)]
    estimated_diameter_max: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CloseApproach {
    #[serde(default)]
    close_approach_date: Option<String>,
    #[serde(default)]
    relative_velocity: Option<RelativeVelocity>,
}

#[derive(Debug, Deserialize)]
struct RelativeVelocity {
    // NeoWs sends velocities as decimal strings.
    #[serde(default)]
    kilometers_per_hour: Option<Value>,
}

fn decimal(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl FeedObject {
    fn into_record(self) -> Option<NearEarthObject> {
        let id = self.id.filter(|id| !id.is_empty())?;
        let first_approach = self.close_approach_data.into_iter().next();
        let velocity = first_approach
            .as_ref()
            .and_then(|a| a.relative_velocity.as_ref())
            .and_then(|v| v.kilometers_per_hour.as_ref())
            .and_then(decimal)
            .unwrap_or(0.0);
        let close_approach_date = first_approach
            .and_then(|a| a.close_approach_date)
            .unwrap_or_default();

        Some(NearEarthObject {
            id,
            name: self.name.unwrap_or_default(),
            diameter: self
                .estimated_diameter
                .and_then(|d| d.kilometers)
                .and_then(|k| k.estimated_diameter_max)
                .unwrap_or(0.0),
            velocity,
            close_approach_date,
            is_potentially_hazardous: self.is_potentially_hazardous_asteroid.unwrap_or(false),
        })
    }
}

/// Client for the one-day NeoWs feed.
#[derive(Clone)]
pub struct NeoFeed {
    http: Arc<dyn HttpClient>,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl NeoFeed {
    pub fn new(http: Arc<dyn HttpClient>, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: UPSTREAM_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetches every object approaching on `date`, flattened across the
    /// feed's date buckets.
    pub async fn fetch(&self, date: NaiveDate) -> ServiceResult<Vec<NearEarthObject>> {
        if self.api_key.is_empty() {
            return Err(ServiceError::missing_credential("NASA_API_KEY"));
        }

        let date = date.format("%Y-%m-%d").to_string();
        let request = HttpRequest::get(format!("{}{}", self.base_url.trim_end_matches('/'), FEED_PATH))
            .with_query("start_date", date.clone())
            .with_query("end_date", date.clone())
            .with_query("api_key", self.api_key.clone())
            .with_timeout(self.timeout);

        log::info!("Fetching NEO feed for {}", date);
        let response = ensure_success(SOURCE, self.http.get(request).await?)?;
        let document: FeedDocument = parse_body(SOURCE, &response)?;

        let mut skipped = 0usize;
        let records: Vec<NearEarthObject> = document
            .near_earth_objects
            .into_values()
            .flatten()
            .filter_map(|object| {
                let record = object.into_record();
                if record.is_none() {
                    skipped += 1;
                }
                record
            })
            .collect();

        if skipped > 0 {
            log::warn!("Skipped {} NEO entries without an id", skipped);
        }
        log::info!("NEO feed returned {} objects", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_object_normalization() {
        let object: FeedObject = serde_json::from_str(
            r#"{
                "id": "2465633",
                "name": "465633 (2009 JR5)",
                "estimated_diameter": {"kilometers": {"estimated_diameter_min": 0.2, "estimated_diameter_max": 0.48}},
                "is_potentially_hazardous_asteroid": true,
                "close_approach_data": [{
                    "close_approach_date": "2015-09-08",
                    "relative_velocity": {"kilometers_per_hour": "65260.5357638276"}
                }]
            }"#,
        )
        .unwrap();
        let record = object.into_record().unwrap();
        assert_eq!(record.id, "2465633");
        assert_eq!(record.diameter, 0.48);
        assert!((record.velocity - 65260.5357638276).abs() < 1e-9);
        assert_eq!(record.close_approach_date, "2015-09-08");
        assert!(record.is_potentially_hazardous);
    }

    #[test]
    fn test_missing_fields_default() {
        let object: FeedObject = serde_json::from_str(r#"{"id": "1"}"#).unwrap();
        let record = object.into_record().unwrap();
        assert_eq!(record.name, "");
        assert_eq!(record.diameter, 0.0);
        assert_eq!(record.velocity, 0.0);
        assert_eq!(record.close_approach_date, "");
        assert!(!record.is_potentially_hazardous);
    }

    #[test]
    fn test_object_without_id_is_dropped() {
        let object: FeedObject = serde_json::from_str(r#"{"name": "ghost"}"#).unwrap();
        assert!(object.into_record().is_none());
    }

    #[test]
    fn test_numeric_velocity_is_accepted() {
        assert_eq!(decimal(&serde_json::json!(12.5)), Some(12.5));
        assert_eq!(decimal(&serde_json::json!("bogus")), None);
    }
}
