//! NASA InSight Mars weather feed client.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::{ensure_success, parse_body, HttpClient, HttpRequest, UPSTREAM_TIMEOUT};
use crate::api::WeatherInsight;
use crate::error::{ServiceError, ServiceResult};

const SOURCE: &str = "InSight weather feed";
const FEED_PATH: &str = "/insight_weather/";

/// One fetch of the weather feed: the document as received plus its
/// normalized per-sol readings in ascending sol order.
#[derive(Debug, Clone)]
pub struct WeatherFeed {
    pub raw: Value,
    pub insights: Vec<WeatherInsight>,
}

impl WeatherFeed {
    /// Normalizes a raw feed document. Sol keys that are not integers are
    /// skipped.
    pub fn from_document(raw: Value) -> Self {
        let mut insights: Vec<WeatherInsight> = raw
            .get("sol_keys")
            .and_then(Value::as_array)
            .map(|keys| {
                keys.iter()
                    .filter_map(|key| {
                        let key = match key {
                            Value::String(s) => s.clone(),
                            Value::Number(n) => n.to_string(),
                            _ => return None,
                        };
                        match key.trim().parse::<i64>() {
                            Ok(sol) => Some(read_sol(sol, raw.get(&key))),
                            Err(_) => {
                                log::warn!("Ignoring non-numeric sol key {:?}", key);
                                None
                            }
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        insights.sort_by_key(|i| i.sol);
        Self { raw, insights }
    }

    pub fn is_empty(&self) -> bool {
        self.insights.is_empty()
    }
}

fn average(entry: Option<&Value>, sensor: &str) -> f64 {
    entry
        .and_then(|e| e.get(sensor))
        .and_then(|s| s.get("av"))
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

fn text(entry: Option<&Value>, field: &str) -> Option<String> {
    entry
        .and_then(|e| e.get(field))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn read_sol(sol: i64, entry: Option<&Value>) -> WeatherInsight {
    WeatherInsight {
        sol,
        temperature: average(entry, "AT"),
        pressure: average(entry, "PRE"),
        wind_speed: average(entry, "HWS"),
        wind_direction: entry
            .and_then(|e| e.pointer("/WD/most_common/compass_degrees"))
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
        season: text(entry, "Season").unwrap_or_else(|| "Unknown".to_string()),
        last_updated: text(entry, "First_UTC").unwrap_or_default(),
    }
}

/// Client for the InSight weather service.
#[derive(Clone)]
pub struct InsightWeather {
    http: Arc<dyn HttpClient>,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl InsightWeather {
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

    pub async fn fetch(&self) -> ServiceResult<WeatherFeed> {
        if self.api_key.is_empty() {
            return Err(ServiceError::missing_credential("NASA_API_KEY"));
        }

        let request = HttpRequest::get(format!("{}{}", self.base_url.trim_end_matches('/'), FEED_PATH))
            .with_query("api_key", self.api_key.clone())
            .with_query("feedtype", "json")
            .with_query("ver", "1.0")
            .with_timeout(self.timeout);

        log::info!("Fetching InSight weather feed");
        let response = ensure_success(SOURCE, self.http.get(request).await?)?;
        let raw: Value = parse_body(SOURCE, &response)?;
        let feed = WeatherFeed::from_document(raw);
        log::info!("InSight weather feed returned {} sols", feed.insights.len());
        Ok(feed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_normalization() {
        let feed = WeatherFeed::from_document(json!({
            "sol_keys": ["676", "675"],
            "675": {
                "AT": {"av": -62.314, "mn": -96.872, "mx": -15.908},
                "PRE": {"av": 750.563},
                "HWS": {"av": 6.048},
                "WD": {"most_common": {"compass_degrees": 202.5, "compass_point": "SSW"}},
                "Season": "fall",
                "First_UTC": "2020-10-19T18:32:20Z"
            },
            "676": {"Season": "fall"},
            "validity_checks": {}
        }));

        assert_eq!(feed.insights.len(), 2);
        let first = &feed.insights[0];
        assert_eq!(first.sol, 675);
        assert_eq!(first.temperature, -62.314);
        assert_eq!(first.pressure, 750.563);
        assert_eq!(first.wind_speed, 6.048);
        assert_eq!(first.wind_direction, 202.5);
        assert_eq!(first.last_updated, "2020-10-19T18:32:20Z");

        let second = &feed.insights[1];
        assert_eq!(second.sol, 676);
        assert_eq!(second.temperature, 0.0);
        assert_eq!(second.wind_direction, 0.0);
        assert_eq!(second.last_updated, "");
    }

    #[test]
    fn test_missing_sol_entry_uses_defaults() {
        let feed = WeatherFeed::from_document(json!({"sol_keys": ["12"]}));
        assert_eq!(feed.insights[0].season, "Unknown");
    }

    #[test]
    fn test_empty_and_malformed_keys() {
        assert!(WeatherFeed::from_document(json!({"sol_keys": []})).is_empty());
        assert!(WeatherFeed::from_document(json!({})).is_empty());
        assert!(WeatherFeed::from_document(json!({"sol_keys": ["abc"]})).is_empty());
    }
}
