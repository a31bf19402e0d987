//! NASA Exoplanet Archive (TAP `sync` endpoint) client.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use super::adql::{Literal, Predicate, SelectQuery};
use super::{ensure_success, parse_body, HttpClient, HttpRequest, UPSTREAM_TIMEOUT};
use crate::api::Exoplanet;
use crate::cache::{cache_key, key_part};
use crate::error::{ServiceError, ServiceResult};

pub const DEFAULT_ARCHIVE_URL: &str = "https://exoplanetarchive.ipac.caltech.edu/TAP/sync";

const SOURCE: &str = "exoplanet archive";
const TABLE: &str = "pscomppars";
const MAX_ROWS: u32 = 100;
const COLUMNS: [&str; 5] = [
    "pl_name",
    "pl_rade",
    "pl_orbper",
    "discoverymethod",
    "st_spectype",
];

/// Validates a spectral-type filter.
///
/// Only ASCII letters, digits and whitespace are accepted; runs of whitespace
/// collapse to a single space. Anything else (quotes, punctuation, comment
/// markers) rejects the whole value, as does a value that is blank.
pub fn sanitize_star_type(raw: &str) -> Option<String> {
    if !raw
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c.is_ascii_whitespace())
    {
        return None;
    }
    let cleaned = raw.split_ascii_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Validated filter for an exoplanet listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExoplanetFilter {
    star_type: Option<String>,
    radius_min: Option<f64>,
    radius_max: Option<f64>,
}

impl ExoplanetFilter {
    /// Builds a filter, sanitizing the star type and checking the radius range.
    ///
    /// A zero radius bound is treated as unset.
    pub fn new(
        star_type: Option<&str>,
        radius_min: Option<f64>,
        radius_max: Option<f64>,
    ) -> ServiceResult<Self> {
        for (name, bound) in [("radiusMin", radius_min), ("radiusMax", radius_max)] {
            if let Some(value) = bound {
                if !value.is_finite() || value < 0.0 {
                    return Err(ServiceError::validation(format!("Invalid {} parameter", name)));
                }
            }
        }
        if let (Some(min), Some(max)) = (radius_min, radius_max) {
            if min > max {
                return Err(ServiceError::validation(
                    "radiusMin cannot be greater than radiusMax",
                ));
            }
        }

        let star_type = match star_type {
            Some(raw) => Some(
                sanitize_star_type(raw)
                    .ok_or_else(|| ServiceError::validation("Invalid starType parameter"))?,
            ),
            None => None,
        };

        Ok(Self {
            star_type,
            radius_min: radius_min.filter(|v| *v > 0.0),
            radius_max: radius_max.filter(|v| *v > 0.0),
        })
    }

    pub fn star_type(&self) -> Option<&str> {
        self.star_type.as_deref()
    }

    pub fn radius_min(&self) -> Option<f64> {
        self.radius_min
    }

    pub fn radius_max(&self) -> Option<f64> {
        self.radius_max
    }

    pub fn cache_key(&self) -> String {
        cache_key(
            "exoplanets",
            &[
                key_part(self.star_type.as_deref()),
                key_part(self.radius_min),
                key_part(self.radius_max),
            ],
        )
    }

    /// ADQL query selecting the matching planets.
    pub fn to_query(&self) -> SelectQuery {
        SelectQuery::from(TABLE)
            .top(MAX_ROWS)
            .columns(&COLUMNS)
            .filter(Predicate::NotNull("pl_name"))
            .filter_opt(
                self.star_type
                    .as_ref()
                    .map(|s| Predicate::Eq("st_spectype", Literal::Text(s.clone()))),
            )
            .filter_opt(
                self.radius_min
                    .map(|v| Predicate::AtLeast("pl_rade", Literal::Number(v))),
            )
            .filter_opt(
                self.radius_max
                    .map(|v| Predicate::AtMost("pl_rade", Literal::Number(v))),
            )
    }
}

#[derive(Debug, Deserialize)]
struct ArchiveRow {
    #[serde(default)]
    pl_name: Option<String>,
    #[serde(default)]
    pl_rade: Option<f64>,
    #[serde(default)]
    pl_orbper: Option<f64>,
    #[serde(default)]
    discoverymethod: Option<String>,
    #[serde(default)]
    st_spectype: Option<String>,
}

fn text_or(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

impl From<ArchiveRow> for Exoplanet {
    fn from(row: ArchiveRow) -> Self {
        Exoplanet {
            name: text_or(row.pl_name, "Unknown"),
            radius: row.pl_rade.unwrap_or(0.0),
            orbital_period: row.pl_orbper.unwrap_or(0.0),
            discovery_method: text_or(row.discoverymethod, "Unknown"),
            star_type: text_or(row.st_spectype, "Unknown").trim().to_string(),
        }
    }
}

/// Client for the archive's synchronous TAP endpoint.
#[derive(Clone)]
pub struct ExoplanetArchive {
    http: Arc<dyn HttpClient>,
    endpoint: String,
    timeout: Duration,
}

impl ExoplanetArchive {
    pub fn new(http: Arc<dyn HttpClient>, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            timeout: UPSTREAM_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs the filter's query and returns the normalized planets.
    pub async fn fetch(&self, filter: &ExoplanetFilter) -> ServiceResult<Vec<Exoplanet>> {
        let adql = filter.to_query().to_string();
        log::info!("TAP query: {}", adql);

        let request = HttpRequest::get(&self.endpoint)
            .with_query("query", adql)
            .with_query("format", "json")
            .with_timeout(self.timeout);

        let response = ensure_success(SOURCE, self.http.get(request).await?)?;
        let rows: Vec<ArchiveRow> = parse_body(SOURCE, &response)?;
        log::info!("Exoplanet Archive returned {} rows", rows.len());

        Ok(rows.into_iter().map(Exoplanet::from).collect())
    }
}
