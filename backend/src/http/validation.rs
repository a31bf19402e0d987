//! Query-string validation for the API routes.
//!
//! Parameters are read from the raw pair list so repeated keys can be
//! detected. Empty values count as absent; whitespace-only values do not.

use chrono::NaiveDate;

use crate::error::{ServiceError, ServiceResult};
use crate::services::neo::{DEFAULT_LIMIT, DEFAULT_PAGE};
use crate::services::{InsightsQuery, NeoQuery};
use crate::sources::ExoplanetFilter;

/// Decoded query-string pairs in request order.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// The single non-empty value of `name`, failing with `message` when the
    /// key is repeated.
    fn one(&self, name: &str, message: &str) -> ServiceResult<Option<&str>> {
        let mut values = self
            .pairs
            .iter()
            .filter(|(k, v)| k == name && !v.is_empty())
            .map(|(_, v)| v.as_str());
        let first = values.next();
        if values.next().is_some() {
            return Err(ServiceError::validation(message));
        }
        Ok(first)
    }
}

fn radius(params: &QueryParams, name: &str) -> ServiceResult<Option<f64>> {
    let message = format!("Invalid {} parameter", name);
    match params.one(name, &message)? {
        None => Ok(None),
        Some(raw) => match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => Ok(Some(v)),
            _ => Err(ServiceError::validation(message)),
        },
    }
}

fn positive(params: &QueryParams, name: &str, default: u32) -> ServiceResult<u32> {
    let message = format!("Invalid {} parameter", name);
    match params.one(name, &message)? {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u32>() {
            Ok(v) if v >= 1 => Ok(v),
            _ => Err(ServiceError::validation(message)),
        },
    }
}

/// `starType`, `radiusMin`, `radiusMax` for `GET /api/exoplanets`.
pub fn exoplanet_filter(params: &QueryParams) -> ServiceResult<ExoplanetFilter> {
    let star_type = params.one("starType", "starType must be a string")?;
    let radius_min = radius(params, "radiusMin")?;
    let radius_max = radius(params, "radiusMax")?;
    ExoplanetFilter::new(star_type, radius_min, radius_max)
}

fn calendar_date(raw: &str) -> Option<NaiveDate> {
    let bytes = raw.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// `hazardous`, `date`, `page`, `limit` for `GET /api/neo`.
pub fn neo_query(params: &QueryParams) -> ServiceResult<NeoQuery> {
    let hazardous_message = "Invalid hazardous parameter";
    let hazardous = match params.one("hazardous", hazardous_message)? {
        None => None,
        Some("true") => Some(true),
        Some("false") => Some(false),
        Some(_) => return Err(ServiceError::validation(hazardous_message)),
    };

    let date_message = "Invalid date parameter, must be YYYY-MM-DD";
    let date = match params.one("date", date_message)? {
        None => None,
        Some(raw) => Some(
            calendar_date(raw.trim()).ok_or_else(|| ServiceError::validation(date_message))?,
        ),
    };

    Ok(NeoQuery {
        hazardous,
        date,
        page: positive(params, "page", DEFAULT_PAGE)?,
        limit: positive(params, "limit", DEFAULT_LIMIT)?,
    })
}

/// `full`, `sol` for `GET /api/insights`.
pub fn insights_query(params: &QueryParams) -> ServiceResult<InsightsQuery> {
    let full = params.one("full", "Invalid full parameter")? == Some("true");
    let sol_message = "Invalid sol parameter";
    let sol = match params.one("sol", sol_message)? {
        None => None,
        Some(raw) => Some(
            raw.trim()
                .parse::<i64>()
                .map_err(|_| ServiceError::validation(sol_message))?,
        ),
    };
    Ok(InsightsQuery { full, sol })
}
