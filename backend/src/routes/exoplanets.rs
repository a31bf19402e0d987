use serde::{Deserialize, Serialize};

// =========================================================
// Exoplanet types
// =========================================================

/// Canonical exoplanet record, keyed by `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exoplanet {
    pub name: String,
    /// Planet radius in Earth radii (0 when unknown).
    pub radius: f64,
    /// Orbital period in days (0 when unknown).
    pub orbital_period: f64,
    pub discovery_method: String,
    pub star_type: String,
}

/// Planet whose radius exceeds twice the batch mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExoplanetAnomaly {
    pub name: String,
    pub radius: f64,
    /// Signed `radius - mean`, two decimals.
    pub deviation: String,
}

/// Radius statistics over one fetch batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExoplanetStatistics {
    /// Mean of the positive radii, two decimals.
    pub average_radius: String,
    pub anomalies: Vec<ExoplanetAnomaly>,
}

/// Response body of `GET /api/exoplanets`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExoplanetResponse {
    pub data: Vec<Exoplanet>,
    pub total: usize,
    pub statistics: ExoplanetStatistics,
}

/// Route path for exoplanet listings
pub const GET_EXOPLANETS: &str = "/api/exoplanets";
