use serde::{Deserialize, Serialize};

// =========================================================
// Mars weather insight types
// =========================================================

/// One sol of Mars weather, keyed by `sol`.
///
/// Zero-valued measurements mean "not reported" and are left out of
/// aggregate statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherInsight {
    pub sol: i64,
    /// Average atmospheric temperature, °C.
    pub temperature: f64,
    /// Average pressure, Pa.
    pub pressure: f64,
    /// Average horizontal wind speed, m/s.
    pub wind_speed: f64,
    /// Most common wind direction, compass degrees.
    pub wind_direction: f64,
    pub season: String,
    /// `First_UTC` timestamp of the sol, empty when unknown.
    pub last_updated: String,
}

/// Direction of the temperature series across the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureTrend {
    Increasing,
    Decreasing,
    Unknown,
}

/// Sol whose temperature lies more than one standard deviation from the mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureAnomaly {
    pub sol: i64,
    pub temperature: f64,
    pub deviation: String,
}

/// Aggregates over one weather batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightSummary {
    pub average_temperature: String,
    pub average_pressure: String,
    pub average_wind_speed: String,
    pub temperature_trend: TemperatureTrend,
    pub anomalies: Vec<TemperatureAnomaly>,
}

/// Response body of `GET /api/insights` without `full=true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsResponse {
    pub insights: Vec<WeatherInsight>,
    /// Only present for the unfiltered request.
    pub summary: Option<InsightSummary>,
}

/// Either the normalized view or the untouched upstream document (`full=true`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InsightsPayload {
    Summary(InsightsResponse),
    Raw(serde_json::Value),
}

/// Route path for Mars weather insights
pub const GET_INSIGHTS: &str = "/api/insights";
