//! Public API surface for the backend.
//!
//! This file consolidates the record and response types served over HTTP.
//! All types derive Serialize/Deserialize with the camelCase field names the
//! dashboard client expects.

pub use crate::routes::exoplanets::Exoplanet;
pub use crate::routes::exoplanets::ExoplanetAnomaly;
pub use crate::routes::exoplanets::ExoplanetResponse;
pub use crate::routes::exoplanets::ExoplanetStatistics;
pub use crate::routes::insights::InsightSummary;
pub use crate::routes::insights::InsightsPayload;
pub use crate::routes::insights::InsightsResponse;
pub use crate::routes::insights::TemperatureAnomaly;
pub use crate::routes::insights::TemperatureTrend;
pub use crate::routes::insights::WeatherInsight;
pub use crate::routes::neo::NearEarthObject;
pub use crate::routes::neo::NeoPage;
