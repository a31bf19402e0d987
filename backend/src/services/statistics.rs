//! Batch statistics and anomaly detection.
//!
//! Every aggregate is computed over the current fetch batch only. Measurements
//! equal to zero mean "not reported" and are excluded.

use crate::api::{
    Exoplanet, ExoplanetAnomaly, ExoplanetStatistics, InsightSummary, TemperatureAnomaly,
    TemperatureTrend, WeatherInsight,
};

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation around `mean`; 0 for an empty slice.
pub fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Renders `value` with exactly `digits` decimals, rounding half away from zero.
///
/// A result that rounds to zero is rendered unsigned.
pub fn fixed(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return format!("{:.*}", digits, 0.0);
    }
    let factor = 10f64.powi(digits as i32);
    let mut rounded = (value * factor).round() / factor;
    if rounded == 0.0 {
        rounded = 0.0;
    }
    format!("{:.*}", digits, rounded)
}

fn non_zero(values: impl Iterator<Item = f64>) -> Vec<f64> {
    values.filter(|v| *v != 0.0).collect()
}

/// Mean radius over planets with a positive radius, plus the planets more
/// than twice that size.
pub fn exoplanet_statistics(planets: &[Exoplanet]) -> ExoplanetStatistics {
    let radii: Vec<f64> = planets.iter().map(|p| p.radius).filter(|r| *r > 0.0).collect();
    let mean_radius = mean(&radii);

    let anomalies = planets
        .iter()
        .filter(|p| p.radius > mean_radius * 2.0)
        .map(|p| ExoplanetAnomaly {
            name: p.name.clone(),
            radius: p.radius,
            deviation: fixed(p.radius - mean_radius, 2),
        })
        .collect();

    ExoplanetStatistics {
        average_radius: fixed(mean_radius, 2),
        anomalies,
    }
}

/// Compares the first and last reading of a chronologically ordered series.
pub fn temperature_trend(temperatures: &[f64]) -> TemperatureTrend {
    match (temperatures.first(), temperatures.last()) {
        (Some(first), Some(last)) if temperatures.len() >= 2 => {
            if first < last {
                TemperatureTrend::Increasing
            } else {
                TemperatureTrend::Decreasing
            }
        }
        _ => TemperatureTrend::Unknown,
    }
}

/// Summary over a batch of weather readings ordered by ascending sol.
pub fn insight_summary(insights: &[WeatherInsight]) -> InsightSummary {
    let temperatures = non_zero(insights.iter().map(|i| i.temperature));
    let pressures = non_zero(insights.iter().map(|i| i.pressure));
    let wind_speeds = non_zero(insights.iter().map(|i| i.wind_speed));

    let temp_mean = mean(&temperatures);
    let temp_std = population_std_dev(&temperatures, temp_mean);

    let anomalies = insights
        .iter()
        .filter(|i| i.temperature != 0.0 && (i.temperature - temp_mean).abs() > temp_std)
        .map(|i| TemperatureAnomaly {
            sol: i.sol,
            temperature: i.temperature,
            deviation: fixed(i.temperature - temp_mean, 2),
        })
        .collect();

    InsightSummary {
        average_temperature: fixed(temp_mean, 2),
        average_pressure: fixed(mean(&pressures), 1),
        average_wind_speed: fixed(mean(&wind_speeds), 2),
        temperature_trend: temperature_trend(&temperatures),
        anomalies,
    }
}
