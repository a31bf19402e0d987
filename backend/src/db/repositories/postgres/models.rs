use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{exoplanets, near_earth_objects, weather_insights};
use crate::api::{Exoplanet, NearEarthObject, WeatherInsight};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = exoplanets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // updated_at is bookkeeping only
pub struct ExoplanetRow {
    pub name: String,
    pub radius: f64,
    pub orbital_period: f64,
    pub discovery_method: String,
    pub star_type: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = exoplanets)]
pub struct NewExoplanetRow<'a> {
    pub name: &'a str,
    pub radius: f64,
    pub orbital_period: f64,
    pub discovery_method: &'a str,
    pub star_type: &'a str,
}

impl<'a> From<&'a Exoplanet> for NewExoplanetRow<'a> {
    fn from(p: &'a Exoplanet) -> Self {
        Self {
            name: &p.name,
            radius: p.radius,
            orbital_period: p.orbital_period,
            discovery_method: &p.discovery_method,
            star_type: &p.star_type,
        }
    }
}

impl From<ExoplanetRow> for Exoplanet {
    fn from(row: ExoplanetRow) -> Self {
        Exoplanet {
            name: row.name,
            radius: row.radius,
            orbital_period: row.orbital_period,
            discovery_method: row.discovery_method,
            star_type: row.star_type,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = near_earth_objects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)]
pub struct NeoRow {
    pub id: String,
    pub name: String,
    pub diameter: f64,
    pub velocity: f64,
    pub close_approach_date: String,
    pub is_potentially_hazardous: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = near_earth_objects)]
pub struct NewNeoRow<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub diameter: f64,
    pub velocity: f64,
    pub close_approach_date: &'a str,
    pub is_potentially_hazardous: bool,
}

impl<'a> From<&'a NearEarthObject> for NewNeoRow<'a> {
    fn from(n: &'a NearEarthObject) -> Self {
        Self {
            id: &n.id,
            name: &n.name,
            diameter: n.diameter,
            velocity: n.velocity,
            close_approach_date: &n.close_approach_date,
            is_potentially_hazardous: n.is_potentially_hazardous,
        }
    }
}

impl From<NeoRow> for NearEarthObject {
    fn from(row: NeoRow) -> Self {
        NearEarthObject {
            id: row.id,
            name: row.name,
            diameter: row.diameter,
            velocity: row.velocity,
            close_approach_date: row.close_approach_date,
            is_potentially_hazardous: row.is_potentially_hazardous,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = weather_insights)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)]
pub struct InsightRow {
    pub sol: i64,
    pub temperature: f64,
    pub pressure: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub season: String,
    pub last_updated: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = weather_insights)]
pub struct NewInsightRow<'a> {
    pub sol: i64,
    pub temperature: f64,
    pub pressure: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub season: &'a str,
    pub last_updated: &'a str,
}

impl<'a> From<&'a WeatherInsight> for NewInsightRow<'a> {
    fn from(i: &'a WeatherInsight) -> Self {
        Self {
            sol: i.sol,
            temperature: i.temperature,
            pressure: i.pressure,
            wind_speed: i.wind_speed,
            wind_direction: i.wind_direction,
            season: &i.season,
            last_updated: &i.last_updated,
        }
    }
}

impl From<InsightRow> for WeatherInsight {
    fn from(row: InsightRow) -> Self {
        WeatherInsight {
            sol: row.sol,
            temperature: row.temperature,
            pressure: row.pressure,
            wind_speed: row.wind_speed,
            wind_direction: row.wind_direction,
            season: row.season,
            last_updated: row.last_updated,
        }
    }
}
