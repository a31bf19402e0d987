//! HTTP handlers for the REST API.
//!
//! Each handler validates its query string and delegates to the matching
//! data service. Service errors become `{error: {message, status}}` bodies.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde_json::Value;

use super::dto::HealthResponse;
use super::error::AppError;
use super::state::AppState;
use super::validation::{self, QueryParams};
use crate::error::ServiceError;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

type RawQuery = Result<Query<Vec<(String, String)>>, QueryRejection>;

fn query_params(raw: RawQuery) -> Result<QueryParams, AppError> {
    match raw {
        Ok(Query(pairs)) => Ok(QueryParams::new(pairs)),
        Err(rejection) => Err(ServiceError::validation(rejection.body_text()).into()),
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let repository = &state.services.repository;
    let db_status = match repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: format!("{}: {}", repository.backend_name(), db_status),
    }))
}

// =============================================================================
// Data endpoints
// =============================================================================

/// GET /api/exoplanets?starType=&radiusMin=&radiusMax=
pub async fn get_exoplanets(
    State(state): State<AppState>,
    raw: RawQuery,
) -> HandlerResult<Value> {
    let filter = validation::exoplanet_filter(&query_params(raw)?)?;
    let body = state.services.exoplanets.list(&filter).await?;
    Ok(Json(body))
}

/// GET /api/neo?hazardous=&date=&page=&limit=
pub async fn get_neos(State(state): State<AppState>, raw: RawQuery) -> HandlerResult<Value> {
    let query = validation::neo_query(&query_params(raw)?)?;
    let body = state.services.neos.list(&query).await?;
    Ok(Json(body))
}

/// GET /api/insights?full=&sol=
pub async fn get_insights(State(state): State<AppState>, raw: RawQuery) -> HandlerResult<Value> {
    let query = validation::insights_query(&query_params(raw)?)?;
    let body = state.services.insights.list(&query).await?;
    Ok(Json(body))
}

pub async fn route_not_found() -> AppError {
    AppError::RouteNotFound
}
