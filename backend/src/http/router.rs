//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, rate limit, security
//! headers, compression, tracing), and creates the axum router ready for
//! serving.

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use super::handlers;
use super::rate_limit::limit_by_client_ip;
use super::state::AppState;
use crate::routes::{exoplanets::GET_EXOPLANETS, insights::GET_INSIGHTS, neo::GET_NEOS};

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origin = if allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

fn security_header(
    name: HeaderName,
    value: &'static str,
) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
}

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let mut api = Router::new()
        .route(GET_EXOPLANETS, get(handlers::get_exoplanets))
        .route(GET_NEOS, get(handlers::get_neos))
        .route(GET_INSIGHTS, get(handlers::get_insights));

    if state.rate_limiter.is_some() {
        api = api.route_layer(middleware::from_fn_with_state(
            state.clone(),
            limit_by_client_ip,
        ));
    }

    let cors = cors_layer(&state.server.allowed_origins);

    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(api)
        .fallback(handlers::route_not_found)
        .layer(security_header(header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .layer(security_header(header::X_FRAME_OPTIONS, "SAMEORIGIN"))
        .layer(security_header(header::REFERRER_POLICY, "no-referrer"))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
