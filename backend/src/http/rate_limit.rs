//! Per-client-IP rate limiting.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};

use super::error::AppError;
use super::state::AppState;
use crate::config::RateLimitSettings;

pub type ClientRateLimiter = DefaultKeyedRateLimiter<IpAddr>;

/// Windows longer than this are clamped to it.
const MAX_WINDOW: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// `max_requests` per `window`, all available as an initial burst.
pub fn quota_from_window(window: Duration, max_requests: u32) -> Quota {
    let burst = NonZeroU32::new(max_requests.max(1)).unwrap_or(NonZeroU32::MIN);
    let window = window.min(MAX_WINDOW);
    let seconds_per_cell = (window.as_secs_f64() / f64::from(burst.get())).max(0.001);

    Duration::try_from_secs_f64(seconds_per_cell)
        .ok()
        .and_then(Quota::with_period)
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst)
}

pub fn build_limiter(settings: &RateLimitSettings) -> Option<Arc<ClientRateLimiter>> {
    if !settings.enabled {
        return None;
    }
    let quota = quota_from_window(
        Duration::from_secs(settings.window_secs),
        settings.max_requests,
    );
    Some(Arc::new(RateLimiter::keyed(quota)))
}

fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Rejects requests from clients that exhausted their budget with 429.
pub async fn limit_by_client_ip(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(limiter) = &state.rate_limiter {
        let ip = client_ip(&request);
        if limiter.check_key(&ip).is_err() {
            tracing::warn!(%ip, "rate limit exceeded");
            return AppError::RateLimited.into_response();
        }
    }
    next.run(request).await
}
