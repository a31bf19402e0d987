//! Application state for the HTTP server.

use std::sync::Arc;

use super::rate_limit::{build_limiter, ClientRateLimiter};
use crate::config::{RateLimitSettings, ServerSettings};
use crate::services::Services;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<Services>,
    pub server: ServerSettings,
    /// `None` disables rate limiting.
    pub rate_limiter: Option<Arc<ClientRateLimiter>>,
}

impl AppState {
    pub fn new(services: Services, server: ServerSettings, rate_limit: &RateLimitSettings) -> Self {
        Self {
            services: Arc::new(services),
            server,
            rate_limiter: build_limiter(rate_limit),
        }
    }
}
