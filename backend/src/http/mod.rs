//! HTTP server module.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Query parameter validation                             │
//! │  - CORS, rate limit, security headers, compression        │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Services (exoplanets, neo, insights)                     │
//! │  - Cache, upstream fetch, statistics                      │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Repository Layer (db/)                                   │
//! │  - LocalRepository / PostgresRepository                   │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod router;
pub mod state;
pub mod validation;

pub use error::AppError;
pub use rate_limit::ClientRateLimiter;
pub use router::create_router;
pub use state::AppState;
