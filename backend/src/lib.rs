//! # Cosmic Insights Backend
//!
//! Caching aggregation service for public NASA science data.
//!
//! The backend answers three read endpoints for a dashboard client. Each
//! request is served from an in-memory TTL cache when possible; on a miss the
//! upstream NASA API is queried, the records are normalized, summary
//! statistics are computed, the response is cached and the records are
//! upserted into the configured store.
//!
//! ## Architecture
//!
//! - [`sources`]: Upstream clients (Exoplanet Archive TAP, NeoWs feed, InSight weather)
//! - [`services`]: Per-endpoint orchestration and statistics
//! - [`cache`]: Response cache with per-entry expiry
//! - [`db`]: Repository traits with in-memory and PostgreSQL backends
//! - [`http`]: Axum-based HTTP server and request handlers
//! - [`routes`]: Record and response types for each endpoint
//! - [`config`]: TOML configuration with environment overrides

#![allow(clippy::result_large_err)]

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod services;
pub mod sources;

#[cfg(feature = "http-server")]
pub mod http;
