use std::sync::Arc;

use crate::config::ServerConfig;
use crate::ratelimit::RateLimiter;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: leadbook_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Injected per-actor rate limiter. The default is an in-process
    /// fixed-window limiter; deployments behind multiple replicas swap in a
    /// shared-store implementation.
    pub rate_limiter: Arc<dyn RateLimiter>,
}
