use std::sync::Arc;

use axum::Router;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use crate::{
    config::RateLimit,
    error::{AppError, Result},
    state::AppState,
};

/// Wraps `routes` in a per-IP rate limit.
///
/// The key is the peer address, so the server must be started with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn limit_per_ip(routes: Router<AppState>, limit: RateLimit) -> Result<Router<AppState>> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(limit.per_second)
            .burst_size(limit.burst)
            .use_headers()
            .finish()
            .ok_or_else(|| AppError::Internal("Invalid rate limit configuration".to_string()))?,
    );

    tracing::info!(
        "✅ Auth rate limit: burst {} then 1 request per {}s per IP",
        limit.burst,
        limit.per_second
    );

    Ok(routes.layer(GovernorLayer::new(governor_conf)))
}
