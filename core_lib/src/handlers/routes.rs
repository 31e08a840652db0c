//! Route table

use super::{forms, health};
use crate::{middleware::rate_limit::{rate_limit_middleware, RateLimiter}, AppState};
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};

/// Form endpoints, rate limited per client when a limiter is given.
pub fn form_routes(rate_limiter: Option<RateLimiter>) -> Router<AppState> {
    let router = Router::new()
        .route("/api/contact", post(forms::handle_contact))
        .route("/api/stories", post(forms::handle_story));

    match rate_limiter {
        Some(limiter) => router.route_layer(axum_middleware::from_fn_with_state(limiter, rate_limit_middleware)),
        None => router,
    }
}

pub fn create_routes(rate_limiter: Option<RateLimiter>) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::handle_health))
        .merge(form_routes(rate_limiter))
        .fallback(health::handle_not_found)
}
