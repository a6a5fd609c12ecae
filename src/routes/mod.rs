use crate::config::rate_limit::{RateLimitConfig, RateLimitRule};
use crate::handlers;
use crate::middleware::auth::auth_middleware;
use axum::extract::DefaultBodyLimit;
use axum::{middleware, routing, Router};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

pub fn create_routes() -> Router {
    Router::new().nest("/api", api_routes())
}

fn api_routes() -> Router {
    let rate_limit_config = RateLimitConfig::from_env();

    let auth = auth_routes(&rate_limit_config);
    let protected =
        protected_routes(&rate_limit_config).layer(middleware::from_fn(auth_middleware));

    auth.merge(protected)
}

/// Public routes: login and first-time activation.
fn auth_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/login", routing::post(handlers::auth::login))
        .route("/activate", routing::post(handlers::auth::activate));

    with_optional_rate_limit(router, config.enabled, config.auth)
}

/// Everything else requires a bearer token; role checks live in the
/// handlers. The body limit covers complaint photos and roster uploads.
fn protected_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route(
            "/complaints",
            routing::post(handlers::complaint::submit_complaint)
                .get(handlers::complaint::list_active),
        )
        .route(
            "/my-complaints",
            routing::get(handlers::complaint::my_complaints),
        )
        .route(
            "/complaints/history",
            routing::get(handlers::complaint::list_history),
        )
        .route(
            "/complaints/{id}",
            routing::put(handlers::complaint::update_status)
                .delete(handlers::complaint::delete_complaint),
        )
        .route(
            "/upload-students",
            routing::post(handlers::roster::upload_students),
        )
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024));

    with_optional_rate_limit(router, config.enabled, config.protected)
}

fn with_optional_rate_limit(router: Router, enabled: bool, rule: RateLimitRule) -> Router {
    if !enabled {
        return router;
    }

    let governor_conf = GovernorConfigBuilder::default()
        .per_second(rule.per_second)
        .burst_size(rule.burst_size)
        .finish()
        .expect("Invalid rate limit configuration");

    router.layer(GovernorLayer::new(governor_conf))
}
