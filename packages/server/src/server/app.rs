//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    http::{
        header::{HeaderValue, CONTENT_TYPE},
        Method,
    },
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::domains::referrals::{PgReferralStore, ReferralEngine};
use crate::server::routes::{
    health_handler, join_waitlist_handler, process_referral_handler, referral_summary_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub engine: Arc<ReferralEngine>,
}

/// Build the Axum application router over a Postgres-backed store
///
/// The engine is stateless; every request handler shares one instance over
/// the connection pool. Request timeout lives here, not in the engine.
pub fn build_app(pool: PgPool, allowed_origins: Vec<String>) -> Router {
    let store = Arc::new(PgReferralStore::new(pool.clone()));
    let engine = Arc::new(ReferralEngine::new(store));

    build_router(
        AppState {
            db_pool: pool,
            engine,
        },
        allowed_origins,
    )
}

/// Assemble the router over prepared state. Split from [`build_app`] so
/// handler tests can supply an engine wired to an in-memory store.
pub fn build_router(app_state: AppState, allowed_origins: Vec<String>) -> Router {
    // The signup form posts cross-origin, so CORS mirrors the permissive
    // setup the hosted functions used unless origins are pinned via config.
    let origin = if allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            allowed_origins
                .iter()
                .filter_map(|o| o.parse::<HeaderValue>().ok()),
        )
    };
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    // Rate limiting: the waitlist endpoints are unauthenticated and public,
    // so cap each IP at a modest burst.
    let rate_limit_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .use_headers()
            .finish()
            .expect("rate limiter configuration is valid"),
    );
    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config,
    };

    Router::new()
        .route("/api/waitlist", post(join_waitlist_handler))
        .route("/api/referrals", post(process_referral_handler))
        .route("/api/referrals/:email", get(referral_summary_handler))
        .layer(rate_limit_layer)
        // Health check (no rate limit)
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(TimeoutLayer::new(Duration::from_secs(15)))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state))
}
