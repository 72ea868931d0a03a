use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, security_headers_middleware, trace_id,
    verify_rate_limit_middleware, RateLimiterState,
};
use crate::routes::{checkout, customers, groups, health, messages, orders, products};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    /// Per-IP limiter for password verification; `None` when disabled.
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);

    let rate_limiter =
        RateLimiterState::new(config.security.verify_rate_limit_per_minute).map(Arc::new);

    let state = AppState {
        pool,
        config: config.clone(),
        rate_limiter,
    };

    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Password verification is rate limited per client IP
    let verify_routes = Router::new()
        .route("/api/customers/verify", post(customers::verify_customer))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            verify_rate_limit_middleware,
        ));

    let store_routes = Router::new()
        .route(
            "/api/customers",
            get(customers::list_customers)
                .post(customers::create_customer)
                .put(customers::update_customer)
                .delete(customers::delete_customer),
        )
        .route(
            "/api/groups",
            get(groups::list_groups)
                .post(groups::create_group)
                .delete(groups::delete_group),
        )
        .route(
            "/api/messages",
            get(messages::list_messages)
                .post(messages::send_message)
                .put(messages::update_message),
        )
        .route(
            "/api/orders",
            get(orders::list_orders).post(orders::save_orders),
        )
        .route("/api/orders/:id", put(orders::update_order))
        .route("/api/checkout", post(checkout::checkout))
        .route(
            "/api/products",
            get(products::list_products).post(products::save_products),
        );

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(store_routes)
        .merge(verify_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.server.max_body_size))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
