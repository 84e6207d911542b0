//! Clubgate API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod dto;
mod error;
mod handlers;
mod logging;
mod middleware;
mod session;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use clubgate_application::{
    CsrfService, InputInspector, MembershipService, RateLimitRule, RateLimitService, ThreatMonitor,
    ThreatPolicy,
};
use clubgate_core::AppError;
use clubgate_infrastructure::{
    InMemoryAttackLog, InMemoryBlockList, InMemoryCsrfTokenRepository, InMemoryRateLimitRepository,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use tracing::info;

use crate::api_config::ApiConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    let config = ApiConfig::load()?;
    let _log_guard = logging::init(&config.log_dir);

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::hours(1)));

    // Security services.
    let csrf_repository = Arc::new(InMemoryCsrfTokenRepository::new());
    let csrf_service = CsrfService::new(csrf_repository);

    let rate_limit_repository = Arc::new(InMemoryRateLimitRepository::new());
    let rate_limit_service = RateLimitService::new(rate_limit_repository);
    spawn_rate_limit_cleanup(rate_limit_service.clone());

    let attack_log = Arc::new(InMemoryAttackLog::new());
    let block_list = Arc::new(InMemoryBlockList::new());
    let threat_monitor = ThreatMonitor::new(attack_log, block_list, ThreatPolicy::default());

    let inspector = Arc::new(InputInspector::new()?);

    let membership_service = MembershipService::new(
        csrf_service.clone(),
        inspector.clone(),
        threat_monitor.clone(),
    );

    // Rate limit rules.
    // Site-wide: 20 requests per IP per minute.
    let global_rate_rule = RateLimitRule::new("global", 20, 60);
    // Membership form: 5 submissions per IP per minute, counted separately.
    let form_rate_rule = RateLimitRule::new("form", 5, 60);

    let app_state = AppState {
        membership_service,
        csrf_service,
        rate_limit_service,
        threat_monitor,
        inspector,
        global_rate_rule,
        static_dir: config.static_dir.clone(),
    };

    let form_routes = Router::new()
        .route("/submit-form", post(handlers::submit_form_handler))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::rate_limit,
        ))
        .layer(axum::Extension(form_rate_rule));

    let app = Router::new()
        .route("/", get(handlers::index_handler))
        .route("/health", get(handlers::health_handler))
        .route(
            "/api/calendar/{year}/{month}",
            get(handlers::month_view_handler),
        )
        .route(
            "/api/security/report",
            get(handlers::security_report_handler),
        )
        .merge(form_routes)
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .layer(from_fn_with_state(
            app_state.clone(),
            middleware::inspect_request,
        ))
        .layer(from_fn_with_state(
            app_state.clone(),
            middleware::global_rate_limit,
        ))
        .layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_unblocked,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(session_layer)
        .layer(from_fn(middleware::security_headers))
        .with_state(app_state);

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "clubgate-api listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

/// Evicts stale rate-limit windows hourly so the counter map stays bounded.
fn spawn_rate_limit_cleanup(rate_limit_service: RateLimitService) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(3600));
        interval.tick().await;
        loop {
            interval.tick().await;
            match rate_limit_service.cleanup().await {
                Ok(removed) => tracing::debug!(removed, "rate limit windows evicted"),
                Err(error) => tracing::warn!(%error, "rate limit cleanup failed"),
            }
        }
    });
}
