use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::{Config, SessionStoreKind};
use crate::domain::Clock;
use crate::services::{AuthService, DashboardService};
use crate::state::SharedState;

pub mod auth;
mod credentials;
mod dashboard;
mod error;
mod observability;
mod system;
mod types;
mod validation;

pub use auth::CurrentUser;
pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        self.shared.config()
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.shared.clock
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn dashboard_service(&self) -> &Arc<dyn DashboardService> {
        &self.shared.dashboard_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

/// Build the router with the session backend named in config.
pub async fn router(state: Arc<AppState>) -> anyhow::Result<Router> {
    match state.config().server.session_store {
        SessionStoreKind::Memory => Ok(router_with_session_store(state, MemoryStore::default())),
        SessionStoreKind::Sqlite => {
            let pool = state.store().conn.get_sqlite_connection_pool().clone();
            let session_store = SqliteStore::new(pool);
            session_store.migrate().await?;
            tracing::info!("Using SQLite-backed session store");
            Ok(router_with_session_store(state, session_store))
        }
    }
}

pub fn router_with_session_store<S>(state: Arc<AppState>, session_store: S) -> Router
where
    S: SessionStore + Clone,
{
    let config = state.config();

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.server.secure_cookies)
        .with_http_only(true)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(
            config.security.session_lifetime_hours,
        )));

    let cors_layer = cors_layer(&config.server.cors_allowed_origins);

    let dashboard_route = post(dashboard::handle)
        .options(system::preflight)
        .fallback(system::method_not_allowed)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    let api_router = Router::new()
        .route(
            "/credentials",
            post(credentials::handle)
                .options(system::preflight)
                .fallback(system::method_not_allowed),
        )
        .route("/dashboard_data", dashboard_route)
        .route("/health", get(system::health))
        .layer(session_layer)
        .with_state(state.clone());

    Router::new()
        .nest("/api", api_router)
        .route("/metrics", get(observability::get_metrics))
        .with_state(state)
        .layer(cors_layer)
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Credentialed CORS: origins are listed explicitly, `*` mirrors the caller.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|s| s.parse().ok()).collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(86_400))
}
