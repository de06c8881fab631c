use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::domain::{Clock, SystemClock};
use crate::services::{
    AuthService, DashboardService, SeaOrmAuthService, SeaOrmDashboardService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub clock: Arc<dyn Clock>,

    pub auth_service: Arc<dyn AuthService>,

    pub dashboard_service: Arc<dyn DashboardService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock)).await
    }

    /// Builds the state around an explicit clock, used by tests to drive
    /// lockout and session expiry.
    pub async fn with_clock(config: Config, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let auth = SeaOrmAuthService::new(store.clone(), clock.clone(), config.security.clone());

        if config.demo.seed_demo_user {
            auth.ensure_account(&config.demo)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to seed demo account: {e}"))?;
        }

        let auth_service = Arc::new(auth) as Arc<dyn AuthService + Send + Sync + 'static>;

        let dashboard_service = Arc::new(SeaOrmDashboardService::new(store.clone(), clock.clone()))
            as Arc<dyn DashboardService + Send + Sync + 'static>;

        Ok(Self {
            config: Arc::new(config),
            store,
            clock,
            auth_service,
            dashboard_service,
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}
