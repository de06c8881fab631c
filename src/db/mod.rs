use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::domain::UserId;

pub mod migrator;
pub mod repositories;

pub use crate::entities::portfolio::Model as PortfolioEntry;
pub use crate::entities::user_activity::Model as ActivityRecord;
pub use crate::entities::watchlist::Model as WatchlistEntry;
pub use repositories::portfolio::{NewPosition, PortfolioSummary};
pub use repositories::user::{NewUser, User};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn session_token_repo(&self) -> repositories::session_token::SessionTokenRepository {
        repositories::session_token::SessionTokenRepository::new(self.conn.clone())
    }

    fn activity_repo(&self) -> repositories::activity::ActivityRepository {
        repositories::activity::ActivityRepository::new(self.conn.clone())
    }

    fn portfolio_repo(&self) -> repositories::portfolio::PortfolioRepository {
        repositories::portfolio::PortfolioRepository::new(self.conn.clone())
    }

    fn watchlist_repo(&self) -> repositories::watchlist::WatchlistRepository {
        repositories::watchlist::WatchlistRepository::new(self.conn.clone())
    }

    // ------------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------------

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_email_with_password(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>> {
        self.user_repo().get_by_email_with_password(email).await
    }

    pub async fn user_exists(&self, email: &str, username: &str) -> Result<bool> {
        self.user_repo().exists(email, username).await
    }

    pub async fn create_user(&self, user: NewUser, now: DateTime<Utc>) -> Result<UserId> {
        self.user_repo().create(user, now).await
    }

    pub async fn record_failed_login(
        &self,
        id: UserId,
        failed_login_attempts: i32,
        locked_until: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.user_repo()
            .record_failed_login(id, failed_login_attempts, locked_until, now)
            .await
    }

    pub async fn record_successful_login(&self, id: UserId, now: DateTime<Utc>) -> Result<()> {
        self.user_repo().record_successful_login(id, now).await
    }

    pub async fn set_user_active(&self, id: UserId, active: bool, now: DateTime<Utc>) -> Result<()> {
        self.user_repo().set_active(id, active, now).await
    }

    pub async fn verify_password_hash(&self, password_hash: &str, password: &str) -> Result<bool> {
        repositories::user::verify_password(password_hash, password).await
    }

    pub async fn hash_password(&self, password: &str, config: &SecurityConfig) -> Result<String> {
        repositories::user::hash_password_blocking(password, config).await
    }

    // ------------------------------------------------------------------------
    // Session tokens and activity
    // ------------------------------------------------------------------------

    pub async fn create_session_token(
        &self,
        user_id: UserId,
        ip_address: &str,
        user_agent: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<String> {
        self.session_token_repo()
            .create(user_id, ip_address, user_agent, expires_at, now)
            .await
    }

    pub async fn deactivate_session_token(&self, token: &str) -> Result<bool> {
        self.session_token_repo().deactivate(token).await
    }

    pub async fn count_active_session_tokens(&self, user_id: UserId, now: DateTime<Utc>) -> Result<u64> {
        self.session_token_repo().count_active(user_id, now).await
    }

    pub async fn prune_expired_session_tokens(&self, now: DateTime<Utc>) -> Result<u64> {
        self.session_token_repo().prune_expired(now).await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn add_activity(
        &self,
        user_id: UserId,
        email: &str,
        action: &str,
        details: Option<&str>,
        ip_address: &str,
        user_agent: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.activity_repo()
            .add(user_id, email, action, details, ip_address, user_agent, now)
            .await
    }

    pub async fn recent_activity(&self, user_id: UserId, limit: u64) -> Result<Vec<ActivityRecord>> {
        self.activity_repo().recent_for_user(user_id, limit).await
    }

    // ------------------------------------------------------------------------
    // Portfolio and watchlist
    // ------------------------------------------------------------------------

    pub async fn portfolio_summary(&self, user_id: UserId) -> Result<PortfolioSummary> {
        self.portfolio_repo().summary(user_id).await
    }

    pub async fn list_portfolio(&self, user_id: UserId) -> Result<Vec<PortfolioEntry>> {
        self.portfolio_repo().list(user_id).await
    }

    pub async fn add_position(&self, position: NewPosition, now: DateTime<Utc>) -> Result<i32> {
        self.portfolio_repo().add(position, now).await
    }

    pub async fn remove_position(&self, user_id: UserId, id: i32) -> Result<bool> {
        self.portfolio_repo().remove(user_id, id).await
    }

    pub async fn watchlist_count(&self, user_id: UserId) -> Result<u64> {
        self.watchlist_repo().count(user_id).await
    }

    pub async fn list_watchlist(&self, user_id: UserId) -> Result<Vec<WatchlistEntry>> {
        self.watchlist_repo().list(user_id).await
    }

    pub async fn watchlist_contains(&self, user_id: UserId, symbol: &str) -> Result<bool> {
        self.watchlist_repo().contains(user_id, symbol).await
    }

    pub async fn add_to_watchlist(
        &self,
        user_id: UserId,
        symbol: &str,
        now: DateTime<Utc>,
    ) -> Result<i32> {
        self.watchlist_repo().add(user_id, symbol, now).await
    }

    pub async fn remove_from_watchlist(&self, user_id: UserId, symbol: &str) -> Result<bool> {
        self.watchlist_repo().remove(user_id, symbol).await
    }
}

/// Whether an error chain bottoms out in a unique-constraint violation.
#[must_use]
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<sea_orm::DbErr>()
            .and_then(sea_orm::DbErr::sql_err)
            .is_some_and(|e| matches!(e, sea_orm::SqlErr::UniqueConstraintViolation(_)))
    })
}
