use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set};
use tracing::debug;

use super::user::generate_token;
use crate::domain::UserId;
use crate::entities::{prelude::*, user_sessions};

/// Repository for login tracking tokens
pub struct SessionTokenRepository {
    conn: DatabaseConnection,
}

impl SessionTokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a fresh random token and return it
    pub async fn create(
        &self,
        user_id: UserId,
        ip_address: &str,
        user_agent: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let token = generate_token();

        let active_model = user_sessions::ActiveModel {
            user_id: Set(user_id.value()),
            session_token: Set(token.clone()),
            ip_address: Set(ip_address.to_string()),
            user_agent: Set(user_agent.to_string()),
            expires_at: Set(expires_at),
            is_active: Set(true),
            created_at: Set(now),
            ..Default::default()
        };

        UserSessions::insert(active_model)
            .exec(&self.conn)
            .await
            .context("Failed to insert session token")?;

        Ok(token)
    }

    pub async fn deactivate(&self, token: &str) -> Result<bool> {
        let result = UserSessions::update_many()
            .col_expr(
                user_sessions::Column::IsActive,
                sea_orm::sea_query::Expr::value(false),
            )
            .filter(user_sessions::Column::SessionToken.eq(token))
            .exec(&self.conn)
            .await
            .context("Failed to deactivate session token")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_active(&self, user_id: UserId, now: DateTime<Utc>) -> Result<u64> {
        let count = UserSessions::find()
            .filter(user_sessions::Column::UserId.eq(user_id.value()))
            .filter(user_sessions::Column::IsActive.eq(true))
            .filter(user_sessions::Column::ExpiresAt.gt(now))
            .count(&self.conn)
            .await
            .context("Failed to count session tokens")?;

        Ok(count)
    }

    /// Delete tokens that expired before `now`
    pub async fn prune_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = UserSessions::delete_many()
            .filter(user_sessions::Column::ExpiresAt.lte(now))
            .exec(&self.conn)
            .await
            .context("Failed to prune session tokens")?;

        debug!(removed = result.rows_affected, "Pruned expired session tokens");
        Ok(result.rows_affected)
    }
}
