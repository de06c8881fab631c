use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::domain::UserId;
use crate::entities::{prelude::*, user_activity};

pub struct ActivityRepository {
    conn: DatabaseConnection,
}

impl ActivityRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn add(
        &self,
        user_id: UserId,
        email: &str,
        action: &str,
        details: Option<&str>,
        ip_address: &str,
        user_agent: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let active_model = user_activity::ActiveModel {
            user_id: Set(user_id.value()),
            email: Set(email.to_string()),
            action: Set(action.to_string()),
            details: Set(details.map(str::to_string)),
            ip_address: Set(ip_address.to_string()),
            user_agent: Set(user_agent.to_string()),
            created_at: Set(now),
            ..Default::default()
        };

        UserActivity::insert(active_model)
            .exec(&self.conn)
            .await
            .context("Failed to insert activity record")?;
        Ok(())
    }

    pub async fn recent_for_user(
        &self,
        user_id: UserId,
        limit: u64,
    ) -> Result<Vec<user_activity::Model>> {
        let rows = UserActivity::find()
            .filter(user_activity::Column::UserId.eq(user_id.value()))
            .order_by_desc(user_activity::Column::CreatedAt)
            .order_by_desc(user_activity::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to query activity")?;

        Ok(rows)
    }
}
