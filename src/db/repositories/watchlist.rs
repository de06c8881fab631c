use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::domain::UserId;
use crate::entities::{prelude::*, watchlist};

pub struct WatchlistRepository {
    conn: DatabaseConnection,
}

impl WatchlistRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn count(&self, user_id: UserId) -> Result<u64> {
        let count = Watchlist::find()
            .filter(watchlist::Column::UserId.eq(user_id.value()))
            .count(&self.conn)
            .await
            .context("Failed to count watchlist")?;

        Ok(count)
    }

    /// Most recently added first
    pub async fn list(&self, user_id: UserId) -> Result<Vec<watchlist::Model>> {
        let rows = Watchlist::find()
            .filter(watchlist::Column::UserId.eq(user_id.value()))
            .order_by_desc(watchlist::Column::AddedAt)
            .order_by_desc(watchlist::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query watchlist")?;

        Ok(rows)
    }

    pub async fn contains(&self, user_id: UserId, symbol: &str) -> Result<bool> {
        let count = Watchlist::find()
            .filter(watchlist::Column::UserId.eq(user_id.value()))
            .filter(watchlist::Column::Symbol.eq(symbol))
            .count(&self.conn)
            .await
            .context("Failed to check watchlist")?;

        Ok(count > 0)
    }

    pub async fn add(&self, user_id: UserId, symbol: &str, now: DateTime<Utc>) -> Result<i32> {
        let active_model = watchlist::ActiveModel {
            user_id: Set(user_id.value()),
            symbol: Set(symbol.to_string()),
            added_at: Set(now),
            ..Default::default()
        };

        let res = Watchlist::insert(active_model)
            .exec(&self.conn)
            .await
            .context("Failed to insert watchlist entry")?;

        Ok(res.last_insert_id)
    }

    pub async fn remove(&self, user_id: UserId, symbol: &str) -> Result<bool> {
        let result = Watchlist::delete_many()
            .filter(watchlist::Column::UserId.eq(user_id.value()))
            .filter(watchlist::Column::Symbol.eq(symbol))
            .exec(&self.conn)
            .await
            .context("Failed to delete watchlist entry")?;

        Ok(result.rows_affected > 0)
    }
}
