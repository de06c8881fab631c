use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Serialize;

use crate::domain::{Symbol, UserId};
use crate::entities::{portfolio, prelude::*};

/// Position count and book value (Σ shares × average price).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub positions: u64,
    pub total_value: f64,
}

#[derive(Debug, Clone)]
pub struct NewPosition {
    pub user_id: UserId,
    pub symbol: Symbol,
    pub company_name: Option<String>,
    pub shares: f64,
    pub avg_price: f64,
    pub notes: Option<String>,
}

pub struct PortfolioRepository {
    conn: DatabaseConnection,
}

impl PortfolioRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn summary(&self, user_id: UserId) -> Result<PortfolioSummary> {
        let rows = self.list(user_id).await?;

        Ok(rows
            .iter()
            .fold(PortfolioSummary::default(), |mut acc, row| {
                acc.positions += 1;
                acc.total_value += row.shares * row.avg_price;
                acc
            }))
    }

    /// Newest purchases first
    pub async fn list(&self, user_id: UserId) -> Result<Vec<portfolio::Model>> {
        let rows = Portfolio::find()
            .filter(portfolio::Column::UserId.eq(user_id.value()))
            .order_by_desc(portfolio::Column::PurchaseDate)
            .order_by_desc(portfolio::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query portfolio")?;

        Ok(rows)
    }

    pub async fn add(&self, position: NewPosition, now: DateTime<Utc>) -> Result<i32> {
        let active_model = portfolio::ActiveModel {
            user_id: Set(position.user_id.value()),
            symbol: Set(position.symbol.into_inner()),
            company_name: Set(position.company_name),
            shares: Set(position.shares),
            avg_price: Set(position.avg_price),
            notes: Set(position.notes),
            purchase_date: Set(now),
            ..Default::default()
        };

        let res = Portfolio::insert(active_model)
            .exec(&self.conn)
            .await
            .context("Failed to insert portfolio position")?;

        Ok(res.last_insert_id)
    }

    /// Delete a position only if it belongs to `user_id`
    pub async fn remove(&self, user_id: UserId, id: i32) -> Result<bool> {
        let result = Portfolio::delete_many()
            .filter(portfolio::Column::Id.eq(id))
            .filter(portfolio::Column::UserId.eq(user_id.value()))
            .exec(&self.conn)
            .await
            .context("Failed to delete portfolio position")?;

        Ok(result.rows_affected > 0)
    }
}
