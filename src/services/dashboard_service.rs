//! Domain service for the per-user dashboard.
//!
//! Portfolio and watchlist reads and writes are always scoped to the caller's
//! user id. Market movers, news and alerts are fixed illustrative payloads.

use serde::Serialize;
use thiserror::Error;

use crate::db::{PortfolioEntry, WatchlistEntry};
use crate::domain::{Symbol, UserId};

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for DashboardError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for DashboardError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardStats {
    pub portfolio_value: f64,
    pub portfolio_change: f64,
    pub day_pl: f64,
    pub day_pl_percent: f64,
    pub active_positions: u64,
    pub watchlist_count: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Mover {
    pub symbol: String,
    pub change: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Movers {
    pub gainers: Vec<Mover>,
    pub losers: Vec<Mover>,
    pub active: Vec<Mover>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ActivityItem {
    pub description: String,
    /// `%Y-%m-%d %H:%M:%S`
    pub timestamp: String,
    pub icon: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MarketStatus {
    pub status: String,
    pub next_close: String,
}

/// Body of `get_dashboard_data`.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub stats: DashboardStats,
    pub movers: Movers,
    pub activity: Vec<ActivityItem>,
    pub market_status: MarketStatus,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewsItem {
    pub title: String,
    pub summary: String,
    pub source: String,
    pub published_at: String,
    pub url: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Alert {
    pub symbol: String,
    pub message: String,
}

/// A position the caller wants to record.
#[derive(Debug, Clone)]
pub struct PositionRequest {
    pub symbol: Symbol,
    pub shares: f64,
    pub avg_price: f64,
    pub company_name: Option<String>,
    pub notes: Option<String>,
}

#[async_trait::async_trait]
pub trait DashboardService: Send + Sync {
    /// Aggregated stats plus the illustrative market widgets.
    async fn dashboard_data(&self, user_id: UserId) -> Result<DashboardData, DashboardError>;

    /// Positions, newest purchase first.
    async fn portfolio(&self, user_id: UserId) -> Result<Vec<PortfolioEntry>, DashboardError>;

    /// Watched symbols, most recently added first.
    async fn watchlist(&self, user_id: UserId) -> Result<Vec<WatchlistEntry>, DashboardError>;

    fn news(&self) -> Vec<NewsItem>;

    fn alerts(&self) -> Vec<Alert>;

    /// # Errors
    ///
    /// [`DashboardError::Conflict`] if the symbol is already watched; no row is added.
    async fn add_to_watchlist(&self, user_id: UserId, symbol: Symbol)
    -> Result<(), DashboardError>;

    /// # Errors
    ///
    /// [`DashboardError::NotFound`] if the caller does not watch `symbol`.
    async fn remove_from_watchlist(
        &self,
        user_id: UserId,
        symbol: Symbol,
    ) -> Result<(), DashboardError>;

    /// Returns the new position id.
    ///
    /// # Errors
    ///
    /// [`DashboardError::Validation`] unless shares and average price are positive.
    async fn add_to_portfolio(
        &self,
        user_id: UserId,
        position: PositionRequest,
    ) -> Result<i32, DashboardError>;

    /// # Errors
    ///
    /// [`DashboardError::NotFound`] if no position `id` belongs to the caller.
    async fn remove_from_portfolio(&self, user_id: UserId, id: i32)
    -> Result<(), DashboardError>;
}
