//! `SeaORM` implementation of the `DashboardService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::db::{NewPosition, PortfolioEntry, Store, WatchlistEntry, is_unique_violation};
use crate::domain::{Clock, Symbol, UserId};
use crate::services::dashboard_service::{
    ActivityItem, Alert, DashboardData, DashboardError, DashboardService, DashboardStats,
    MarketStatus, Mover, Movers, NewsItem, PositionRequest,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const GAINERS: [(&str, f64); 3] = [("AAPL", 5.2), ("GOOGL", 3.8), ("MSFT", 2.1)];
const LOSERS: [(&str, f64); 3] = [("TSLA", -2.5), ("NFLX", -1.8), ("AMZN", -1.2)];
const MOST_ACTIVE: [(&str, f64); 3] = [("SPY", 0.8), ("QQQ", 1.2), ("IWM", -0.5)];

pub struct SeaOrmDashboardService {
    store: Store,
    clock: Arc<dyn Clock>,
}

impl SeaOrmDashboardService {
    #[must_use]
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn validate_position(position: &PositionRequest) -> Result<(), DashboardError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;

        if !positive(position.shares) || !positive(position.avg_price) {
            return Err(DashboardError::Validation(
                "Symbol, shares, and average price are required".to_string(),
            ));
        }
        Ok(())
    }
}

fn movers(rows: &[(&str, f64)]) -> Vec<Mover> {
    rows.iter()
        .map(|(symbol, change)| Mover {
            symbol: (*symbol).to_string(),
            change: *change,
        })
        .collect()
}

fn fixed_movers() -> Movers {
    Movers {
        gainers: movers(&GAINERS),
        losers: movers(&LOSERS),
        active: movers(&MOST_ACTIVE),
    }
}

fn fixed_news(now: DateTime<Utc>) -> Vec<NewsItem> {
    vec![NewsItem {
        title: "Market Update: Strong Trading Session".to_string(),
        summary: "Markets showed positive momentum with technology stocks leading gains..."
            .to_string(),
        source: "Market News".to_string(),
        published_at: (now - chrono::Duration::hours(1))
            .format(TIMESTAMP_FORMAT)
            .to_string(),
        url: "#".to_string(),
        image: None,
    }]
}

#[async_trait]
impl DashboardService for SeaOrmDashboardService {
    async fn dashboard_data(&self, user_id: UserId) -> Result<DashboardData, DashboardError> {
        let summary = self.store.portfolio_summary(user_id).await?;
        let watchlist_count = self.store.watchlist_count(user_id).await?;
        let now = self.clock.now();

        Ok(DashboardData {
            stats: DashboardStats {
                portfolio_value: summary.total_value,
                portfolio_change: 0.0,
                day_pl: 0.0,
                day_pl_percent: 0.0,
                active_positions: summary.positions,
                watchlist_count,
            },
            movers: fixed_movers(),
            activity: vec![ActivityItem {
                description: "Dashboard loaded successfully".to_string(),
                timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
                icon: "fa-chart-line".to_string(),
                color: "text-info".to_string(),
            }],
            market_status: MarketStatus {
                status: "open".to_string(),
                next_close: "16:00 EST".to_string(),
            },
        })
    }

    async fn portfolio(&self, user_id: UserId) -> Result<Vec<PortfolioEntry>, DashboardError> {
        Ok(self.store.list_portfolio(user_id).await?)
    }

    async fn watchlist(&self, user_id: UserId) -> Result<Vec<WatchlistEntry>, DashboardError> {
        Ok(self.store.list_watchlist(user_id).await?)
    }

    fn news(&self) -> Vec<NewsItem> {
        fixed_news(self.clock.now())
    }

    fn alerts(&self) -> Vec<Alert> {
        Vec::new()
    }

    async fn add_to_watchlist(
        &self,
        user_id: UserId,
        symbol: Symbol,
    ) -> Result<(), DashboardError> {
        let already_watched = || DashboardError::Conflict("Symbol already in watchlist".to_string());

        if self
            .store
            .watchlist_contains(user_id, symbol.as_str())
            .await?
        {
            return Err(already_watched());
        }

        self.store
            .add_to_watchlist(user_id, symbol.as_str(), self.clock.now())
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    already_watched()
                } else {
                    DashboardError::from(e)
                }
            })?;

        debug!(%user_id, %symbol, "Added to watchlist");
        Ok(())
    }

    async fn remove_from_watchlist(
        &self,
        user_id: UserId,
        symbol: Symbol,
    ) -> Result<(), DashboardError> {
        if !self
            .store
            .remove_from_watchlist(user_id, symbol.as_str())
            .await?
        {
            return Err(DashboardError::NotFound(
                "Symbol not in watchlist".to_string(),
            ));
        }

        debug!(%user_id, %symbol, "Removed from watchlist");
        Ok(())
    }

    async fn add_to_portfolio(
        &self,
        user_id: UserId,
        position: PositionRequest,
    ) -> Result<i32, DashboardError> {
        Self::validate_position(&position)?;

        let id = self
            .store
            .add_position(
                NewPosition {
                    user_id,
                    symbol: position.symbol,
                    company_name: position.company_name,
                    shares: position.shares,
                    avg_price: position.avg_price,
                    notes: position.notes,
                },
                self.clock.now(),
            )
            .await?;

        debug!(%user_id, position_id = id, "Added portfolio position");
        Ok(id)
    }

    async fn remove_from_portfolio(
        &self,
        user_id: UserId,
        id: i32,
    ) -> Result<(), DashboardError> {
        if !self.store.remove_position(user_id, id).await? {
            return Err(DashboardError::NotFound(
                "Portfolio position not found".to_string(),
            ));
        }

        debug!(%user_id, position_id = id, "Removed portfolio position");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn position(shares: f64, avg_price: f64) -> PositionRequest {
        PositionRequest {
            symbol: "AAPL".parse().unwrap(),
            shares,
            avg_price,
            company_name: None,
            notes: None,
        }
    }

    #[test]
    fn rejects_non_positive_amounts() {
        assert!(SeaOrmDashboardService::validate_position(&position(10.0, 150.0)).is_ok());
        assert!(matches!(
            SeaOrmDashboardService::validate_position(&position(0.0, 150.0)),
            Err(DashboardError::Validation(_))
        ));
        assert!(SeaOrmDashboardService::validate_position(&position(5.0, -1.0)).is_err());
        assert!(SeaOrmDashboardService::validate_position(&position(f64::NAN, 1.0)).is_err());
    }

    #[test]
    fn news_is_stamped_an_hour_back() {
        let now = Utc.with_ymd_and_hms(2025, 3, 3, 15, 0, 0).unwrap();
        let news = fixed_news(now);

        assert_eq!(news.len(), 1);
        assert_eq!(news[0].published_at, "2025-03-03 14:00:00");
        assert!(news[0].image.is_none());
    }

    #[test]
    fn movers_keep_their_order() {
        let movers = fixed_movers();
        let gainers: Vec<_> = movers.gainers.iter().map(|m| m.symbol.as_str()).collect();
        assert_eq!(gainers, ["AAPL", "GOOGL", "MSFT"]);
        assert_eq!(movers.losers[0].change, -2.5);
        assert_eq!(movers.active.len(), 3);
    }

    #[test]
    fn database_errors_convert() {
        let err: DashboardError = sea_orm::DbErr::Custom("boom".to_string()).into();
        assert!(matches!(err, DashboardError::Database(_)));
    }
}
