use crate::entities::prelude::*;
use crate::entities::{portfolio, watchlist};
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Portfolio)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Watchlist)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_portfolio_user_id")
                    .table(Portfolio)
                    .col(portfolio::Column::UserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // One row per (user, symbol)
        manager
            .create_index(
                Index::create()
                    .name("idx_watchlist_user_symbol")
                    .table(Watchlist)
                    .col(watchlist::Column::UserId)
                    .col(watchlist::Column::Symbol)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Watchlist).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Portfolio).to_owned())
            .await
    }
}
