use sea_orm_migration::prelude::*;

mod m20240101_initial;
mod m20240115_add_portfolio_watchlist;
mod m20240120_case_insensitive_identities;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_initial::Migration),
            Box::new(m20240115_add_portfolio_watchlist::Migration),
            Box::new(m20240120_case_insensitive_identities::Migration),
        ]
    }
}
