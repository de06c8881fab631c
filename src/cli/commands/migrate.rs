//! Migrate command handler

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_migrate(config: &Config) -> anyhow::Result<()> {
    // Connecting runs pending migrations
    let store = Store::with_pool_options(&config.general.database_path, 1, 1).await?;
    store.ping().await?;

    println!("✓ Database is up to date: {}", config.general.database_path);
    Ok(())
}
