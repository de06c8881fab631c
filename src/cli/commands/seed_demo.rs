//! Seed demo account command handler

use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::domain::SystemClock;
use crate::services::SeaOrmAuthService;

pub async fn cmd_seed_demo(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let auth = SeaOrmAuthService::new(store, Arc::new(SystemClock), config.security.clone());

    let created = auth
        .ensure_account(&config.demo)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to seed demo account: {e}"))?;

    if created {
        println!("✓ Demo account created: {}", config.demo.email);
    } else {
        println!("Demo account already exists: {}", config.demo.email);
    }

    Ok(())
}
