//! Prune expired session tokens command handler

use chrono::Utc;

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_prune_sessions(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let removed = store.prune_expired_session_tokens(Utc::now()).await?;

    println!("Removed {removed} expired session token(s).");
    Ok(())
}
