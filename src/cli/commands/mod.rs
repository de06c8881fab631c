mod init;
mod migrate;
mod prune_sessions;
mod seed_demo;

pub use init::cmd_init;
pub use migrate::cmd_migrate;
pub use prune_sessions::cmd_prune_sessions;
pub use seed_demo::cmd_seed_demo;
