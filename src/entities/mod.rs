pub mod prelude;

pub mod portfolio;
pub mod user_activity;
pub mod user_sessions;
pub mod users;
pub mod watchlist;
