pub mod activity;
pub mod portfolio;
pub mod session_token;
pub mod user;
pub mod watchlist;
