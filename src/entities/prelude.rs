pub use super::portfolio::Entity as Portfolio;
pub use super::user_activity::Entity as UserActivity;
pub use super::user_sessions::Entity as UserSessions;
pub use super::users::Entity as Users;
pub use super::watchlist::Entity as Watchlist;
