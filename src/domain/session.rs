//! Authenticated session state.
//!
//! A [`SessionUser`] is what the cookie session carries after a successful
//! login. All checks against it are pure: the caller supplies "now".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// Key under which the session user is stored in the cookie session.
pub const SESSION_USER_KEY: &str = "auth.user";

/// Public user fields returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_verified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub profile: UserProfile,
    pub logged_in: bool,
    /// Unix seconds.
    pub login_time: i64,
    /// Unix seconds; the session is invalid from this instant on.
    pub session_timeout: i64,
    /// Tracking token issued alongside this session.
    pub session_token: Option<String>,
}

impl SessionUser {
    #[must_use]
    pub fn start(
        profile: UserProfile,
        now: DateTime<Utc>,
        lifetime: chrono::Duration,
        session_token: Option<String>,
    ) -> Self {
        let login_time = now.timestamp();
        Self {
            profile,
            logged_in: true,
            login_time,
            session_timeout: login_time + lifetime.num_seconds(),
            session_token,
        }
    }

    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.logged_in && now.timestamp() < self.session_timeout
    }

    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.profile.id
    }

    /// Current user as seen at `now`; `None` once the session has lapsed.
    #[must_use]
    pub fn current_user(&self, now: DateTime<Utc>) -> Option<&UserProfile> {
        self.is_valid_at(now).then_some(&self.profile)
    }
}
