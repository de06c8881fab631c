//! Domain service for authentication and session lifecycle.
//!
//! Handles registration, login with lockout, logout bookkeeping, and the pure
//! session checks the HTTP layer consults on every request.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::domain::{SessionUser, UserId, UserProfile};

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("User with this email or username already exists")]
    DuplicateUser,

    #[error("Account is temporarily locked due to multiple failed login attempts")]
    AccountLocked { until: DateTime<Utc> },

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is inactive. Please contact support.")]
    InactiveAccount,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

/// Where a request came from, recorded on activity and tracking rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterResult {
    pub user_id: UserId,
    pub verification_token: String,
}

/// Outcome of a successful credential check.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub user: UserProfile,
    pub session_token: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a new account.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`] for a malformed email, username or weak password
    /// - [`AuthError::DuplicateUser`] if the email or username is taken
    async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
        client: &ClientInfo,
    ) -> Result<RegisterResult, AuthError>;

    /// Verifies credentials, applying the lockout policy.
    ///
    /// A wrong password counts towards the lockout threshold as a side effect.
    ///
    /// # Errors
    ///
    /// - [`AuthError::AccountLocked`] while `locked_until` is in the future
    /// - [`AuthError::InvalidCredentials`] for an unknown email or wrong password
    /// - [`AuthError::InactiveAccount`] if the account is disabled
    async fn login(
        &self,
        email: &str,
        password: &str,
        client: &ClientInfo,
    ) -> Result<LoginResult, AuthError>;

    /// Records the logout of `session` if it is still valid. Never fails the
    /// caller for bookkeeping problems.
    async fn logout(&self, session: Option<&SessionUser>, client: &ClientInfo);

    /// Builds the session state for a fresh login.
    fn start_session(&self, login: &LoginResult) -> SessionUser;

    fn is_logged_in(&self, session: Option<&SessionUser>) -> bool;

    fn current_user(&self, session: Option<&SessionUser>) -> Option<UserProfile>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_error_messages_are_client_safe() {
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
        assert_eq!(
            AuthError::Validation("Invalid email format".to_string()).to_string(),
            "Invalid email format"
        );
        assert_eq!(
            AuthError::AccountLocked { until: Utc::now() }.to_string(),
            "Account is temporarily locked due to multiple failed login attempts"
        );
    }
}
