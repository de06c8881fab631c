//! `SeaORM` implementation of the `AuthService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::SecurityConfig;
use crate::db::repositories::user::generate_token;
use crate::db::{NewUser, Store, User, is_unique_violation};
use crate::domain::credentials::{
    EMAIL_MESSAGE, PASSWORD_MESSAGE, USERNAME_MESSAGE, is_strong_password, is_valid_email,
    is_valid_username,
};
use crate::domain::{Clock, SessionUser, UserId, UserProfile};
use crate::services::auth_service::{
    AuthError, AuthService, ClientInfo, LoginResult, RegisterResult,
};

fn validate_account(email: &str, username: &str, password: &str) -> Result<(), AuthError> {
    if !is_valid_email(email) {
        return Err(AuthError::Validation(EMAIL_MESSAGE.to_string()));
    }

    if !is_valid_username(username) {
        return Err(AuthError::Validation(USERNAME_MESSAGE.to_string()));
    }

    if !is_strong_password(password) {
        return Err(AuthError::Validation(PASSWORD_MESSAGE.to_string()));
    }

    Ok(())
}

pub struct SeaOrmAuthService {
    store: Store,
    clock: Arc<dyn Clock>,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(store: Store, clock: Arc<dyn Clock>, security: SecurityConfig) -> Self {
        Self {
            store,
            clock,
            security,
        }
    }

    /// Creates the account unless the email is already registered.
    /// Returns `true` when a row was inserted.
    pub async fn ensure_account(
        &self,
        account: &crate::config::DemoConfig,
    ) -> Result<bool, AuthError> {
        validate_account(&account.email, &account.username, &account.password)?;

        if self
            .store
            .user_exists(&account.email, &account.username)
            .await?
        {
            return Ok(false);
        }

        let password_hash = self
            .store
            .hash_password(&account.password, &self.security)
            .await?;

        self.store
            .create_user(
                NewUser {
                    email: account.email.clone(),
                    username: account.username.clone(),
                    password_hash,
                    first_name: Some("Demo".to_string()),
                    last_name: Some("User".to_string()),
                    is_verified: true,
                    verification_token: None,
                },
                self.clock.now(),
            )
            .await?;

        info!(email = %account.email, "Seeded demo account");
        Ok(true)
    }

    /// Counts a failed attempt and locks the account once the threshold is hit.
    /// A lock that has already lapsed starts the count over.
    async fn register_failure(&self, user: &User, now: DateTime<Utc>) -> Result<(), AuthError> {
        let previous = if user.locked_until.is_some() {
            0
        } else {
            user.failed_login_attempts
        };
        let attempts = previous.saturating_add(1);

        let locked_until = (attempts >= self.security.lockout.max_failed_attempts)
            .then(|| now + self.security.lockout_duration());

        self.store
            .record_failed_login(user.id, attempts, locked_until, now)
            .await?;

        if let Some(until) = locked_until {
            warn!(user_id = %user.id, attempts, %until, "Account locked after failed logins");
        }

        Ok(())
    }

    /// Activity rows are best-effort.
    async fn log_activity(
        &self,
        user_id: UserId,
        email: &str,
        action: &str,
        details: &str,
        client: &ClientInfo,
    ) {
        if let Err(e) = self
            .store
            .add_activity(
                user_id,
                email,
                action,
                Some(details),
                &client.ip_address,
                &client.user_agent,
                self.clock.now(),
            )
            .await
        {
            warn!(error = %e, %action, "Failed to log activity");
        }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
        client: &ClientInfo,
    ) -> Result<RegisterResult, AuthError> {
        validate_account(email, username, password)?;

        if self.store.user_exists(email, username).await? {
            return Err(AuthError::DuplicateUser);
        }

        let password_hash = self.store.hash_password(password, &self.security).await?;
        let verification_token = generate_token();

        let user_id = self
            .store
            .create_user(
                NewUser {
                    email: email.to_string(),
                    username: username.to_string(),
                    password_hash,
                    first_name: None,
                    last_name: None,
                    is_verified: false,
                    verification_token: Some(verification_token.clone()),
                },
                self.clock.now(),
            )
            .await
            .map_err(|e| {
                // Lost a race with a concurrent registration
                if is_unique_violation(&e) {
                    AuthError::DuplicateUser
                } else {
                    AuthError::from(e)
                }
            })?;

        self.log_activity(
            user_id,
            email,
            "registration",
            "User registered successfully",
            client,
        )
        .await;

        info!(%user_id, %username, "User registered");

        Ok(RegisterResult {
            user_id,
            verification_token,
        })
    }

    async fn login(
        &self,
        email: &str,
        password: &str,
        client: &ClientInfo,
    ) -> Result<LoginResult, AuthError> {
        if !is_valid_email(email) {
            return Err(AuthError::Validation(EMAIL_MESSAGE.to_string()));
        }

        if password.is_empty() {
            return Err(AuthError::Validation("Password is required".to_string()));
        }

        let now = self.clock.now();

        let Some((user, password_hash)) = self.store.get_user_by_email_with_password(email).await?
        else {
            return Err(AuthError::InvalidCredentials);
        };

        if user.is_locked_at(now) {
            return Err(AuthError::AccountLocked {
                until: user.locked_until.unwrap_or(now),
            });
        }

        if !user.is_active {
            return Err(AuthError::InactiveAccount);
        }

        let is_valid = self
            .store
            .verify_password_hash(&password_hash, password)
            .await
            .map_err(|e| AuthError::Internal(format!("{e:#}")))?;

        if !is_valid {
            self.register_failure(&user, now).await?;
            return Err(AuthError::InvalidCredentials);
        }

        self.store.record_successful_login(user.id, now).await?;

        let session_token = self
            .store
            .create_session_token(
                user.id,
                &client.ip_address,
                &client.user_agent,
                now + self.security.session_lifetime(),
                now,
            )
            .await?;

        self.log_activity(
            user.id,
            &user.email,
            "login",
            "User logged in successfully",
            client,
        )
        .await;

        Ok(LoginResult {
            user: user.profile(),
            session_token,
        })
    }

    async fn logout(&self, session: Option<&SessionUser>, client: &ClientInfo) {
        let Some(session) = session.filter(|s| s.is_valid_at(self.clock.now())) else {
            return;
        };

        self.log_activity(
            session.user_id(),
            &session.profile.email,
            "logout",
            "User logged out successfully",
            client,
        )
        .await;

        if let Some(token) = session.session_token.as_deref()
            && let Err(e) = self.store.deactivate_session_token(token).await
        {
            warn!(error = %e, "Failed to deactivate session token");
        }
    }

    fn start_session(&self, login: &LoginResult) -> SessionUser {
        SessionUser::start(
            login.user.clone(),
            self.clock.now(),
            self.security.session_lifetime(),
            Some(login.session_token.clone()),
        )
    }

    fn is_logged_in(&self, session: Option<&SessionUser>) -> bool {
        session.is_some_and(|s| s.is_valid_at(self.clock.now()))
    }

    fn current_user(&self, session: Option<&SessionUser>) -> Option<UserProfile> {
        session.and_then(|s| s.current_user(self.clock.now()).cloned())
    }
}
