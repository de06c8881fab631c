use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set,
    sea_query::{Expr, SimpleExpr},
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::domain::{UserId, UserProfile};
use crate::entities::users;

/// User data returned from repository (without sensitive password hash)
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub failed_login_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }

    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            is_verified: self.is_verified,
        }
    }
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: UserId::new(model.id),
            email: model.email,
            username: model.username,
            first_name: model.first_name,
            last_name: model.last_name,
            is_active: model.is_active,
            is_verified: model.is_verified,
            failed_login_attempts: model.failed_login_attempts,
            locked_until: model.locked_until,
            last_login: model.last_login,
            created_at: model.created_at,
        }
    }
}

/// Fields for a freshly registered account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_verified: bool,
    pub verification_token: Option<String>,
}

// Same collation as the unique indexes, so lookups and conflicts agree
fn email_matches(email: &str) -> SimpleExpr {
    Expr::cust_with_values("\"users\".\"email\" = ? COLLATE NOCASE", [email])
}

fn username_matches(username: &str) -> SimpleExpr {
    Expr::cust_with_values("\"users\".\"username\" = ? COLLATE NOCASE", [username])
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(email_matches(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(User::from))
    }

    /// Get user by email together with the stored password hash
    pub async fn get_by_email_with_password(&self, email: &str) -> Result<Option<(User, String)>> {
        let user = users::Entity::find()
            .filter(email_matches(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(|u| {
            let password_hash = u.password_hash.clone();
            (User::from(u), password_hash)
        }))
    }

    /// True if either the email or the username is already taken
    pub async fn exists(&self, email: &str, username: &str) -> Result<bool> {
        let count = users::Entity::find()
            .filter(
                Condition::any()
                    .add(email_matches(email))
                    .add(username_matches(username)),
            )
            .count(&self.conn)
            .await
            .context("Failed to check for existing user")?;

        Ok(count > 0)
    }

    pub async fn create(&self, user: NewUser, now: DateTime<Utc>) -> Result<UserId> {
        let active = users::ActiveModel {
            email: Set(user.email),
            username: Set(user.username),
            password_hash: Set(user.password_hash),
            first_name: Set(user.first_name),
            last_name: Set(user.last_name),
            is_active: Set(true),
            is_verified: Set(user.is_verified),
            verification_token: Set(user.verification_token),
            failed_login_attempts: Set(0),
            locked_until: Set(None),
            last_login: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let res = users::Entity::insert(active)
            .exec(&self.conn)
            .await
            .context("Failed to insert user")?;

        Ok(UserId::new(res.last_insert_id))
    }

    pub async fn record_failed_login(
        &self,
        id: UserId,
        failed_login_attempts: i32,
        locked_until: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let active = users::ActiveModel {
            id: Set(id.value()),
            failed_login_attempts: Set(failed_login_attempts),
            locked_until: Set(locked_until),
            updated_at: Set(now),
            ..Default::default()
        };
        active
            .update(&self.conn)
            .await
            .context("Failed to record failed login")?;

        Ok(())
    }

    /// Clear the failure counter and any lock, stamp `last_login`
    pub async fn record_successful_login(&self, id: UserId, now: DateTime<Utc>) -> Result<()> {
        let active = users::ActiveModel {
            id: Set(id.value()),
            failed_login_attempts: Set(0),
            locked_until: Set(None),
            last_login: Set(Some(now)),
            updated_at: Set(now),
            ..Default::default()
        };
        active
            .update(&self.conn)
            .await
            .context("Failed to record successful login")?;

        Ok(())
    }

    pub async fn set_active(&self, id: UserId, is_active: bool, now: DateTime<Utc>) -> Result<()> {
        let active = users::ActiveModel {
            id: Set(id.value()),
            is_active: Set(is_active),
            updated_at: Set(now),
            ..Default::default()
        };
        active
            .update(&self.conn)
            .await
            .context("Failed to update user active flag")?;

        Ok(())
    }
}

/// Hash a password using Argon2id with the configured cost parameters.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Hash on the blocking pool; Argon2 would otherwise stall the runtime.
pub async fn hash_password_blocking(password: &str, config: &SecurityConfig) -> Result<String> {
    let password = password.to_string();
    let config = config.clone();
    task::spawn_blocking(move || hash_password(&password, &config))
        .await
        .context("Password hashing task panicked")?
}

/// Verify a password against a stored PHC-format hash.
/// Parameters are read from the hash itself, so older cost settings still verify.
pub async fn verify_password(password_hash: &str, password: &str) -> Result<bool> {
    let password_hash = password_hash.to_string();
    let password = password.to_string();

    let is_valid = task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        let argon2 = Argon2::default();
        Ok::<bool, anyhow::Error>(
            argon2
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")??;

    Ok(is_valid)
}

/// Generate a random token (64 character hex string)
#[must_use]
pub fn generate_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_config() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        }
    }

    #[test]
    fn test_generate_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_token());
    }

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password("Password1", &cheap_config()).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(&hash, "Password1").await.unwrap());
        assert!(!verify_password(&hash, "Password2").await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_rejects_garbage_hash() {
        assert!(verify_password("not-a-hash", "Password1").await.is_err());
    }

    #[test]
    fn test_lock_check() {
        let now = Utc::now();
        let mut user = User {
            id: UserId::new(1),
            email: "a@example.com".to_string(),
            username: "alpha".to_string(),
            first_name: None,
            last_name: None,
            is_active: true,
            is_verified: false,
            failed_login_attempts: 4,
            locked_until: Some(now + chrono::Duration::minutes(15)),
            last_login: None,
            created_at: now,
        };
        assert!(user.is_locked_at(now));
        assert!(!user.is_locked_at(now + chrono::Duration::minutes(15)));

        user.locked_until = None;
        assert!(!user.is_locked_at(now));
    }
}
