use serde::{Deserialize, Serialize};

use crate::db::{PortfolioEntry, WatchlistEntry};
use crate::domain::{UserId, UserProfile};
use crate::services::dashboard_service::{Alert, NewsItem};

/// Envelope for every JSON body. Payload fields sit beside `success` rather
/// than under a nested key.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

// ============================================================================
// Form bodies
// ============================================================================

/// Body of `POST /api/credentials`. Fields irrelevant to an action are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsForm {
    pub action: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Body of `POST /api/dashboard_data`. Numbers stay as text until validated.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardForm {
    pub action: Option<String>,
    pub symbol: Option<String>,
    pub shares: Option<String>,
    pub avg_price: Option<String>,
    pub company_name: Option<String>,
    pub notes: Option<String>,
    pub id: Option<String>,
}

// ============================================================================
// Payloads
// ============================================================================

#[derive(Debug, Serialize)]
pub struct LoginPayload {
    pub user: UserProfile,
    pub session_token: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterPayload {
    pub user_id: UserId,
    pub verification_token: String,
}

#[derive(Debug, Serialize)]
pub struct AuthStatusPayload {
    pub logged_in: bool,
    pub user: Option<UserProfile>,
}

#[derive(Debug, Serialize)]
pub struct UserPayload {
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct PortfolioPayload {
    pub portfolio: Vec<PortfolioEntry>,
}

#[derive(Debug, Serialize)]
pub struct WatchlistPayload {
    pub watchlist: Vec<WatchlistEntry>,
}

#[derive(Debug, Serialize)]
pub struct NewsPayload {
    pub news: Vec<NewsItem>,
}

#[derive(Debug, Serialize)]
pub struct AlertsPayload {
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Serialize)]
pub struct HealthPayload {
    pub status: &'static str,
    pub database: &'static str,
    pub uptime_seconds: u64,
    pub version: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_fields_sit_beside_success() {
        let body = ApiResponse::success(AuthStatusPayload {
            logged_in: false,
            user: None,
        });
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"success": true, "logged_in": false, "user": null})
        );
    }

    #[test]
    fn error_body_has_only_success_and_message() {
        let json = serde_json::to_value(ApiResponse::<()>::error("Invalid action")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "message": "Invalid action"})
        );
    }

    #[test]
    fn message_only_success() {
        let json = serde_json::to_value(ApiResponse::message("Logout successful")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": true, "message": "Logout successful"})
        );
    }
}
