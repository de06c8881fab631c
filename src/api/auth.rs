use axum::{
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::{HeaderMap, Method, request::Parts},
    middleware::Next,
    response::Response,
};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, AppState};
use crate::domain::session::SESSION_USER_KEY;
use crate::domain::{SessionUser, UserProfile};
use crate::services::ClientInfo;

/// The authenticated user for this request, placed in extensions by
/// [`require_session`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserProfile);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Not authenticated"))
    }
}

impl FromRequestParts<Arc<AppState>> for ClientInfo {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        let user_agent = parts
            .headers
            .get("user-agent")
            .and_then(|h| h.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        let ip_address = client_ip(
            peer,
            &parts.headers,
            &state.config().server.trusted_proxy_ips,
        )
        .map_or_else(|| "unknown".to_string(), |ip| ip.to_string());

        Ok(Self {
            ip_address,
            user_agent,
        })
    }
}

/// Forwarding headers are honoured only when the peer is a trusted proxy.
fn client_ip(peer: Option<IpAddr>, headers: &HeaderMap, trusted: &[String]) -> Option<IpAddr> {
    let peer_is_trusted =
        peer.is_some_and(|ip| trusted.iter().any(|t| t.parse::<IpAddr>().ok() == Some(ip)));

    if !peer_is_trusted {
        return peer;
    }

    // Leftmost X-Forwarded-For entry is the originating client
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok());

    let client_header = || {
        headers
            .get("x-client-ip")
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    };

    forwarded.or_else(client_header).or(peer)
}

/// Read the session user, if any. Validity is not checked here.
pub async fn session_user(session: &Session) -> Result<Option<SessionUser>, ApiError> {
    session
        .get::<SessionUser>(SESSION_USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))
}

/// Gate for protected endpoints: resolves the cookie session into a
/// [`CurrentUser`] or answers 401.
///
/// Only POST is gated so that preflight and wrong-method requests still get
/// their own answers.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if request.method() != Method::POST {
        return Ok(next.run(request).await);
    }

    let user = session_user(&session).await?;

    let Some(profile) = state.auth_service().current_user(user.as_ref()) else {
        metrics::counter!("auth_rejections_total").increment(1);
        return Err(ApiError::unauthorized("Not authenticated"));
    };

    tracing::Span::current().record("user_id", profile.id.value());
    request.extensions_mut().insert(CurrentUser(profile));

    Ok(next.run(request).await)
}
