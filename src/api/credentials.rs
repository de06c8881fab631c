//! `POST /api/credentials`: login, registration and session introspection,
//! dispatched on the form's `action` field.

use axum::{
    Form, Json,
    extract::{State, rejection::FormRejection},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::session_user;
use super::observability::DispatchedAction;
use super::types::{AuthStatusPayload, CredentialsForm, LoginPayload, RegisterPayload, UserPayload};
use super::validation::{validate_login, validate_registration};
use super::{ApiError, ApiResponse, AppState};
use crate::domain::session::SESSION_USER_KEY;
use crate::services::{AuthError, ClientInfo};

const ACTIONS: &[&str] = &["login", "register", "logout", "check_auth", "get_user"];

pub async fn handle(
    State(state): State<Arc<AppState>>,
    session: Session,
    client: ClientInfo,
    form: Result<Form<CredentialsForm>, FormRejection>,
) -> Response {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };

    let action = DispatchedAction::resolve(form.action.as_deref(), ACTIONS);
    let result = match action.0 {
        "login" => login(&state, &session, &client, &form).await,
        "register" => register(&state, &client, &form).await,
        "logout" => logout(&state, &session, &client).await,
        "check_auth" => check_auth(&state, &session).await,
        "get_user" => get_user(&state, &session).await,
        _ => Err(ApiError::invalid_action()),
    };

    action.attach(result.into_response())
}

async fn login(
    state: &AppState,
    session: &Session,
    client: &ClientInfo,
    form: &CredentialsForm,
) -> Result<Response, ApiError> {
    let (email, password) = validate_login(form)?;

    let result = state.auth_service().login(&email, &password, client).await;

    let outcome = match &result {
        Ok(_) => "success",
        Err(AuthError::AccountLocked { .. }) => "locked",
        Err(AuthError::InvalidCredentials) => "invalid",
        Err(_) => "error",
    };
    metrics::counter!("auth_login_attempts_total", "outcome" => outcome).increment(1);

    let login = result?;

    // New id on privilege change
    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to rotate session: {e}")))?;

    let session_state = state.auth_service().start_session(&login);
    session
        .insert(SESSION_USER_KEY, &session_state)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    tracing::Span::current().record("user_id", login.user.id.value());
    tracing::info!(user_id = %login.user.id, "User logged in");

    Ok(Json(ApiResponse::success_with_message(
        "Login successful",
        LoginPayload {
            user: login.user,
            session_token: login.session_token,
        },
    ))
    .into_response())
}

async fn register(
    state: &AppState,
    client: &ClientInfo,
    form: &CredentialsForm,
) -> Result<Response, ApiError> {
    let (email, username, password) = validate_registration(form)?;

    let registered = state
        .auth_service()
        .register(&email, &username, &password, client)
        .await?;

    Ok(Json(ApiResponse::success_with_message(
        "Registration successful",
        RegisterPayload {
            user_id: registered.user_id,
            verification_token: registered.verification_token,
        },
    ))
    .into_response())
}

async fn logout(
    state: &AppState,
    session: &Session,
    client: &ClientInfo,
) -> Result<Response, ApiError> {
    let user = session_user(session).await?;

    state.auth_service().logout(user.as_ref(), client).await;

    session
        .flush()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to destroy session: {e}")))?;

    Ok(Json(ApiResponse::message("Logout successful")).into_response())
}

async fn check_auth(state: &AppState, session: &Session) -> Result<Response, ApiError> {
    let user = session_user(session).await?;
    let current = state.auth_service().current_user(user.as_ref());

    Ok(Json(ApiResponse::success(AuthStatusPayload {
        logged_in: current.is_some(),
        user: current,
    }))
    .into_response())
}

async fn get_user(state: &AppState, session: &Session) -> Result<Response, ApiError> {
    let user = session_user(session).await?;

    let profile = state
        .auth_service()
        .current_user(user.as_ref())
        .ok_or_else(|| ApiError::unauthorized("User not logged in"))?;

    Ok(Json(ApiResponse::success(UserPayload { user: profile })).into_response())
}
