//! `POST /api/dashboard_data`, gated by [`super::auth::require_session`].

use axum::{
    Form, Json,
    extract::{State, rejection::FormRejection},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::observability::DispatchedAction;
use super::types::{AlertsPayload, DashboardForm, NewsPayload, PortfolioPayload, WatchlistPayload};
use super::validation::{validate_position, validate_position_id, validate_symbol};
use super::{ApiError, ApiResponse, AppState};
use crate::domain::UserId;

const ACTIONS: &[&str] = &[
    "get_dashboard_data",
    "get_portfolio",
    "get_watchlist",
    "get_news",
    "get_alerts",
    "add_to_watchlist",
    "remove_from_watchlist",
    "add_to_portfolio",
    "remove_from_portfolio",
];

pub async fn handle(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    form: Result<Form<DashboardForm>, FormRejection>,
) -> Response {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };

    let action = DispatchedAction::resolve(form.action.as_deref(), ACTIONS);
    let result = dispatch(&state, user.id, &form, action).await;

    action.attach(result.into_response())
}

async fn dispatch(
    state: &AppState,
    user_id: UserId,
    form: &DashboardForm,
    action: DispatchedAction,
) -> Result<Response, ApiError> {
    let dashboard = state.dashboard_service();

    let response = match action.0 {
        "get_dashboard_data" => {
            let data = dashboard.dashboard_data(user_id).await?;
            Json(ApiResponse::success(data)).into_response()
        }
        "get_portfolio" => {
            let portfolio = dashboard.portfolio(user_id).await?;
            Json(ApiResponse::success(PortfolioPayload { portfolio })).into_response()
        }
        "get_watchlist" => {
            let watchlist = dashboard.watchlist(user_id).await?;
            Json(ApiResponse::success(WatchlistPayload { watchlist })).into_response()
        }
        "get_news" => Json(ApiResponse::success(NewsPayload {
            news: dashboard.news(),
        }))
        .into_response(),
        "get_alerts" => Json(ApiResponse::success(AlertsPayload {
            alerts: dashboard.alerts(),
        }))
        .into_response(),
        "add_to_watchlist" => {
            let symbol = validate_symbol(form.symbol.as_deref())?;
            dashboard.add_to_watchlist(user_id, symbol).await?;
            Json(ApiResponse::message("Added to watchlist successfully")).into_response()
        }
        "remove_from_watchlist" => {
            let symbol = validate_symbol(form.symbol.as_deref())?;
            dashboard.remove_from_watchlist(user_id, symbol).await?;
            Json(ApiResponse::message("Removed from watchlist successfully")).into_response()
        }
        "add_to_portfolio" => {
            let position = validate_position(form)?;
            dashboard.add_to_portfolio(user_id, position).await?;
            Json(ApiResponse::message("Added to portfolio successfully")).into_response()
        }
        "remove_from_portfolio" => {
            let id = validate_position_id(form.id.as_deref())?;
            dashboard.remove_from_portfolio(user_id, id).await?;
            Json(ApiResponse::message("Removed from portfolio successfully")).into_response()
        }
        _ => return Err(ApiError::invalid_action()),
    };

    Ok(response)
}
