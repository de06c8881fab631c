use crate::api::AppState;
use axum::{extract::State, http::HeaderValue, response::IntoResponse};
use std::sync::Arc;

pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.prometheus_handle.as_ref().map_or_else(
        || "Metrics not enabled or failed to initialize".to_string(),
        metrics_exporter_prometheus::PrometheusHandle::render,
    )
}

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

/// The `action` a form endpoint dispatched on. Handlers attach it to their
/// response so the logging middleware can label metrics with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchedAction(pub &'static str);

impl DispatchedAction {
    pub const UNKNOWN: Self = Self("unknown");

    /// Matches the raw form field against the endpoint's actions and records
    /// it on the request span. Anything unrecognised collapses to `unknown`
    /// so metric labels stay bounded.
    #[must_use]
    pub fn resolve(raw: Option<&str>, known: &[&'static str]) -> Self {
        let action = raw
            .and_then(|raw| known.iter().copied().find(|k| *k == raw))
            .map_or(Self::UNKNOWN, Self);
        tracing::Span::current().record("action", action.0);
        action
    }

    #[must_use]
    pub fn attach(self, mut response: Response) -> Response {
        response.extensions_mut().insert(self);
        response
    }
}

/// Request span plus one wide event per request.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    let uri = req.uri().path().to_string();

    let matched_path = req
        .extensions()
        .get::<axum::extract::MatchedPath>()
        .map(|mp| mp.as_str().to_string());

    let user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %uri,
        route = matched_path.clone(),
        action = tracing::field::Empty,
        user_id = tracing::field::Empty,
    );

    async move {
        let response = next.run(req).await;

        let elapsed = start.elapsed();
        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let status = response.status().as_u16();

        let outcome = match status {
            500.. => "error",
            400..=499 => "client_error",
            _ => "success",
        };

        // Prefer the route template to keep label cardinality bounded
        let metrics_path = matched_path.as_deref().unwrap_or(&uri);

        let labels = [
            ("method", method.clone()),
            ("path", metrics_path.to_string()),
            ("status", status.to_string()),
        ];

        metrics::counter!("http_requests_total", &labels).increment(1);
        metrics::histogram!("http_request_duration_seconds", &labels)
            .record(elapsed.as_secs_f64());

        let action = response.extensions().get::<DispatchedAction>().copied();
        if let Some(DispatchedAction(action)) = action {
            metrics::counter!(
                "api_actions_total",
                "path" => metrics_path.to_string(),
                "action" => action,
                "outcome" => outcome,
            )
            .increment(1);
        }

        info!(
            event = "http_request_finished",
            duration_ms = duration_ms,
            status_code = status,
            action = action.map(|a| a.0),
            user_agent = %user_agent,
            outcome = %outcome,
            "Request finished"
        );

        response
    }
    .instrument(span)
    .await
}

pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "referrer-policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert("cache-control", HeaderValue::from_static("no-store"));

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode};

    const ACTIONS: &[&str] = &["get_portfolio", "get_watchlist"];

    #[test]
    fn test_resolve_known_action() {
        assert_eq!(
            DispatchedAction::resolve(Some("get_watchlist"), ACTIONS),
            DispatchedAction("get_watchlist")
        );
    }

    #[test]
    fn test_resolve_collapses_unrecognised_values() {
        assert_eq!(
            DispatchedAction::resolve(Some("drop_tables"), ACTIONS),
            DispatchedAction::UNKNOWN
        );
        assert_eq!(
            DispatchedAction::resolve(None, ACTIONS),
            DispatchedAction::UNKNOWN
        );
        // Exact match only
        assert_eq!(
            DispatchedAction::resolve(Some("GET_PORTFOLIO"), ACTIONS),
            DispatchedAction::UNKNOWN
        );
    }

    #[test]
    fn test_attach_sets_response_extension() {
        let response = Response::builder()
            .status(StatusCode::OK)
            .body(Body::empty())
            .unwrap();
        let response = DispatchedAction("get_portfolio").attach(response);

        assert_eq!(
            response.extensions().get::<DispatchedAction>(),
            Some(&DispatchedAction("get_portfolio"))
        );
    }
}
