use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use apotheca_auth::SessionContext;
use apotheca_domain::Role;
use apotheca_store::{Store, StoreError};
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::config::{AppConfig, StartupError};
use crate::{metrics, render};

mod contract_profile;
mod prescriptions;
mod registration;
mod supervisors;

pub const FORBIDDEN_PATH: &str = "/errors/403";
pub const INVALID_ACCESS_PATH: &str = "/errors/invalid-access";

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    store: Store,
}

pub async fn router(config: AppConfig) -> Result<Router, StartupError> {
    let store = Store::connect_and_migrate(
        &config.db_url,
        Duration::from_millis(config.query_timeout_ms),
    )
    .await
    .map_err(|err| StartupError {
        code: "ERR_DB_UNAVAILABLE",
        message: format!("failed to initialize store: {}", err),
    })?;

    let state = AppState { config, store };

    Ok(Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics_endpoint))
        .route("/", get(homepage))
        .route("/prescriptions", get(prescriptions::list))
        .route("/contracts", get(contract_profile::show))
        .route("/supervisors", get(supervisors::list))
        .route(
            "/registration/practitioner",
            get(registration::practitioner_form).post(registration::submit_practitioner),
        )
        .route(
            "/registration/specialty",
            get(registration::specialty_form).post(registration::submit_specialty),
        )
        .route(FORBIDDEN_PATH, get(forbidden_page))
        .route(INVALID_ACCESS_PATH, get(invalid_access_page))
        .with_state(state))
}

#[derive(Debug)]
pub(crate) enum PageError {
    Forbidden,
    InvalidAccess,
    Store(StoreError),
}

impl From<StoreError> for PageError {
    fn from(value: StoreError) -> Self {
        PageError::Store(value)
    }
}

impl PageError {
    fn status(&self) -> StatusCode {
        match self {
            PageError::Forbidden | PageError::InvalidAccess => StatusCode::SEE_OTHER,
            PageError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::Forbidden => Redirect::to(FORBIDDEN_PATH).into_response(),
            PageError::InvalidAccess => Redirect::to(INVALID_ACCESS_PATH).into_response(),
            PageError::Store(err) => {
                tracing::error!(error = %err, "page query failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(render::error_page(
                        "Something Went Wrong",
                        "The page could not be loaded. Please try again later.",
                    )),
                )
                    .into_response()
            }
        }
    }
}

// The static role-to-page allow-list. The session context is resolved once
// here and handed down to the page; pages never read session state again.
pub(crate) fn require_role(
    route: &'static str,
    headers: &HeaderMap,
    allowed: &[Role],
) -> Result<SessionContext, PageError> {
    let ctx = SessionContext::from_headers(headers).map_err(|err| {
        tracing::warn!(route, code = err.code, "session rejected");
        metrics::inc_access_denied(route, "session");
        PageError::Forbidden
    })?;

    if !allowed.contains(&ctx.role) {
        tracing::warn!(route, role = ctx.role.as_str(), "role denied");
        metrics::inc_access_denied(route, "role");
        return Err(PageError::Forbidden);
    }

    Ok(ctx)
}

pub(crate) fn observe_page<T>(
    route: &'static str,
    method: &'static str,
    ok_status: StatusCode,
    started: Instant,
    result: &Result<T, PageError>,
) {
    let status = match result {
        Ok(_) => ok_status,
        Err(err) => err.status(),
    };
    metrics::observe_http_request(route, method, status.as_u16(), started.elapsed());
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize)]
struct ReadyzResponse {
    status: &'static str,
    checks: BTreeMap<&'static str, bool>,
}

async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let mut checks = BTreeMap::new();
    checks.insert("database", state.store.ping().await.is_ok());

    let all_ready = checks.values().all(|ok| *ok);
    let status = if all_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadyzResponse {
            status: if all_ready { "ready" } else { "not_ready" },
            checks,
        }),
    )
}

async fn metrics_endpoint() -> impl IntoResponse {
    match metrics::render() {
        Ok((body, content_type)) => {
            let mut headers = HeaderMap::new();
            if let Ok(value) = HeaderValue::from_str(content_type.as_str()) {
                headers.insert(header::CONTENT_TYPE, value);
            }
            (headers, body).into_response()
        }
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn homepage() -> Html<String> {
    let content = "<h3 class=\"page-header\">Pharmacy Management</h3>\n\
                   <ul class=\"list-unstyled lead\">\n\
                   <li><a href=\"/prescriptions\">Prescription Assignments</a></li>\n\
                   <li><a href=\"/supervisors\">List of Supervisors</a></li>\n\
                   <li><a href=\"/registration/practitioner\">Practitioner Registration</a></li>\n\
                   <li><a href=\"/registration/specialty\">Specialty Registration</a></li>\n\
                   </ul>";
    Html(render::page_shell("Pharmacy Management", content))
}

async fn forbidden_page() -> impl IntoResponse {
    (
        StatusCode::FORBIDDEN,
        Html(render::error_page(
            "403 Forbidden",
            "You do not have permission to view this page.",
        )),
    )
}

async fn invalid_access_page() -> Html<String> {
    Html(render::error_page(
        "Invalid Access",
        "The link you followed is missing required information.",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn guard_rejects_roles_outside_the_allow_list() {
        for role in ["supervisor", "practitioner", "patient"] {
            let headers = headers_with_cookie(&format!("role={}", role));
            let err = require_role(
                "/prescriptions",
                &headers,
                &[Role::Administrator, Role::Pharmacy],
            )
            .expect_err("role outside the allow-list must be denied");
            assert!(matches!(err, PageError::Forbidden));
        }
    }

    #[test]
    fn guard_rejects_missing_or_unknown_sessions() {
        let err = require_role("/prescriptions", &HeaderMap::new(), &[Role::Administrator])
            .expect_err("missing session must be denied");
        assert!(matches!(err, PageError::Forbidden));

        let headers = headers_with_cookie("role=auditor");
        let err = require_role("/prescriptions", &headers, &[Role::Administrator])
            .expect_err("unknown role must be denied");
        assert!(matches!(err, PageError::Forbidden));
    }

    #[test]
    fn guard_passes_the_session_context_through() {
        let headers = headers_with_cookie("role=pharmacy; pharmacy_id=7");
        let ctx = require_role(
            "/prescriptions",
            &headers,
            &[Role::Administrator, Role::Pharmacy],
        )
        .expect("allow-listed role should pass");
        assert_eq!(ctx.role, Role::Pharmacy);
        assert_eq!(ctx.pharmacy_id, Some(7));
    }

    #[test]
    fn page_error_statuses_match_the_redirect_taxonomy() {
        assert_eq!(PageError::Forbidden.status(), StatusCode::SEE_OTHER);
        assert_eq!(PageError::InvalidAccess.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            PageError::Store(StoreError::Timeout).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
