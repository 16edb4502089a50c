use std::time::Instant;

use apotheca_domain::{PersonName, Role};
use apotheca_store::{NewPractitioner, NewSpecialty};
use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, Redirect};
use axum::Form;
use serde::Deserialize;

use super::{AppState, PageError, observe_page, require_role};
use crate::render;

const PRACTITIONER_ROUTE: &str = "/registration/practitioner";
const SPECIALTY_ROUTE: &str = "/registration/specialty";
const ALLOWED: &[Role] = &[Role::Administrator];

pub(super) async fn practitioner_form(
    State(_state): State<AppState>,
    headers: HeaderMap,
) -> Result<Html<String>, PageError> {
    let started = Instant::now();
    let result = require_role(PRACTITIONER_ROUTE, &headers, ALLOWED)
        .map(|_| Html(render_practitioner_form()));
    observe_page(PRACTITIONER_ROUTE, "GET", StatusCode::OK, started, &result);
    result
}

#[derive(Debug, Deserialize)]
pub(super) struct PractitionerInput {
    first_name: String,
    #[serde(default)]
    middle_name: Option<String>,
    last_name: String,
    email_address: String,
    phone_number: String,
    #[serde(default)]
    specialty_id: Option<i64>,
}

pub(super) async fn submit_practitioner(
    State(state): State<AppState>,
    headers: HeaderMap,
    input: Result<Form<PractitionerInput>, FormRejection>,
) -> Result<Redirect, PageError> {
    let started = Instant::now();
    let result = handle_practitioner(&state, &headers, input).await;
    observe_page(
        PRACTITIONER_ROUTE,
        "POST",
        StatusCode::SEE_OTHER,
        started,
        &result,
    );
    result
}

async fn handle_practitioner(
    state: &AppState,
    headers: &HeaderMap,
    input: Result<Form<PractitionerInput>, FormRejection>,
) -> Result<Redirect, PageError> {
    require_role(PRACTITIONER_ROUTE, headers, ALLOWED)?;
    let Form(input) = input.map_err(|_| PageError::InvalidAccess)?;

    let practitioner = NewPractitioner {
        name: PersonName {
            first: required(&input.first_name)?,
            middle: optional(input.middle_name.as_deref()),
            last: required(&input.last_name)?,
        },
        email_address: required(&input.email_address)?,
        phone_number: required(&input.phone_number)?,
        specialty_id: input.specialty_id,
    };

    let practitioner_id = state.store.insert_practitioner(&practitioner).await?;
    tracing::info!(practitioner_id, "registration.practitioner");

    Ok(Redirect::to("/"))
}

pub(super) async fn specialty_form(
    State(_state): State<AppState>,
    headers: HeaderMap,
) -> Result<Html<String>, PageError> {
    let started = Instant::now();
    let result =
        require_role(SPECIALTY_ROUTE, &headers, ALLOWED).map(|_| Html(render_specialty_form()));
    observe_page(SPECIALTY_ROUTE, "GET", StatusCode::OK, started, &result);
    result
}

#[derive(Debug, Deserialize)]
pub(super) struct SpecialtyInput {
    title: String,
}

pub(super) async fn submit_specialty(
    State(state): State<AppState>,
    headers: HeaderMap,
    input: Result<Form<SpecialtyInput>, FormRejection>,
) -> Result<Redirect, PageError> {
    let started = Instant::now();
    let result = handle_specialty(&state, &headers, input).await;
    observe_page(
        SPECIALTY_ROUTE,
        "POST",
        StatusCode::SEE_OTHER,
        started,
        &result,
    );
    result
}

async fn handle_specialty(
    state: &AppState,
    headers: &HeaderMap,
    input: Result<Form<SpecialtyInput>, FormRejection>,
) -> Result<Redirect, PageError> {
    require_role(SPECIALTY_ROUTE, headers, ALLOWED)?;
    let Form(input) = input.map_err(|_| PageError::InvalidAccess)?;

    let specialty = NewSpecialty {
        title: required(&input.title)?,
    };

    let specialty_id = state.store.insert_specialty(&specialty).await?;
    tracing::info!(specialty_id, "registration.specialty");

    Ok(Redirect::to("/"))
}

fn required(value: &str) -> Result<String, PageError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(PageError::InvalidAccess);
    }
    Ok(value.to_string())
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

fn render_practitioner_form() -> String {
    let content = format!(
        "<h3 class=\"page-header\">Practitioner Registration</h3>\n\
         <form method=\"post\" action=\"{}\" class=\"form\">\n\
         <input type=\"text\" name=\"first_name\" placeholder=\"First Name\" required>\n\
         <input type=\"text\" name=\"middle_name\" placeholder=\"Middle Name\">\n\
         <input type=\"text\" name=\"last_name\" placeholder=\"Last Name\" required>\n\
         <input type=\"email\" name=\"email_address\" placeholder=\"Email Address\" required>\n\
         <input type=\"tel\" name=\"phone_number\" placeholder=\"Phone Number\" required>\n\
         <input type=\"number\" name=\"specialty_id\" placeholder=\"Specialty ID\">\n\
         <button type=\"submit\" class=\"btn btn-primary\">Register</button>\n\
         </form>",
        PRACTITIONER_ROUTE
    );
    render::page_shell("Practitioner Registration", &content)
}

fn render_specialty_form() -> String {
    let content = format!(
        "<h3 class=\"page-header\">Specialty Registration</h3>\n\
         <form method=\"post\" action=\"{}\" class=\"form\">\n\
         <input type=\"text\" name=\"title\" placeholder=\"Specialty Title\" required>\n\
         <button type=\"submit\" class=\"btn btn-primary\">Register</button>\n\
         </form>",
        SPECIALTY_ROUTE
    );
    render::page_shell("Specialty Registration", &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_blank_fields() {
        assert!(matches!(required("   "), Err(PageError::InvalidAccess)));
        assert_eq!(required(" Jane ").expect("trimmed value"), "Jane");
    }

    #[test]
    fn optional_normalizes_blank_to_absent() {
        assert_eq!(optional(Some("  ")), None);
        assert_eq!(optional(None), None);
        assert_eq!(optional(Some(" Q ")).as_deref(), Some("Q"));
    }

    #[test]
    fn forms_post_back_to_their_own_route() {
        assert!(render_practitioner_form().contains("action=\"/registration/practitioner\""));
        assert!(render_specialty_form().contains("action=\"/registration/specialty\""));
    }
}
