use std::time::Instant;

use apotheca_auth::SessionContext;
use apotheca_domain::{PrescriptionRow, Role, display};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Html;
use serde::Deserialize;

use super::{AppState, PageError, observe_page, require_role};
use crate::render;

const ROUTE: &str = "/prescriptions";
const ALLOWED: &[Role] = &[Role::Administrator, Role::Pharmacy];

#[derive(Debug, Deserialize)]
pub(super) struct ListParams {
    pharmacy_id: Option<i64>,
}

pub(super) async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Html<String>, PageError> {
    let started = Instant::now();
    let result = handle(&state, &headers, params).await;
    observe_page(ROUTE, "GET", StatusCode::OK, started, &result);
    result
}

async fn handle(
    state: &AppState,
    headers: &HeaderMap,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Html<String>, PageError> {
    let ctx = require_role(ROUTE, headers, ALLOWED)?;
    let Query(params) = params.map_err(|_| PageError::InvalidAccess)?;
    let pharmacy_id = effective_pharmacy_id(&ctx, params.pharmacy_id)?;

    tracing::info!(
        route = ROUTE,
        role = ctx.role.as_str(),
        pharmacy_id,
        "page.view"
    );

    let rows = state.store.prescriptions_for_pharmacy(pharmacy_id).await?;
    Ok(Html(render_list(pharmacy_id, &rows)))
}

// Pharmacies are pinned to their own tenant; the query parameter is only
// honoured for administrators, and for them it is required.
fn effective_pharmacy_id(
    ctx: &SessionContext,
    requested: Option<i64>,
) -> Result<i64, PageError> {
    match ctx.role {
        Role::Pharmacy => ctx.pharmacy_id.ok_or(PageError::Forbidden),
        Role::Administrator => requested.ok_or(PageError::InvalidAccess),
        _ => Err(PageError::Forbidden),
    }
}

fn render_list(pharmacy_id: i64, rows: &[PrescriptionRow]) -> String {
    let mut body = String::new();
    for row in rows {
        body.push_str(&render_row(row));
    }

    let content = format!(
        "<h3 class=\"page-header\">Prescription Assignments</h3>\n{}",
        render::table(
            &[
                "Id",
                "Practitioner",
                "Patient",
                "Drug",
                "Quantity",
                "Frequency",
                "Assigned",
                "Date",
                "Last Updated",
                "Action",
            ],
            &body,
        )
    );

    render::page_shell(
        &format!("Pharmacy Profile ID {} - Assigned Prescriptions", pharmacy_id),
        &content,
    )
}

fn render_row(row: &PrescriptionRow) -> String {
    let action = if row.assignment.is_terminal() {
        "<td><span class=\"btn btn-danger disabled\">Disabled</span></td>".to_string()
    } else {
        format!(
            "<td><a href=\"/prescriptions/assign?patient_id={}\" class=\"btn btn-success\">Assign</a></td>",
            row.patient_id
        )
    };

    format!(
        "<tr>{}{}{}{}{}{}{}{}{}{}</tr>\n",
        render::text_cell(&row.prescription_id.to_string()),
        render::text_cell(&row.practitioner.full()),
        render::text_cell(&row.patient.full()),
        render::text_cell(&row.tradename),
        render::text_cell(&row.quantity.to_string()),
        render::text_cell(&row.frequency),
        render::status_cell(row.assignment.label(), row.assignment.color()),
        render::text_cell(&display::long_timestamp(row.date_created)),
        render::text_cell(&display::long_timestamp(row.last_updated)),
        action,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use apotheca_domain::{AssignmentStatus, PersonName};
    use chrono::{DateTime, TimeZone, Utc};

    fn session(role: Role, pharmacy_id: Option<i64>) -> SessionContext {
        SessionContext {
            role,
            pharmacy_id,
            practitioner_id: None,
            patient_id: None,
            supervisor_id: None,
        }
    }

    #[test]
    fn pharmacy_scope_ignores_caller_supplied_tenant() {
        let ctx = session(Role::Pharmacy, Some(7));
        let effective = effective_pharmacy_id(&ctx, Some(8)).expect("pharmacy scope resolves");
        assert_eq!(effective, 7);
    }

    #[test]
    fn pharmacy_without_session_tenant_is_denied() {
        let ctx = session(Role::Pharmacy, None);
        let err = effective_pharmacy_id(&ctx, Some(8)).unwrap_err();
        assert!(matches!(err, PageError::Forbidden));
    }

    #[test]
    fn administrator_scope_requires_the_query_parameter() {
        let ctx = session(Role::Administrator, None);
        assert_eq!(
            effective_pharmacy_id(&ctx, Some(7)).expect("admin scope resolves"),
            7
        );

        let err = effective_pharmacy_id(&ctx, None).unwrap_err();
        assert!(matches!(err, PageError::InvalidAccess));
    }

    fn sample_row(assigned: bool) -> PrescriptionRow {
        let ts: DateTime<Utc> = Utc.with_ymd_and_hms(2021, 3, 5, 15, 4, 0).unwrap();
        PrescriptionRow {
            prescription_id: 1,
            practitioner_id: 1,
            practitioner: PersonName {
                first: "Alice".to_string(),
                middle: None,
                last: "Wangari".to_string(),
            },
            patient_id: 9,
            patient: PersonName {
                first: "Brian".to_string(),
                middle: Some("K".to_string()),
                last: "Otieno".to_string(),
            },
            supply_item_id: 1,
            tradename: "Amoxicillin 500mg".to_string(),
            quantity: 14,
            frequency: "twice daily".to_string(),
            assignment: AssignmentStatus::from_flag(assigned),
            date_created: ts,
            last_updated: ts,
        }
    }

    #[test]
    fn pending_rows_render_the_assign_action() {
        let html = render_row(&sample_row(false));
        assert!(html.contains("Pending"));
        assert!(html.contains("/prescriptions/assign?patient_id=9"));
        assert!(html.contains("Friday March 5, 2021 3:04 PM"));
    }

    #[test]
    fn assigned_rows_render_with_the_action_disabled() {
        let html = render_row(&sample_row(true));
        assert!(html.contains("Assigned"));
        assert!(html.contains("Disabled"));
        assert!(!html.contains("/prescriptions/assign"));
    }

    #[test]
    fn list_page_titles_the_effective_pharmacy() {
        let page = render_list(7, &[sample_row(false)]);
        assert!(page.contains("Pharmacy Profile ID 7 - Assigned Prescriptions"));
        assert!(page.contains("Prescription Assignments"));
    }
}
