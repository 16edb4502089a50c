use std::time::Instant;

use apotheca_domain::{Role, SupervisorRow};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Html;

use super::{AppState, PageError, observe_page, require_role};
use crate::render;

const ROUTE: &str = "/supervisors";
const ALLOWED: &[Role] = &[Role::Administrator];

pub(super) async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Html<String>, PageError> {
    let started = Instant::now();
    let result = handle(&state, &headers).await;
    observe_page(ROUTE, "GET", StatusCode::OK, started, &result);
    result
}

async fn handle(state: &AppState, headers: &HeaderMap) -> Result<Html<String>, PageError> {
    let ctx = require_role(ROUTE, headers, ALLOWED)?;

    tracing::info!(route = ROUTE, role = ctx.role.as_str(), "page.view");

    let rows = state.store.supervisors().await?;
    Ok(Html(render_list(&rows)))
}

fn render_list(rows: &[SupervisorRow]) -> String {
    let mut body = String::new();
    for row in rows {
        body.push_str(&render_row(row));
    }

    let content = format!(
        "<h3 class=\"page-header\">List Of Supervisors</h3>\n{}",
        render::table(
            &[
                "Supervisor ID",
                "Name",
                "Email Address",
                "Phone Number",
                "Status",
            ],
            &body,
        )
    );

    render::page_shell("List of Supervisors", &content)
}

fn render_row(row: &SupervisorRow) -> String {
    let profile_href = format!("/supervisors/profile?supervisor_id={}", row.supervisor_id);

    format!(
        "<tr>{}{}{}{}{}</tr>\n",
        render::link_cell(&profile_href, &row.supervisor_id.to_string()),
        render::link_cell(&profile_href, &row.name.full()),
        render::link_cell(
            &format!("mailto:{}", row.email_address),
            &row.email_address
        ),
        render::link_cell(&format!("tel:{}", row.phone_number), &row.phone_number),
        render::status_cell(row.status.label(), row.status.color()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use apotheca_domain::{ActiveStatus, PersonName};

    fn supervisor(active: bool) -> SupervisorRow {
        SupervisorRow {
            supervisor_id: 4,
            name: PersonName {
                first: "Grace".to_string(),
                middle: None,
                last: "Njeri".to_string(),
            },
            email_address: "grace.njeri@example.org".to_string(),
            phone_number: "+254700000002".to_string(),
            status: ActiveStatus::from_flag(active),
        }
    }

    #[test]
    fn active_and_inactive_render_distinct_labels() {
        let active = render_row(&supervisor(true));
        assert!(active.contains(">Active</td>"));
        assert!(active.contains("color: green"));

        let inactive = render_row(&supervisor(false));
        assert!(inactive.contains(">Inactive</td>"));
        assert!(inactive.contains("color: red"));
    }

    #[test]
    fn rows_link_to_the_supervisor_profile_and_contacts() {
        let row = render_row(&supervisor(true));
        assert!(row.contains("/supervisors/profile?supervisor_id=4"));
        assert!(row.contains("mailto:grace.njeri@example.org"));
        assert!(row.contains("tel:+254700000002"));
    }

    #[test]
    fn list_page_carries_the_heading() {
        let page = render_list(&[supervisor(true)]);
        assert!(page.contains("List Of Supervisors"));
        assert!(page.contains("<title>List of Supervisors</title>"));
    }
}
