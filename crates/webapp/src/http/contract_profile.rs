use std::time::Instant;

use apotheca_domain::{ContractHeader, ContractSupplyTotals, Role, display};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Html;
use serde::Deserialize;

use super::{AppState, PageError, observe_page, require_role};
use crate::render;

const ROUTE: &str = "/contracts";
const ALLOWED: &[Role] = &[Role::Administrator, Role::Pharmacy, Role::Supervisor];

#[derive(Debug, Deserialize)]
pub(super) struct ShowParams {
    contract_id: Option<i64>,
}

pub(super) async fn show(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<ShowParams>, QueryRejection>,
) -> Result<Html<String>, PageError> {
    let started = Instant::now();
    let result = handle(&state, &headers, params).await;
    observe_page(ROUTE, "GET", StatusCode::OK, started, &result);
    result
}

async fn handle(
    state: &AppState,
    headers: &HeaderMap,
    params: Result<Query<ShowParams>, QueryRejection>,
) -> Result<Html<String>, PageError> {
    let ctx = require_role(ROUTE, headers, ALLOWED)?;

    // Required link parameter; checked before any database access.
    let Query(params) = params.map_err(|_| PageError::InvalidAccess)?;
    let contract_id = params.contract_id.ok_or(PageError::InvalidAccess)?;

    tracing::info!(
        route = ROUTE,
        role = ctx.role.as_str(),
        contract_id,
        "page.view"
    );

    let header = state
        .store
        .contract_header(contract_id)
        .await?
        .ok_or(PageError::InvalidAccess)?;
    let supplies = state.store.contract_supply_totals(contract_id).await?;

    let can_confirm = matches!(ctx.role, Role::Administrator | Role::Supervisor);
    Ok(Html(render_profile(&header, &supplies, can_confirm)))
}

fn render_profile(
    header: &ContractHeader,
    supplies: &[ContractSupplyTotals],
    can_confirm: bool,
) -> String {
    let details = format!(
        "<div class=\"list-group\">\n\
         <div class=\"list-group-item\">\n\
         <ul class=\"list-unstyled lead\">\n\
         <li><span class=\"explanation\">Contract ID:</span> {}</li>\n\
         <li><span class=\"explanation\">Pharmaceutical:</span> {}</li>\n\
         <li><span class=\"explanation\">Pharmacy:</span> {}</li>\n\
         <li><span class=\"explanation\">Start Date:</span> {}</li>\n\
         <li><span class=\"explanation\">End Date:</span> {}</li>\n\
         <li><span class=\"explanation\">Period:</span> {}</li>\n\
         </ul>\n\
         </div>\n\
         </div>",
        header.contract_id,
        render::escape_html(&header.pharmaceutical_title),
        render::escape_html(&header.pharmacy_title),
        display::long_date(header.start_date),
        display::long_date(header.end_date),
        display::period_years_label(header.start_date, header.end_date),
    );

    let mut header_cells = vec![
        "Supply ID",
        "Date Created",
        "Cost Price",
        "Selling Price",
        "Profit",
        "Payment",
        "Last Updated",
    ];
    if can_confirm {
        header_cells.push("Action");
    }

    let mut body = String::new();
    for supply in supplies {
        body.push_str(&render_supply_row(supply, can_confirm));
    }

    let content = format!(
        "{}\n<div class=\"list-group\" style=\"margin-top: 3%;\">\n\
         <div class=\"list-group-item\">\n{}\n</div>\n</div>",
        details,
        render::table(&header_cells, &body)
    );

    render::page_shell(
        &format!("Contract Profile | Contract ID {}", header.contract_id),
        &content,
    )
}

fn render_supply_row(supply: &ContractSupplyTotals, can_confirm: bool) -> String {
    let mut row = format!(
        "<tr>{}{}{}{}{}{}{}",
        render::text_cell(&supply.contract_supply_id.to_string()),
        render::text_cell(&display::long_timestamp(supply.date_created)),
        render::text_cell(&display::money(supply.cost_cents)),
        render::text_cell(&display::money(supply.selling_cents)),
        render::text_cell(&display::money(supply.profit_cents())),
        render::status_cell(supply.payment.label(), supply.payment.color()),
        render::text_cell(&display::long_timestamp(supply.last_updated)),
    );

    if can_confirm {
        if supply.payment.is_terminal() {
            row.push_str("<td></td>");
        } else {
            row.push_str(&format!(
                "<td><a href=\"/contracts/supplies/confirm?contract_supply_id={}\" class=\"btn btn-success\">Confirm</a></td>",
                supply.contract_supply_id
            ));
        }
    }

    row.push_str("</tr>\n");
    row
}
