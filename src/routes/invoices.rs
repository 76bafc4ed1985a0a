use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    schemas::{round_money, validate_input, InvoiceRollupInput, InvoiceTrendsInput},
    services::{
        invoice_rollup::{line_balances, rollup},
        invoice_trends::{normalize_invoice_trends, InvoiceTrends},
    },
    state::AppState,
};

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/invoices/rollup", axum::routing::post(invoice_rollup))
        .route("/invoices/trends", axum::routing::post(invoice_trends))
}

async fn invoice_rollup(
    State(_state): State<AppState>,
    Json(payload): Json<InvoiceRollupInput>,
) -> AppResult<Json<Value>> {
    validate_input(&payload)?;

    let totals = rollup(&payload.line_items, payload.tax_rate).rounded();
    let balances = line_balances(&payload.line_items)
        .into_iter()
        .map(round_money)
        .collect::<Vec<_>>();

    Ok(Json(json!({
        "totals": totals,
        "line_balances": balances,
    })))
}

async fn invoice_trends(
    State(_state): State<AppState>,
    Json(payload): Json<InvoiceTrendsInput>,
) -> Json<InvoiceTrends> {
    Json(normalize_invoice_trends(&payload.invoices))
}
