use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    schemas::{
        validate_input, BillingSummaryInput, NextDueDateInput, PaymentStatusInput, Tenant,
    },
    services::{
        due_dates::{format_due_date, next_monthly_due_date},
        occupancy::{billing_summary as summarize, BillingSummary},
        payment_status::{classify_payment_status, MonthRecord},
    },
    state::AppState,
};

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/billing/summary",
            axum::routing::post(billing_summary),
        )
        .route(
            "/billing/next-due-date",
            axum::routing::post(next_due_date),
        )
        .route(
            "/billing/payment-status",
            axum::routing::post(payment_status),
        )
}

async fn billing_summary(
    State(state): State<AppState>,
    Json(payload): Json<BillingSummaryInput>,
) -> AppResult<Json<BillingSummary>> {
    validate_input(&payload)?;
    if payload.property.is_deleted {
        return Err(AppError::NotFound("properties record not found.".to_string()));
    }

    let default_grace = state.config.default_grace_period_days;
    let tenants = payload
        .tenants
        .into_iter()
        .map(|tenant| Tenant {
            grace_period: tenant.grace_period.or(Some(default_grace)),
            ..tenant
        })
        .collect::<Vec<_>>();
    let today = payload.today.unwrap_or_else(|| state.clock.today());

    Ok(Json(summarize(
        &payload.property,
        &tenants,
        &payload.rent_records,
        payload.records_loaded,
        state.config.billing_flags(),
        today,
    )))
}

async fn next_due_date(
    State(state): State<AppState>,
    Json(payload): Json<NextDueDateInput>,
) -> Json<Value> {
    let today = payload.today.unwrap_or_else(|| state.clock.today());
    let due_date = next_monthly_due_date(payload.start_date, today);
    Json(json!({
        "next_due_date": due_date,
        "label": format_due_date(due_date),
    }))
}

async fn payment_status(
    State(state): State<AppState>,
    Json(payload): Json<PaymentStatusInput>,
) -> Json<Value> {
    let today = payload.today.unwrap_or_else(|| state.clock.today());
    let record = if payload.records_loaded {
        MonthRecord::from(payload.current_month_record.as_ref())
    } else {
        MonthRecord::NotLoaded
    };
    let status = classify_payment_status(
        payload.lease_start_date,
        payload
            .grace_period_days
            .or(Some(state.config.default_grace_period_days)),
        record,
        today,
    );
    Json(json!({
        "status": status,
        "display": status.display(),
    }))
}
