use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    error::AppResult,
    schemas::{validate_input, CreateRentRecordInput},
    services::rent_guard::RentRecordDraft,
    state::AppState,
};

pub fn router() -> axum::Router<AppState> {
    axum::Router::new().route("/rent-records", axum::routing::post(create_rent_record))
}

async fn create_rent_record(
    State(state): State<AppState>,
    Json(payload): Json<CreateRentRecordInput>,
) -> AppResult<impl IntoResponse> {
    validate_input(&payload)?;
    let store = state.rent_record_store()?;

    let created = state
        .rent_record_guard()
        .submit(store, RentRecordDraft::from(payload), state.clock.as_ref())
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}
