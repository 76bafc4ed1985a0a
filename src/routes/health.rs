use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use std::time::Duration;

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let db_ok = if let Some(pool) = &state.db_pool {
        // Short timeout so the healthcheck answers even when the first
        // connection hangs on DNS, TLS or TCP.
        match tokio::time::timeout(
            Duration::from_secs(3),
            sqlx::query("SELECT 1 FROM rent_records LIMIT 1").fetch_optional(pool),
        )
        .await
        {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Health check DB query failed");
                false
            }
            Err(_) => {
                tracing::error!("Health check DB query timed out (3s)");
                false
            }
        }
    } else {
        true // no DB configured, nothing to check
    };

    let status = if db_ok { "ok" } else { "degraded" };
    Json(json!({
        "status": status,
        "now": state.clock.now().to_rfc3339(),
        "today": state.clock.today(),
        "db": db_ok
    }))
}

#[cfg(test)]
mod tests {
    use axum::extract::State;
    use chrono::NaiveDate;
    use std::sync::Arc;

    use super::health;
    use crate::config::test_config;
    use crate::services::clock::FixedClock;
    use crate::state::AppState;

    #[tokio::test]
    async fn reports_ok_without_database() {
        let mut state = AppState::build(test_config()).expect("state without database");
        state.clock = Arc::new(FixedClock::on(
            NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date"),
        ));

        let body = health(State(state)).await.0;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["db"], true);
        assert_eq!(body["today"], "2026-10-19");
    }
}
