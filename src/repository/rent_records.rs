use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Row};
use thiserror::Error;

use crate::schemas::RentRecord;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The write hit the settled-record uniqueness constraint.
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unavailable(String),
}

/// Persistence boundary for rent records.
///
/// `create_rent_record` must reject a second settled record for the same
/// `(tenant_id, property_id, rent_month)` with `StoreError::Conflict`; callers
/// rely on that as the final barrier against racing submissions.
#[async_trait]
pub trait RentRecordStore: Send + Sync {
    async fn find_rent_records(
        &self,
        tenant_id: &str,
        property_id: &str,
        rent_month: &str,
    ) -> Result<Vec<RentRecord>, StoreError>;

    async fn create_rent_record(&self, record: &RentRecord) -> Result<RentRecord, StoreError>;
}

/// Postgres-backed store. Uniqueness comes from the partial index
/// `rent_records_settled_once` (see `migrations/`).
#[derive(Debug, Clone)]
pub struct PgRentRecordStore {
    pool: PgPool,
}

impl PgRentRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RentRecordStore for PgRentRecordStore {
    async fn find_rent_records(
        &self,
        tenant_id: &str,
        property_id: &str,
        rent_month: &str,
    ) -> Result<Vec<RentRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT row_to_json(t) AS row
             FROM rent_records t
             WHERE t.tenant_id = $1 AND t.property_id = $2 AND t.rent_month = $3
             ORDER BY t.created_on ASC",
        )
        .bind(tenant_id)
        .bind(property_id)
        .bind(rent_month)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter()
            .filter_map(|row| row.try_get::<Option<Value>, _>("row").ok().flatten())
            .map(decode_record)
            .collect()
    }

    async fn create_rent_record(&self, record: &RentRecord) -> Result<RentRecord, StoreError> {
        let row = sqlx::query(
            "WITH inserted AS (
                 INSERT INTO rent_records
                     (id, tenant_id, property_id, rent_month, status, created_on, updated_on)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 RETURNING *
             )
             SELECT row_to_json(inserted) AS row FROM inserted",
        )
        .bind(&record.id)
        .bind(&record.tenant_id)
        .bind(&record.property_id)
        .bind(&record.rent_month)
        .bind(record.status.as_str())
        .bind(record.created_on)
        .bind(record.updated_on)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.try_get::<Option<Value>, _>("row")
            .ok()
            .flatten()
            .ok_or_else(|| StoreError::Unavailable("Insert returned no row.".to_string()))
            .and_then(decode_record)
    }
}

fn decode_record(value: Value) -> Result<RentRecord, StoreError> {
    serde_json::from_value(value).map_err(|error| {
        tracing::error!(error = %error, "Malformed rent_records row");
        StoreError::Unavailable("Malformed rent record row.".to_string())
    })
}

fn map_db_error(error: sqlx::Error) -> StoreError {
    let message = error.to_string();
    tracing::error!(db_error = %message, "Rent record query failed");

    let unique_violation = error
        .as_database_error()
        .and_then(|db_error| db_error.code())
        .is_some_and(|code| code == "23505");
    if unique_violation
        || message
            .to_ascii_lowercase()
            .contains("duplicate key value violates unique constraint")
    {
        return StoreError::Conflict("Rent record already settled for this month.".to_string());
    }
    StoreError::Unavailable("Database operation failed.".to_string())
}
