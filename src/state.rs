use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::db::build_pool;
use crate::error::AppError;
use crate::repository::rent_records::{PgRentRecordStore, RentRecordStore};
use crate::services::clock::{Clock, SystemClock};
use crate::services::rent_guard::RentRecordGuard;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db_pool: Option<PgPool>,
    pub rent_records: Option<Arc<dyn RentRecordStore>>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn build(config: AppConfig) -> Result<Self, sqlx::Error> {
        let db_pool = build_pool(&config)?;
        let rent_records = db_pool
            .clone()
            .map(|pool| Arc::new(PgRentRecordStore::new(pool)) as Arc<dyn RentRecordStore>);
        let clock = Arc::new(SystemClock::new(&config.billing_timezone));

        Ok(Self {
            config: Arc::new(config),
            db_pool,
            rent_records,
            clock,
        })
    }

    pub fn rent_record_store(&self) -> Result<&dyn RentRecordStore, AppError> {
        self.rent_records.as_deref().ok_or_else(|| {
            AppError::Dependency(
                "Supabase database is not configured. Set SUPABASE_DB_URL or DATABASE_URL."
                    .to_string(),
            )
        })
    }

    pub fn rent_record_guard(&self) -> RentRecordGuard {
        RentRecordGuard::new(self.config.rent_store_timeout())
    }
}
