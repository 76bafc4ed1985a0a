use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::RentRecordError;
use crate::repository::rent_records::{RentRecordStore, StoreError};
use crate::schemas::{CreateRentRecordInput, RentRecord, RentRecordStatus};
use crate::services::clock::Clock;
use crate::services::due_dates::MONTH_NAMES;

/// Canonical spelling of a rent month (`" march"` becomes `"March"`).
pub fn normalize_rent_month(raw: &str) -> Result<&'static str, RentRecordError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RentRecordError::missing("rent_month"));
    }
    MONTH_NAMES
        .iter()
        .copied()
        .find(|name| name.eq_ignore_ascii_case(trimmed))
        .ok_or_else(|| RentRecordError::Validation {
            field: "rent_month",
            message: format!("'{trimmed}' is not a month name."),
        })
}

/// A rent record submission, assembled field by field and checked once.
#[derive(Debug, Clone, Default)]
pub struct RentRecordDraft {
    id: Option<String>,
    tenant_id: Option<String>,
    property_id: Option<String>,
    rent_month: Option<String>,
    status: Option<RentRecordStatus>,
}

/// Identifying fields of a draft after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RentKey {
    tenant_id: String,
    property_id: String,
    rent_month: &'static str,
    status: RentRecordStatus,
}

impl RentRecordDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn property_id(mut self, property_id: impl Into<String>) -> Self {
        self.property_id = Some(property_id.into());
        self
    }

    pub fn rent_month(mut self, rent_month: impl Into<String>) -> Self {
        self.rent_month = Some(rent_month.into());
        self
    }

    pub fn status(mut self, status: RentRecordStatus) -> Self {
        self.status = Some(status);
        self
    }

    fn key(&self) -> Result<RentKey, RentRecordError> {
        if self.id.as_deref().is_some_and(|id| id.trim().is_empty()) {
            return Err(RentRecordError::missing("id"));
        }
        let tenant_id = required(self.tenant_id.as_deref(), "tenant_id")?;
        let property_id = required(self.property_id.as_deref(), "property_id")?;
        let rent_month = normalize_rent_month(self.rent_month.as_deref().unwrap_or_default())?;
        let status = self.status.ok_or_else(|| RentRecordError::missing("status"))?;
        Ok(RentKey {
            tenant_id,
            property_id,
            rent_month,
            status,
        })
    }

    /// Builds the record to persist, stamping a fresh id when none was given.
    pub fn build(self, now: DateTime<Utc>) -> Result<RentRecord, RentRecordError> {
        let key = self.key()?;
        let id = self
            .id
            .map(|id| id.trim().to_string())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Ok(RentRecord {
            id,
            tenant_id: key.tenant_id,
            property_id: key.property_id,
            rent_month: key.rent_month.to_string(),
            status: key.status,
            created_on: now,
            updated_on: now,
        })
    }
}

impl From<CreateRentRecordInput> for RentRecordDraft {
    fn from(input: CreateRentRecordInput) -> Self {
        let draft = Self::new()
            .tenant_id(input.tenant_id)
            .property_id(input.property_id)
            .rent_month(input.rent_month)
            .status(input.status);
        match input.id {
            Some(id) => draft.id(id),
            None => draft,
        }
    }
}

fn required(value: Option<&str>, field: &'static str) -> Result<String, RentRecordError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
        .ok_or_else(|| RentRecordError::missing(field))
}

impl RentRecord {
    /// Returns the record moved to `status`. Only forward moves are allowed.
    pub fn advance(
        &self,
        status: RentRecordStatus,
        now: DateTime<Utc>,
    ) -> Result<RentRecord, RentRecordError> {
        if status.rank() <= self.status.rank() {
            return Err(RentRecordError::InvalidTransition {
                from: self.status.as_str(),
                to: status.as_str(),
            });
        }
        Ok(RentRecord {
            status,
            updated_on: now,
            ..self.clone()
        })
    }
}

/// Gate run right before a rent record is written.
///
/// The existence check here only rejects early. Two submissions can both pass
/// it; the store's uniqueness constraint decides, and a conflict from the
/// write is reported the same way as a duplicate found by the check.
#[derive(Debug, Clone, Copy)]
pub struct RentRecordGuard {
    store_timeout: Duration,
}

impl RentRecordGuard {
    pub fn new(store_timeout: Duration) -> Self {
        Self { store_timeout }
    }

    pub async fn submit<S>(
        &self,
        store: &S,
        draft: RentRecordDraft,
        clock: &dyn Clock,
    ) -> Result<RentRecord, RentRecordError>
    where
        S: RentRecordStore + ?Sized,
    {
        let key = draft.key()?;

        let existing = self
            .with_timeout(store.find_rent_records(&key.tenant_id, &key.property_id, key.rent_month))
            .await
            .map_err(|error| self.store_failure(error, &key))?;

        if existing.iter().any(|record| record.status.is_settled()) {
            warn!(
                tenant_id = %key.tenant_id,
                property_id = %key.property_id,
                rent_month = key.rent_month,
                "Rejected duplicate rent record"
            );
            return Err(duplicate(&key));
        }

        let record = draft.build(clock.now())?;
        let created = self
            .with_timeout(store.create_rent_record(&record))
            .await
            .map_err(|error| self.store_failure(error, &key))?;

        info!(
            rent_record_id = %created.id,
            tenant_id = %created.tenant_id,
            property_id = %created.property_id,
            rent_month = %created.rent_month,
            status = created.status.as_str(),
            "Rent record created"
        );
        Ok(created)
    }

    async fn with_timeout<T>(
        &self,
        call: impl std::future::Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Unavailable(format!(
                "Rent record store did not answer within {} ms.",
                self.store_timeout.as_millis()
            ))),
        }
    }

    fn store_failure(&self, error: StoreError, key: &RentKey) -> RentRecordError {
        match error {
            StoreError::Conflict(_) => {
                warn!(
                    tenant_id = %key.tenant_id,
                    property_id = %key.property_id,
                    rent_month = key.rent_month,
                    "Rent record write lost uniqueness race"
                );
                duplicate(key)
            }
            StoreError::Unavailable(message) => {
                warn!(error = %message, "Rent record store unavailable");
                RentRecordError::StoreUnavailable(message)
            }
        }
    }
}

fn duplicate(key: &RentKey) -> RentRecordError {
    RentRecordError::DuplicateRentRecord {
        tenant_id: key.tenant_id.clone(),
        property_id: key.property_id.clone(),
        rent_month: key.rent_month.to_string(),
    }
}
