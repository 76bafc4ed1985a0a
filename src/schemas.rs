use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::AppError;

pub const DEFAULT_GRACE_PERIOD_DAYS: u32 = 3;
pub const UNKNOWN_CATEGORY_LABEL: &str = "Unknown Item";
/// Largest rent, price or payment accepted on input, in currency units.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;
/// Largest tax rate accepted on input, in percent.
pub const MAX_TAX_RATE_PERCENT: i64 = 100;

pub fn validate_input<T: Validate>(input: &T) -> Result<(), AppError> {
    input
        .validate()
        .map_err(|errors| AppError::UnprocessableEntity(format!("Validation failed: {errors}")))
}

fn default_true() -> bool {
    true
}

fn within(value: &Decimal, max: i64, code: &'static str) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("non_negative"));
    }
    if *value > Decimal::from(max) {
        return Err(ValidationError::new(code));
    }
    Ok(())
}

fn money_amount(value: &Decimal) -> Result<(), ValidationError> {
    within(value, MAX_AMOUNT, "amount_too_large")
}

fn tax_rate_percent(value: &Decimal) -> Result<(), ValidationError> {
    within(value, MAX_TAX_RATE_PERCENT, "tax_rate_too_large")
}

/// Reads an optional amount the way draft forms submit it: absent is zero.
pub fn amount_or_zero(value: Option<Decimal>) -> Decimal {
    value.unwrap_or(Decimal::ZERO)
}

/// Cents for display. Half a cent rounds away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct Property {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    #[validate(custom(function = "money_amount"))]
    pub rent: Option<Decimal>,
    #[serde(default)]
    #[validate(custom(function = "money_amount"))]
    pub additional_rent: Option<Decimal>,
    #[serde(default)]
    pub units: u32,
    #[serde(default)]
    pub rentees: Vec<String>,
    #[serde(default)]
    pub is_deleted: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct Tenant {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub property_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    #[validate(custom(function = "money_amount"))]
    pub rent: Option<Decimal>,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub is_sor: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub start_date: Option<NaiveDate>,
    pub grace_period: Option<u32>,
    pub term: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RentRecordStatus {
    Intent,
    Paid,
    Manual,
    Complete,
}

impl RentRecordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Intent => "intent",
            Self::Paid => "paid",
            Self::Manual => "manual",
            Self::Complete => "complete",
        }
    }

    /// Position in the forward-only lifecycle. `Paid` and `Manual` are peers.
    pub fn rank(self) -> u8 {
        match self {
            Self::Intent => 0,
            Self::Paid | Self::Manual => 1,
            Self::Complete => 2,
        }
    }

    /// Money has been received for the month.
    pub fn is_settled(self) -> bool {
        self.rank() > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RentRecord {
    pub id: String,
    pub tenant_id: String,
    pub property_id: String,
    pub rent_month: String,
    pub status: RentRecordStatus,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LineItemCategory {
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct LineItem {
    pub category: Option<LineItemCategory>,
    #[serde(default)]
    pub description: String,
    pub quantity: Option<u32>,
    #[validate(custom(function = "money_amount"))]
    pub price: Option<Decimal>,
    #[validate(custom(function = "money_amount"))]
    pub payment: Option<Decimal>,
    pub payment_method: Option<String>,
}

impl LineItem {
    pub fn category_label(&self) -> &str {
        self.category
            .as_ref()
            .and_then(|category| category.label.as_deref())
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .unwrap_or(UNKNOWN_CATEGORY_LABEL)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct Invoice {
    #[serde(default)]
    pub title: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(custom(function = "tax_rate_percent"))]
    pub tax_rate: Option<Decimal>,
    #[serde(default)]
    #[validate(nested)]
    pub line_items: Vec<LineItem>,
    pub invoice_status: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BillingSummaryInput {
    #[validate(nested)]
    pub property: Property,
    #[serde(default)]
    #[validate(nested)]
    pub tenants: Vec<Tenant>,
    #[serde(default)]
    pub rent_records: Vec<RentRecord>,
    /// `false` when the caller could not load this month's records.
    #[serde(default = "default_true")]
    pub records_loaded: bool,
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NextDueDateInput {
    pub start_date: Option<NaiveDate>,
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentStatusInput {
    pub lease_start_date: Option<NaiveDate>,
    pub grace_period_days: Option<u32>,
    pub current_month_record: Option<RentRecord>,
    #[serde(default = "default_true")]
    pub records_loaded: bool,
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRentRecordInput {
    #[validate(length(max = 128))]
    pub id: Option<String>,
    #[serde(default)]
    #[validate(length(max = 128))]
    pub tenant_id: String,
    #[serde(default)]
    #[validate(length(max = 128))]
    pub property_id: String,
    #[serde(default)]
    #[validate(length(max = 32))]
    pub rent_month: String,
    pub status: RentRecordStatus,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InvoiceRollupInput {
    #[serde(default)]
    #[validate(nested)]
    pub line_items: Vec<LineItem>,
    #[validate(custom(function = "tax_rate_percent"))]
    pub tax_rate: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceTrendsInput {
    #[serde(default)]
    pub invoices: Vec<Option<Invoice>>,
}
