use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::schemas::{RentRecord, DEFAULT_GRACE_PERIOD_DAYS};
use crate::services::due_dates::first_of_month;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unknown,
    Paid,
    Unpaid,
    Overdue,
}

/// Presentation metadata the UI renders for a status chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusDisplay {
    pub color: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
}

impl PaymentStatus {
    pub fn display(self) -> StatusDisplay {
        let (color, label, icon) = match self {
            Self::Paid => ("success", "Paid", "check_circle"),
            Self::Overdue => ("error", "Overdue", "error"),
            Self::Unpaid => ("warning", "Unpaid", "schedule"),
            Self::Unknown => ("default", "Unknown", "help"),
        };
        StatusDisplay { color, label, icon }
    }
}

/// What the caller knows about the evaluation month's rent record.
#[derive(Debug, Clone, Copy)]
pub enum MonthRecord<'a> {
    /// The lookup was not performed or failed; the engine will not guess.
    NotLoaded,
    /// The lookup ran and found nothing for the month.
    Missing,
    Present(&'a RentRecord),
}

impl<'a> From<Option<&'a RentRecord>> for MonthRecord<'a> {
    fn from(record: Option<&'a RentRecord>) -> Self {
        match record {
            Some(record) => Self::Present(record),
            None => Self::Missing,
        }
    }
}

/// Last day of the month on which unpaid rent is still not overdue.
pub fn grace_deadline(today: NaiveDate, grace_period_days: Option<u32>) -> NaiveDate {
    let grace = grace_period_days.unwrap_or(DEFAULT_GRACE_PERIOD_DAYS);
    let start = first_of_month(today);
    start
        .checked_add_days(Days::new(u64::from(grace)))
        .unwrap_or(start)
}

pub fn classify_payment_status(
    lease_start_date: Option<NaiveDate>,
    grace_period_days: Option<u32>,
    record: MonthRecord<'_>,
    today: NaiveDate,
) -> PaymentStatus {
    let Some(lease_start) = lease_start_date else {
        return PaymentStatus::Unknown;
    };
    let record = match record {
        MonthRecord::NotLoaded => return PaymentStatus::Unknown,
        MonthRecord::Missing => None,
        MonthRecord::Present(record) => Some(record),
    };
    if today < lease_start {
        return PaymentStatus::Unknown;
    }

    if record.is_some_and(|record| record.status.is_settled()) {
        return PaymentStatus::Paid;
    }

    if today > grace_deadline(today, grace_period_days) {
        PaymentStatus::Overdue
    } else {
        PaymentStatus::Unpaid
    }
}

/// Whether rent for the current month is past its grace period and unpaid.
pub fn is_rent_due(
    lease_start_date: Option<NaiveDate>,
    grace_period_days: Option<u32>,
    record: Option<&RentRecord>,
    today: NaiveDate,
) -> bool {
    classify_payment_status(lease_start_date, grace_period_days, record.into(), today)
        == PaymentStatus::Overdue
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::{classify_payment_status, is_rent_due, MonthRecord, PaymentStatus};
    use crate::schemas::{RentRecord, RentRecordStatus};

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid date")
    }

    fn record(status: RentRecordStatus) -> RentRecord {
        RentRecord {
            id: "r1".to_string(),
            tenant_id: "t1".to_string(),
            property_id: "p1".to_string(),
            rent_month: "October".to_string(),
            status,
            created_on: Utc::now(),
            updated_on: Utc::now(),
        }
    }

    #[test]
    fn grace_boundary_flips_the_day_after_deadline() {
        let start = Some(date("2026-01-10"));
        assert!(!is_rent_due(start, Some(3), None, date("2026-10-01")));
        assert!(!is_rent_due(start, Some(3), None, date("2026-10-04")));
        assert!(is_rent_due(start, Some(3), None, date("2026-10-05")));
        assert!(is_rent_due(start, None, None, date("2026-10-05")));
        assert!(!is_rent_due(start, Some(10), None, date("2026-10-11")));
    }

    #[test]
    fn not_due_before_lease_starts() {
        let start = Some(date("2026-11-01"));
        assert!(!is_rent_due(start, Some(3), None, date("2026-10-20")));
        assert_eq!(
            classify_payment_status(start, Some(3), MonthRecord::Missing, date("2026-10-20")),
            PaymentStatus::Unknown
        );
    }

    #[test]
    fn settled_records_are_paid() {
        let start = Some(date("2026-01-10"));
        let today = date("2026-10-20");
        for status in [
            RentRecordStatus::Paid,
            RentRecordStatus::Manual,
            RentRecordStatus::Complete,
        ] {
            let rec = record(status);
            assert_eq!(
                classify_payment_status(start, Some(3), MonthRecord::Present(&rec), today),
                PaymentStatus::Paid
            );
        }

        let intent = record(RentRecordStatus::Intent);
        assert_eq!(
            classify_payment_status(start, Some(3), MonthRecord::Present(&intent), today),
            PaymentStatus::Overdue
        );
    }

    #[test]
    fn declines_without_context() {
        let today = date("2026-10-20");
        assert_eq!(
            classify_payment_status(None, Some(3), MonthRecord::Missing, today),
            PaymentStatus::Unknown
        );
        assert_eq!(
            classify_payment_status(Some(date("2026-01-01")), Some(3), MonthRecord::NotLoaded, today),
            PaymentStatus::Unknown
        );
    }

    #[test]
    fn maps_display_metadata() {
        assert_eq!(PaymentStatus::Paid.display().color, "success");
        assert_eq!(PaymentStatus::Overdue.display().label, "Overdue");
        assert_eq!(PaymentStatus::Unpaid.display().color, "warning");
        assert_eq!(PaymentStatus::Unpaid.display().label, "Unpaid");
    }
}
